// SPDX-License-Identifier: MPL-2.0

//! Permission gatekeeper
//!
//! Decides whether the camera or the photo library may be used. The
//! platform owns the authoritative state, so it is queried on every
//! attempt and never cached here.

use std::fmt;
use std::future::Future;
use tracing::{debug, info};

/// A platform resource that needs its own authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
    PhotoLibrary,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Camera, Capability::PhotoLibrary];

    pub fn display_name(&self) -> &'static str {
        match self {
            Capability::Camera => "camera",
            Capability::PhotoLibrary => "photo library",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Authorization state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Authorized,
    Denied,
    NotDetermined,
    Restricted,
    /// Partial access; only meaningful for the photo library
    Limited,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionState::Authorized => "authorized",
            PermissionState::Denied => "denied",
            PermissionState::NotDetermined => "not determined",
            PermissionState::Restricted => "restricted",
            PermissionState::Limited => "limited",
        };
        f.write_str(name)
    }
}

/// What the gatekeeper does for a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Proceed,
    Prompt,
    Denied,
}

/// Map a permission state to the gatekeeper's next step
///
/// Limited library access counts as authorized. The camera has no limited
/// mode, so a limited camera state is refused.
pub fn gate(state: PermissionState, capability: Capability) -> Gate {
    match (state, capability) {
        (PermissionState::Authorized, _) => Gate::Proceed,
        (PermissionState::Limited, Capability::PhotoLibrary) => Gate::Proceed,
        (PermissionState::NotDetermined, _) => Gate::Prompt,
        (PermissionState::Limited, Capability::Camera)
        | (PermissionState::Denied, _)
        | (PermissionState::Restricted, _) => Gate::Denied,
    }
}

/// Platform authorization service
pub trait PermissionService {
    /// Current state, queried fresh
    fn status(&self, capability: Capability) -> impl Future<Output = PermissionState> + Send;

    /// Show the platform prompt and return the state the user chose
    fn request(&self, capability: Capability) -> impl Future<Output = PermissionState> + Send;
}

/// Resolve whether `capability` may be used right now
///
/// Prompts at most once, and only when the state is undetermined. A
/// `false` outcome is final for this attempt.
pub async fn authorize<S>(service: &S, capability: Capability) -> bool
where
    S: PermissionService + Sync,
{
    let state = service.status(capability).await;
    debug!(%capability, %state, "Permission status");

    match gate(state, capability) {
        Gate::Proceed => true,
        Gate::Denied => false,
        Gate::Prompt => {
            let chosen = service.request(capability).await;
            info!(%capability, state = %chosen, "Permission prompt answered");
            // A prompt dismissed without a choice is still undetermined
            gate(chosen, capability) == Gate::Proceed
        }
    }
}
