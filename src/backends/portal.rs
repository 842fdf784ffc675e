// SPDX-License-Identifier: MPL-2.0

//! XDG desktop portal camera access
//!
//! Inside a sandbox the camera may only be used after
//! `org.freedesktop.portal.Camera.AccessCamera` succeeds. The portal shows
//! its own dialog the first time and remembers the answer afterwards.

use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// `Response` code meaning the user granted the request
const RESPONSE_SUCCESS: u32 = 0;

/// Ask the portal for camera access, waiting for the user's answer
///
/// Returns `Ok(false)` when the user declined or dismissed the dialog.
pub async fn access_camera() -> Result<bool, zbus::Error> {
    let connection = zbus::Connection::session().await?;

    let camera = zbus::Proxy::new(&connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE)
        .await?;

    // Subscribe to the request's Response before calling, using the
    // predictable request path derived from our handle token
    let token = handle_token();
    let sender = connection
        .unique_name()
        .ok_or_else(|| zbus::Error::Failure("no unique bus name".into()))?
        .as_str()
        .to_string();
    let request_path = request_path(&sender, &token);
    debug!(path = %request_path, "Waiting for camera portal response");

    let request = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        request_path.as_str(),
        REQUEST_INTERFACE,
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;

    // Older portals ignore the token and answer on a path of their own
    if let Some(actual) = moved_request(&request_path, handle.as_str()) {
        warn!(
            expected = %request_path,
            got = %actual,
            "Camera portal chose its own request handle"
        );
        let request = zbus::Proxy::new(
            &connection,
            PORTAL_DESTINATION,
            actual,
            REQUEST_INTERFACE,
        )
        .await?;
        responses = request.receive_signal("Response").await?;
    }

    let Some(message) = responses.next().await else {
        return Ok(false);
    };
    let body = message.body();
    let (response, _results): (u32, HashMap<String, OwnedValue>) = body.deserialize()?;

    info!(response, "Camera portal answered");
    Ok(response == RESPONSE_SUCCESS)
}

/// The handle to listen on instead, when it is not the one subscribed to
fn moved_request<'a>(subscribed: &str, handle: &'a str) -> Option<&'a str> {
    (handle != subscribed).then_some(handle)
}

/// Random token for a portal request handle
fn handle_token() -> String {
    format!("photo_picker_{}", uuid::Uuid::new_v4().simple())
}

/// Object path the portal will use for a request from `sender` with `token`
fn request_path(sender: &str, token: &str) -> String {
    let sender = sender.trim_start_matches(':').replace('.', "_");
    format!("{}/request/{}/{}", PORTAL_PATH, sender, token)
}
