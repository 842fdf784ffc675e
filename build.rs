// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");

    // Packagers can pin the version string without a git checkout
    let version = std::env::var("PHOTO_PICKER_VERSION").unwrap_or_else(|_| describe_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version shown by `--version`
///
/// - exact tag `v0.1.0` becomes `0.1.0-<hash>`
/// - `v0.1.0-5-gabcdef1` becomes `0.1.0-dirty-abcdef1`
/// - no git at all falls back to the crate version
fn describe_version() -> String {
    let crate_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());

    let Some(described) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return crate_version;
    };
    let described = described.strip_prefix('v').unwrap_or(&described).to_string();
    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());

    if !described.contains('-') {
        // `--always` yields a bare hash when there is no tag yet
        if described == hash {
            return format!("{}-{}", crate_version, hash);
        }
        return format!("{}-{}", described, hash);
    }

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() >= 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        format!("{}-dirty-{}", parts[2], hash)
    } else {
        described
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
