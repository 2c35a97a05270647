// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=FILMCAM_VERSION");

    // Packagers can pin the version string
    let version = std::env::var("FILMCAM_VERSION")
        .ok()
        .or_else(git_describe)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `0.1.0-3-gabc1234-dirty` style description of the checkout
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let described = described.strip_prefix('v').unwrap_or(&described).to_string();
    (!described.is_empty()).then_some(described)
}
