use std::process::Command;

// Stamp the full version string into the binary for --version. Dev builds
// carry the short git hash and a dirty marker; release builds are plain
// semver.
fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap();
    let profile = std::env::var("PROFILE").unwrap();

    let full_version = if profile == "debug" {
        match git_hash() {
            Some(hash) => format!("{}-dev+{}", version, hash),
            None => format!("{}-dev", version),
        }
    } else {
        version
    };

    println!("cargo:rustc-env=A0_INSTALL_VERSION={}", full_version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let mut hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if is_dirty() {
        hash.push_str(".dirty");
    }
    Some(hash)
}

fn is_dirty() -> bool {
    Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .map(|output| !output.stdout.is_empty())
        .unwrap_or(false)
}
