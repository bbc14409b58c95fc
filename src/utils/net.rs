use std::process::Command;

/// Best-effort discovery of the host's primary IP, for printing a reachable
/// URL after the UI is launched. Returns `None` on any failure; callers fall
/// back to the configured bind address.
pub fn primary_host_ip() -> Option<String> {
    let output = Command::new("hostname").arg("-I").output().ok()?;

    if !output.status.success() {
        return None;
    }

    first_token(&String::from_utf8_lossy(&output.stdout))
}

fn first_token(s: &str) -> Option<String> {
    s.split_whitespace().next().map(str::to_string)
}
