use crate::error::{InstallerError, Result};
use std::process::{Command, Stdio};

/// Whether the installer itself runs as uid 0. Queried per call so tests can
/// exercise both command shapes; the answer cannot change mid-process.
pub fn running_as_root() -> bool {
    uzers::get_current_uid() == 0
}

/// Build a command for a system-mutating tool, prefixed with sudo unless the
/// process is already root.
fn privileged(program: &str) -> Command {
    if running_as_root() {
        Command::new(program)
    } else {
        let mut cmd = Command::new("sudo");
        cmd.arg(program);
        cmd
    }
}

/// Run a step command to completion. stdout is suppressed unless verbose;
/// stderr always reaches the user so external tool errors surface verbatim.
fn run_checked(mut cmd: Command, verbose: bool, what: &str) -> Result<()> {
    if !verbose {
        cmd.stdout(Stdio::null());
    }

    let status = cmd
        .status()
        .map_err(|e| InstallerError::CommandFailed(format!("Failed to run {}: {}", what, e)))?;

    if !status.success() {
        return Err(InstallerError::CommandFailed(format!("{} failed", what)));
    }

    Ok(())
}

pub struct AptGet;

impl AptGet {
    /// Check if apt-get is installed
    pub fn is_installed() -> bool {
        which::which("apt-get").is_ok()
    }

    pub fn update(verbose: bool) -> Result<()> {
        let mut cmd = privileged("apt-get");
        cmd.env("DEBIAN_FRONTEND", "noninteractive").arg("update");
        run_checked(cmd, verbose, "apt-get update")
    }

    /// Install packages in a single apt-get call. Re-installing an already
    /// installed package is a no-op at the apt layer.
    pub fn install(packages: &[&str], verbose: bool) -> Result<()> {
        let mut cmd = privileged("apt-get");
        cmd.env("DEBIAN_FRONTEND", "noninteractive")
            .args(["install", "-y"])
            .args(packages);
        run_checked(
            cmd,
            verbose,
            &format!("apt-get install {}", packages.join(" ")),
        )
    }

    /// Probe the package cache for a package name. Never errors: an
    /// unreadable cache is treated the same as an absent package.
    pub fn cache_has(package: &str) -> bool {
        Command::new("apt-cache")
            .args(["show", package])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Pick the compose package to install, preferring the v2 plugin and falling
/// back to the standalone v1 package. `None` means skip compose entirely;
/// compose is opportunistic, never required.
pub fn compose_package(has_plugin: bool, has_standalone: bool) -> Option<&'static str> {
    if has_plugin {
        Some("docker-compose-plugin")
    } else if has_standalone {
        Some("docker-compose")
    } else {
        None
    }
}

pub struct Systemctl;

impl Systemctl {
    pub fn enable_now(unit: &str, verbose: bool) -> Result<()> {
        let mut cmd = privileged("systemctl");
        cmd.args(["enable", "--now", unit]);
        run_checked(cmd, verbose, &format!("systemctl enable --now {}", unit))
    }
}
