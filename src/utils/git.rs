use crate::error::{InstallerError, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Check whether a directory holds a repository clone, by the presence of
/// the version-control metadata marker. A plain existence probe: worktree
/// layouts (where `.git` is a file) count as clones too.
pub fn is_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Clone a repository. git's own refusal to clone into a non-empty
/// directory is surfaced as-is on stderr.
pub fn clone(url: &str, dest: &Path, verbose: bool) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg(url).arg(dest);

    if !verbose {
        cmd.stdout(Stdio::null());
    }

    let status = cmd
        .status()
        .map_err(|e| InstallerError::Git(format!("Failed to run git: {}", e)))?;

    if !status.success() {
        return Err(InstallerError::Git(format!(
            "Failed to clone {} into {}",
            url,
            dest.display()
        )));
    }

    Ok(())
}

/// Update an existing clone, fast-forward only. Divergent local history
/// makes git refuse the pull; that refusal is the wanted behavior and is
/// propagated rather than resolved by merging.
pub fn pull_ff_only(dir: &Path, verbose: bool) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(dir).args(["pull", "--ff-only"]);

    if !verbose {
        cmd.stdout(Stdio::null());
    }

    let status = cmd
        .status()
        .map_err(|e| InstallerError::Git(format!("Failed to run git: {}", e)))?;

    if !status.success() {
        return Err(InstallerError::Git(format!(
            "Fast-forward pull failed in {}",
            dir.display()
        )));
    }

    Ok(())
}
