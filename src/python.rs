use crate::error::{InstallerError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A Python virtual environment rooted at a fixed subpath of the install
/// directory. Creation is marker-checked: an existing environment is reused
/// as-is, never recreated, so installed packages survive re-runs.
pub struct Venv {
    root: PathBuf,
}

impl Venv {
    /// Create the environment if the `pyvenv.cfg` marker is absent,
    /// otherwise reuse what is there.
    pub fn ensure(root: &Path, verbose: bool) -> Result<Self> {
        if root.join("pyvenv.cfg").is_file() {
            println!("Reusing virtual environment at {}", root.display());
        } else {
            println!("Creating virtual environment at {}...", root.display());
            run_checked(
                Command::new("python3")
                    .arg("-m")
                    .arg("venv")
                    .arg(root),
                verbose,
                "python3 -m venv",
            )?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn python(&self) -> PathBuf {
        self.bin("python")
    }

    fn bin(&self, name: &str) -> PathBuf {
        self.root.join("bin").join(name)
    }

    /// Upgrade the environment's installer toolchain.
    pub fn upgrade_pip(&self, verbose: bool) -> Result<()> {
        run_checked(
            Command::new(self.python()).args(["-m", "pip", "install", "--upgrade", "pip"]),
            verbose,
            "pip upgrade",
        )
    }

    pub fn pip_install_requirements(&self, manifest: &Path, verbose: bool) -> Result<()> {
        run_checked(
            Command::new(self.python())
                .args(["-m", "pip", "install", "-r"])
                .arg(manifest),
            verbose,
            "pip install -r",
        )
    }

    /// Install the Chromium engine for the browser-automation dependency.
    /// Uses the venv's own playwright entrypoint so the browsers land where
    /// the installed package expects them.
    pub fn playwright_install_chromium(&self, verbose: bool) -> Result<()> {
        run_checked(
            Command::new(self.bin("playwright")).args(["install", "chromium"]),
            verbose,
            "playwright install chromium",
        )
    }
}

fn run_checked(cmd: &mut Command, verbose: bool, what: &str) -> Result<()> {
    if !verbose {
        cmd.stdout(Stdio::null());
    }

    let status = cmd
        .status()
        .map_err(|e| InstallerError::Python(format!("Failed to run {}: {}", what, e)))?;

    if !status.success() {
        return Err(InstallerError::Python(format!("{} failed", what)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_paths() {
        let venv = Venv {
            root: PathBuf::from("/tmp/a0src/.venv"),
        };
        assert_eq!(venv.python(), PathBuf::from("/tmp/a0src/.venv/bin/python"));
        assert_eq!(
            venv.bin("playwright"),
            PathBuf::from("/tmp/a0src/.venv/bin/playwright")
        );
    }

    #[test]
    fn test_ensure_reuses_existing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".venv");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();

        // Marker present: must not shell out to python3 at all, so this
        // passes even on hosts without python3.
        let venv = Venv::ensure(&root, false).unwrap();
        assert_eq!(venv.python(), root.join("bin/python"));
    }
}
