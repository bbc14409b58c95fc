use crate::error::{InstallerError, Result};
use std::path::Path;
use std::process::{Command, Stdio};

pub struct DockerCli;

impl DockerCli {
    /// Check if docker is installed
    pub fn is_installed() -> bool {
        which::which("docker").is_ok()
    }

    /// Probe whether the daemon answers for the invoking user. Used as an
    /// advisory permission check after engine installation.
    pub fn daemon_reachable() -> bool {
        Command::new("docker")
            .arg("info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Pull an image. No retries: registry and network failures are the
    /// tool's own errors and reach the user on stderr.
    pub fn pull(image: &str, verbose: bool) -> Result<()> {
        let mut cmd = Command::new("docker");
        cmd.args(["pull", image]);

        if !verbose {
            cmd.stdout(Stdio::null());
        }

        let status = cmd
            .status()
            .map_err(|e| InstallerError::DockerExecution(format!("Failed to pull image: {}", e)))?;

        if !status.success() {
            return Err(InstallerError::DockerExecution(format!(
                "Failed to pull image {}",
                image
            )));
        }

        Ok(())
    }

    /// List names of all containers, running and stopped.
    pub fn list_container_names() -> Result<Vec<String>> {
        let output = Command::new("docker")
            .args(["ps", "-a", "--format", "{{.Names}}"])
            .output()
            .map_err(|e| {
                InstallerError::DockerExecution(format!("Failed to list containers: {}", e))
            })?;

        if !output.status.success() {
            return Err(InstallerError::DockerExecution(
                "Failed to list containers".to_string(),
            ));
        }

        Ok(names_from_list_output(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    /// Check for a container by exact name match.
    pub fn container_exists(name: &str) -> Result<bool> {
        let names = Self::list_container_names()?;
        Ok(names.iter().any(|n| n == name))
    }

    pub fn stop(name: &str) -> Result<()> {
        let status = Command::new("docker")
            .args(["stop", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                InstallerError::DockerExecution(format!("Failed to stop container: {}", e))
            })?;

        if !status.success() {
            return Err(InstallerError::DockerExecution(format!(
                "Failed to stop container {}",
                name
            )));
        }

        Ok(())
    }

    pub fn remove(name: &str) -> Result<()> {
        let status = Command::new("docker")
            .args(["rm", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                InstallerError::DockerExecution(format!("Failed to remove container: {}", e))
            })?;

        if !status.success() {
            return Err(InstallerError::DockerExecution(format!(
                "Failed to remove container {}",
                name
            )));
        }

        Ok(())
    }

    /// Launch a detached container with one port mapping and one volume
    /// mapping. The container keeps running after this process exits.
    pub fn run_detached(
        name: &str,
        image: &str,
        host_port: u16,
        container_port: u16,
        data_dir: &Path,
        container_data_dir: &str,
    ) -> Result<()> {
        let mut cmd = Command::new("docker");
        cmd.args(["run", "-d"])
            .arg(format!("--name={}", name))
            .arg("-p")
            .arg(format!("{}:{}", host_port, container_port))
            .arg("-v")
            .arg(format!(
                "{}:{}",
                data_dir.display(),
                container_data_dir
            ))
            .arg(image);

        // -d prints the container id on stdout; not useful to the user
        let status = cmd.stdout(Stdio::null()).status().map_err(|e| {
            InstallerError::DockerExecution(format!("Failed to run container: {}", e))
        })?;

        if !status.success() {
            return Err(InstallerError::DockerExecution(format!(
                "Failed to run container {}",
                name
            )));
        }

        Ok(())
    }
}

fn names_from_list_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_from_list_output() {
        let names = names_from_list_output("agent-zero\nother\n\n");
        assert_eq!(names, vec!["agent-zero".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_names_from_empty_output() {
        assert!(names_from_list_output("").is_empty());
    }

    #[test]
    fn test_exact_name_matching() {
        // A prefix like agent-zero-old must not match agent-zero
        let names = names_from_list_output("agent-zero-old\nagent-zero2\n");
        assert!(!names.iter().any(|n| n == "agent-zero"));
        assert!(names.iter().any(|n| n == "agent-zero-old"));
    }
}
