use crate::apt::{self, AptGet, Systemctl};
use crate::config::{self, Config};
use crate::docker::DockerCli;
use crate::error::{InstallerError, Result};
use std::fs;

/// Docker procedure: ensure the engine, pull the image, replace any stale
/// same-named container, launch a fresh one. Every mutating step is guarded
/// by a fresh host-state check, so re-running converges to one running
/// container without name collisions.
pub fn execute(config: &Config) -> Result<()> {
    if DockerCli::is_installed() {
        println!("Docker found.");
    } else {
        install_engine(config)?;
    }

    println!("Pulling image {}...", config::IMAGE);
    DockerCli::pull(config::IMAGE, config.verbose)?;

    reconcile_container(config)?;

    fs::create_dir_all(&config.data_dir)?;

    println!("Starting container {}...", config.container_name);
    DockerCli::run_detached(
        &config.container_name,
        config::IMAGE,
        config.port,
        config::CONTAINER_PORT,
        &config.data_dir,
        config::CONTAINER_DATA_DIR,
    )?;

    println!();
    println!("Agent Zero is starting at {}", config.access_url());
    println!("Data directory: {}", config.data_dir.display());
    println!("View logs with: docker logs -f {}", config.container_name);
    println!("Stop with:      docker stop {}", config.container_name);

    Ok(())
}

/// Install the engine package and, opportunistically, a compose package.
/// Service enablement and the permission probe are advisory only.
fn install_engine(config: &Config) -> Result<()> {
    if !AptGet::is_installed() {
        return Err(InstallerError::AptNotInstalled);
    }

    println!("Docker not found. Installing via apt-get...");
    AptGet::update(config.verbose)?;
    AptGet::install(&["docker.io"], config.verbose)?;

    match apt::compose_package(
        AptGet::cache_has("docker-compose-plugin"),
        AptGet::cache_has("docker-compose"),
    ) {
        Some(package) => {
            println!("Installing {}...", package);
            AptGet::install(&[package], config.verbose)?;
        }
        None => println!("No compose package in the archive, skipping."),
    }

    // The daemon may already be running, or be socket-activated; a failing
    // enable is worth a warning, not an abort.
    if let Err(e) = Systemctl::enable_now("docker", config.verbose) {
        eprintln!("Warning: could not enable docker service: {}", e);
    }

    if !DockerCli::daemon_reachable() {
        println!("Note: 'docker info' failed for user {}.", config.user);
        println!("Either re-run this installer with sudo, or add yourself to the docker group:");
        println!("  sudo usermod -aG docker {}", config.user);
        println!("  (then log out and back in)");
    }

    Ok(())
}

/// Remove any container holding the target name so the run step never
/// collides with a stale one.
fn reconcile_container(config: &Config) -> Result<()> {
    if DockerCli::container_exists(&config.container_name)? {
        println!(
            "Removing existing container {}...",
            config.container_name
        );
        // Failures here are deliberately discarded: "already stopped" and
        // "already removed" both leave the name free, which is all the run
        // step needs.
        let _ = DockerCli::stop(&config.container_name);
        let _ = DockerCli::remove(&config.container_name);
    }

    Ok(())
}
