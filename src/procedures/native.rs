use crate::apt::{self, AptGet};
use crate::config::{self, Config};
use crate::error::{InstallerError, Result};
use crate::python::Venv;
use crate::utils::{git, net};
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Native libraries and tools the Python dependencies link against or shell
/// out to: build toolchain and headers, media/OCR/PDF/graphics/audio shared
/// libraries, and the shared libraries Chromium's sandbox needs.
const HOST_PACKAGES: &[&str] = &[
    "ca-certificates",
    "git",
    "build-essential",
    "python3-dev",
    "python3-venv",
    "ffmpeg",
    "tesseract-ocr",
    "poppler-utils",
    "libgl1",
    "libglib2.0-0",
    "libasound2",
    "libnss3",
    "libnspr4",
    "libatk1.0-0",
    "libatk-bridge2.0-0",
    "libcups2",
    "libdrm2",
    "libxkbcommon0",
    "libxcomposite1",
    "libxdamage1",
    "libxfixes3",
    "libxrandr2",
    "libgbm1",
    "libpango-1.0-0",
    "libcairo2",
];

/// How long the launch step watches the backgrounded UI for an immediate
/// crash before declaring success.
const EARLY_EXIT_WINDOW: Duration = Duration::from_millis(1500);

/// Native procedure: install host packages, sync the repository, build or
/// reuse the virtualenv, install Python dependencies and the browser
/// engine, then background the UI.
pub fn execute(config: &Config) -> Result<()> {
    check_prereqs()?;
    install_host_deps(config)?;
    sync_repo(config)?;

    let venv = Venv::ensure(&config.venv_dir(), config.verbose)?;
    venv.upgrade_pip(config.verbose)?;

    install_python_deps(config, &venv)?;

    println!("Installing Chromium for browser automation...");
    venv.playwright_install_chromium(config.verbose)?;

    launch_ui(config, &venv)?;

    let ip = net::primary_host_ip().unwrap_or_else(|| config.host.clone());
    println!();
    println!("Agent Zero UI launched.");
    println!("Log file: {}", config.log_path().display());
    println!("UI:       http://{}:{}", ip, config.port);

    Ok(())
}

/// Everything the install steps shell out to must exist up front; there is
/// no point installing half the host packages and then failing.
fn check_prereqs() -> Result<()> {
    let mut required = vec!["apt-get", "python3"];
    if !apt::running_as_root() {
        required.push("sudo");
    }

    for binary in required {
        if which::which(binary).is_err() {
            return Err(InstallerError::MissingPrerequisite(binary.to_string()));
        }
    }

    Ok(())
}

fn install_host_deps(config: &Config) -> Result<()> {
    println!("Installing host packages...");
    AptGet::update(config.verbose)?;
    AptGet::install(HOST_PACKAGES, config.verbose)
}

/// Clone fresh, or fast-forward an existing checkout. Divergent history is
/// git's refusal to surface, not ours to merge away.
fn sync_repo(config: &Config) -> Result<()> {
    if git::is_repo(&config.install_dir) {
        println!(
            "Updating existing checkout at {}...",
            config.install_dir.display()
        );
        git::pull_ff_only(&config.install_dir, config.verbose)
    } else {
        println!(
            "Cloning Agent Zero into {}...",
            config.install_dir.display()
        );
        git::clone(config::REPO_URL, &config.install_dir, config.verbose)
    }
}

fn install_python_deps(config: &Config, venv: &Venv) -> Result<()> {
    let manifest = config.requirements_path();
    if !manifest.is_file() {
        return Err(InstallerError::ManifestNotFound(manifest));
    }

    println!("Installing Python dependencies...");
    venv.pip_install_requirements(&manifest, config.verbose)
}

/// Background the UI in its own process group, output to the log file. The
/// launch is fire-and-forget: success is reported as soon as the process is
/// spawned. The one thing checked is an immediate exit, which almost always
/// means a startup crash worth pointing at the log for.
fn launch_ui(config: &Config, venv: &Venv) -> Result<()> {
    let log_path = config.log_path();
    let log = File::create(&log_path)?;
    let log_err = log.try_clone()?;

    println!(
        "Launching UI on {}:{} (log: {})...",
        config.host,
        config.port,
        log_path.display()
    );

    let mut child = Command::new(venv.python())
        .arg(config::UI_ENTRYPOINT)
        .args(["--host", &config.host])
        .args(["--port", &config.port.to_string()])
        .current_dir(&config.install_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .process_group(0)
        .spawn()
        .map_err(|e| InstallerError::CommandFailed(format!("Failed to launch UI: {}", e)))?;

    if let Some(status) = child.wait_timeout(EARLY_EXIT_WINDOW)? {
        eprintln!(
            "Warning: UI process exited immediately ({}). Check {}",
            status,
            log_path.display()
        );
    }

    // The child is not waited on further; it outlives this process.
    Ok(())
}
