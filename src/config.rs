use crate::cli::{Cli, Mode};
use crate::error::{InstallerError, Result};
use crate::utils::path::expand_tilde;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Image pulled in docker mode. The tag is fixed; pinning to a specific
/// release is the upstream project's job, not this installer's.
pub const IMAGE: &str = "frdel/agent-zero-run:latest";

/// Port the image's web UI listens on inside the container.
pub const CONTAINER_PORT: u16 = 80;

/// In-container path the data volume is mounted at.
pub const CONTAINER_DATA_DIR: &str = "/a0";

/// Upstream repository cloned in native mode.
pub const REPO_URL: &str = "https://github.com/frdel/agent-zero";

/// Virtualenv subdirectory inside the install directory.
pub const VENV_DIR: &str = ".venv";

/// Python dependency manifest expected at the repository root.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// UI entrypoint script at the repository root.
pub const UI_ENTRYPOINT: &str = "run_ui.py";

/// Combined stdout/stderr of the backgrounded UI, inside the install dir.
pub const UI_LOG_FILE: &str = "agent0-ui.log";

/// Optional config file looked up in $HOME when --config is not given.
const DEFAULT_CONFIG_FILE: &str = ".a0-install.toml";

const DEFAULT_PORT: u16 = 50001;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_CONTAINER_NAME: &str = "agent-zero";
const DEFAULT_INSTALL_DIR: &str = "agent-zero";
const DEFAULT_DATA_DIR: &str = "agent0_data";

/// Optional TOML overrides. Every field defaults to "not set"; anything set
/// here is still overridden by the matching CLI flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<Mode>,
    pub dir: Option<String>,
    pub data_dir: Option<String>,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub name: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            InstallerError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Fully resolved, immutable run configuration.
///
/// Built exactly once by [`Config::resolve`] from defaults, the optional
/// config file and the CLI flags, in that precedence order. Process-global
/// state ($HOME, the invoking user) is captured here so no later step has
/// to reach into the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub install_dir: PathBuf,
    pub data_dir: PathBuf,
    pub port: u16,
    pub host: String,
    pub container_name: String,
    pub verbose: bool,
    pub home: PathBuf,
    pub user: String,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| InstallerError::InvalidConfig("HOME is not set".to_string()))?;

        let user = uzers::get_current_username()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        let file = Self::load_file_layer(cli, &home)?;

        let install_dir = match cli.dir.as_deref().or(file.dir.as_deref()) {
            Some(dir) => resolve_dir(dir)?,
            None => home.join(DEFAULT_INSTALL_DIR),
        };
        let data_dir = match cli.data_dir.as_deref().or(file.data_dir.as_deref()) {
            Some(dir) => resolve_dir(dir)?,
            None => home.join(DEFAULT_DATA_DIR),
        };

        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        if port == 0 {
            // CLI values are range-checked by clap; this guards the file layer.
            return Err(InstallerError::InvalidConfig(
                "port must be between 1 and 65535".to_string(),
            ));
        }

        Ok(Self {
            mode: cli.mode.or(file.mode).unwrap_or(Mode::Docker),
            install_dir,
            data_dir,
            port,
            host: cli
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            container_name: cli
                .name
                .clone()
                .or(file.name)
                .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
            verbose: cli.verbose,
            home,
            user,
        })
    }

    /// An explicit --config path must exist and parse; the $HOME fallback is
    /// only read when present.
    fn load_file_layer(cli: &Cli, home: &Path) -> Result<FileConfig> {
        if let Some(path) = &cli.config {
            return FileConfig::load(path);
        }
        let default_path = home.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            return FileConfig::load(&default_path);
        }
        Ok(FileConfig::default())
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir.join(VENV_DIR)
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.install_dir.join(REQUIREMENTS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.install_dir.join(UI_LOG_FILE)
    }

    /// Local access URL printed after a successful docker run.
    pub fn access_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

fn resolve_dir(raw: &str) -> Result<PathBuf> {
    expand_tilde(raw)
        .ok_or_else(|| InstallerError::InvalidConfig(format!("Cannot resolve path: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn resolve_args(args: &[&str]) -> Result<Config> {
        let mut argv = vec!["a0-install"];
        argv.extend_from_slice(args);
        Config::resolve(&Cli::parse_from(argv))
    }

    /// Point $HOME at an empty temp dir so tests never see a real
    /// ~/.a0-install.toml. Serialized because HOME is process-global.
    fn with_temp_home<F: FnOnce(&Path)>(f: F) {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::var("HOME").ok();
        std::env::set_var("HOME", dir.path());
        f(dir.path());
        match original {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults() {
        with_temp_home(|home| {
            let config = resolve_args(&[]).unwrap();

            assert_eq!(config.mode, Mode::Docker);
            assert_eq!(config.install_dir, home.join("agent-zero"));
            assert_eq!(config.data_dir, home.join("agent0_data"));
            assert_eq!(config.port, 50001);
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.container_name, "agent-zero");
            assert!(!config.verbose);
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_flag_overrides() {
        with_temp_home(|_| {
            let config = resolve_args(&[
                "--mode",
                "native",
                "--dir",
                "/tmp/a0src",
                "--data-dir",
                "/tmp/a0",
                "--port",
                "5000",
                "--host",
                "127.0.0.1",
                "--name",
                "a0-test",
            ])
            .unwrap();

            assert_eq!(config.mode, Mode::Native);
            assert_eq!(config.install_dir, PathBuf::from("/tmp/a0src"));
            assert_eq!(config.data_dir, PathBuf::from("/tmp/a0"));
            assert_eq!(config.port, 5000);
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.container_name, "a0-test");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_resolution_is_deterministic() {
        with_temp_home(|_| {
            let args = ["--mode", "docker", "--port", "50080", "--data-dir", "/tmp/a0"];
            let first = resolve_args(&args).unwrap();
            let second = resolve_args(&args).unwrap();
            assert_eq!(first, second);
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_tilde_expansion_in_dirs() {
        with_temp_home(|home| {
            let config = resolve_args(&["--dir", "~/a0"]).unwrap();
            assert_eq!(config.install_dir, home.join("a0"));
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_config_file_layer_and_flag_precedence() {
        with_temp_home(|_| {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "mode = \"native\"\nport = 7777\nhost = \"10.0.0.1\"").unwrap();
            let path = file.path().to_str().unwrap().to_string();

            // File fills in what flags leave unset
            let config = resolve_args(&["--config", &path]).unwrap();
            assert_eq!(config.mode, Mode::Native);
            assert_eq!(config.port, 7777);
            assert_eq!(config.host, "10.0.0.1");

            // Flags beat the file
            let config = resolve_args(&["--config", &path, "--port", "5000"]).unwrap();
            assert_eq!(config.port, 5000);
            assert_eq!(config.host, "10.0.0.1");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_default_config_file_in_home_is_picked_up() {
        with_temp_home(|home| {
            std::fs::write(home.join(".a0-install.toml"), "port = 6060\n").unwrap();
            let config = resolve_args(&[]).unwrap();
            assert_eq!(config.port, 6060);
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_config_file_rejects_bad_mode() {
        with_temp_home(|_| {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "mode = \"podman\"").unwrap();
            let path = file.path().to_str().unwrap().to_string();

            assert!(resolve_args(&["--config", &path]).is_err());
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_config_file_rejects_port_zero() {
        with_temp_home(|_| {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "port = 0").unwrap();
            let path = file.path().to_str().unwrap().to_string();

            assert!(resolve_args(&["--config", &path]).is_err());
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_explicit_config_is_fatal() {
        with_temp_home(|_| {
            assert!(resolve_args(&["--config", "/nonexistent/a0.toml"]).is_err());
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_derived_paths() {
        with_temp_home(|_| {
            let config = resolve_args(&["--dir", "/tmp/a0src", "--port", "5000"]).unwrap();
            assert_eq!(config.venv_dir(), PathBuf::from("/tmp/a0src/.venv"));
            assert_eq!(
                config.requirements_path(),
                PathBuf::from("/tmp/a0src/requirements.txt")
            );
            assert_eq!(config.log_path(), PathBuf::from("/tmp/a0src/agent0-ui.log"));
            assert_eq!(config.access_url(), "http://localhost:5000");
        });
    }

    #[test]
    #[serial_test::serial]
    fn test_access_url_shape() {
        with_temp_home(|_| {
            let config = resolve_args(&["--port", "50080"]).unwrap();
            let re = regex::Regex::new(r"^http://localhost:\d{1,5}$").unwrap();
            assert!(re.is_match(&config.access_url()));
        });
    }
}
