use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Installation mode. Anything other than these two literals is rejected by
/// clap before any external command runs.
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Run Agent Zero as a Docker container
    Docker,
    /// Clone the repository and run Agent Zero from a Python virtualenv
    Native,
}

#[derive(Parser, Debug)]
#[command(name = "a0-install")]
#[command(about = "Install and run Agent Zero as a Docker container or a native Python app", long_about = None)]
#[command(version = env!("A0_INSTALL_VERSION"))]
#[command(after_help = "\
EXAMPLES:
  a0-install                                 Docker install with defaults
  a0-install --port 50080 --data-dir /srv/a0 Docker install, custom port and data dir
  a0-install --mode native --dir ~/agent-zero
                                             Native install into ~/agent-zero

Re-running is safe in both modes: completed steps are detected and skipped
or refreshed rather than repeated.")]
pub struct Cli {
    /// Installation mode
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Install/clone target directory (native mode) [default: ~/agent-zero]
    #[arg(long = "dir")]
    pub dir: Option<String>,

    /// Host directory mounted as the container's data volume (docker mode)
    /// [default: ~/agent0_data]
    #[arg(long = "data-dir")]
    pub data_dir: Option<String>,

    /// Host port: mapped to container port 80 (docker) or used as the UI
    /// bind port (native)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// UI bind address (native mode)
    #[arg(long)]
    pub host: Option<String>,

    /// Container name (docker mode)
    #[arg(long)]
    pub name: Option<String>,

    /// TOML config file overriding the built-in defaults
    #[arg(long, env = "A0_INSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the underlying package-manager and container-runtime output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
