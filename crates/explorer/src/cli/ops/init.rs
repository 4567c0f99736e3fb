use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use zkview::state::{AppConfig, AppState, StateError};

use super::get::RenderMode;

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Session timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub session_timeout_ms: u64,

    /// Connection timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub connection_timeout_ms: u64,

    /// Auto-expand children named `/` (for trees served by old fixtures)
    #[arg(long)]
    pub legacy_bootstrap_root: bool,

    /// Default render mode for values
    #[arg(long, value_enum, default_value_t = RenderMode::Auto)]
    pub value_mode: RenderMode,

    /// Default render mode for paths
    #[arg(long, value_enum, default_value_t = RenderMode::Auto)]
    pub path_mode: RenderMode,
}

#[derive(Debug)]
pub struct InitOutput {
    pub zkview_dir: PathBuf,
    pub config_path: PathBuf,
    pub servers_path: PathBuf,
    pub config: AppConfig,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} zkview at {}",
            "Initialized".green().bold(),
            self.zkview_dir.display().to_string().bold()
        )?;
        writeln!(f, "  {} {}", "Config:".dimmed(), self.config_path.display())?;
        writeln!(f, "  {} {}", "Servers:".dimmed(), self.servers_path.display())?;
        writeln!(
            f,
            "  {} {} ms",
            "Session timeout:".dimmed(),
            self.config.session_timeout_ms
        )?;
        writeln!(
            f,
            "  {} {} ms",
            "Connection timeout:".dimmed(),
            self.config.connection_timeout_ms
        )?;
        write!(
            f,
            "  {} path={} value={}",
            "Render modes:".dimmed(),
            self.config.path_mode,
            self.config.value_mode
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            session_timeout_ms: self.session_timeout_ms,
            connection_timeout_ms: self.connection_timeout_ms,
            legacy_bootstrap_root: self.legacy_bootstrap_root,
            value_mode: self.value_mode.into(),
            path_mode: self.path_mode.into(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(InitOutput {
            zkview_dir: state.zkview_dir,
            config_path: state.config_path,
            servers_path: state.servers_path,
            config: state.config,
        })
    }
}
