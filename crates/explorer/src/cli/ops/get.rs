use std::fmt;

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;

use common::content::{self, ContentKind, ContentMode};
use common::display::{detail_block, detail_block_full};
use common::mirror::NodeRecord;
use common::ExplorerError;

use crate::cli::op::ConnectError;

/// Render mode for CLI selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// Detect JSON or URL query, else raw
    #[default]
    Auto,
    /// Text as stored
    Raw,
    /// Pretty-printed JSON
    Json,
    /// Path plus one decoded `key=value` line per pair
    #[value(alias = "query")]
    Url,
}

impl From<RenderMode> for ContentMode {
    fn from(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Auto => ContentMode::Auto,
            RenderMode::Raw => ContentMode::Raw,
            RenderMode::Json => ContentMode::Json,
            RenderMode::Url => ContentMode::Url,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Absolute path of the node
    pub path: String,

    /// Render the value in this mode instead of the configured one
    #[arg(long, value_enum)]
    pub value_as: Option<RenderMode>,

    /// Render the path in this mode instead of the configured one
    #[arg(long, value_enum)]
    pub path_as: Option<RenderMode>,

    /// Include data length and child count
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug)]
pub struct GetOutput {
    pub detail: String,
    pub path_kind: ContentKind,
    pub path: String,
    pub value_kind: ContentKind,
    pub value: String,
}

impl GetOutput {
    pub fn render(
        record: &NodeRecord,
        path_mode: ContentMode,
        value_mode: ContentMode,
        full: bool,
    ) -> Self {
        let raw_value = String::from_utf8_lossy(record.value());
        let detail = if full {
            detail_block_full(record.stat())
        } else {
            detail_block(record.stat())
        };

        Self {
            detail,
            path_kind: path_mode.resolve(record.path()),
            path: content::render(record.path(), path_mode),
            value_kind: value_mode.resolve(&raw_value),
            value: content::render_value(record.value(), value_mode),
        }
    }
}

impl fmt::Display for GetOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.detail.dimmed())?;
        writeln!(f)?;
        writeln!(f, "{} {}", "Path".bold(), format!("({})", self.path_kind).dimmed())?;
        writeln!(f, "{}", self.path)?;
        writeln!(f)?;
        writeln!(f, "{} {}", "Value".bold(), format!("({})", self.value_kind).dimmed())?;
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("{0}")]
    Connect(#[from] ConnectError),
    #[error("{0}")]
    Explorer(#[from] ExplorerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = GetOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.connect().await?;
        let config = &session.state().config;
        let path_mode = self.path_as.map_or(config.path_mode, ContentMode::from);
        let value_mode = self.value_as.map_or(config.value_mode, ContentMode::from);

        let explorer = session.explorer_mut();
        let id = explorer.resolve(&self.path).await?;
        let record = explorer.refresh_leaf(id).await?;

        Ok(GetOutput::render(record, path_mode, value_mode, self.full))
    }
}
