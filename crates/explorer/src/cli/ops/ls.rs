use std::fmt;

use clap::Args;
use comfy_table::Table;
use owo_colors::OwoColorize;

use common::display::TreeRow;
use common::mirror::{MirrorError, NodeId, TreeMirror};
use common::ExplorerError;

use crate::cli::op::ConnectError;

/// Longest value preview shown in a listing
const VALUE_PREVIEW_CHARS: usize = 48;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Absolute path to list
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Debug)]
pub struct LsOutput {
    pub path: String,
    pub rows: Vec<TreeRow>,
}

impl LsOutput {
    /// Rows for the materialized children of `id`
    pub fn collect(mirror: &TreeMirror, id: NodeId) -> Result<Self, MirrorError> {
        let node = mirror.node(id)?;
        let rows = node
            .children()
            .iter()
            .map(|child| mirror.node(*child).map(TreeRow::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path: node.path().to_string(),
            rows,
        })
    }
}

fn preview(value: &str) -> String {
    let line = value.lines().next().unwrap_or_default();
    if line.chars().count() > VALUE_PREVIEW_CHARS || value.contains('\n') {
        let cut: String = line.chars().take(VALUE_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

impl fmt::Display for LsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "{}", format!("{} has no children", self.path).dimmed());
        }

        let mut table = Table::new();
        table.set_header(vec!["NAME", "CREATED", "UPDATED", "VALUE"]);
        for row in &self.rows {
            table.add_row(vec![
                row.title.clone(),
                row.created.clone(),
                row.updated.clone(),
                preview(&row.value),
            ]);
        }
        write!(f, "{table}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("{0}")]
    Connect(#[from] ConnectError),
    #[error("{0}")]
    Explorer(#[from] ExplorerError),
    #[error("{0}")]
    Mirror(#[from] MirrorError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = LsOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.connect().await?;
        let explorer = session.explorer_mut();

        let id = explorer.resolve(&self.path).await?;
        explorer.expand(id).await?;

        Ok(LsOutput::collect(explorer.mirror(), id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("{\n    \"a\": 1\n}"), "{...");
        let long = "x".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(48)));
    }

    #[test]
    fn test_empty_listing() {
        let output = LsOutput {
            path: "/a".to_string(),
            rows: Vec::new(),
        };
        assert!(output.to_string().contains("/a has no children"));
    }
}
