use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use common::display::node_title;
use common::mirror::{MirrorError, NodeId, TreeMirror};
use common::ExplorerError;

use crate::cli::op::ConnectError;

const INDENT: &str = "  ";

#[derive(Args, Debug, Clone)]
pub struct Tree {
    /// Absolute path to start from
    #[arg(default_value = "/")]
    pub path: String,

    /// How many levels below the path to expand
    #[arg(long, default_value = "2")]
    pub depth: usize,
}

#[derive(Debug)]
pub struct TreeOutput {
    pub path: String,
    /// `(depth, title)` in display order
    pub lines: Vec<(usize, String)>,
}

impl TreeOutput {
    /// The already-expanded subtree below `id`
    pub fn collect(mirror: &TreeMirror, id: NodeId) -> Result<Self, MirrorError> {
        let path = mirror.node(id)?.path().to_string();
        let lines = mirror
            .visible(id)
            .into_iter()
            .map(|(child, depth)| mirror.node(child).map(|n| (depth, node_title(n))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { path, lines })
    }
}

impl fmt::Display for TreeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.bold())?;
        for (depth, title) in &self.lines {
            write!(f, "\n{}{}", INDENT.repeat(depth + 1), title)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("{0}")]
    Connect(#[from] ConnectError),
    #[error("{0}")]
    Explorer(#[from] ExplorerError),
    #[error("{0}")]
    Mirror(#[from] MirrorError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Tree {
    type Error = TreeError;
    type Output = TreeOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.connect().await?;
        let explorer = session.explorer_mut();

        let id = explorer.resolve(&self.path).await?;
        explorer.expand_to_depth(id, self.depth).await?;

        Ok(TreeOutput::collect(explorer.mirror(), id)?)
    }
}
