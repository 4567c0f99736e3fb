use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use zkview::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Servers;

#[derive(Debug)]
pub struct ServersOutput {
    pub servers_path: PathBuf,
    pub entries: Vec<String>,
}

impl fmt::Display for ServersOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            "Recent servers".bold(),
            format!("({})", self.servers_path.display()).dimmed()
        )?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i == 0 {
                write!(f, "  {} {}", entry.green(), "(most recent)".dimmed())?;
            } else {
                write!(f, "\n  {}", entry)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServersError {
    #[error("state error: {0}")]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Servers {
    type Error = ServersError;
    type Output = ServersOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let servers = state.load_servers();

        Ok(ServersOutput {
            entries: servers.entries().to_vec(),
            servers_path: state.servers_path,
        })
    }
}
