use std::path::PathBuf;

use clap::Parser;

pub mod op;
pub mod ops;

use ops::{Browse, Get, Init, Ls, Servers, Tree, Version};

crate::command_enum! {
    (Init, Init),
    (Ls, Ls),
    (Get, Get),
    (Tree, Tree),
    (Servers, Servers),
    (Browse, Browse),
    (Version, Version),
}

#[derive(Parser, Debug)]
#[command(name = "zkview", version, about = "Browse ZooKeeper namespaces from the terminal")]
pub struct Cli {
    /// State directory (defaults to ~/.zkview)
    #[arg(long, global = true, env = "ZKVIEW_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Server address as host[:port] (defaults to the most recent server)
    #[arg(short, long, global = true, env = "ZKVIEW_SERVER")]
    pub server: Option<String>,

    /// Browse the built-in sample tree instead of a live server
    #[arg(long, global = true)]
    pub demo: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}
