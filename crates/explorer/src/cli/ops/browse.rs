//! Interactive shell over a single session
//!
//! Each input line is one command. Paths may be absolute or relative to
//! the current node, and `..` walks up. Everything after the command word
//! is taken as the argument, so node names containing spaces or query
//! characters need no quoting.

use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use common::content::ContentMode;
use common::mirror::{MirrorError, NodeId};
use common::path::{self, ROOT};
use common::ExplorerError;
use zkview::{SessionError, SessionManager};

use super::get::GetOutput;
use super::ls::LsOutput;
use super::tree::TreeOutput;
use crate::cli::op::ConnectError;

const HELP: &str = "\
Commands:
  ls [PATH]             list the children of PATH
  cd PATH               change the current node
  get [PATH]            refresh and show a node
  expand [PATH]         load the children of PATH
  tree [PATH]           show the loaded subtree below PATH
  refresh               reload the tree from the root
  connect [ADDR]        switch to another server
  mode [path|value MODE] show or set a render mode (auto, raw, json, url)
  pwd                   print the current path
  help                  show this help
  quit                  leave the shell";

#[derive(Args, Debug, Clone)]
pub struct Browse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Path,
    Value,
}

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Ls(Option<String>),
    Cd(String),
    Get(Option<String>),
    Expand(Option<String>),
    Tree(Option<String>),
    Refresh,
    Connect(Option<String>),
    Mode(Option<(Pane, ContentMode)>),
    Pwd,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ShellCommand {
    /// Parse a line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word {
            "ls" => ShellCommand::Ls(arg),
            "cd" => ShellCommand::Cd(arg.ok_or(ParseError::MissingArgument("PATH"))?),
            "get" | "cat" => ShellCommand::Get(arg),
            "expand" => ShellCommand::Expand(arg),
            "tree" => ShellCommand::Tree(arg),
            "refresh" => ShellCommand::Refresh,
            "connect" => ShellCommand::Connect(arg),
            "mode" => ShellCommand::Mode(parse_mode(rest)?),
            "pwd" => ShellCommand::Pwd,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_mode(rest: &str) -> Result<Option<(Pane, ContentMode)>, ParseError> {
    let mut words = rest.split_whitespace();
    let Some(pane) = words.next() else {
        return Ok(None);
    };
    let pane = match pane {
        "path" => Pane::Path,
        "value" => Pane::Value,
        other => return Err(ParseError::InvalidArgument(other.to_string())),
    };
    let mode = words
        .next()
        .ok_or(ParseError::MissingArgument("MODE"))?
        .parse::<ContentMode>()
        .map_err(|e| ParseError::InvalidArgument(e.to_string()))?;
    Ok(Some((pane, mode)))
}

/// Resolve `arg` against `cwd`, handling `.` and `..`
pub fn resolve_relative(cwd: &str, arg: &str) -> String {
    let mut current = if arg.starts_with('/') {
        ROOT.to_string()
    } else {
        cwd.to_string()
    };
    for segment in path::segments(arg) {
        match segment {
            "." => {}
            ".." => current = path::parent_path(&current).to_string(),
            name => current = path::join_path(&current, name),
        }
    }
    current
}

/// What the shell should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Silent,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Shell state: the session, the current node and the render modes
#[derive(Debug)]
pub struct Shell {
    session: SessionManager,
    cwd: String,
    path_mode: ContentMode,
    value_mode: ContentMode,
    commands_run: usize,
}

impl Shell {
    pub fn new(session: SessionManager) -> Self {
        let config = &session.state().config;
        let (path_mode, value_mode) = (config.path_mode, config.value_mode);
        Self {
            session,
            cwd: ROOT.to_string(),
            path_mode,
            value_mode,
            commands_run: 0,
        }
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn commands_run(&self) -> usize {
        self.commands_run
    }

    pub fn prompt(&self) -> String {
        let address = self.session.explorer().address().unwrap_or("disconnected");
        format!("{}:{}> ", address, self.cwd)
    }

    pub async fn run(&mut self, command: ShellCommand) -> Result<Reply, ShellError> {
        self.commands_run += 1;
        match command {
            ShellCommand::Ls(arg) => {
                let id = self.resolve(arg.as_deref()).await?;
                let explorer = self.session.explorer_mut();
                explorer.expand(id).await?;
                let output = LsOutput::collect(explorer.mirror(), id)?;
                Ok(Reply::Text(output.to_string()))
            }
            ShellCommand::Cd(arg) => {
                let id = self.resolve(Some(&arg)).await?;
                self.cwd = self.session.explorer().mirror().node(id)?.path().to_string();
                Ok(Reply::Silent)
            }
            ShellCommand::Get(arg) => {
                let id = self.resolve(arg.as_deref()).await?;
                let (path_mode, value_mode) = (self.path_mode, self.value_mode);
                let record = self.session.explorer_mut().refresh_leaf(id).await?;
                let output = GetOutput::render(record, path_mode, value_mode, true);
                Ok(Reply::Text(output.to_string()))
            }
            ShellCommand::Expand(arg) => {
                let id = self.resolve(arg.as_deref()).await?;
                let explorer = self.session.explorer_mut();
                explorer.expand(id).await?;
                let node = explorer.mirror().node(id)?;
                Ok(Reply::Text(format!(
                    "Expanded {} ({} children)",
                    node.path(),
                    node.children().len()
                )))
            }
            ShellCommand::Tree(arg) => {
                let id = self.resolve(arg.as_deref()).await?;
                let output = TreeOutput::collect(self.session.explorer().mirror(), id)?;
                Ok(Reply::Text(output.to_string()))
            }
            ShellCommand::Refresh => {
                self.session.explorer_mut().refresh_root().await?;
                self.cwd = ROOT.to_string();
                Ok(Reply::Text("Refreshed".to_string()))
            }
            ShellCommand::Connect(address) => {
                let result = self.session.connect(address.as_deref()).await;
                if !matches!(result, Err(SessionError::Connect(_))) {
                    self.cwd = ROOT.to_string();
                }
                result?;
                let address = self.session.explorer().address().unwrap_or_default();
                Ok(Reply::Text(format!("Connected to {}", address)))
            }
            ShellCommand::Mode(None) => Ok(Reply::Text(format!(
                "path: {}\nvalue: {}",
                self.path_mode, self.value_mode
            ))),
            ShellCommand::Mode(Some((pane, mode))) => {
                match pane {
                    Pane::Path => self.path_mode = mode,
                    Pane::Value => self.value_mode = mode,
                }
                Ok(Reply::Silent)
            }
            ShellCommand::Pwd => Ok(Reply::Text(self.cwd.clone())),
            ShellCommand::Help => Ok(Reply::Text(HELP.to_string())),
            ShellCommand::Quit => Ok(Reply::Quit),
        }
    }

    async fn resolve(&mut self, arg: Option<&str>) -> Result<NodeId, ShellError> {
        let target = resolve_relative(&self.cwd, arg.unwrap_or("."));
        Ok(self.session.explorer_mut().resolve(&target).await?)
    }
}

#[derive(Debug)]
pub struct BrowseOutput {
    pub address: Option<String>,
    pub commands_run: usize,
}

impl fmt::Display for BrowseOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} after {} commands",
            "Closed session with".dimmed(),
            self.address.as_deref().unwrap_or("no server"),
            self.commands_run
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("{0}")]
    Connect(#[from] ConnectError),
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Browse {
    type Error = BrowseError;
    type Output = BrowseOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.connect().await?;
        let mut shell = Shell::new(session);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{}\n", "Type `help` for commands.".dimmed()).as_bytes())
            .await?;

        loop {
            stdout.write_all(shell.prompt().as_bytes()).await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    continue;
                }
            };

            match shell.run(command).await {
                Ok(Reply::Text(text)) => stdout.write_all(format!("{text}\n").as_bytes()).await?,
                Ok(Reply::Silent) => {}
                Ok(Reply::Quit) => break,
                Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
            }
        }

        Ok(BrowseOutput {
            address: shell.session.explorer().address().map(str::to_string),
            commands_run: shell.commands_run(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::remote::{MemoryConnector, MemoryNamespace};
    use zkview::AppState;

    async fn shell(dir: &tempfile::TempDir) -> Shell {
        let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();
        let connector = MemoryConnector::new()
            .with_namespace("zk1:2181", MemoryNamespace::sample())
            .with_namespace("zk2:2181", MemoryNamespace::new());
        let mut session = SessionManager::new(state, Box::new(connector));
        session.connect(Some("zk1:2181")).await.unwrap();
        Shell::new(session)
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(ShellCommand::parse("  "), Ok(None));
        assert_eq!(ShellCommand::parse("# note"), Ok(None));
        assert_eq!(ShellCommand::parse("ls"), Ok(Some(ShellCommand::Ls(None))));
        assert_eq!(
            ShellCommand::parse("cd  Dragon?hello=world&lorem=ipsum "),
            Ok(Some(ShellCommand::Cd("Dragon?hello=world&lorem=ipsum".to_string())))
        );
        assert_eq!(
            ShellCommand::parse("mode value json"),
            Ok(Some(ShellCommand::Mode(Some((Pane::Value, ContentMode::Json)))))
        );
        assert_eq!(ShellCommand::parse("exit"), Ok(Some(ShellCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ShellCommand::parse("cd"),
            Err(ParseError::MissingArgument("PATH"))
        );
        assert_eq!(
            ShellCommand::parse("rm /a"),
            Err(ParseError::Unknown("rm".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("mode path"),
            Err(ParseError::MissingArgument("MODE"))
        );
        assert!(matches!(
            ShellCommand::parse("mode path xml"),
            Err(ParseError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("/", "Animals"), "/Animals");
        assert_eq!(resolve_relative("/Animals", "Monkey/AlphaMonkey"), "/Animals/Monkey/AlphaMonkey");
        assert_eq!(resolve_relative("/Animals/Monkey", ".."), "/Animals");
        assert_eq!(resolve_relative("/Animals", "../Fruits"), "/Fruits");
        assert_eq!(resolve_relative("/Animals", "/Fruits/./Apple"), "/Fruits/Apple");
        assert_eq!(resolve_relative("/", ".."), "/");
        assert_eq!(resolve_relative("/Animals", "."), "/Animals");
    }

    #[tokio::test]
    async fn test_cd_and_pwd() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;

        assert_eq!(
            shell.run(ShellCommand::Cd("Animals/Monkey".to_string())).await.unwrap(),
            Reply::Silent
        );
        assert_eq!(text(shell.run(ShellCommand::Pwd).await.unwrap()), "/Animals/Monkey");

        shell.run(ShellCommand::Cd("..".to_string())).await.unwrap();
        assert_eq!(shell.cwd(), "/Animals");
        assert_eq!(shell.prompt(), "zk1:2181:/Animals> ");
    }

    #[tokio::test]
    async fn test_cd_missing_node_keeps_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;

        let err = shell
            .run(ShellCommand::Cd("/Animals/Unicorn".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShellError::Explorer(ExplorerError::Mirror(MirrorError::PathNotFound(_)))
        ));
        assert_eq!(shell.cwd(), "/");
    }

    #[tokio::test]
    async fn test_ls_lists_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;

        let out = text(shell.run(ShellCommand::Ls(Some("/Animals".to_string()))).await.unwrap());
        assert!(out.contains("Dolphin"));
        assert!(out.contains("Monkey [3]"));
        assert!(out.contains("This is a dolphin"));
    }

    #[tokio::test]
    async fn test_get_renders_with_modes() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;
        shell
            .run(ShellCommand::Cd("/Animals/Dragon?hello=world&lorem=ipsum&foo=bar".to_string()))
            .await
            .unwrap();

        let out = text(shell.run(ShellCommand::Get(None)).await.unwrap());
        assert!(out.contains("/Animals/Dragon\n    hello = world"));
        assert!(out.contains("    \"lorem\": \"ipsum\""));
        assert!(out.contains("numChildren: 0"));

        shell
            .run(ShellCommand::Mode(Some((Pane::Value, ContentMode::Raw))))
            .await
            .unwrap();
        let out = text(shell.run(ShellCommand::Get(None)).await.unwrap());
        assert!(out.contains(r#"{"hello": "world", "lorem": "ipsum", "foo": "bar"}"#));
    }

    #[tokio::test]
    async fn test_expand_then_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;

        let out = text(shell.run(ShellCommand::Expand(Some("/Fruits".to_string()))).await.unwrap());
        assert_eq!(out, "Expanded /Fruits (4 children)");

        let out = text(shell.run(ShellCommand::Tree(None)).await.unwrap());
        assert!(out.contains("\n    Apple"));
        assert!(out.contains("\n  Vegetables [5]"));
        assert!(!out.contains("Broccoli"));
    }

    #[tokio::test]
    async fn test_connect_switches_and_resets_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;
        shell.run(ShellCommand::Cd("/Animals".to_string())).await.unwrap();

        let out = text(shell.run(ShellCommand::Connect(Some("zk2".to_string()))).await.unwrap());
        assert_eq!(out, "Connected to zk2:2181");
        assert_eq!(shell.cwd(), "/");

        let out = text(shell.run(ShellCommand::Ls(None)).await.unwrap());
        assert!(out.contains("/ has no children"));
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;
        shell.run(ShellCommand::Cd("/Animals".to_string())).await.unwrap();

        assert!(shell
            .run(ShellCommand::Connect(Some("zk9".to_string())))
            .await
            .is_err());
        assert_eq!(shell.cwd(), "/Animals");
        assert_eq!(shell.prompt(), "zk1:2181:/Animals> ");
    }

    #[tokio::test]
    async fn test_mode_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(&dir).await;

        shell
            .run(ShellCommand::Mode(Some((Pane::Path, ContentMode::Url))))
            .await
            .unwrap();
        let out = text(shell.run(ShellCommand::Mode(None)).await.unwrap());
        assert_eq!(out, "path: url\nvalue: auto");

        assert_eq!(shell.run(ShellCommand::Quit).await.unwrap(), Reply::Quit);
        assert_eq!(shell.commands_run(), 3);
    }
}
