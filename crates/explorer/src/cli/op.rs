use std::fmt;
use std::path::PathBuf;

use zkview::{connector_for, AppState, SessionError, SessionManager, StateError};

/// Context shared by every command: the global flags
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// Custom state directory (defaults to ~/.zkview)
    pub config_path: Option<PathBuf>,
    /// Server to connect to (defaults to the most recent one)
    pub server: Option<String>,
    /// Serve the built-in sample tree instead of a live server
    pub demo: bool,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, server: Option<String>, demo: bool) -> Self {
        Self {
            config_path,
            server,
            demo,
        }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Load state and connect to the selected server
    pub async fn connect(&self) -> Result<SessionManager, ConnectError> {
        let state = self.state()?;
        let connector = connector_for(&state, self.demo);
        let mut session = SessionManager::new(state, connector);
        session.connect(self.server.as_deref()).await?;
        Ok(session)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("connection failed: {0}")]
    Session(#[from] SessionError),
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: fmt::Display + fmt::Debug + Send;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Generate a clap subcommand enum over a list of ops, plus the output and
/// error enums that wrap each op's own
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $op:ty)),* $(,)?) => {
        #[derive(clap::Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($op),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$op as $crate::cli::op::Op>::Output),)*
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(OpOutput::$variant(output) => write!(f, "{}", output),)*
                }
            }
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$op as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Error = OpError;
            type Output = OpOutput;

            async fn execute(
                &self,
                ctx: &$crate::cli::op::OpContext,
            ) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => op
                            .execute(ctx)
                            .await
                            .map(OpOutput::$variant)
                            .map_err(OpError::$variant),
                    )*
                }
            }
        }
    };
}
