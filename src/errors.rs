//! Shell error taxonomy.
//!
//! Every command outcome is either `Ok(())` or one of these classified
//! failures. `main` maps them onto the process exit status.

use thiserror::Error;

use crate::client::ClientError;

/// Exit status for usage problems (unknown command, bad arguments).
pub const EXIT_USAGE: i32 = 2;
/// Exit status for everything else that went wrong.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("unknown command '{name}'{}", suggestion_suffix(.suggestions))]
    UnknownCommand {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("{command}: {message}\nusage: {usage}")]
    ArgumentError {
        command: String,
        message: String,
        usage: String,
    },

    #[error("passwords do not match")]
    ConfirmationMismatch,

    #[error("{context}: {source}")]
    RemoteFault {
        context: String,
        #[source]
        source: ClientError,
    },

    #[error("invalid command declaration '{command}': {message}")]
    Registry { command: String, message: String },

    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;

impl ShellError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::UnknownCommand { .. } | ShellError::ArgumentError { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("\n\nDid you mean {}?", suggestions.join(", "))
    }
}

/// Attach a short description of the attempted operation to a client failure.
pub trait RemoteContext<T> {
    fn remote(self, context: impl Into<String>) -> ShellResult<T>;
}

impl<T> RemoteContext<T> for Result<T, ClientError> {
    fn remote(self, context: impl Into<String>) -> ShellResult<T> {
        self.map_err(|source| ShellError::RemoteFault {
            context: context.into(),
            source,
        })
    }
}
