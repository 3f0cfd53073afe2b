//! Command execution backend
//!
//! The shell does not know what any command does. Each invocation's name and
//! arguments are passed through unchanged to a `Backend`, which eventually
//! produces the command's output or a failure description.

use futures::future::LocalBoxFuture;
use thiserror::Error;

/// Why a command failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The backend rejected the command
    #[error("{0}")]
    Failed(String),
    /// The backend resolved with a value that is not text
    #[error("command produced non-text output: {0}")]
    NonStringOutput(String),
}

impl CommandError {
    pub fn failed(description: impl Into<String>) -> Self {
        Self::Failed(description.into())
    }
}

/// Result of one command execution
pub type CommandResult = Result<String, CommandError>;

/// An asynchronous command executor.
///
/// The returned future must not borrow from the arguments: the dispatcher
/// awaits it while the rest of the session keeps running.
pub trait Backend {
    fn execute(&self, name: &str, args: &[String]) -> LocalBoxFuture<'static, CommandResult>;
}

/// Runs `<program> <name> <args...>` as a child process.
///
/// Used by the native CLI. The process runs to completion before the future
/// is returned, which is fine for a line-mode terminal.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    program: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl ProcessBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Backend for ProcessBackend {
    fn execute(&self, name: &str, args: &[String]) -> LocalBoxFuture<'static, CommandResult> {
        use futures::FutureExt;

        let result = std::process::Command::new(&self.program)
            .arg(name)
            .args(args)
            .output()
            .map_err(|e| CommandError::failed(format!("{}: {}", self.program, e)))
            .and_then(|output| {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let stderr = stderr.trim_end();
                    if stderr.is_empty() {
                        Err(CommandError::failed(format!("{} exited with {}", name, output.status)))
                    } else {
                        Err(CommandError::failed(stderr))
                    }
                }
            });

        futures::future::ready(result).boxed_local()
    }
}
