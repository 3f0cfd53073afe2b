//! Shell - the interactive session core
//!
//! A REPL in front of an asynchronous command backend:
//! - Line input and whitespace tokenization
//! - One-at-a-time command dispatch with ordered output
//! - Debounced terminal refits on viewport resize
//!
//! Host-agnostic: the terminal widget and timers come in through `crate::host`.

pub mod backend;
pub mod dispatch;
pub mod line;
pub mod resize;
pub mod session;

pub use backend::{Backend, CommandError, CommandResult};
pub use dispatch::{DispatchLoop, DispatchState, Dispatcher};
pub use line::{parse, CommandInvocation, CommandLine, InputEvent, LineEvent, Submission};
pub use resize::{ResizeReconciler, DEFAULT_QUIET_PERIOD_MS};
pub use session::{DetachHook, ShellSession};

#[cfg(not(target_arch = "wasm32"))]
pub use backend::ProcessBackend;
