//! Session setup errors
//!
//! Command failures never reach here: they are rendered in the terminal by
//! the dispatcher. These are the errors that stop a session from starting.

use crate::host::HostError;
use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("no element with id '{0}'")]
    MissingElement(String),
    #[error("{0}")]
    Host(#[from] HostError),
}

#[cfg(target_arch = "wasm32")]
impl From<ShellError> for wasm_bindgen::JsValue {
    fn from(err: ShellError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
