//! osrs-shell - an interactive shell for the osrs CLI, in the browser
//!
//! A REPL inside an xterm.js terminal: each line typed is split into a
//! command name and arguments, handed to an asynchronous backend, and the
//! backend's output is written back before the prompt returns. The terminal
//! is refitted to its container whenever the window settles after a resize.
//!
//! Host support:
//! - Browser (wasm32-unknown-unknown): xterm.js, window timers, JS backend
//! - Native: headless terminal on stdin/stdout, subprocess backend

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod host;
pub mod shell;

pub use config::ShellConfig;
pub use error::{ShellError, ShellResult};

/// Initialize panic hook for better error messages in browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Start a shell in the element with id `element_id`.
///
/// `backend` is called as `backend(name, args)` for every command and may
/// return a string or a promise of one; a thrown error or rejected promise
/// is shown as an error line. `config` is an optional `ShellConfig` object.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = startShell)]
pub fn start_shell(
    element_id: &str,
    backend: js_sys::Function,
    config: JsValue,
) -> Result<host::web::ShellHandle, JsValue> {
    host::web::start(element_id, backend, config).map_err(|e| {
        web_sys::console::error_1(&format!("[shell] start failed: {}", e).into());
        JsValue::from(e)
    })
}

/// Console logging helper
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Log to browser console (WASM)
#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::log(&format!($($t)*))
    };
}

/// Log to stderr (native)
#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        eprintln!($($t)*)
    };
}
