//! Host Abstraction Layer
//!
//! The shell core never talks to the browser directly. It sees the terminal
//! widget and the host's timers through the traits below, so the same session
//! runs in the browser and headless:
//!
//! - Browser (via wasm-bindgen, xterm.js, window timers)
//! - Headless (in-memory terminal and manual clock, for the CLI and tests)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;

use thiserror::Error;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Host-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The container element has no area, so no geometry can be computed
    #[error("container has zero size")]
    ZeroSize,
    /// A JavaScript call threw
    #[error("javascript error: {0}")]
    Js(String),
}

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: u32,
    pub rows: u32,
}

impl Default for TermSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for TermSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// The terminal-emulator widget, as seen by the shell.
///
/// Methods take `&self`: the widget is shared between the dispatcher and the
/// resize path on a single thread, and hosts use interior mutability.
pub trait TerminalWidget {
    /// Append text to the visible output
    fn write(&self, text: &str);

    /// Recompute and apply the terminal dimensions from the container size
    fn fit(&self) -> HostResult<TermSize>;

    /// Current terminal dimensions
    fn size(&self) -> TermSize;
}

/// Opaque handle to a pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// One-shot timers provided by the host event loop.
pub trait Timers {
    /// Run `callback` once after `delay_ms` milliseconds
    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle;

    /// Cancel a pending timer. Cancelling a fired or unknown timer is a no-op.
    fn cancel(&self, handle: TimerHandle);
}
