//! Resize reconciliation
//!
//! Viewport resize events arrive in bursts while the user drags the window.
//! Each event restarts a single quiet-period timer; only when the timer
//! expires is the terminal refitted, once, to the viewport as it is then.

use crate::console_log;
use crate::host::{TermSize, TerminalWidget, TimerHandle, Timers};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Default quiet period before a refit (milliseconds)
pub const DEFAULT_QUIET_PERIOD_MS: u32 = 500;

struct Inner {
    terminal: Rc<dyn TerminalWidget>,
    timers: Rc<dyn Timers>,
    quiet_period_ms: u32,
    /// The one pending timer, if a burst is in progress
    pending: Cell<Option<TimerHandle>>,
    /// Resize events seen
    events: Cell<u64>,
    /// Fits attempted (successful or not)
    fits: Cell<u64>,
}

/// Debounces viewport resizes into terminal fits
#[derive(Clone)]
pub struct ResizeReconciler {
    inner: Rc<Inner>,
}

impl ResizeReconciler {
    pub fn new(terminal: Rc<dyn TerminalWidget>, timers: Rc<dyn Timers>, quiet_period_ms: u32) -> Self {
        Self {
            inner: Rc::new(Inner {
                terminal,
                timers,
                quiet_period_ms,
                pending: Cell::new(None),
                events: Cell::new(0),
                fits: Cell::new(0),
            }),
        }
    }

    /// Record a viewport resize, restarting the quiet period
    pub fn on_viewport_resize(&self) {
        let inner = &self.inner;
        inner.events.set(inner.events.get() + 1);

        if let Some(handle) = inner.pending.take() {
            inner.timers.cancel(handle);
        }

        // The timer must not keep the reconciler alive after teardown
        let weak: Weak<Inner> = Rc::downgrade(inner);
        let handle = inner.timers.start(
            inner.quiet_period_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.pending.set(None);
                    inner.fit();
                }
            }),
        );
        inner.pending.set(Some(handle));
    }

    /// Fit immediately, outside of any debounce
    pub fn fit_now(&self) -> Option<TermSize> {
        self.inner.fit()
    }

    /// Cancel the pending fit, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.inner.pending.take() {
            self.inner.timers.cancel(handle);
        }
    }

    /// Is a fit waiting for the quiet period to end?
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Number of resize events recorded
    pub fn event_count(&self) -> u64 {
        self.inner.events.get()
    }

    /// Number of fits attempted
    pub fn fit_count(&self) -> u64 {
        self.inner.fits.get()
    }
}

impl Inner {
    /// Best effort: a failed fit is logged and otherwise ignored
    fn fit(&self) -> Option<TermSize> {
        self.fits.set(self.fits.get() + 1);
        match self.terminal.fit() {
            Ok(size) => Some(size),
            Err(e) => {
                console_log!("[resize] fit skipped: {}", e);
                None
            }
        }
    }
}
