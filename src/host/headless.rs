//! Headless Host Implementation
//!
//! Runs a shell session without a browser:
//! - `HeadlessTerminal` captures output in memory and fits to a settable viewport
//! - `ManualTimers` is a timer queue driven by an explicit clock
//!
//! Used by the native CLI and throughout the tests.

use super::{HostError, HostResult, TermSize, TerminalWidget, TimerHandle, Timers};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// In-memory terminal widget
#[derive(Debug, Default)]
pub struct HeadlessTerminal {
    /// Everything written so far
    output: RefCell<String>,
    /// Size of the hosting viewport (what a fit would compute)
    viewport: Cell<TermSize>,
    /// Size currently applied to the terminal
    size: Cell<TermSize>,
    /// Sizes applied by each successful fit, oldest first
    fits: RefCell<Vec<TermSize>>,
}

impl HeadlessTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an initial viewport size
    pub fn with_viewport(cols: u32, rows: u32) -> Self {
        let term = Self::new();
        term.set_viewport(cols, rows);
        term
    }

    /// Change the viewport size (does not resize the terminal until fit)
    pub fn set_viewport(&self, cols: u32, rows: u32) {
        self.viewport.set(TermSize { cols, rows });
    }

    /// Full captured output
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    /// Take the captured output, leaving the buffer empty
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    /// Sizes applied by successful fits
    pub fn fits(&self) -> Vec<TermSize> {
        self.fits.borrow().clone()
    }

    /// Number of successful fits
    pub fn fit_count(&self) -> usize {
        self.fits.borrow().len()
    }
}

impl TerminalWidget for HeadlessTerminal {
    fn write(&self, text: &str) {
        self.output.borrow_mut().push_str(text);
    }

    fn fit(&self) -> HostResult<TermSize> {
        let viewport = self.viewport.get();
        if viewport.cols == 0 || viewport.rows == 0 {
            return Err(HostError::ZeroSize);
        }
        self.size.set(viewport);
        self.fits.borrow_mut().push(viewport);
        Ok(viewport)
    }

    fn size(&self) -> TermSize {
        self.size.get()
    }
}

/// Entry in the deadline heap
#[derive(Debug)]
struct TimerEntry {
    deadline: u64,
    handle: TimerHandle,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline, then oldest handle)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.handle.0.cmp(&self.handle.0))
    }
}

/// Timer queue with a manually advanced clock (milliseconds)
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<u64>,
    next_id: Cell<u64>,
    heap: RefCell<BinaryHeap<TimerEntry>>,
    /// Callbacks of pending timers; cancelled timers are removed here and
    /// their heap entries skipped when popped
    pending: RefCell<HashMap<TimerHandle, Box<dyn FnOnce()>>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Number of timers that have not fired or been cancelled
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward, firing every timer whose deadline is reached,
    /// in deadline order. Returns how many fired.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now.get() + ms;
        let mut fired = 0;

        loop {
            let entry = {
                let mut heap = self.heap.borrow_mut();
                match heap.peek() {
                    Some(entry) if entry.deadline <= target => heap.pop(),
                    _ => None,
                }
            };
            let Some(entry) = entry else { break };

            // Callbacks may start or cancel timers, so no borrow is held here
            let callback = self.pending.borrow_mut().remove(&entry.handle);
            if let Some(callback) = callback {
                self.now.set(entry.deadline);
                callback();
                fired += 1;
            }
        }

        self.now.set(target);
        fired
    }
}

impl Timers for ManualTimers {
    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);

        let deadline = self.now.get() + u64::from(delay_ms);
        self.heap.borrow_mut().push(TimerEntry { deadline, handle });
        self.pending.borrow_mut().insert(handle, callback);
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.pending.borrow_mut().remove(&handle);
    }
}
