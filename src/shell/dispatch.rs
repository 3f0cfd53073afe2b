//! Dispatcher - the session's read-eval-print loop
//!
//! Input is fed synchronously from the terminal's event handler; completed
//! lines go into a queue that a single async loop drains:
//!
//! ```text
//!   AwaitingInput --line--> Executing --result--> AwaitingInput
//!         \                     |
//!          `---- teardown ------+-----> Terminated
//! ```
//!
//! Exactly one command executes at a time. Lines completed while a command is
//! running are queued and run in submission order; partial input typed in the
//! meantime is buffered and shown again with the next prompt.

use super::backend::{Backend, CommandResult};
use super::line::{CommandLine, InputEvent, LineEvent, Submission};
use crate::console_log;
use crate::host::TerminalWidget;
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const NEWLINE: &str = "\r\n";
const ERASE: &str = "\x08 \x08";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Prompt shown, input echoed as typed
    AwaitingInput,
    /// A command is running; input is buffered without echo
    Executing,
    /// Session torn down; all input ignored
    Terminated,
}

/// A completed line waiting for the loop
#[derive(Debug)]
struct Queued {
    submission: Submission,
    /// The line is already visible on screen
    echoed: bool,
}

struct Inner {
    terminal: Rc<dyn TerminalWidget>,
    backend: Rc<dyn Backend>,
    prompt: String,
    error_prefix: String,
    state: Cell<DispatchState>,
    line: RefCell<CommandLine>,
    queue: UnboundedSender<Queued>,
}

/// Handle to the dispatcher, held by the session
#[derive(Clone)]
pub struct Dispatcher {
    inner: Rc<Inner>,
}

/// The dispatcher's loop. Spawn it on the host's local executor.
pub struct DispatchLoop {
    inner: Rc<Inner>,
    queue: UnboundedReceiver<Queued>,
}

impl Dispatcher {
    /// Create a dispatcher and the loop that drives it
    pub fn new(
        terminal: Rc<dyn TerminalWidget>,
        backend: Rc<dyn Backend>,
        prompt: impl Into<String>,
        error_prefix: impl Into<String>,
    ) -> (Self, DispatchLoop) {
        let (tx, rx) = mpsc::unbounded();
        let inner = Rc::new(Inner {
            terminal,
            backend,
            prompt: prompt.into(),
            error_prefix: error_prefix.into(),
            state: Cell::new(DispatchState::AwaitingInput),
            line: RefCell::new(CommandLine::new()),
            queue: tx,
        });
        let driver = DispatchLoop {
            inner: inner.clone(),
            queue: rx,
        };
        (Self { inner }, driver)
    }

    pub fn state(&self) -> DispatchState {
        self.inner.state.get()
    }

    pub fn prompt(&self) -> &str {
        &self.inner.prompt
    }

    /// Input typed since the last completed line
    pub fn pending_input(&self) -> String {
        self.inner.line.borrow().input().to_string()
    }

    /// Write the prompt (and any buffered input) and wait for input
    pub fn show_prompt(&self) {
        if self.state() != DispatchState::Terminated {
            self.inner.state.set(DispatchState::AwaitingInput);
            self.inner.redisplay();
        }
    }

    /// Feed one terminal input event
    pub fn handle_input(&self, event: InputEvent) {
        let inner = &self.inner;
        if inner.state.get() == DispatchState::Terminated {
            return;
        }

        // Line-mode hosts echo the line themselves
        let host_echoes = matches!(event, InputEvent::Line(_));
        let events = inner.line.borrow_mut().feed(event);

        for event in events {
            let idle = inner.state.get() == DispatchState::AwaitingInput;
            match event {
                LineEvent::Inserted(text) if idle && !host_echoes => inner.terminal.write(&text),
                LineEvent::Erased if idle => inner.terminal.write(ERASE),
                LineEvent::Cancelled if idle => {
                    inner.terminal.write("^C");
                    inner.terminal.write(NEWLINE);
                    inner.terminal.write(&inner.prompt);
                }
                LineEvent::Submitted(submission) if idle => {
                    if !host_echoes {
                        inner.terminal.write(NEWLINE);
                    }
                    if submission.invocation.is_none() {
                        inner.terminal.write(&inner.prompt);
                        continue;
                    }
                    // Stop echoing before the loop gets to run
                    inner.state.set(DispatchState::Executing);
                    inner.enqueue(Queued {
                        submission,
                        echoed: true,
                    });
                }
                LineEvent::Submitted(submission) => inner.enqueue(Queued {
                    submission,
                    echoed: host_echoes,
                }),
                // Buffered silently while a command runs
                LineEvent::Inserted(_) | LineEvent::Erased | LineEvent::Cancelled => {}
            }
        }
    }

    /// Stop accepting input. A command already running is awaited by the
    /// loop but its result is discarded.
    pub fn terminate(&self) {
        if self.inner.state.replace(DispatchState::Terminated) != DispatchState::Terminated {
            self.inner.queue.close_channel();
            self.inner.line.borrow_mut().reset();
            console_log!("[dispatch] terminated");
        }
    }
}

impl Inner {
    fn enqueue(&self, queued: Queued) {
        // Only fails once the channel is closed, i.e. after teardown
        let _ = self.queue.unbounded_send(queued);
    }

    fn is_terminated(&self) -> bool {
        self.state.get() == DispatchState::Terminated
    }

    fn redisplay(&self) {
        self.terminal.write(&self.prompt);
        self.write_pending_input();
    }

    fn write_pending_input(&self) {
        let line = self.line.borrow();
        if !line.input().is_empty() {
            self.terminal.write(line.input());
        }
    }

    async fn execute(&self, queued: Queued) {
        let Queued { submission, echoed } = queued;
        if !echoed {
            self.terminal.write(&submission.line);
            self.terminal.write(NEWLINE);
        }

        let Some(invocation) = submission.invocation else {
            return;
        };

        console_log!("[dispatch] {} {:?}", invocation.name, invocation.args);
        let result = self.backend.execute(&invocation.name, &invocation.args).await;
        if !self.is_terminated() {
            self.render(result);
        }
    }

    fn render(&self, result: CommandResult) {
        match result {
            Ok(output) => {
                if !output.is_empty() {
                    self.terminal.write(&output);
                    if !output.ends_with('\n') {
                        self.terminal.write(NEWLINE);
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.terminal.write(RED);
                self.terminal.write(&self.error_prefix);
                self.terminal.write(message.trim_end_matches(['\r', '\n']));
                self.terminal.write(RESET);
                self.terminal.write(NEWLINE);
            }
        }
    }
}

impl DispatchLoop {
    /// Run until the session is torn down
    pub async fn run(mut self) {
        let inner = self.inner;
        let mut next = self.queue.next().await;

        while let Some(queued) = next {
            if inner.is_terminated() {
                break;
            }
            inner.state.set(DispatchState::Executing);
            inner.execute(queued).await;
            if inner.is_terminated() {
                break;
            }

            inner.terminal.write(&inner.prompt);
            next = match self.queue.try_next() {
                // Already submitted: it runs right after this prompt
                Ok(queued) => queued,
                Err(_) => {
                    inner.state.set(DispatchState::AwaitingInput);
                    inner.write_pending_input();
                    self.queue.next().await
                }
            };
        }

        inner.state.set(DispatchState::Terminated);
    }
}
