//! Shell session - composition and lifecycle
//!
//! A session owns one terminal widget, one dispatcher and one resize
//! reconciler. Hosts forward terminal input to `handle_input` and viewport
//! resizes to `on_viewport_resize`; everything else happens inside.
//!
//! Sessions are independent values: two sessions on one page share nothing.

use super::backend::Backend;
use super::dispatch::{DispatchLoop, DispatchState, Dispatcher};
use super::line::InputEvent;
use super::resize::ResizeReconciler;
use crate::config::ShellConfig;
use crate::console_log;
use crate::host::{TermSize, TerminalWidget, Timers};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Undoes one piece of host wiring (an event listener, a subscription)
pub type DetachHook = Box<dyn FnOnce()>;

pub struct ShellSession {
    terminal: Rc<dyn TerminalWidget>,
    dispatcher: Dispatcher,
    resize: ResizeReconciler,
    detach: RefCell<Vec<DetachHook>>,
    closed: Cell<bool>,
}

impl ShellSession {
    /// Build a session, fit the terminal once and show the first prompt.
    ///
    /// The returned loop must be spawned on the host's local executor;
    /// commands only run while it is polled.
    pub fn start(
        config: &ShellConfig,
        terminal: Rc<dyn TerminalWidget>,
        backend: Rc<dyn Backend>,
        timers: Rc<dyn Timers>,
    ) -> (Self, DispatchLoop) {
        let (dispatcher, driver) = Dispatcher::new(
            terminal.clone(),
            backend,
            config.prompt.clone(),
            config.error_prefix.clone(),
        );
        let resize = ResizeReconciler::new(terminal.clone(), timers, config.quiet_period_ms);

        let session = Self {
            terminal,
            dispatcher,
            resize,
            detach: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        };

        let size = session.resize.fit_now();
        if let Some(banner) = &config.banner {
            for line in banner {
                session.terminal.write(line);
                session.terminal.write("\r\n");
            }
        }
        session.dispatcher.show_prompt();

        match size {
            Some(size) => console_log!("[shell] session started ({})", size),
            None => console_log!("[shell] session started (not fitted)"),
        }

        (session, driver)
    }

    /// Register wiring to undo on teardown
    pub fn add_detach_hook(&self, hook: DetachHook) {
        if self.closed.get() {
            hook();
        } else {
            self.detach.borrow_mut().push(hook);
        }
    }

    /// Terminal input event
    pub fn handle_input(&self, event: InputEvent) {
        self.dispatcher.handle_input(event);
    }

    /// Host viewport resize event
    pub fn on_viewport_resize(&self) {
        if !self.closed.get() {
            self.resize.on_viewport_resize();
        }
    }

    /// Fit right away, bypassing the debounce
    pub fn fit(&self) -> Option<TermSize> {
        self.resize.fit_now()
    }

    pub fn state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn resize(&self) -> &ResizeReconciler {
        &self.resize
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Detach listeners, cancel the pending fit and terminate the dispatcher.
    /// Calling it again does nothing.
    pub fn teardown(&self) {
        if self.closed.replace(true) {
            return;
        }
        let hooks = std::mem::take(&mut *self.detach.borrow_mut());
        for hook in hooks {
            hook();
        }
        self.resize.cancel();
        self.dispatcher.terminate();
        console_log!("[shell] session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::{HeadlessTerminal, ManualTimers};
    use crate::shell::backend::CommandResult;
    use futures::executor::LocalPool;
    use futures::future::{FutureExt, LocalBoxFuture};
    use futures::task::LocalSpawnExt;

    struct Echo;

    impl Backend for Echo {
        fn execute(&self, name: &str, args: &[String]) -> LocalBoxFuture<'static, CommandResult> {
            futures::future::ready(Ok(format!("{} {}", name, args.join(" ")))).boxed_local()
        }
    }

    fn start(config: &ShellConfig) -> (LocalPool, Rc<HeadlessTerminal>, Rc<ManualTimers>, ShellSession) {
        let pool = LocalPool::new();
        let term = Rc::new(HeadlessTerminal::with_viewport(100, 30));
        let timers = Rc::new(ManualTimers::new());
        let (session, driver) = ShellSession::start(config, term.clone(), Rc::new(Echo), timers.clone());
        pool.spawner().spawn_local(driver.run()).unwrap();
        (pool, term, timers, session)
    }

    #[test]
    fn test_start_fits_then_prompts() {
        let (_pool, term, _timers, session) = start(&ShellConfig::default());
        assert_eq!(term.fit_count(), 1);
        assert_eq!(term.output(), "> osrs ");
        assert_eq!(session.state(), DispatchState::AwaitingInput);
    }

    #[test]
    fn test_banner_before_prompt() {
        let config = ShellConfig {
            banner: Some(vec!["osrs-cli".into(), "Type 'help'".into()]),
            ..ShellConfig::default()
        };
        let (_pool, term, _timers, _session) = start(&config);
        assert_eq!(term.output(), "osrs-cli\r\nType 'help'\r\n> osrs ");
    }

    #[test]
    fn test_input_reaches_backend() {
        let (mut pool, term, _timers, session) = start(&ShellConfig::default());
        session.handle_input(InputEvent::Text("price whip\r".into()));
        pool.run_until_stalled();
        assert!(term.output().ends_with("price whip\r\nprice whip\r\n> osrs "));
    }

    #[test]
    fn test_teardown() {
        let (mut pool, term, timers, session) = start(&ShellConfig::default());
        let detached = Rc::new(Cell::new(0));
        let count = detached.clone();
        session.add_detach_hook(Box::new(move || count.set(count.get() + 1)));

        session.on_viewport_resize();
        assert_eq!(timers.pending_count(), 1);

        session.teardown();
        session.teardown();
        assert_eq!(detached.get(), 1);
        assert_eq!(timers.pending_count(), 0);
        assert!(session.is_closed());

        term.take_output();
        session.handle_input(InputEvent::Text("ping\r".into()));
        session.on_viewport_resize();
        pool.run_until_stalled();
        assert_eq!(term.output(), "");
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(session.state(), DispatchState::Terminated);
    }

    #[test]
    fn test_hook_added_after_teardown_runs_immediately() {
        let (_pool, _term, _timers, session) = start(&ShellConfig::default());
        session.teardown();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        session.add_detach_hook(Box::new(move || flag.set(true)));
        assert!(ran.get());
    }
}
