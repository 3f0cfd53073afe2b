//! Browser Host Implementation
//!
//! Direct wasm_bindgen bindings to xterm.js and xterm-addon-fit loaded via
//! script tag (globals `Terminal` and `FitAddon`), plus:
//! - `window.setTimeout` / `clearTimeout` for timers
//! - a JS function `(name, args) => Promise<string>` as the command backend
//! - `window` resize events and xterm `onData` events wired into a session

#![cfg(target_arch = "wasm32")]

use super::{HostError, HostResult, TermSize, TerminalWidget, TimerHandle, Timers};
use crate::config::ShellConfig;
use crate::console_log;
use crate::error::{ShellError, ShellResult};
use crate::shell::{Backend, CommandError, CommandResult, InputEvent, ShellSession};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    /// The xterm.js Terminal class (global `Terminal`)
    #[wasm_bindgen(js_name = Terminal)]
    type XTerm;

    #[wasm_bindgen(constructor, js_class = "Terminal")]
    fn new(options: &JsValue) -> XTerm;

    #[wasm_bindgen(method)]
    fn open(this: &XTerm, element: &web_sys::HtmlElement);

    #[wasm_bindgen(method)]
    fn write(this: &XTerm, data: &str);

    #[wasm_bindgen(method)]
    fn focus(this: &XTerm);

    #[wasm_bindgen(method)]
    fn dispose(this: &XTerm);

    #[wasm_bindgen(method, js_name = loadAddon)]
    fn load_addon(this: &XTerm, addon: &JsValue);

    #[wasm_bindgen(method, js_name = onData)]
    fn on_data(this: &XTerm, callback: &js_sys::Function) -> XTermDisposable;

    #[wasm_bindgen(method, getter)]
    fn cols(this: &XTerm) -> u32;

    #[wasm_bindgen(method, getter)]
    fn rows(this: &XTerm) -> u32;

    /// Subscription returned by xterm event registration
    type XTermDisposable;

    #[wasm_bindgen(method, js_name = dispose)]
    fn dispose_subscription(this: &XTermDisposable);

    /// The xterm-addon-fit FitAddon class (global `FitAddon`)
    #[wasm_bindgen(js_name = FitAddon)]
    type XTermFitAddon;

    #[wasm_bindgen(constructor, js_class = "FitAddon")]
    fn new_fit() -> XTermFitAddon;

    #[wasm_bindgen(method, catch)]
    fn fit(this: &XTermFitAddon) -> Result<(), JsValue>;

    /// `undefined` when the container has no usable size
    #[wasm_bindgen(method, js_name = proposeDimensions)]
    fn propose_dimensions(this: &XTermFitAddon) -> JsValue;
}

fn js_error(value: JsValue) -> HostError {
    HostError::Js(describe(&value))
}

/// Best human-readable text for a thrown JS value
fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        s
    } else if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        String::from(err.message())
    } else {
        format!("{:?}", value)
    }
}

/// xterm.js terminal with the fit addon loaded
pub struct WebTerminal {
    xterm: XTerm,
    fit_addon: XTermFitAddon,
    container: web_sys::HtmlElement,
}

impl WebTerminal {
    /// Create a terminal from config options and open it in `container`
    pub fn open(config: &ShellConfig, container: web_sys::HtmlElement) -> ShellResult<Self> {
        let options = js_sys::JSON::parse(&config.terminal.to_json()?).map_err(js_error)?;
        let xterm = XTerm::new(&options);
        let fit_addon = XTermFitAddon::new_fit();
        xterm.load_addon(fit_addon.unchecked_ref());
        xterm.open(&container);
        Ok(Self {
            xterm,
            fit_addon,
            container,
        })
    }
}

impl TerminalWidget for WebTerminal {
    fn write(&self, text: &str) {
        self.xterm.write(text);
    }

    fn fit(&self) -> HostResult<TermSize> {
        if self.container.client_width() <= 0 || self.container.client_height() <= 0 {
            return Err(HostError::ZeroSize);
        }
        if self.fit_addon.propose_dimensions().is_undefined() {
            return Err(HostError::ZeroSize);
        }
        self.fit_addon.fit().map_err(js_error)?;
        Ok(self.size())
    }

    fn size(&self) -> TermSize {
        TermSize {
            cols: self.xterm.cols(),
            rows: self.xterm.rows(),
        }
    }
}

/// Timers backed by `window.setTimeout`.
///
/// Closures are kept alive until they fire or are cancelled; fired ones are
/// released on the next `start`.
pub struct WebTimers {
    window: web_sys::Window,
    next_id: Cell<u64>,
    live: RefCell<HashMap<TimerHandle, (i32, Closure<dyn FnMut()>)>>,
    fired: Rc<RefCell<Vec<TimerHandle>>>,
}

impl WebTimers {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            next_id: Cell::new(1),
            live: RefCell::new(HashMap::new()),
            fired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn sweep(&self) {
        let mut live = self.live.borrow_mut();
        for handle in self.fired.borrow_mut().drain(..) {
            live.remove(&handle);
        }
    }
}

impl Timers for WebTimers {
    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        self.sweep();

        let handle = TimerHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);

        let fired = self.fired.clone();
        let closure: Closure<dyn FnMut()> = Closure::once(move || {
            fired.borrow_mut().push(handle);
            callback();
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), delay)
        {
            Ok(id) => {
                self.live.borrow_mut().insert(handle, (id, closure));
            }
            Err(e) => console_log!("[timers] setTimeout failed: {}", describe(&e)),
        }
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((id, _closure)) = self.live.borrow_mut().remove(&handle) {
            self.window.clear_timeout_with_handle(id);
        }
    }
}

impl Drop for WebTimers {
    fn drop(&mut self) {
        for (_, (id, _closure)) in self.live.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(id);
        }
    }
}

/// A JS function `(name: string, args: string[]) => string | Promise<string>`
pub struct JsBackend {
    function: js_sys::Function,
}

impl JsBackend {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl Backend for JsBackend {
    fn execute(&self, name: &str, args: &[String]) -> LocalBoxFuture<'static, CommandResult> {
        let js_args: js_sys::Array = args.iter().map(|arg| JsValue::from_str(arg)).collect();
        let call = self
            .function
            .call2(&JsValue::NULL, &JsValue::from_str(name), &js_args);

        async move {
            let value = call.map_err(|e| CommandError::Failed(describe(&e)))?;
            let value = JsFuture::from(js_sys::Promise::resolve(&value))
                .await
                .map_err(|e| CommandError::Failed(describe(&e)))?;
            if value.is_undefined() || value.is_null() {
                return Ok(String::new());
            }
            value
                .as_string()
                .ok_or_else(|| CommandError::NonStringOutput(format!("{:?}", value)))
        }
        .boxed_local()
    }
}

/// A running shell, returned to JavaScript by `startShell`
#[wasm_bindgen]
pub struct ShellHandle {
    session: Rc<ShellSession>,
    terminal: Rc<WebTerminal>,
}

#[wasm_bindgen]
impl ShellHandle {
    /// Tear the session down and dispose the terminal
    pub fn dispose(&self) {
        if !self.session.is_closed() {
            self.session.teardown();
            self.terminal.xterm.dispose();
        }
    }

    /// Refit the terminal now; returns false if the container has no size
    pub fn fit(&self) -> bool {
        self.session.fit().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn cols(&self) -> u32 {
        self.terminal.size().cols
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> u32 {
        self.terminal.size().rows
    }
}

/// Build a session in the element `element_id` and wire it to the page
pub fn start(element_id: &str, backend: js_sys::Function, config: JsValue) -> ShellResult<ShellHandle> {
    let config = if config.is_undefined() || config.is_null() {
        ShellConfig::default()
    } else {
        let json = js_sys::JSON::stringify(&config).map_err(js_error)?;
        ShellConfig::from_json(&String::from(json))?
    };

    let window = web_sys::window().ok_or_else(|| HostError::Js("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| HostError::Js("no document".into()))?;
    let container: web_sys::HtmlElement = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| ShellError::MissingElement(element_id.to_string()))?;

    let terminal = Rc::new(WebTerminal::open(&config, container)?);
    let timers = Rc::new(WebTimers::new(window.clone()));
    let backend = Rc::new(JsBackend::new(backend));

    let (session, driver) = ShellSession::start(&config, terminal.clone(), backend, timers);
    let session = Rc::new(session);
    wasm_bindgen_futures::spawn_local(driver.run());

    setup_data_handler(&session, &terminal);
    setup_resize_handler(&session, &window)?;

    terminal.xterm.focus();
    Ok(ShellHandle { session, terminal })
}

/// Typed characters and pastes go to the session
fn setup_data_handler(session: &Rc<ShellSession>, terminal: &WebTerminal) {
    let weak = Rc::downgrade(session);
    let callback = Closure::wrap(Box::new(move |data: String| {
        if let Some(session) = weak.upgrade() {
            session.handle_input(InputEvent::Text(data));
        }
    }) as Box<dyn FnMut(String)>);

    let subscription = terminal.xterm.on_data(callback.as_ref().unchecked_ref());
    session.add_detach_hook(Box::new(move || {
        subscription.dispose_subscription();
        drop(callback);
    }));
}

fn setup_resize_handler(session: &Rc<ShellSession>, window: &web_sys::Window) -> ShellResult<()> {
    let weak = Rc::downgrade(session);
    let callback = Closure::wrap(Box::new(move || {
        if let Some(session) = weak.upgrade() {
            session.on_viewport_resize();
        }
    }) as Box<dyn FnMut()>);

    window
        .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        .map_err(js_error)?;

    let window = window.clone();
    session.add_detach_hook(Box::new(move || {
        let _ = window.remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
    }));
    Ok(())
}
