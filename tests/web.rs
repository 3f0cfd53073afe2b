//! Browser tests: wasm-pack test --headless --firefox

#![cfg(target_arch = "wasm32")]

use osrs_shell::ShellConfig;
use osrs_shell::config::Theme;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn terminal_options_parse_as_js_object() {
    let mut config = ShellConfig::default();
    config.terminal.font_size = Some(14);
    config.terminal.theme = Some(Theme {
        background: Some("#1a1b26".into()),
        ..Theme::default()
    });

    let options = js_sys::JSON::parse(&config.terminal.to_json().unwrap()).unwrap();
    let get = |key: &str| js_sys::Reflect::get(&options, &JsValue::from_str(key)).unwrap();

    assert_eq!(get("convertEol"), JsValue::TRUE);
    assert_eq!(get("fontSize").as_f64(), Some(14.0));
    assert!(get("fontFamily").is_undefined());

    let theme = get("theme");
    let background = js_sys::Reflect::get(&theme, &JsValue::from_str("background")).unwrap();
    assert_eq!(background.as_string().as_deref(), Some("#1a1b26"));
}

#[wasm_bindgen_test]
fn start_shell_without_element_fails() {
    let backend = js_sys::Function::new_with_args("name, args", "return name;");
    let result = osrs_shell::start_shell("no-such-element", backend, JsValue::UNDEFINED);
    assert!(result.is_err());
}
