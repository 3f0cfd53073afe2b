//! osrs-shell CLI - native entry point
//!
//! Run with: osrs-shell [program]
//!
//! Drives the same shell session as the browser build, line by line from
//! stdin, running `<program> <command> <args...>` for each command.

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use osrs_shell::ShellConfig;
use osrs_shell::host::headless::{HeadlessTerminal, ManualTimers};
use osrs_shell::shell::{InputEvent, ProcessBackend, ShellSession};
use std::io::{self, BufRead, Write};
use std::process;
use std::rc::Rc;

const DEFAULT_PROGRAM: &str = "osrs";

fn main() {
    let program = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());

    let config = ShellConfig {
        banner: Some(vec![
            format!("osrs-shell v{} (running `{} <command>`)", env!("CARGO_PKG_VERSION"), program),
            "Press Ctrl+D to exit.".to_string(),
        ]),
        ..ShellConfig::default()
    };

    // Terminal size from the environment, like a login shell would see it
    let cols = env_dimension("COLUMNS", 80);
    let rows = env_dimension("LINES", 24);
    let terminal = Rc::new(HeadlessTerminal::with_viewport(cols, rows));
    let timers = Rc::new(ManualTimers::new());
    let backend = Rc::new(ProcessBackend::new(program));

    let mut pool = LocalPool::new();
    let (session, driver) = ShellSession::start(&config, terminal.clone(), backend, timers);
    if let Err(e) = pool.spawner().spawn_local(driver.run()) {
        eprintln!("osrs-shell: failed to start dispatcher: {}", e);
        process::exit(1);
    }
    flush(&terminal);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                session.handle_input(InputEvent::Line(line));
                pool.run_until_stalled();
                flush(&terminal);
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    // EOF
    println!();
    session.teardown();
    pool.run_until_stalled();
}

fn env_dimension(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Copy what the session wrote to stdout
fn flush(terminal: &HeadlessTerminal) {
    let output = terminal.take_output().replace("\r\n", "\n");
    let mut stdout = io::stdout();
    let _ = stdout.write_all(output.as_bytes());
    let _ = stdout.flush();
}
