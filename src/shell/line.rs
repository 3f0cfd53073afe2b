//! Command line input
//!
//! Turns raw terminal input into discrete command invocations:
//! 1. Data events are split into characters and edits
//! 2. The input line accumulates printable characters
//! 3. Enter tokenizes the line and clears it
//!
//! Tokenization splits on runs of whitespace. There is no quoting or
//! escaping, so an argument can never contain whitespace.

/// A parsed command, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Command name (first token)
    pub name: String,
    /// Arguments in original order (not including the name)
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }
}

/// Tokenize a line. Blank input yields `None`.
pub fn parse(line: &str) -> Option<CommandInvocation> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    Some(CommandInvocation::new(name).args(tokens))
}

/// Raw input from the terminal widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Typed characters or pasted text, possibly containing Enter
    Text(String),
    /// A fully assembled line (line-mode hosts)
    Line(String),
}

/// A line completed by Enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The raw line as typed
    pub line: String,
    /// The parsed command, or `None` for a blank line
    pub invocation: Option<CommandInvocation>,
}

impl Submission {
    fn from_line(line: String) -> Self {
        let invocation = parse(&line);
        Self { line, invocation }
    }
}

/// What a fed event did to the input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Printable text appended
    Inserted(String),
    /// Last character removed
    Erased,
    /// Input discarded (Ctrl+C)
    Cancelled,
    /// Enter pressed; the line was tokenized and cleared
    Submitted(Submission),
}

const ENTER: char = '\r';
const NEWLINE: char = '\n';
const BACKSPACE: char = '\x08';
const DELETE: char = '\x7f';
const CTRL_C: char = '\x03';
const ESCAPE: char = '\x1b';

/// The input line accumulator
#[derive(Debug, Default)]
pub struct CommandLine {
    /// Characters typed since the last completed line
    input: String,
    /// Last character fed was `\r`, so a following `\n` is part of the same Enter
    after_cr: bool,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (incomplete) input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Discard the current input
    pub fn reset(&mut self) {
        self.input.clear();
        self.after_cr = false;
    }

    /// Feed one input event, returning what happened in order
    pub fn feed(&mut self, event: InputEvent) -> Vec<LineEvent> {
        match event {
            InputEvent::Line(line) => {
                let mut line = std::mem::take(&mut self.input) + &line;
                // Line-mode hosts may hand over the terminator too
                if line.ends_with('\n') {
                    line.pop();
                }
                if line.ends_with('\r') {
                    line.pop();
                }
                self.after_cr = false;
                vec![LineEvent::Submitted(Submission::from_line(line))]
            }
            InputEvent::Text(data) => self.feed_text(&data),
        }
    }

    fn feed_text(&mut self, data: &str) -> Vec<LineEvent> {
        let mut events = Vec::new();

        // Escape sequences (arrows, function keys) are not line editing input
        if data.starts_with(ESCAPE) {
            return events;
        }

        let mut pending = String::new();
        for c in data.chars() {
            let after_cr = std::mem::replace(&mut self.after_cr, c == ENTER);
            match c {
                NEWLINE if after_cr => {}
                ENTER | NEWLINE => {
                    flush_insert(&mut pending, &mut events);
                    let line = std::mem::take(&mut self.input);
                    events.push(LineEvent::Submitted(Submission::from_line(line)));
                }
                BACKSPACE | DELETE => {
                    flush_insert(&mut pending, &mut events);
                    if self.input.pop().is_some() {
                        events.push(LineEvent::Erased);
                    }
                }
                CTRL_C => {
                    flush_insert(&mut pending, &mut events);
                    self.input.clear();
                    events.push(LineEvent::Cancelled);
                }
                c if c.is_control() => {}
                c => {
                    self.input.push(c);
                    pending.push(c);
                }
            }
        }
        flush_insert(&mut pending, &mut events);

        events
    }
}

fn flush_insert(pending: &mut String, events: &mut Vec<LineEvent>) {
    if !pending.is_empty() {
        events.push(LineEvent::Inserted(std::mem::take(pending)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> InputEvent {
        InputEvent::Text(s.to_string())
    }

    fn submitted(events: &[LineEvent]) -> Vec<Submission> {
        events
            .iter()
            .filter_map(|e| match e {
                LineEvent::Submitted(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            parse("cmd a b c"),
            Some(CommandInvocation::new("cmd").args(["a", "b", "c"]))
        );
    }

    #[test]
    fn test_parse_no_args() {
        let inv = parse("help").unwrap();
        assert_eq!(inv.name, "help");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn test_parse_whitespace_runs() {
        assert_eq!(
            parse("  price \t  abyssal   whip  "),
            Some(CommandInvocation::new("price").arg("abyssal").arg("whip"))
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("\t \u{3000} "), None);
    }

    #[test]
    fn test_parse_quotes_are_literal() {
        assert_eq!(
            parse("wiki \"dragon scimitar\""),
            Some(CommandInvocation::new("wiki").args(["\"dragon", "scimitar\""]))
        );
    }

    #[test]
    fn test_typing_then_enter() {
        let mut line = CommandLine::new();
        assert_eq!(line.feed(text("h")), vec![LineEvent::Inserted("h".into())]);
        line.feed(text("s 1"));
        assert_eq!(line.input(), "hs 1");

        let events = line.feed(text("\r"));
        assert_eq!(
            events,
            vec![LineEvent::Submitted(Submission {
                line: "hs 1".into(),
                invocation: Some(CommandInvocation::new("hs").arg("1")),
            })]
        );
        assert_eq!(line.input(), "");
    }

    #[test]
    fn test_blank_enter() {
        let mut line = CommandLine::new();
        line.feed(text("   "));
        let subs = submitted(&line.feed(text("\r")));
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].invocation, None);
    }

    #[test]
    fn test_backspace() {
        let mut line = CommandLine::new();
        line.feed(text("pingg"));
        assert_eq!(line.feed(text("\x7f")), vec![LineEvent::Erased]);
        assert_eq!(line.input(), "ping");
        line.feed(text("\x08\x08\x08\x08"));
        assert_eq!(line.input(), "");
        // Nothing left to erase
        assert!(line.feed(text("\x7f")).is_empty());
    }

    #[test]
    fn test_ctrl_c_discards_input() {
        let mut line = CommandLine::new();
        line.feed(text("calc xp"));
        assert_eq!(line.feed(text("\x03")), vec![LineEvent::Cancelled]);
        assert_eq!(line.input(), "");
    }

    #[test]
    fn test_escape_sequences_ignored() {
        let mut line = CommandLine::new();
        line.feed(text("ge"));
        assert!(line.feed(text("\x1b[A")).is_empty());
        assert_eq!(line.input(), "ge");
    }

    #[test]
    fn test_paste_with_multiple_lines() {
        let mut line = CommandLine::new();
        let events = line.feed(text("ping\r\nhelp me\rwiki"));
        let subs = submitted(&events);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].invocation, Some(CommandInvocation::new("ping")));
        assert_eq!(subs[1].invocation, Some(CommandInvocation::new("help").arg("me")));
        assert_eq!(line.input(), "wiki");
        assert_eq!(events.last(), Some(&LineEvent::Inserted("wiki".into())));
    }

    #[test]
    fn test_crlf_split_across_events() {
        let mut line = CommandLine::new();
        line.feed(text("ping\r"));
        assert!(submitted(&line.feed(text("\n"))).is_empty());
        // A bare newline later is its own Enter
        assert_eq!(submitted(&line.feed(text("\n"))).len(), 1);
    }

    #[test]
    fn test_line_event_uses_buffered_prefix() {
        let mut line = CommandLine::new();
        line.feed(text("calc "));
        let subs = submitted(&line.feed(InputEvent::Line("xp 99\n".into())));
        assert_eq!(
            subs[0].invocation,
            Some(CommandInvocation::new("calc").args(["xp", "99"]))
        );
        assert_eq!(line.input(), "");
    }

    #[test]
    fn test_reset() {
        let mut line = CommandLine::new();
        line.feed(text("abc"));
        line.reset();
        assert_eq!(line.input(), "");
    }
}
