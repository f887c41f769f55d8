use core::fmt::Display;
use std::io::IsTerminal;
use std::sync::Mutex;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Per-file result sink. The driver owns one and reports every
/// outcome through it; nothing in the core writes anywhere else.
pub trait Log {
    fn print(&self, line: &str);
    fn success(&self, line: &str);
    fn error(&self, err: &dyn Display);
}

/// Stderr logger: green successes, red errors, colour gated on the
/// stream being a terminal.
pub struct StderrLog {
    color: bool,
}

impl StderrLog {
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for StderrLog {
    fn print(&self, line: &str) {
        eprintln!("{line}");
    }

    fn success(&self, line: &str) {
        if self.color {
            eprintln!("{GREEN}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }

    fn error(&self, err: &dyn Display) {
        if self.color {
            eprintln!("{RED}{err}{RESET}");
        } else {
            eprintln!("{err}");
        }
    }
}

/// Test logger that captures lines instead of writing them.
#[derive(Default)]
pub struct BufferLog {
    lines: Mutex<Vec<String>>,
}

impl BufferLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All logged lines in arrival order, colourless.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("logger mutex poisoned").clone()
    }
}

impl Log for BufferLog {
    fn print(&self, line: &str) {
        self.lines
            .lock()
            .expect("logger mutex poisoned")
            .push(line.to_string());
    }

    fn success(&self, line: &str) {
        self.print(line);
    }

    fn error(&self, err: &dyn Display) {
        self.print(&err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_log_captures_in_order() {
        let log = BufferLog::new();
        log.success("formatted: a.feature");
        log.error(&"boom");
        log.print("note");
        assert_eq!(
            log.lines(),
            vec!["formatted: a.feature", "boom", "note"]
        );
    }
}
