//! Bump-allocating battle logger
//!
//! Messages built through `log_fmt` are formatted into a reusable bump arena,
//! so suppressed messages cost nothing and printed ones avoid a heap string.
//! Captured entries own their text, so no lifetimes leak out of the logger.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as FmtWrite};

/// Verbosity level for battle output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// No output during the battle
    Silent = 0,
    /// Only the outcome
    Minimal = 1,
    /// Turns, cards and enemy abilities (default)
    #[default]
    Normal = 2,
    /// Every damage step and status change
    Verbose = 3,
}

impl VerbosityLevel {
    fn indent(self) -> &'static str {
        match self {
            VerbosityLevel::Silent | VerbosityLevel::Minimal => "",
            VerbosityLevel::Normal => "  ",
            VerbosityLevel::Verbose => "    ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Indented text, deeper for chattier levels
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Where emitted lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// Held in memory until flushed
    Memory,
    Both,
}

impl OutputMode {
    fn prints(self) -> bool {
        matches!(self, OutputMode::Stdout | OutputMode::Both)
    }

    fn captures(self) -> bool {
        matches!(self, OutputMode::Memory | OutputMode::Both)
    }
}

/// One captured line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Set for controller decisions
    pub category: Option<&'static str>,
}

pub struct BattleLogger {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    mode: OutputMode,
    /// Scratch arena for formatting, reset after every message
    scratch: RefCell<Bump>,
    captured: RefCell<Vec<LogEntry>>,
}

impl BattleLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        BattleLogger {
            verbosity,
            format: OutputFormat::default(),
            mode: OutputMode::default(),
            scratch: RefCell::new(Bump::new()),
            captured: RefCell::new(Vec::new()),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    /// Capture into memory and stop printing
    pub fn enable_capture(&mut self) {
        self.mode = OutputMode::Memory;
    }

    pub fn disable_capture(&mut self) {
        self.mode = OutputMode::Stdout;
    }

    pub fn is_capturing(&self) -> bool {
        self.mode.captures()
    }

    /// Whether a message at `level` would go anywhere
    ///
    /// Capture keeps every level so a tail can be printed later.
    #[inline]
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && (level <= self.verbosity || self.is_capturing())
    }

    /// Captured entries, oldest first
    pub fn logs(&self) -> Ref<'_, [LogEntry]> {
        Ref::map(self.captured.borrow(), Vec::as_slice)
    }

    pub fn clear_logs(&mut self) {
        self.captured.get_mut().clear();
        self.scratch.get_mut().reset();
    }

    /// Print everything captured that the verbosity allows, then clear
    pub fn flush_buffer(&mut self) {
        self.drain(0);
    }

    /// Print only the last `lines` captured entries, then clear
    pub fn flush_tail(&mut self, lines: usize) {
        let elided = self.captured.get_mut().len().saturating_sub(lines);
        if elided > 0 {
            println!(">>> {elided} LOG LINES ELIDED. PRINTING LAST {lines} LINES <<<");
        }
        self.drain(elided);
    }

    fn drain(&mut self, skip: usize) {
        let entries = std::mem::take(self.captured.get_mut());
        for entry in entries.iter().skip(skip) {
            if entry.level <= self.verbosity {
                self.print(entry.level, &entry.message, entry.category);
            }
        }
        self.scratch.get_mut().reset();
    }

    fn print(&self, level: VerbosityLevel, message: &str, category: Option<&str>) {
        match self.format {
            OutputFormat::Text => println!("{}{}", level.indent(), message),
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "level": level,
                    "category": category,
                    "message": message,
                });
                println!("{line}");
            }
        }
    }

    fn emit(&self, level: VerbosityLevel, message: &str, category: Option<&'static str>) {
        if !self.enabled(level) {
            return;
        }
        if self.mode.captures() {
            self.captured.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category,
            });
        }
        if self.mode.prints() && level <= self.verbosity {
            self.print(level, message, category);
        }
    }

    /// Format `args` in the scratch arena and log the result
    pub fn log_fmt(&self, level: VerbosityLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        {
            let bump = self.scratch.borrow();
            let mut text = bumpalo::collections::String::new_in(&bump);
            if text.write_fmt(args).is_err() {
                return;
            }
            self.emit(level, text.as_str(), None);
        }
        self.scratch.borrow_mut().reset();
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.emit(VerbosityLevel::Minimal, message, None);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, message, None);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.emit(VerbosityLevel::Verbose, message, None);
    }

    /// A controller decision, tagged so it can be filtered out of a capture
    ///
    /// The controller's name is left out of the line, so the same decisions
    /// log identically whichever controller made them.
    pub fn decision(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, message, Some("decision"));
    }
}

impl Default for BattleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BattleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleLogger")
            .field("verbosity", &self.verbosity)
            .field("format", &self.format)
            .field("mode", &self.mode)
            .field("captured", &self.captured.borrow().len())
            .finish()
    }
}

/// Clones the settings, not the captured entries
impl Clone for BattleLogger {
    fn clone(&self) -> Self {
        BattleLogger {
            verbosity: self.verbosity,
            format: self.format,
            mode: self.mode,
            scratch: RefCell::new(Bump::new()),
            captured: RefCell::new(Vec::new()),
        }
    }
}
