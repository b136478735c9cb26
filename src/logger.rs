//! Console output gated by a process-wide verbosity level.
//!
//! `info!` and `warn!` go quiet with `--quiet`, `verbose!` needs `--verbose`.
//! `error!` and `notice!` always print: the first for failures, the second
//! for session notifications the user has to see.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Quiet = 0,
    Normal = 1,
    Verbose = 2,
}

impl LogLevel {
    /// `--quiet` wins over `--verbose`
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Quiet,
            (false, true) => LogLevel::Verbose,
            (false, false) => LogLevel::Normal,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Quiet,
            2 => LogLevel::Verbose,
            _ => LogLevel::Normal,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Normal as u8);

pub fn set_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> LogLevel {
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

pub fn is_quiet() -> bool {
    level() == LogLevel::Quiet
}

pub fn is_verbose() -> bool {
    level() == LogLevel::Verbose
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logger::is_verbose() {
            println!("🔍 {}", format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! notice {
    ($($arg:tt)*) => {
        eprintln!("🔔 {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            eprintln!("⚠️  {}", format!($($arg)*));
        }
    };
}
