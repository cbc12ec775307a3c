//! Conditional debug output.
//!
//! Call sites sprinkle [`debug_print!`] / [`raw_print!`] freely; nothing is
//! emitted unless the [`DebugLog`] they were handed was built with
//! `enabled = true`. The switch is decided once, where the tool reads its
//! configuration, and travels as a plain `Copy` value from there.

use std::fmt;
use std::io::{self, Write};
use std::panic::Location;

pub const DEBUG_TARGET: &str = "repro::debug";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugLog {
    enabled: bool,
}

impl DebugLog {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn disabled() -> Self {
        Self::new(false)
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit through `tracing`, tagged with the caller's source location.
    #[track_caller]
    pub fn print(&self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        let caller = Location::caller();
        tracing::info!(
            target: DEBUG_TARGET,
            file = caller.file(),
            line = caller.line(),
            "{args}"
        );
    }

    /// Write straight to stdout, bypassing the subscriber.
    pub fn raw_print(&self, args: fmt::Arguments<'_>) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        // stdout going away is not worth failing a debug line over
        let _ = self.raw_print_to(&mut lock, args);
    }

    /// Like [`DebugLog::raw_print`] but into any writer. A trailing newline is
    /// appended when the rendered message lacks one.
    pub fn raw_print_to(&self, out: &mut impl Write, args: fmt::Arguments<'_>) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut line = args.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        out.write_all(line.as_bytes())
    }
}

#[macro_export]
macro_rules! debug_print {
    ($log:expr, $($arg:tt)*) => {
        $log.print(::std::format_args!($($arg)*))
    };
}

/// `raw_print!(log, ...)` writes to stdout; `raw_print!(log => out, ...)`
/// writes into `out` and yields the `io::Result`.
#[macro_export]
macro_rules! raw_print {
    ($log:expr => $out:expr, $($arg:tt)*) => {
        $log.raw_print_to($out, ::std::format_args!($($arg)*))
    };
    ($log:expr, $($arg:tt)*) => {
        $log.raw_print(::std::format_args!($($arg)*))
    };
}
