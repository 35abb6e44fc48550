//! Shared output sinks
//!
//! One process-wide pair of line-oriented sinks, stdout/stderr by default.
//! The guarding mutex is held only for the duration of a single write and
//! every caller releases it on scope exit; this is the only lock in the
//! crate and carries no entity or UI state.
//!
//! Tests (and embedders) can swap the sinks out to capture output.

use std::io::{self, Write};
use std::sync::Mutex;

use lazy_static::lazy_static;

/// The stdout-like and stderr-like sink pair
pub struct LogSinks {
    pub out: Box<dyn Write + Send>,
    pub err: Box<dyn Write + Send>,
}

impl LogSinks {
    fn stdio() -> Self {
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }
}

lazy_static! {
    static ref SINKS: Mutex<LogSinks> = Mutex::new(LogSinks::stdio());
}

/// Write one line to the shared stdout sink
pub fn out_line(message: &str) {
    if let Ok(mut sinks) = SINKS.lock() {
        let _ = writeln!(sinks.out, "{}", message);
    }
}

/// Write one line to the shared stderr sink
pub fn err_line(message: &str) {
    if let Ok(mut sinks) = SINKS.lock() {
        let _ = writeln!(sinks.err, "{}", message);
    }
}

/// Replace both sinks, returning the previous pair
pub fn set_sinks(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Option<LogSinks> {
    let mut sinks = SINKS.lock().ok()?;
    Some(std::mem::replace(&mut *sinks, LogSinks { out, err }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// In-memory sink shared with the test body
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_reach_the_swapped_sinks() {
        let out = Capture::default();
        let err = Capture::default();
        let previous = set_sinks(Box::new(out.clone()), Box::new(err.clone())).unwrap();

        out_line("hello");
        err_line("oops");

        // Parallel tests may interleave their own lines; only ours matter
        assert!(out.contents().contains("hello\n"));
        assert!(err.contents().contains("oops\n"));

        set_sinks(previous.out, previous.err);
    }
}
