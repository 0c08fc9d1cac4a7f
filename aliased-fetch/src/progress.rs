//! Progress counters
//!
//! Each phase reports a cumulative count on one rewritable line of stdout,
//! followed by a newline when the phase ends (even when it ends in error).

use std::io::Write;
use std::sync::Mutex;

/// Discovery phase a counter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Accounts,
    Tags,
    Aliases,
}

impl Phase {
    /// Counter line for the phase, without the carriage return
    pub fn line(&self, count: usize) -> String {
        match self {
            Phase::Accounts => format!("Fetched {} accounts...", count),
            Phase::Tags => format!("Fetched tags for {} accounts...", count),
            Phase::Aliases => format!("Fetched aliases for {} accounts...", count),
        }
    }
}

/// Sink for phase counters
pub trait Progress: Send + Sync {
    /// Rewrites the counter of `phase`
    fn update(&self, phase: Phase, count: usize);

    /// Ends the counter line of `phase`
    fn finish(&self, phase: Phase);
}

/// Writes counters to stdout using `\r` rewrites
#[derive(Debug, Default)]
pub struct TerminalProgress {
    lock: Mutex<()>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for TerminalProgress {
    fn update(&self, phase: Phase, count: usize) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{}", phase.line(count));
        let _ = stdout.flush();
    }

    fn finish(&self, _phase: Phase) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout);
        let _ = stdout.flush();
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&self, _phase: Phase, _count: usize) {}

    fn finish(&self, _phase: Phase) {}
}
