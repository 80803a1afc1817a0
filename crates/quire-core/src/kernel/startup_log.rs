use std::io::{self, Write};

use log::Level;

/// A diagnostic recorded while the application was booting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupRecord {
    pub level: Level,
    pub message: String,
}

/// Diagnostics captured during boot.
///
/// Every record is forwarded to the `log` facade as it is made; the
/// captured copy lets the caller decide afterwards whether to show the
/// startup transcript ([`flush`](Self::flush)) or drop it
/// ([`discard`](Self::discard)). Once sealed, further records are only
/// forwarded.
#[derive(Debug, Default)]
pub struct StartupLog {
    records: Vec<StartupRecord>,
    sealed: bool,
}

impl StartupLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(level, "{}", message);
        if !self.sealed {
            self.records.push(StartupRecord { level, message });
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Level::Warn, message);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(Level::Debug, message);
    }

    /// Stop capturing; marks the end of boot.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn records(&self) -> &[StartupRecord] {
        &self.records
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StartupRecord> {
        self.records.iter().filter(|r| r.level <= Level::Warn)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the captured records, one per line, and empty the buffer.
    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<usize> {
        let count = self.records.len();
        for record in self.records.drain(..) {
            writeln!(out, "[{:<5}] {}", record.level, record.message)?;
        }
        out.flush()?;
        Ok(count)
    }

    /// Drop the captured records without writing them.
    pub fn discard(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }
}
