//! Routes tracing output around the bulk progress bar.
//!
//! While a bulk resolution runs, log lines are printed through the bar so
//! they land above it instead of tearing the display.

use indicatif::ProgressBar;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Bar currently owning the terminal, if any.
static BULK_PROGRESS_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<ProgressBar>> {
    BULK_PROGRESS_BAR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Set the bar that log lines should be printed through.
pub fn set_bulk_progress_bar(pb: ProgressBar) {
    *slot() = Some(pb);
}

pub fn clear_bulk_progress_bar() {
    *slot() = None;
}

fn emit_line(line: &str) -> std::io::Result<()> {
    match slot().clone() {
        Some(pb) => {
            pb.println(line);
            Ok(())
        }
        None => writeln!(std::io::stderr(), "{}", line),
    }
}

/// Line-buffered log writer; complete lines go to the bar or stderr.
#[derive(Default)]
pub struct ProgressWriter {
    buffer: Vec<u8>,
}

impl ProgressWriter {
    /// Removes and returns every complete line currently buffered.
    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            lines.push(String::from_utf8_lossy(&raw[..end]).into_owned());
        }
        lines
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        for line in self.take_lines() {
            emit_line(&line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
        self.buffer.clear();
        if rest.is_empty() {
            return Ok(());
        }
        emit_line(&rest)
    }
}

impl Drop for ProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// `MakeWriter` handing tracing-subscriber a fresh `ProgressWriter` per event.
#[derive(Default)]
pub struct ProgressWriterFactory;

impl ProgressWriterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ProgressWriterFactory {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressWriter::default()
    }
}
