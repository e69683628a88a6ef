//! Tracing setup.
//!
//! Headless modes log to stderr. The TUI owns the terminal, so it logs into an
//! in-memory ring buffer that the Log tab renders.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;

const LOG_CAPACITY: usize = 200;

#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<RwLock<VecDeque<String>>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self {
            lines: Arc::new(RwLock::new(VecDeque::with_capacity(LOG_CAPACITY))),
        }
    }
}

impl LogBuffer {
    #[cfg(feature = "tui")]
    pub fn read(&self) -> Vec<String> {
        match self.lines.read() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = std::str::from_utf8(buf)
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid utf-8"))?;
        let mut guard = self.lines.write().unwrap_or_else(|e| {
            let mut guard = e.into_inner();
            guard.clear();
            guard
        });

        // Keep the ring buffer bounded.
        if guard.len() >= LOG_CAPACITY {
            guard.pop_front();
        }
        guard.push_back(text.trim_end().to_string());

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn level_for(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Install the global subscriber. Returns the buffer when logging in-memory.
pub fn init(verbosity: u8, headless: bool) -> anyhow::Result<Option<LogBuffer>> {
    LogTracer::init()?;

    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level_for(verbosity))
        .with_target(false)
        .with_ansi(headless);

    if headless {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(None)
    } else {
        let buffer = LogBuffer::default();
        let subscriber = builder.with_writer(buffer.clone()).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Some(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "tui")]
    #[test]
    fn test_log_buffer_is_bounded() {
        use std::io::Write;

        let mut buffer = LogBuffer::default();
        for i in 0..(LOG_CAPACITY + 5) {
            buffer.write_all(format!("line {i}\n").as_bytes()).unwrap();
        }
        let lines = buffer.read();
        assert_eq!(lines.len(), LOG_CAPACITY);
        assert_eq!(lines.first().map(String::as_str), Some("line 5"));
        assert_eq!(
            lines.last().cloned(),
            Some(format!("line {}", LOG_CAPACITY + 4))
        );
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), tracing::Level::ERROR);
        assert_eq!(level_for(3), tracing::Level::DEBUG);
        assert_eq!(level_for(9), tracing::Level::TRACE);
    }
}
