//! Stdout logger for the `log` facade.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

static LOGGER: StdoutLogger = StdoutLogger::new(LevelFilter::Off);

struct StdoutLogger {
    /// `LevelFilter` stored as its discriminant
    level: AtomicUsize,
}

impl StdoutLogger {
    const fn new(level: LevelFilter) -> Self {
        Self {
            level: AtomicUsize::new(level as usize),
        }
    }

    fn set_level(&self, level: LevelFilter) {
        self.level.store(level as usize, Ordering::Relaxed);
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() as usize <= self.level.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        println!("[{}] {}: {}", tag, record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Install the stdout logger at `level`.
///
/// Only the first call installs the logger; later calls change the level it
/// filters at.
pub fn init(level: LevelFilter) {
    LOGGER.set_level(level);
    if log::set_logger(&LOGGER).is_ok() {
        log::debug!("stdout logger installed");
    }
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(level: Level) -> Metadata<'static> {
        Metadata::builder().level(level).build()
    }

    #[test]
    fn test_enabled_respects_level() {
        let logger = StdoutLogger::new(LevelFilter::Warn);
        assert!(logger.enabled(&metadata(Level::Warn)));
        assert!(!logger.enabled(&metadata(Level::Info)));
    }

    #[test]
    fn test_set_level_changes_filtering() {
        let logger = StdoutLogger::new(LevelFilter::Error);
        assert!(!logger.enabled(&metadata(Level::Debug)));
        logger.set_level(LevelFilter::Debug);
        assert!(logger.enabled(&metadata(Level::Debug)));
        assert!(!logger.enabled(&metadata(Level::Trace)));
        logger.set_level(LevelFilter::Off);
        assert!(!logger.enabled(&metadata(Level::Error)));
    }

    #[test]
    fn test_second_init_adjusts_installed_logger() {
        init(LevelFilter::Warn);
        assert!(!LOGGER.enabled(&metadata(Level::Info)));
        init(LevelFilter::Info);
        assert!(LOGGER.enabled(&metadata(Level::Info)));
        assert_eq!(log::max_level(), LevelFilter::Info);
        init(LevelFilter::Off);
        assert_eq!(log::max_level(), LevelFilter::Off);
    }
}
