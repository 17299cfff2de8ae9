//! Leveled diagnostics for the driver.
//!
//! The driver never decides where its messages go. It calls a [`Logger`]
//! injected at construction:
//!
//! - [`TracingLogger`]: forwards to `tracing` events (the default)
//! - [`NullLogger`]: discards everything

use std::fmt;

use tracing::level_filters::LevelFilter;

/// Message severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Unrecoverable condition.
    Fatal,
    /// Operation failed.
    Error,
    /// Something unexpected that did not stop the operation.
    Warn,
    /// High-level progress.
    Info,
    /// Details useful when investigating behavior.
    Debug,
    /// Very verbose tracing.
    Trace,
}

impl Level {
    fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Fatal | Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

/// Leveled logging capability consumed by the driver.
///
/// Implementors only provide [`Logger::log`]; the per-level helpers forward
/// to it. Logging is used for diagnostics only and never affects control flow.
pub trait Logger: Send + Sync {
    /// Emit a message at `level`.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Whether messages at `level` would be emitted.
    ///
    /// Defaults to `true`. Implementations with a threshold should override
    /// this so callers can skip building expensive messages.
    fn enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }

    /// Log at [`Level::Fatal`].
    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
    }

    /// Log at [`Level::Error`].
    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Log at [`Level::Warn`].
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Log at [`Level::Info`].
    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Log at [`Level::Debug`].
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Log at [`Level::Trace`].
    fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }
}

/// [`Logger`] that emits `tracing` events under the `filedb_store` target.
///
/// Messages more verbose than the configured threshold are dropped before
/// they reach the subscriber. [`Level::Fatal`] is emitted as an `ERROR`
/// event with a `fatal = true` field.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    max_level: LevelFilter,
}

impl TracingLogger {
    /// Create a logger that emits messages up to `max_level`.
    #[must_use]
    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LevelFilter::INFO)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        match level {
            Level::Fatal => tracing::error!(fatal = true, "{args}"),
            Level::Error => tracing::error!("{args}"),
            Level::Warn => tracing::warn!("{args}"),
            Level::Info => tracing::info!("{args}"),
            Level::Debug => tracing::debug!("{args}"),
            Level::Trace => tracing::trace!("{args}"),
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level.as_tracing() <= self.max_level
    }
}

/// [`Logger`] that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}

    fn enabled(&self, _level: Level) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl Logger for Recorder {
        fn log(&self, level: Level, args: fmt::Arguments<'_>) {
            self.lines.lock().unwrap().push((level, args.to_string()));
        }
    }

    #[test]
    fn test_level_helpers_forward_to_log() {
        let recorder = Recorder::default();

        recorder.fatal(format_args!("f"));
        recorder.error(format_args!("e"));
        recorder.warn(format_args!("w"));
        recorder.info(format_args!("i {}", 1));
        recorder.debug(format_args!("d"));
        recorder.trace(format_args!("t"));

        let lines = recorder.lines.into_inner().unwrap();
        assert_eq!(
            lines,
            vec![
                (Level::Fatal, "f".to_owned()),
                (Level::Error, "e".to_owned()),
                (Level::Warn, "w".to_owned()),
                (Level::Info, "i 1".to_owned()),
                (Level::Debug, "d".to_owned()),
                (Level::Trace, "t".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tracing_logger_default_is_info() {
        let logger = TracingLogger::default();

        assert!(logger.enabled(Level::Fatal));
        assert!(logger.enabled(Level::Warn));
        assert!(logger.enabled(Level::Info));
        assert!(!logger.enabled(Level::Debug));
        assert!(!logger.enabled(Level::Trace));
    }

    #[test]
    fn test_tracing_logger_off_disables_everything() {
        let logger = TracingLogger::new(LevelFilter::OFF);

        assert!(!logger.enabled(Level::Fatal));
        assert!(!logger.enabled(Level::Error));
    }

    #[test]
    fn test_tracing_logger_trace_enables_everything() {
        let logger = TracingLogger::new(LevelFilter::TRACE);

        assert!(logger.enabled(Level::Trace));
        // Emitting without a subscriber is a no-op and must not panic.
        logger.trace(format_args!("trace message"));
        logger.fatal(format_args!("fatal message"));
    }

    #[test]
    fn test_null_logger_disabled() {
        let logger = NullLogger;

        assert!(!logger.enabled(Level::Fatal));
        logger.error(format_args!("ignored"));
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Fatal < Level::Error);
        assert!(Level::Debug < Level::Trace);
    }
}
