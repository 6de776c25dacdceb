//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the macros.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use crate::test_support::CaptureLogger;
use crate::error::{Error, Result};
use serial_test::serial;
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_min_severity() {
    assert_eq!(DefaultLogger::default().min_severity(), LogSeverity::Info);
    assert_eq!(DefaultLogger::new(LogSeverity::Warn).min_severity(), LogSeverity::Warn);
}

#[test]
fn test_default_logger_accepts_all_entry_shapes() {
    let logger = DefaultLogger::new(LogSeverity::Trace);
    logger.log(&LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "lumen3d::Test".to_string(),
        message: "plain".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumen3d::Test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(42),
    });
}

// ============================================================================
// GLOBAL LOGGER + MACROS
// ============================================================================

#[test]
#[serial]
fn test_macros_reach_custom_logger() {
    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());

    crate::engine_debug!("lumen3d::Test", "debug {}", 1);
    crate::engine_warn!("lumen3d::Test", "warn {}", 2);
    crate::engine_error!("lumen3d::Test", "error {}", 3);

    let entries = capture.entries();
    log::reset_logger();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].severity, LogSeverity::Debug);
    assert_eq!(entries[0].message, "debug 1");
    assert!(entries[0].file.is_none());
    assert_eq!(entries[1].severity, LogSeverity::Warn);
    assert_eq!(entries[2].severity, LogSeverity::Error);
    assert_eq!(entries[2].source, "lumen3d::Test");
    assert!(entries[2].file.is_some());
    assert!(entries[2].line.is_some());
}

#[test]
#[serial]
fn test_engine_bail_logs_and_returns() {
    fn failing() -> Result<()> {
        crate::engine_bail!("lumen3d::Test", Error::InvalidResource("broken".to_string()));
    }

    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());

    let result = failing();
    let errors = capture.messages_at(LogSeverity::Error);
    log::reset_logger();

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("broken"));
}
