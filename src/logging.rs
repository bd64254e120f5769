//! Structured logging for probe runs
//!
//! Provides leveled, structured log entries. Every batch gets its own
//! correlation ID, which is attached to each probe and failed attempt the
//! batch logs, so concurrent batches stay distinguishable. Entries can
//! be rendered for the console, as JSON lines, or in a compact form. All
//! output goes to stderr so stdout stays clean for reports and exports.

use crate::error::{AppError, Result};
use crate::models::metrics::{Sample, TestResult};
use crate::models::Config;
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - per-attempt probe details
    Debug = 1,
    /// Info level - batch lifecycle
    Info = 2,
    /// Warning level - degraded but continuing
    Warn = 3,
    /// Error level - an operation failed
    Error = 4,
    /// Fatal level - the run cannot continue
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Console color for this level
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::White,
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
            LogLevel::Fatal => Color::Magenta,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID tying the entry to a batch
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
}

/// Logger with configurable level and output format
///
/// Clones share the same context, so a session ID set once is visible to
/// every copy handed to concurrent batches.
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger whose level follows the debug/verbose flags
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Start a correlated operation and return its ID
    ///
    /// The ID is not stored on the logger; callers pass it to every entry
    /// that belongs to the operation.
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    /// End a correlated operation
    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.debug(&format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log()
            .await;
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if let Some(session_id) = &self.context.read().await.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }

        let output = self.render(&entry);
        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short = correlation_id.get(..8).unwrap_or(correlation_id);
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}", entry.message),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder for a single log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn maybe_correlation_id(mut self, id: Option<&str>) -> Self {
        self.entry.correlation_id = id.map(str::to_string);
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Attach the outcome of a probe
    pub fn sample(self, sample: &Sample) -> Self {
        self.field("success", sample.is_success())
            .field("latency_ms", sample.latency_ms())
            .field("attempts", sample.attempts())
            .field("error", sample.error())
    }

    /// Attach error classification
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for probe attempts and batch lifecycle events
#[derive(Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("PROBE".to_string(), config),
        }
    }

    /// Logger that only reports warnings and above
    pub fn quiet() -> Self {
        let mut logger = Logger::new("PROBE".to_string());
        logger.set_level(LogLevel::Warn);
        Self { logger }
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Begin a batch and return its correlation ID
    pub async fn log_batch_start(&self, endpoint: &str, count: u32) -> String {
        let correlation_id = self.logger.start_operation("batch").await;

        self.logger.info(&format!("Probing {} ({} probes)", endpoint, count))
            .correlation_id(&correlation_id)
            .field("endpoint", endpoint)
            .field("count", count)
            .log()
            .await;

        correlation_id
    }

    /// A single transport attempt failed
    pub async fn log_attempt_failed(
        &self,
        endpoint: &str,
        attempt: u32,
        max_attempts: u32,
        error: &AppError,
        correlation_id: Option<&str>,
    ) {
        self.attempt_failed_entry(endpoint, attempt, max_attempts, error, correlation_id)
            .log()
            .await;
    }

    fn attempt_failed_entry(
        &self,
        endpoint: &str,
        attempt: u32,
        max_attempts: u32,
        error: &AppError,
        correlation_id: Option<&str>,
    ) -> LogEntryBuilder<'_> {
        self.logger.debug(&format!("Attempt {}/{} to {} failed: {}", attempt, max_attempts, endpoint, error))
            .maybe_correlation_id(correlation_id)
            .field("endpoint", endpoint)
            .field("attempt", attempt)
            .field("max_attempts", max_attempts)
            .error_info(error)
    }

    /// The final outcome of one probe in a batch
    pub async fn log_probe(&self, endpoint: &str, sequence: usize, sample: &Sample, correlation_id: &str) {
        self.logger.debug(&format!("Probe {} to {}", sequence, endpoint))
            .correlation_id(correlation_id)
            .field("endpoint", endpoint)
            .field("sequence", sequence)
            .sample(sample)
            .log()
            .await;
    }

    /// The batch stopped because cancellation was requested
    pub async fn log_cancelled(&self, endpoint: &str, completed: usize, requested: u32, correlation_id: &str) {
        self.logger.warn(&format!("Batch for {} cancelled after {} of {} probes", endpoint, completed, requested))
            .correlation_id(correlation_id)
            .field("endpoint", endpoint)
            .field("completed", completed)
            .field("requested", requested)
            .log()
            .await;
    }

    /// The batch finished and its summary was computed
    pub async fn log_batch_complete(&self, result: &TestResult, correlation_id: &str) {
        let stats = &result.summary;
        self.logger.info(&format!("Finished {}: avg={}, loss={}",
            result.endpoint,
            stats.format_avg(),
            stats.packet_loss.map(|l| format!("{:.1}%", l)).unwrap_or_else(|| "N/A".to_string())))
            .correlation_id(correlation_id)
            .field("endpoint", &result.endpoint)
            .field("total_count", stats.total_count)
            .field("success_count", stats.success_count)
            .field("avg_ms", stats.avg_ms)
            .field("jitter_ms", stats.jitter_ms)
            .field("packet_loss", stats.packet_loss)
            .field("partial", result.partial)
            .log()
            .await;

        self.logger.end_operation(correlation_id, "batch", !result.partial).await;
    }
}

impl Default for ProbeLogger {
    fn default() -> Self {
        Self::quiet()
    }
}

/// Creates loggers that share one session ID
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_logger_with_config() {
        let debug = Config { debug: true, enable_color: false, ..Default::default() };
        let logger = Logger::with_config("TEST".to_string(), &debug);
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(!logger.use_color);
        assert!(logger.include_location);
        assert_eq!(logger.format, LogFormat::Json);

        let verbose = Config { verbose: true, ..Default::default() };
        assert_eq!(Logger::with_config("TEST".to_string(), &verbose).level(), LogLevel::Info);

        let quiet = Config::default();
        assert_eq!(Logger::with_config("TEST".to_string(), &quiet).level(), LogLevel::Warn);
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Fatal));
    }

    #[test]
    fn test_console_format_short_correlation_id() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);

        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "hello".to_string(),
            logger: "TEST".to_string(),
            correlation_id: Some("abc".to_string()),
            fields: HashMap::new(),
            location: None,
        };

        let output = logger.render(&entry);
        assert!(output.contains("[TEST] hello [abc]"));
    }

    #[test]
    fn test_json_format_is_parseable() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_format(LogFormat::Json);

        let entry = LogEntryBuilder::new(&logger, LogLevel::Debug, "probe".to_string())
            .field("latency_ms", 12.5)
            .entry;

        let value: serde_json::Value = serde_json::from_str(&logger.render(&entry)).unwrap();
        assert_eq!(value["message"], "probe");
        assert_eq!(value["fields"]["latency_ms"], 12.5);
    }

    #[tokio::test]
    async fn test_session_id_shared_between_clones() {
        let logger = Logger::new("TEST".to_string());
        let clone = logger.clone();
        logger.set_session_id("session".to_string()).await;

        let context = clone.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("session"));
    }

    #[tokio::test]
    async fn test_operation_correlation() {
        let logger = Logger::new("TEST".to_string());
        let correlation_id = logger.start_operation("batch").await;
        assert!(!correlation_id.is_empty());

        let other = logger.start_operation("batch").await;
        assert_ne!(correlation_id, other);

        logger.end_operation(&correlation_id, "batch", true).await;
        logger.end_operation(&other, "batch", true).await;
    }

    #[test]
    fn test_attempt_failure_carries_batch_correlation_id() {
        let logger = ProbeLogger::quiet();
        let error = AppError::timeout("no response");

        let entry = logger
            .attempt_failed_entry("https://a.test", 1, 2, &error, Some("batch-a"))
            .entry;
        assert_eq!(entry.correlation_id.as_deref(), Some("batch-a"));
        assert_eq!(entry.fields["attempt"], 1);
        assert_eq!(entry.fields["error_category"], error.category());

        let standalone = logger.attempt_failed_entry("https://a.test", 1, 1, &error, None).entry;
        assert!(standalone.correlation_id.is_none());
    }

    #[tokio::test]
    async fn test_logger_factory() {
        let factory = LoggerFactory::new(Config::default());
        let probe_logger = factory.create_probe_logger().await;

        assert_eq!(probe_logger.logger().name(), "PROBE");
        assert!(!factory.session_id().is_empty());
    }

    #[test]
    fn test_quiet_probe_logger() {
        let logger = ProbeLogger::quiet();
        assert!(!logger.logger().would_log(LogLevel::Info));
    }
}
