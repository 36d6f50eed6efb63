use std::time::Duration;

/// Statement execution settings applied by
/// [`InstrumentedClient`](crate::InstrumentedClient).
///
/// Defaults: no timeout, no slow-statement threshold, statement logging off.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Per-statement deadline. `None` means no timeout.
    pub statement_timeout: Option<Duration>,
    /// Statements slower than this are logged at WARN.
    pub slow_statement_threshold: Option<Duration>,
    /// Log every statement at DEBUG.
    pub log_statements: bool,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel statements that run longer than `timeout`.
    ///
    /// The statement is cancelled server-side and the call fails with
    /// [`StoreError::Timeout`](crate::StoreError::Timeout).
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn with_slow_statement_threshold(mut self, threshold: Duration) -> Self {
        self.slow_statement_threshold = Some(threshold);
        self
    }

    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }
}
