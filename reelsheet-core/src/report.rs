use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Success,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Success => "OK",
            Severity::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.message)
    }
}

/// Ordered status lines produced by a single pipeline run.
///
/// Pipelines never print; they hand one of these back so the caller decides
/// how to show it. Lines are also echoed to the `log` facade at debug level.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    lines: Vec<ReportLine>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    fn push(&mut self, severity: Severity, message: String) {
        log::debug!("report [{}] {}", severity.label(), message);
        self.lines.push(ReportLine { severity, message });
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lines.iter().filter(|l| l.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Messages at one severity, in order.
    pub fn messages(&self, severity: Severity) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.severity == severity)
            .map(|l| l.message.as_str())
            .collect()
    }
}
