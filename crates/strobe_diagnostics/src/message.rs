//! Structured trace messages with verbosity level, severity, and prefix tag.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A verbosity level from 0 to 6.
///
/// Level 0 messages are always shown (final results); each higher level adds
/// more detail, up to level 6 (full event-by-event trace). A sink configured
/// with threshold N records messages at levels `0..=N`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TraceLevel(u8);

impl TraceLevel {
    /// Level 0: always-shown results.
    pub const RESULT: Self = Self(0);
    /// Level 2: warnings and recoverable anomalies.
    pub const WARN: Self = Self(2);
    /// Level 4: per-pass progress detail.
    pub const DETAIL: Self = Self(4);
    /// Level 6: verbose event-by-event trace.
    pub const TRACE: Self = Self(6);

    /// The highest defined level.
    pub const MAX: Self = Self(6);

    /// Creates a level, clamping values above 6.
    pub fn new(level: u8) -> Self {
        Self(level.min(6))
    }

    /// Returns the raw level value.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A structured trace message.
///
/// Carries a severity, a verbosity level, a short prefix tag naming the
/// emitting component (e.g. `"PATH"`, `"SIM"`, `"HAZ"`), and the message
/// text. Rendered as `severity[TAG] message`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceMessage {
    /// The severity of this message.
    pub severity: Severity,
    /// The verbosity level at which this message becomes visible.
    pub level: TraceLevel,
    /// Short prefix tag naming the emitting component.
    pub tag: String,
    /// The message text.
    pub text: String,
}

impl TraceMessage {
    /// Creates a level-0 result message.
    pub fn result(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            level: TraceLevel::RESULT,
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Creates a note at the given verbosity level.
    pub fn note(level: TraceLevel, tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            level,
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Creates a warning (visible at level 2 and above).
    pub fn warning(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            level: TraceLevel::WARN,
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Creates an analysis-fatal error (always visible).
    pub fn error(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            level: TraceLevel::RESULT,
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Creates a consistency-failure message (always visible).
    pub fn fatal(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            level: TraceLevel::RESULT,
            tag: tag.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for TraceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.severity, self.tag, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_clamped() {
        assert_eq!(TraceLevel::new(9), TraceLevel::MAX);
        assert_eq!(TraceLevel::new(3).as_u8(), 3);
    }

    #[test]
    fn level_ordering() {
        assert!(TraceLevel::RESULT < TraceLevel::WARN);
        assert!(TraceLevel::WARN < TraceLevel::TRACE);
    }

    #[test]
    fn result_is_level_zero() {
        let msg = TraceMessage::result("PATH", "max delay 12.5 ns");
        assert_eq!(msg.level, TraceLevel::RESULT);
        assert_eq!(msg.severity, Severity::Note);
    }

    #[test]
    fn warning_is_level_two() {
        let msg = TraceMessage::warning("SIM", "event clamped to current time");
        assert_eq!(msg.level, TraceLevel::WARN);
        assert_eq!(msg.severity, Severity::Warning);
    }

    #[test]
    fn error_always_visible() {
        let msg = TraceMessage::error("HAZ", "iteration cap exceeded");
        assert_eq!(msg.level, TraceLevel::RESULT);
        assert!(msg.severity.is_error());
    }

    #[test]
    fn display_format() {
        let msg = TraceMessage::fatal("HAZ", "settle state mismatch");
        assert_eq!(msg.to_string(), "fatal[HAZ] settle state mismatch");
    }

    #[test]
    fn serde_roundtrip() {
        let msg = TraceMessage::note(TraceLevel::DETAIL, "SIM", "queue drained");
        let json = serde_json::to_string(&msg).unwrap();
        let back: TraceMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tag, "SIM");
        assert_eq!(back.level, TraceLevel::DETAIL);
    }
}
