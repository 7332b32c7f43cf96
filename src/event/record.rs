use std::collections::BTreeMap;

use crate::event::cache::PrecalcCache;
use crate::foundation::core::{Level, StackTraceUsage};
use crate::foundation::error::{LayoutError, LayoutResult};

/// Where a log event was emitted from.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CallSite {
    /// Calling function or module path.
    pub function: String,
    /// Source file, only captured for [`StackTraceUsage::Full`].
    #[serde(default)]
    pub file: Option<String>,
    /// Source line, only captured for [`StackTraceUsage::Full`].
    #[serde(default)]
    pub line: Option<u32>,
}

/// A single log event as seen by layouts.
///
/// Besides its payload, every event owns a [`PrecalcCache`] so layouts can freeze volatile output
/// on the producing thread and replay it wherever the event is rendered later.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LogEvent {
    /// Severity.
    #[serde(default)]
    pub level: Level,
    /// Name of the emitting logger.
    #[serde(default)]
    pub logger: String,
    /// Formatted user message.
    #[serde(default)]
    pub message: String,
    /// Structured key/value payload.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Captured call site, present only when a layout asked for one.
    #[serde(default)]
    pub call_site: Option<CallSite>,
    #[serde(skip)]
    cache: PrecalcCache,
}

impl LogEvent {
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            logger: logger.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach a structured property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Record the call site, keeping only as much detail as `usage` demands.
    ///
    /// `usage` is normally the root layout's [`stack_trace_usage`](crate::Layout::stack_trace_usage).
    pub fn capture_call_site(
        &mut self,
        usage: StackTraceUsage,
        function: &str,
        file: &str,
        line: u32,
    ) {
        self.call_site = match usage {
            StackTraceUsage::None => None,
            StackTraceUsage::WithoutSource => Some(CallSite {
                function: function.to_string(),
                file: None,
                line: None,
            }),
            StackTraceUsage::Full => Some(CallSite {
                function: function.to_string(),
                file: Some(file.to_string()),
                line: Some(line),
            }),
        };
    }

    /// Precalculated layout output carried by this event.
    pub fn cache(&self) -> &PrecalcCache {
        &self.cache
    }

    /// Parse one event from a JSON document. The precalculation cache starts empty.
    pub fn from_json(s: &str) -> LayoutResult<Self> {
        serde_json::from_str(s).map_err(|e| LayoutError::serde(format!("parse log event JSON: {e}")))
    }

    /// Parse newline-delimited JSON events, skipping blank lines.
    pub fn from_json_lines<R: std::io::BufRead>(r: R) -> LayoutResult<Vec<Self>> {
        let mut out = Vec::new();
        for (idx, line) in r.lines().enumerate() {
            let line = line.map_err(|e| LayoutError::io(format!("read event line {}: {e}", idx + 1)))?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| {
                LayoutError::serde(format!("parse log event on line {}: {e}", idx + 1))
            })?;
            out.push(event);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/event/record.rs"]
mod tests;
