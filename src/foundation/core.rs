use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// How much call-site information a layout needs captured before an event is dispatched.
///
/// Variants are ordered from cheapest to most expensive, so `max` picks the most inclusive need.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StackTraceUsage {
    /// No call-site capture.
    #[default]
    None,
    /// Calling function only, without source file information.
    WithoutSource,
    /// Calling function plus source file and line.
    Full,
}

impl StackTraceUsage {
    /// Most inclusive of `self` and `other`.
    pub fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    /// Fold an iterator of usages, treating an empty iterator as [`StackTraceUsage::None`].
    pub fn max_of(usages: impl IntoIterator<Item = Self>) -> Self {
        usages.into_iter().fold(Self::None, Self::max)
    }

    /// Whether any call-site capture is required.
    pub fn needs_call_site(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for StackTraceUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::WithoutSource => "without_source",
            Self::Full => "full",
        })
    }
}

/// Severity of a log event.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NEXT_LAYOUT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one layout instance.
///
/// Aliased `Arc`s of the same layout share an id; separately constructed layouts never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutId(pub u64);

impl LayoutId {
    pub fn next() -> Self {
        Self(NEXT_LAYOUT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
