use std::fmt;

use crate::event::record::LogEvent;
use crate::foundation::core::StackTraceUsage;
use crate::foundation::error::LayoutResult;
use crate::layout::contract::{Layout, LayoutState};

/// Constant text.
#[derive(Debug)]
pub struct LiteralLayout {
    text: String,
    state: LayoutState,
}

impl LiteralLayout {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: LayoutState::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Layout for LiteralLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "literal"
    }

    fn render(&self, _event: &LogEvent) -> LayoutResult<String> {
        Ok(self.text.clone())
    }
}

/// Event field selected by a [`FieldLayout`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Level,
    Logger,
    Message,
    /// Named structured property; missing properties render as an empty string.
    Property(String),
    /// Captured call site, `function` or `function (file:line)`.
    CallSite {
        #[serde(default)]
        with_source: bool,
    },
}

/// Renders a single field of the event.
#[derive(Debug)]
pub struct FieldLayout {
    field: Field,
    state: LayoutState,
}

impl FieldLayout {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            state: LayoutState::new(),
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }
}

impl Layout for FieldLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "field"
    }

    fn render(&self, event: &LogEvent) -> LayoutResult<String> {
        Ok(match &self.field {
            Field::Level => event.level.as_str().to_string(),
            Field::Logger => event.logger.clone(),
            Field::Message => event.message.clone(),
            Field::Property(name) => match event.properties.get(name) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            },
            Field::CallSite { with_source } => match &event.call_site {
                None => String::new(),
                Some(cs) => match (*with_source, cs.file.as_deref(), cs.line) {
                    (true, Some(file), Some(line)) => format!("{} ({file}:{line})", cs.function),
                    (true, Some(file), None) => format!("{} ({file})", cs.function),
                    _ => cs.function.clone(),
                },
            },
        })
    }

    fn stack_trace_usage(&self) -> StackTraceUsage {
        match self.field {
            Field::CallSite { with_source: true } => StackTraceUsage::Full,
            Field::CallSite { with_source: false } => StackTraceUsage::WithoutSource,
            _ => StackTraceUsage::None,
        }
    }
}

/// Name of the thread doing the rendering.
///
/// Volatile: the value comes from the calling thread, not from the event, so deferred rendering
/// only sees the producer's thread name if the event was precalculated.
#[derive(Debug, Default)]
pub struct ThreadNameLayout {
    state: LayoutState,
}

impl ThreadNameLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layout for ThreadNameLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "thread_name"
    }

    fn render(&self, _event: &LogEvent) -> LayoutResult<String> {
        Ok(std::thread::current()
            .name()
            .unwrap_or("<unnamed>")
            .to_string())
    }

    fn is_volatile(&self) -> bool {
        true
    }
}

type RenderFn = dyn Fn(&LogEvent) -> LayoutResult<String> + Send + Sync;

/// Leaf backed by a closure, with explicitly declared metadata.
pub struct FnLayout {
    render: Box<RenderFn>,
    stack_trace_usage: StackTraceUsage,
    volatile: bool,
    state: LayoutState,
}

impl FnLayout {
    pub fn new(
        render: impl Fn(&LogEvent) -> LayoutResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            render: Box::new(render),
            stack_trace_usage: StackTraceUsage::None,
            volatile: false,
            state: LayoutState::new(),
        }
    }

    /// Declare whether the closure reads ambient (thread-local, global) state.
    pub fn volatile(mut self, volatile: bool) -> Self {
        self.volatile = volatile;
        self
    }

    pub fn with_stack_trace_usage(mut self, usage: StackTraceUsage) -> Self {
        self.stack_trace_usage = usage;
        self
    }
}

impl fmt::Debug for FnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLayout")
            .field("stack_trace_usage", &self.stack_trace_usage)
            .field("volatile", &self.volatile)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Layout for FnLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "fn"
    }

    fn render(&self, event: &LogEvent) -> LayoutResult<String> {
        (self.render)(event)
    }

    fn stack_trace_usage(&self) -> StackTraceUsage {
        self.stack_trace_usage
    }

    fn is_volatile(&self) -> bool {
        self.volatile
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/leaf.rs"]
mod tests;
