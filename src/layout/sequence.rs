use std::sync::Arc;

use crate::event::record::LogEvent;
use crate::foundation::core::StackTraceUsage;
use crate::foundation::error::LayoutResult;
use crate::layout::contract::{
    Layout, LayoutList, LayoutState, close_children, initialize_children,
};

/// Concatenation of several layouts, joined by an optional separator.
#[derive(Debug)]
pub struct SequenceLayout {
    parts: Vec<Arc<dyn Layout>>,
    separator: String,
    state: LayoutState,
}

impl SequenceLayout {
    pub fn new(parts: Vec<Arc<dyn Layout>>) -> Self {
        Self {
            parts,
            separator: String::new(),
            state: LayoutState::new(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn parts(&self) -> &[Arc<dyn Layout>] {
        &self.parts
    }
}

impl Layout for SequenceLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "sequence"
    }

    fn render(&self, event: &LogEvent) -> LayoutResult<String> {
        let mut out = String::new();
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                out.push_str(&self.separator);
            }
            out.push_str(&part.formatted_message(event)?);
        }
        Ok(out)
    }

    fn stack_trace_usage(&self) -> StackTraceUsage {
        StackTraceUsage::max_of(self.parts.iter().map(|p| p.stack_trace_usage()))
    }

    fn is_volatile(&self) -> bool {
        self.parts.iter().any(|p| p.is_volatile())
    }

    fn precalculate(&self, event: &LogEvent) -> LayoutResult<()> {
        self.state.ensure_initialized(self.kind())?;
        for part in &self.parts {
            part.precalculate(event)?;
        }
        Ok(())
    }

    fn on_initialize(&self) -> LayoutResult<()> {
        initialize_children(&self.parts)
    }

    fn on_close(&self) -> LayoutResult<()> {
        close_children(&self.parts)
    }

    fn populate_layouts<'a>(&'a self, out: &mut LayoutList<'a>) {
        if !out.push(self) {
            return;
        }
        for part in &self.parts {
            part.populate_layouts(out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/sequence.rs"]
mod tests;
