use std::sync::Arc;

use crate::event::record::LogEvent;
use crate::foundation::core::StackTraceUsage;
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::layout::contract::{
    Layout, LayoutList, LayoutState, close_children, initialize_children,
};

/// A layout made of a repeatable body plus an optional header and footer.
///
/// Only the body produces [`Layout::formatted_message`] output. Header and footer are rendered
/// separately through [`CompositeLayout::render_header`] / [`CompositeLayout::render_footer`] by
/// whatever owns the output stream (see [`crate::StreamTarget`]), typically once at open and once
/// at close.
///
/// Metadata is aggregated over all present parts: stack-trace usage is the maximum, volatility the
/// logical OR. Absent parts contribute the neutral value.
#[derive(Debug)]
pub struct CompositeLayout {
    body: Option<Arc<dyn Layout>>,
    header: Option<Arc<dyn Layout>>,
    footer: Option<Arc<dyn Layout>>,
    state: LayoutState,
}

impl CompositeLayout {
    pub fn new(body: Arc<dyn Layout>) -> Self {
        Self {
            body: Some(body),
            ..Self::unbound()
        }
    }

    /// A composite with no parts yet. It must receive a body before [`Layout::initialize`].
    pub fn unbound() -> Self {
        Self {
            body: None,
            header: None,
            footer: None,
            state: LayoutState::new(),
        }
    }

    pub fn with_body(mut self, body: Arc<dyn Layout>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, header: Arc<dyn Layout>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: Arc<dyn Layout>) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn body(&self) -> Option<&Arc<dyn Layout>> {
        self.body.as_ref()
    }

    pub fn header(&self) -> Option<&Arc<dyn Layout>> {
        self.header.as_ref()
    }

    pub fn footer(&self) -> Option<&Arc<dyn Layout>> {
        self.footer.as_ref()
    }

    /// Rendered header, or `None` when there is no header.
    pub fn render_header(&self, event: &LogEvent) -> LayoutResult<Option<String>> {
        self.render_part(self.header.as_ref(), event)
    }

    /// Rendered footer, or `None` when there is no footer.
    pub fn render_footer(&self, event: &LogEvent) -> LayoutResult<Option<String>> {
        self.render_part(self.footer.as_ref(), event)
    }

    fn render_part(
        &self,
        part: Option<&Arc<dyn Layout>>,
        event: &LogEvent,
    ) -> LayoutResult<Option<String>> {
        self.state.ensure_initialized(self.kind())?;
        part.map(|p| p.formatted_message(event)).transpose()
    }

    /// Present parts in body, header, footer order.
    fn parts(&self) -> impl Iterator<Item = &Arc<dyn Layout>> {
        [&self.body, &self.header, &self.footer]
            .into_iter()
            .flatten()
    }
}

impl Layout for CompositeLayout {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "composite"
    }

    fn render(&self, event: &LogEvent) -> LayoutResult<String> {
        let body = self.body.as_ref().ok_or_else(|| {
            LayoutError::configuration(format!("composite layout {} has no body", self.id()))
        })?;
        body.formatted_message(event)
    }

    fn stack_trace_usage(&self) -> StackTraceUsage {
        StackTraceUsage::max_of(self.parts().map(|p| p.stack_trace_usage()))
    }

    fn is_volatile(&self) -> bool {
        self.parts().any(|p| p.is_volatile())
    }

    fn precalculate(&self, event: &LogEvent) -> LayoutResult<()> {
        self.state.ensure_initialized(self.kind())?;
        for part in self.parts() {
            part.precalculate(event)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(layout = %self.id()))]
    fn on_initialize(&self) -> LayoutResult<()> {
        if self.body.is_none() {
            return Err(LayoutError::configuration(format!(
                "composite layout {} has no body",
                self.id()
            )));
        }
        initialize_children(self.parts())
    }

    #[tracing::instrument(skip_all, fields(layout = %self.id()))]
    fn on_close(&self) -> LayoutResult<()> {
        close_children(self.parts())
    }

    fn populate_layouts<'a>(&'a self, out: &mut LayoutList<'a>) {
        if !out.push(self) {
            return;
        }
        for part in self.parts() {
            part.populate_layouts(out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/composite.rs"]
mod tests;
