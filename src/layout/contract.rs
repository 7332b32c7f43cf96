use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::record::LogEvent;
use crate::foundation::core::{LayoutId, StackTraceUsage};
use crate::foundation::error::{LayoutError, LayoutResult};

/// Lifecycle position of a single layout instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, never initialized.
    #[default]
    Unconfigured,
    /// Ready to render.
    Initialized,
    /// Closed; may be initialized again.
    Closed,
}

/// Identity and lifecycle state embedded in every layout.
///
/// `initialize` and `close` hold the instance's transition lock for the whole transition, hooks
/// included. A layout shared between several composites therefore runs `on_initialize` and
/// `on_close` at most once per state change, and concurrent callers wait for the transition in
/// progress instead of observing it half done.
#[derive(Debug)]
pub struct LayoutState {
    id: LayoutId,
    lifecycle: Mutex<Lifecycle>,
    transition: Mutex<()>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            id: LayoutId::next(),
            lifecycle: Mutex::new(Lifecycle::Unconfigured),
            transition: Mutex::new(()),
        }
    }

    pub fn id(&self) -> LayoutId {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lock()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle() == Lifecycle::Initialized
    }

    /// Fail with [`LayoutError::Lifecycle`] unless the layout is initialized.
    pub fn ensure_initialized(&self, kind: &str) -> LayoutResult<()> {
        match self.lifecycle() {
            Lifecycle::Initialized => Ok(()),
            Lifecycle::Unconfigured => Err(LayoutError::lifecycle(format!(
                "{kind} layout {} used before initialize",
                self.id
            ))),
            Lifecycle::Closed => Err(LayoutError::lifecycle(format!(
                "{kind} layout {} used after close",
                self.id
            ))),
        }
    }

    fn begin_transition(&self) -> MutexGuard<'_, ()> {
        self.transition.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, lifecycle: Lifecycle) {
        *self.lock() = lifecycle;
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Upcast helper so default trait methods can hand out `&dyn Layout` for `self`.
pub trait AsLayout {
    fn as_layout(&self) -> &dyn Layout;
}

impl<T: Layout> AsLayout for T {
    fn as_layout(&self) -> &dyn Layout {
        self
    }
}

/// Capability contract shared by leaf and composite layouts.
///
/// Implementors provide [`Layout::state`], [`Layout::kind`] and [`Layout::render`]; everything else
/// has a default that leaves follow and composites override to aggregate over their children.
///
/// Rendering ([`Layout::formatted_message`], [`Layout::precalculate`]) is only valid between
/// [`Layout::initialize`] and [`Layout::close`]; outside that window it fails with
/// [`LayoutError::Lifecycle`].
pub trait Layout: AsLayout + fmt::Debug + Send + Sync {
    /// Embedded identity and lifecycle state.
    fn state(&self) -> &LayoutState;

    /// Short human-readable type name (`"literal"`, `"composite"`, ...).
    fn kind(&self) -> &'static str;

    /// Produce text for `event` without consulting the precalculation cache.
    fn render(&self, event: &LogEvent) -> LayoutResult<String>;

    fn id(&self) -> LayoutId {
        self.state().id()
    }

    fn is_initialized(&self) -> bool {
        self.state().is_initialized()
    }

    /// Rendered text for `event`, preferring a value cached by [`Layout::precalculate`].
    fn formatted_message(&self, event: &LogEvent) -> LayoutResult<String> {
        self.state().ensure_initialized(self.kind())?;
        if let Some(cached) = event.cache().get(self.id()) {
            tracing::trace!(layout = %self.id(), "precalculated value hit");
            return Ok(cached);
        }
        self.render(event)
    }

    /// Call-site capture this layout needs.
    fn stack_trace_usage(&self) -> StackTraceUsage {
        StackTraceUsage::None
    }

    /// Whether output depends on ambient state that is not carried in the event.
    fn is_volatile(&self) -> bool {
        false
    }

    /// Freeze volatile output into the event's cache.
    ///
    /// Must be called on the producing thread before the event is handed to another thread or
    /// buffered. Non-volatile layouts are a pure function of the event and cache nothing.
    fn precalculate(&self, event: &LogEvent) -> LayoutResult<()> {
        self.state().ensure_initialized(self.kind())?;
        if self.is_volatile() && !event.cache().contains(self.id()) {
            let value = self.render(event)?;
            event.cache().insert(self.id(), value);
        }
        Ok(())
    }

    /// Hook run by [`Layout::initialize`] before the state moves to `Initialized`.
    fn on_initialize(&self) -> LayoutResult<()> {
        Ok(())
    }

    /// Hook run by [`Layout::close`] while the state is still `Initialized`.
    fn on_close(&self) -> LayoutResult<()> {
        Ok(())
    }

    /// Activate the layout. A no-op when already initialized.
    ///
    /// If [`Layout::on_initialize`] fails, the state is left unchanged and the error returned.
    /// Concurrent calls on the same instance run the hook once; the others wait for it.
    fn initialize(&self) -> LayoutResult<()> {
        let _transition = self.state().begin_transition();
        if self.is_initialized() {
            tracing::debug!(layout = %self.id(), kind = self.kind(), "already initialized");
            return Ok(());
        }
        self.on_initialize()?;
        self.state().set(Lifecycle::Initialized);
        tracing::debug!(layout = %self.id(), kind = self.kind(), "initialized");
        Ok(())
    }

    /// Deactivate the layout. A no-op unless currently initialized.
    ///
    /// The state ends up `Closed` even when [`Layout::on_close`] reports an error.
    fn close(&self) -> LayoutResult<()> {
        let _transition = self.state().begin_transition();
        if !self.is_initialized() {
            tracing::debug!(layout = %self.id(), kind = self.kind(), "close skipped, not initialized");
            return Ok(());
        }
        let res = self.on_close();
        self.state().set(Lifecycle::Closed);
        tracing::debug!(layout = %self.id(), kind = self.kind(), "closed");
        res
    }

    /// Append this layout and every layout reachable from it to `out`.
    ///
    /// A layout already present in `out` (an aliased child) is not listed, or descended into, again.
    fn populate_layouts<'a>(&'a self, out: &mut LayoutList<'a>) {
        out.push(self.as_layout());
    }
}

/// Ordered, duplicate-free list of layouts filled by [`Layout::populate_layouts`].
#[derive(Debug, Default)]
pub struct LayoutList<'a> {
    layouts: Vec<&'a dyn Layout>,
    seen: HashSet<LayoutId>,
}

impl<'a> LayoutList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `layout` unless an instance with the same id is already listed. Returns whether it was
    /// added.
    pub fn push(&mut self, layout: &'a dyn Layout) -> bool {
        if !self.seen.insert(layout.id()) {
            return false;
        }
        self.layouts.push(layout);
        true
    }

    pub fn contains(&self, id: LayoutId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a dyn Layout] {
        &self.layouts
    }

    pub fn into_vec(self) -> Vec<&'a dyn Layout> {
        self.layouts
    }
}

/// Every layout reachable from `root`, in [`Layout::populate_layouts`] order.
pub fn collect_layouts(root: &dyn Layout) -> Vec<&dyn Layout> {
    let mut out = LayoutList::new();
    root.populate_layouts(&mut out);
    out.into_vec()
}

/// Initialize `children` in order. On failure, children that this call moved out of a
/// non-initialized state are closed again in reverse order before the error is returned.
pub(crate) fn initialize_children<'a>(
    children: impl IntoIterator<Item = &'a Arc<dyn Layout>>,
) -> LayoutResult<()> {
    let mut fresh: Vec<&Arc<dyn Layout>> = Vec::new();
    for child in children {
        let was_initialized = child.is_initialized();
        if let Err(err) = child.initialize() {
            for done in fresh.iter().rev() {
                if let Err(close_err) = done.close() {
                    tracing::warn!(layout = %done.id(), error = %close_err, "rollback close failed");
                }
            }
            return Err(err);
        }
        if !was_initialized {
            fresh.push(child);
        }
    }
    Ok(())
}

/// Close every initialized child, continuing past failures. Returns the first error.
pub(crate) fn close_children<'a>(
    children: impl IntoIterator<Item = &'a Arc<dyn Layout>>,
) -> LayoutResult<()> {
    let mut first_err = None;
    for child in children {
        if !child.is_initialized() {
            continue;
        }
        if let Err(err) = child.close() {
            tracing::warn!(layout = %child.id(), error = %err, "child close failed");
            first_err.get_or_insert(err);
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/contract.rs"]
mod tests;
