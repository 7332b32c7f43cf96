use rayon::prelude::*;

use crate::event::record::LogEvent;
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::layout::contract::Layout;

/// Threading and chunking controls for deferred rendering.
#[derive(Clone, Debug)]
pub struct DeferredOpts {
    /// Render on a worker pool when `true`; otherwise render on the calling thread.
    pub parallel: bool,
    /// Events per scheduled chunk in parallel mode.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for DeferredOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Counters for one [`render_deferred`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeferredStats {
    /// Events rendered.
    pub events_total: u64,
    /// Events precalculated on the calling thread (zero when the layout is not volatile).
    pub events_precalculated: u64,
    /// Chunks handed to the worker pool (one for sequential rendering).
    pub chunks: u64,
}

/// Precalculate `layout` for every event on the calling thread.
///
/// Returns how many events were precalculated. Non-volatile layouts cache nothing, so they are
/// skipped entirely.
pub fn precalculate_all(layout: &dyn Layout, events: &[LogEvent]) -> LayoutResult<u64> {
    if !layout.is_volatile() {
        return Ok(0);
    }
    for event in events {
        layout.precalculate(event)?;
    }
    Ok(events.len() as u64)
}

/// Render `events` the way a buffering or asynchronous target does.
///
/// Volatile output is frozen on the calling thread first, then the bodies are rendered either
/// sequentially or in chunks on a dedicated rayon pool. Output order always matches input order.
#[tracing::instrument(skip(layout, events), fields(layout = %layout.id(), events = events.len()))]
pub fn render_deferred(
    layout: &dyn Layout,
    events: &[LogEvent],
    opts: &DeferredOpts,
) -> LayoutResult<(Vec<String>, DeferredStats)> {
    layout.state().ensure_initialized(layout.kind())?;
    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    let mut stats = DeferredStats {
        events_total: events.len() as u64,
        events_precalculated: precalculate_all(layout, events)?,
        chunks: 0,
    };

    let Some(pool) = pool else {
        let out = events
            .iter()
            .map(|e| layout.formatted_message(e))
            .collect::<LayoutResult<Vec<_>>>()?;
        stats.chunks = u64::from(!events.is_empty());
        return Ok((out, stats));
    };

    let mut out = Vec::with_capacity(events.len());
    for chunk in events.chunks(normalized_chunk_size(opts.chunk_size)) {
        let mut rendered = pool.install(|| {
            chunk
                .par_iter()
                .map(|e| layout.formatted_message(e))
                .collect::<LayoutResult<Vec<_>>>()
        })?;
        out.append(&mut rendered);
        stats.chunks += 1;
    }
    tracing::debug!(chunks = stats.chunks, "deferred render finished");
    Ok((out, stats))
}

fn build_thread_pool(threads: Option<usize>) -> LayoutResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LayoutError::configuration(
            "deferred render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|idx| format!("loglayout-render-{idx}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LayoutError::configuration(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/deferred.rs"]
mod tests;
