//! loglayout renders structured log events through layout trees.
//!
//! The centrepiece is [`CompositeLayout`]: a repeatable body plus an optional header and footer
//! that behaves exactly like a leaf layout to its callers while aggregating what its parts need.
//!
//! # Layout contract
//!
//! Every layout implements [`Layout`]:
//!
//! - [`Layout::formatted_message`] renders an event (the body only, for composites)
//! - [`Layout::stack_trace_usage`] declares how much call-site capture the front-end must pay for
//! - [`Layout::is_volatile`] declares dependence on thread-local or ambient state
//! - [`Layout::precalculate`] freezes volatile output into the event before a thread hand-off
//! - [`Layout::initialize`] / [`Layout::close`] drive the per-instance lifecycle
//! - [`Layout::populate_layouts`] lists every layout reachable from a root
//!
//! # Deferred rendering
//!
//! Events can be precalculated on the producing thread and rendered later on a worker pool with
//! [`render_deferred`]. Header and footer emission belongs to the output stream, see
//! [`StreamTarget`].
#![forbid(unsafe_code)]

mod config;
mod event;
mod foundation;
mod layout;
mod pipeline;

pub use config::build::LayoutRegistry;
pub use config::model::LayoutConfig;
pub use event::cache::PrecalcCache;
pub use event::record::{CallSite, LogEvent};
pub use foundation::core::{LayoutId, Level, StackTraceUsage};
pub use foundation::error::{LayoutError, LayoutResult};
pub use layout::composite::CompositeLayout;
pub use layout::contract::{
    AsLayout, Layout, LayoutList, LayoutState, Lifecycle, collect_layouts,
};
pub use layout::leaf::{Field, FieldLayout, FnLayout, LiteralLayout, ThreadNameLayout};
pub use layout::sequence::SequenceLayout;
pub use pipeline::deferred::{DeferredOpts, DeferredStats, precalculate_all, render_deferred};
pub use pipeline::sink::{InMemorySink, StreamTarget, TextSink, WriterSink};
