use std::io::Write;
use std::sync::Arc;

use crate::event::record::LogEvent;
use crate::foundation::error::{LayoutError, LayoutResult};
use crate::layout::composite::CompositeLayout;
use crate::layout::contract::Layout;
use crate::pipeline::deferred::{DeferredOpts, DeferredStats, render_deferred};

/// Sink contract for consuming rendered lines in order.
///
/// `begin` is called once before the first line and `end` once after the last.
pub trait TextSink: Send {
    /// Called once before any lines are written.
    fn begin(&mut self) -> LayoutResult<()>;
    /// Write one rendered line.
    fn write_line(&mut self, line: &str) -> LayoutResult<()>;
    /// Called once after the last line.
    fn end(&mut self) -> LayoutResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    began: bool,
    ended: bool,
    lines: Vec<String>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether `begin` was seen and `end` has since been called.
    pub fn is_finished(&self) -> bool {
        self.began && self.ended
    }
}

impl TextSink for InMemorySink {
    fn begin(&mut self) -> LayoutResult<()> {
        self.began = true;
        self.ended = false;
        self.lines.clear();
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> LayoutResult<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn end(&mut self) -> LayoutResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes newline-terminated lines to any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TextSink for WriterSink<W> {
    fn begin(&mut self) -> LayoutResult<()> {
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> LayoutResult<()> {
        writeln!(self.writer, "{line}").map_err(|e| LayoutError::io(format!("write line: {e}")))
    }

    fn end(&mut self) -> LayoutResult<()> {
        self.writer
            .flush()
            .map_err(|e| LayoutError::io(format!("flush sink: {e}")))
    }
}

/// An output stream driven by a [`CompositeLayout`].
///
/// The header is written once when the stream opens, every event contributes one body line, and
/// the footer is written once when the stream closes. The layout is initialized by [`open`] and
/// closed by [`close`].
///
/// [`open`]: StreamTarget::open
/// [`close`]: StreamTarget::close
#[derive(Debug)]
pub struct StreamTarget<S: TextSink> {
    layout: Arc<CompositeLayout>,
    sink: S,
    open: bool,
    lines_written: u64,
}

impl<S: TextSink> StreamTarget<S> {
    pub fn new(layout: Arc<CompositeLayout>, sink: S) -> Self {
        Self {
            layout,
            sink,
            open: false,
            lines_written: 0,
        }
    }

    pub fn layout(&self) -> &Arc<CompositeLayout> {
        &self.layout
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Lines written since the last [`StreamTarget::open`], header and footer included.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Initialize the layout, begin the sink and write the header rendered against `context`.
    ///
    /// If the sink cannot begin or the header cannot be written, the layout is closed again before
    /// the error is returned.
    pub fn open(&mut self, context: &LogEvent) -> LayoutResult<()> {
        if self.open {
            return Err(LayoutError::lifecycle("stream target is already open"));
        }
        self.layout.initialize()?;
        if let Err(err) = self.start(context) {
            if let Err(close_err) = self.layout.close() {
                tracing::warn!(layout = %self.layout.id(), error = %close_err, "close after failed open");
            }
            return Err(err);
        }
        self.open = true;
        tracing::debug!(layout = %self.layout.id(), "stream opened");
        Ok(())
    }

    /// Render and write one event.
    pub fn write(&mut self, event: &LogEvent) -> LayoutResult<()> {
        self.ensure_open()?;
        let line = self.layout.formatted_message(event)?;
        self.emit(&line)
    }

    /// Render a batch through [`render_deferred`] and write the lines in order.
    pub fn write_all(&mut self, events: &[LogEvent], opts: &DeferredOpts) -> LayoutResult<DeferredStats> {
        self.ensure_open()?;
        let (lines, stats) = render_deferred(self.layout.as_ref(), events, opts)?;
        for line in &lines {
            self.emit(line)?;
        }
        Ok(stats)
    }

    /// Write the footer rendered against `context`, end the sink and close the layout.
    ///
    /// The layout is closed even when writing the footer fails.
    pub fn close(&mut self, context: &LogEvent) -> LayoutResult<()> {
        self.ensure_open()?;
        let finished = self.finish(context);
        self.open = false;
        let closed = self.layout.close();
        tracing::debug!(layout = %self.layout.id(), lines = self.lines_written, "stream closed");
        finished.and(closed)
    }

    fn start(&mut self, context: &LogEvent) -> LayoutResult<()> {
        self.sink.begin()?;
        self.lines_written = 0;
        if let Some(header) = self.layout.render_header(context)? {
            self.emit(&header)?;
        }
        Ok(())
    }

    fn finish(&mut self, context: &LogEvent) -> LayoutResult<()> {
        if let Some(footer) = self.layout.render_footer(context)? {
            self.emit(&footer)?;
        }
        self.sink.end()
    }

    fn emit(&mut self, line: &str) -> LayoutResult<()> {
        self.sink.write_line(line)?;
        self.lines_written += 1;
        Ok(())
    }

    fn ensure_open(&self) -> LayoutResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(LayoutError::lifecycle("stream target is not open"))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/sink.rs"]
mod tests;
