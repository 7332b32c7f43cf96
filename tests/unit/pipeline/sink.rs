use super::*;
use crate::foundation::core::Level;
use crate::layout::leaf::{Field, FieldLayout, LiteralLayout};

fn layout() -> Arc<CompositeLayout> {
    Arc::new(
        CompositeLayout::new(Arc::new(FieldLayout::new(Field::Message)))
            .with_header(Arc::new(LiteralLayout::new("== begin ==")))
            .with_footer(Arc::new(LiteralLayout::new("== end =="))),
    )
}

fn ev(msg: &str) -> LogEvent {
    LogEvent::new(Level::Info, "app", msg)
}

#[test]
fn header_once_bodies_in_order_footer_once() {
    let mut target = StreamTarget::new(layout(), InMemorySink::new());
    let ctx = LogEvent::default();
    target.open(&ctx).unwrap();
    target.write(&ev("one")).unwrap();
    target
        .write_all(&[ev("two"), ev("three")], &DeferredOpts::default())
        .unwrap();
    target.close(&ctx).unwrap();

    assert_eq!(target.lines_written(), 5);
    assert!(!target.layout().is_initialized());
    let sink = target.into_sink();
    assert!(sink.is_finished());
    assert_eq!(
        sink.lines(),
        ["== begin ==", "one", "two", "three", "== end =="]
    );
}

#[test]
fn headerless_layout_writes_only_bodies() {
    let layout = Arc::new(CompositeLayout::new(Arc::new(FieldLayout::new(
        Field::Message,
    ))));
    let mut target = StreamTarget::new(layout, InMemorySink::new());
    let ctx = LogEvent::default();
    target.open(&ctx).unwrap();
    target.write(&ev("only")).unwrap();
    target.close(&ctx).unwrap();
    assert_eq!(target.sink().lines(), ["only"]);
}

#[test]
fn target_enforces_open_close_order() {
    let mut target = StreamTarget::new(layout(), InMemorySink::new());
    let ctx = LogEvent::default();
    assert!(matches!(
        target.write(&ev("early")),
        Err(LayoutError::Lifecycle(_))
    ));
    assert!(matches!(target.close(&ctx), Err(LayoutError::Lifecycle(_))));

    target.open(&ctx).unwrap();
    assert!(matches!(target.open(&ctx), Err(LayoutError::Lifecycle(_))));
    target.close(&ctx).unwrap();

    target.open(&ctx).unwrap();
    assert!(target.is_open());
    assert_eq!(target.sink().lines(), ["== begin =="]);
}

#[test]
fn writer_sink_terminates_lines() {
    let mut target = StreamTarget::new(layout(), WriterSink::new(Vec::new()));
    let ctx = LogEvent::default();
    target.open(&ctx).unwrap();
    target.write(&ev("payload")).unwrap();
    target.close(&ctx).unwrap();

    let bytes = target.into_sink().into_inner();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "== begin ==\npayload\n== end ==\n"
    );
}

#[derive(Debug, Default)]
struct BrokenSink {
    fail_begin: bool,
    fail_write: bool,
}

impl TextSink for BrokenSink {
    fn begin(&mut self) -> LayoutResult<()> {
        if self.fail_begin {
            return Err(LayoutError::io("sink unavailable"));
        }
        Ok(())
    }

    fn write_line(&mut self, _line: &str) -> LayoutResult<()> {
        if self.fail_write {
            return Err(LayoutError::io("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> LayoutResult<()> {
        Ok(())
    }
}

#[test]
fn failed_begin_closes_the_layout_again() {
    let layout = layout();
    let sink = BrokenSink {
        fail_begin: true,
        ..BrokenSink::default()
    };
    let mut target = StreamTarget::new(layout.clone(), sink);
    let err = target.open(&LogEvent::default()).unwrap_err();

    assert!(matches!(err, LayoutError::Io(ref m) if m == "sink unavailable"));
    assert!(!target.is_open());
    assert!(!layout.is_initialized());
    assert!(!layout.body().unwrap().is_initialized());
    assert!(!layout.header().unwrap().is_initialized());
}

#[test]
fn failed_header_write_closes_the_layout_and_allows_retry() {
    let layout = layout();
    let sink = BrokenSink {
        fail_write: true,
        ..BrokenSink::default()
    };
    let mut target = StreamTarget::new(layout.clone(), sink);
    let ctx = LogEvent::default();

    assert!(matches!(target.open(&ctx), Err(LayoutError::Io(_))));
    assert!(!target.is_open());
    assert!(!layout.is_initialized());

    let mut target = StreamTarget::new(layout.clone(), InMemorySink::new());
    target.open(&ctx).unwrap();
    assert!(layout.is_initialized());
    target.close(&ctx).unwrap();
}
