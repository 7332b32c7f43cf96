use super::*;
use crate::foundation::core::Level;

#[derive(Debug, Default)]
struct Counter {
    state: LayoutState,
    volatile: bool,
    renders: std::sync::atomic::AtomicUsize,
}

impl Layout for Counter {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "counter"
    }

    fn render(&self, _event: &LogEvent) -> LayoutResult<String> {
        let n = self
            .renders
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(n.to_string())
    }

    fn is_volatile(&self) -> bool {
        self.volatile
    }
}

#[test]
fn lifecycle_walks_the_state_machine() {
    let layout = Counter::default();
    assert_eq!(layout.state().lifecycle(), Lifecycle::Unconfigured);
    layout.initialize().unwrap();
    assert_eq!(layout.state().lifecycle(), Lifecycle::Initialized);
    layout.initialize().unwrap();
    assert_eq!(layout.state().lifecycle(), Lifecycle::Initialized);
    layout.close().unwrap();
    assert_eq!(layout.state().lifecycle(), Lifecycle::Closed);
    layout.close().unwrap();
    assert_eq!(layout.state().lifecycle(), Lifecycle::Closed);
    layout.initialize().unwrap();
    assert!(layout.is_initialized());
}

#[test]
fn non_volatile_precalculate_caches_nothing() {
    let layout = Counter::default();
    layout.initialize().unwrap();
    let ev = LogEvent::new(Level::Info, "app", "m");
    layout.precalculate(&ev).unwrap();
    assert!(ev.cache().is_empty());
    assert_eq!(layout.formatted_message(&ev).unwrap(), "0");
    assert_eq!(layout.formatted_message(&ev).unwrap(), "1");
}

#[test]
fn volatile_precalculate_is_computed_once() {
    let layout = Counter {
        volatile: true,
        ..Counter::default()
    };
    layout.initialize().unwrap();
    let ev = LogEvent::new(Level::Info, "app", "m");
    layout.precalculate(&ev).unwrap();
    layout.precalculate(&ev).unwrap();
    assert_eq!(layout.formatted_message(&ev).unwrap(), "0");
    assert_eq!(layout.formatted_message(&ev).unwrap(), "0");
}

#[test]
fn distinct_instances_do_not_share_cache_entries() {
    let a = Counter {
        volatile: true,
        ..Counter::default()
    };
    let b = Counter {
        volatile: true,
        ..Counter::default()
    };
    a.initialize().unwrap();
    b.initialize().unwrap();
    let ev = LogEvent::new(Level::Info, "app", "m");
    a.precalculate(&ev).unwrap();
    assert!(ev.cache().contains(a.id()));
    assert!(!ev.cache().contains(b.id()));
}

#[test]
fn leaf_populates_only_itself() {
    let layout = Counter::default();
    let all = collect_layouts(&layout);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id(), layout.id());
}

#[derive(Debug, Default)]
struct Slow {
    state: LayoutState,
    inits: std::sync::atomic::AtomicUsize,
    closes: std::sync::atomic::AtomicUsize,
}

impl Layout for Slow {
    fn state(&self) -> &LayoutState {
        &self.state
    }

    fn kind(&self) -> &'static str {
        "slow"
    }

    fn render(&self, _event: &LogEvent) -> LayoutResult<String> {
        Ok("slow".to_string())
    }

    fn on_initialize(&self) -> LayoutResult<()> {
        std::thread::sleep(std::time::Duration::from_millis(100));
        self.inits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn on_close(&self) -> LayoutResult<()> {
        std::thread::sleep(std::time::Duration::from_millis(100));
        self.closes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn concurrent_initialize_runs_hook_once_and_waits_for_it() {
    let layout = Slow::default();
    let barrier = std::sync::Barrier::new(2);
    let ev = LogEvent::new(Level::Info, "app", "m");

    std::thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                barrier.wait();
                layout.initialize().unwrap();
                // Both callers return only once the hook has finished.
                assert!(layout.is_initialized());
                assert_eq!(layout.formatted_message(&ev).unwrap(), "slow");
            });
        }
    });

    assert_eq!(layout.inits.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn concurrent_close_runs_hook_once() {
    let layout = Slow::default();
    layout.initialize().unwrap();
    let barrier = std::sync::Barrier::new(2);

    std::thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                barrier.wait();
                layout.close().unwrap();
                assert_eq!(layout.state().lifecycle(), Lifecycle::Closed);
            });
        }
    });

    assert_eq!(layout.closes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn failed_initialize_leaves_state_untouched() {
    #[derive(Debug, Default)]
    struct Refusing {
        state: LayoutState,
    }

    impl Layout for Refusing {
        fn state(&self) -> &LayoutState {
            &self.state
        }

        fn kind(&self) -> &'static str {
            "refusing"
        }

        fn render(&self, _event: &LogEvent) -> LayoutResult<String> {
            Ok(String::new())
        }

        fn on_initialize(&self) -> LayoutResult<()> {
            Err(LayoutError::configuration("not today"))
        }
    }

    let layout = Refusing::default();
    assert!(layout.initialize().is_err());
    assert_eq!(layout.state().lifecycle(), Lifecycle::Unconfigured);
}

#[test]
fn layout_list_skips_repeated_ids() {
    let a = Counter::default();
    let b = Counter::default();
    let mut list = LayoutList::new();
    assert!(list.push(&a));
    assert!(list.push(&b));
    assert!(!list.push(&a));
    assert_eq!(list.len(), 2);
    assert!(list.contains(b.id()));
    assert_eq!(list.as_slice()[0].id(), a.id());
}
