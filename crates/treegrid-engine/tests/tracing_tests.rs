#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "tracing"), allow(dead_code, unused_imports))]

//! Tracing integration tests.
//!
//! Log points enabled:
//!   cargo test -p treegrid-engine --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p treegrid-engine --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use treegrid_core::ids::{CellId, ColumnId, RowId};
use treegrid_engine::reorder::ReorderController;
use treegrid_engine::row_window::RowWindow;
use treegrid_engine::selection::SelectionModel;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span or event with its fields.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Captured {
    name: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl Captured {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

/// A tracing Layer that records spans and events.
struct Capture {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

/// Handle to read what was captured.
struct CaptureHandle {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<Captured> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    fn find_event(&self, message: &str) -> Option<Captured> {
        self.events().into_iter().find(|e| e.message() == message)
    }
}

/// Visitor that extracts fields as strings.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(Captured {
            name: attrs.metadata().name().to_string(),
            level: *attrs.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            name: event.metadata().name().to_string(),
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run a closure under a capturing subscriber.
fn with_capture<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn rid(s: &str) -> RowId {
    RowId::new(s).unwrap()
}

fn cid(s: &str) -> ColumnId {
    ColumnId::new(s).unwrap()
}

// ============================================================================
// Log Points
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn register_grid_span_carries_counts() {
    let handle = with_capture(|| {
        let mut sel = SelectionModel::new(cid("select"));
        sel.register_grid(&[rid("A"), rid("B"), rid("C")], &[cid("name"), cid("status")]);
    });
    let spans = handle.spans();
    let span = spans
        .iter()
        .find(|s| s.name == "register_grid")
        .expect("register_grid span");
    assert_eq!(span.level, tracing::Level::DEBUG);
    assert_eq!(span.fields.get("rows").map(String::as_str), Some("3"));
    assert_eq!(span.fields.get("cols").map(String::as_str), Some("2"));
}

#[test]
#[cfg(feature = "tracing")]
fn stale_row_index_warns() {
    let handle = with_capture(|| {
        let mut window = RowWindow::new(20, 0);
        window.set_rows(&[rid("A")]);
        assert!(!window.set_measured(5, 30));
    });
    let event = handle
        .find_event("stale row index skipped")
        .expect("stale index event");
    assert_eq!(event.level, tracing::Level::WARN);
    assert_eq!(event.fields.get("index").map(String::as_str), Some("5"));
}

#[test]
#[cfg(feature = "tracing")]
fn unknown_cell_logs_at_debug() {
    let handle = with_capture(|| {
        let mut sel = SelectionModel::new(cid("select"));
        sel.register_grid(&[rid("A")], &[cid("name")]);
        assert!(!sel.select_cell(CellId::new(&rid("Z"), &cid("name")), false, false));
    });
    let event = handle
        .find_event("unknown cell id ignored")
        .expect("unknown cell event");
    assert_eq!(event.level, tracing::Level::DEBUG);
    assert_eq!(event.fields.get("cell").map(String::as_str), Some("Z|name"));
}

#[test]
#[cfg(feature = "tracing")]
fn drag_suppression_and_deferral_log_at_trace() {
    let handle = with_capture(|| {
        let mut window = RowWindow::new(20, 0);
        window.set_rows(&[rid("A"), rid("B")]);
        assert!(window.range().is_none());
        window.suspend_measurement(rid("B"));
        assert!(!window.set_measured(1, 50));
    });
    let suppressed = handle
        .find_event("measurement suppressed during drag")
        .expect("suppression event");
    assert_eq!(suppressed.level, tracing::Level::TRACE);
    let deferred = handle
        .find_event("scroll container not mounted, row window deferred")
        .expect("deferral event");
    assert_eq!(deferred.level, tracing::Level::TRACE);
}

#[test]
#[cfg(feature = "tracing")]
fn vanished_reorder_target_logs_at_debug() {
    let handle = with_capture(|| {
        let order = [rid("A"), rid("B"), rid("C")];
        let mut ctl = ReorderController::new();
        ctl.begin(&order[0], &order);
        ctl.hover(Some(&order[2]));
        assert!(!ctl.drop_on_current(&order[..2]).is_committed());
    });
    let event = handle
        .find_event("reorder target vanished")
        .expect("vanished target event");
    assert_eq!(event.level, tracing::Level::DEBUG);
}

// ============================================================================
// Zero Overhead
// ============================================================================

/// Without the feature the log points compile away and nothing is emitted.
#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_without_feature() {
    let handle = with_capture(|| {
        let mut window = RowWindow::new(20, 0);
        window.set_rows(&[rid("A")]);
        window.set_measured(9, 30);
        let mut sel = SelectionModel::new(cid("select"));
        sel.register_grid(&[rid("A")], &[cid("name")]);
        sel.select_cell("bogus", false, false);
    });
    assert!(handle.spans().is_empty());
    assert!(handle.events().is_empty());
}
