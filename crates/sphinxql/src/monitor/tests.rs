use super::*;
use crate::row::Row;
use crate::statement::StatementKind;
use crate::transport::{Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Shared DummyTransport for tests ──

struct DummyTransport;
impl Transport for DummyTransport {
    fn query(&self, sql: &str) -> Result<Vec<Row>, TransportError> {
        if sql.contains("broken") {
            return Err(TransportError::new("index 'broken' absent"));
        }
        Ok(vec![Row::new().with("id", 1), Row::new().with("id", 2)])
    }
    fn execute(&self, _: &str) -> Result<u64, TransportError> {
        Ok(3)
    }
}

#[derive(Default)]
struct RecordingMonitor {
    started: AtomicUsize,
    completed: Mutex<Vec<(String, QueryResult)>>,
    slow: AtomicUsize,
}

impl QueryMonitor for RecordingMonitor {
    fn on_query_start(&self, _ctx: &QueryContext) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_query_complete(&self, ctx: &QueryContext, _duration: Duration, result: &QueryResult) {
        self.completed
            .lock()
            .unwrap()
            .push((ctx.sql.clone(), result.clone()));
    }
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {
        self.slow.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_context_detects_kind() {
    assert_eq!(
        QueryContext::new("SELECT id FROM products WHERE id = 1").kind,
        Some(StatementKind::Select)
    );
    assert_eq!(
        QueryContext::new("  replace into products (id) VALUES (1)").kind,
        Some(StatementKind::Replace)
    );
    assert_eq!(QueryContext::new("SHOW META").kind, None);
    assert_eq!(
        QueryContext::new("SELECT 1").with_tag("nightly").tag.as_deref(),
        Some("nightly")
    );
}

#[test]
fn test_logging_monitor_truncation() {
    let monitor = LoggingMonitor::new().max_sql_length(10);
    assert_eq!(monitor.truncate_sql("SELECT * FROM products"), "SELECT * F...");
    assert_eq!(monitor.truncate_sql("SELECT 1"), "SELECT 1");
}

#[test]
fn test_truncate_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("MATCH('é')", 8), "MATCH('");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn test_query_result_error_truncation() {
    let long = "x".repeat(600);
    match QueryResult::error(long) {
        QueryResult::Error(msg) => {
            assert_eq!(msg.len(), 512 + 3);
            assert!(msg.ends_with("..."));
        }
        other => panic!("Expected Error, got {other:?}"),
    }
    assert_eq!(QueryResult::Affected(2).to_string(), "2 affected");
}

#[test]
fn test_execution_log_evicts_oldest() {
    let log = ExecutionLog::new(2);
    for sql in ["SELECT 1", "SELECT 2", "SELECT 3"] {
        log.on_query_complete(
            &QueryContext::new(sql),
            Duration::from_millis(1),
            &QueryResult::Rows(0),
        );
    }
    let sqls: Vec<_> = log.entries().into_iter().map(|e| e.sql).collect();
    assert_eq!(sqls, vec!["SELECT 2", "SELECT 3"]);
    assert_eq!(log.last_query().as_deref(), Some("SELECT 3"));

    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.last_query(), None);
}

#[test]
fn test_execution_log_keeps_error_text() {
    let log = ExecutionLog::default();
    assert_eq!(log.capacity(), 100);
    log.on_query_complete(
        &QueryContext::new("SELECT id FROM broken"),
        Duration::ZERO,
        &QueryResult::error("index absent"),
    );
    let entry = &log.entries()[0];
    assert_eq!(entry.error.as_deref(), Some("index absent"));
}

#[test]
fn test_zero_capacity_log_records_nothing() {
    let log = ExecutionLog::new(0);
    log.record(StatEntry {
        sql: "SELECT 1".into(),
        started_at: chrono::Utc::now(),
        duration: Duration::ZERO,
        error: None,
    });
    assert_eq!(log.len(), 0);
}

#[test]
fn test_monitoring_disabled_by_default() {
    let monitor = Arc::new(RecordingMonitor::default());
    let transport = InstrumentedTransport::new(DummyTransport).with_monitor_arc(monitor.clone());

    assert!(!transport.is_monitoring_enabled());
    transport.query("SELECT id FROM products").unwrap();
    assert_eq!(monitor.started.load(Ordering::SeqCst), 0);
    assert!(monitor.completed.lock().unwrap().is_empty());
    assert!(transport.stats().is_empty());
    assert_eq!(transport.last_query(), None);
}

#[test]
fn test_monitor_sees_rows_affected_and_errors() {
    let monitor = Arc::new(RecordingMonitor::default());
    let transport = InstrumentedTransport::new(DummyTransport)
        .with_monitor_arc(monitor.clone())
        .enable_monitoring();

    assert_eq!(transport.query("SELECT id FROM products").unwrap().len(), 2);
    assert_eq!(transport.execute("DELETE FROM products WHERE id = 1").unwrap(), 3);
    let err = transport.query("SELECT id FROM broken").unwrap_err();
    assert_eq!(err.message(), "index 'broken' absent");

    assert_eq!(monitor.started.load(Ordering::SeqCst), 3);
    let completed = monitor.completed.lock().unwrap();
    assert_eq!(completed[0].1, QueryResult::Rows(2));
    assert_eq!(completed[1].1, QueryResult::Affected(3));
    assert!(completed[2].1.is_error());
}

#[test]
fn test_fast_statement_is_not_slow() {
    let monitor = Arc::new(RecordingMonitor::default());
    let transport = InstrumentedTransport::new(DummyTransport)
        .with_monitor_arc(monitor.clone())
        .with_slow_query_threshold(Duration::from_secs(3600))
        .enable_monitoring();

    transport.query("SELECT id FROM products").unwrap();
    assert_eq!(monitor.slow.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.completed.lock().unwrap().len(), 1);
}

#[test]
fn test_record_stats_is_independent_of_monitoring() {
    let transport = InstrumentedTransport::new(DummyTransport)
        .with_config(MonitorConfig::new().record_stats(true).with_stats_capacity(2));

    transport.query("SELECT id FROM products").unwrap();
    transport.execute("INSERT INTO products (id) VALUES (1)").unwrap();
    let _ = transport.query("SELECT id FROM broken");

    let stats = transport.stats();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].sql, "INSERT INTO products (id) VALUES (1)");
    assert_eq!(stats[1].error.as_deref(), Some("index 'broken' absent"));
    assert_eq!(
        transport.last_query().as_deref(),
        Some("SELECT id FROM broken")
    );
    assert!(transport.log().is_some());
}

#[test]
fn test_add_monitor_keeps_existing() {
    let first = Arc::new(RecordingMonitor::default());
    let second = Arc::new(RecordingMonitor::default());
    let transport = InstrumentedTransport::new(DummyTransport)
        .with_monitor_arc(first.clone())
        .add_monitor(CompositeMonitor::new().with_arc(second.clone()))
        .enable_monitoring();

    transport.execute("DELETE FROM products WHERE id = 1").unwrap();
    assert_eq!(first.completed.lock().unwrap().len(), 1);
    assert_eq!(second.completed.lock().unwrap().len(), 1);
}

#[test]
fn test_wrapped_transport_is_reachable() {
    let transport = InstrumentedTransport::new(DummyTransport);
    assert_eq!(transport.inner().execute("x").unwrap(), 3);
    let _inner: DummyTransport = transport.into_inner();
}

#[test]
fn test_transport_tag_reaches_monitors() {
    #[derive(Default)]
    struct TagMonitor(Mutex<Vec<Option<String>>>);
    impl QueryMonitor for TagMonitor {
        fn on_query_complete(&self, ctx: &QueryContext, _: Duration, _: &QueryResult) {
            self.0.lock().unwrap().push(ctx.tag.clone());
        }
    }

    let tags = Arc::new(TagMonitor::default());
    let tagged = InstrumentedTransport::new(DummyTransport)
        .with_monitor_arc(tags.clone())
        .with_tag("search-page")
        .enable_monitoring();
    assert_eq!(tagged.tag(), Some("search-page"));
    tagged.query("SELECT id FROM products").unwrap();

    let untagged = InstrumentedTransport::new(DummyTransport)
        .with_monitor_arc(tags.clone())
        .enable_monitoring();
    untagged.execute("DELETE FROM products WHERE id = 1").unwrap();

    assert_eq!(
        *tags.0.lock().unwrap(),
        vec![Some("search-page".to_string()), None]
    );
}

#[test]
fn test_composite_collects_from_iterator() {
    let first = Arc::new(RecordingMonitor::default());
    let second = Arc::new(RecordingMonitor::default());
    let composite: CompositeMonitor = [
        first.clone() as Arc<dyn QueryMonitor>,
        second.clone() as Arc<dyn QueryMonitor>,
    ]
    .into_iter()
    .collect();
    assert_eq!(composite.len(), 2);

    let ctx = QueryContext::new("SELECT 1");
    composite.on_query_start(&ctx);
    composite.on_slow_query(&ctx, Duration::from_secs(1));
    assert_eq!(first.started.load(Ordering::SeqCst), 1);
    assert_eq!(second.slow.load(Ordering::SeqCst), 1);
    assert!(CompositeMonitor::new().is_empty());
}
