use std::collections::HashSet;

use testbed_harness::activity::{ActivityLog, EventId, EventKind};

#[test]
fn test_append_is_newest_first_with_increasing_ids() {
    let log = ActivityLog::new();
    let ids: Vec<EventId> = (0..5).map(|i| log.info(format!("event {i}"), "Test")).collect();

    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "ids must be strictly increasing");
    }

    let events = log.snapshot();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0].message, "event 4", "newest event comes first");
    assert_eq!(events[4].message, "event 0");
    for pair in events.windows(2) {
        assert!(pair[0].id > pair[1].id);
    }
}

#[test]
fn test_rapid_appends_never_share_an_id() {
    // Thousands of appends inside the same millisecond.
    let log = ActivityLog::new();
    let ids: HashSet<EventId> = (0..5_000).map(|_| log.info("tick", "Test")).collect();
    assert_eq!(ids.len(), 5_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_unique() {
    let log = ActivityLog::new();
    let mut tasks = Vec::new();
    for worker in 0..4 {
        let log = log.clone();
        tasks.push(tokio::spawn(async move {
            (0..250).map(|i| log.info(format!("{worker}-{i}"), "Worker")).collect::<Vec<_>>()
        }));
    }

    let mut all = HashSet::new();
    for task in tasks {
        for id in task.await.unwrap() {
            assert!(all.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(all.len(), 1_000);
    assert_eq!(log.len(), 1_000);
}

#[test]
fn test_bounded_log_evicts_oldest() {
    let log = ActivityLog::bounded(3);
    for i in 1..=5 {
        log.info(format!("event {i}"), "Test");
    }

    let messages: Vec<String> = log.snapshot().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["event 5", "event 4", "event 3"]);
    assert_eq!(log.capacity(), Some(3));
}

#[test]
fn test_subscriber_sees_initial_sequence_then_every_append() {
    let log = ActivityLog::new();
    log.info("before", "Test");

    let mut feed = log.subscribe();
    assert_eq!(feed.current().len(), 1);
    assert_eq!(feed.current()[0].message, "before");

    log.success("first", "Test");
    log.error("second", "Test");

    let first = feed.try_recv().expect("first append delivered");
    let second = feed.try_recv().expect("second append delivered");
    assert_eq!(first.message, "first");
    assert_eq!(first.kind, EventKind::Success);
    assert_eq!(second.message, "second");
    assert_eq!(second.kind, EventKind::Error);
    assert!(feed.try_recv().is_none());

    let view: Vec<&str> = feed.current().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(view, vec!["second", "first", "before"]);
}

#[tokio::test]
async fn test_changed_yields_full_sequence() {
    let log = ActivityLog::bounded(2);
    let mut feed = log.subscribe();

    log.info("a", "Test");
    log.info("b", "Test");
    log.info("c", "Test");

    assert_eq!(feed.changed().await.unwrap().len(), 1);
    assert_eq!(feed.changed().await.unwrap().len(), 2);
    let full = feed.changed().await.unwrap();
    let messages: Vec<&str> = full.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["c", "b"], "subscriber mirror honours the same capacity");
}

#[test]
fn test_dropped_subscribers_are_pruned() {
    let log = ActivityLog::new();
    let feed = log.subscribe();
    let _kept = log.subscribe();
    assert_eq!(log.subscriber_count(), 2);

    drop(feed);
    log.info("after drop", "Test");
    assert_eq!(log.subscriber_count(), 1);
}

#[test]
fn test_event_serializes_kind_as_type() {
    let log = ActivityLog::new();
    log.success("ok", "Pagos");
    let json = serde_json::to_value(&log.snapshot()[0]).unwrap();
    assert_eq!(json["type"], "success");
    assert_eq!(json["source"], "Pagos");
    assert_eq!(json["id"], 1);
}
