use std::time::Duration;

use super::memory::{MemoryDuplex, MemorySink, MemorySource, MemoryStore};
use super::{Endpoint, Sink, Source, Store};

#[tokio::test]
async fn memory_source_returns_at_most_the_requested_count() {
    let (mut source, tx) = MemorySource::new("src");
    for i in 0..5 {
        tx.send(format!("m{i}")).unwrap();
    }
    drop(tx);

    let first = source
        .get_messages(3, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(first, vec!["m0", "m1", "m2"]);

    // The rest stays queued for the next fetch.
    let second = source
        .get_messages(10, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(second, vec!["m3", "m4"]);
}

#[tokio::test]
async fn memory_source_with_zero_capacity_fetches_nothing() {
    let (mut source, tx) = MemorySource::new("src");
    tx.send("m".to_string()).unwrap();

    let fetched = source
        .get_messages(0, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(fetched.is_empty());
}

#[tokio::test(start_paused = true)]
async fn memory_source_gives_up_at_the_timeout() {
    let (mut source, tx) = MemorySource::<String>::new("src");

    let start = tokio::time::Instant::now();
    let fetched = source
        .get_messages(5, Duration::from_secs(2))
        .await
        .unwrap();

    assert!(fetched.is_empty());
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    drop(tx);
}

#[tokio::test]
async fn memory_source_finishes_early_when_the_feed_closes() {
    let (mut source, tx) = MemorySource::new("src");
    tx.send("only".to_string()).unwrap();
    drop(tx);

    // Asking for more than is queued must not wait out the timeout.
    let fetched = source
        .get_messages(10, Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(fetched, vec!["only"]);
}

#[tokio::test]
async fn memory_sink_collects_batches_in_order() {
    let mut sink = MemorySink::new("sink");
    let delivered = sink.delivered();

    sink.send_messages(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    sink.send_messages(&["c".to_string()]).await.unwrap();

    assert_eq!(*delivered.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(sink.name(), "sink");
}

#[tokio::test]
async fn memory_duplex_acts_as_both_source_and_sink() {
    let (mut duplex, tx) = MemoryDuplex::new("dup");
    tx.send("in".to_string()).unwrap();
    drop(tx);

    let fetched = duplex
        .get_messages(5, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(fetched, vec!["in"]);

    duplex.send_messages(&["out".to_string()]).await.unwrap();
    assert_eq!(*duplex.delivered().lock().unwrap(), vec!["out"]);
}

#[tokio::test]
async fn memory_store_reads_are_non_draining() {
    let mut store = MemoryStore::new();
    store
        .write_messages(&["a".to_string(), "b".to_string()], true)
        .await
        .unwrap();

    assert_eq!(store.read().await.unwrap(), vec!["a", "b"]);
    assert_eq!(store.read().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn closed_memory_source_drains_what_was_buffered() {
    let (mut source, tx) = MemorySource::new("src");
    tx.send("buffered".to_string()).unwrap();

    source.close().await.unwrap();

    let fetched = source
        .get_messages(5, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(fetched, vec!["buffered"]);
}
