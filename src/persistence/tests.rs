use std::time::Duration;

use tempfile::TempDir;

use super::SledStore;
use crate::endpoint::Store;
use crate::relay::message::Message;

fn open_store(dir: &TempDir, ttl: Option<i64>, max: Option<usize>) -> SledStore {
    let path = dir.path().join("db");
    SledStore::open(path.to_str().unwrap(), ttl, max).expect("open sled store")
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, None);

    let a = Message::new("t", "a");
    let b = Message::new("t", "b");
    store.write_messages(&[a.clone(), b.clone()], true).await.unwrap();

    let loaded: Vec<Message> = store.read().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.contains(&a));
    assert!(loaded.contains(&b));
}

#[tokio::test]
async fn read_of_empty_store_is_empty() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, None);

    let loaded: Vec<Message> = store.read().await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn expired_messages_are_removed_on_read() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, Some(0), None);

    store
        .write_messages(&[Message::new("t", "old")], true)
        .await
        .unwrap();

    // A zero TTL expires everything older than "now".
    tokio::time::sleep(Duration::from_millis(20)).await;

    let loaded: Vec<Message> = store.read().await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn retention_cap_drops_the_oldest_messages() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, Some(2));

    for payload in ["m1", "m2", "m3"] {
        store
            .write_messages(&[Message::new("t", payload)], true)
            .await
            .unwrap();
        // Distinct write timestamps keep the key order deterministic.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let loaded: Vec<Message> = store.read().await.unwrap();
    let payloads: Vec<&str> = loaded.iter().map(|m| m.payload.as_str()).collect();
    assert_eq!(payloads, vec!["m2", "m3"]);
}

#[tokio::test]
async fn messages_come_back_in_chronological_order() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, None);

    for payload in ["first", "second", "third"] {
        store
            .write_messages(&[Message::new("t", payload)], false)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let loaded: Vec<Message> = store.read().await.unwrap();
    let payloads: Vec<&str> = loaded.iter().map(|m| m.payload.as_str()).collect();
    assert_eq!(payloads, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn close_flushes_without_error() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir, None, None);

    store
        .write_messages(&[Message::new("t", "kept")], false)
        .await
        .unwrap();
    Store::<Message>::close(&mut store).await.unwrap();
}
