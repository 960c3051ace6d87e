//! End-to-end relay scenarios over real endpoints: sled-backed stores on
//! disk plus channel-backed sources and sinks.

use std::collections::BTreeMap;

use tempfile::TempDir;

use relaycore::endpoint::Store;
use relaycore::endpoint::memory::{MemorySink, MemorySource};
use relaycore::persistence::SledStore;
use relaycore::relay::{Message, Relay, RelayConfig, RunState};

fn fixed(payload: &str) -> Message {
    Message {
        topic: "bridge".to_string(),
        payload: payload.to_string(),
        timestamp: 1,
        metadata: None,
    }
}

#[tokio::test]
async fn relay_moves_messages_store_to_store_with_dedup() {
    let dir_in = TempDir::new().unwrap();
    let dir_out = TempDir::new().unwrap();
    let in_path = dir_in.path().join("in_db");
    let out_path = dir_out.path().join("out_db");

    // Seed the input store, duplicate included.
    let mut store_in = SledStore::open(in_path.to_str().unwrap(), None, None).unwrap();
    store_in
        .write_messages(&[fixed("a"), fixed("a"), fixed("b")], true)
        .await
        .unwrap();

    let mut config = RelayConfig::new("bridge", "store to store");
    config.deduplicate = true;

    let mut relay: Relay<Message> = Relay::new(config);
    relay.add_store_in(store_in);
    relay.add_store_out(SledStore::open(out_path.to_str().unwrap(), None, None).unwrap());

    relay.run(1, true).await;
    assert_eq!(relay.state(), RunState::Stopped);
    relay.close().await;
    drop(relay);

    // Reopen the output store and confirm the deduplicated batch landed.
    let mut store_out = SledStore::open(out_path.to_str().unwrap(), None, None).unwrap();
    let landed: Vec<Message> = store_out.read().await.unwrap();
    let payloads: Vec<&str> = landed.iter().map(|m| m.payload.as_str()).collect();
    assert_eq!(payloads.len(), 2);
    assert!(payloads.contains(&"a"));
    assert!(payloads.contains(&"b"));
}

#[tokio::test]
async fn relay_bridges_sources_to_sinks_with_metadata_filter() {
    let mut config = RelayConfig::new("bridge", "source to sink");
    config.count = 10;
    config.filter_metadata = Some(
        [(
            "region".to_string(),
            ["us".to_string()].into_iter().collect(),
        )]
        .into_iter()
        .collect(),
    );

    let (source, tx) = MemorySource::new("feed");
    for (payload, region) in [("keep", "us"), ("drop", "eu")] {
        tx.send(
            fixed(payload).with_metadata(BTreeMap::from([(
                "region".to_string(),
                region.to_string(),
            )])),
        )
        .unwrap();
    }
    drop(tx);

    let sink = MemorySink::new("collector");
    let delivered = sink.delivered();

    let mut relay = Relay::new(config);
    relay.add_consumer(source);
    relay.add_producer(sink);

    relay.run(1, true).await;
    relay.close().await;

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].payload, "keep");
}
