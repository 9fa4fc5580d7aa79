//! End-to-end polling against a mock RPC node.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use blockwatch::{Field, Poller, RpcClient, TelemetryFeed};
use mockito::{Mock, Server, ServerGuard};

fn localhost_binding_permitted() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

async fn mock_node(server: &mut ServerGuard, validators_status: usize) -> Vec<Mock> {
    let header = server
        .mock("GET", "/header")
        .with_body(
            r#"{"jsonrpc":"2.0","id":-1,"result":{"header":{"height":"2048","time":"2024-03-05T14:07:09.123456789Z"}}}"#,
        )
        .create_async()
        .await;
    let params = server
        .mock("GET", "/consensus_params")
        .with_body(
            r#"{"result":{"consensus_params":{"block":{"max_bytes":"1974272","max_gas":"-1"}}}}"#,
        )
        .create_async()
        .await;
    let abci = server
        .mock("GET", "/abci_info")
        .with_body(r#"{"result":{"response":{"data":"celestia-app","version":"1.3.0"}}}"#)
        .create_async()
        .await;
    let txs = server
        .mock("GET", "/unconfirmed_txs")
        .with_body(r#"{"result":{"n_txs":"14","total":"14","total_bytes":"5120","txs":[]}}"#)
        .create_async()
        .await;
    let validators = server
        .mock("GET", "/validators")
        .with_status(validators_status)
        .with_body(r#"{"result":{"count":"0","total":"100","validators":[]}}"#)
        .create_async()
        .await;

    vec![header, params, abci, txs, validators]
}

fn client_for(server: &ServerGuard) -> Arc<RpcClient> {
    Arc::new(
        RpcClient::builder()
            .endpoint(server.url())
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap(),
    )
}

async fn next_view(feed: &mut TelemetryFeed) {
    let changed = tokio::time::timeout(Duration::from_secs(5), feed.changed())
        .await
        .expect("no telemetry published");
    assert!(changed);
}

#[tokio::test]
async fn first_cycle_loads_every_field() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _mocks = mock_node(&mut server, 200).await;

    let handle = Poller::builder(client_for(&server))
        .interval(Duration::from_secs(60))
        .build()
        .start();
    let mut feed = handle.feed();
    next_view(&mut feed).await;

    let telemetry = feed.latest();
    let snapshot = &telemetry.snapshot;
    assert_eq!(snapshot.height, Field::Loaded(2048));
    assert_eq!(
        snapshot.block_time,
        Field::Loaded("5/3/2024, 14:07:09".to_string())
    );
    assert_eq!(snapshot.max_bytes, Field::Loaded(1974272));
    assert_eq!(snapshot.binary_name, Field::Loaded("celestia-app".to_string()));
    assert_eq!(snapshot.binary_version, Field::Loaded("1.3.0".to_string()));
    assert_eq!(snapshot.total_validators, Field::Loaded(100));
    assert_eq!(snapshot.unconfirmed_count, Field::Loaded(14));
    assert_eq!(snapshot.unconfirmed_bytes, Field::Loaded(5120));

    assert_eq!(telemetry.history.tx_count.latest(), 14);
    assert_eq!(telemetry.history.tx_bytes.latest(), 5120);
    assert_eq!(telemetry.transition.previous_block_time_label(), "waiting");
    assert_eq!(telemetry.pulse.generation(), 1);

    handle.stop().await;
}

#[tokio::test]
async fn failing_endpoint_leaves_only_its_field_unloaded() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _mocks = mock_node(&mut server, 500).await;

    let handle = Poller::builder(client_for(&server))
        .interval(Duration::from_secs(60))
        .build()
        .start();
    let mut feed = handle.feed();
    next_view(&mut feed).await;

    let snapshot = feed.latest().snapshot;
    assert_eq!(snapshot.total_validators, Field::Unloaded);
    assert_eq!(snapshot.height, Field::Loaded(2048));
    assert_eq!(snapshot.unconfirmed_count, Field::Loaded(14));

    handle.stop().await;
}

#[tokio::test]
async fn disabled_validators_are_never_requested() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _header = server
        .mock("GET", "/header")
        .with_body(r#"{"result":{"header":{"height":"7","time":"2024-03-05T14:07:09Z"}}}"#)
        .create_async()
        .await;
    let validators = server
        .mock("GET", "/validators")
        .expect(0)
        .create_async()
        .await;

    let handle = Poller::builder(client_for(&server))
        .interval(Duration::from_secs(60))
        .validators(false)
        .build()
        .start();
    let mut feed = handle.feed();
    next_view(&mut feed).await;

    let snapshot = feed.latest().snapshot;
    assert_eq!(snapshot.height, Field::Loaded(7));
    // Unmocked endpoints answer 501 and stay unloaded
    assert_eq!(snapshot.max_bytes, Field::Unloaded);

    handle.stop().await;
    validators.assert_async().await;
}

#[tokio::test]
async fn feed_closes_after_stop() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _mocks = mock_node(&mut server, 200).await;

    let handle = Poller::builder(client_for(&server))
        .interval(Duration::from_secs(60))
        .build()
        .start();
    let mut feed = handle.feed();
    next_view(&mut feed).await;

    handle.stop().await;
    assert!(!feed.changed().await);
    assert_eq!(feed.latest().cycles_applied, 1);
}
