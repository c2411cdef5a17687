// tests/unit_session_test.rs

use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::DuplexStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tradepost::config::Config;
use tradepost::connection::ConnectionHandler;
use tradepost::core::TradePostError;
use tradepost::core::cache::AccountCache;
use tradepost::core::engine::AccountEngine;
use tradepost::core::protocol::{ClientCodec, RequestKind, WireRequest, WireResponse};
use tradepost::core::state::ServerState;
use tradepost::core::store::AccountStore;

type TestClient = Framed<DuplexStream, ClientCodec>;

/// Spawns a connection handler over an in-process duplex pipe and returns the
/// client side of it.
async fn spawn_session() -> (
    TestClient,
    JoinHandle<Result<(), TradePostError>>,
    broadcast::Sender<()>,
) {
    let store = AccountStore::open_in_memory().await.unwrap();
    let engine = AccountEngine::new(AccountCache::new(5), store);
    let state = Arc::new(ServerState::new(Config::default(), engine));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();

    let handle = tokio::spawn(async move {
        let mut handler = ConnectionHandler::new(server_io, addr, state, 1, shutdown_rx);
        handler.run().await
    });
    (Framed::new(client_io, ClientCodec::new()), handle, shutdown_tx)
}

async fn roundtrip(client: &mut TestClient, request: WireRequest) -> WireResponse {
    client.send(request).await.unwrap();
    client.next().await.unwrap().unwrap()
}

fn login(nickname: &str) -> WireRequest {
    WireRequest::new(RequestKind::Login, json!({ "nickname": nickname }))
}

#[tokio::test]
async fn test_login_returns_account_and_catalog() {
    let (mut client, _handle, _shutdown) = spawn_session().await;
    let response = roundtrip(&mut client, login("Ada")).await;
    assert!(response.is_success());

    let account = &response.payload["account"];
    assert_eq!(account["nickname"], "Ada");
    assert!(account["credits"].as_i64().unwrap() >= 1500);

    let items = response.payload["items"].as_object().unwrap();
    assert_eq!(items.len(), 15);
    assert_eq!(items["Johan"], 1500);
}

#[tokio::test]
async fn test_request_before_login_is_rejected() {
    let (mut client, handle, _shutdown) = spawn_session().await;
    let request = WireRequest::new(RequestKind::GetBalance, json!({ "nickname": "Ada" }));
    let response = roundtrip(&mut client, request).await;
    assert!(!response.is_success());

    // The rejection is an error response, not a connection failure: the same
    // session can still log in afterwards.
    let response = roundtrip(&mut client, login("Ada")).await;
    assert!(response.is_success());
    assert!(!handle.is_finished());
}

#[tokio::test]
async fn test_unknown_request_kind_is_not_fatal() {
    let (mut client, handle, _shutdown) = spawn_session().await;
    roundtrip(&mut client, login("Ada")).await;

    let bogus = WireRequest {
        kind: 99,
        payload: Map::new(),
    };
    let response = roundtrip(&mut client, bogus).await;
    assert!(!response.is_success());
    assert!(
        response
            .payload
            .get("message")
            .and_then(Value::as_str)
            .is_some()
    );

    let request = WireRequest::new(RequestKind::GetBalance, json!({ "nickname": "Ada" }));
    assert!(roundtrip(&mut client, request).await.is_success());
    assert!(!handle.is_finished());
}

#[tokio::test]
async fn test_buy_and_sell_flow() {
    let (mut client, _handle, _shutdown) = spawn_session().await;
    let response = roundtrip(&mut client, login("Ada")).await;
    let start = response.payload["account"]["credits"].as_i64().unwrap();

    let buy = WireRequest::new(
        RequestKind::BuyItem,
        json!({ "nickname": "Ada", "item_name": "Johan" }),
    );
    let response = roundtrip(&mut client, buy).await;
    assert!(response.is_success());
    assert_eq!(
        response.payload["account"]["credits"].as_i64().unwrap(),
        start - 1500
    );

    let sell = WireRequest::new(
        RequestKind::SellItem,
        json!({ "nickname": "Ada", "item_name": "Johan" }),
    );
    let response = roundtrip(&mut client, sell).await;
    assert!(response.is_success());
    assert_eq!(
        response.payload["account"]["credits"].as_i64().unwrap(),
        start - 750
    );
}

#[tokio::test]
async fn test_business_errors_keep_session_alive() {
    let (mut client, handle, _shutdown) = spawn_session().await;
    roundtrip(&mut client, login("Ada")).await;

    let buy_unknown = WireRequest::new(
        RequestKind::BuyItem,
        json!({ "nickname": "Ada", "item_name": "Bismarck" }),
    );
    assert!(!roundtrip(&mut client, buy_unknown).await.is_success());

    let sell_unowned = WireRequest::new(
        RequestKind::SellItem,
        json!({ "nickname": "Ada", "item_name": "Malta" }),
    );
    assert!(!roundtrip(&mut client, sell_unowned).await.is_success());

    let balance = WireRequest::new(RequestKind::GetBalance, json!({ "nickname": "Ada" }));
    assert!(roundtrip(&mut client, balance).await.is_success());
    assert!(!handle.is_finished());
}

#[tokio::test]
async fn test_logout_answers_then_closes() {
    let (mut client, handle, _shutdown) = spawn_session().await;
    roundtrip(&mut client, login("Ada")).await;

    let response = roundtrip(&mut client, WireRequest::new(RequestKind::Logout, json!({}))).await;
    assert!(response.is_success());
    assert_eq!(
        response.payload["message"].as_str().unwrap(),
        "Logged out successfully."
    );

    // The server side ends the session; the stream reports end-of-stream.
    assert!(client.next().await.is_none());
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_client_disconnect_ends_session() {
    let (client, handle, _shutdown) = spawn_session().await;
    drop(client);
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_signal_notifies_client() {
    let (mut client, handle, shutdown_tx) = spawn_session().await;
    roundtrip(&mut client, login("Ada")).await;

    shutdown_tx.send(()).unwrap();
    let response = client.next().await.unwrap().unwrap();
    assert!(!response.is_success());
    handle.await.unwrap().unwrap();
}
