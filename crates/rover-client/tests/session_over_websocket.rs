//! Drives a session against a scripted rover server on localhost.

use futures_util::{SinkExt, StreamExt};
use rover_client::{connect, run, ClientConfig, ClientId, ReadyState, RecordingSink, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

async fn push(ws: &mut WebSocketStream<TcpStream>, frame: Value) {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

async fn next_call(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("connection ended early: {other:?}"),
        }
    }
}

#[tokio::test]
async fn driver_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        push(
            &mut ws,
            json!({"jsonrpc": "2.0", "method": "setClientId", "params": [5000]}),
        )
        .await;

        let info = next_call(&mut ws).await;
        assert_eq!(info["method"], "setClientInformation");
        assert_eq!(info["params"][0], 5000);

        let enter = next_call(&mut ws).await;
        assert_eq!(enter["method"], "enterDriverMode");
        assert_eq!(enter["params"], json!([5000]));
        assert!(enter["id"].as_u64() > info["id"].as_u64());

        push(
            &mut ws,
            json!({"jsonrpc": "2.0", "method": "updateRoverState",
                   "params": [{"currentDriverId": 5000, "isKillswitchEnabled": false}]}),
        )
        .await;
        push(&mut ws, json!({"method": "bogus", "params": []})).await;
        push(
            &mut ws,
            json!({"jsonrpc": "2.0", "method": "incomingNotification",
                   "params": ["client 5000 is now driving"]}),
        )
        .await;
        ws.close(None).await.unwrap();
    });

    let connection = connect(&format!("ws://{addr}/rover")).await.unwrap();
    let sink = Arc::new(RecordingSink::new());
    let mut session = Session::new(ClientConfig::default(), connection.sender(), sink.clone());
    session.set_current_view("/drive");

    let driver = tokio::spawn(session.enter_driver_mode());
    run(connection, &mut session).await;

    assert_eq!(driver.await.unwrap(), Ok(ClientId::new(5000)));
    server.await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.ready_state, ReadyState::Closed);
    assert_eq!(snapshot.client_id, ClientId::new(5000));
    assert!(snapshot.rover.is_driver_available);
    assert!(!snapshot.rover.is_killswitch_enabled);
    assert_eq!(snapshot.notifications, ["client 5000 is now driving"]);
    assert_eq!(sink.events().len(), 1);
}
