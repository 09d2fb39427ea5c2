//! End-to-end tests: a real server on a loopback port, real WebSocket
//! clients, real JWTs.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chat_gateway::app_state::AppState;
use chat_gateway::auth::{Claims, TokenUser};
use chat_gateway::config::GatewayConfig;
use chat_gateway::server;

const SECRET: &str = "integration-secret";
const WAIT: Duration = Duration::from_secs(5);

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_gateway() -> SocketAddr {
    let Ok(config) = GatewayConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "LISTEN_ADDR" => Some("127.0.0.1:0".to_string()),
        _ => None,
    }) else {
        panic!("config");
    };
    let app = server::router(AppState::from_config(&config));
    let Ok(listener) = TcpListener::bind(config.listen_addr).await else {
        panic!("bind");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn mint(id: &str, username: &str, exp_offset: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user: TokenUser {
            id: id.to_string(),
            username: username.to_string(),
        },
        iat: now,
        exp: now + exp_offset,
    };
    let Ok(token) = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    ) else {
        panic!("mint token");
    };
    token
}

async fn connect(addr: SocketAddr, token: &str) -> Client {
    let Ok((client, _)) = connect_async(format!("ws://{addr}/ws?token={token}")).await else {
        panic!("handshake should succeed");
    };
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(message))) = timeout(WAIT, client.next()).await else {
            panic!("no frame from gateway");
        };
        if let Message::Text(text) = message {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("invalid JSON frame: {text}");
            };
            return value;
        }
    }
}

async fn expect(client: &mut Client, event: &str, data: Value) {
    let msg = next_json(client).await;
    assert_eq!(msg["event"], event, "got {msg}");
    match event {
        "user_list" => assert_eq!(msg["data"], data),
        _ => {
            for (key, value) in data.as_object().into_iter().flatten() {
                assert_eq!(&msg["data"][key], value, "field {key} in {msg}");
            }
        }
    }
}

async fn say(client: &mut Client, text: &str) {
    let frame = json!({"event": "send_message", "data": {"message": text}}).to_string();
    let Ok(()) = client.send(Message::text(frame)).await else {
        panic!("send failed");
    };
}

async fn online(addr: SocketAddr) -> Value {
    let Ok(response) = reqwest::get(format!("http://{addr}/api/v1/presence")).await else {
        panic!("presence request");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("presence body");
    };
    body
}

fn assert_unauthorized(result: Result<impl Sized, tungstenite::Error>) {
    match result {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        Err(other) => panic!("expected HTTP 401, got {other}"),
        Ok(_) => panic!("handshake should be refused"),
    }
}

#[tokio::test]
async fn two_users_chat_and_leave() {
    let addr = spawn_gateway().await;

    let mut alice = connect(addr, &mint("u-alice", "alice", 3600, SECRET)).await;
    expect(&mut alice, "system_message", json!({"message": "alice joined the chat"})).await;
    expect(&mut alice, "user_list", json!(["alice"])).await;

    let mut bob = connect(addr, &mint("u-bob", "bob", 3600, SECRET)).await;
    for client in [&mut alice, &mut bob] {
        expect(client, "system_message", json!({"message": "bob joined the chat"})).await;
        expect(client, "user_list", json!(["bob", "alice"])).await;
    }

    say(&mut alice, "hello").await;
    for client in [&mut alice, &mut bob] {
        expect(
            client,
            "receive_message",
            json!({"username": "alice", "message": "hello", "userId": "u-alice"}),
        )
        .await;
    }

    let Ok(()) = bob.close(None).await else {
        panic!("close failed");
    };
    expect(&mut alice, "system_message", json!({"message": "bob left the chat"})).await;
    expect(&mut alice, "user_list", json!(["alice"])).await;

    let presence = online(addr).await;
    assert_eq!(presence["online"], json!(["alice"]));
    assert_eq!(presence["count"], 1);
}

#[tokio::test]
async fn bad_tokens_are_refused_before_upgrade() {
    let addr = spawn_gateway().await;

    let expired = mint("u-eve", "eve", -600, SECRET);
    assert_unauthorized(connect_async(format!("ws://{addr}/ws?token={expired}")).await);

    let forged = mint("u-eve", "eve", 3600, "not-the-secret");
    assert_unauthorized(connect_async(format!("ws://{addr}/ws?token={forged}")).await);

    assert_unauthorized(connect_async(format!("ws://{addr}/ws")).await);

    assert_eq!(online(addr).await["count"], 0);
}

#[tokio::test]
async fn refused_handshake_is_invisible_to_connected_users() {
    let addr = spawn_gateway().await;
    let mut alice = connect(addr, &mint("u-alice", "alice", 3600, SECRET)).await;
    expect(&mut alice, "system_message", json!({"message": "alice joined the chat"})).await;
    expect(&mut alice, "user_list", json!(["alice"])).await;

    let expired = mint("u-eve", "eve", -600, SECRET);
    assert_unauthorized(connect_async(format!("ws://{addr}/ws?token={expired}")).await);
    assert_unauthorized(connect_async(format!("ws://{addr}/ws?token=garbage")).await);

    // Nothing was broadcast for eve: alice's next frame is her own chat.
    say(&mut alice, "anyone there?").await;
    expect(
        &mut alice,
        "receive_message",
        json!({"username": "alice", "message": "anyone there?"}),
    )
    .await;
    assert_eq!(online(addr).await["online"], json!(["alice"]));
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let addr = spawn_gateway().await;
    let Ok(mut request) = format!("ws://{addr}/ws").into_client_request() else {
        panic!("request");
    };
    let token = mint("u-carol", "carol", 3600, SECRET);
    let Ok(value) = format!("Bearer {token}").parse::<tungstenite::http::HeaderValue>() else {
        panic!("header value");
    };
    request.headers_mut().insert("authorization", value);

    let Ok((mut carol, _)) = connect_async(request).await else {
        panic!("handshake should succeed");
    };
    expect(&mut carol, "system_message", json!({"message": "carol joined the chat"})).await;
    expect(&mut carol, "user_list", json!(["carol"])).await;
}

#[tokio::test]
async fn blank_messages_are_not_broadcast() {
    let addr = spawn_gateway().await;
    let mut alice = connect(addr, &mint("u-alice", "alice", 3600, SECRET)).await;
    expect(&mut alice, "system_message", json!({"message": "alice joined the chat"})).await;
    expect(&mut alice, "user_list", json!(["alice"])).await;

    say(&mut alice, "   ").await;
    say(&mut alice, "  real  ").await;
    expect(
        &mut alice,
        "receive_message",
        json!({"username": "alice", "message": "real"}),
    )
    .await;
}

#[tokio::test]
async fn health_endpoint_responds() {
    let addr = spawn_gateway().await;
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request");
    };
    assert_eq!(response.status(), 200);
    let Ok(body) = response.json::<Value>().await else {
        panic!("health body");
    };
    assert_eq!(body["status"], "healthy");
}
