use std::net::SocketAddr;
use std::time::Duration;

use rax_chat_server::protocol::{MessageType, Operation, Payload, StatusCode, UserListType};
use rax_chat_server::{Server, ServerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::{sleep, timeout};

// Helper to start a server on an ephemeral port
async fn start_test_server(max_clients: usize) -> SocketAddr {
    start_server_with(ServerConfig {
        max_clients,
        ..ServerConfig::default()
    })
    .await
}

async fn start_server_with(config: ServerConfig) -> SocketAddr {
    let config = ServerConfig { port: 0, ..config };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.start().await });
    addr
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn send(&mut self, request: serde_json::Value) {
        self.send_raw(&request.to_string()).await;
    }

    /// Reads the next payload, or `None` on EOF.
    async fn recv(&mut self) -> Option<Payload> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for payload")
            .unwrap();
        if n == 0 {
            return None;
        }
        Some(serde_json::from_str(&line).unwrap())
    }

    async fn request(&mut self, request: serde_json::Value) -> Payload {
        self.send(request).await;
        self.recv().await.expect("connection closed")
    }

    async fn register(&mut self, username: &str) -> Payload {
        self.request(serde_json::json!({
            "operation": "register_user",
            "username": username,
        }))
        .await
    }

    async fn user_names(&mut self) -> Vec<String> {
        let payload = self
            .request(serde_json::json!({ "operation": "get_users" }))
            .await;
        payload
            .user_list()
            .unwrap()
            .users
            .iter()
            .map(|u| u.username.clone())
            .collect()
    }
}

#[tokio::test]
async fn test_register_list_and_disconnect() {
    let addr = start_test_server(8).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    assert_eq!(alice.register("alice").await.status_code, StatusCode::Ok);
    assert_eq!(bob.register("bob").await.status_code, StatusCode::Ok);

    let payload = alice
        .request(serde_json::json!({ "operation": "get_users" }))
        .await;
    let list = payload.user_list().unwrap();
    assert_eq!(list.list_type, UserListType::All);
    let names: Vec<_> = list.users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    drop(alice);

    let mut names = bob.user_names().await;
    for _ in 0..50 {
        if names == vec!["bob"] {
            break;
        }
        sleep(Duration::from_millis(20)).await;
        names = bob.user_names().await;
    }
    assert_eq!(names, vec!["bob"]);
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let addr = start_test_server(8).await;
    let mut first = TestClient::connect(addr).await;
    let mut second = TestClient::connect(addr).await;

    assert_eq!(first.register("alice").await.status_code, StatusCode::Ok);
    let payload = second.register("alice").await;
    assert_eq!(payload.status_code, StatusCode::BadRequest);
    assert_eq!(payload.operation, Operation::RegisterUser);
}

#[tokio::test]
async fn test_single_user_lookup() {
    let addr = start_test_server(8).await;
    let mut alice = TestClient::connect(addr).await;
    alice.register("alice").await;

    let payload = alice
        .request(serde_json::json!({ "operation": "get_users", "username": "alice" }))
        .await;
    let list = payload.user_list().unwrap();
    assert_eq!(list.list_type, UserListType::Single);
    assert_eq!(list.users.len(), 1);
    assert_eq!(list.users[0].username, "alice");

    let payload = alice
        .request(serde_json::json!({ "operation": "get_users", "username": "nobody" }))
        .await;
    assert_eq!(payload.status_code, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_direct_and_broadcast_messages() {
    let addr = start_test_server(8).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    alice.register("alice").await;
    bob.register("bob").await;

    let ack = alice
        .request(serde_json::json!({
            "operation": "send_message",
            "recipient": "bob",
            "content": "hi bob",
        }))
        .await;
    assert_eq!(ack.status_code, StatusCode::Ok);

    let incoming = bob.recv().await.unwrap();
    assert_eq!(incoming.operation, Operation::IncomingMessage);
    let message = incoming.incoming_message().unwrap();
    assert_eq!(message.sender, "alice");
    assert_eq!(message.content, "hi bob");
    assert_eq!(message.message_type, MessageType::Direct);

    let ack = bob
        .request(serde_json::json!({
            "operation": "send_message",
            "content": "hello everyone",
        }))
        .await;
    assert_eq!(ack.status_code, StatusCode::Ok);

    let incoming = alice.recv().await.unwrap();
    let message = incoming.incoming_message().unwrap();
    assert_eq!(message.sender, "bob");
    assert_eq!(message.message_type, MessageType::Broadcast);
}

#[tokio::test]
async fn test_requests_before_register_and_malformed_input() {
    let addr = start_test_server(8).await;
    let mut client = TestClient::connect(addr).await;

    let payload = client
        .request(serde_json::json!({ "operation": "get_users" }))
        .await;
    assert_eq!(payload.status_code, StatusCode::BadRequest);

    client.send_raw("this is not json").await;
    let payload = client.recv().await.unwrap();
    assert_eq!(payload.status_code, StatusCode::BadRequest);
    assert_eq!(payload.operation, Operation::Unknown);

    // Connection is still usable after a bad frame.
    assert_eq!(client.register("carol").await.status_code, StatusCode::Ok);
}

#[tokio::test]
async fn test_status_update_is_reported() {
    let addr = start_test_server(8).await;
    let mut alice = TestClient::connect(addr).await;
    alice.register("alice").await;

    let payload = alice
        .request(serde_json::json!({ "operation": "update_status", "status": "offline" }))
        .await;
    assert_eq!(payload.status_code, StatusCode::Ok);

    let payload = alice
        .request(serde_json::json!({ "operation": "get_users", "username": "alice" }))
        .await;
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["result"]["user_list"]["users"][0]["status"], "offline");
}

#[tokio::test]
async fn test_unregister_closes_connection() {
    let addr = start_test_server(8).await;
    let mut alice = TestClient::connect(addr).await;
    alice.register("alice").await;

    let payload = alice
        .request(serde_json::json!({ "operation": "unregister_user" }))
        .await;
    assert_eq!(payload.status_code, StatusCode::Ok);
    assert!(alice.recv().await.is_none());

    // Name is free again once unregistered.
    let mut again = TestClient::connect(addr).await;
    assert_eq!(again.register("alice").await.status_code, StatusCode::Ok);
}

#[tokio::test]
async fn test_connection_limit() {
    let addr = start_test_server(1).await;
    let mut first = TestClient::connect(addr).await;
    assert_eq!(first.register("alice").await.status_code, StatusCode::Ok);

    let mut second = TestClient::connect(addr).await;
    let payload = second.recv().await.unwrap();
    assert_eq!(payload.status_code, StatusCode::InternalServerError);
    assert!(second.recv().await.is_none());
}

#[tokio::test]
async fn test_oversized_line_rejected_before_newline() {
    let addr = start_server_with(ServerConfig {
        max_line_length: 16,
        ..ServerConfig::default()
    })
    .await;
    let mut client = TestClient::connect(addr).await;

    // No terminator: the reply must not wait for one.
    let junk = vec![b'x'; 1 << 20];
    client.writer.write_all(&junk).await.unwrap();

    let payload = client.recv().await.unwrap();
    assert_eq!(payload.status_code, StatusCode::BadRequest);
    assert_eq!(payload.operation, Operation::Unknown);

    // Finish the oversized line; the connection keeps working.
    client.send_raw("").await;
    assert_eq!(client.register("ann").await.status_code, StatusCode::Ok);
}
