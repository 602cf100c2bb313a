use evrima_rcon_client::packet::{decode_auth_packet, decode_command_packet, TERMINATOR};
use evrima_rcon_client::{
    ClientOptions, ConnectionState, ErrorKind, RconClient, ResponseData, ServerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const PASSWORD: &str = "secret";

/// How the test server treats each accepted connection.
#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Answer every request.
    Normal,
    /// Close the first connection after answering one command.
    DropAfterFirstCommand,
    /// Close the first connection on its first command without answering it.
    DropFirstCommandUnanswered,
    /// Close every connection on its first command without answering it.
    DropEveryCommand,
    /// Accept the connection and never reply.
    Silent,
}

struct TestServer {
    port: u16,
    connections: Arc<AtomicUsize>,
}

async fn spawn_server(behavior: Behavior) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = connections.clone();
    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            let index = counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve(socket, behavior, index));
        }
    });

    TestServer { port, connections }
}

async fn serve(mut socket: TcpStream, behavior: Behavior, index: usize) {
    let mut pending = Vec::new();
    let mut buf = [0u8; 1024];
    let mut commands = 0;

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        pending.extend_from_slice(&buf[..n]);

        while let Some(end) = pending.iter().position(|b| *b == TERMINATOR) {
            let packet: Vec<u8> = pending.drain(..=end).collect();

            if let Behavior::Silent = behavior {
                continue;
            }

            let reply = if let Some(password) = decode_auth_packet(&packet) {
                if password == PASSWORD {
                    "Password Accepted".to_string()
                } else {
                    "Password incorrect".to_string()
                }
            } else if let Some((opcode, params)) = decode_command_packet(&packet) {
                commands += 1;
                let unanswered = match behavior {
                    Behavior::DropFirstCommandUnanswered => index == 0,
                    Behavior::DropEveryCommand => true,
                    _ => false,
                };
                if unanswered {
                    return;
                }
                respond(opcode, &params)
            } else {
                "Unknown packet".to_string()
            };

            let mut bytes: Vec<u8> = reply.chars().map(|c| c as u32 as u8).collect();
            bytes.push(TERMINATOR);
            if socket.write_all(&bytes).await.is_err() {
                return;
            }

            if let Behavior::DropAfterFirstCommand = behavior {
                if index == 0 && commands == 1 {
                    return;
                }
            }
        }
    }
}

fn respond(opcode: u8, params: &str) -> String {
    match opcode {
        0x10 => format!("Announced: {}", params),
        0x12 => "ServerDetails\nServerName: Test Isle, ServerMap: Gateway, ServerMaxPlayers: 100\nServerDetailsEnd".to_string(),
        0x40 => "PlayerList\n76561198000000001,76561198000000002,\nAlice,Bob,\nE1,E2,".to_string(),
        0x50 => "World saved".to_string(),
        _ => format!("Executed 0x{:02x} {}", opcode, params),
    }
}

fn options() -> ClientOptions {
    ClientOptions::default()
        .with_timeout(Duration::from_secs(2))
        .with_reconnect_delay(Duration::from_millis(100))
        .with_name("test")
}

fn client(port: u16, password: &str, options: ClientOptions) -> RconClient {
    let server = ServerConfig::new("127.0.0.1", port, password).unwrap();
    RconClient::new(server, options).unwrap()
}

#[tokio::test]
async fn connects_and_announces() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());

    client.connect().await.unwrap();
    assert!(client.is_connected());
    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.name(), "test");

    // Already connected, so this is a no-op.
    client.connect().await.unwrap();
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);

    let result = client.send_command("announce", Some("hello")).await.unwrap();
    assert!(result.success);
    assert_eq!(result.command, "announce");
    assert!(result.raw.contains("hello"));
    assert_eq!(result.data, ResponseData::Text("Announced: hello".to_string()));

    client.disconnect();
    client.disconnect();
    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn wrong_password_fails_authentication() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, "wrong", options().with_auto_reconnect(false));

    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailed);
    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn structured_responses_are_parsed() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();

    let players = client.players().await.unwrap();
    match &players.data {
        ResponseData::Players(list) => {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].id, "76561198000000001");
            assert_eq!(list[1].name, "Bob");
            assert_eq!(list[1].eos_id.as_deref(), Some("E2"));
        }
        other => panic!("unexpected data: {:?}", other),
    }

    let details = client.server_details().await.unwrap();
    match &details.data {
        ResponseData::ServerDetails(details) => {
            assert_eq!(details.name.as_deref(), Some("Test Isle"));
            assert_eq!(details.map.as_deref(), Some("Gateway"));
            assert_eq!(details.max_players, Some(100));
        }
        other => panic!("unexpected data: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_command_is_a_soft_failure() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();

    let result = client.send_command("teleport", Some("x")).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.command, "teleport");
    assert!(result.text().contains("Unknown command"));
    assert!(client.is_connected());
}

#[tokio::test]
async fn missing_required_params_are_rejected() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();

    let err = client.send_command("kick", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCommand);

    let err = client.kick("not-a-steam-id", "AFK").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCommand);

    let result = client.kick("76561198000000001", "AFK").await.unwrap();
    assert_eq!(result.text(), "Executed 0x30 76561198000000001,AFK");
}

#[tokio::test]
async fn reconnects_after_drop() {
    let server = spawn_server(Behavior::DropAfterFirstCommand).await;
    let mut client = client(
        server.port,
        PASSWORD,
        options().with_auto_reconnect(true).with_max_reconnect_attempts(3),
    );
    client.connect().await.unwrap();

    let first = client.save(None).await.unwrap();
    assert!(first.success);

    // Give the close time to arrive.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = client.announce("still there?").await.unwrap();
    assert!(second.success);
    assert!(second.raw.contains("still there?"));
    assert_eq!(client.reconnect_attempts(), 0);
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn command_lost_mid_flight_is_retried_once() {
    let server = spawn_server(Behavior::DropFirstCommandUnanswered).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();
    assert!(client.is_connected());

    // The server closes while the command is in flight, so the failure is seen on receive.
    let result = client.announce("retried").await.unwrap();
    assert!(result.success);
    assert_eq!(result.raw, "Announced: retried\0");
    assert_eq!(client.reconnect_attempts(), 0);
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    assert!(client.is_connected());
}

#[tokio::test]
async fn failed_retry_is_not_retried_again() {
    let server = spawn_server(Behavior::DropEveryCommand).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();

    let err = client.save(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SocketError);
    assert!(err.is_connection_error());
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn connects_lazily_when_auto_reconnect_is_enabled() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());

    let result = client.save(Some("backup")).await.unwrap();
    assert!(result.success);
    assert!(client.is_connected());
}

#[tokio::test]
async fn not_connected_without_auto_reconnect() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options().with_auto_reconnect(false));

    let err = client.send_command("save", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConnected);
    assert_eq!(server.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn silent_server_times_out() {
    let server = spawn_server(Behavior::Silent).await;
    let mut client = client(
        server.port,
        PASSWORD,
        options()
            .with_auto_reconnect(false)
            .with_timeout(Duration::from_millis(200)),
    );

    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn refused_connection_without_retry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = client(port, PASSWORD, options().with_auto_reconnect(false));
    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
    assert_eq!(client.reconnect_attempts(), 0);
}

#[tokio::test]
async fn reconnect_attempts_are_bounded() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = client(port, PASSWORD, options().with_max_reconnect_attempts(2));

    let started = tokio::time::Instant::now();
    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
    assert_eq!(client.reconnect_attempts(), 2);

    // 100ms then 200ms of backoff.
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn batch_preserves_order_and_continues() {
    let server = spawn_server(Behavior::Normal).await;
    let mut client = client(server.port, PASSWORD, options());
    client.connect().await.unwrap();

    let results = client
        .batch(vec![
            ("announce", Some("Saving soon")),
            ("bogus", None),
            ("save", None),
        ])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].command, "announce");
    assert!(results[0].success);
    assert_eq!(results[1].command, "bogus");
    assert!(!results[1].success);
    assert_eq!(results[2].command, "save");
    assert_eq!(results[2].text(), "World saved");
}

#[tokio::test]
async fn timeout_without_auto_reconnect_is_reported_in_result() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Accept the password, then never answer a command.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 256];
        socket.read(&mut buf).await.unwrap();
        socket.write_all(b"Password Accepted\0").await.unwrap();
        let _ = socket.read(&mut buf).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = client(
        port,
        PASSWORD,
        options()
            .with_auto_reconnect(false)
            .with_timeout(Duration::from_millis(200)),
    );
    client.connect().await.unwrap();

    let result = client.send_command("save", None).await.unwrap();
    assert!(!result.success);
    assert!(result.text().contains("timed out"));
}
