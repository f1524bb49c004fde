//! End-to-end tests: real WebSocket clients against a running server.
//!
//! Round and countdown durations are shortened through `GameConfig` so
//! the timer-driven paths finish in test time; the rules themselves do
//! not depend on the durations.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use wordmeld::ServerBuilder;
use wordmeld::protocol::{ClientIntent, GamePhase, PlayerId, RoomCode, ServerEvent};
use wordmeld::room::GameConfig;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn fast_config() -> GameConfig {
    GameConfig {
        round_duration: Duration::from_millis(400),
        countdown_interval: Duration::from_millis(20),
        ..GameConfig::default()
    }
}

/// Starts a server on a random port and returns its address.
async fn start_server(config: GameConfig) -> String {
    let server = ServerBuilder::new()
        .bind("127.0.0.1:0")
        .game_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, intent: &ClientIntent) {
    let bytes = serde_json::to_vec(intent).expect("encode intent");
    ws.send(Message::Binary(bytes.into())).await.expect("send");
}

async fn recv(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("ws error");
    serde_json::from_slice(&msg.into_data()).expect("decode event")
}

/// Receives until `pick` matches, failing on a bounded number of
/// unrelated events rather than hanging.
async fn recv_until<T>(ws: &mut ClientWs, mut pick: impl FnMut(ServerEvent) -> Option<T>) -> T {
    for _ in 0..32 {
        if let Some(found) = pick(recv(ws).await) {
            return found;
        }
    }
    panic!("expected event never arrived");
}

/// Creates a room for "ada" and returns (code, host socket).
async fn create_room(addr: &str) -> (RoomCode, ClientWs) {
    let mut host = connect(addr).await;
    send(
        &mut host,
        &ClientIntent::CreateRoom {
            nickname: "ada".into(),
        },
    )
    .await;
    let code = match recv(&mut host).await {
        ServerEvent::RoomCreated { room_id } => room_id,
        other => panic!("expected room-created, got {other:?}"),
    };
    // The creator's first snapshot.
    let _ = recv(&mut host).await;
    (code, host)
}

/// Joins `nickname` to the room and drains their ack + snapshot.
async fn join_room(addr: &str, code: &RoomCode, nickname: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        &ClientIntent::JoinRoom {
            room_id: code.as_str().to_string(),
            nickname: nickname.into(),
        },
    )
    .await;
    match recv(&mut ws).await {
        ServerEvent::RoomJoined { room_id } => assert_eq!(room_id, *code),
        other => panic!("expected room-joined, got {other:?}"),
    }
    let _ = recv(&mut ws).await; // game-state
    ws
}

// =========================================================================
// Lobby flow
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_code_and_state() {
    let addr = start_server(fast_config()).await;
    let mut host = connect(&addr).await;

    send(
        &mut host,
        &ClientIntent::CreateRoom {
            nickname: "ada".into(),
        },
    )
    .await;

    let code = match recv(&mut host).await {
        ServerEvent::RoomCreated { room_id } => room_id,
        other => panic!("expected room-created, got {other:?}"),
    };
    assert_eq!(code.as_str().len(), 6);

    match recv(&mut host).await {
        ServerEvent::GameState(snap) => {
            assert_eq!(snap.id, code);
            assert_eq!(snap.state, GamePhase::Waiting);
            assert_eq!(snap.players.len(), 1);
            assert_eq!(snap.players[0].nickname, "ada");
            assert!(snap.players[0].is_host);
        }
        other => panic!("expected game-state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_broadcasts_membership_to_everyone() {
    let addr = start_server(fast_config()).await;
    let (code, mut host) = create_room(&addr).await;

    let _guest = join_room(&addr, &code, "grace").await;

    // The host sees the new roster.
    match recv(&mut host).await {
        ServerEvent::GameState(snap) => {
            assert_eq!(snap.players.len(), 2);
            assert_eq!(snap.players[1].nickname, "grace");
            assert!(!snap.players[1].is_host);
        }
        other => panic!("expected game-state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_unknown_room_gets_error_only() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientIntent::JoinRoom {
            room_id: "ZZZZ99".into(),
            nickname: "lost".into(),
        },
    )
    .await;

    match recv(&mut ws).await {
        ServerEvent::Error { message } => assert!(message.contains("not found")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_seventh_join_is_rejected_room_full() {
    let addr = start_server(fast_config()).await;
    let (code, _host) = create_room(&addr).await;

    let mut seated = Vec::new();
    for i in 2..=6 {
        seated.push(join_room(&addr, &code, &format!("p{i}")).await);
    }

    let mut late = connect(&addr).await;
    send(
        &mut late,
        &ClientIntent::JoinRoom {
            room_id: code.as_str().to_string(),
            nickname: "late".into(),
        },
    )
    .await;

    match recv(&mut late).await {
        ServerEvent::Error { message } => assert!(message.contains("full")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_game_by_guest_is_rejected() {
    let addr = start_server(fast_config()).await;
    let (code, _host) = create_room(&addr).await;
    let mut guest = join_room(&addr, &code, "grace").await;

    send(&mut guest, &ClientIntent::StartGame).await;

    match recv(&mut guest).await {
        ServerEvent::Error { message } => assert!(message.contains("host")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_before_start_is_rejected() {
    let addr = start_server(fast_config()).await;
    let (_code, mut host) = create_room(&addr).await;

    send(
        &mut host,
        &ClientIntent::SubmitWord { word: "cat".into() },
    )
    .await;

    assert!(matches!(recv(&mut host).await, ServerEvent::Error { .. }));
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_full_game_two_players_converge() {
    let addr = start_server(fast_config()).await;
    let (code, mut host) = create_room(&addr).await;
    let mut guest = join_room(&addr, &code, "grace").await;
    let _ = recv(&mut host).await; // roster update from the join

    send(&mut host, &ClientIntent::StartGame).await;

    for ws in [&mut host, &mut guest] {
        assert!(matches!(recv(ws).await, ServerEvent::GameStarted));
        match recv(ws).await {
            ServerEvent::GameState(snap) => {
                assert_eq!(snap.state, GamePhase::Playing);
                assert_eq!(snap.current_round, 1);
            }
            other => panic!("expected game-state, got {other:?}"),
        }
        assert!(matches!(
            recv(ws).await,
            ServerEvent::RoundStarted { round: 1, .. }
        ));
    }

    send(
        &mut host,
        &ClientIntent::SubmitWord {
            word: "Apple ".into(),
        },
    )
    .await;
    match recv(&mut guest).await {
        ServerEvent::WordSubmitted { nickname, .. } => assert_eq!(nickname, "ada"),
        other => panic!("expected word-submitted, got {other:?}"),
    }

    send(
        &mut guest,
        &ClientIntent::SubmitWord {
            word: "apple".into(),
        },
    )
    .await;

    // Both sockets now see: word-submitted, round-ended, game-ended.
    for ws in [&mut host, &mut guest] {
        let result = recv_until(ws, |event| match event {
            ServerEvent::RoundEnded(result) => Some(result),
            _ => None,
        })
        .await;
        assert_eq!(result.round, 1);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].word, "apple");
        assert_eq!(result.matches[0].points, 20);

        let final_result = recv_until(ws, |event| match event {
            ServerEvent::GameEnded(result) => Some(result),
            _ => None,
        })
        .await;
        assert_eq!(final_result.final_scores.len(), 2);
        assert!(final_result.final_scores.iter().all(|e| e.score == 20));
        // Tie at 20: join order breaks it.
        assert_eq!(final_result.final_scores[0].nickname, "ada");
    }
}

#[tokio::test]
async fn test_partial_match_runs_countdown_into_round_two() {
    let addr = start_server(fast_config()).await;
    let (code, mut host) = create_room(&addr).await;
    let mut b = join_room(&addr, &code, "b").await;
    let mut c = join_room(&addr, &code, "c").await;

    send(&mut host, &ClientIntent::StartGame).await;
    // Submitting before round-started reaches a socket would race the
    // game start, so everyone waits for it first.
    for ws in [&mut host, &mut b, &mut c] {
        recv_until(ws, |event| match event {
            ServerEvent::RoundStarted { round: 1, .. } => Some(()),
            _ => None,
        })
        .await;
    }

    send(&mut b, &ClientIntent::SubmitWord { word: "cat".into() }).await;
    send(&mut c, &ClientIntent::SubmitWord { word: "Cat ".into() }).await;
    send(
        &mut host,
        &ClientIntent::SubmitWord { word: "dog".into() },
    )
    .await;

    let result = recv_until(&mut b, |event| match event {
        ServerEvent::RoundEnded(result) => Some(result),
        _ => None,
    })
    .await;
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].word, "cat");
    assert_eq!(result.matches[0].points, 20);

    // Not a win: state, then the 5..0 countdown, then round 2.
    let mut expected_tick = 5u8;
    recv_until(&mut b, |event| match event {
        ServerEvent::NextRoundCountdown { countdown } => {
            assert_eq!(countdown, expected_tick);
            if countdown == 0 {
                return Some(());
            }
            expected_tick -= 1;
            None
        }
        ServerEvent::GameState(snap) => {
            assert_eq!(snap.state, GamePhase::Playing);
            None
        }
        _ => None,
    })
    .await;

    assert!(matches!(
        recv(&mut b).await,
        ServerEvent::RoundStarted { round: 2, .. }
    ));
}

#[tokio::test]
async fn test_round_timeout_advances_without_matches() {
    let addr = start_server(fast_config()).await;
    let (code, mut host) = create_room(&addr).await;
    let mut guest = join_room(&addr, &code, "grace").await;

    send(&mut host, &ClientIntent::StartGame).await;
    send(
        &mut host,
        &ClientIntent::SubmitWord { word: "solo".into() },
    )
    .await;

    // The guest never submits; the 400ms round timer ends the round.
    let result = recv_until(&mut guest, |event| match event {
        ServerEvent::RoundEnded(result) => Some(result),
        _ => None,
    })
    .await;
    assert_eq!(result.round, 1);
    assert_eq!(result.submissions.len(), 1);
    assert!(result.matches.is_empty());

    let round = recv_until(&mut guest, |event| match event {
        ServerEvent::RoundStarted { round, .. } => Some(round),
        _ => None,
    })
    .await;
    assert_eq!(round, 2);
}

#[tokio::test]
async fn test_host_disconnect_migrates_host() {
    let addr = start_server(fast_config()).await;
    let (code, host) = create_room(&addr).await;
    let mut guest = join_room(&addr, &code, "grace").await;

    drop(host); // socket closes; the server treats it as leaving

    let snap = recv_until(&mut guest, |event| match event {
        ServerEvent::GameState(snap) if snap.players.len() == 1 => Some(snap),
        _ => None,
    })
    .await;
    assert_eq!(snap.players[0].nickname, "grace");
    assert!(snap.players[0].is_host);
    assert_eq!(snap.host_id, snap.players[0].id);
}

#[tokio::test]
async fn test_word_submitted_names_the_player() {
    let addr = start_server(fast_config()).await;
    let (code, mut host) = create_room(&addr).await;
    let mut guest = join_room(&addr, &code, "grace").await;
    let _ = recv(&mut host).await; // roster update

    send(&mut host, &ClientIntent::StartGame).await;
    recv_until(&mut guest, |event| match event {
        ServerEvent::RoundStarted { round: 1, .. } => Some(()),
        _ => None,
    })
    .await;
    send(
        &mut guest,
        &ClientIntent::SubmitWord { word: "fern".into() },
    )
    .await;

    let (who, nickname) = recv_until(&mut host, |event| match event {
        ServerEvent::WordSubmitted {
            player_id,
            nickname,
        } => Some((player_id, nickname)),
        _ => None,
    })
    .await;
    assert_eq!(nickname, "grace");
    assert_ne!(who, PlayerId(0));
}
