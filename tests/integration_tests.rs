//! Integration tests for the host/client sync core
//!
//! These tests run a real host session on localhost and talk to it through
//! real TCP clients.

use client::network::{ClientSession, ConnectError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::game::HostGame;
use server::network::{HostConfig, HostSession};
use shared::protocol::encode_input;
use shared::{
    read_frame, write_frame, Color, Direction, Position, Snake, Snapshot, World, ARENA,
    GRID_COLUMNS, GRID_ROWS, MAX_FRAME_LEN, SQ,
};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::sleep;

async fn running_host(frames_per_step: u32, max_players: usize) -> HostSession {
    let config = HostConfig {
        max_players,
        frames_per_step,
        ..HostConfig::default()
    };
    let game = HostGame::with_rng(frames_per_step, StdRng::seed_from_u64(42));

    let mut host = HostSession::with_game(game, config);
    host.bind("127.0.0.1:0").await.unwrap();
    host.start().unwrap();
    host
}

async fn connect(host: &HostSession) -> ClientSession {
    let addr = host.local_addr().unwrap().to_string();
    let mut session = ClientSession::new();
    session.connect_to(&addr, &addr).await.unwrap();
    session
}

/// Asserts that the client's mirror shows exactly what the host's world holds.
async fn assert_in_sync(host: &HostSession, client: &ClientSession) {
    let state = host.state();
    let state = state.read().await;
    let canonical = state.game.world();
    let mirror = client.world();

    assert_eq!(mirror.target(), canonical.target());
    assert_eq!(mirror.snakes().len(), canonical.snakes().len());
    for (mine, theirs) in mirror.snakes().iter().zip(canonical.snakes()) {
        let expected: Vec<_> = theirs.positions().map(Some).collect();
        assert_eq!(&mine.segments()[..expected.len()], expected.as_slice());
        // A slot taken over by a shorter snake leaves hidden extra segments.
        assert!(mine.segments()[expected.len()..].iter().all(Option::is_none));
    }
}

/// HOST SESSION TESTS
mod host_tests {
    use super::*;

    /// After the second accept the roster and the connection set line up,
    /// and the next broadcast carries the second player's snake.
    #[tokio::test]
    async fn second_connection_is_in_next_broadcast() {
        let mut host = running_host(4, 8).await;

        let mut first = connect(&host).await;
        assert!(first.world().snakes().is_empty());

        let mut second = connect(&host).await;
        assert_eq!(second.world().snakes().len(), 1);

        assert_eq!(host.roster_len().await, 2);
        assert_eq!(host.connection_count().await, 2);

        let summary = host.frame().await.unwrap();
        assert_eq!(summary.recipients, 2);

        first.tick(None).await.unwrap();
        second.tick(None).await.unwrap();

        assert_eq!(first.world().snakes().len(), 2);
        assert_eq!(second.world().snakes().len(), 2);
        assert_in_sync(&host, &first).await;
        assert_in_sync(&host, &second).await;

        host.shutdown();
    }

    /// Inputs travel client -> host, the host steps, and the client mirror
    /// ends up identical to the canonical world.
    #[tokio::test]
    async fn client_mirror_follows_host() {
        let mut host = running_host(1, 8).await;
        let mut player = connect(&host).await;

        host.frame().await.unwrap();
        player.tick(Some(b'W')).await.unwrap();
        assert_in_sync(&host, &player).await;

        // Let the reader task forward the input before the next frame.
        sleep(Duration::from_millis(50)).await;
        let summary = host.frame().await.unwrap();
        assert_eq!(summary.inputs_applied, 1);
        assert!(summary.step.is_some());

        player.tick(None).await.unwrap();
        assert_in_sync(&host, &player).await;

        let state = host.state();
        let state = state.read().await;
        assert_eq!(state.game.world().snakes()[0].direction(), Direction::Up);

        drop(state);
        host.shutdown();
    }

    #[tokio::test]
    async fn full_host_closes_extra_connections() {
        let mut host = running_host(4, 1).await;
        let _player = connect(&host).await;

        let addr = host.local_addr().unwrap().to_string();
        let mut extra = ClientSession::new();
        let result = extra.connect_to(&addr, &addr).await;

        assert!(matches!(result, Err(ConnectError::Handshake(_))));
        assert_eq!(host.roster_len().await, 1);

        host.shutdown();
    }

    /// An oversized frame kills only the sender's connection. Its snake
    /// stays in the roster, frozen, so indices never shift.
    #[tokio::test]
    async fn broken_client_is_tombstoned() {
        let mut host = running_host(4, 8).await;
        let mut healthy = connect(&host).await;

        let addr = host.local_addr().unwrap();
        let mut rogue = TcpStream::connect(addr).await.unwrap();
        read_frame(&mut rogue).await.unwrap();

        // Wrong-length input is ignored; the connection survives it.
        write_frame(&mut rogue, &[1, 2, 3]).await.unwrap();
        let huge = (MAX_FRAME_LEN as u32 + 1).to_be_bytes();
        rogue.write_all(&huge).await.unwrap();

        let mut live = usize::MAX;
        for _ in 0..100 {
            host.frame().await.unwrap();
            healthy.tick(None).await.unwrap();

            live = host.state().read().await.clients.live_count();
            if live == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(live, 1);
        assert_eq!(host.roster_len().await, 2);
        assert_eq!(healthy.world().snakes().len(), 2);
        assert_in_sync(&host, &healthy).await;

        host.shutdown();
    }

    /// Players coming and going reuse the slots left behind, so the roster
    /// and every snapshot stay bounded by the player cap.
    #[tokio::test]
    async fn connection_churn_keeps_roster_bounded() {
        let mut host = running_host(4, 2).await;
        let mut resident = connect(&host).await;
        let addr = host.local_addr().unwrap();

        for _ in 0..20 {
            let mut visitor = TcpStream::connect(addr).await.unwrap();
            read_frame(&mut visitor).await.unwrap();
            drop(visitor);

            let mut live = usize::MAX;
            for _ in 0..100 {
                host.frame().await.unwrap();
                resident.tick(None).await.unwrap();

                live = host.state().read().await.clients.live_count();
                if live == 1 {
                    break;
                }
                sleep(Duration::from_millis(10)).await;
            }
            assert_eq!(live, 1);
        }

        assert_eq!(host.roster_len().await, 2);
        assert_eq!(host.connection_count().await, 2);
        assert_in_sync(&host, &resident).await;

        host.shutdown();
    }
}

/// WIRE FORMAT TESTS
mod wire_tests {
    use super::*;

    #[test]
    fn snapshot_is_plain_bincode() {
        let snapshot = Snapshot {
            snakes: vec![vec![Position::new(64, 0), Position::new(32, 0)]],
            target: Position::new(320, 224),
        };

        let bytes = snapshot.encode().unwrap();
        assert_eq!(bytes, bincode::serialize(&snapshot).unwrap());
    }

    #[tokio::test]
    async fn input_frames_are_length_prefixed() {
        let (mut a, mut b) = tokio::io::duplex(64);

        write_frame(&mut a, &encode_input(Some(b'S'))).await.unwrap();
        write_frame(&mut a, &encode_input(None)).await.unwrap();

        assert_eq!(read_frame(&mut b).await.unwrap(), vec![b'S']);
        assert!(read_frame(&mut b).await.unwrap().is_empty());
    }
}

/// SIMULATION SCENARIOS
mod simulation_tests {
    use super::*;

    #[test]
    fn three_segments_step_right() {
        let mut snake = Snake::new(
            Position::from_cell(5, 5),
            3,
            Direction::Left,
            Color::for_index(0),
        );
        let before: Vec<_> = snake.segments().to_vec();

        let blocked = snake.step(ARENA, std::iter::empty());

        assert!(!blocked);
        assert_eq!(snake.head(), Some(Position::new(6 * SQ, 5 * SQ)));
        assert_eq!(snake.segments()[1], before[0]);
        assert_eq!(snake.segments()[2], before[1]);
    }

    #[test]
    fn relocation_avoids_a_crowded_board() {
        let mut world = World::new(Position::default());
        let open = [Position::from_cell(3, 4), Position::from_cell(17, 11)];

        for row in 0..GRID_ROWS {
            for column in 0..GRID_COLUMNS {
                let cell = Position::from_cell(column, row);
                if !open.contains(&cell) {
                    world.push_snake(Snake::new(cell, 1, Direction::Left, Color::for_index(0)));
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(world.relocate_target(&mut rng));
            assert!(open.contains(&world.target()));
        }
    }

    #[test]
    fn snapshot_replay_converges() {
        let mut canonical = World::new(Position::from_cell(2, 2));
        canonical.push_snake(Snake::new(
            Position::from_cell(10, 3),
            4,
            Direction::Right,
            Color::for_index(0),
        ));
        let mut mirror = World::new(Position::default());
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..6 {
            canonical.advance(ARENA, &mut rng);
            Snapshot::capture(&canonical).apply_to(&mut mirror);
        }

        assert_eq!(mirror.target(), canonical.target());
        assert_eq!(
            mirror.snakes()[0].segments(),
            canonical.snakes()[0].segments()
        );
    }
}
