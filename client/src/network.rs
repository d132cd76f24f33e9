use crate::config::ConnectionConfig;
use log::{info, warn};
use shared::protocol::encode_input;
use shared::{read_frame, write_frame, ProtocolError, Snapshot, World};
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("can't establish connection with host at {primary} or {fallback}: {source}")]
    Unreachable {
        primary: String,
        fallback: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to receive the initial snapshot: {0}")]
    Handshake(#[from] ProtocolError),
    #[error("client session is already connected")]
    AlreadyConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    Uninitialized,
    Connected,
}

/// A player's view of a hosted game.
///
/// The local world is only ever written from host snapshots. Each
/// [`ClientSession::tick`] sends one input and then waits for exactly one
/// snapshot, so at most one request is ever outstanding.
pub struct ClientSession {
    stream: Option<TcpStream>,
    world: World,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            stream: None,
            world: World::new(Default::default()),
        }
    }

    pub fn phase(&self) -> ClientPhase {
        if self.stream.is_some() {
            ClientPhase::Connected
        } else {
            ClientPhase::Uninitialized
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Connects using the addresses in `config`.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Result<(), ConnectError> {
        self.connect_to(&config.primary_addr(), &config.fallback_addr())
            .await
    }

    /// Tries `primary`, then `fallback`, then gives up. On success the
    /// local world is built from the host's first snapshot.
    pub async fn connect_to(&mut self, primary: &str, fallback: &str) -> Result<(), ConnectError> {
        if self.stream.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }

        let mut stream = match TcpStream::connect(primary).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Primary host {} unreachable ({}), trying {}", primary, e, fallback);
                TcpStream::connect(fallback)
                    .await
                    .map_err(|source| ConnectError::Unreachable {
                        primary: primary.to_string(),
                        fallback: fallback.to_string(),
                        source,
                    })?
            }
        };
        stream.set_nodelay(true).map_err(ProtocolError::from)?;

        info!("Connection established. Waiting for the first snapshot...");
        let first = read_frame(&mut stream).await?;
        Snapshot::decode(&first)?.apply_to(&mut self.world);
        info!(
            "Initial snapshot applied: {} snakes on the board",
            self.world.snakes().len()
        );

        self.stream = Some(stream);
        Ok(())
    }

    /// Sends this frame's input (`None` for no change), then blocks until
    /// the next snapshot arrives and applies it.
    pub async fn tick(&mut self, symbol: Option<u8>) -> Result<(), ProtocolError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "client session is not connected",
            )));
        };

        write_frame(stream, &encode_input(symbol)).await?;
        let payload = read_frame(stream).await?;
        Snapshot::decode(&payload)?.apply_to(&mut self.world);
        Ok(())
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::decode_input;
    use shared::Position;
    use tokio::net::TcpListener;

    fn snapshot(lens: &[usize]) -> Snapshot {
        Snapshot {
            snakes: lens
                .iter()
                .enumerate()
                .map(|(row, &len)| {
                    (0..len)
                        .map(|column| Position::from_cell(column as i32, row as i32))
                        .collect()
                })
                .collect(),
            target: Position::from_cell(9, 9),
        }
    }

    #[test]
    fn test_tick_before_connect_fails() {
        let mut session = ClientSession::new();
        assert_eq!(session.phase(), ClientPhase::Uninitialized);
        assert!(tokio_test::block_on(session.tick(None)).is_err());
    }

    #[tokio::test]
    async fn test_falls_back_to_direct_address() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // A port nothing listens on: bind, note it, close it.
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap();
        drop(dead);

        let host = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let bytes = snapshot(&[3]).encode().unwrap();
            write_frame(&mut stream, &bytes).await.unwrap();
            stream
        });

        let mut session = ClientSession::new();
        session
            .connect_to(&dead_addr.to_string(), &addr.to_string())
            .await
            .unwrap();

        assert_eq!(session.phase(), ClientPhase::Connected);
        assert_eq!(session.world().snakes().len(), 1);
        assert_eq!(session.world().target(), Position::from_cell(9, 9));
        drop(host.await.unwrap());
    }

    #[tokio::test]
    async fn test_both_addresses_unreachable() {
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap().to_string();
        drop(dead);

        let mut session = ClientSession::new();
        let result = session.connect_to(&dead_addr, &dead_addr).await;

        assert!(matches!(result, Err(ConnectError::Unreachable { .. })));
        assert_eq!(session.phase(), ClientPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_tick_is_one_send_one_receive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let host = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            write_frame(&mut stream, &snapshot(&[2]).encode().unwrap())
                .await
                .unwrap();

            let mut seen = Vec::new();
            for lens in [&[3usize][..], &[3, 4][..]] {
                let input = read_frame(&mut stream).await.unwrap();
                seen.push(decode_input(&input).unwrap());
                write_frame(&mut stream, &snapshot(lens).encode().unwrap())
                    .await
                    .unwrap();
            }
            seen
        });

        let mut session = ClientSession::new();
        session.connect_to(&addr, &addr).await.unwrap();
        assert_eq!(session.world().snakes()[0].len(), 2);

        session.tick(Some(b'D')).await.unwrap();
        assert_eq!(session.world().snakes()[0].len(), 3);

        session.tick(None).await.unwrap();
        assert_eq!(session.world().snakes().len(), 2);
        assert_eq!(session.world().snakes()[1].len(), 4);

        assert_eq!(host.await.unwrap(), vec![Some(b'D'), None]);
    }
}
