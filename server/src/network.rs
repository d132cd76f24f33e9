//! Host session: TCP accept loop, per-connection reader/writer tasks and the
//! per-frame broadcast

use crate::client_manager::{ClientKey, ClientManager, Delivery, Outbound};
use crate::game::HostGame;
use log::{debug, error, info, warn};
use shared::protocol::decode_input;
use shared::{read_frame, write_frame, ProtocolError, StepReport, FRAMES_PER_STEP, MAX_PLAYERS};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;

/// Messages sent from connection tasks to the frame owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Input { key: ClientKey, symbol: u8 },
    Disconnected { key: ClientKey },
}

/// Lifecycle of a [`HostSession`]. There is no stopped state: the host runs
/// until the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPhase {
    Uninitialized,
    Listening,
    Running,
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub max_players: usize,
    pub frames_per_step: u32,
    /// Frames buffered per connection before that connection starts
    /// missing broadcasts. Kept small so a lagging client skips ahead
    /// instead of replaying old frames.
    pub outbound_queue: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            frames_per_step: FRAMES_PER_STEP,
            outbound_queue: 2,
        }
    }
}

/// Everything the accept task and the frame owner both touch.
///
/// `clients` and `game`'s roster are appended together under one write
/// guard, so slot `i` and snake `i` always belong to the same player.
pub struct HostState {
    pub clients: ClientManager,
    pub game: HostGame,
}

impl HostState {
    /// Registers a newly accepted connection: connection slot, first
    /// snapshot, then snake. A tombstoned slot is taken over together with
    /// its frozen snake, which is replaced by a fresh one.
    ///
    /// Returns `None`, leaving everything untouched, when the host is full or
    /// the board has no room for another snake.
    pub fn admit(&mut self, addr: SocketAddr, sender: mpsc::Sender<Outbound>) -> Option<ClientKey> {
        if self.clients.is_full() {
            warn!("Rejecting {}: server full", addr);
            return None;
        }

        let slot = self.clients.next_slot();
        let replacing = (slot < self.game.roster_len()).then_some(slot);
        let Some(head) = self.game.spawn_point(replacing) else {
            warn!("Rejecting {}: no free cell to spawn in", addr);
            return None;
        };

        let initial = match self.game.snapshot().encode() {
            Ok(bytes) => Arc::new(bytes),
            Err(e) => {
                error!("Failed to encode snapshot for {}: {}", addr, e);
                return None;
            }
        };

        let key = self.clients.add_client(addr, sender);
        if self.clients.send_to(key.slot, initial) != Delivery::Queued {
            warn!("Could not queue first snapshot for client {}", key.slot);
        }
        let index = self.game.place_player(key.slot, head);
        debug_assert_eq!(key.slot, index);
        debug_assert_eq!(self.clients.len(), self.game.roster_len());
        Some(key)
    }
}

/// What one call to [`HostSession::frame`] did.
#[derive(Debug, Clone, Default)]
pub struct FrameSummary {
    pub inputs_applied: usize,
    pub step: Option<StepReport>,
    pub recipients: usize,
}

pub struct HostSession {
    config: HostConfig,
    phase: HostPhase,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    state: Arc<RwLock<HostState>>,

    event_tx: mpsc::UnboundedSender<HostEvent>,
    event_rx: mpsc::UnboundedReceiver<HostEvent>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl HostSession {
    pub fn new(config: HostConfig) -> Self {
        Self::with_game(HostGame::new(config.frames_per_step), config)
    }

    pub fn with_game(game: HostGame, config: HostConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            state: Arc::new(RwLock::new(HostState {
                clients: ClientManager::new(config.max_players),
                game,
            })),
            config,
            phase: HostPhase::Uninitialized,
            listener: None,
            local_addr: None,
            event_tx,
            event_rx,
            shutdown_tx,
            accept_task: None,
        }
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn state(&self) -> Arc<RwLock<HostState>> {
        Arc::clone(&self.state)
    }

    /// Binds the listening socket.
    pub async fn bind(&mut self, addr: &str) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        if self.phase != HostPhase::Uninitialized {
            return Err("host session already bound".into());
        }

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Host listening on {}", local_addr);

        self.listener = Some(listener);
        self.local_addr = Some(local_addr);
        self.phase = HostPhase::Listening;
        Ok(local_addr)
    }

    /// Starts accepting players in the background.
    pub fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(listener) = self.listener.take() else {
            return Err("host session must be bound before it starts".into());
        };

        let state = Arc::clone(&self.state);
        let events = self.event_tx.clone();
        let shutdown = self.shutdown_tx.subscribe();
        let queue = self.config.outbound_queue;

        self.accept_task = Some(tokio::spawn(async move {
            Self::accept_loop(listener, state, events, shutdown, queue).await;
        }));
        self.phase = HostPhase::Running;
        info!("Host session running");
        Ok(())
    }

    /// Stops the accept loop and every connection task. Nothing is sent to
    /// the clients; their sockets simply close.
    pub fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        info!("Host session shut down");
    }

    pub async fn roster_len(&self) -> usize {
        self.state.read().await.game.roster_len()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.clients.len()
    }

    /// Runs one frame: applies the inputs that arrived since the last frame,
    /// steps the world if the step timer fires, and broadcasts a snapshot to
    /// every live connection.
    pub async fn frame(&mut self) -> Result<FrameSummary, ProtocolError> {
        let mut state = self.state.write().await;
        let mut summary = FrameSummary::default();

        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                HostEvent::Input { key, symbol } => {
                    if state.clients.is_current(key) && state.game.apply_input(key.slot, symbol) {
                        summary.inputs_applied += 1;
                    } else {
                        debug!("Dropping input from stale connection {:?}", key);
                    }
                }
                HostEvent::Disconnected { key } => {
                    state.clients.drop_if_current(key);
                }
            }
        }

        summary.step = state.game.frame();

        let frame: Outbound = Arc::new(state.game.snapshot().encode()?);
        summary.recipients = state.clients.broadcast(&frame);

        Ok(summary)
    }

    async fn accept_loop(
        listener: TcpListener,
        state: Arc<RwLock<HostState>>,
        events: mpsc::UnboundedSender<HostEvent>,
        mut shutdown: watch::Receiver<bool>,
        queue: usize,
    ) {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        Self::admit(stream, addr, &state, &events, &shutdown, queue).await;
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                },
                _ = shutdown.changed() => break,
            }
        }
    }

    /// Admits a new connection under one write guard and starts its tasks.
    async fn admit(
        stream: TcpStream,
        addr: SocketAddr,
        state: &Arc<RwLock<HostState>>,
        events: &mpsc::UnboundedSender<HostEvent>,
        shutdown: &watch::Receiver<bool>,
        queue: usize,
    ) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not disable Nagle for {}: {}", addr, e);
        }

        let (sender, outbound) = mpsc::channel(queue.max(1));
        let Some(key) = state.write().await.admit(addr, sender) else {
            return;
        };

        let (reader, writer) = stream.into_split();
        tokio::spawn(Self::write_loop(
            key,
            writer,
            outbound,
            events.clone(),
            shutdown.clone(),
        ));
        tokio::spawn(Self::read_loop(key, reader, events.clone(), shutdown.clone()));
    }

    /// Drains one connection's outbound queue onto its socket.
    async fn write_loop(
        key: ClientKey,
        mut writer: OwnedWriteHalf,
        mut outbound: mpsc::Receiver<Outbound>,
        events: mpsc::UnboundedSender<HostEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                frame = outbound.recv() => {
                    let Some(frame) = frame else { break };
                    if let Err(e) = write_frame(&mut writer, &frame).await {
                        warn!("Send to client {} failed: {}", key.slot, e);
                        let _ = events.send(HostEvent::Disconnected { key });
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }

    /// Reads one input symbol per message and forwards it to the frame owner.
    async fn read_loop(
        key: ClientKey,
        mut reader: OwnedReadHalf,
        events: mpsc::UnboundedSender<HostEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                payload = read_frame(&mut reader) => {
                    let payload = match payload {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Receive from client {} failed: {}", key.slot, e);
                            let _ = events.send(HostEvent::Disconnected { key });
                            break;
                        }
                    };

                    match decode_input(&payload) {
                        Ok(Some(symbol)) => {
                            if events.send(HostEvent::Input { key, symbol }).is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Ignoring input from client {}: {}", key.slot, e),
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }
}

/// Wall-clock length of one frame at `frame_rate` frames per second.
pub fn frame_duration(frame_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)))
}
