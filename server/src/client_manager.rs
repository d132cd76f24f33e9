//! Connection bookkeeping for the host.
//!
//! Slots are index-aligned with the host's snake roster: slot `i` belongs to
//! the player driving snake `i`. A connection that fails is tombstoned rather
//! than removed, so later slots never shift and stay paired with their
//! snakes. The next player to join takes over the lowest tombstone, so the
//! slot count never exceeds the player cap.

use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

/// One encoded frame, shared between every recipient of a broadcast.
pub type Outbound = Arc<Vec<u8>>;

/// Identifies one connection. `generation` tells apart successive
/// connections that occupied the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub slot: usize,
    pub generation: u64,
}

/// A live remote player.
#[derive(Debug)]
pub struct Client {
    pub key: ClientKey,
    /// Remote address, for logs
    pub addr: SocketAddr,
    /// Queue drained by this connection's writer task
    pub sender: Sender<Outbound>,
}

impl Client {
    pub fn new(key: ClientKey, addr: SocketAddr, sender: Sender<Outbound>) -> Self {
        Self { key, addr, sender }
    }
}

/// Result of queueing a frame to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The writer is behind; this frame was skipped for that client only.
    Skipped,
    /// The writer is gone; the slot has been tombstoned.
    Dropped,
    /// Nothing lives in that slot.
    Vacant,
}

/// Every connection the host has accepted, in accept order.
pub struct ClientManager {
    slots: Vec<Option<Client>>,
    max_clients: usize,
    next_generation: u64,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            slots: Vec::new(),
            max_clients,
            next_generation: 0,
        }
    }

    /// Slot count, tombstones included. Always equals the roster length.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_full(&self) -> bool {
        self.live_count() >= self.max_clients
    }

    pub fn is_live(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    /// Whether `key` still names the connection living in its slot.
    pub fn is_current(&self, key: ClientKey) -> bool {
        matches!(self.slots.get(key.slot), Some(Some(client)) if client.key == key)
    }

    /// The slot the next [`ClientManager::add_client`] will fill: the lowest
    /// tombstone, or a new slot at the end.
    pub fn next_slot(&self) -> usize {
        self.slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.slots.len())
    }

    /// Registers a connection in [`ClientManager::next_slot`].
    pub fn add_client(&mut self, addr: SocketAddr, sender: Sender<Outbound>) -> ClientKey {
        let key = ClientKey {
            slot: self.next_slot(),
            generation: self.next_generation,
        };
        self.next_generation += 1;

        let client = Some(Client::new(key, addr, sender));
        if key.slot == self.slots.len() {
            info!("Client {} connected from {}", key.slot, addr);
            self.slots.push(client);
        } else {
            info!("Client {} connected from {}, reusing its slot", key.slot, addr);
            self.slots[key.slot] = client;
        }
        key
    }

    /// Drops the connection named by `key`, unless its slot has already been
    /// handed to someone else.
    pub fn drop_if_current(&mut self, key: ClientKey) -> bool {
        self.is_current(key) && self.drop_client(key.slot)
    }

    /// Stops broadcasting to `slot`. Returns false if it was already gone.
    pub fn drop_client(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot).and_then(Option::take) {
            Some(client) => {
                info!("Client {} ({}) dropped", slot, client.addr);
                true
            }
            None => false,
        }
    }

    /// Queues `frame` for a single connection without waiting.
    pub fn send_to(&mut self, slot: usize, frame: Outbound) -> Delivery {
        let Some(client) = self.slots.get(slot).and_then(Option::as_ref) else {
            return Delivery::Vacant;
        };

        match client.sender.try_send(frame) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                debug!("Client {} is falling behind, skipping a frame", slot);
                Delivery::Skipped
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Client {} writer closed", slot);
                self.drop_client(slot);
                Delivery::Dropped
            }
        }
    }

    /// Queues `frame` for every live connection. One slow or dead client
    /// never holds up the rest. Returns how many connections got the frame.
    pub fn broadcast(&mut self, frame: &Outbound) -> usize {
        (0..self.slots.len())
            .filter(|&slot| self.send_to(slot, Arc::clone(frame)) == Delivery::Queued)
            .count()
    }
}
