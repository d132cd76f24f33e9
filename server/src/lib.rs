//! # Snake Host Library
//!
//! The authoritative side of a multiplayer snake session. The host owns the
//! only simulation that matters: every player's snake and the shared target
//! live here, and clients simply mirror whatever the host last broadcast.
//!
//! ## Session Flow
//!
//! A [`network::HostSession`] moves through three phases:
//!
//! 1. **Uninitialized** until a listening socket is bound.
//! 2. **Listening** once bound; nothing is accepted yet.
//! 3. **Running** after [`network::HostSession::start`] spawns the accept
//!    loop. There is no stopped phase; the host runs until the process exits.
//!
//! ## Background Tasks
//!
//! - **Accept loop**: takes each new TCP connection, queues a full snapshot
//!   to it alone, then adds a snake for the new player. A player joining
//!   after someone left takes over the leaver's slot and index, and the
//!   frozen snake there is replaced by a fresh one.
//! - **Reader task** (one per connection): reads one input symbol per message
//!   and forwards it to the frame owner over a channel. A silent client only
//!   blocks its own reader.
//! - **Writer task** (one per connection): drains that connection's bounded
//!   outbound queue. A client that falls behind misses frames instead of
//!   stalling everyone else.
//!
//! ## Frames
//!
//! The caller drives [`network::HostSession::frame`] at a fixed frame rate.
//! Each frame applies pending inputs, steps the world every
//! `frames_per_step` frames, and broadcasts the full snapshot to every live
//! connection. Snapshots are full state, so a client that misses a frame is
//! back in sync on the next one.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Connection slots, index-aligned with the snake roster. Failed
//! connections are tombstoned so the alignment never shifts, and tombstones
//! are reused so the roster never outgrows the player cap.
//!
//! ### Game Module (`game`)
//! The canonical [`shared::World`], player spawning, input routing and the
//! cached positions that go on the wire.
//!
//! ### Network Module (`network`)
//! Socket handling, task orchestration and the per-frame broadcast.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{frame_duration, HostConfig, HostSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut host = HostSession::new(HostConfig::default());
//!     host.bind("0.0.0.0:7777").await?;
//!     host.start()?;
//!
//!     let mut frames = tokio::time::interval(frame_duration(60));
//!     loop {
//!         frames.tick().await;
//!         host.frame().await?;
//!     }
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod network;
