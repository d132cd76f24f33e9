//! # Snake Client Library
//!
//! The player's side of a multiplayer snake session, plus a standalone
//! singleplayer mode. The client never decides anything about a hosted
//! game: it forwards key presses and redraws whatever the host last sent.
//!
//! ## Lockstep
//!
//! Each frame the client sends exactly one input message (possibly empty)
//! and then waits for exactly one snapshot. The window therefore runs at the
//! host's broadcast rate, and a host that stops sending freezes the client.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! Loads the primary and fallback host addresses from `connection.json`.
//!
//! ### Network Module (`network`)
//! [`network::ClientSession`]: connect with fallback, receive the initial
//! snapshot, then one send and one receive per tick.
//!
//! ### Input Module (`input`)
//! Keyboard state from macroquad behind [`shared::InputSource`].
//!
//! ### Rendering Module (`rendering`)
//! Draws a [`shared::World`] cell by cell through [`shared::DrawTarget`].
//!
//! ### Solo Module (`solo`)
//! Singleplayer on the shared simulation, no networking.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::ConnectionConfig;
//! use client::network::ClientSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::load("connection.json".as_ref());
//!     let mut session = ClientSession::new();
//!     session.connect(&config).await?;
//!
//!     loop {
//!         session.tick(Some(b'W')).await?;
//!         println!("{} snakes", session.world().snakes().len());
//!     }
//! }
//! ```

pub mod config;
pub mod input;
pub mod network;
pub mod rendering;
pub mod solo;
