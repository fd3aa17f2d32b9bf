//! **Torrust Seeder** is a long-running `BitTorrent` seeding orchestrator
//! written in [Rust Language](https://www.rust-lang.org/).
//!
//! It keeps a configured set of swarms alive on a small host. For every
//! configured source (a `.torrent` URL or a magnet link) it acquires the swarm
//! metadata, hands the swarm over to a swarm engine, waits until the content
//! is complete and then keeps seeding it until the process stops.
//!
//! The peer wire protocol, piece verification, the DHT and the tracker
//! protocols are delegated to the swarm engine (see [`engine`]).
//!
//! # Table of contents
//!
//! - [Features](#features)
//! - [Usage](#usage)
//! - [Configuration](#configuration)
//! - [Persistence](#persistence)
//! - [Components](#components)
//!
//! # Features
//!
//! - Sources from `http(s)` `.torrent` URLs and magnet links.
//! - Local cache of the downloaded `.torrent` files.
//! - Upload statistics accumulated across restarts.
//! - Periodic re-announce of the swarms with few peers.
//! - Graceful shutdown on `SIGINT` and `SIGTERM`.
//!
//! # Usage
//!
//! ```text
//! cargo run -- --dir ./downloads --url "https://example.com/debian.iso.torrent,magnet:?xt=urn:btih:..."
//! ```
//!
//! The same values can be given with the `DOWNLOAD_DIR` and `TORRENT_URLS`
//! environment variables.
//!
//! # Configuration
//!
//! The configuration is loaded from a TOML file and the environment. Refer to
//! the [`torrust-seeder-configuration`](torrust_seeder_configuration) crate for
//! the options and their default values.
//!
//! # Persistence
//!
//! The data directory holds:
//!
//! - The cached `.torrent` files, named after the last segment of their URL.
//! - The content of every swarm.
//! - The stats file (`seed_stats.txt`) with the total number of bytes
//!   uploaded by every run.
//!
//! # Components
//!
//! - [`core::metadata`]: the metadata acquirer.
//! - [`core::supervisor`]: the job supervisor.
//! - [`core::ledger`]: the stats ledger.
//! - [`core::health`]: the health monitor.
//! - [`shutdown`]: the shutdown coordinator.
pub mod app;
pub mod bootstrap;
pub mod core;
pub mod engine;
pub mod shutdown;
