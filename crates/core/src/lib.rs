//! Core domain layer for the Chorus message feed.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! pagination services for group message feeds. It follows hexagonal
//! architecture principles - this is the innermost layer with no
//! dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     chorus (binary)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  chorus-graphql   │  chorus-client                          │
//! │     (API)         │  (feed state, optimistic sends)         │
//! ├───────────────────┴─────────────────────────────────────────┤
//! │                    chorus-storage                           │
//! │                (PostgreSQL, in-memory)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     chorus-core  ← YOU ARE HERE             │
//! │          (models, ports, cursor codec, services)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Message, Group, identifiers)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`cursor`] - Opaque cursor encoding of message identifiers
//! - [`services`] - Page building pipeline and the in-process gateway
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! - [`ports::Repositories`] - Row-store access (range queries, existence probes)
//! - [`ports::MessageGateway`] - The message service as seen by a client
//!
//! ## Page Pipeline
//!
//! 1. Validate the request and derive a directional id filter
//! 2. Fetch at most `limit` rows, newest first
//! 3. Probe both page boundaries concurrently
//! 4. Encode cursors and assemble the connection

pub mod cursor;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
