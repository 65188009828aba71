//! Unraid Monitor
//!
//! Polls an Unraid server's GraphQL API and exposes its state as typed
//! entities (sensors, binary sensors, switches, buttons) over HTTP, plus
//! one-shot control actions for containers, vms, the array, and parity
//! checks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      GraphQL/HTTPS      ┌───────────────────────────┐
//! │   Unraid    │ ◄─────────────────────► │        Monitor            │
//! │   server    │                         │  ┌─────────────────────┐  │
//! └─────────────┘                         │  │ System tier    30s  │  │
//!                                         │  │ Storage tier   300s │  │     HTTP
//!                                         │  │ Infra tier     900s │  │ ◄──────────►  consumers
//!                                         │  └────────┬────────────┘  │ /api/entities
//!                                         │     watch │ snapshots     │
//!                                         │  ┌────────▼────────────┐  │
//!                                         │  │ entity projections  │  │
//!                                         │  └─────────────────────┘  │
//!                                         └───────────────────────────┘
//! ```
//!
//! Each tier polls independently and publishes an immutable snapshot per
//! successful cycle. Required resources abort the cycle on failure; optional
//! resources degrade to empty defaults. Entities are stateless projections of
//! the latest snapshot.
//!
//! # Modules
//!
//! - [`unraid`] - GraphQL client, API types, connection detection
//! - [`coordinator`] - tiered poll loops and partial-failure aggregation
//! - [`entity`] - snapshot-to-entity projections and control actions
//! - [`server`] - HTTP surface and process wiring
//! - [`config`] - configuration management
//! - [`error`] - error types

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod server;
pub mod unraid;
