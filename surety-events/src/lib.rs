//! FlightSurety notification bus
//!
//! Append-only notification channel between the ledger core and its
//! external collaborators (UI, oracle server). The core publishes typed
//! domain notifications; collaborators subscribe and render or react.
//!
//! # Architecture
//!
//! - **Typed payloads**: Every notification is a variant of [`Notification`]
//! - **Envelope**: Notifications travel in an [`Envelope`] with a UUIDv7 id,
//!   a subject string, and a timestamp
//! - **Fan-out**: An in-process broadcast channel; publishing never blocks
//!   the ledger, slow subscribers lag and are told so

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bus;
pub mod error;
pub mod notification;

pub use bus::EventBus;
pub use error::{Error, Result};
pub use notification::{Envelope, Notification};
