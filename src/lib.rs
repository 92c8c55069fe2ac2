//! Emblem gateway - mints Lupul și Corbul emblems from payment callbacks
//!
//! The payment processor posts a callback once an order changes state. For a
//! confirmed emblem order the gateway generates the emblem's metadata and
//! commits the emblem, the buyer's status, the collection stock and the
//! transaction record in one MongoDB transaction.
//!
//! ## Modules
//!
//! - **emblem**: emblem types, order ids, money and metadata generation
//! - **ledger**: atomic mint commits (MongoDB or in-memory)
//! - **services**: callback workflow, signature checks, notifications
//! - **routes** / **server**: the HTTP surface

pub mod config;
pub mod db;
pub mod emblem;
pub mod ledger;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{GatewayError, Result};
