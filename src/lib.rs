//! SQLite persistence for bank-account snapshots.
//!
//! # Intention
//!
//! - Open (or create) an account database and make sure its tables exist.
//! - Load the full `accounts` table into memory, bounded by an explicit capacity.
//! - Save a snapshot as an all-or-nothing replacement of the `accounts` table.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No business logic: accounts are created and modified by the caller.
//! - The `transactions` table is declared but never read or written.
//! - Passwords are stored exactly as supplied (plaintext).

pub mod account;
pub mod config;
pub mod error;
pub mod schema;
pub mod store;

pub use account::{Account, TextLimits};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::AccountStore;
