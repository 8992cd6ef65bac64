//! Identity types shared with the table session manager.
//!
//! Full authentication (JWT issuance, password hashing, session expiry) is
//! a transport-layer concern and lives outside this workspace's table
//! session manager; what the table needs is just [`Member`] — a stable
//! identity to attach seats, money rows, and hand history to.
mod member;

pub use member::*;
