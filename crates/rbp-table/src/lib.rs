//! Table session manager.
//!
//! Owns the authoritative per-table lifecycle of a multi-table poker
//! server: hand sequencing, timers, history diffing, packet fan-out,
//! money reconciliation, seating, rebuy, and tournament moves. Mediates
//! between a hand-rules [`Engine`], connected client [`Avatar`]s, and a
//! [`Factory`]-backed persistence layer.
//!
//! The hand engine itself (betting, showdown evaluation, dealing) is an
//! external collaborator consumed through the [`engine::Engine`] trait;
//! this crate owns none of that logic.
#![allow(dead_code)]

pub mod autodeal;
pub mod avatar;
pub mod config;
pub mod deck_source;
pub mod differ;
pub mod engine;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod money;
pub mod orchestrator;
pub mod packet;
#[cfg(feature = "database")]
pub mod repository;
pub mod timers;
pub mod watchdog;

pub use autodeal::AutodealDecision;
pub use avatar::Avatar;
pub use avatar::AvatarIndex;
pub use config::ServerSettings;
pub use config::TableDescriptor;
pub use deck_source::DeckSource;
pub use differ::HistoryDiffer;
pub use engine::Engine;
pub use engine::EventTag;
pub use engine::HistoryEvent;
pub use error::TableError;
pub use factory::Factory;
pub use lifecycle::PlayerUserData;
pub use money::AutoPolicy;
pub use money::RebuyOutcome;
pub use orchestrator::Table;
pub use orchestrator::UpdateOutcome;
pub use packet::ServerMessage;
