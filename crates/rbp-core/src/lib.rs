//! Core type aliases, traits, and runtime utilities shared across the workspace.
//!
//! This crate provides the foundational types and server plumbing used by
//! every other crate in the workspace: compact numeric aliases, a
//! compile-time-safe entity identifier, and the dual terminal+file logger
//! and graceful-shutdown coordination used by long-running binaries.
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes, bet amounts, and pot sizes, in chips. Widened from the
/// teacher's `i16` (sized for CFR abstraction buckets, not real-money
/// stacks) since this crate's buy-ins run into the hundreds of thousands
/// (SPEC_FULL §8 scenario 1) and would silently wrap at `i16::MAX`.
pub type Chips = i64;
/// Seat index around the table (0 = button in heads-up).
pub type Position = usize;
/// Monotonic sequence number for ordering events within a hand.
pub type Epoch = i16;
/// Global player identity, stable across tables and reconnects.
/// Distinct from [`Position`], which is only meaningful at a single table.
pub type Serial = i64;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and Monte Carlo sampling.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    /// Useful for converting between marker types.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

#[cfg(feature = "client")]
impl<T> serde::Serialize for ID<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

// ============================================================================
// TABLE SESSION DEFAULTS
// Literal defaults named by the specification; overridable via env at the
// binary boundary (see `rbp_table::config::ServerSettings::from_env`).
// ============================================================================
/// Default seat count for a newly created table.
pub const N: Position = 9;
/// Phase-2 player-turn timer compensation added after the warning fires.
pub const TIMEOUT_DELAY_COMPENSATION: u64 = 2;
/// Lock watchdog threshold: a hand stuck past this many seconds raises an alarm.
pub const LOCK_THRESHOLD: u64 = 20 * 60;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
/// Use when you need hard shutdown without waiting for in-flight hands.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("violent interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

/// Global interrupt flag for graceful shutdown coordination.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
/// Optional shutdown deadline from SHUTDOWN_AFTER env var.
#[cfg(feature = "server")]
static DEADLINE: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
/// Check if graceful shutdown was requested (via stdin "Q") or deadline reached.
///
/// The autodeal scheduler (`rbp_table::autodeal`) consults this before
/// starting a new hand so an operator can drain tables before a restart.
#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
        || DEADLINE
            .get()
            .map_or(false, |d| std::time::Instant::now() >= *d)
}
/// No-op interrupt check when server feature disabled.
#[cfg(not(feature = "server"))]
pub fn interrupted() -> bool {
    false
}
/// Register graceful interrupt handler. Type "Q" + Enter to stop taking new hands.
/// Optionally set SHUTDOWN_AFTER env var (e.g., "2h", "30m") for timed drains.
#[cfg(feature = "server")]
pub fn brb() {
    if let Ok(duration) = std::env::var("SHUTDOWN_AFTER") {
        if let Some(deadline) = parse_duration(&duration) {
            let _ = DEADLINE.set(std::time::Instant::now() + deadline);
            log::info!("server will stop accepting new hands after {}", duration);
        }
    }
    std::thread::spawn(|| loop {
        let ref mut buffer = String::new();
        if let Ok(_) = std::io::stdin().read_line(buffer) {
            if buffer.trim().to_uppercase() == "Q" {
                log::warn!("graceful interrupt requested, draining tables...");
                INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                break;
            }
        }
    });
}
/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
#[cfg(feature = "server")]
fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    let (num, unit) = s.split_at(s.len().saturating_sub(1));
    let value: u64 = num.parse().ok()?;
    match unit {
        "s" => Some(std::time::Duration::from_secs(value)),
        "m" => Some(std::time::Duration::from_secs(value * 60)),
        "h" => Some(std::time::Duration::from_secs(value * 3600)),
        "d" => Some(std::time::Duration::from_secs(value * 86400)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_cast_preserves_uuid() {
        struct A;
        struct B;
        let a: ID<A> = ID::default();
        let uuid = a.inner();
        let b: ID<B> = a.cast();
        assert_eq!(uuid, b.inner());
    }

    #[test]
    fn id_ordering_matches_uuid_ordering() {
        struct Marker;
        let x: ID<Marker> = ID::from(uuid::Uuid::from_u128(1));
        let y: ID<Marker> = ID::from(uuid::Uuid::from_u128(2));
        assert!(x < y);
    }
}
