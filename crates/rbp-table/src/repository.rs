//! Persistence for the state named in SPEC_FULL §6 that the teacher's
//! `rooms`/`hands`/`players`/`actions` schema doesn't already cover: the
//! compressed per-hand history blob, per-user-per-table money rows, the
//! rake accumulator, and hand-completion monitor events.
//!
//! Follows `crates/rbp-gameroom/src/repository.rs`'s idiom exactly: a
//! `Repository`-suffixed trait implemented for `Arc<Client>`, raw
//! parameterized SQL built with `const_format::concatcp!`, one
//! `.execute`/`.query` call per method (§5 Concurrency — no `Client`
//! borrow is held across an await point that could be cancelled
//! mid-statement).

use rbp_core::Chips;
use rbp_core::Serial;
use rbp_pg::HAND_HISTORY;
use rbp_pg::HAND_MONITOR_EVENT;
use rbp_pg::PgErr;
use rbp_pg::RAKE_LEDGER;
use rbp_pg::USER2TABLE;
use std::sync::Arc;
use tokio_postgres::Client;

/// DDL for the four tables this module owns. Not driven through
/// `rbp_pg::Schema` (those tables are enumerable/bulk-loaded CFR
/// artifacts; these are small, frequently-written operational rows) —
/// plain `CREATE TABLE IF NOT EXISTS`, run once at startup.
pub const CREATE_TABLES: &str = const_format::concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    HAND_HISTORY,
    " (
        table_id    BIGINT NOT NULL,
        hand_serial BIGINT NOT NULL,
        blob        JSONB NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (table_id, hand_serial)
    );
    CREATE TABLE IF NOT EXISTS ",
    USER2TABLE,
    " (
        table_id    BIGINT NOT NULL,
        user_serial BIGINT NOT NULL,
        money       BIGINT NOT NULL,
        PRIMARY KEY (table_id, user_serial)
    );
    CREATE TABLE IF NOT EXISTS ",
    RAKE_LEDGER,
    " (
        user_serial     BIGINT NOT NULL,
        currency_serial BIGINT NOT NULL,
        accumulated     BIGINT NOT NULL DEFAULT 0,
        PRIMARY KEY (user_serial, currency_serial)
    );
    CREATE TABLE IF NOT EXISTS ",
    HAND_MONITOR_EVENT,
    " (
        id          BIGSERIAL PRIMARY KEY,
        table_id    BIGINT NOT NULL,
        hand_serial BIGINT NOT NULL,
        kind        TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    );"
);

/// Database operations the table session manager performs every update
/// cycle: money mirroring (invariant 2, §3), compressed hand persistence,
/// rake accrual, and monitor events on `finish`.
#[allow(async_fn_in_trait)]
pub trait TableRepository {
    /// Idempotent row creation for a newly seated player; `upsert_user_money`
    /// is the steady-state path once the row exists.
    async fn upsert_user_money(&self, table: i64, user: Serial, money: Chips) -> Result<(), PgErr>;
    async fn get_user_money(&self, table: i64, user: Serial) -> Result<Option<Chips>, PgErr>;
    async fn accrue_rake(&self, user: Serial, currency: i64, amount: Chips) -> Result<(), PgErr>;
    async fn save_compressed_hand(&self, table: i64, hand_serial: i64, blob: &serde_json::Value) -> Result<(), PgErr>;
    async fn load_compressed_hand(&self, table: i64, hand_serial: i64) -> Result<Option<serde_json::Value>, PgErr>;
    async fn record_monitor_event(&self, table: i64, hand_serial: i64, kind: &str) -> Result<(), PgErr>;
}

impl TableRepository for Arc<Client> {
    async fn upsert_user_money(&self, table: i64, user: Serial, money: Chips) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                USER2TABLE,
                " (table_id, user_serial, money) VALUES ($1, $2, $3)
                 ON CONFLICT (table_id, user_serial) DO UPDATE SET money = EXCLUDED.money"
            ),
            &[&table, &user, &(money as i64)],
        )
        .await
        .map(|_| ())
    }

    async fn get_user_money(&self, table: i64, user: Serial) -> Result<Option<Chips>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT money FROM ",
                USER2TABLE,
                " WHERE table_id = $1 AND user_serial = $2"
            ),
            &[&table, &user],
        )
        .await
        .map(|opt| opt.map(|row| row.get::<_, i64>(0) as Chips))
    }

    async fn accrue_rake(&self, user: Serial, currency: i64, amount: Chips) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                RAKE_LEDGER,
                " (user_serial, currency_serial, accumulated) VALUES ($1, $2, $3)
                 ON CONFLICT (user_serial, currency_serial)
                 DO UPDATE SET accumulated = ",
                RAKE_LEDGER,
                ".accumulated + EXCLUDED.accumulated"
            ),
            &[&user, &currency, &(amount as i64)],
        )
        .await
        .map(|_| ())
    }

    async fn save_compressed_hand(&self, table: i64, hand_serial: i64, blob: &serde_json::Value) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                HAND_HISTORY,
                " (table_id, hand_serial, blob) VALUES ($1, $2, $3)
                 ON CONFLICT (table_id, hand_serial) DO UPDATE SET blob = EXCLUDED.blob"
            ),
            &[&table, &hand_serial, blob],
        )
        .await
        .map(|_| ())
    }

    async fn load_compressed_hand(&self, table: i64, hand_serial: i64) -> Result<Option<serde_json::Value>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT blob FROM ",
                HAND_HISTORY,
                " WHERE table_id = $1 AND hand_serial = $2"
            ),
            &[&table, &hand_serial],
        )
        .await
        .map(|opt| opt.map(|row| row.get(0)))
    }

    async fn record_monitor_event(&self, table: i64, hand_serial: i64, kind: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                HAND_MONITOR_EVENT,
                " (table_id, hand_serial, kind) VALUES ($1, $2, $3)"
            ),
            &[&table, &hand_serial, &kind],
        )
        .await
        .map(|_| ())
    }
}

/// Connects using the `DB_URL` environment variable, exactly as
/// `rbp_pg::db()` does, then ensures this module's tables exist.
pub async fn connect() -> Arc<Client> {
    let client = rbp_pg::db().await;
    client
        .batch_execute(CREATE_TABLES)
        .await
        .expect("create table-session tables");
    client
}
