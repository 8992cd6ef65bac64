use async_trait::async_trait;
use rbp_core::Chips;
use rbp_core::Position;
use rbp_core::Serial;

/// Display metadata a factory knows about a player that the engine itself
/// does not track (name, avatar skin, account standing).
#[derive(Debug, Clone, Default)]
pub struct PlayerInfo {
    pub name: String,
}

/// The table's host: persistence, accounting, and cross-table bookkeeping
/// a single table has no business owning itself. One factory instance is
/// shared, by `Arc`, across every table it hosts; tables hold it behind a
/// `Weak` handle so a factory can tear its tables down without a reference
/// cycle (SPEC_FULL §5 Concurrency & Resource Model).
#[async_trait]
pub trait Factory: Send + Sync {
    async fn create_hand(&self, room: rbp_core::ID<rbp_records::Room>) -> anyhow::Result<rbp_core::ID<rbp_records::Hand>>;
    async fn save_hand(&self, hand: &rbp_records::Hand) -> anyhow::Result<()>;
    /// Persists the compressed per-hand history blob (SPEC_FULL §4.E
    /// "Compressed-history persistence", §6 "Persisted state") keyed by
    /// table id and hand serial.
    async fn save_compressed_hand(&self, table: i64, hand_serial: i64, blob: &serde_json::Value) -> anyhow::Result<()>;
    async fn update_player_money(&self, player: Serial, delta: Chips) -> anyhow::Result<()>;
    async fn update_player_rake(&self, player: Serial, amount: Chips) -> anyhow::Result<()>;
    async fn buy_in_player(&self, player: Serial, amount: Chips) -> anyhow::Result<()>;
    async fn leave_player(&self, player: Serial) -> anyhow::Result<()>;
    async fn buy_out_player(&self, player: Serial, amount: Chips) -> anyhow::Result<()>;
    async fn move_player(&self, player: Serial, from: Position, to: Position) -> anyhow::Result<()>;
    async fn seat_player(&self, player: Serial, seat: Position) -> anyhow::Result<()>;

    fn get_name(&self) -> String;
    fn get_player_info(&self, player: Serial) -> Option<PlayerInfo>;
    fn is_temporary_user(&self, player: Serial) -> bool;
    fn joined_count_reached_max(&self, player: Serial) -> bool;
    fn joined_count_increase(&self, player: Serial);
    fn joined_count_decrease(&self, player: Serial);
    fn simultaneous_tables_allowed(&self) -> usize;
    fn missed_round_max(&self) -> u32;

    async fn tourney_end_turn(&self, table: i64) -> anyhow::Result<()>;
    async fn tourney_update_stats(&self, table: i64, player: Serial, chips: Chips) -> anyhow::Result<()>;

    /// Returns `false` if the message should be dropped (muted sender, banned word).
    fn chat_filter(&self, player: Serial, message: &str) -> bool;
    async fn chat_message_archive(&self, player: Serial, message: &str) -> anyhow::Result<()>;

    fn shutting_down(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_info_defaults_to_empty_name() {
        assert_eq!(PlayerInfo::default().name, "");
    }
}
