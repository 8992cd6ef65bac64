use rbp_core::Chips;
use rbp_core::Unique;
use rbp_core::ID;

/// The persisted identity and stakes of a table.
///
/// Deliberately thin: everything about a table's *live* behavior (seating,
/// timers, the engine instance) belongs to the table session manager, not
/// to the records crate. This type exists only so hands and participants
/// have something to foreign-key against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    id: ID<Self>,
    stakes: Chips,
}

impl Room {
    pub fn new(id: ID<Self>, stakes: Chips) -> Self {
        Self { id, stakes }
    }
    pub fn stakes(&self) -> Chips {
        self.stakes
    }
}

impl Unique for Room {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Room {
        fn name() -> &'static str {
            ROOMS
        }
        fn columns() -> &'static [tokio_postgres::types::Type] {
            &[
                tokio_postgres::types::Type::UUID,
                tokio_postgres::types::Type::INT8,
            ]
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                ROOMS,
                " (
                    id      UUID PRIMARY KEY,
                    stakes  BIGINT NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
        fn copy() -> &'static str {
            unimplemented!()
        }
        fn truncates() -> &'static str {
            unimplemented!()
        }
        fn freeze() -> &'static str {
            unimplemented!()
        }
    }
}
