//! Column families backing the single logical table.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// All entity rows, keyed by `partition || sort`.
    pub const RECORDS: &str = "records";

    /// Global secondary index, keyed by
    /// `index partition || index sort || primary key`. Values hold the
    /// primary key bytes.
    pub const GLOBAL_INDEX: &str = "global_index";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::RECORDS, cf::GLOBAL_INDEX]
}
