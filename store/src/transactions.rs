//! Transaction store: the three read access patterns and idempotent create.
//!
//! All consistency is delegated to the table's atomic guarded multi-write;
//! there is no in-process shared mutable state and no locking here, and no
//! operation is ever retried automatically. Retrying a failed create with
//! the same idempotency token is the intended caller-side pattern.

use std::sync::Arc;

use ledger_core::{
    IdempotencyKey, IdempotencyRecord, NewTransaction, Transaction, TxId, TxStatus, UserId,
};

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::table::{Cursor, ItemKey, QueryPage, Table, WriteItem};

/// Default page size for user-scoped listings.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Hard cap on page size for any listing.
pub const MAX_LIST_LIMIT: usize = 100;

/// Default number of transactions in the global listing.
pub const DEFAULT_GLOBAL_LIMIT: usize = 10;

/// One page of a user-scoped listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Matching entities, newest first.
    pub items: Vec<T>,
    /// Continuation token when more results may exist; absence signals the
    /// end of the stream.
    pub next_cursor: Option<Cursor>,
}

/// Records transactions and serves the three access patterns over them.
#[derive(Clone)]
pub struct TransactionStore {
    table: Arc<dyn Table>,
    clock: Arc<dyn Clock>,
}

impl TransactionStore {
    /// Create a store using the wall clock.
    #[must_use]
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self::with_clock(table, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock.
    #[must_use]
    pub fn with_clock(table: Arc<dyn Table>, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    /// Record a new transaction, exactly once per idempotency token.
    ///
    /// The transaction is written as two rows — user-scoped and canonical
    /// lookup — in a single atomic multi-write. With a token, a guard row
    /// joins the same write under an existence check, so "guard exists" and
    /// "transaction exists" are equivalent facts. When the guard check
    /// fails because a prior call already claimed the token, a best-effort
    /// recovery read returns that prior transaction; the duplicate call's
    /// payload is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateRequest`] when the token is already
    /// claimed and the prior transaction cannot be recovered. Every other
    /// store failure propagates unchanged.
    pub fn create(
        &self,
        user_id: &UserId,
        new: NewTransaction,
        idempotency_key: Option<&IdempotencyKey>,
    ) -> Result<Transaction> {
        let tx = Transaction {
            tx_id: TxId::generate(),
            user_id: user_id.clone(),
            amount: new.amount,
            currency: new.currency,
            status: TxStatus::Pending,
            created_at: self.clock.now(),
            data: new.data,
        };

        let mut writes = vec![
            WriteItem::put(codec::user_item(&tx)),
            WriteItem::put(codec::lookup_item(&tx)),
        ];
        if let Some(key) = idempotency_key {
            let guard = IdempotencyRecord {
                key: key.clone(),
                tx_id: tx.tx_id,
                user_id: user_id.clone(),
                created_at: tx.created_at,
            };
            writes.push(WriteItem::put_if_absent(codec::guard_item(&guard)));
        }

        match self.table.transact_write(writes) {
            Ok(()) => {
                tracing::debug!(tx_id = %tx.tx_id, user_id = %tx.user_id, "transaction recorded");
                Ok(tx)
            }
            Err(StoreError::ConditionFailed) => match idempotency_key {
                Some(key) => self.recover_prior(key),
                None => Err(StoreError::ConditionFailed),
            },
            Err(err) => Err(err),
        }
    }

    /// Best-effort recovery after a guard conflict: resolve the existing
    /// guard row to its transaction. The read races replication of a write
    /// made by a different call, so every failure here abandons recovery
    /// and surfaces the conflict rather than fabricating a result.
    fn recover_prior(&self, key: &IdempotencyKey) -> Result<Transaction> {
        let conflict = || StoreError::DuplicateRequest {
            token: key.to_string(),
        };

        let guard_key = ItemKey::new(keys::idempotency_partition(key), keys::METADATA);
        let guard = match self.table.get(&guard_key) {
            Ok(Some(item)) => match codec::as_idempotency(item) {
                Ok(guard) => guard,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to recover idempotent transaction");
                    return Err(conflict());
                }
            },
            Ok(None) => {
                tracing::warn!("idempotency guard conflicted but is not yet readable");
                return Err(conflict());
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to recover idempotent transaction");
                return Err(conflict());
            }
        };

        match self.get(&guard.tx_id) {
            Ok(Some(tx)) => {
                tracing::debug!(tx_id = %tx.tx_id, "returning previously recorded transaction");
                Ok(tx)
            }
            Ok(None) => {
                tracing::warn!(tx_id = %guard.tx_id, "idempotency guard references a missing transaction");
                Err(conflict())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to recover idempotent transaction");
                Err(conflict())
            }
        }
    }

    /// Fetch a transaction by id via its canonical lookup row.
    ///
    /// No ownership check happens here; authorization belongs to the layer
    /// above.
    ///
    /// # Errors
    ///
    /// Returns an error if the table operation fails.
    pub fn get(&self, tx_id: &TxId) -> Result<Option<Transaction>> {
        let key = ItemKey::new(keys::lookup_partition(tx_id), keys::METADATA);
        self.table
            .get(&key)?
            .map(codec::as_transaction)
            .transpose()
    }

    /// List a user's transactions, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_LIST_LIMIT`] and is capped at
    /// [`MAX_LIST_LIMIT`]. A returned cursor resumes the next page; its
    /// absence signals the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the table operation fails.
    pub fn list_by_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
        cursor: Option<&Cursor>,
    ) -> Result<Page<Transaction>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let page = self.table.query(
            &keys::user_partition(user_id),
            keys::TX_SORT_PREFIX,
            limit,
            cursor,
        )?;

        let items = page
            .items
            .into_iter()
            .map(codec::as_transaction)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            next_cursor: page.next,
        })
    }

    /// List the most recently created transactions system-wide, newest
    /// first. Bounded single page; no cursor is exposed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table operation fails.
    pub fn list_global_recent(&self, limit: Option<usize>) -> Result<Vec<Transaction>> {
        let limit = limit.unwrap_or(DEFAULT_GLOBAL_LIMIT).clamp(1, MAX_LIST_LIMIT);

        let mut recent = Vec::with_capacity(limit);
        let mut cursor: Option<Cursor> = None;
        loop {
            // Both stored representations carry the index attributes, so
            // every transaction owns two adjacent index entries; walk only
            // the canonical rows so each is reported once.
            let QueryPage { items, next } = self.table.query_global_index(
                keys::GLOBAL_TX_PARTITION,
                limit * 2,
                cursor.as_ref(),
            )?;

            for item in items {
                if item.key.sort != keys::METADATA {
                    continue;
                }
                recent.push(codec::as_transaction(item)?);
                if recent.len() == limit {
                    return Ok(recent);
                }
            }

            match next {
                Some(position) => cursor = Some(position),
                None => return Ok(recent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use crate::clock::ManualClock;
    use crate::rocks::RocksTable;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, 18, 0, 0).unwrap()
    }

    struct Fixture {
        store: TransactionStore,
        clock: Arc<ManualClock>,
        table: Arc<RocksTable>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let table = Arc::new(RocksTable::open(dir.path()).unwrap());
        let clock = Arc::new(ManualClock::starting_at(fixed_instant()));
        let store = TransactionStore::with_clock(table.clone(), clock.clone());
        Fixture {
            store,
            clock,
            table,
            _dir: dir,
        }
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn token(s: &str) -> IdempotencyKey {
        IdempotencyKey::new(s).unwrap()
    }

    #[test]
    fn create_returns_pending_transaction() {
        let f = fixture();
        let tx = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(100)), None)
            .unwrap();

        assert_eq!(tx.user_id, user("u1"));
        assert_eq!(tx.amount, dec!(100));
        assert_eq!(tx.currency, "ARS");
        assert_eq!(tx.status, TxStatus::Pending);
        assert_eq!(tx.created_at, fixed_instant());
    }

    #[test]
    fn same_token_twice_returns_same_transaction() {
        let f = fixture();
        let key = token("tok-A");

        let first = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(100)), Some(&key))
            .unwrap();
        f.clock.advance(Duration::milliseconds(5));
        let second = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(999)), Some(&key))
            .unwrap();

        // The repeat's payload is discarded.
        assert_eq!(second.tx_id, first.tx_id);
        assert_eq!(second.amount, dec!(100));
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn untouched_tokens_stay_independent() {
        let f = fixture();

        let a = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(1)), None)
            .unwrap();
        let b = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(1)), None)
            .unwrap();
        assert_ne!(a.tx_id, b.tx_id);

        let c = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(1)), Some(&token("tok-1")))
            .unwrap();
        let d = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(1)), Some(&token("tok-2")))
            .unwrap();
        assert_ne!(c.tx_id, d.tx_id);
    }

    #[test]
    fn both_views_report_identical_fields() {
        let f = fixture();
        let mut new = NewTransaction::new(dec!(42.5));
        new.data = serde_json::json!({"order": "ord-9"});
        let created = f.store.create(&user("u1"), new, None).unwrap();

        let by_id = f.store.get(&created.tx_id).unwrap().unwrap();
        let listed = f
            .store
            .list_by_user(&user("u1"), None, None)
            .unwrap()
            .items
            .remove(0);

        assert_eq!(by_id, created);
        assert_eq!(listed, created);
    }

    #[test]
    fn get_unknown_id_is_none() {
        let f = fixture();
        assert!(f.store.get(&TxId::generate()).unwrap().is_none());
    }

    #[test]
    fn list_by_user_is_newest_first_and_paginates() {
        let f = fixture();
        for _ in 0..5 {
            f.store
                .create(&user("u1"), NewTransaction::new(dec!(1)), None)
                .unwrap();
            f.clock.advance(Duration::milliseconds(1));
        }

        let first = f.store.list_by_user(&user("u1"), Some(2), None).unwrap();
        assert_eq!(first.items.len(), 2);
        let cursor = first.next_cursor.expect("more pages remain");

        let second = f
            .store
            .list_by_user(&user("u1"), Some(2), Some(&cursor))
            .unwrap();
        assert_eq!(second.items.len(), 2);
        let cursor = second.next_cursor.expect("one page remains");

        let third = f
            .store
            .list_by_user(&user("u1"), Some(2), Some(&cursor))
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.next_cursor.is_none());

        let all: Vec<_> = first
            .items
            .iter()
            .chain(&second.items)
            .chain(&third.items)
            .collect();
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        let mut ids: Vec<_> = all.iter().map(|tx| tx.tx_id).collect();
        ids.sort_by_key(ToString::to_string);
        ids.dedup();
        assert_eq!(ids.len(), 5, "pages must not overlap");
    }

    #[test]
    fn listings_do_not_cross_users() {
        let f = fixture();
        f.store
            .create(&user("u1"), NewTransaction::new(dec!(1)), None)
            .unwrap();
        f.store
            .create(&user("u2"), NewTransaction::new(dec!(2)), None)
            .unwrap();

        let page = f.store.list_by_user(&user("u1"), None, None).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].user_id, user("u1"));
    }

    #[test]
    fn global_recent_returns_newest_without_duplicates() {
        let f = fixture();
        let mut created = Vec::new();
        for i in 0..5 {
            let owner = if i % 2 == 0 { user("u1") } else { user("u2") };
            created.push(
                f.store
                    .create(&owner, NewTransaction::new(dec!(1)), None)
                    .unwrap(),
            );
            f.clock.advance(Duration::milliseconds(1));
        }

        let recent = f.store.list_global_recent(Some(3)).unwrap();
        assert_eq!(recent.len(), 3);

        let expected: Vec<_> = created.iter().rev().take(3).map(|tx| tx.tx_id).collect();
        let actual: Vec<_> = recent.iter().map(|tx| tx.tx_id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn global_recent_defaults_to_ten() {
        let f = fixture();
        for _ in 0..12 {
            f.store
                .create(&user("u1"), NewTransaction::new(dec!(1)), None)
                .unwrap();
            f.clock.advance(Duration::milliseconds(1));
        }

        let recent = f.store.list_global_recent(None).unwrap();
        assert_eq!(recent.len(), DEFAULT_GLOBAL_LIMIT);
    }

    #[test]
    fn unresolvable_guard_surfaces_duplicate_request() {
        let f = fixture();
        let key = token("tok-dangling");

        // A guard claimed by another writer whose transaction row never
        // became readable.
        let guard = IdempotencyRecord {
            key: key.clone(),
            tx_id: TxId::generate(),
            user_id: user("u1"),
            created_at: fixed_instant(),
        };
        f.table
            .transact_write(vec![WriteItem::put(codec::guard_item(&guard))])
            .unwrap();

        let result = f
            .store
            .create(&user("u1"), NewTransaction::new(dec!(1)), Some(&key));
        assert!(matches!(
            result,
            Err(StoreError::DuplicateRequest { token }) if token == "tok-dangling"
        ));
    }

    #[test]
    fn racing_same_token_converges_on_one_transaction() {
        let dir = TempDir::new().unwrap();
        let table = Arc::new(RocksTable::open(dir.path()).unwrap());
        let store = TransactionStore::new(table);
        let key = token("tok-race");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    store.create(
                        &user("u1"),
                        NewTransaction::new(rust_decimal::Decimal::from(i)),
                        Some(&key),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let winner = results[0].tx_id;
        assert!(results.iter().all(|tx| tx.tx_id == winner));

        // Exactly one transaction exists in storage.
        assert_eq!(store.list_global_recent(Some(100)).unwrap().len(), 1);
        assert_eq!(
            store.list_by_user(&user("u1"), Some(100), None).unwrap().items.len(),
            1
        );
    }
}
