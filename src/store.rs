use std::path::Path;

use log::{debug, warn};
use rusqlite::{params, Connection, Row, Transaction};

use crate::account::{Account, TextLimits};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::schema::account_schema;

const SELECT_ACCOUNTS: &str = "SELECT id, name, password, balance FROM accounts ORDER BY id";
const DELETE_ACCOUNTS: &str = "DELETE FROM accounts";
const INSERT_ACCOUNT: &str = "INSERT INTO accounts (id, name, password, balance) VALUES (?1, ?2, ?3, ?4)";

/// Handle to an open account database.
///
/// The connection is owned exclusively and released by [`close`](Self::close),
/// or by `Drop` when the handle goes out of scope on any other path.
pub struct AccountStore {
    conn: Connection,
    config: StoreConfig,
}

impl AccountStore {
    /// Open (or create) the database at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(StoreConfig::new(path.as_ref()))
    }

    /// Open (or create) the database described by `config` and make sure
    /// both tables exist.
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path).map_err(|source| StoreError::Open {
            path: config.db_path.clone(),
            source,
        })?;
        Self::init(conn, config)
    }

    /// Open a private in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let config = StoreConfig::new(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: config.db_path.clone(),
            source,
        })?;
        Self::init(conn, config)
    }

    fn init(conn: Connection, config: StoreConfig) -> Result<Self> {
        conn.busy_timeout(config.busy_timeout())
            .map_err(|source| StoreError::Open {
                path: config.db_path.clone(),
                source,
            })?;
        conn.execute_batch(&account_schema().to_sql())
            .map_err(StoreError::Schema)?;
        debug!("opened account store at {}", config.db_path.display());
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.db_path
    }

    /// Read every account, ordered by id.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] if the table holds more than
    /// `capacity` rows, and with [`StoreError::RowDecode`] if a row does not fit
    /// the configured [`TextLimits`].
    pub fn load(&self, capacity: usize) -> Result<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(SELECT_ACCOUNTS)
            .map_err(StoreError::QueryPrepare)?;
        let mut rows = stmt.query([]).map_err(StoreError::QueryExec)?;

        let mut accounts = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::QueryExec)? {
            if accounts.len() == capacity {
                return Err(StoreError::CapacityExceeded { capacity });
            }
            accounts.push(decode_account(row, accounts.len(), &self.config.limits)?);
        }

        debug!("loaded {} accounts", accounts.len());
        Ok(accounts)
    }

    /// [`load`](Self::load) with the configured `load_capacity`.
    pub fn load_all(&self) -> Result<Vec<Account>> {
        self.load(self.config.load_capacity)
    }

    /// Replace the whole `accounts` table with `accounts`, keeping their ids.
    ///
    /// Either every row is written or the table is left as it was.
    pub fn save(&mut self, accounts: &[Account]) -> Result<()> {
        for (index, account) in accounts.iter().enumerate() {
            self.config
                .limits
                .check(account)
                .map_err(|reason| StoreError::Write {
                    index: Some(index),
                    reason: format!("account {index}: {reason}"),
                    source: None,
                })?;
        }

        let tx = self.conn.transaction().map_err(StoreError::Transaction)?;
        if let Err(e) = replace_accounts(&tx, accounts) {
            warn!("rolling back account save: {e}");
            if let Err(rollback) = tx.rollback() {
                warn!("rollback failed: {rollback}");
            }
            return Err(e);
        }
        tx.commit().map_err(StoreError::Transaction)?;

        debug!("saved {} accounts", accounts.len());
        Ok(())
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        let path = self.config.db_path;
        self.conn.close().map_err(|(_conn, e)| {
            warn!("failed to close account store at {}: {e}", path.display());
            StoreError::Close(e)
        })?;
        debug!("closed account store at {}", path.display());
        Ok(())
    }
}

fn replace_accounts(tx: &Transaction<'_>, accounts: &[Account]) -> Result<()> {
    let mut insert = tx.prepare(INSERT_ACCOUNT).map_err(StoreError::Statement)?;

    tx.execute(DELETE_ACCOUNTS, [])
        .map_err(|source| StoreError::Write {
            index: None,
            reason: "clearing accounts table".to_string(),
            source: Some(source),
        })?;

    for (index, account) in accounts.iter().enumerate() {
        insert
            .execute(params![account.id, account.name, account.password, account.balance])
            .map_err(|source| StoreError::Write {
                index: Some(index),
                reason: format!("inserting account {index} (id {}): {source}", account.id),
                source: Some(source),
            })?;
    }
    Ok(())
}

fn decode_account(row: &Row<'_>, index: usize, limits: &TextLimits) -> Result<Account> {
    let decode_err = |reason: String| StoreError::RowDecode { row: index, reason };

    let id: i64 = row.get(0).map_err(|e| decode_err(e.to_string()))?;
    let name: String = row.get(1).map_err(|e| decode_err(e.to_string()))?;
    let password: String = row.get(2).map_err(|e| decode_err(e.to_string()))?;
    let balance: f64 = row.get(3).map_err(|e| decode_err(e.to_string()))?;

    limits
        .check_name(&name)
        .and_then(|_| limits.check_password(&password))
        .map_err(|reason| decode_err(format!("account id {id}: {reason}")))?;

    Ok(Account {
        id,
        name,
        password,
        balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Account> {
        vec![
            Account::new(1, "ana", "x", 100.0),
            Account::new(2, "bo", "y", 50.5),
        ]
    }

    #[test]
    fn fresh_store_is_empty() {
        let store = AccountStore::open_in_memory().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let mut store = AccountStore::open_in_memory().unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.load_all().unwrap(), sample());

        store.save(&[]).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn load_orders_by_id() {
        let mut store = AccountStore::open_in_memory().unwrap();
        let mut accounts = sample();
        accounts.reverse();
        store.save(&accounts).unwrap();
        assert_eq!(store.load_all().unwrap(), sample());
    }

    #[test]
    fn capacity_boundary() {
        let mut store = AccountStore::open_in_memory().unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.load(2).unwrap().len(), 2);
        assert!(matches!(
            store.load(1),
            Err(StoreError::CapacityExceeded { capacity: 1 })
        ));
    }

    #[test]
    fn zero_capacity_accepts_empty_table() {
        let store = AccountStore::open_in_memory().unwrap();
        assert!(store.load(0).unwrap().is_empty());
    }

    #[test]
    fn over_long_name_is_rejected_before_writing() {
        let mut store = AccountStore::open_in_memory().unwrap();
        store.save(&sample()).unwrap();

        let long = "n".repeat(store.config().limits.max_name_len + 1);
        let err = store
            .save(&[Account::new(9, long, "p", 0.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { index: Some(0), source: None, .. }));
        assert_eq!(store.load_all().unwrap(), sample());
    }

    #[test]
    fn duplicate_id_rolls_back() {
        let mut store = AccountStore::open_in_memory().unwrap();
        store.save(&sample()).unwrap();

        let err = store
            .save(&[Account::new(7, "a", "p", 1.0), Account::new(7, "b", "p", 2.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { index: Some(1), source: Some(_), .. }));
        assert_eq!(store.load_all().unwrap(), sample());
    }
}
