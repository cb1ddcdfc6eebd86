use crate::error::AppError;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = include_str!("schema.sql");
const SEED: &str = include_str!("seed.sql");

/// In-memory store shared by every worker. Nothing is written to disk.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a fresh store loaded with the demo data set.
    pub fn open_seeded() -> Result<Self, AppError> {
        let db = Self::open_in_memory()?;
        db.with_conn(|conn| Ok(conn.execute_batch(SEED)?))?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` inside a transaction; any error rolls the whole change back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
