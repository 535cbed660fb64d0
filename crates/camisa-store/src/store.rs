//! High-level [`CatalogStore`] facade.
//!
//! Wraps a connection pool and exposes one method per catalog operation.
//! Multi-statement writes (delete-returning-row, patch-then-read) run inside
//! a transaction so callers never observe partial state.

use camisa_core::{NewShirt, Person, Shirt, ShirtPatch};

use crate::connection::{PooledConnection, StorePool};
use crate::errors::Result;
use crate::migrations;
use crate::people::PersonRepo;
use crate::shirts::ShirtRepo;

/// Catalog store over a pooled `SQLite` database.
pub struct CatalogStore {
    pool: StorePool,
}

impl CatalogStore {
    /// Wrap an opened pool.
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub fn migrate(&self) -> Result<u32> {
        migrations::run_migrations(&*self.conn()?)
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // People
    // ─────────────────────────────────────────────────────────────────────

    /// Create a person.
    pub fn create_person(&self, name: &str) -> Result<Person> {
        PersonRepo::create(&*self.conn()?, name)
    }

    /// List all people.
    pub fn list_people(&self) -> Result<Vec<Person>> {
        PersonRepo::list(&*self.conn()?)
    }

    /// Rename a person; `None` when absent.
    pub fn update_person(&self, id: &str, name: &str) -> Result<Option<Person>> {
        PersonRepo::update_name(&*self.conn()?, id, name)
    }

    /// Delete a person, returning the deleted row; `None` when absent.
    pub fn delete_person(&self, id: &str) -> Result<Option<Person>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let deleted = PersonRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(deleted)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Shirts
    // ─────────────────────────────────────────────────────────────────────

    /// Create a shirt.
    pub fn create_shirt(&self, new: &NewShirt) -> Result<Shirt> {
        ShirtRepo::create(&*self.conn()?, new)
    }

    /// List all shirts.
    pub fn list_shirts(&self) -> Result<Vec<Shirt>> {
        ShirtRepo::list(&*self.conn()?)
    }

    /// Look up one shirt; `None` when absent.
    pub fn get_shirt(&self, id: i64) -> Result<Option<Shirt>> {
        ShirtRepo::get(&*self.conn()?, id)
    }

    /// List one person's shirts.
    pub fn shirts_by_person(&self, person_id: &str) -> Result<Vec<Shirt>> {
        ShirtRepo::list_by_person(&*self.conn()?, person_id)
    }

    /// Apply a partial update, returning the updated row; `None` when absent.
    pub fn update_shirt(&self, id: i64, patch: &ShirtPatch) -> Result<Option<Shirt>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let updated = ShirtRepo::update(&tx, id, patch)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Delete a shirt, returning the deleted row; `None` when absent.
    pub fn delete_shirt(&self, id: i64) -> Result<Option<Shirt>> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let deleted = ShirtRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(deleted)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
