//! Person repository.
//!
//! Stateless; every method takes `&Connection`. Missing rows come back as
//! `Ok(None)`, never as errors.

use camisa_core::Person;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::errors::Result;

/// Person repository.
pub struct PersonRepo;

impl PersonRepo {
    /// Insert a new person with a freshly assigned id.
    pub fn create(conn: &Connection, name: &str) -> Result<Person> {
        let id = format!("per_{}", Uuid::now_v7());
        let _ = conn.execute(
            "INSERT INTO people (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(Person {
            id,
            name: name.to_string(),
        })
    }

    /// All people, in insertion order.
    pub fn list(conn: &Connection) -> Result<Vec<Person>> {
        let mut stmt = conn.prepare("SELECT id, name FROM people ORDER BY rowid")?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up one person.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<Person>> {
        let row = conn
            .query_row(
                "SELECT id, name FROM people WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Rename a person, returning the updated row if it exists.
    pub fn update_name(conn: &Connection, id: &str, name: &str) -> Result<Option<Person>> {
        let changed = conn.execute(
            "UPDATE people SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(Person {
            id: id.to_string(),
            name: name.to_string(),
        }))
    }

    /// Delete a person, returning the deleted row if it existed.
    ///
    /// Fails with a constraint violation while shirts still reference the
    /// person; callers decide how to surface that.
    pub fn delete(conn: &Connection, id: &str) -> Result<Option<Person>> {
        let Some(person) = Self::get(conn, id)? else {
            return Ok(None);
        };
        let _ = conn.execute("DELETE FROM people WHERE id = ?1", params![id])?;
        Ok(Some(person))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Person> {
        Ok(Person {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
