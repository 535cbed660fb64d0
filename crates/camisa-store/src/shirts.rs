//! Shirt repository.
//!
//! Partial updates assemble their `SET` clause dynamically from the supplied
//! patch fields; an empty patch degenerates to a read.

use camisa_core::{NewShirt, Shirt, ShirtPatch};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

const COLUMNS: &str = "id, title, link, image_url, size, price_in_cents, person_id, status";

/// Shirt repository.
pub struct ShirtRepo;

impl ShirtRepo {
    /// Insert a new shirt; the id is assigned by the database.
    pub fn create(conn: &Connection, new: &NewShirt) -> Result<Shirt> {
        let _ = conn.execute(
            "INSERT INTO shirts (title, link, image_url, size, price_in_cents, person_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.title,
                new.link,
                new.image_url,
                new.size,
                new.price_in_cents,
                new.person_id,
            ],
        )?;
        Ok(Shirt {
            id: conn.last_insert_rowid(),
            title: new.title.clone(),
            link: new.link.clone(),
            image_url: new.image_url.clone(),
            size: new.size.clone(),
            price_in_cents: new.price_in_cents,
            person_id: new.person_id.clone(),
            status: 0,
        })
    }

    /// All shirts, oldest first.
    pub fn list(conn: &Connection) -> Result<Vec<Shirt>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM shirts ORDER BY id"))?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up one shirt.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Shirt>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM shirts WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All shirts belonging to one person, oldest first.
    pub fn list_by_person(conn: &Connection, person_id: &str) -> Result<Vec<Shirt>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM shirts WHERE person_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![person_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a partial update, returning the updated row if it exists.
    pub fn update(conn: &Connection, id: i64, patch: &ShirtPatch) -> Result<Option<Shirt>> {
        if patch.is_empty() {
            return Self::get(conn, id);
        }

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        let mut push = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
            values.push(value);
            sets.push(format!("{column} = ?{}", values.len()));
        };
        if let Some(title) = &patch.title {
            push("title", Box::new(title.clone()));
        }
        if let Some(link) = &patch.link {
            push("link", Box::new(link.clone()));
        }
        if let Some(image_url) = &patch.image_url {
            push("image_url", Box::new(image_url.clone()));
        }
        if let Some(size) = &patch.size {
            push("size", Box::new(size.clone()));
        }
        if let Some(price) = patch.price_in_cents {
            push("price_in_cents", Box::new(price));
        }
        if let Some(person_id) = &patch.person_id {
            push("person_id", Box::new(person_id.clone()));
        }
        if let Some(status) = patch.status {
            push("status", Box::new(status));
        }

        let sql = format!(
            "UPDATE shirts SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len() + 1
        );
        values.push(Box::new(id));
        let refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(Box::as_ref).collect();

        let changed = conn.execute(&sql, refs.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    /// Delete a shirt, returning the deleted row (with its image filename)
    /// if it existed.
    pub fn delete(conn: &Connection, id: i64) -> Result<Option<Shirt>> {
        let Some(shirt) = Self::get(conn, id)? else {
            return Ok(None);
        };
        let _ = conn.execute("DELETE FROM shirts WHERE id = ?1", params![id])?;
        Ok(Some(shirt))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shirt> {
        Ok(Shirt {
            id: row.get(0)?,
            title: row.get(1)?,
            link: row.get(2)?,
            image_url: row.get(3)?,
            size: row.get(4)?,
            price_in_cents: row.get(5)?,
            person_id: row.get(6)?,
            status: row.get(7)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::people::PersonRepo;

    fn open_with_person() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let _ = run_migrations(&conn).unwrap();
        let person = PersonRepo::create(&conn, "Alice").unwrap();
        (conn, person.id)
    }

    fn minimal(person_id: &str) -> NewShirt {
        NewShirt {
            title: "Brasil 2025 Home".into(),
            person_id: person_id.into(),
            ..NewShirt::default()
        }
    }

    #[test]
    fn create_minimal_shirt() {
        let (conn, person_id) = open_with_person();
        let shirt = ShirtRepo::create(&conn, &minimal(&person_id)).unwrap();
        assert!(shirt.id > 0);
        assert_eq!(shirt.status, 0);
        assert!(shirt.link.is_none());
        assert!(shirt.image_url.is_none());
    }

    #[test]
    fn create_full_shirt_round_trips() {
        let (conn, person_id) = open_with_person();
        let new = NewShirt {
            title: "Retro 1994".into(),
            link: Some("https://example.com/shirt".into()),
            image_url: Some("abc.png".into()),
            size: Some("M".into()),
            price_in_cents: Some(4599),
            person_id: person_id.clone(),
        };
        let created = ShirtRepo::create(&conn, &new).unwrap();
        let fetched = ShirtRepo::get(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_missing_is_none() {
        let (conn, _) = open_with_person();
        assert!(ShirtRepo::get(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn list_by_person_filters() {
        let (conn, person_id) = open_with_person();
        let other = PersonRepo::create(&conn, "Bob").unwrap();
        let _ = ShirtRepo::create(&conn, &minimal(&person_id)).unwrap();
        let _ = ShirtRepo::create(&conn, &minimal(&person_id)).unwrap();
        let _ = ShirtRepo::create(&conn, &minimal(&other.id)).unwrap();

        assert_eq!(ShirtRepo::list(&conn).unwrap().len(), 3);
        let mine = ShirtRepo::list_by_person(&conn, &person_id).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|s| s.person_id == person_id));
    }

    #[test]
    fn update_changes_only_patched_fields() {
        let (conn, person_id) = open_with_person();
        let new = NewShirt {
            size: Some("XL".into()),
            price_in_cents: Some(2999),
            ..minimal(&person_id)
        };
        let shirt = ShirtRepo::create(&conn, &new).unwrap();

        let patch = ShirtPatch {
            title: Some("Renamed".into()),
            status: Some(1),
            ..ShirtPatch::default()
        };
        let updated = ShirtRepo::update(&conn, shirt.id, &patch).unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, 1);
        assert_eq!(updated.size.as_deref(), Some("XL"));
        assert_eq!(updated.price_in_cents, Some(2999));
    }

    #[test]
    fn empty_patch_is_a_read() {
        let (conn, person_id) = open_with_person();
        let shirt = ShirtRepo::create(&conn, &minimal(&person_id)).unwrap();
        let same = ShirtRepo::update(&conn, shirt.id, &ShirtPatch::default())
            .unwrap()
            .unwrap();
        assert_eq!(same, shirt);
    }

    #[test]
    fn update_missing_is_none() {
        let (conn, _) = open_with_person();
        let patch = ShirtPatch {
            title: Some("x".into()),
            ..ShirtPatch::default()
        };
        assert!(ShirtRepo::update(&conn, 999, &patch).unwrap().is_none());
    }

    #[test]
    fn delete_returns_row_with_image() {
        let (conn, person_id) = open_with_person();
        let new = NewShirt {
            image_url: Some("img.png".into()),
            ..minimal(&person_id)
        };
        let shirt = ShirtRepo::create(&conn, &new).unwrap();
        let deleted = ShirtRepo::delete(&conn, shirt.id).unwrap().unwrap();
        assert_eq!(deleted.image_url.as_deref(), Some("img.png"));
        assert!(ShirtRepo::get(&conn, shirt.id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_is_none() {
        let (conn, _) = open_with_person();
        assert!(ShirtRepo::delete(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn create_with_unknown_person_is_rejected() {
        let (conn, _) = open_with_person();
        let err = ShirtRepo::create(&conn, &minimal("per_missing")).unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
