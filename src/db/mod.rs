pub mod schema;
pub mod migrations;

use rusqlite::{Connection, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_migrations_run() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        // Verify tables exist
        let count: i32 = db.connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='settings'",
                [],
                |row| row.get(0)
            ).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_default_settings_seeded() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let (strict, flaunt): (i32, i32) = db.connection()
            .query_row("SELECT strict_mode, flaunt_mode FROM settings WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((strict, flaunt), (1, 0), "Strict mode should be the default");
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();

        // Run migrations twice
        migrations::run(db.connection()).unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db.connection()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Running migrations twice should not duplicate settings");
    }

    #[test]
    fn test_migrations_keep_saved_mode() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        db.connection()
            .execute("UPDATE settings SET strict_mode = 0, flaunt_mode = 1 WHERE id = 1", [])
            .unwrap();
        migrations::run(db.connection()).unwrap();

        let flaunt: i32 = db.connection()
            .query_row("SELECT flaunt_mode FROM settings WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(flaunt, 1, "Re-running migrations must not reset the saved mode");
    }

    #[test]
    fn test_only_one_settings_row_allowed() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let result = db.connection().execute(
            "INSERT INTO settings (id, strict_mode, flaunt_mode) VALUES (2, 1, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
