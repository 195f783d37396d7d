use crate::error::{is_missing_row, AppError};
use crate::models::Mode;
use rusqlite::{params, Connection, Result};

/// Persisted mode flags. Exactly one of them is expected to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub strict_mode: bool,
    pub flaunt_mode: bool,
}

impl Settings {
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            strict_mode: mode == Mode::Strict,
            flaunt_mode: mode == Mode::Flaunt,
        }
    }

    /// Load the settings row. A missing row loads as both flags unset.
    pub fn load(conn: &Connection) -> Result<Self> {
        let row = conn.query_row(
            "SELECT strict_mode, flaunt_mode FROM settings WHERE id = 1",
            [],
            |row| {
                Ok(Self {
                    strict_mode: row.get::<_, i32>(0)? != 0,
                    flaunt_mode: row.get::<_, i32>(1)? != 0,
                })
            },
        );

        match row {
            Ok(settings) => Ok(settings),
            Err(e) if is_missing_row(&e) => Ok(Self {
                strict_mode: false,
                flaunt_mode: false,
            }),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO settings (id, strict_mode, flaunt_mode) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET strict_mode = excluded.strict_mode, flaunt_mode = excluded.flaunt_mode",
            params![i32::from(self.strict_mode), i32::from(self.flaunt_mode)],
        )?;
        Ok(())
    }

    /// Resolve the flags into a mode, refusing to guess when they disagree.
    pub fn mode(&self) -> std::result::Result<Mode, AppError> {
        match (self.strict_mode, self.flaunt_mode) {
            (true, false) => Ok(Mode::Strict),
            (false, true) => Ok(Mode::Flaunt),
            (strict, flaunt) => Err(AppError::Misconfigured { strict, flaunt }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_defaults_to_strict() {
        let (db, _dir) = setup_test_db();

        let settings = Settings::load(db.connection()).unwrap();
        assert_eq!(settings.mode().unwrap(), Mode::Strict);
    }

    #[test]
    fn test_save_and_reload_flaunt() {
        let (db, _dir) = setup_test_db();

        Settings::for_mode(Mode::Flaunt).save(db.connection()).unwrap();

        let settings = Settings::load(db.connection()).unwrap();
        assert!(!settings.strict_mode);
        assert!(settings.flaunt_mode);
        assert_eq!(settings.mode().unwrap(), Mode::Flaunt);
    }

    #[test]
    fn test_save_overwrites_single_row() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        Settings::for_mode(Mode::Flaunt).save(conn).unwrap();
        Settings::for_mode(Mode::Strict).save(conn).unwrap();

        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(Settings::load(conn).unwrap().mode().unwrap(), Mode::Strict);
    }

    #[test]
    fn test_neither_flag_is_misconfigured() {
        let settings = Settings {
            strict_mode: false,
            flaunt_mode: false,
        };

        assert!(matches!(
            settings.mode(),
            Err(AppError::Misconfigured { strict: false, flaunt: false })
        ));
    }

    #[test]
    fn test_both_flags_is_misconfigured() {
        let settings = Settings {
            strict_mode: true,
            flaunt_mode: true,
        };

        assert!(matches!(
            settings.mode(),
            Err(AppError::Misconfigured { strict: true, flaunt: true })
        ));
    }

    #[test]
    fn test_missing_row_loads_as_misconfigured() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        conn.execute("DELETE FROM settings", []).unwrap();

        let settings = Settings::load(conn).unwrap();
        assert!(settings.mode().is_err());
    }
}
