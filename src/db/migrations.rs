use rusqlite::{params, Connection, Result};
use super::schema::{DEFAULT_MODE_FLAGS, SCHEMA};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    seed_default_settings(conn)?;
    Ok(())
}

fn seed_default_settings(conn: &Connection) -> Result<()> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM settings",
        [],
        |row| row.get(0)
    )?;

    if count == 0 {
        let (strict, flaunt) = DEFAULT_MODE_FLAGS;
        conn.execute(
            "INSERT INTO settings (id, strict_mode, flaunt_mode) VALUES (1, ?1, ?2)",
            params![strict, flaunt],
        )?;
    }
    Ok(())
}
