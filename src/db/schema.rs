pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    strict_mode INTEGER NOT NULL,
    flaunt_mode INTEGER NOT NULL
);
"#;

/// (`strict_mode`, `flaunt_mode`) written on first start
pub const DEFAULT_MODE_FLAGS: (i32, i32) = (1, 0);
