//! Shared test utilities for executor and command tests.

use crate::db::SqliteConnection;
use crate::query::Db;

/// Three users on two teams:
///
/// | id | name    | team | votes |
/// |----|---------|------|-------|
/// | 1  | Taylor  | red  | 50    |
/// | 2  | Abigail | red  | 200   |
/// | 3  | Bob     | blue | 10    |
pub const USERS_FIXTURE: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    team TEXT,
    votes INTEGER NOT NULL DEFAULT 0
);
INSERT INTO users (name, email, team, votes) VALUES ('Taylor', 'taylor@example.com', 'red', 50);
INSERT INTO users (name, email, team, votes) VALUES ('Abigail', 'abigail@example.com', 'red', 200);
INSERT INTO users (name, email, team, votes) VALUES ('Bob', NULL, 'blue', 10);
"#;

/// Create an in-memory database loaded with `USERS_FIXTURE`.
pub fn users_db() -> Db {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory db");
    conn.execute_batch(USERS_FIXTURE).expect("Fixture should load");
    Db::new(conn)
}

/// Create an empty in-memory database.
///
/// Used to verify commands fail cleanly when tables are missing.
pub fn empty_db() -> Db {
    Db::new(SqliteConnection::open_in_memory().expect("Failed to open in-memory db"))
}
