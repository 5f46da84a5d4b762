#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use rusqlite::{params, Connection};

/// Command for the built binary, isolated from the user's config and log settings.
pub fn notes_export_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("notes-export").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// Creates a minimal NotesV7 store. Each note is (title, body, created, edited)
/// in store-epoch seconds; ids start at 1.
pub fn create_store(path: &Path, notes: &[(&str, &str, f64, f64)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE ZNOTEBODY (Z_PK INTEGER PRIMARY KEY, ZHTMLSTRING VARCHAR);
         CREATE TABLE ZNOTE (
             Z_PK INTEGER PRIMARY KEY,
             ZBODY INTEGER,
             ZDATECREATED TIMESTAMP,
             ZDATEEDITED TIMESTAMP,
             ZTITLE VARCHAR
         );",
    )
    .unwrap();

    for (i, (title, body, created, edited)) in notes.iter().enumerate() {
        let id = i64::try_from(i).unwrap() + 1;
        conn.execute(
            "INSERT INTO ZNOTEBODY (Z_PK, ZHTMLSTRING) VALUES (?1, ?2)",
            params![id, body],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ZNOTE (Z_PK, ZBODY, ZDATECREATED, ZDATEEDITED, ZTITLE)
             VALUES (?1, ?1, ?2, ?3, ?4)",
            params![id, created, edited, title],
        )
        .unwrap();
    }
}
