//! Test fixtures - compilation databases written to temporary directories

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Database file name used by every fixture
pub const DATABASE_FILE_NAME: &str = "compile_commands.json";

/// A `{file, command}` entry as it appears in a compilation database
pub fn command_entry(file: &str, command: &str) -> Value {
    json!({
        "directory": "/work/build",
        "file": file,
        "command": command,
    })
}

/// Commands for a small two-file C project
pub fn small_project() -> Vec<Value> {
    vec![
        command_entry(
            "src/main.c",
            r#"/usr/bin/cc -DNDEBUG -DGREETING=\"hello world\" -I/work/include -O2 -Wall -o main.o -c src/main.c"#,
        ),
        command_entry(
            "src/util.c",
            "/usr/bin/cc -I/work/include -g3 -fPIC -std=c11 -c src/util.c",
        ),
    ]
}

/// A temporary directory holding a compilation database
pub struct DatabaseFixture {
    dir: TempDir,
    path: PathBuf,
}

impl DatabaseFixture {
    /// Write `entries` as the database of a fresh temp directory
    pub fn new(entries: &[Value]) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(DATABASE_FILE_NAME);
        let fixture = Self { dir, path };
        fixture.rewrite(entries);
        fixture
    }

    pub fn small_project() -> Self {
        Self::new(&small_project())
    }

    /// Replace the database content with `entries`
    pub fn rewrite(&self, entries: &[Value]) {
        let json = serde_json::to_string_pretty(entries).expect("serialize database");
        std::fs::write(&self.path, json).expect("write database");
    }

    /// Replace the database content with arbitrary bytes
    pub fn write_raw(&self, content: &[u8]) {
        std::fs::write(&self.path, content).expect("write database");
    }

    pub fn remove_database(&self) {
        std::fs::remove_file(&self.path).expect("remove database");
    }

    pub fn database_path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the default cache file next to the database
    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("cached_options.txt")
    }
}

/// Write a model catalog JSON file into `dir`
pub fn write_catalog(dir: &Path, models: &[(&str, &str, &str)]) -> PathBuf {
    let models: Vec<Value> = models
        .iter()
        .map(|(id, target_dir, description)| {
            json!({ "id": id, "targetDir": target_dir, "description": description })
        })
        .collect();
    let path = dir.join("models.json");
    std::fs::write(&path, json!({ "models": models }).to_string()).expect("write catalog");
    path
}
