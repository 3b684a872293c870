#![allow(dead_code)]

use attendance_core::{
    AttendanceStore, InMemoryStore, JsonFileStore, NewStudent, SqliteAttendanceStore, Student,
};
use tempfile::TempDir;

/// One instance of every backend, plus the temp dir the JSON store lives in.
pub struct Backends {
    pub stores: Vec<(&'static str, Box<dyn AttendanceStore>)>,
    _json_dir: TempDir,
}

pub fn all_backends() -> Backends {
    let json_dir = tempfile::tempdir().unwrap();
    let stores: Vec<(&'static str, Box<dyn AttendanceStore>)> = vec![
        (
            "sqlite",
            Box::new(SqliteAttendanceStore::open_in_memory().unwrap()),
        ),
        ("memory", Box::new(InMemoryStore::new())),
        ("json", Box::new(JsonFileStore::open(json_dir.path()).unwrap())),
    ];
    Backends {
        stores,
        _json_dir: json_dir,
    }
}

pub fn add(store: &dyn AttendanceStore, name: &str, roll: &str) -> Student {
    store.create_student(&NewStudent::new(name, roll)).unwrap()
}
