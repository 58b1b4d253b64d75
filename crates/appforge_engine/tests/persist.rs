use std::fs;

use appforge_engine::{ensure_output_dir, reset_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("doc.txt", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "doc.txt");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("doc.txt", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn nested_paths_create_parents() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let path = writer.write("a/b/c.txt", "deep").unwrap();
    assert_eq!(path, temp.path().join("a/b/c.txt"));
    assert_eq!(fs::read_to_string(path).unwrap(), "deep");
}

#[test]
fn parent_dir_components_are_rejected() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("root"));

    let err = writer.write("../escape.txt", "x").unwrap_err();
    assert!(matches!(err, PersistError::Escapes { .. }));
    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("doc.txt", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("doc.txt").exists());
}

#[test]
fn reset_dir_empties_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("app");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("sub/file"), "x").unwrap();

    reset_dir(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}
