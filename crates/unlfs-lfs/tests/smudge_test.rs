use proptest::prelude::*;
use tempfile::TempDir;

use unlfs_lfs::{LfsConfig, LfsError, MAX_POINTER_SIZE, Pointer, Smudger, sha256_hex};

fn smudger() -> (TempDir, Smudger) {
    let dir = TempDir::new().unwrap();
    let smudger = Smudger::new(&LfsConfig {
        storage_dir: dir.path().join("lfs"),
    });
    (dir, smudger)
}

#[test]
fn missing_object_names_the_oid() {
    let (_dir, smudger) = smudger();
    let pointer = Pointer::new(sha256_hex(b"elsewhere"), 9);
    let err = smudger.smudge("big.bin", pointer.to_bytes()).unwrap_err();
    assert!(matches!(err, LfsError::ObjectMissing { .. }));
    assert!(err.to_string().contains(&pointer.oid));
}

#[test]
fn for_git_dir_uses_lfs_subdirectory() {
    let dir = TempDir::new().unwrap();
    let config = LfsConfig::for_git_dir(&dir.path().join(".git"));
    assert_eq!(config.storage_dir, dir.path().join(".git").join("lfs"));
}

#[test]
fn large_content_is_never_treated_as_pointer() {
    let (_dir, smudger) = smudger();
    let mut content = Pointer::new(sha256_hex(b"x"), 1).to_bytes();
    content.resize(MAX_POINTER_SIZE + 1, b'\n');
    let out = smudger.smudge("big.txt", content.clone()).unwrap();
    assert_eq!(out, content);
}

proptest! {
    #[test]
    fn stored_content_smudges_back(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let (_dir, smudger) = smudger();
        let pointer = smudger.store().insert(&data).unwrap();
        prop_assert_eq!(smudger.smudge("f", pointer.to_bytes()).unwrap(), data);
    }

    #[test]
    fn text_without_version_line_is_untouched(text in "[a-z \n]{0,200}") {
        let (_dir, smudger) = smudger();
        let out = smudger.smudge("f", text.clone().into_bytes()).unwrap();
        prop_assert_eq!(out, text.into_bytes());
    }
}
