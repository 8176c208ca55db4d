use super::*;
use tempfile::tempdir;

#[test]
fn blob_put_then_get_returns_the_record() {
    let dir = tempdir().unwrap();
    let store = BlobStore::new(dir.path().join("blobs"));

    store
        .put("abc-1", "song", "audio/mpeg", b"ID3 fake bytes")
        .unwrap();

    let rec = store.get("abc-1").unwrap().unwrap();
    assert_eq!(rec.id, "abc-1");
    assert_eq!(rec.name, "song");
    assert_eq!(rec.mime_type, "audio/mpeg");
    assert_eq!(rec.bytes, b"ID3 fake bytes");

    let located = store.locate("abc-1").unwrap().unwrap();
    assert_eq!(std::fs::read(located).unwrap(), b"ID3 fake bytes");
}

#[test]
fn blob_get_missing_id_is_absent() {
    let dir = tempdir().unwrap();
    let store = BlobStore::new(dir.path());
    assert!(store.get("nope").unwrap().is_none());
    assert!(store.locate("nope").unwrap().is_none());
}

#[test]
fn blob_store_is_opened_lazily_and_writes_schema() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("blobs");
    let store = BlobStore::new(&root);
    assert!(!root.exists());

    let _ = store.get("x").unwrap();
    let schema = std::fs::read_to_string(root.join("schema.json")).unwrap();
    assert!(schema.contains("\"version\":1"));
}

#[test]
fn blob_store_rejects_unknown_schema_version() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("schema.json"), r#"{"version":7}"#).unwrap();

    let store = BlobStore::new(dir.path());
    let err = store.get("x").unwrap_err();
    assert!(matches!(
        err,
        StoreError::SchemaVersion {
            found: 7,
            expected: 1
        }
    ));
}

#[test]
fn blob_store_rejects_path_like_ids() {
    let dir = tempdir().unwrap();
    let store = BlobStore::new(dir.path());
    assert!(matches!(
        store.put("../evil", "x", "audio/mpeg", b""),
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(store.get(""), Err(StoreError::InvalidId(_))));
}

#[test]
fn settings_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut s = SettingsStore::open(&path);
    assert_eq!(s.get_string(keys::VOLUME), None);
    s.set_string(keys::VOLUME, "0.4").unwrap();

    let reopened = SettingsStore::open(&path);
    assert_eq!(reopened.get_string(keys::VOLUME), Some("0.4"));
}

#[test]
fn malformed_settings_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let s = SettingsStore::open(&path);
    assert_eq!(s.get_string(keys::TRACKS), None);
}

#[test]
fn load_json_treats_malformed_value_as_no_data() {
    let dir = tempdir().unwrap();
    let mut s = SettingsStore::open(dir.path().join("settings.json"));
    s.set_string(keys::RECENTS, "[{broken").unwrap();

    let loaded: Option<Vec<String>> = s.load_json(keys::RECENTS);
    assert!(loaded.is_none());

    s.save_json(keys::RECENTS, &vec!["a".to_string()]).unwrap();
    let loaded: Option<Vec<String>> = s.load_json(keys::RECENTS);
    assert_eq!(loaded, Some(vec!["a".to_string()]));
}
