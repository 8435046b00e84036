use super::*;

use std::fs::write;
use std::io::Read as _;
use std::time::{Duration, UNIX_EPOCH};

fn open_store() -> (FolderStore, Session, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FolderStore::open(dir.path().join("remote")).expect("open store");
    let session = store.authenticate("alice", "secret").expect("authenticate");
    (store, session, dir)
}

fn local_file(dir: &Path, name: &str, body: &[u8], mtime_secs: u64) -> PathBuf {
    let path = dir.join(name);
    write(&path, body).expect("write local file");
    File::options()
        .write(true)
        .open(&path)
        .and_then(|f| f.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs)))
        .expect("set mtime");
    path
}

#[test]
fn authenticate_rejects_empty_user() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FolderStore::open(dir.path()).expect("open store");

    for user in ["", "   "] {
        let err = store.authenticate(user, "pw").expect_err("empty user");
        assert!(matches!(err, StoreError::Auth(_)), "{err:?}");
    }
}

#[test]
fn calls_with_foreign_or_blank_session_fail_with_auth() {
    let (store, session, _dir) = open_store();

    let forged = Session {
        token: "not-issued".into(),
        user: "alice".into(),
    };
    let wrong_user = Session {
        token: session.token.clone(),
        user: "mallory".into(),
    };
    let blank = Session {
        token: String::new(),
        user: "alice".into(),
    };

    for bad in [&forged, &wrong_user, &blank] {
        let err = store.list_files(bad).expect_err("unknown session");
        assert!(matches!(err, StoreError::Auth(_)), "{err:?}");
    }

    // Sessions are per store instance.
    let other = FolderStore::open(store.root()).expect("reopen");
    assert!(matches!(
        other.list_files(&session),
        Err(StoreError::Auth(_))
    ));
}

#[test]
fn write_file_stores_copy_with_local_mtime_and_attribution() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "report.pdf", b"%PDF", 1_700_000_000);

    let record = store
        .write_file(&session, &src, "alice")
        .expect("write_file");

    assert_eq!(record.name, "report.pdf");
    assert_eq!(record.extension.as_deref(), Some(".pdf"));
    assert_eq!(record.size, 4);
    assert_eq!(record.modified_at.timestamp(), 1_700_000_000);
    assert_eq!(record.uploaded_by.as_deref(), Some("alice"));
    assert_eq!(record.edited_by.as_deref(), Some("alice"));
    assert!(record.id.is_some());

    let remote_path = record.remote_path.clone().expect("remote path");
    let stored = PathBuf::from(&remote_path);
    assert_eq!(fs::read(&stored).expect("read stored"), b"%PDF");
    assert!(sidecar::sidecar_path(&stored).exists());

    let listed = store.list_files(&session).expect("list");
    assert_eq!(listed, vec![record]);
}

#[test]
fn rewrite_keeps_identity_and_original_uploader() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "notes.txt", b"v1", 1_000);
    let first = store.write_file(&session, &src, "alice").expect("first");

    let src = local_file(dir.path(), "notes.txt", b"version two", 2_000);
    let second = store.write_file(&session, &src, "bob").expect("second");

    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.uploaded_by.as_deref(), Some("alice"));
    assert_eq!(second.edited_by.as_deref(), Some("bob"));
    assert_eq!(second.size, 11);
    assert_eq!(second.modified_at.timestamp(), 2_000);
}

#[test]
fn list_files_hides_sidecars_and_synthesizes_missing_metadata() {
    let (store, session, _dir) = open_store();
    write(store.root().join("zeta.bin"), b"zz").expect("drop file");
    write(store.root().join("alpha.txt"), b"a").expect("drop file");
    write(store.root().join("broken.txt"), b"b").expect("drop file");
    write(
        sidecar::sidecar_path(&store.root().join("broken.txt")),
        b"{ not json",
    )
    .expect("bad sidecar");

    let listed = store.list_files(&session).expect("list");
    let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha.txt", "broken.txt", "zeta.bin"]);

    for record in &listed {
        assert_eq!(record.uploaded_by.as_deref(), Some("alice"));
        assert!(record.remote_path.is_some());
    }

    // Synthesized sidecars are persisted, so identity is stable.
    let again = store.list_files(&session).expect("relist");
    assert_eq!(listed[0].id, again[0].id);
    assert!(sidecar::sidecar_path(&store.root().join("alpha.txt")).exists());
}

#[test]
fn read_file_streams_contents_or_reports_not_found() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "data.csv", b"a,b\n1,2\n", 10);
    let record = store.write_file(&session, &src, "alice").expect("write");
    let remote_path = record.remote_path.expect("remote path");

    let mut body = String::new();
    store
        .read_file(&session, &remote_path)
        .expect("read_file")
        .read_to_string(&mut body)
        .expect("read body");
    assert_eq!(body, "a,b\n1,2\n");

    let missing = store.root().join("nope.csv");
    let err = store
        .read_file(&session, &missing.to_string_lossy())
        .err()
        .expect("missing file");
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
}

#[test]
fn paths_outside_root_or_internal_files_are_not_addressable() {
    let (store, session, dir) = open_store();
    let outside = local_file(dir.path(), "outside.txt", b"o", 1);
    let src = local_file(dir.path(), "inside.txt", b"i", 1);
    let record = store.write_file(&session, &src, "alice").expect("write");
    let inside = PathBuf::from(record.remote_path.expect("remote path"));
    let meta = sidecar::sidecar_path(&inside);

    for path in [&outside, &meta] {
        let p = path.to_string_lossy();
        assert!(!store.exists(&session, &p).expect("exists"), "{p}");
        assert!(matches!(
            store.get_metadata(&session, &p),
            Err(StoreError::NotFound { .. })
        ));
        assert!(!store.delete_file(&session, &p).expect("delete"), "{p}");
    }
    assert!(outside.exists());
}

#[test]
fn delete_file_removes_file_and_sidecar_then_reports_false() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "old.log", b"log", 5);
    let record = store.write_file(&session, &src, "alice").expect("write");
    let remote_path = record.remote_path.expect("remote path");

    assert!(store.exists(&session, &remote_path).expect("exists"));
    assert!(store.delete_file(&session, &remote_path).expect("delete"));
    assert!(!store.exists(&session, &remote_path).expect("exists after"));
    assert!(!sidecar::sidecar_path(Path::new(&remote_path)).exists());
    assert!(!store.delete_file(&session, &remote_path).expect("second delete"));
}

#[test]
fn get_metadata_returns_sidecar_record() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "pic.png", b"\x89PNG", 42);
    let written = store.write_file(&session, &src, "carol").expect("write");
    let remote_path = written.remote_path.clone().expect("remote path");

    let fetched = store
        .get_metadata(&session, &remote_path)
        .expect("get_metadata");
    assert_eq!(fetched, written);
}

#[test]
fn write_file_refuses_bookkeeping_names() {
    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "x.meta.json", b"{}", 1);

    let err = store
        .write_file(&session, &src, "alice")
        .expect_err("sidecar name");
    assert!(matches!(err, StoreError::Io(_)), "{err:?}");
}

#[cfg(unix)]
#[test]
fn stored_copies_keep_readable_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let mode = |p: &Path| fs::metadata(p).expect("stat").permissions().mode() & 0o777;

    let (store, session, dir) = open_store();
    let src = local_file(dir.path(), "shared.txt", b"v1", 1);
    let record = store.write_file(&session, &src, "alice").expect("write");
    let stored = PathBuf::from(record.remote_path.expect("remote path"));
    assert_eq!(mode(&stored), mode(&src), "new copy gets plain create mode");

    fs::set_permissions(&stored, fs::Permissions::from_mode(0o640)).expect("chmod");
    write(&src, b"v2").expect("edit");
    store.write_file(&session, &src, "bob").expect("rewrite");
    assert_eq!(mode(&stored), 0o640, "rewrite keeps the stored mode");
}
