use super::*;

use chrono::TimeZone;
use std::fs::{read, read_dir, write};

#[test]
fn write_atomic_creates_file_and_leaves_no_partials() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dest = tmp.path().join("fresh.txt");

    let written = StdFilesystem
        .write_atomic(&dest, &mut &b"payload"[..])
        .expect("write_atomic");

    assert_eq!(written, 7);
    assert_eq!(read(&dest).expect("read back"), b"payload");

    let leftovers: Vec<_> = read_dir(tmp.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(PARTIAL_SUFFIX))
        .collect();
    assert!(leftovers.is_empty(), "partial files left: {leftovers:?}");
}

#[test]
fn write_atomic_overwrites_existing_file() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dest = tmp.path().join("over.txt");
    write(&dest, b"old contents that are longer").expect("seed");

    StdFilesystem
        .write_atomic(&dest, &mut &b"new"[..])
        .expect("write_atomic");

    assert_eq!(read(&dest).expect("read back"), b"new");
}

#[test]
fn set_modified_round_trips_through_scan() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dest = tmp.path().join("stamp.txt");
    write(&dest, b"x").expect("seed");

    let when = Utc.with_ymd_and_hms(2023, 5, 17, 8, 30, 0).unwrap();
    StdFilesystem.set_modified(&dest, when).expect("set_modified");

    let records = StdFilesystem.scan(tmp.path()).expect("scan");
    assert_eq!(records[0].modified_at, when);
}

#[test]
fn remove_file_reports_absence() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dest = tmp.path().join("gone.txt");
    write(&dest, b"x").expect("seed");

    assert!(StdFilesystem.remove_file(&dest).expect("first remove"));
    assert!(!StdFilesystem.remove_file(&dest).expect("second remove"));
}

#[test]
fn is_dir_distinguishes_files_and_missing_paths() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let file = tmp.path().join("f");
    write(&file, b"x").expect("seed");

    assert!(StdFilesystem.is_dir(tmp.path()));
    assert!(!StdFilesystem.is_dir(&file));
    assert!(!StdFilesystem.is_dir(&tmp.path().join("missing")));
}

#[cfg(unix)]
fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).expect("stat").permissions().mode() & 0o777
}

#[cfg(unix)]
#[test]
fn write_atomic_new_file_gets_plain_create_mode() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let plain = tmp.path().join("plain.txt");
    write(&plain, b"x").expect("plain create");
    let dest = tmp.path().join("downloaded.txt");

    StdFilesystem
        .write_atomic(&dest, &mut &b"x"[..])
        .expect("write_atomic");

    assert_eq!(mode(&dest), mode(&plain));
}

#[cfg(unix)]
#[test]
fn write_atomic_keeps_existing_mode() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().expect("create temp dir");
    for wanted in [0o640, 0o755, 0o444] {
        let dest = tmp.path().join(format!("kept-{wanted:o}.sh"));
        write(&dest, b"old").expect("seed");
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(wanted))
            .expect("chmod");

        StdFilesystem
            .write_atomic(&dest, &mut &b"new"[..])
            .expect("write_atomic");
        let when = Utc.with_ymd_and_hms(2023, 5, 17, 8, 30, 0).unwrap();
        StdFilesystem
            .set_modified(&dest, when)
            .expect("set_modified on replaced file");

        assert_eq!(read(&dest).expect("read back"), b"new");
        assert_eq!(mode(&dest), wanted, "{}", dest.display());
    }
}

#[test]
fn partial_names_are_hidden_and_suffixed() {
    let cases = [
        (format!(".a.txt.x1y2{PARTIAL_SUFFIX}"), true),
        (format!("a.txt{PARTIAL_SUFFIX}"), false),
        (format!(".{PARTIAL_SUFFIX}"), false),
        (PARTIAL_SUFFIX.to_owned(), false),
        (".bashrc".to_owned(), false),
    ];

    for (name, expected) in cases {
        assert_eq!(is_partial_name(&name), expected, "{name:?}");
    }
}
