#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end tests of the command handlers on real directory trees

use advhd_cli::commands::{arc, pna};
use advhd_cli::{CommandError, ToolConfig};
use advhd_formats::pna::PNA_MAGIC;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn config() -> ToolConfig {
    ToolConfig {
        jobs: Some(2),
        ..ToolConfig::default()
    }
}

fn write(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

fn pna_bytes(width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
    let mut record = [0u8; 40];
    record[16..20].copy_from_slice(&width.to_le_bytes());
    record[20..24].copy_from_slice(&height.to_le_bytes());
    record[36..40].copy_from_slice(&(payload.len() as u32).to_le_bytes());

    let mut data = Vec::new();
    data.extend_from_slice(&PNA_MAGIC.to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&1i32.to_le_bytes());
    data.extend_from_slice(&record);
    data.extend_from_slice(payload);
    data
}

// --- ARC ---

#[test]
fn pack_all_then_unpack_directory() {
    let root = tempfile::tempdir().unwrap();
    let work = root.path().join("work");
    write(&work.join("Rio").join("a").join("b.ws2"), &[1, 2, 3, 4]);
    write(&work.join("Rio").join("c.txt"), b"");
    write(&work.join("Voice").join("v.ogg"), b"OggS");

    let report = arc::pack_all(&config(), &work, "dat").unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert!(work.join("Rio.dat").is_file());
    assert!(work.join("Voice.dat").is_file());

    // Unpack into a fresh tree so the sources are not overwritten
    let out = root.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::rename(work.join("Rio.dat"), out.join("Rio.dat")).unwrap();
    fs::rename(work.join("Voice.dat"), out.join("Voice.dat")).unwrap();
    write(&out.join("notes.txt"), b"not an archive");

    let report = arc::unpack_all(&config(), &out).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(
        fs::read(out.join("Rio").join("a").join("b.ws2")).unwrap(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(fs::read(out.join("Voice").join("v.ogg")).unwrap(), b"OggS");
}

#[test]
fn pack_all_without_subdirectories_fails() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("loose.txt"), b"x");

    let err = arc::pack_all(&config(), root.path(), ".arc").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CommandError>(),
        Some(CommandError::NoSubdirectories(_))
    ));
}

#[test]
fn unpack_batch_counts_failures() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("src").join("x.txt"), b"x");
    arc::pack(&config(), &root.path().join("src"), ".arc", None).unwrap();
    write(&root.path().join("broken.arc"), &[0xFF; 16]);

    let err = arc::unpack_all(&config(), root.path()).unwrap_err();
    match err.downcast_ref::<CommandError>() {
        Some(CommandError::BatchFailed { failed, total, .. }) => {
            assert_eq!(*failed, 1);
            assert_eq!(*total, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read(root.path().join("src").join("x.txt")).unwrap(), b"x");
}

#[test]
fn pack_empty_directory_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let empty = root.path().join("Empty");
    fs::create_dir_all(&empty).unwrap();

    arc::pack(&config(), &empty, ".arc", None).unwrap();
    assert!(!root.path().join("Empty.arc").exists());
}

// --- PNA format directory ---

#[test]
fn convert_then_repack_all() {
    let root = tempfile::tempdir().unwrap();
    let fmt = root.path().join("pna");
    write(&fmt.join("orig").join("chara").join("face.pna"), &pna_bytes(2, 2, &[9; 10]));

    // Sidecar left by the sorting pass
    write(
        &fmt.join("metadata").join("face.pna.json"),
        br#"{"OriginalRelativePath":"image/chara/face.pna"}"#,
    );

    let report = pna::convert(&config(), &fmt).unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(fs::read(fmt.join("png").join("face.pna").join("000.png")).unwrap(), vec![9; 10]);

    write(&fmt.join("fix").join("face.pna").join("000.png"), &[7; 12]);
    let report = pna::repack_all(&config(), &fmt, "fix").unwrap();
    assert_eq!(report.succeeded, 1);

    let out = fs::read(fmt.join("new").join("face.pna")).unwrap();
    assert_eq!(out, pna_bytes(2, 2, &[7; 12]));
}

#[test]
fn repack_all_reports_missing_sidecar() {
    let root = tempfile::tempdir().unwrap();
    let fmt = root.path().join("pna");
    write(&fmt.join("fix").join("ghost.pna").join("000.png"), &[1]);

    let err = pna::repack_all(&config(), &fmt, "fix").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CommandError>(),
        Some(CommandError::BatchFailed { failed: 1, .. })
    ));
    assert!(!fmt.join("new").join("ghost.pna").exists());
}

#[test]
fn single_pna_unpack_and_repack() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("bg.pna");
    write(&src, &pna_bytes(4, 4, &[3; 5]));

    pna::unpack(&src, None, None).unwrap();
    assert_eq!(fs::read(root.path().join("bg").join("000.png")).unwrap(), vec![3; 5]);
    assert!(root.path().join("bg.json").is_file());

    let dest = root.path().join("bg.new.pna");
    pna::repack(&root.path().join("bg"), None, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
}
