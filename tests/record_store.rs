use std::fs;
use std::path::Path;

use soundboard::store::codec;
use soundboard::{Record, RecordStore, StoreError, StorePaths};
use tempfile::TempDir;

/// Store seeded with `rows` and a matching audio file for each of them.
fn seeded(rows: &[(&str, &str)]) -> (RecordStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::under(dir.path());
    paths.ensure_layout().unwrap();

    let records: Vec<Record> = rows.iter().map(|(t, f)| Record::new(*t, *f)).collect();
    fs::write(&paths.content_file, codec::encode(&records)).unwrap();
    for record in &records {
        fs::write(paths.asset_dir.join(&record.filename), b"RIFF").unwrap();
    }

    (RecordStore::open(paths).unwrap(), dir)
}

fn abc() -> (RecordStore, TempDir) {
    seeded(&[("a", "a.wav"), ("b", "b.wav"), ("c", "c.wav")])
}

fn table(store: &RecordStore) -> Vec<(String, String)> {
    store
        .records()
        .iter()
        .map(|r| (r.title.clone(), r.filename.clone()))
        .collect()
}

fn pairs(rows: &[(&str, &str)]) -> Vec<(String, String)> {
    rows.iter()
        .map(|(t, f)| (t.to_string(), f.to_string()))
        .collect()
}

fn on_disk(store: &RecordStore) -> String {
    fs::read_to_string(&store.paths().content_file).unwrap()
}

/// Only the content file and the audio folder should remain after a commit.
fn assert_no_stray_files(dir: &Path) {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["audio", "content.csv"]);
}

#[test]
fn open_creates_an_empty_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::open(StorePaths::under(&dir.path().join("fresh"))).unwrap();
    assert!(store.is_empty());
    assert!(dir.path().join("fresh/audio").is_dir());
}

#[test]
fn load_from_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RecordStore::load_from(StorePaths::under(dir.path())).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn malformed_row_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::under(dir.path());
    paths.ensure_layout().unwrap();
    fs::write(&paths.content_file, "a,a.wav\nno delimiter here\n").unwrap();

    match RecordStore::open(paths).unwrap_err() {
        StoreError::Format { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reload_is_idempotent() {
    let (mut store, _dir) = abc();
    let first = store.load().unwrap().to_vec();
    let second = store.load().unwrap().to_vec();
    assert_eq!(first, second);
}

#[test]
fn resolve_filename_reports_missing_titles() {
    let (store, _dir) = abc();
    assert_eq!(store.resolve_filename("b").unwrap(), "b.wav");
    assert!(matches!(
        store.resolve_filename("zzz"),
        Err(StoreError::NotFound(title)) if title == "zzz"
    ));
}

#[test]
fn asset_path_points_into_the_audio_folder() {
    let (store, _dir) = abc();
    let path = store.asset_path("c").unwrap();
    assert_eq!(path, store.paths().asset_dir.join("c.wav"));
    assert!(path.exists());
}

#[test]
fn move_up_swaps_with_predecessor() {
    let (mut store, _dir) = abc();
    store.move_up("b").unwrap();
    assert_eq!(table(&store), pairs(&[("b", "b.wav"), ("a", "a.wav"), ("c", "c.wav")]));
    assert_eq!(on_disk(&store), "b,b.wav\na,a.wav\nc,c.wav\n");
}

#[test]
fn move_up_twice_restores_order() {
    let (mut store, _dir) = seeded(&[
        ("a", "a.wav"),
        ("b", "b.wav"),
        ("c", "c.wav"),
        ("d", "d.wav"),
    ]);
    let original = table(&store);
    store.move_up("c").unwrap();
    store.move_up("b").unwrap();
    assert_eq!(table(&store), original);
}

#[test]
fn move_up_on_first_or_missing_is_a_no_op() {
    let (mut store, _dir) = abc();
    let before = on_disk(&store);
    store.move_up("a").unwrap();
    store.move_up("nope").unwrap();
    assert_eq!(on_disk(&store), before);
}

#[test]
fn move_down_mirrors_move_up() {
    let (mut store, _dir) = abc();
    store.move_down("a").unwrap();
    assert_eq!(table(&store), pairs(&[("b", "b.wav"), ("a", "a.wav"), ("c", "c.wav")]));

    store.move_down("c").unwrap();
    assert_eq!(table(&store), pairs(&[("b", "b.wav"), ("a", "a.wav"), ("c", "c.wav")]));
}

#[test]
fn add_moves_the_file_and_appends() {
    let (mut store, dir) = abc();
    let outside = tempfile::tempdir_in(dir.path()).unwrap();
    let source = outside.path().join("x.wav");
    fs::write(&source, b"RIFF").unwrap();

    store.add(&[&source]).unwrap();

    assert_eq!(store.records().last(), Some(&Record::new("x", "x.wav")));
    assert_eq!(store.len(), 4);
    assert!(!source.exists());
    assert!(store.paths().asset_dir.join("x.wav").exists());
    assert_eq!(on_disk(&store), "a,a.wav\nb,b.wav\nc,c.wav\nx,x.wav\n");
}

#[test]
fn add_processes_sources_in_order() {
    let (mut store, dir) = seeded(&[]);
    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let sources: Vec<_> = ["horn.wav", "drum roll.mp3", "applause.ogg"]
        .iter()
        .map(|name| {
            let path = inbox.path().join(name);
            fs::write(&path, b"data").unwrap();
            path
        })
        .collect();

    store.add(&sources).unwrap();

    let titles: Vec<_> = store.enumerate(0, 10).collect();
    assert_eq!(titles, ["horn", "drum roll", "applause"]);
    assert_eq!(store.resolve_filename("drum roll").unwrap(), "drum roll.mp3");
}

#[test]
fn add_rejects_duplicate_titles_before_moving() {
    let (mut store, dir) = abc();
    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let source = inbox.path().join("b.mp3");
    fs::write(&source, b"data").unwrap();

    let err = store.add(&[&source]).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTitle(title) if title == "b"));
    assert!(source.exists());
    assert_eq!(store.len(), 3);
}

#[test]
fn add_never_overwrites_an_existing_audio_file() {
    let (mut store, dir) = seeded(&[("a", "a.wav")]);
    fs::write(store.paths().asset_dir.join("a.wav"), b"ORIGINAL").unwrap();
    store.rename("a", "alpha").unwrap();

    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let source = inbox.path().join("a.wav");
    fs::write(&source, b"NEWCLIP").unwrap();

    let err = store.add(&[&source]).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(source.exists());
    assert_eq!(table(&store), pairs(&[("alpha", "a.wav")]));
    assert_eq!(fs::read(store.asset_path("alpha").unwrap()).unwrap(), b"ORIGINAL");
}

#[test]
fn failed_commit_returns_the_source_file() {
    let (mut store, dir) = abc();
    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let source = inbox.path().join("horn.wav");
    fs::write(&source, b"data").unwrap();

    // A directory in place of the content file makes the final rename fail.
    let content = store.paths().content_file.clone();
    fs::remove_file(&content).unwrap();
    fs::create_dir(&content).unwrap();
    fs::write(content.join("keep"), b"").unwrap();

    let err = store.add(&[&source]).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(source.exists());
    assert!(!store.paths().asset_dir.join("horn.wav").exists());
    assert_eq!(
        table(&store),
        pairs(&[("a", "a.wav"), ("b", "b.wav"), ("c", "c.wav")])
    );
}

#[test]
fn add_rejects_delimiter_in_file_name() {
    let (mut store, dir) = abc();
    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let source = inbox.path().join("one,two.wav");
    fs::write(&source, b"data").unwrap();

    assert!(matches!(store.add(&[&source]), Err(StoreError::Validation(_))));
    assert!(source.exists());
}

#[test]
fn add_keeps_earlier_imports_when_a_later_one_fails() {
    let (mut store, dir) = abc();
    let inbox = tempfile::tempdir_in(dir.path()).unwrap();
    let good = inbox.path().join("good.wav");
    fs::write(&good, b"data").unwrap();
    let missing = inbox.path().join("missing.wav");

    let err = store.add(&[&good, &missing]).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(store.records().last(), Some(&Record::new("good", "good.wav")));
    assert_eq!(store.len(), 4);
    assert!(!store.paths().asset_dir.join("missing.wav").exists());
}

#[test]
fn delete_with_asset_removes_both() {
    let (mut store, _dir) = abc();
    store.delete("b", true).unwrap();
    assert_eq!(table(&store), pairs(&[("a", "a.wav"), ("c", "c.wav")]));
    assert!(!store.paths().asset_dir.join("b.wav").exists());
}

#[test]
fn delete_without_asset_leaves_the_file() {
    let (mut store, _dir) = abc();
    store.delete("b", false).unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.paths().asset_dir.join("b.wav").exists());
}

#[test]
fn delete_of_absent_title_changes_nothing() {
    let (mut store, _dir) = abc();
    let before = table(&store);
    store.delete("zzz", true).unwrap();
    assert_eq!(table(&store), before);
}

#[test]
fn failed_asset_removal_still_commits_the_row() {
    let (mut store, _dir) = abc();
    fs::remove_file(store.paths().asset_dir.join("b.wav")).unwrap();

    let err = store.delete("b", true).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(table(&store), pairs(&[("a", "a.wav"), ("c", "c.wav")]));
    assert_eq!(on_disk(&store), "a,a.wav\nc,c.wav\n");
}

#[test]
fn unsafe_stored_file_name_still_commits_the_row() {
    let (mut store, _dir) = seeded(&[("a", "a.wav")]);
    fs::write(&store.paths().content_file, "a,a.wav\nbad,sub/x.wav\n").unwrap();
    store.load().unwrap();

    let err = store.delete("bad", true).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(table(&store), pairs(&[("a", "a.wav")]));
    assert_eq!(on_disk(&store), "a,a.wav\n");
}

#[test]
fn rename_keeps_position_and_file() {
    let (mut store, _dir) = abc();
    store.rename("a", "alpha").unwrap();
    assert_eq!(
        table(&store),
        pairs(&[("alpha", "a.wav"), ("b", "b.wav"), ("c", "c.wav")])
    );
}

#[test]
fn rename_trims_surrounding_whitespace() {
    let (mut store, _dir) = abc();
    store.rename("c", "  charlie  ").unwrap();
    assert_eq!(store.resolve_filename("charlie").unwrap(), "c.wav");
}

#[test]
fn rename_rejects_blank_and_unencodable_titles() {
    let (mut store, _dir) = abc();
    let before = on_disk(&store);
    for bad in ["", "   ", "one, two", "line\nbreak"] {
        assert!(
            matches!(store.rename("a", bad), Err(StoreError::Validation(_))),
            "{bad:?} should be rejected"
        );
    }
    assert_eq!(on_disk(&store), before);
}

#[test]
fn rename_rejects_titles_already_in_use() {
    let (mut store, _dir) = abc();
    assert!(matches!(
        store.rename("a", "c"),
        Err(StoreError::DuplicateTitle(title)) if title == "c"
    ));
    assert_eq!(store.resolve_filename("a").unwrap(), "a.wav");
}

#[test]
fn rename_of_absent_title_is_a_no_op() {
    let (mut store, _dir) = abc();
    let before = table(&store);
    store.rename("zzz", "new").unwrap();
    assert_eq!(table(&store), before);
}

#[test]
fn enumerate_returns_the_requested_window() {
    let (store, _dir) = seeded(&[
        ("r0", "r0.wav"),
        ("r1", "r1.wav"),
        ("r2", "r2.wav"),
        ("r3", "r3.wav"),
        ("r4", "r4.wav"),
    ]);
    let window: Vec<_> = store.enumerate(2, 2).collect();
    assert_eq!(window, ["r2", "r3"]);
    assert_eq!(store.enumerate(5, 2).count(), 0);
}

#[test]
fn windows_cover_the_catalog_without_gaps() {
    let rows: Vec<(String, String)> = (0..17)
        .map(|i| (format!("clip{i:02}"), format!("clip{i:02}.wav")))
        .collect();
    let borrowed: Vec<(&str, &str)> = rows.iter().map(|(t, f)| (t.as_str(), f.as_str())).collect();
    let (store, _dir) = seeded(&borrowed);

    let window = 4;
    let mut seen = Vec::new();
    let mut skip = 0;
    while skip < store.len() {
        seen.extend(store.enumerate(skip, window).map(str::to_string));
        skip += window;
    }
    let expected: Vec<_> = rows.into_iter().map(|(t, _)| t).collect();
    assert_eq!(seen, expected);
}

#[test]
fn mutations_leave_no_temporary_files() {
    let (mut store, dir) = abc();
    store.move_up("c").unwrap();
    store.rename("a", "alpha").unwrap();
    store.delete("b", false).unwrap();
    assert_no_stray_files(dir.path());
}

#[test]
fn duplicate_titles_in_file_resolve_to_first_row() {
    let (mut store, _dir) = seeded(&[("a", "a.wav"), ("dup", "first.wav"), ("dup", "second.wav")]);
    assert_eq!(store.len(), 3);
    assert_eq!(store.resolve_filename("dup").unwrap(), "first.wav");

    store.delete("dup", false).unwrap();
    assert_eq!(store.resolve_filename("dup").unwrap(), "second.wav");
}
