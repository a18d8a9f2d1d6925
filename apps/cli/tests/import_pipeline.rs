//! End-to-end pipeline tests over real fixture packages: a zip container
//! with an embedded SQLite collection, media index and media files.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use rusqlite::Connection;
use zip::write::{SimpleFileOptions, ZipWriter};

use packdrill_cli::db::CardStore;
use packdrill_cli::import::{
    import_package, inspect_package, rebuild_deck, ImportError, ImportOptions,
};
use packdrill_cli::paths::AppPaths;
use packdrill_cli::settings::SettingsStore;
use packdrill_core::{ExtractError, FieldMapping, FieldRoles, Strategy};

const BASIC_MODELS: &str = r#"{
    "1607392319495": {
        "name": "Basic",
        "flds": [{"name": "Front", "ord": 0}, {"name": "Back", "ord": 1}, {"name": "Extra", "ord": 2}],
        "tmpls": [{"name": "Card 1", "ord": 0, "qfmt": "{{Front}}", "afmt": "{{FrontSide}}<hr id=answer>{{Back}}"}]
    }
}"#;

fn write_collection(
    path: &Path,
    models: &str,
    notes: &[(i64, i64, &str)],
    cards: &[(i64, i64)],
) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE col (id integer primary key, models text not null);
         CREATE TABLE notes (id integer primary key, mid integer not null, flds text not null);
         CREATE TABLE cards (id integer primary key, nid integer not null, ord integer not null);",
    )
    .unwrap();
    conn.execute("INSERT INTO col (id, models) VALUES (1, ?1)", [models])
        .unwrap();
    for (id, mid, flds) in notes {
        conn.execute(
            "INSERT INTO notes (id, mid, flds) VALUES (?1, ?2, ?3)",
            (id, mid, flds),
        )
        .unwrap();
    }
    for (nid, ord) in cards {
        conn.execute("INSERT INTO cards (nid, ord) VALUES (?1, ?2)", (nid, ord))
            .unwrap();
    }
}

fn build_package(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// A package named `french.apkg` with two notes, templates and one
/// mapped media file.
fn build_french_package(dir: &Path) -> std::path::PathBuf {
    let collection = dir.join("collection-fixture.sqlite");
    write_collection(
        &collection,
        BASIC_MODELS,
        &[
            (1, 1607392319495, "Paris\u{1f}France\u{1f}Europe"),
            (2, 1607392319495, "2+2?\u{1f}4\u{1f}"),
        ],
        &[(1, 0), (2, 0)],
    );
    let collection_bytes = fs::read(&collection).unwrap();

    let package = dir.join("french.apkg");
    build_package(
        &package,
        &[
            ("collection.anki2", collection_bytes.as_slice()),
            ("media", br#"{"0": "bonjour.mp3"}"# as &[u8]),
            ("0", b"not really audio" as &[u8]),
        ],
    );
    package
}

fn setup(dir: &Path) -> (AppPaths, CardStore, SettingsStore) {
    let paths = AppPaths::new(dir.join("data"));
    let store = CardStore::open_in_memory().unwrap();
    let settings = SettingsStore::open(paths.settings_path());
    (paths, store, settings)
}

#[test]
fn import_renders_templates_and_extracts_media() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_french_package(dir.path());
    let (paths, mut store, settings) = setup(dir.path());

    let summary = import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.deck_name, "french");
    assert_eq!(summary.strategy, Strategy::Template);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.source_notes, 2);
    assert_eq!(summary.source_cards, 2);
    assert_eq!(summary.media_files, 1);
    assert!(paths.media_dir("french").join("bonjour.mp3").exists());

    let decks = store.list_decks().unwrap();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].card_count, 2);

    let card = store
        .fetch_next_due(summary.deck_id, chrono::Utc::now(), false)
        .unwrap()
        .unwrap();
    assert_eq!(card.content.front, "Paris");
    assert_eq!(card.content.back, "Paris\n\nFrance");
}

#[test]
fn stored_mapping_takes_over_and_rebuild_reuses_source_notes() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_french_package(dir.path());
    let (paths, mut store, mut settings) = setup(dir.path());

    // First import goes through templates and archives the raw notes.
    let summary = import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions::default(),
    )
    .unwrap();

    // The user now assigns fields and rebuilds without the package.
    settings
        .set_mapping(
            "french",
            &FieldMapping::single(
                "1607392319495",
                FieldRoles {
                    front_indexes: vec![1],
                    back_indexes: vec![2, 3],
                },
            ),
        )
        .unwrap();

    let rebuilt = rebuild_deck(&mut store, &settings, "french", chrono::Utc::now()).unwrap();
    assert_eq!(rebuilt.deck_id, summary.deck_id);
    assert_eq!(rebuilt.strategy, Strategy::Mapping);
    assert_eq!(rebuilt.inserted, 2);

    let card = store
        .fetch_next_due(rebuilt.deck_id, chrono::Utc::now(), false)
        .unwrap()
        .unwrap();
    assert_eq!(card.content.front, "Paris");
    assert_eq!(card.content.back, "France\n──────── \nEurope");
}

#[test]
fn mapping_matching_nothing_fails_without_touching_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_french_package(dir.path());
    let (paths, mut store, mut settings) = setup(dir.path());

    // Two entries disable the single-model shortcut; neither id exists
    // in the package.
    let mut mapping = FieldMapping::single(
        "ghost-a",
        FieldRoles {
            front_indexes: vec![1],
            back_indexes: vec![2],
        },
    );
    mapping.models.insert("ghost-b".into(), FieldRoles::default());
    settings.set_mapping("french", &mapping).unwrap();

    let err = import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ImportError::Extract(ExtractError::NoCardsProduced { notes: 2, .. })
    ));
    assert!(store.list_decks().unwrap().is_empty());
}

#[test]
fn current_collection_is_preferred_over_legacy() {
    let dir = tempfile::tempdir().unwrap();

    let legacy = dir.path().join("legacy.sqlite");
    write_collection(&legacy, "{}", &[(1, 1, "old-front\u{1f}old-back")], &[]);
    let current = dir.path().join("current.sqlite");
    write_collection(&current, "{}", &[(1, 1, "new-front\u{1f}new-back")], &[]);

    let package = dir.path().join("both.apkg");
    build_package(
        &package,
        &[
            ("collection.anki2", fs::read(&legacy).unwrap().as_slice()),
            ("collection.anki21", fs::read(&current).unwrap().as_slice()),
        ],
    );

    let (paths, mut store, settings) = setup(dir.path());
    let summary = import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions::default(),
    )
    .unwrap();

    // No models, no card rows: the naive strategy over the current
    // database's notes.
    assert_eq!(summary.strategy, Strategy::Naive);
    let card = store
        .fetch_next_due(summary.deck_id, chrono::Utc::now(), false)
        .unwrap()
        .unwrap();
    assert_eq!(card.content.front, "new-front");
    assert_eq!(card.content.back, "new-back");
}

#[test]
fn package_without_collection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("empty.apkg");
    build_package(&package, &[("media", b"{}" as &[u8]), ("0", b"stray" as &[u8])]);

    let (paths, mut store, settings) = setup(dir.path());
    let err = import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::Package(_)));
    assert!(store.list_decks().unwrap().is_empty());
}

#[test]
fn inspect_caches_a_snapshot_with_samples() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_french_package(dir.path());
    let (paths, _store, mut settings) = setup(dir.path());

    let snapshot = inspect_package(&mut settings, &paths, &package).unwrap();
    assert_eq!(snapshot.short_name, "french");

    let model = &snapshot.models["1607392319495"];
    assert_eq!(model.name, "Basic");
    assert_eq!(model.note_count, 2);
    assert_eq!(model.fields[0].name, "Front");
    assert_eq!(model.fields[0].samples, vec!["Paris", "2+2?"]);
    // Only the first note fills the third field.
    assert_eq!(model.fields[2].samples, vec!["Europe"]);

    // The snapshot is cached for later mapping sessions.
    let cached = settings.snapshot_for("french").unwrap();
    assert_eq!(cached, snapshot);
}

#[test]
fn reimport_with_overwrite_replaces_cards() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_french_package(dir.path());
    let (paths, mut store, settings) = setup(dir.path());

    import_package(&mut store, &settings, &paths, &package, &ImportOptions::default()).unwrap();
    import_package(
        &mut store,
        &settings,
        &paths,
        &package,
        &ImportOptions {
            overwrite: true,
            ..Default::default()
        },
    )
    .unwrap();

    let decks = store.list_decks().unwrap();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].card_count, 2);
}
