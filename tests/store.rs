use arise_worship::db::{
    count_songs, delete_song, export_songs, fetch_popular, fetch_songs, import_songs,
    open_database, record_view, seed_sample_songs, SongFilter,
};
use tempfile::tempdir;

#[test]
fn seeding_only_fills_an_empty_library() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("songs.sqlite");

    let conn = open_database(&path).unwrap();
    assert_eq!(seed_sample_songs(&conn).unwrap(), 3);
    assert_eq!(seed_sample_songs(&conn).unwrap(), 0);
    drop(conn);

    let reopened = open_database(&path).unwrap();
    assert_eq!(count_songs(&reopened).unwrap(), 3);
}

#[test]
fn views_drive_the_popular_list() {
    let dir = tempdir().unwrap();
    let conn = open_database(&dir.path().join("songs.sqlite")).unwrap();
    seed_sample_songs(&conn).unwrap();

    let songs = fetch_songs(&conn, &SongFilter::default()).unwrap();
    let target = songs.last().unwrap().id;
    record_view(&conn, target).unwrap();
    let viewed = record_view(&conn, target).unwrap();
    assert_eq!(viewed.views, 2);

    let popular = fetch_popular(&conn, 1).unwrap();
    assert_eq!(popular[0].id, target);
}

#[test]
fn export_then_import_into_a_fresh_library() {
    let dir = tempdir().unwrap();
    let source = open_database(&dir.path().join("a.sqlite")).unwrap();
    seed_sample_songs(&source).unwrap();
    let file = dir.path().join("songs.json");
    assert_eq!(export_songs(&source, &file).unwrap(), 3);

    let target = open_database(&dir.path().join("b.sqlite")).unwrap();
    assert_eq!(import_songs(&target, &file).unwrap(), 3);

    let filter = SongFilter {
        query: Some("uyir".to_string()),
        ..SongFilter::default()
    };
    let found = fetch_songs(&target, &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].views, 0);
}

#[test]
fn deleting_a_missing_song_reports_not_found() {
    let dir = tempdir().unwrap();
    let conn = open_database(&dir.path().join("songs.sqlite")).unwrap();
    let err = delete_song(&conn, 42).unwrap_err();
    assert_eq!(err.to_string(), "Song not found");
}
