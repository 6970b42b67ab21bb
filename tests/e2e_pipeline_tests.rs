use std::fs;
use std::path::Path;
use tempfile::tempdir;

use title_duper::cluster::AnalysisResult;
use title_duper::{deletion, report, AppConfig, Error, ScanEngine, SilentReporter};

/// Create a library folder with known duplicate titles.
/// Layout:
///   root/
///     War_and_Peace_v1.txt        (100 bytes)
///     War_and_Peace_v2_final.txt  (150 bytes)  ← largest copy
///     Unrelated.txt               (10 bytes)
///     斗破苍穹 完结版.txt          (300 bytes)
///     斗破苍穹(精校).txt           (500 bytes)  ← largest copy
///     cover.jpg                   (filtered by extension)
///     ___.txt                     (no title characters)
///     nested/
///       War_and_Peace_v3.txt      (only seen when recursive)
fn create_library(root: &Path) {
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("War_and_Peace_v1.txt"), vec![b'a'; 100]).unwrap();
    fs::write(root.join("War_and_Peace_v2_final.txt"), vec![b'b'; 150]).unwrap();
    fs::write(root.join("Unrelated.txt"), vec![b'c'; 10]).unwrap();
    fs::write(root.join("斗破苍穹 完结版.txt"), vec![b'd'; 300]).unwrap();
    fs::write(root.join("斗破苍穹(精校).txt"), vec![b'e'; 500]).unwrap();
    fs::write(root.join("cover.jpg"), vec![b'f'; 50]).unwrap();
    fs::write(root.join("___.txt"), vec![b'g'; 5]).unwrap();
    fs::write(root.join("nested").join("War_and_Peace_v3.txt"), vec![b'h'; 900]).unwrap();
}

fn test_config() -> AppConfig {
    AppConfig {
        extensions: vec![".txt".to_string()],
        stopwords: Vec::new(),
        ..Default::default()
    }
}

fn scan(root: &Path, config: &AppConfig) -> title_duper::ScanResult {
    let engine = ScanEngine::new(config).unwrap();
    engine.scan(root, &SilentReporter).unwrap()
}

fn group_names(result: &AnalysisResult) -> Vec<Vec<String>> {
    result
        .groups
        .iter()
        .map(|g| g.files.iter().map(|f| f.name.clone()).collect())
        .collect()
}

#[test]
fn test_full_scan_pipeline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    create_library(&root);

    let result = scan(&root, &test_config());
    let analysis = &result.analysis;

    assert_eq!(analysis.total_files, 5, "jpg, untitled and nested files are excluded");
    assert_eq!(result.skipped_untitled, 1);
    assert_eq!(analysis.group_count, 2);
    assert_eq!(analysis.duplicate_file_count, 4);

    let groups = group_names(analysis);
    assert!(groups.contains(&vec![
        "War_and_Peace_v2_final.txt".to_string(),
        "War_and_Peace_v1.txt".to_string(),
    ]));
    assert!(groups.contains(&vec![
        "斗破苍穹(精校).txt".to_string(),
        "斗破苍穹 完结版.txt".to_string(),
    ]));

    for group in &analysis.groups {
        assert_eq!(group.latest_files().count(), 1);
        assert_eq!(group.old_file_count, 1);
        assert_eq!(group.files[0].size_bytes, group.latest_size_bytes);
        assert!(group.files[0].is_latest_by_size);
    }
}

#[test]
fn test_recursive_scan_includes_subfolders() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    create_library(&root);

    let config = AppConfig {
        recursive: true,
        ..test_config()
    };
    let result = scan(&root, &config);
    assert_eq!(result.analysis.total_files, 6);

    let war = result
        .analysis
        .groups
        .iter()
        .find(|g| g.representative == "War_and_Peace_v3")
        .expect("nested copy joins the group");
    assert_eq!(war.size, 3);
    assert_eq!(war.latest_size_bytes, 900);
    assert_eq!(war.old_file_count, 2);
}

#[test]
fn test_missing_folder_is_rejected() {
    let tmp = tempdir().unwrap();
    let engine = ScanEngine::new(&test_config()).unwrap();
    let err = engine
        .scan(&tmp.path().join("does_not_exist"), &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound(_)));
    assert!(err.is_user_error());
}

#[test]
fn test_folder_without_qualifying_files() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("picture.png"), b"png").unwrap();
    let engine = ScanEngine::new(&test_config()).unwrap();
    let err = engine.scan(tmp.path(), &SilentReporter).unwrap_err();
    match err {
        Error::NoQualifyingFiles { extensions, .. } => {
            assert_eq!(extensions, vec![".txt".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_invalid_lengths_rejected_before_scanning() {
    let config = AppConfig {
        lengths: vec![1],
        ..test_config()
    };
    assert!(matches!(ScanEngine::new(&config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_csv_export() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    create_library(&root);
    let result = scan(&root, &test_config());

    let out = tmp.path().join("groups.csv");
    report::write_csv(&result.analysis, &out).unwrap();

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "CSV starts with a UTF-8 BOM");

    let mut rdr = csv::Reader::from_reader(&bytes[3..]);
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), report::CSV_HEADERS.to_vec());

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), result.analysis.duplicate_file_count);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "yes");
    assert_eq!(&rows[1][1], "no");
    assert!(rows.iter().all(|r| &r[0] == "1" || &r[0] == "2"));
    assert!(rows[0][6].contains('|'));
}

#[test]
fn test_json_export_reads_back() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    create_library(&root);
    let result = scan(&root, &test_config());

    let out = tmp.path().join("groups.json");
    report::write_json(&result.analysis, &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let parsed: AnalysisResult = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, result.analysis);
}

#[test]
fn test_prune_stale_copies() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    create_library(&root);
    let result = scan(&root, &test_config());

    let stale = deletion::stale_copies(&result.analysis);
    assert_eq!(stale.len(), 2);

    let outcome = deletion::delete_files(&stale, &result.folder);
    assert_eq!(outcome.deleted_count, 2);
    assert_eq!(outcome.failed_count, 0);
    assert!(!root.join("War_and_Peace_v1.txt").exists());
    assert!(!root.join("斗破苍穹 完结版.txt").exists());
    assert!(root.join("War_and_Peace_v2_final.txt").exists());

    // A fresh scan sees no duplicates left.
    let rescanned = scan(&root, &test_config());
    assert_eq!(rescanned.analysis.group_count, 0);
}

#[test]
fn test_delete_refuses_paths_outside_root() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    fs::create_dir_all(&root).unwrap();
    let inside = root.join("book.txt");
    let outside = tmp.path().join("elsewhere.txt");
    fs::write(&inside, b"x").unwrap();
    fs::write(&outside, b"y").unwrap();

    let paths = vec![
        outside.to_string_lossy().into_owned(),
        root.join("missing.txt").to_string_lossy().into_owned(),
        root.to_string_lossy().into_owned(),
        inside.to_string_lossy().into_owned(),
    ];
    let outcome = deletion::delete_files(&paths, &root);

    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(outcome.failed_count, 3);
    assert!(outside.exists());
    assert!(!inside.exists());

    let reasons: Vec<&str> = outcome.failed.iter().map(|f| f.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "path is outside the scanned folder",
            "file does not exist",
            "not a file",
        ]
    );
}
