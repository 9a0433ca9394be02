use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mockall::Sequence;
use tempfile::tempdir;

use drive_upload_core::config::DeliveryConfig;
use drive_upload_core::contract::{MockRemoteStore, NewRemoteFile, PermissionList, RemoteFile};
use drive_upload_core::contract::{Permission, StoreError};
use drive_upload_core::deliver::{archive_path, deliver, folder_link, DeliveryError};

fn config(target: PathBuf, folder_id: &str, name: Option<&str>) -> DeliveryConfig {
    DeliveryConfig {
        target,
        folder_id: folder_id.to_string(),
        name: name.map(str::to_string),
    }
}

#[tokio::test]
async fn delivers_directory_as_zip_and_reports_folder_link() {
    let root = tempdir().unwrap();
    let target = root.path().join("mydir");
    fs::create_dir_all(target.join("sub")).unwrap();
    fs::write(target.join("a.txt"), b"alpha").unwrap();
    fs::write(target.join("sub/b.txt"), b"beta").unwrap();

    let config = config(target.clone(), "folder-123", None);

    let mut store = MockRemoteStore::new();
    let mut seq = Sequence::new();

    // Capture what the pipeline hands the store, to assert on afterwards.
    let uploads: Arc<Mutex<Vec<(String, String, PathBuf, bool)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let uploads_in_mock = Arc::clone(&uploads);
    store
        .expect_create_file()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |req: NewRemoteFile<'_>| {
            uploads_in_mock.lock().unwrap().push((
                req.display_name.to_string(),
                req.parent_folder_id.to_string(),
                req.source_path.to_path_buf(),
                req.source_path.is_file(),
            ));
            Ok(RemoteFile {
                id: "file-1".to_string(),
            })
        });

    let listed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let listed_in_mock = Arc::clone(&listed);
    store
        .expect_list_permissions()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |file_id| {
            listed_in_mock.lock().unwrap().push(file_id.to_string());
            Ok(PermissionList {
                permissions: vec![Permission {
                    id: "perm-1".to_string(),
                    grantee_type: "user".to_string(),
                    role: "owner".to_string(),
                }],
            })
        });

    let report = deliver(&config, &store).await.expect("delivery succeeds");

    assert_eq!(report.file_id, "file-1");
    assert_eq!(report.display_name, "mydir.zip");
    assert_eq!(report.link, "https://drive.google.com/drive/folders/folder-123");
    let summary = report.archive.expect("directory targets report a summary");
    assert_eq!(summary.entries, 2);
    assert!(summary.bytes_written > 0);

    let uploads = uploads.lock().unwrap();
    let (display_name, parent, source_path, existed_at_upload) = &uploads[0];
    assert_eq!(display_name, "mydir.zip");
    assert_eq!(parent, "folder-123");
    assert_eq!(source_path, &archive_path(&config));
    assert!(
        existed_at_upload,
        "the archive must be finished on disk before the upload starts"
    );

    // The permissions lookup refers to the id the upload just returned.
    assert_eq!(listed.lock().unwrap().as_slice(), ["file-1"]);

    // The archive sits next to the target and really contains the tree.
    let archive = archive_path(&config);
    assert_eq!(archive, root.path().join("mydir.zip"));
    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    assert!(zip.by_name("a.txt").is_ok());
    assert!(zip.by_name("sub/b.txt").is_ok());
}

#[tokio::test]
async fn uploads_single_file_without_zipping() {
    let root = tempdir().unwrap();
    let target = root.path().join("report.txt");
    fs::write(&target, b"quarterly numbers").unwrap();

    let config = config(target.clone(), "folder-9", None);

    let mut store = MockRemoteStore::new();
    let uploads: Arc<Mutex<Vec<(String, PathBuf)>>> = Arc::new(Mutex::new(Vec::new()));
    let uploads_in_mock = Arc::clone(&uploads);
    store
        .expect_create_file()
        .times(1)
        .returning(move |req: NewRemoteFile<'_>| {
            uploads_in_mock
                .lock()
                .unwrap()
                .push((req.display_name.to_string(), req.source_path.to_path_buf()));
            Ok(RemoteFile {
                id: "file-2".to_string(),
            })
        });
    store
        .expect_list_permissions()
        .times(1)
        .returning(|_| Ok(PermissionList::default()));

    let report = deliver(&config, &store).await.expect("delivery succeeds");

    assert_eq!(report.display_name, "report.txt");
    assert!(report.archive.is_none(), "plain files are not zipped");
    assert!(
        !root.path().join("report.txt.zip").exists(),
        "no archive is written for a plain file"
    );

    let uploads = uploads.lock().unwrap();
    assert_eq!(uploads[0], ("report.txt".to_string(), target));
}

#[tokio::test]
async fn name_override_renames_a_single_file() {
    let root = tempdir().unwrap();
    let target = root.path().join("report.txt");
    fs::write(&target, b"contents").unwrap();

    let config = config(target, "folder-9", Some("nightly-report"));

    let mut store = MockRemoteStore::new();
    let names: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let names_in_mock = Arc::clone(&names);
    store
        .expect_create_file()
        .times(1)
        .returning(move |req: NewRemoteFile<'_>| {
            names_in_mock
                .lock()
                .unwrap()
                .push(req.display_name.to_string());
            Ok(RemoteFile {
                id: "file-3".to_string(),
            })
        });
    store
        .expect_list_permissions()
        .returning(|_| Ok(PermissionList::default()));

    let report = deliver(&config, &store).await.expect("delivery succeeds");
    assert_eq!(report.display_name, "nightly-report");
    assert_eq!(names.lock().unwrap().as_slice(), ["nightly-report"]);
}

#[tokio::test]
async fn name_override_places_and_names_the_directory_archive() {
    let root = tempdir().unwrap();
    let target = root.path().join("dist");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("app.bin"), b"binary").unwrap();

    let name = format!("{}/bundle", root.path().display());
    let config = config(target, "folder-77", Some(&name));

    let mut store = MockRemoteStore::new();
    let names: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let names_in_mock = Arc::clone(&names);
    store
        .expect_create_file()
        .times(1)
        .returning(move |req: NewRemoteFile<'_>| {
            names_in_mock
                .lock()
                .unwrap()
                .push(req.display_name.to_string());
            Ok(RemoteFile {
                id: "file-4".to_string(),
            })
        });
    store
        .expect_list_permissions()
        .returning(|_| Ok(PermissionList::default()));

    let report = deliver(&config, &store).await.expect("delivery succeeds");

    // The override decides where the archive lands; the display name is the
    // final segment, not the whole override path.
    assert!(root.path().join("bundle.zip").is_file());
    assert_eq!(report.display_name, "bundle.zip");
    assert_eq!(names.lock().unwrap().as_slice(), ["bundle.zip"]);
}

#[tokio::test]
async fn zip_failure_skips_the_upload_entirely() {
    let root = tempdir().unwrap();
    let target = root.path().join("dist");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("app.bin"), b"binary").unwrap();

    // Pointing the archive into a directory that does not exist makes the
    // writer fail before any upload can happen.
    let name = format!("{}/no-such-dir/bundle", root.path().display());
    let config = config(target, "folder-77", Some(&name));

    let mut store = MockRemoteStore::new();
    store.expect_create_file().never();
    store.expect_list_permissions().never();

    let err = deliver(&config, &store).await.expect_err("delivery fails");
    match &err {
        DeliveryError::Archive(_) => {}
        other => panic!("expected Archive error, got {other:?}"),
    }
    assert!(err.to_string().contains("zip failed"));
}

#[tokio::test]
async fn missing_target_fails_before_any_store_call() {
    let root = tempdir().unwrap();
    let config = config(root.path().join("nowhere"), "folder-1", None);

    let mut store = MockRemoteStore::new();
    store.expect_create_file().never();
    store.expect_list_permissions().never();

    let err = deliver(&config, &store).await.expect_err("delivery fails");
    match &err {
        DeliveryError::Target { path, .. } => {
            assert_eq!(path, &root.path().join("nowhere"));
        }
        other => panic!("expected Target error, got {other:?}"),
    }
    assert!(err.to_string().contains("cannot read target"));
}

#[tokio::test]
async fn upload_error_propagates_and_skips_permissions() {
    let root = tempdir().unwrap();
    let target = root.path().join("artifact.txt");
    fs::write(&target, b"abc").unwrap();

    let config = config(target, "folder-1", None);

    let mut store = MockRemoteStore::new();
    store
        .expect_create_file()
        .times(1)
        .returning(|_| Err(StoreError::from("quota exceeded for folder")));
    store.expect_list_permissions().never();

    let err = deliver(&config, &store).await.expect_err("delivery fails");
    match &err {
        DeliveryError::Upload(_) => {}
        other => panic!("expected Upload error, got {other:?}"),
    }
    assert!(
        err.to_string().contains("quota exceeded for folder"),
        "the store's message survives: {err}"
    );
}

#[tokio::test]
async fn permissions_failure_does_not_fail_the_delivery() {
    let root = tempdir().unwrap();
    let target = root.path().join("artifact.txt");
    fs::write(&target, b"abc").unwrap();

    let config = config(target, "folder-55", None);

    let mut store = MockRemoteStore::new();
    store.expect_create_file().times(1).returning(|_| {
        Ok(RemoteFile {
            id: "file-9".to_string(),
        })
    });
    store
        .expect_list_permissions()
        .times(1)
        .returning(|_| Err(StoreError::from("permissions endpoint down")));

    let report = deliver(&config, &store)
        .await
        .expect("the artifact is already delivered, so the run still succeeds");
    assert_eq!(report.file_id, "file-9");
    assert_eq!(report.link, folder_link("folder-55"));
}

#[test]
fn folder_link_is_formed_from_the_folder_id() {
    assert_eq!(
        folder_link("1A2b3C"),
        "https://drive.google.com/drive/folders/1A2b3C"
    );
    assert_eq!(
        folder_link("0AbCdEfGhIjKlMnOpQ"),
        "https://drive.google.com/drive/folders/0AbCdEfGhIjKlMnOpQ"
    );
}
