use crate::*;
use sharestore::error::{Error, Result};
use sharestore::storage::{
    CreateDirOptions, DeleteOptions, ObjectMode, StatOptions, Storage, WriteOptions,
};

pub fn tests(client: &TestStorage, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_delete_single_file,
        test_delete_non_existent_file,
        test_delete_non_existent_directory,
        test_delete_empty_directory,
        test_delete_file_with_dir_hint_keeps_file,
        test_delete_dir_without_hint_keeps_dir,
        test_delete_missing_is_normalized,
        test_delete_non_empty_directory_fails
    ));
}

async fn test_delete_single_file(client: TestStorage) -> Result<()> {
    let (path, content, size) = TEST_FIXTURE.new_file();
    client
        .write(&path, &content[..], size as u64, &WriteOptions::default())
        .await?;

    client.delete(&path, &DeleteOptions::default()).await?;

    let err = client
        .stat(&path, &StatOptions::default())
        .await
        .expect_err("file should be deleted");
    assert!(err.is_not_found(), "Error should be NotFound: {err}");
    Ok(())
}

async fn test_delete_non_existent_file(client: TestStorage) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path();

    // Deleting a non-existent file should not return an error.
    client.delete(&path, &DeleteOptions::default()).await?;
    client.delete(&path, &DeleteOptions::default()).await?;
    Ok(())
}

async fn test_delete_non_existent_directory(client: TestStorage) -> Result<()> {
    let path = TEST_FIXTURE.new_dir_path();
    let opt = DeleteOptions::default().with_object_mode(ObjectMode::DIR);

    client.delete(&path, &opt).await?;
    Ok(())
}

async fn test_delete_empty_directory(client: TestStorage) -> Result<()> {
    let path = TEST_FIXTURE.new_dir_path();
    client.create_dir(&path, &CreateDirOptions::default()).await?;

    let opt = DeleteOptions::default().with_object_mode(ObjectMode::DIR);
    client.delete(&path, &opt).await?;

    let err = client
        .stat(&path, &StatOptions::default().with_object_mode(ObjectMode::DIR))
        .await
        .expect_err("directory should be deleted");
    assert!(err.is_not_found(), "Error should be NotFound: {err}");
    Ok(())
}

async fn test_delete_file_with_dir_hint_keeps_file(client: TestStorage) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path();
    client
        .write(&path, &b"keep"[..], 4, &WriteOptions::default())
        .await?;

    // There is no directory at this path, so nothing is deleted.
    let opt = DeleteOptions::default().with_object_mode(ObjectMode::DIR);
    client.delete(&path, &opt).await?;

    let meta = client.stat(&path, &StatOptions::default()).await?;
    assert_eq!(meta.content_length(), Some(4));
    Ok(())
}

async fn test_delete_dir_without_hint_keeps_dir(client: TestStorage) -> Result<()> {
    let path = TEST_FIXTURE.new_dir_path();
    client.create_dir(&path, &CreateDirOptions::default()).await?;

    // Without the hint the path names a file, and there is none.
    client.delete(&path, &DeleteOptions::default()).await?;

    let opt = StatOptions::default().with_object_mode(ObjectMode::DIR);
    let meta = client.stat(&path, &opt).await?;
    assert!(meta.mode.is_dir());
    Ok(())
}

async fn test_delete_missing_is_normalized(_client: TestStorage) -> Result<()> {
    let share = MockShare::new();
    let storage = Storage::new(share.clone(), "/work/");

    storage.delete("nope", &DeleteOptions::default()).await?;
    storage
        .delete(
            "nope-dir",
            &DeleteOptions::default().with_object_mode(ObjectMode::DIR),
        )
        .await?;

    // The backend did report not-found; the storage layer absorbed it.
    assert_eq!(
        share.calls(),
        vec![
            "delete_file:work/nope".to_string(),
            "delete_directory:work/nope-dir".to_string()
        ]
    );

    share.add_file("work/f", b"data");
    storage.delete("f", &DeleteOptions::default()).await?;
    assert!(!share.has_file("work/f"));
    Ok(())
}

async fn test_delete_non_empty_directory_fails(_client: TestStorage) -> Result<()> {
    let share = MockShare::new();
    let storage = Storage::new(share.clone(), "/");
    share.add_dir("d");
    share.add_file("d/f", b"x");

    let err = storage
        .delete("d", &DeleteOptions::default().with_object_mode(ObjectMode::DIR))
        .await
        .expect_err("non-empty directory delete must fail");

    assert!(!err.is_not_found());
    assert!(matches!(err, Error::Backend { .. }), "unexpected error: {err}");
    assert!(share.has_dir("d"));
    Ok(())
}
