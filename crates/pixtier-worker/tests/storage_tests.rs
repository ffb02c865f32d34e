//! Object storage integration tests.

use std::collections::HashMap;

/// Test upload/download/delete round trip with metadata.
#[tokio::test]
#[ignore = "requires R2 credentials"]
async fn test_object_round_trip() {
    dotenvy::dotenv().ok();

    let client = pixtier_storage::R2Client::from_env()
        .await
        .expect("Failed to create storage client");

    let key = format!("integration/{}.jpeg", uuid::Uuid::new_v4());
    let payload = vec![0xFFu8, 0xD8, 0xFF, 0xE0];

    let mut metadata = HashMap::new();
    metadata.insert("Type".to_string(), "small".to_string());
    metadata.insert("Original".to_string(), "uploads/orig.jpeg".to_string());

    client
        .upload_bytes(payload.clone(), &key, "image/jpeg", &metadata)
        .await
        .expect("Failed to upload");

    assert!(client.object_exists(&key).await.expect("Failed to head"));

    let downloaded = client.download_bytes(&key).await.expect("Failed to download");
    assert_eq!(downloaded, payload);

    client.delete_object(&key).await.expect("Failed to delete");
    assert!(!client.object_exists(&key).await.expect("Failed to head"));
}

/// Test that a missing object reports NotFound.
#[tokio::test]
#[ignore = "requires R2 credentials"]
async fn test_download_missing_object() {
    dotenvy::dotenv().ok();

    let client = pixtier_storage::R2Client::from_env()
        .await
        .expect("Failed to create storage client");

    let key = format!("integration/missing-{}.jpeg", uuid::Uuid::new_v4());
    let err = client
        .download_bytes(&key)
        .await
        .expect_err("Download of missing object should fail");
    assert!(matches!(err, pixtier_storage::StorageError::NotFound(_)));
}

/// Test delete is idempotent.
#[tokio::test]
#[ignore = "requires R2 credentials"]
async fn test_delete_is_idempotent() {
    dotenvy::dotenv().ok();

    let client = pixtier_storage::R2Client::from_env()
        .await
        .expect("Failed to create storage client");

    let key = format!("integration/never-{}.jpeg", uuid::Uuid::new_v4());
    client
        .delete_object(&key)
        .await
        .expect("Delete of missing object should succeed");
}
