//! Redis/Queue integration tests.

/// Test Redis connection and basic operations.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_connection() {
    dotenvy::dotenv().ok();

    let queue = pixtier_queue::JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    // Test queue length (should not error)
    let len = queue.len().await.expect("Failed to get queue length");
    println!("Queue length: {}", len);
}

/// Test job enqueue and dequeue cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_job_enqueue_dequeue() {
    use pixtier_models::RecordId;
    use pixtier_queue::ResizePhotoJob;

    dotenvy::dotenv().ok();

    let queue = pixtier_queue::JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    // Create a test job with a unique source so the dedup key never collides
    let record_id = RecordId::from(format!("it-{}", uuid::Uuid::new_v4()));
    let job = ResizePhotoJob::new(record_id.clone(), format!("uploads/{}.jpeg", record_id));
    let job_id = job.job_id.clone();

    // Enqueue
    let message_id = queue.enqueue(job.clone()).await.expect("Failed to enqueue");
    println!("Enqueued job {} with message ID {}", job_id, message_id);

    // Consume
    let consumer_name = "test-consumer";
    let jobs = queue
        .consume(consumer_name, 1000, 1)
        .await
        .expect("Failed to consume");

    assert_eq!(jobs.len(), 1);
    let (msg_id, consumed_job) = &jobs[0];
    assert_eq!(consumed_job.record_id, record_id);

    // Acknowledge and clean up
    queue.ack(msg_id).await.expect("Failed to ack");
    queue.clear_dedup(&job).await.expect("Failed to clear dedup");
    println!("Job {} acknowledged", job_id);
}

/// Test duplicate rejection via idempotency key.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_duplicate_enqueue_rejected() {
    use pixtier_models::RecordId;
    use pixtier_queue::ResizePhotoJob;

    dotenvy::dotenv().ok();

    let queue = pixtier_queue::JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let record_id = RecordId::from(format!("it-dup-{}", uuid::Uuid::new_v4()));
    let job = ResizePhotoJob::new(record_id, "uploads/dup.jpeg");

    queue.enqueue(job.clone()).await.expect("First enqueue failed");
    let second = queue.enqueue(job.clone()).await;
    assert!(second.is_err(), "Duplicate job should be rejected");

    queue.clear_dedup(&job).await.expect("Failed to clear dedup");
}

/// Test DLQ functionality.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_dlq() {
    use pixtier_models::RecordId;
    use pixtier_queue::ResizePhotoJob;

    dotenvy::dotenv().ok();

    let queue = pixtier_queue::JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let record_id = RecordId::from(format!("it-dlq-{}", uuid::Uuid::new_v4()));
    let job = ResizePhotoJob::new(record_id, format!("uploads/dlq-{}.jpeg", uuid::Uuid::new_v4()));

    let message_id = queue.enqueue(job.clone()).await.expect("Failed to enqueue");

    // Consume it
    let consumer_name = "test-dlq-consumer";
    let jobs = queue
        .consume(consumer_name, 1000, 1)
        .await
        .expect("Failed to consume");
    assert!(!jobs.is_empty());

    // Move to DLQ
    queue
        .dlq(&message_id, &job, "Test error")
        .await
        .expect("Failed to move to DLQ");

    // Check DLQ length increased
    let dlq_len = queue.dlq_len().await.expect("Failed to get DLQ length");
    assert!(dlq_len > 0);
    println!("DLQ length: {}", dlq_len);

    queue.clear_dedup(&job).await.expect("Failed to clear dedup");
}

/// Test retry counter lifecycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_retry_counter() {
    dotenvy::dotenv().ok();

    let queue = pixtier_queue::JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let message_id = format!("test-{}", uuid::Uuid::new_v4());
    assert_eq!(queue.get_retry_count(&message_id).await.unwrap(), 0);
    assert_eq!(queue.increment_retry(&message_id).await.unwrap(), 1);
    assert_eq!(queue.increment_retry(&message_id).await.unwrap(), 2);
    assert_eq!(queue.get_retry_count(&message_id).await.unwrap(), 2);
}
