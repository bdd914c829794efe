use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use digest_backend_demo::{FlakyBackend, Sum32Backend};
use digest_engine::{Blob, DigestConfig, DigestStream, EngineError, FeedStatus, SchedulerMode};

type FeedLog = Arc<Mutex<Vec<(Vec<u8>, FeedStatus)>>>;

fn config_with(
    feed_done: FeedLog,
    digest_tx: oneshot::Sender<Blob>,
    scheduler_mode: SchedulerMode,
) -> DigestConfig {
    let digest_tx = Mutex::new(Some(digest_tx));
    DigestConfig {
        on_digest_ready: Arc::new(move |blob: Blob| {
            if let Some(tx) = digest_tx.lock().unwrap().take() {
                let _ = tx.send(blob);
            }
        }),
        on_feed_done: Some(Arc::new(move |blob: Blob, status: FeedStatus| {
            feed_done
                .lock()
                .unwrap()
                .push((blob.as_slice().to_vec(), status));
        })),
        feed_size: None,
        scheduler_mode,
        max_feed_block: None,
        interval_tick: DigestConfig::DEFAULT_INTERVAL_TICK,
    }
}

#[tokio::test]
async fn single_blob_produces_expected_digest() {
    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let config = config_with(feed_done.clone(), tx, SchedulerMode::Interval);
    let stream = DigestStream::new(Arc::new(Sum32Backend), config).unwrap();

    stream
        .feed(Blob::from_vec(vec![0x01, 0x02, 0x03]), true)
        .unwrap();

    let digest = rx.await.unwrap();
    assert_eq!(digest.as_slice(), &[0x06, 0, 0, 0]);
    assert_eq!(
        feed_done.lock().unwrap().as_slice(),
        &[(vec![0x01, 0x02, 0x03], FeedStatus::Ok)]
    );
}

#[tokio::test]
async fn two_chunks_report_in_order_then_combined_digest() {
    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let config = config_with(feed_done.clone(), tx, SchedulerMode::Interval);
    let stream = DigestStream::new(Arc::new(Sum32Backend), config).unwrap();

    stream.feed(Blob::from_vec(vec![1, 2, 3]), false).unwrap();
    stream.feed(Blob::from_vec(vec![4, 5]), true).unwrap();

    let digest = rx.await.unwrap();
    assert_eq!(digest.as_slice(), &15u32.to_le_bytes());

    let done = feed_done.lock().unwrap();
    assert_eq!(done.len(), 2);
    assert_eq!(done[0], (vec![1, 2, 3], FeedStatus::Ok));
    assert_eq!(done[1], (vec![4, 5], FeedStatus::Ok));
}

#[tokio::test]
async fn hundred_single_byte_chunks_accumulate_in_fifo_order() {
    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let config = config_with(feed_done.clone(), tx, SchedulerMode::Blocking);
    let stream = DigestStream::new(Arc::new(Sum32Backend), config).unwrap();

    let mut expected_sum: u32 = 0;
    for i in 0u8..100 {
        expected_sum = expected_sum.wrapping_add(i as u32);
        stream.feed(Blob::from_vec(vec![i]), i == 99).unwrap();
    }

    let digest = rx.await.unwrap();
    assert_eq!(digest.as_slice(), &expected_sum.to_le_bytes());

    let done = feed_done.lock().unwrap();
    assert_eq!(done.len(), 100);
    for (i, (bytes, status)) in done.iter().enumerate() {
        assert_eq!(bytes, &vec![i as u8]);
        assert_eq!(*status, FeedStatus::Ok);
    }
}

#[tokio::test]
async fn large_blob_with_max_feed_block_still_sums_correctly() {
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    let expected: u32 = data.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));

    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let mut config = config_with(feed_done.clone(), tx, SchedulerMode::Interval);
    config.max_feed_block = Some(40_960);
    let stream = DigestStream::new(Arc::new(Sum32Backend), config).unwrap();

    stream.feed(Blob::from_vec(data), true).unwrap();

    let digest = rx.await.unwrap();
    assert_eq!(digest.as_slice(), &expected.to_le_bytes());
    assert_eq!(feed_done.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_before_completion_reports_canceled() {
    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, _rx) = oneshot::channel();
    let config = config_with(feed_done.clone(), tx, SchedulerMode::Interval);
    // retry_probability 1.0: the backend never makes progress, so the blob
    // is guaranteed to still be pending when `delete` runs below.
    let backend = Arc::new(FlakyBackend::new(Sum32Backend, 42, 1.0));
    let stream = DigestStream::new(backend, config).unwrap();

    stream.feed(Blob::from_vec(vec![1, 2, 3]), true).unwrap();
    stream.delete();
    drop(stream);

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        feed_done.lock().unwrap().as_slice(),
        &[(vec![1, 2, 3], FeedStatus::Canceled)]
    );
}

#[tokio::test]
async fn feed_size_ceiling_rejects_second_blob() {
    let feed_done = Arc::new(Mutex::new(Vec::new()));
    let (tx, _rx) = oneshot::channel();
    let mut config = config_with(feed_done, tx, SchedulerMode::Interval);
    config.feed_size = Some(10);
    // retry_probability 1.0 keeps the first blob queued so accumulated_tx
    // deterministically stays at 5 instead of racing the scheduler.
    let backend = Arc::new(FlakyBackend::new(Sum32Backend, 1, 1.0));
    let stream = DigestStream::new(backend, config).unwrap();

    stream.feed(Blob::from_vec(vec![0u8; 5]), false).unwrap();
    let err = stream.feed(Blob::from_vec(vec![0u8; 5]), false);

    assert!(matches!(err, Err(EngineError::NoSpace)));
    assert_eq!(stream.accumulated_tx(), 5);
}
