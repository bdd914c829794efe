mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use tracing::info;

use digest_backend_demo::{FlakyBackend, Sum32Backend};
use digest_engine::{Blob, DigestBackend, DigestConfig, DigestStream, FeedStatus};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    digest_core::init_tracing();
    let cli = Cli::parse();

    let data = read_input(&cli).await?;

    let digest = if cli.flaky {
        let backend = Arc::new(FlakyBackend::new(
            Sum32Backend,
            cli.flaky_seed,
            cli.flaky_retry_probability,
        ));
        run(backend, data, &cli).await?
    } else {
        run(Arc::new(Sum32Backend), data, &cli).await?
    };

    println!("{}", hex::encode(&digest));
    Ok(())
}

async fn read_input(cli: &Cli) -> anyhow::Result<Vec<u8>> {
    match &cli.input {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

async fn run<B: DigestBackend>(backend: Arc<B>, data: Vec<u8>, cli: &Cli) -> anyhow::Result<Vec<u8>> {
    let (digest_tx, digest_rx) = oneshot::channel();
    let digest_tx = std::sync::Mutex::new(Some(digest_tx));

    let config = DigestConfig {
        on_digest_ready: Arc::new(move |blob: Blob| {
            if let Some(tx) = digest_tx.lock().unwrap().take() {
                let _ = tx.send(blob);
            }
        }),
        on_feed_done: Some(Arc::new(|blob: Blob, status: FeedStatus| {
            info!(bytes = blob.len(), ?status, "chunk done");
        })),
        feed_size: cli.feed_size,
        scheduler_mode: cli.scheduler_mode.into(),
        max_feed_block: None,
        interval_tick: DigestConfig::DEFAULT_INTERVAL_TICK,
    };

    let stream = DigestStream::new(backend, config).context("constructing digest stream")?;

    let chunk_size = cli.chunk_size.max(1) as usize;
    if data.is_empty() {
        stream.feed(Blob::from_vec(Vec::new()), true)?;
    } else {
        let chunks: Vec<&[u8]> = data.chunks(chunk_size).collect();
        let last_index = chunks.len() - 1;
        for (i, chunk) in chunks.into_iter().enumerate() {
            stream.feed(Blob::from_vec(chunk.to_vec()), i == last_index)?;
        }
    }

    let digest = digest_rx.await.context("digest stream ended without a digest")?;
    Ok(digest.as_slice().to_vec())
}
