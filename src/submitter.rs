use super::*;

/// Drains the found block queue, submitting each block to the daemon. After
/// a block is accepted the generator is asked for a fresh template so the
/// next round starts without waiting for the poll. Blocks already queued
/// when `cancel` fires are still submitted.
pub fn spawn_submitter(
    manager: Arc<JobManager>,
    cancel: CancellationToken,
    tasks: &mut JoinSet<()>,
) -> Result {
    let mut blocks = manager
        .take_found_blocks()
        .ok_or_else(|| anyhow!("block submitter is already running"))?;

    tasks.spawn(async move {
        loop {
            let block = tokio::select! {
                _ = cancel.cancelled() => break,
                block = blocks.recv() => block,
            };

            match block {
                Some(block) => submit(&manager, &block).await,
                None => break,
            }
        }

        while let Ok(block) = blocks.try_recv() {
            submit(&manager, &block).await;
        }

        info!("Shutting down block submitter");
    });

    Ok(())
}

async fn submit(manager: &JobManager, block: &FoundBlock) {
    let record = &block.record;
    let block_hash = record.block_hash.as_deref().unwrap_or("unknown");

    match manager.daemon().submit_block(&block.block_hex).await {
        Ok(()) => {
            manager.log(
                LogLevel::Special,
                format!(
                    "Submitted block {block_hash} at height {} found by {}",
                    record.height.unwrap_or_default(),
                    record.worker
                ),
            );
            manager.request_refresh();
        }
        Err(err) => manager.log(
            LogLevel::Error,
            format!("Daemon rejected block {block_hash}: {err}"),
        ),
    }
}
