use super::*;

/// Fetches the first template, then polls the daemon every update interval
/// and whenever [`JobManager::request_refresh`] is called, until cancelled.
/// Only this task applies templates, so they are applied one at a time.
pub async fn spawn_generator(
    manager: Arc<JobManager>,
    settings: &Settings,
    cancel: CancellationToken,
    tasks: &mut JoinSet<()>,
) -> Result {
    info!("Spawning generator task");

    let initial = manager
        .daemon()
        .get_block_template()
        .await
        .context("failed to fetch initial block template")?;

    manager.process_template(initial)?;

    let period = settings.update_interval();
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let rebroadcast_timeout = settings.rebroadcast_timeout();

    tasks.spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = manager.refresh_requested() => debug!("Template refresh requested"),
            }

            refresh(&manager, rebroadcast_timeout).await;
        }
        info!("Shutting down generator");
    });

    Ok(())
}

async fn refresh(manager: &JobManager, rebroadcast_timeout: Duration) {
    match manager.daemon().get_block_template().await {
        Ok(template) => {
            if let Err(err) = apply_template(manager, template, rebroadcast_timeout) {
                warn!("Failed to apply block template: {err:#}");
            }
        }
        Err(err) => warn!("Failed to fetch new block template: {err}"),
    }
}

/// Starts a new round for a new previous block hash. On the same previous
/// block hash, replaces the current job if its transactions changed or it is
/// older than `rebroadcast_timeout`.
pub(crate) fn apply_template(
    manager: &JobManager,
    template: BlockTemplate,
    rebroadcast_timeout: Duration,
) -> Result {
    if manager.process_template(template.clone())? {
        return Ok(());
    }

    let Some(current) = manager.current_job() else {
        return Ok(());
    };

    if current.previous_block_hash() != template.previous_block_hash {
        return Ok(());
    }

    if !current.template.same_transactions(&template)
        || current.created.elapsed() >= rebroadcast_timeout
    {
        manager.update_current_job(template)?;
    }

    Ok(())
}
