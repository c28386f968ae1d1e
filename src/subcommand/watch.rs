use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Watch {
    #[arg(long, help = "Exit after printing <COUNT> jobs.")]
    count: Option<usize>,
}

impl Watch {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let manager = build_manager(&settings)?;
        let mut tasks = JoinSet::new();

        manager.spawn_daemon_monitor(cancel_token.clone(), &mut tasks);
        manager.daemon().init().await?;

        let mut events = manager.subscribe();

        generator::spawn_generator(manager.clone(), &settings, cancel_token.clone(), &mut tasks)
            .await?;
        submitter::spawn_submitter(manager.clone(), cancel_token.clone(), &mut tasks)?;

        let mut printed = 0;

        loop {
            let event = tokio::select! {
                _ = cancel_token.cancelled() => break,
                event = events.recv() => event,
            };

            let summary = match event {
                Ok(JobEvent::NewBlock(job)) => JobSummary::new(&job, true),
                Ok(JobEvent::UpdatedBlock { job, clean_jobs }) => JobSummary::new(&job, clean_jobs),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Skipped {skipped} job events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            println!("{}", serde_json::to_string(&summary)?);

            printed += 1;
            if self.count.is_some_and(|count| printed >= count) {
                break;
            }
        }

        cancel_token.cancel();
        while tasks.join_next().await.is_some() {}

        Ok(())
    }
}
