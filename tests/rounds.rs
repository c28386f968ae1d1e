use super::*;

async fn next_new_block(events: &mut tokio::sync::broadcast::Receiver<JobEvent>) -> u64 {
    timeout(WAIT, async {
        loop {
            if let JobEvent::NewBlock(job) = events.recv().await.unwrap() {
                return job.height();
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn generator_starts_first_round() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(100, PREVIOUS_BLOCK_HASH))
        .await;

    let settings = settings(&mock);
    let manager = manager(&settings, true, false);
    let mut events = manager.subscribe();
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    spawn_generator(manager.clone(), &settings, cancel.clone(), &mut tasks)
        .await
        .unwrap();

    pretty_assert_eq!(next_new_block(&mut events).await, 100);
    pretty_assert_eq!(manager.current_job().unwrap().height(), 100);
    pretty_assert_eq!(manager.valid_job_count(), 1);

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
}

#[tokio::test]
async fn generator_follows_chain_tip() {
    let mock = MockDaemon::start().await;
    let mut getblocktemplate = mock
        .respond("getblocktemplate", template(100, PREVIOUS_BLOCK_HASH))
        .await;

    let settings = settings(&mock);
    let manager = manager(&settings, true, false);
    let mut events = manager.subscribe();
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    spawn_generator(manager.clone(), &settings, cancel.clone(), &mut tasks)
        .await
        .unwrap();

    pretty_assert_eq!(next_new_block(&mut events).await, 100);
    let first = manager.current_job().unwrap();

    getblocktemplate.delete_async().await;
    getblocktemplate = mock
        .respond("getblocktemplate", template(101, NEXT_BLOCK_HASH))
        .await;

    pretty_assert_eq!(next_new_block(&mut events).await, 101);
    pretty_assert_eq!(manager.valid_job_count(), 1);
    assert!(manager.job(first.job_id).is_none());
    assert!(getblocktemplate.hits_async().await >= 1);

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
}

#[tokio::test]
async fn generator_fails_without_template() {
    let mock = MockDaemon::start().await;
    mock.fail("getblocktemplate", -9, "Ravencoin is not connected!")
        .await;

    let settings = settings(&mock);
    let manager = manager(&settings, true, false);
    let mut tasks = JoinSet::new();

    let err = spawn_generator(manager.clone(), &settings, CancellationToken::new(), &mut tasks)
        .await
        .unwrap_err();

    pretty_assert_eq!(err.to_string(), "failed to fetch initial block template");
    assert!(manager.current_job().is_none());
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn accepted_block_refreshes_through_generator() {
    let mock = MockDaemon::start().await;
    let getblocktemplate = mock
        .respond("getblocktemplate", template(100, PREVIOUS_BLOCK_HASH))
        .await;
    let submitblock = mock.respond("submitblock", Value::Null).await;

    let settings = Settings {
        update_interval: Some(3600),
        ..settings(&mock)
    };
    let manager = manager(&settings, true, true);
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    spawn_generator(manager.clone(), &settings, cancel.clone(), &mut tasks)
        .await
        .unwrap();
    spawn_submitter(manager.clone(), cancel.clone(), &mut tasks).unwrap();

    pretty_assert_eq!(getblocktemplate.hits_async().await, 1);

    manager.process_share(&submission(&manager)).unwrap();

    timeout(WAIT, async {
        while getblocktemplate.hits_async().await < 2 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    pretty_assert_eq!(submitblock.hits_async().await, 1);
    pretty_assert_eq!(getblocktemplate.hits_async().await, 2);
    pretty_assert_eq!(manager.valid_job_count(), 1);

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
}
