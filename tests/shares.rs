use super::*;

async fn started(mock: &MockDaemon, is_share: bool, is_block: bool) -> Arc<JobManager> {
    let manager = manager(&settings(mock), is_share, is_block);
    let template = manager.daemon().get_block_template().await.unwrap();

    assert!(manager.process_template(template).unwrap());

    manager
}

#[tokio::test]
async fn accepted_share_is_recorded() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(500, PREVIOUS_BLOCK_HASH))
        .await;

    let manager = started(&mock, true, false).await;
    let mut events = manager.subscribe();

    let accepted = manager.process_share(&submission(&manager)).unwrap();
    pretty_assert_eq!(accepted, Accepted { block_hash: None });

    match events.recv().await.unwrap() {
        JobEvent::Share { record, block_hex } => {
            assert!(record.is_accepted());
            pretty_assert_eq!(record.height, Some(500));
            pretty_assert_eq!(record.worker, "RMiner.rig");
            pretty_assert_eq!(record.port, Some(41000));
            pretty_assert_eq!(block_hex, None);
        }
        event => panic!("unexpected event {event:?}"),
    }
}

#[tokio::test]
async fn share_for_replaced_round_is_rejected() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(500, PREVIOUS_BLOCK_HASH))
        .await;

    let manager = started(&mock, true, false).await;
    let share = submission(&manager);

    let next = serde_json::from_value(template(501, NEXT_BLOCK_HASH)).unwrap();
    assert!(manager.process_template(next).unwrap());

    pretty_assert_eq!(
        manager.process_share(&share).unwrap_err(),
        StratumError::JobNotFound
    );
}

#[tokio::test]
async fn duplicate_share_is_rejected() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(500, PREVIOUS_BLOCK_HASH))
        .await;

    let manager = started(&mock, true, false).await;
    let share = submission(&manager);

    manager.process_share(&share).unwrap();

    let upper = ShareSubmission {
        nonce: share.nonce.to_uppercase(),
        ..share
    };

    pretty_assert_eq!(
        manager.process_share(&upper).unwrap_err(),
        StratumError::Duplicate
    );
}

#[tokio::test]
async fn block_is_submitted_to_daemon() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(500, PREVIOUS_BLOCK_HASH))
        .await;
    let submitblock = mock.respond("submitblock", Value::Null).await;

    let manager = started(&mock, true, true).await;
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    spawn_submitter(manager.clone(), cancel.clone(), &mut tasks).unwrap();

    let accepted = manager.process_share(&submission(&manager)).unwrap();
    pretty_assert_eq!(accepted.block_hash, Some(hex::encode([0x11; 32])));

    timeout(WAIT, async {
        while submitblock.hits_async().await == 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    pretty_assert_eq!(submitblock.hits_async().await, 1);

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
}

#[tokio::test]
async fn block_is_submitted_despite_share_burst() {
    let mock = MockDaemon::start().await;
    mock.respond("getblocktemplate", template(500, PREVIOUS_BLOCK_HASH))
        .await;
    let submitblock = mock.respond("submitblock", Value::Null).await;

    let manager = started(&mock, true, true).await;
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    spawn_submitter(manager.clone(), cancel.clone(), &mut tasks).unwrap();

    let block_share = submission(&manager);
    manager.process_share(&block_share).unwrap();

    for _ in 0..20_000 {
        let unknown = ShareSubmission {
            job_id: "nope".into(),
            ..block_share.clone()
        };
        pretty_assert_eq!(
            manager.process_share(&unknown).unwrap_err(),
            StratumError::JobNotFound
        );
    }

    timeout(WAIT, async {
        while submitblock.hits_async().await == 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    pretty_assert_eq!(submitblock.hits_async().await, 1);

    cancel.cancel();
    while tasks.join_next().await.is_some() {}
}

#[tokio::test]
async fn second_submitter_is_refused() {
    let mock = MockDaemon::start().await;
    let manager = manager(&settings(&mock), true, true);
    let mut tasks = JoinSet::new();

    spawn_submitter(manager.clone(), CancellationToken::new(), &mut tasks).unwrap();
    assert!(spawn_submitter(manager, CancellationToken::new(), &mut tasks).is_err());

    tasks.abort_all();
}
