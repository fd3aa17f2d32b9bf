mod seeding {
    use std::time::Duration;

    use torrust_seeder::bootstrap::jobs::{seeding, stats_flush};
    use torrust_seeder::core::supervisor::Outcome;
    use torrust_seeder::shutdown::{Reason, Shutdown};
    use torrust_seeder_primitives::job::{JobId, JobState};
    use torrust_seeder_test_helpers::configuration;

    use crate::common::engine::FakeEngine;
    use crate::common::fixtures;
    use crate::common::http::DescriptorServer;
    use crate::seeder::{Environment, PATIENCE};

    #[tokio::test]
    async fn a_descriptor_url_and_a_magnet_link_should_both_be_seeded_and_their_uploads_persisted() {
        let server = DescriptorServer::start(vec![("debian.torrent", fixtures::descriptor("debian.iso", 4096))]).await;
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![server.url("debian.torrent"), fixtures::magnet_link()]);
        let env = Environment::new(config, FakeEngine::new()).await;
        let shutdown = Shutdown::new();

        let jobs = vec![
            seeding::start_job(&env.seeder, JobId(0), PATIENCE, shutdown.signal()),
            seeding::start_job(&env.seeder, JobId(1), PATIENCE, shutdown.signal()),
        ];

        env.wait_for_state(JobId(0), JobState::Seeding).await;
        env.wait_for_state(JobId(1), JobState::Seeding).await;
        assert_eq!(env.engine.swarm_count(), 2);

        env.upload_from_every_swarm(1000).await;

        let flush = stats_flush::start_job(&env.seeder, Duration::from_millis(50), shutdown.signal());

        env.wait_for_persisted_total(2000).await;

        shutdown.trigger(Reason::Requested);

        for job in jobs {
            assert_eq!(job.await.unwrap(), Outcome::Seeded);
        }
        flush.await.unwrap();
    }

    #[tokio::test]
    async fn a_descriptor_that_can_not_be_downloaded_should_only_fail_its_own_job() {
        let server = DescriptorServer::start(vec![]).await;
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![server.url("missing.torrent"), fixtures::magnet_link()]);
        let env = Environment::new(config, FakeEngine::new()).await;
        let shutdown = Shutdown::new();

        let failing = seeding::start_job(&env.seeder, JobId(0), PATIENCE, shutdown.signal());
        let sibling = seeding::start_job(&env.seeder, JobId(1), PATIENCE, shutdown.signal());

        assert_eq!(failing.await.unwrap(), Outcome::Failed);
        env.wait_for_state(JobId(1), JobState::Seeding).await;

        let failed = env.seeder.registry().get(JobId(0)).await.unwrap();
        assert_eq!(failed.state, JobState::Failed);
        assert!(failed.failure.is_some());
        assert!(!dir.path().join("missing.torrent").exists());

        shutdown.trigger(Reason::Requested);

        assert_eq!(sibling.await.unwrap(), Outcome::Seeded);
    }

    #[tokio::test]
    async fn a_job_should_fail_when_the_metadata_is_not_resolved_in_time() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![fixtures::magnet_link()]);
        let env = Environment::new(config, FakeEngine::without_metadata()).await;
        let shutdown = Shutdown::new();

        let job = seeding::start_job(&env.seeder, JobId(0), Duration::from_millis(100), shutdown.signal());

        assert_eq!(job.await.unwrap(), Outcome::Failed);
        assert_eq!(env.state(JobId(0)).await, JobState::Failed);
        assert!(env.seeder.registry().active_swarms().await.is_empty());
        assert_eq!(env.engine.swarm_count(), 0);
    }

    #[tokio::test]
    async fn the_shutdown_should_cancel_a_job_waiting_for_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![fixtures::magnet_link()]);
        let env = Environment::new(config, FakeEngine::without_metadata()).await;
        let shutdown = Shutdown::new();

        let job = seeding::start_job(&env.seeder, JobId(0), Duration::from_secs(3600), shutdown.signal());

        env.wait_for_state(JobId(0), JobState::AcquiringMetadata).await;
        shutdown.trigger(Reason::Interrupted);

        let outcome = crate::common::within(PATIENCE, "the job is cancelled", job).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Cancelled {
                state: JobState::AcquiringMetadata
            }
        );
    }
}

mod descriptor_cache {
    use std::time::Duration;

    use torrust_seeder::app;
    use torrust_seeder::core::metadata::{Acquirer, Metadata};
    use torrust_seeder::core::source::Source;
    use torrust_seeder::shutdown::{Reason, Shutdown};
    use torrust_seeder_primitives::job::{JobId, JobState};
    use torrust_seeder_test_helpers::configuration;

    use crate::common::engine::FakeEngine;
    use crate::common::fixtures;
    use crate::common::http::DescriptorServer;
    use crate::seeder::{Environment, PATIENCE};

    #[tokio::test]
    async fn the_same_descriptor_url_should_be_downloaded_only_once() {
        let bytes = fixtures::descriptor("debian.iso", 4096);
        let server = DescriptorServer::start(vec![("debian.torrent", bytes.clone())]).await;
        let dir = tempfile::tempdir().unwrap();
        let acquirer = Acquirer::new(dir.path(), Duration::from_secs(5)).unwrap();
        let source: Source = server.url("debian.torrent").parse().unwrap();

        let first = acquirer.acquire(&source).await.unwrap();
        let second = acquirer.acquire(&source).await.unwrap();

        assert_eq!(server.hits(), 1);
        assert_eq!(std::fs::read(dir.path().join("debian.torrent")).unwrap(), bytes);

        match (first, second) {
            (Metadata::Descriptor(first), Metadata::Descriptor(second)) => {
                assert_eq!(first.bytes(), bytes.as_slice());
                assert_eq!(second.bytes(), bytes.as_slice());
            }
            _ => panic!("a descriptor URL should produce a descriptor"),
        }
    }

    #[tokio::test]
    async fn a_restarted_seeder_should_use_the_cached_descriptor() {
        let server = DescriptorServer::start(vec![("debian.torrent", fixtures::descriptor("debian.iso", 4096))]).await;
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![server.url("debian.torrent")]);

        for _run in 0..2 {
            let env = Environment::new(config.clone(), FakeEngine::new()).await;
            let shutdown = Shutdown::new();

            let jobs = app::start(&env.seeder, &shutdown).await;

            env.wait_for_state(JobId(0), JobState::Seeding).await;
            shutdown.trigger(Reason::Requested);

            crate::common::within(PATIENCE, "every job finished", jobs.join()).await;
        }

        assert_eq!(server.hits(), 1);
    }
}

mod stats {
    use torrust_seeder::app;
    use torrust_seeder::core::supervisor::Outcome;
    use torrust_seeder::shutdown::{Reason, Shutdown};
    use torrust_seeder_primitives::job::{JobId, JobState};
    use torrust_seeder_test_helpers::configuration;

    use crate::common::engine::FakeEngine;
    use crate::common::{fixtures, within};
    use crate::seeder::{Environment, PATIENCE};

    #[tokio::test]
    async fn the_upload_total_should_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![fixtures::magnet_link()]);
        std::fs::write(config.seeder.stats_file_path(), "1000").unwrap();

        let env = Environment::new(config, FakeEngine::new()).await;
        assert_eq!(env.seeder.ledger().cumulative_uploaded().await, 1000);

        let shutdown = Shutdown::new();
        let jobs = app::start(&env.seeder, &shutdown).await;

        env.wait_for_state(JobId(0), JobState::Seeding).await;
        env.upload_from_every_swarm(250).await;

        // The flush interval is far away, only the flush done on shutdown runs.
        shutdown.trigger(Reason::Terminated);
        within(PATIENCE, "every job finished", jobs.join()).await;

        assert_eq!(env.seeder.ledger().file().read().await, 1250);
        assert_eq!(std::fs::read_to_string(env.config.seeder.stats_file_path()).unwrap(), "1250");
    }

    #[tokio::test]
    async fn a_missing_or_corrupt_stats_file_should_start_the_total_from_zero() {
        for content in [None, Some("not a number"), Some("")] {
            let dir = tempfile::tempdir().unwrap();
            let config = configuration::ephemeral(dir.path(), vec![fixtures::magnet_link()]);
            if let Some(content) = content {
                std::fs::write(config.seeder.stats_file_path(), content).unwrap();
            }

            let env = Environment::new(config, FakeEngine::new()).await;

            assert_eq!(env.seeder.ledger().cumulative_uploaded().await, 0);
            assert_eq!(env.seeder.ledger().file().read().await, 0);
            assert_eq!(env.seeder.ledger().file().read().await, 0);
        }
    }

    #[tokio::test]
    async fn every_job_should_finish_soon_after_the_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![fixtures::magnet_link(), configuration::random_magnet_link()];
        let config = configuration::ephemeral(dir.path(), sources);
        let env = Environment::new(config, FakeEngine::new()).await;
        let shutdown = Shutdown::new();

        let jobs = app::start(&env.seeder, &shutdown).await;

        env.wait_for_state(JobId(0), JobState::Seeding).await;
        env.wait_for_state(JobId(1), JobState::Seeding).await;

        assert!(shutdown.trigger(Reason::Interrupted));
        assert!(!shutdown.trigger(Reason::Terminated));

        let outcomes = within(PATIENCE, "every job finished", jobs.join()).await;

        assert_eq!(outcomes, vec![Outcome::Seeded, Outcome::Seeded]);
        assert_eq!(shutdown.reason(), Some(Reason::Interrupted));
    }
}

mod health {
    use std::time::Duration;

    use torrust_seeder::bootstrap::jobs::{health_monitor, seeding};
    use torrust_seeder::shutdown::{Reason, Shutdown};
    use torrust_seeder_primitives::job::{JobId, JobState};
    use torrust_seeder_test_helpers::configuration;

    use crate::common::engine::FakeEngine;
    use crate::common::{fixtures, within};
    use crate::seeder::{Environment, PATIENCE};

    #[tokio::test]
    async fn the_health_monitor_should_stop_soon_after_the_shutdown_even_when_an_announce_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration::ephemeral(dir.path(), vec![fixtures::magnet_link()]);
        let env = Environment::new(config, FakeEngine::with_stalled_announces()).await;
        let shutdown = Shutdown::new();

        let job = seeding::start_job(&env.seeder, JobId(0), PATIENCE, shutdown.signal());
        env.wait_for_state(JobId(0), JobState::Seeding).await;

        let monitor = health_monitor::start_job(&env.seeder, Duration::from_millis(50), shutdown.signal());

        within(PATIENCE, "a DHT announce has started", async {
            while env.engine.dht_announces() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        shutdown.trigger(Reason::Interrupted);

        within(Duration::from_secs(1), "the health monitor stopped", monitor).await.unwrap();
        within(PATIENCE, "the seeding job finished", job).await.unwrap();
    }
}
