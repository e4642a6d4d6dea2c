use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{
    io::{self, BufReader},
    task::JoinHandle,
};

use crate::{
    bridge::{outbound_channel, write_outbound, BridgeService},
    cache::ClassificationCache,
    classifier::PredictionClient,
    config::AppConfig,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    monitor::PageMonitor,
    status::StatusReader,
};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PhishWatchApp {
    _paths: ResolvedPaths,
    config: Arc<AppConfig>,
    cache: Arc<ClassificationCache>,
    bridge: BridgeService,
    writer_handle: JoinHandle<Result<()>>,
    shutdown: Shutdown,
}

impl PhishWatchApp {
    pub fn initialize(config: AppConfig, paths: ResolvedPaths, shutdown: Shutdown) -> Result<Self> {
        let config = Arc::new(config);

        let http_client = Client::builder()
            .user_agent(format!("phish-watch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        let classifier = Arc::new(PredictionClient::new(
            http_client,
            config.classifier.clone(),
        ));

        let cache = Arc::new(ClassificationCache::new());
        let (sink, outbound_rx) = outbound_channel();
        let outbound_tx = sink.sender();

        let monitor = Arc::new(PageMonitor::new(
            cache.clone(),
            classifier,
            Arc::new(sink),
            &config.monitor,
        ));
        let bridge = BridgeService::new(monitor, StatusReader::new(cache.clone()), outbound_tx);
        let writer_handle = tokio::spawn(write_outbound(outbound_rx, io::stdout()));

        Ok(Self {
            _paths: paths,
            config,
            cache,
            bridge,
            writer_handle,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let PhishWatchApp {
            _paths: _,
            config,
            cache,
            bridge,
            mut writer_handle,
            shutdown,
        } = self;

        tracing::info!(
            target: "app",
            classifier = %config.classifier.endpoint,
            timeout_ms = config.classifier.timeout.as_millis() as u64,
            dedup_in_flight = config.monitor.dedup_in_flight,
            "phishing monitor started"
        );

        let stdin = BufReader::new(io::stdin());
        if let Err(err) = bridge.run(stdin, shutdown.subscribe()).await {
            tracing::error!(target: "bridge", error = %err, "bridge stopped with an error");
        }
        shutdown.trigger("bridge closed");

        // The writer finishes once in-flight classifications release their senders.
        drop(bridge);
        let drain = tokio::time::sleep(DRAIN_TIMEOUT);
        tokio::pin!(drain);
        tokio::select! {
            res = &mut writer_handle => match res {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(target: "bridge", error = %err, "bridge writer failed");
                }
                Err(err) if err.is_panic() => {
                    tracing::error!(target: "bridge", "bridge writer panicked");
                }
                Err(_) => {}
            },
            _ = &mut drain => {
                tracing::warn!(
                    target: "app",
                    "pending classifications did not finish within {:?}; exiting",
                    DRAIN_TIMEOUT
                );
                writer_handle.abort();
            }
        }

        tracing::info!(target: "app", cached_urls = cache.len(), "phishing monitor stopped");
        Ok(())
    }
}
