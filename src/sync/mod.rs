//! Sync Pipeline
//!
//! fetch landing page → locate main bundle → fetch → locate spec bundle →
//! fetch → extract in the sandbox → match → sanitize, diff and persist.
//!
//! Stages run strictly in sequence and the first error aborts the run. Targets
//! persisted before a later failure stay persisted.

pub mod report;

pub use report::RunReport;

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::error::{DiscoveryError, SyncError, SyncResult};
use crate::sandbox::{QuickJsSandbox, Sandbox, SandboxLimits};
use crate::source::{resolve, BundleLocator, Changelog, DiffServiceClient, Fetch, HttpFetcher};
use crate::spec::{match_documents, Sanitizer, SpecExtractor};
use crate::store::{ResultWriter, RunManifest, TargetStore};

pub struct SyncPipeline<F, S, D> {
    source_url: String,
    fetcher: F,
    extractor: Arc<SpecExtractor<S>>,
    changelog: D,
    locator: BundleLocator,
    targets: TargetStore,
    writer: ResultWriter,
    sanitizer: Sanitizer,
}

impl SyncPipeline<HttpFetcher, QuickJsSandbox, DiffServiceClient> {
    /// Pipeline wired to the real site, QuickJS and the diff service.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let sandbox = QuickJsSandbox::new(SandboxLimits {
            budget: config.sandbox_timeout,
            memory_bytes: config.sandbox_memory_bytes,
            ..SandboxLimits::default()
        });
        let client_error = |e: reqwest::Error| SyncError::Config(format!("HTTP client: {e}"));
        let fetcher = HttpFetcher::new(config.http_timeout).map_err(client_error)?;
        let changelog =
            DiffServiceClient::new(&config.diff_url, config.http_timeout).map_err(client_error)?;
        Self::new(config, fetcher, sandbox, changelog)
    }
}

impl<F, S, D> SyncPipeline<F, S, D>
where
    F: Fetch,
    S: Sandbox + 'static,
    D: Changelog,
{
    pub fn new(config: &SyncConfig, fetcher: F, sandbox: S, changelog: D) -> SyncResult<Self> {
        let locator = BundleLocator::new(&config.main_bundle, &config.data_bundle)
            .map_err(|e| SyncError::Config(format!("invalid bundle pattern: {e}")))?;

        Ok(Self {
            source_url: config.source_url.clone(),
            fetcher,
            extractor: Arc::new(SpecExtractor::new(sandbox)),
            changelog,
            locator,
            targets: TargetStore::new(&config.target_dir),
            writer: ResultWriter::new(&config.result_dir, &config.cache_dir),
            sanitizer: Sanitizer::new(),
        })
    }

    pub async fn run(&self) -> SyncResult<RunReport> {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id)
            .instrument(info_span!("sync", %run_id))
            .await
    }

    async fn run_inner(&self, run_id: Uuid) -> SyncResult<RunReport> {
        let started_at = Utc::now();
        let targets = self.targets.load().await?;
        info!("Tracking {} specification files in {}", targets.len(), self.targets.dir().display());

        let discovery = |url: &str| {
            let url = url.to_string();
            move |source: DiscoveryError| SyncError::Discovery { url, source }
        };

        let landing = self.fetcher.fetch_text(&self.source_url).await?;
        let main_path = self
            .locator
            .locate_main_bundle(&landing)
            .map_err(discovery(&self.source_url))?;
        let main_url = resolve(&self.source_url, &main_path).map_err(discovery(&self.source_url))?;
        info!("Main bundle: {}", main_url);

        let main_source = self.fetcher.fetch_text(&main_url).await?;
        let data_path = self
            .locator
            .locate_data_bundle(&main_source)
            .map_err(discovery(&main_url))?;
        let data_url = resolve(&self.source_url, &data_path).map_err(discovery(&main_url))?;
        info!("Spec bundle: {}", data_url);

        let data_source = self.fetcher.fetch_text(&data_url).await?;

        let manifest = RunManifest {
            run_id,
            started_at,
            landing_url: self.source_url.clone(),
            main_bundle_url: main_url,
            data_bundle_url: data_url.clone(),
        };
        let bundle_name = data_path.rsplit('/').next().unwrap_or("bundle.js");
        self.writer.prepare(&manifest, bundle_name, &data_source).await?;

        let discovered = Arc::clone(&self.extractor)
            .extract_blocking(data_source)
            .await
            .map_err(|source| SyncError::Extraction {
                url: data_url.clone(),
                source,
            })?;

        let outcome = match_documents(&targets, &discovered);
        for missing in &outcome.unmatched_expected {
            warn!("No document found for {} (\"{}\")", missing.file_name, missing.title);
        }
        for dup in &outcome.duplicated_discovered {
            warn!("{} documents titled \"{}\"", dup.count, dup.title);
        }

        for m in &outcome.matches {
            let target = &targets[m.expected];
            let current = self.sanitizer.sanitized(&target.current);
            let recovered = self.sanitizer.sanitized(&discovered[m.discovered].document);

            let changelog = self
                .changelog
                .changelog(&current, &recovered)
                .await
                .map_err(|source| SyncError::DiffService {
                    file_name: target.file_name.clone(),
                    source,
                })?;

            self.writer.persist(target, &recovered, &changelog).await?;
        }

        info!(
            "Synced {} of {} targets from {} documents",
            outcome.matches.len(),
            targets.len(),
            discovered.len()
        );
        Ok(RunReport::new(&manifest, &targets, &discovered, outcome))
    }
}
