use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use salesgen_core::DATASET_VERSION;

use crate::catalog::build_catalog;
use crate::config::GenerationConfig;
use crate::continuity::{PriorCustomers, sample_prior};
use crate::errors::GenerationError;
use crate::model::{CustomerReport, GenerateOptions, GenerationReport};
use crate::output::DatasetStore;
use crate::rng::{CONTINUITY_STREAM, stage_rng};
use crate::synthesizer::generate_into;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub dataset_dir: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for writing a dataset to disk.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn store(&self) -> DatasetStore {
        DatasetStore::new(self.options.out_dir.clone())
    }

    /// Generate a dataset into the output directory.
    ///
    /// The config is validated before anything on disk changes. A previous
    /// dataset in the directory is sampled for continuity up front, but it is
    /// only archived once every new row sits in a synced temporary file; a
    /// run that fails earlier leaves it in place.
    pub fn run(&self, config: &GenerationConfig) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        config.validate()?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now();
        let fingerprint = config.fingerprint()?;
        let store = self.store();
        store.ensure_dir()?;

        info!(
            run_id = %run_id,
            sales = config.sales,
            seed = config.seed,
            identity = config.identity.as_str(),
            timestamps = config.timestamps.as_str(),
            out_dir = %store.dir().display(),
            "generation started"
        );

        let prior = if config.continuity.enabled {
            store.load_prior_customers()
        } else {
            PriorCustomers::Absent
        };
        let mut continuity_rng = stage_rng(config.seed, CONTINUITY_STREAM);
        let continuity = sample_prior(&config.continuity, prior, &mut continuity_rng);

        let catalog = build_catalog(&config.taxonomy);
        let mut emitter = match store.create_emitter(config.batch_size) {
            Ok(emitter) => emitter,
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                return Err(err.into());
            }
        };
        let summary = match generate_into(config, &catalog, continuity.preserved, &mut emitter) {
            Ok(summary) => summary,
            Err(err) => {
                emitter.abort();
                warn!(run_id = %run_id, error = %err, "generation failed");
                return Err(err);
            }
        };
        let staged = match emitter.stage() {
            Ok(staged) => staged,
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                return Err(err.into());
            }
        };

        let archived = match store.archive_previous(chrono::Local::now().naive_local()) {
            Ok(archived) => archived,
            Err(err) => {
                staged.discard();
                warn!(run_id = %run_id, error = %err, "archiving previous dataset failed");
                return Err(err);
            }
        };
        for path in &archived {
            info!(path = %path.display(), "previous file archived");
        }
        let output = staged.commit()?;

        let report = GenerationReport {
            run_id: run_id.clone(),
            dataset_version: DATASET_VERSION.to_string(),
            started_at,
            seed: config.seed,
            config_fingerprint: fingerprint,
            identity_policy: config.identity.as_str().to_string(),
            timestamp_mode: config.timestamps.as_str().to_string(),
            sales_requested: config.sales,
            sales_generated: output.sales.rows,
            products: output.products.rows,
            customers: CustomerReport {
                total: output.customers.rows,
                preserved: summary.customers_preserved,
                created: summary.customers_created,
                reuse_draws: summary.pool.reused,
                email_collisions: summary.pool.email_collisions,
                id_collisions: summary.pool.id_collisions,
            },
            continuity: continuity.report,
            archived,
            batches: output.batches,
            bytes_written: output.bytes_written(),
            files: vec![output.products, output.customers, output.sales],
            duration_ms: start.elapsed().as_millis() as u64,
        };
        store.write_report(&report)?;

        info!(
            run_id = %run_id,
            sales = report.sales_generated,
            customers = report.customers.total,
            preserved = report.customers.preserved,
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            dataset_dir: store.dir().to_path_buf(),
            report,
        })
    }
}
