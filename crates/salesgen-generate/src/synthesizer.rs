//! The sale loop.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use salesgen_core::{Customer, Product, Sale};

use crate::catalog::Catalog;
use crate::config::GenerationConfig;
use crate::continuity::{ContinuityReport, PriorCustomers, sample_prior};
use crate::emitter::{Emitter, MemoryEmitter};
use crate::errors::GenerationError;
use crate::pool::{CustomerPolicy, CustomerPool, PoolStats};
use crate::profiles::{FakerProfiles, ProfileSource};
use crate::rng::{CONTINUITY_STREAM, SALES_STREAM, TIMELINE_STREAM, stage_rng};
use crate::timeline::Timeline;

/// Counts produced by one pass of the sale loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub products: u64,
    pub sales: u64,
    pub customers_preserved: u64,
    pub customers_created: u64,
    pub pool: PoolStats,
}

impl SynthesisSummary {
    pub fn customers_emitted(&self) -> u64 {
        self.customers_preserved + self.customers_created
    }
}

/// Drives products, customers and sales into an emitter.
pub struct SaleSynthesizer<'a> {
    config: &'a GenerationConfig,
    catalog: &'a Catalog,
    policy: CustomerPolicy,
}

impl<'a> SaleSynthesizer<'a> {
    /// Fails with [`GenerationError::Config`] when the config is invalid.
    pub fn new(config: &'a GenerationConfig, catalog: &'a Catalog) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            policy: CustomerPolicy::from_config(config),
        })
    }

    /// Emit the catalog, the preserved customers, then `config.sales` sales.
    ///
    /// New customers are emitted right before the sale that introduces them.
    /// The emitter is flushed once at the end; any emitter error aborts the
    /// loop.
    pub fn run<E: Emitter + ?Sized>(
        &self,
        preserved: Vec<Customer>,
        profiles: &mut dyn ProfileSource,
        emitter: &mut E,
    ) -> Result<SynthesisSummary, GenerationError> {
        let config = self.config;
        let mut timeline = Timeline::plan(
            config.window()?,
            config.timestamps,
            config.sales,
            stage_rng(config.seed, TIMELINE_STREAM),
        )?;
        let mut rng = stage_rng(config.seed, SALES_STREAM);

        for product in self.catalog.iter() {
            emitter.emit_product(product)?;
        }

        let mut pool = CustomerPool::seeded(preserved);
        for customer in pool.customers() {
            emitter.emit_customer(customer)?;
        }

        for sale_id in 1..=config.sales {
            let draw = pool.get_or_create(profiles, &self.policy, &mut rng)?;
            if draw.is_new() {
                emitter.emit_customer(draw.customer)?;
            }
            let customer_id = draw.customer.id.clone();

            let product: &Product = self.catalog.choose(&mut rng);
            let quantity = rng.random_range(config.quantity.min..=config.quantity.max);
            let sale = Sale::new(
                sale_id,
                timeline.next_timestamp(),
                customer_id,
                product,
                quantity,
            );
            emitter.emit_sale(&sale)?;

            if config.progress_every > 0 && sale_id % config.progress_every == 0 {
                debug!(
                    sales = sale_id,
                    total = config.sales,
                    customers = pool.len(),
                    "generation progress"
                );
            }
        }

        emitter.flush()?;

        let stats = pool.stats();
        Ok(SynthesisSummary {
            products: self.catalog.len() as u64,
            sales: config.sales,
            customers_preserved: stats.seeded,
            customers_created: stats.created,
            pool: stats,
        })
    }
}

/// Generate with Faker profiles into `emitter`.
pub fn generate_into<E: Emitter + ?Sized>(
    config: &GenerationConfig,
    catalog: &Catalog,
    preserved: Vec<Customer>,
    emitter: &mut E,
) -> Result<SynthesisSummary, GenerationError> {
    let synthesizer = SaleSynthesizer::new(config, catalog)?;
    let mut profiles = FakerProfiles::new(config.locales.clone());
    synthesizer.run(preserved, &mut profiles, emitter)
}

/// A generated dataset held in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub continuity: ContinuityReport,
    pub summary: SynthesisSummary,
}

/// Run continuity sampling and the sale loop without touching the disk.
pub fn synthesize(
    config: &GenerationConfig,
    catalog: &Catalog,
    prior: PriorCustomers,
) -> Result<Dataset, GenerationError> {
    config.validate()?;
    let mut continuity_rng = stage_rng(config.seed, CONTINUITY_STREAM);
    let continuity = sample_prior(&config.continuity, prior, &mut continuity_rng);

    let mut emitter = MemoryEmitter::new();
    let summary = generate_into(config, catalog, continuity.preserved, &mut emitter)?;

    Ok(Dataset {
        products: emitter.products,
        customers: emitter.customers,
        sales: emitter.sales,
        continuity: continuity.report,
        summary,
    })
}
