//! Generation engine for salesgen.
//!
//! Builds the product catalog, maintains the customer pool, samples prior
//! customers for continuity and synthesizes sales into an [`Emitter`].

pub mod catalog;
pub mod config;
pub mod continuity;
pub mod email;
pub mod emitter;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod locales;
pub mod model;
pub mod output;
pub mod pool;
pub mod profiles;
pub mod rng;
pub mod synthesizer;
pub mod timeline;

pub use catalog::{Catalog, build_catalog};
pub use config::{GenerationConfig, Taxonomy};
pub use continuity::{ContinuityStatus, PriorCustomers};
pub use emitter::{Emitter, MemoryEmitter};
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::{EmitterError, GenerationError};
pub use identity::{IdentityGenerator, IdentityPolicy};
pub use model::{GenerateOptions, GenerationReport};
pub use output::{CsvEmitter, DatasetStore};
pub use synthesizer::{Dataset, SaleSynthesizer, generate_into, synthesize};
pub use timeline::TimestampMode;
