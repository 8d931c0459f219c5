//! Rubro Pipeline
//!
//! Classifies the economic activity of entities from their transaction
//! documents using a two-tier LLM pipeline.
//!
//! # Flow
//!
//! For every entity of a batch:
//!
//! 1. **Sample** up to `max_docs` issuer documents ([`sampler`])
//! 2. **Complete** each sampled document concurrently under an inner pool of
//!    `inner_workers` permits, sanitizing every answer ([`sanitize`])
//! 3. **Classify** the surviving completions with one JSON call and extract
//!    the rubros from the answer ([`parser`])
//!
//! Up to `outer_workers` entities run at once; batches are strictly
//! sequential and persisted before the next one starts, so at most
//! `outer_workers × inner_workers` requests are in flight.
//!
//! # Example
//!
//! ```no_run
//! use rubro_llm::{MockProvider, RateLimitedCaller};
//! use rubro_pipeline::{Orchestrator, PipelineConfig};
//! use rubro_store::JsonFileStore;
//! use rubro_domain::RunId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let store = JsonFileStore::open(&config.completion_dir, &config.classification_dir, RunId::new())?;
//! let caller = RateLimitedCaller::new(Arc::new(MockProvider::default()));
//!
//! let mut orchestrator = Orchestrator::new(caller, store, &config)?;
//! let metrics = orchestrator.run(Vec::new(), config.batch_size).await?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod preprocess;
pub mod progress;
pub mod prompt;
pub mod sampler;
pub mod sanitize;
pub mod taxonomy;
pub mod types;
pub mod worker;

pub use config::{PipelineConfig, RunMode};
pub use error::{PipelineError, SamplingError};
pub use input::{build_inputs, load_rut_lists, normalize_ruts, parse_rut_list, Corpus, DeclaredRubros};
pub use metrics::RunMetrics;
pub use orchestrator::Orchestrator;
pub use parser::{extract_object, ClassificationReply};
pub use progress::{Progress, ProgressEvent};
pub use prompt::PromptBuilder;
pub use sampler::{sample, SamplingMethod};
pub use sanitize::sanitize;
pub use taxonomy::Taxonomy;
pub use types::{EntityInput, EntityOutcome, EntityStatus, SampledEntity};
pub use worker::Worker;
