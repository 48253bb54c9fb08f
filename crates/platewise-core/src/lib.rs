//! Platewise Core - dish estimation from food photos.
//!
//! Several off-the-shelf vision models vote on what is on the plate. Their
//! free-form labels are folded into a closed vocabulary of dish names, and
//! the weighted votes are merged into a short ranked list with default
//! portion sizes.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Decode → Classifiers + Zero-shot → Normalize → Merge → Rank → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use platewise_core::{Config, EstimateInput, Estimator};
//!
//! #[tokio::main]
//! async fn main() -> platewise_core::Result<()> {
//!     let config = Config::load()?;
//!     let estimator = Estimator::load(&config).await?;
//!
//!     let result = estimator
//!         .estimate_input(EstimateInput::from_path("./lunch.jpg"))
//!         .await?;
//!     println!("{}: {:?}", result.dish_name, result.items);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod estimate;
pub mod models;
pub mod pipeline;
pub mod types;
pub mod vocabulary;

pub use config::Config;
pub use error::{ConfigError, EstimateError, PlatewiseError, Result};
pub use estimate::{EstimateInput, Estimator, SharedEstimator};
pub use models::ModelSet;
pub use types::{DishItem, EstimationResult, Prediction};
pub use vocabulary::normalize_label;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
