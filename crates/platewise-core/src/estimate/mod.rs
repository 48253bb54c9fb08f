//! Multi-model score aggregation.
//!
//! - **scoreboard**: weighted max-merge of labels, ranking and headline
//! - **estimator**: runs the loaded models over one image
//! - **shared**: one estimator per process, built on first use

pub mod estimator;
pub mod scoreboard;
pub mod shared;

pub use estimator::{EstimateInput, Estimator};
pub use scoreboard::{headline, LabelSource, ScoreBoard};
pub use shared::{ConfigFactory, EstimatorFactory, SharedEstimator};
