#![forbid(unsafe_code)]

mod classifier;
mod forest;
mod service;
mod types;

pub use classifier::Classifier;
pub use forest::{TreeEnsemble, TreeNode};
pub use service::PredictionService;
pub use types::{ConfidenceLevel, PredictionResult};
