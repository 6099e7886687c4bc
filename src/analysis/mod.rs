//! Anomaly analysis for network monitor samples.
//!
//! Statistics per metric, threshold-based classification of individual
//! samples, and reduction of the result to a single severity score.

mod anomaly;
mod export;
mod outlier;
mod score;
mod thresholds;

pub use anomaly::*;
pub use export::*;
pub use outlier::*;
pub use score::*;
pub use thresholds::*;
