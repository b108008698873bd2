pub mod genome;
pub mod issues;
pub mod scores;
pub mod taxonomy;
pub mod thresholds;
