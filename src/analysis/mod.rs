//! Analysis and result aggregation modules
//!
//! Combines the feature extraction stages into a final beat analysis:
//! - Confidence scoring
//! - Result types
//! - Analysis service (stage ordering, onset/grid policy)
//! - Background worker with timeout

pub mod confidence;
pub mod result;
pub mod service;
pub mod worker;
