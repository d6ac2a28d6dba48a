//! Business logic services.

pub mod insights;
pub mod kpi;
pub mod normalizer;
pub mod report;
pub mod upload;
