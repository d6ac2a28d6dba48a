//! Domain models and DTOs for uploads, KPIs and reports.

pub mod kpi;
pub mod report;
pub mod sale;
