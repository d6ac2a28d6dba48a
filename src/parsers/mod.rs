//! Upload parsers turning raw file bytes into [`RawRow`](crate::models::sale::RawRow)s.

pub mod sales_csv;

pub use sales_csv::SalesCsvParser;
