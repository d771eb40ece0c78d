//! Transport-layer types shared between the compute crate and the API
//! surface. The report shapes live here so handlers can serialize compute
//! results without duplicating them.

mod report;

pub use report::{DateRange, FinanceReport, LedgerEntryDto, ReportRange, ReportTotals};
