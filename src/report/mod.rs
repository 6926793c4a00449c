//! Spending reports: expense totals over recent days, weeks or months and
//! their split by category, drawn as charts.

mod buckets;
mod charts;
mod page;

pub use page::get_reports_page;
