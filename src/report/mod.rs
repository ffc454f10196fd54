//! Printable reports

pub mod packlist;

pub use packlist::{PackLine, PackList, PackSection, ReportError, ReportRenderer};
