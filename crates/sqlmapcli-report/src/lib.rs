//! sqlmapcli Report - typed view of finished scan data.
//!
//! `GET /scan/<taskid>/data` returns a list of content entries. Injection
//! findings arrive as a list of injection points, each holding one detail
//! record per exploited technique; other content types (banner, current
//! user, dumped tables) keep their raw JSON.
//!
//! # Example
//!
//! ```rust
//! use sqlmapcli_report::Report;
//!
//! let data = serde_json::json!([{"status": 1, "type": 2, "value": "MySQL >= 5.0"}]);
//! let report = Report::from_data(&data).expect("valid report");
//! assert!(!report.is_vulnerable());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod injection;
pub mod render;
pub mod report;

// Re-export commonly used types
pub use error::{ReportError, Result};
pub use injection::{InjectionPoint, Technique, TechniqueDetail, Vector};
pub use report::{ContentStatus, Report, ReportEntry, ReportSummary, ReportValue};
