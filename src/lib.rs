//! Japanese era (元号) dates to proleptic Gregorian dates.
//!
//! An [`EraRegistry`] holds, for every era, the Gregorian date on which each
//! lunisolar month began. [`parse_era_date`] reads expressions such as
//! "令和2年5月1日" or "文政13年閏3月1日" against it and [`resolve`] turns them
//! into `[year, month, day]` triples. The registry itself is generated by
//! [`build_registry`] from tables scraped off the era pages.

pub mod builder;
pub mod calendar;
pub mod numerals;
pub mod overrides;
pub mod parser;
pub mod registry;
pub mod source;

pub use builder::{BuildIssue, BuildReport, Diagnostic, Severity, build_registry};
pub use calendar::{era_date_to_gregorian, julian_to_gregorian, resolve};
pub use gengou_types::{DateArray, EraInfo, EraTable, Months, calendar_order};
pub use numerals::parse_number;
pub use parser::{ParsedEraDate, format_era_date, parse_era_date};
pub use registry::EraRegistry;
pub use source::{SourceError, SourceSet, load_sources};
