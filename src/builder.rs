//! Registry construction from reduced source tables.
//!
//! Runs in three passes so that every lookup only sees finished data:
//!   1. each era's own conversion table (Julian rows converted, checked
//!      against Gregorian rows);
//!   2. Southern Court alias tables, resolved against the pass-1 registry and
//!      sharing its month maps;
//!   3. start/end dates, parsed against the registry holding every table.
//!
//! Problems are collected as [`Diagnostic`]s and logged; a bad era never
//! stops the build.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use gengou_types::{DateArray, EraInfo, EraTable, Months};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::calendar::{era_date_to_gregorian, julian_to_gregorian};
use crate::overrides::{
    self, GREGORIAN_LABEL, JULIAN_LABEL, NORTHERN_COURT_LABEL, WESTERN_LABEL,
};
use crate::parser::parse_era_date;
use crate::registry::EraRegistry;
use crate::source::{
    DateCell, EraPage, SourceSet, TableRow, alias_heading_year, before_paren, clean_alias_cell,
    heading_number, parse_date_cell, row_label,
};

// ── Diagnostics ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Data was suspicious but the entry was still built.
    Warning,
    /// Part of the entry is missing.
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildIssue {
    #[error("could not find readings")]
    MissingReadings,

    #[error("no source page")]
    MissingPage,

    #[error("start date not found")]
    MissingStart,

    #[error("end date not found")]
    MissingEnd,

    #[error("could not convert era date string: {0}")]
    UnresolvedDate(String),

    #[error("conversion table not found")]
    MissingConversionTable,

    #[error("alias table not found")]
    MissingAliasTable,

    #[error("alias cell {0:?} does not name a built era year")]
    UnresolvedAlias(String),

    #[error("year heading {0} is not a year number")]
    BadYearHeading(i32),

    #[error("no dates found in a row of year {0}")]
    NoDates(u32),

    #[error("converted dates are not the same for year {year}: gregorian {gregorian:?}, julian {julian:?}")]
    CalendarMismatch {
        year: u32,
        gregorian: Months,
        julian: Months,
    },
}

impl BuildIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedAlias(_)
            | Self::BadYearHeading(_)
            | Self::NoDates(_)
            | Self::CalendarMismatch { .. } => Severity::Warning,
            _ => Severity::Incomplete,
        }
    }
}

/// One problem found while building one era.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub era: String,
    pub issue: BuildIssue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.era, self.issue)
    }
}

/// The finished registry plus everything worth telling the operator.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub registry: EraRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.issue.severity() == Severity::Warning)
    }

    /// Eras with at least one [`Severity::Incomplete`] problem, in table order.
    pub fn incomplete_eras(&self) -> Vec<&str> {
        let incomplete: HashSet<&str> = self
            .diagnostics
            .iter()
            .filter(|d| d.issue.severity() == Severity::Incomplete)
            .map(|d| d.era.as_str())
            .collect();
        self.registry
            .iter()
            .map(|(name, _)| name)
            .filter(|name| incomplete.contains(name))
            .collect()
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Build the registry for `sources.eras`, in that order.
pub fn build_registry(sources: &SourceSet) -> BuildReport {
    Builder {
        sources,
        diagnostics: Vec::new(),
    }
    .run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Calendar {
    Gregorian,
    Julian,
}

struct Builder<'a> {
    sources: &'a SourceSet,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Builder<'a> {
    fn report(&mut self, era: &str, issue: BuildIssue) {
        match issue.severity() {
            Severity::Warning => warn!(era, "{issue}"),
            Severity::Incomplete => error!(era, "{issue}"),
        }
        self.diagnostics.push(Diagnostic {
            era: era.to_string(),
            issue,
        });
    }

    fn run(mut self) -> BuildReport {
        let sources = self.sources;
        let mut table = EraTable::new();
        let mut buildable: Vec<(&'a str, &'a EraPage)> = Vec::new();
        let mut seen = HashSet::new();

        for era in &sources.eras {
            if !seen.insert(era.as_str()) {
                continue;
            }
            let Some(readings) = sources.readings(era) else {
                self.report(era, BuildIssue::MissingReadings);
                table.insert(era.clone(), EraInfo::default());
                continue;
            };
            table.insert(
                era.clone(),
                EraInfo {
                    reading: Some(readings.reading.clone()),
                    yomi: Some(readings.yomi.clone()),
                    ..EraInfo::default()
                },
            );
            match sources.page(era) {
                Some(page) => buildable.push((era.as_str(), page)),
                None => self.report(era, BuildIssue::MissingPage),
            }
        }

        // Pass 1: eras with a conversion table of their own.
        for &(era, page) in &buildable {
            if overrides::uses_alias_table(era) {
                continue;
            }
            let Some(rows) = &page.conversion_table else {
                self.report(era, BuildIssue::MissingConversionTable);
                continue;
            };
            let years = self.conversion_years(era, rows);
            debug!(era, years = years.len(), "built conversion table");
            if let Some(info) = table.get_mut(era) {
                info.years = years;
            }
        }
        let base = EraRegistry::new(table);

        // Pass 2: alias eras, against the finished pass-1 tables only.
        let mut table = base.table().clone();
        for &(era, page) in &buildable {
            if !overrides::uses_alias_table(era) {
                continue;
            }
            let Some(rows) = &page.alias_table else {
                self.report(era, BuildIssue::MissingAliasTable);
                continue;
            };
            let years = self.alias_years(era, rows, &base);
            debug!(era, years = years.len(), "resolved alias table");
            if let Some(info) = table.get_mut(era) {
                info.years = years;
            }
        }
        let tables = EraRegistry::new(table);

        // Pass 3: transition dates may point into any era's table.
        let mut table = tables.table().clone();
        for &(era, page) in &buildable {
            let Some((start, end)) = self.transition_dates(era, page, &tables) else {
                continue;
            };
            if let Some(info) = table.get_mut(era) {
                info.start = Some(start);
                info.end = Some(end);
            }
        }

        BuildReport {
            registry: EraRegistry::new(table),
            diagnostics: self.diagnostics,
        }
    }

    fn conversion_years(&mut self, era: &str, rows: &[TableRow]) -> BTreeMap<u32, Arc<Months>> {
        let western = overrides::uses_western_label(era);
        let mut headings: Vec<i32> = Vec::new();
        let mut gregorian: BTreeMap<u32, Months> = BTreeMap::new();
        let mut julian: BTreeMap<u32, Months> = BTreeMap::new();

        for row in rows {
            let cells = match row {
                TableRow::Heading(cells) => {
                    if cells.len() > 1 {
                        headings = cells.iter().map(|c| heading_number(c, era)).collect();
                    }
                    continue;
                }
                TableRow::Data(cells) => cells,
            };
            let Some(&year_heading) = headings.first() else {
                continue;
            };
            let Ok(year) = u32::try_from(year_heading) else {
                self.report(era, BuildIssue::BadYearHeading(year_heading));
                continue;
            };
            if year == 0 {
                self.report(era, BuildIssue::BadYearHeading(year_heading));
                continue;
            }

            let label = cells.first().map(|c| row_label(c)).unwrap_or("");
            let calendar = if label == GREGORIAN_LABEL || (western && label == WESTERN_LABEL) {
                Some(Calendar::Gregorian)
            } else if label == JULIAN_LABEL {
                Some(Calendar::Julian)
            } else {
                None
            };

            let months = calendar
                .map(|calendar| row_months(&headings, cells, calendar))
                .unwrap_or_default();

            match calendar {
                _ if months.is_empty() => self.report(era, BuildIssue::NoDates(year)),
                Some(Calendar::Gregorian) => {
                    gregorian.insert(year, months);
                }
                Some(Calendar::Julian) => {
                    julian.insert(year, months);
                }
                None => {}
            }
        }

        for (&year, greg) in &gregorian {
            let Some(jul) = julian.get(&year) else {
                continue;
            };
            let disagree = greg
                .iter()
                .any(|(month, date)| jul.get(month).is_some_and(|j| j != date));
            if disagree {
                self.report(
                    era,
                    BuildIssue::CalendarMismatch {
                        year,
                        gregorian: greg.clone(),
                        julian: jul.clone(),
                    },
                );
            }
        }

        // Gregorian cells are authoritative where both rows have the month.
        let mut years = julian;
        for (year, greg) in gregorian {
            years.entry(year).or_default().extend(greg);
        }
        years.into_iter().map(|(y, m)| (y, Arc::new(m))).collect()
    }

    fn alias_years(
        &mut self,
        era: &str,
        rows: &[TableRow],
        base: &EraRegistry,
    ) -> BTreeMap<u32, Arc<Months>> {
        let mut headings: Vec<Option<u32>> = Vec::new();
        let mut years = BTreeMap::new();

        for row in rows {
            let cells = match row {
                TableRow::Heading(cells) => {
                    if !cells.is_empty() {
                        headings = cells.iter().map(|c| alias_heading_year(c)).collect();
                    }
                    continue;
                }
                TableRow::Data(cells) => cells,
            };
            if cells.first().map(|c| clean_alias_cell(c)).as_deref() != Some(NORTHERN_COURT_LABEL) {
                continue;
            }

            for (i, heading) in headings.iter().enumerate().skip(1) {
                let (Some(year), Some(cell)) = (*heading, cells.get(i)) else {
                    continue;
                };
                let text = clean_alias_cell(cell);
                if text.is_empty() {
                    continue;
                }
                match aliased_months(&text, base) {
                    Some(months) => {
                        years.insert(year, Arc::clone(months));
                    }
                    None => self.report(era, BuildIssue::UnresolvedAlias(text)),
                }
            }
        }

        years
    }

    fn transition_dates(
        &mut self,
        era: &str,
        page: &EraPage,
        registry: &EraRegistry,
    ) -> Option<(DateArray, DateArray)> {
        let (start_text, end_text) = match overrides::special_dates(era) {
            Some(special) => (Some(special.start), Some(special.end)),
            None => (
                page.start.as_deref().map(|s| before_paren(s).trim()),
                page.end.as_deref().map(|s| before_paren(s).trim()),
            ),
        };

        let Some(start_text) = start_text.filter(|s| !s.is_empty()) else {
            self.report(era, BuildIssue::MissingStart);
            return None;
        };
        let Some(end_text) = end_text.filter(|s| !s.is_empty()) else {
            self.report(era, BuildIssue::MissingEnd);
            return None;
        };

        let start = era_date_to_gregorian(start_text, registry);
        if start.is_none() {
            self.report(era, BuildIssue::UnresolvedDate(start_text.to_string()));
        }
        let end = era_date_to_gregorian(end_text, registry);
        if end.is_none() {
            self.report(era, BuildIssue::UnresolvedDate(end_text.to_string()));
        }
        Some((start?, end?))
    }
}

/// Dates of one data row, keyed by the month headings above it.
///
/// A "y/m/d" cell sets the year used by later "m/d" cells of the same row.
fn row_months(headings: &[i32], cells: &[String], calendar: Calendar) -> Months {
    let mut months = Months::new();
    let mut year = 0;

    for (i, &month_heading) in headings.iter().enumerate().skip(1) {
        let Some(cell) = cells.get(i) else {
            continue;
        };
        let (month, day) = match parse_date_cell(cell) {
            Some(DateCell::Full { year: y, month, day }) => {
                year = y;
                (month, day)
            }
            Some(DateCell::MonthDay { month, day }) => (month, day),
            None => continue,
        };
        let date = DateArray(year, month, day);
        let date = match calendar {
            Calendar::Gregorian => Some(date),
            Calendar::Julian => julian_to_gregorian(date),
        };
        if let Some(date) = date {
            months.insert(month_heading, date);
        }
    }

    months
}

/// "正慶2年" → the months of 正慶 year 2, if that table was built.
fn aliased_months<'r>(text: &str, base: &'r EraRegistry) -> Option<&'r Arc<Months>> {
    let parsed = parse_era_date(text, base)?;
    base.months(&parsed.era, parsed.table_year())
}
