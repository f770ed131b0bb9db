//! Source data for registry construction.
//!
//! The page scraper hands over each era's tables already reduced to rows of
//! cell text. Expected directory layout:
//!   {root}/eras.json          — ordered list of era names
//!   {root}/readings.json      — era name → { reading, yomi }
//!   {root}/pages/**/{era}.json — one [`EraPage`] per era

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::numerals::parse_number;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot walk source pages: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("two source pages for era {0}")]
    DuplicatePage(String),
}

// ── Reduced source form ────────────────────────────────────────────

/// Phonetic readings of an era name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readings {
    pub reading: String,
    pub yomi: String,
}

/// One table row: heading cells (`th`) or data cells (`td`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRow {
    Heading(Vec<String>),
    Data(Vec<String>),
}

/// What the scraper extracted from one era's page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraPage {
    /// First item of the 改元 list, e.g. "令和元年5月1日（2019年5月1日）".
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    /// Rows of the 西暦との対照表 table.
    #[serde(default)]
    pub conversion_table: Option<Vec<TableRow>>,
    /// Rows of the Northern Court comparison table (Southern Court eras only).
    #[serde(default)]
    pub alias_table: Option<Vec<TableRow>>,
}

/// Everything the builder consumes.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    /// Era names in chronological order; also the output order.
    pub eras: Vec<String>,
    pub readings: HashMap<String, Readings>,
    pub pages: HashMap<String, EraPage>,
}

impl SourceSet {
    pub fn readings(&self, era: &str) -> Option<&Readings> {
        self.readings.get(era)
    }

    pub fn page(&self, era: &str) -> Option<&EraPage> {
        self.pages.get(era)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let json = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a source directory.
pub fn load_sources(root: &Path) -> Result<SourceSet, SourceError> {
    let eras: Vec<String> = read_json(&root.join("eras.json"))?;
    let readings: HashMap<String, Readings> = read_json(&root.join("readings.json"))?;

    let mut pages = HashMap::new();
    let pages_dir = root.join("pages");
    if pages_dir.is_dir() {
        for entry in WalkDir::new(&pages_dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let Some(era) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let page: EraPage = read_json(path)?;
            if pages.insert(era.to_string(), page).is_some() {
                return Err(SourceError::DuplicatePage(era.to_string()));
            }
        }
    }

    Ok(SourceSet {
        eras,
        readings,
        pages,
    })
}

// ── Cell reduction ─────────────────────────────────────────────────

const LEAP_MARKER: char = '閏';

/// Annotation and unit glyphs stripped from heading cells.
const HEADING_NOISE: &[char] = &['※', '¶', '年', '歳', '月', '閏', '\n'];

/// Drop everything from the first full-width parenthesis on:
/// "令和元年5月1日（2019年5月1日）" → "令和元年5月1日".
pub fn before_paren(text: &str) -> &str {
    text.split('（').next().unwrap_or(text)
}

fn strip_heading_noise(text: &str) -> String {
    text.replacen('元', "1", 1).replace(HEADING_NOISE, "")
}

/// Parse a leading integer the way a lenient scraper would: skip leading
/// whitespace, accept a sign, stop at the first non-digit.
pub fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Conversion-table heading → signed number.
///
/// "令和元年" → 1, "5月" → 5, "閏4月" → -4, "十二月" → 12. Cells that hold no
/// number (row labels) give 0.
pub fn heading_number(cell: &str, era: &str) -> i32 {
    let leap = cell.contains(LEAP_MARKER);
    let mut text = before_paren(cell).to_string();
    if !era.is_empty() {
        text = text.replacen(era, "", 1);
    }
    let value = parse_number(&strip_heading_noise(&text))
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0);
    if leap { -value } else { value }
}

/// Alias-table heading → year number of this era ("元年" → 1, "3年" → 3).
/// The row label cell gives `None`.
pub fn alias_heading_year(cell: &str) -> Option<u32> {
    leading_int(&strip_heading_noise(cell)).and_then(|n| u32::try_from(n).ok())
}

/// Alias-table body cell with annotation glyphs removed: "建武3年※" → "建武3年".
pub fn clean_alias_cell(cell: &str) -> String {
    cell.replace(['※', '¶', '\n'], "").trim().to_string()
}

/// Calendar label of a data row: the text before any "/" in the first cell.
pub fn row_label(cell: &str) -> &str {
    cell.split('/').next().unwrap_or(cell).trim()
}

/// A conversion-table date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// "2019/5/1"
    Full { year: i32, month: u32, day: u32 },
    /// "6/1" — year carried over from the previous cell of the row.
    MonthDay { month: u32, day: u32 },
}

/// "2019/5/1–5/31" → `Full(2019, 5, 1)`, "6/1" → `MonthDay(6, 1)`.
///
/// Ranges are cut at their start. Empty cells and cells with another shape
/// give `None`.
pub fn parse_date_cell(cell: &str) -> Option<DateCell> {
    let text = cell.replace('\n', "");
    let start = text.split(['–', '-']).next().unwrap_or("");
    let parts: Vec<&str> = start.split('/').collect();

    let int = |s: &str| leading_int(s);
    let unsigned = |s: &str| int(s).and_then(|n| u32::try_from(n).ok());

    match parts.as_slice() {
        [y, m, d] => Some(DateCell::Full {
            year: i32::try_from(int(y)?).ok()?,
            month: unsigned(m)?,
            day: unsigned(d)?,
        }),
        [m, d] => Some(DateCell::MonthDay {
            month: unsigned(m)?,
            day: unsigned(d)?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("2019"), Some(2019));
        assert_eq!(leading_int(" 5日"), Some(5));
        assert_eq!(leading_int("-4"), Some(-4));
        assert_eq!(leading_int("延元"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_heading_number() {
        assert_eq!(heading_number("令和元年", "令和"), 1);
        assert_eq!(heading_number("令和2年（2020年）", "令和"), 2);
        assert_eq!(heading_number("5月", "令和"), 5);
        assert_eq!(heading_number("閏4月", "文政"), -4);
        assert_eq!(heading_number("十二月※", "文政"), 12);
        assert_eq!(heading_number("和暦", "文政"), 0);
    }

    #[test]
    fn test_alias_heading_year() {
        assert_eq!(alias_heading_year("元年"), Some(1));
        assert_eq!(alias_heading_year("3年"), Some(3));
        assert_eq!(alias_heading_year("南朝"), None);
    }

    #[test]
    fn test_row_label() {
        assert_eq!(row_label("グレゴリオ暦"), "グレゴリオ暦");
        assert_eq!(row_label("ユリウス暦/x"), "ユリウス暦");
        assert_eq!(row_label(" 西暦\n"), "西暦");
    }

    #[test]
    fn test_parse_date_cell() {
        assert_eq!(
            parse_date_cell("2019/5/1–5/31"),
            Some(DateCell::Full {
                year: 2019,
                month: 5,
                day: 1
            })
        );
        assert_eq!(
            parse_date_cell("6/1-6/30"),
            Some(DateCell::MonthDay { month: 6, day: 1 })
        );
        assert_eq!(
            parse_date_cell("1830/4/\n23"),
            Some(DateCell::Full {
                year: 1830,
                month: 4,
                day: 23
            })
        );
        assert_eq!(parse_date_cell(""), None);
        assert_eq!(parse_date_cell("—"), None);
        assert_eq!(parse_date_cell("a/b"), None);
    }

    #[test]
    fn test_load_sources_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("eras.json"), r#"["令和"]"#).unwrap();
        fs::write(
            root.join("readings.json"),
            r#"{"令和": {"reading": "れいわ", "yomi": "Reiwa"}}"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("pages/modern")).unwrap();
        fs::write(
            root.join("pages/modern/令和.json"),
            r#"{"start": "令和元年5月1日", "conversion_table": [{"heading": ["令和元年", "5月"]}, {"data": ["グレゴリオ暦", "2019/5/1"]}]}"#,
        )
        .unwrap();
        fs::write(root.join("pages/notes.txt"), "ignored").unwrap();

        let sources = load_sources(root).unwrap();
        assert_eq!(sources.eras, vec!["令和".to_string()]);
        assert_eq!(sources.readings("令和").map(|r| r.yomi.as_str()), Some("Reiwa"));
        let page = sources.page("令和").unwrap();
        assert_eq!(page.start.as_deref(), Some("令和元年5月1日"));
        assert_eq!(page.end, None);
        assert_eq!(page.conversion_table.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_load_sources_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eras.json"), "not json").unwrap();
        let err = load_sources(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }

    #[test]
    fn test_load_sources_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sources(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
