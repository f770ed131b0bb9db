use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::numerals::parse_number;
use crate::registry::EraRegistry;

// ── Grammar ────────────────────────────────────────────────────────
//
// Real data examples:
//   令和2年5月1日
//   令和元年
//   元和10年2月30日
//   文政13年閏3月1日
//   明治 五 年 十二 月 二 日
//
//   {era}{year}[年|歳][{閏}{month}月[{day}日]]
//
// A numeric year may omit 年 (令和2 is valid) but 元 may not (令和元 is not).

const NUMERALS: &str = "0-9０-９〇一二三四五六七八九十百";

// Groups: 1 = numeric year, 2 = 元年, 3 = month (with 閏), 4 = day
static RE_ERA_DATE: LazyLock<Regex> = LazyLock::new(|| {
    let year = format!(r"(?:([{NUMERALS}]+\s*(?:年|歳)?)|(元\s*(?:年|歳)))");
    let month = format!(r"\s*(閏?\s*[{NUMERALS}]+)\s*月");
    let day = format!(r"\s*([{NUMERALS}]+)\s*日");
    Regex::new(&format!("{year}(?:{month}(?:{day})?)?")).unwrap()
});

const LEAP_MARKER: char = '閏';

/// An era date expression that passed grammar and table checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEraDate {
    pub era: String,
    /// `0` when the text used 元年; normalized to 1 by lookups.
    pub year: u32,
    /// Negative for intercalary months.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// Characters of input consumed by the longest valid prefix.
    pub match_length: usize,
}

impl ParsedEraDate {
    /// Year used for table lookups (元年 → 1).
    pub fn table_year(&self) -> u32 {
        self.year.max(1)
    }
}

/// Parse an era date expression against the registry.
///
/// Returns `None` when the grammar does not match, when nothing precedes the
/// year token, when the era is unknown, or when a numeric year is not in the
/// era's table. An unknown month is dropped together with the day, and the
/// match is cut back to the end of the year token.
pub fn parse_era_date(text: &str, registry: &EraRegistry) -> Option<ParsedEraDate> {
    let caps = RE_ERA_DATE.captures(text)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 {
        return None;
    }

    let era = text[..whole.start()].trim();
    if !registry.has_era(era) {
        return None;
    }

    let (year, year_end) = match (caps.get(1), caps.get(2)) {
        (Some(numeric), _) => {
            let digits = numeric.as_str().replace(['年', '歳'], "");
            let year = parse_number(&digits)?;
            if !registry.has_year(era, year) {
                return None;
            }
            (year, numeric.end())
        }
        (None, Some(gannen)) => (0, gannen.end()),
        (None, None) => return None,
    };

    let month = caps.get(3).and_then(|m| {
        let raw = m.as_str();
        let leap = raw.contains(LEAP_MARKER);
        let value = i32::try_from(parse_number(&raw.replace(LEAP_MARKER, ""))?).ok()?;
        let month = if leap { -value } else { value };
        registry
            .has_month(era, year.max(1), month)
            .then_some(month)
    });

    let end = if month.is_some() { whole.end() } else { year_end };

    let day = month
        .and(caps.get(4))
        .and_then(|d| parse_number(d.as_str()))
        .filter(|&d| d >= 1);

    Some(ParsedEraDate {
        era: era.to_string(),
        year,
        month,
        day,
        match_length: text[..end].chars().count(),
    })
}

/// Write an era date in the form [`parse_era_date`] reads back.
///
/// Year 1 is written as 元年 and intercalary months get the 閏 prefix.
pub fn format_era_date(era: &str, year: u32, month: i32, day: u32) -> String {
    let year = if year <= 1 {
        "元".to_string()
    } else {
        year.to_string()
    };
    let leap = if month < 0 { "閏" } else { "" };
    format!("{era}{year}年{leap}{}月{day}日", month.unsigned_abs())
}
