use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Date triple ──────────────────────────────────────────────────────────

/// A proleptic Gregorian date as `[year, month, day]`, month and day 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateArray(pub i32, pub u32, pub u32);

impl DateArray {
    pub fn year(&self) -> i32 {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.1
    }

    pub fn day(&self) -> u32 {
        self.2
    }
}

impl fmt::Display for DateArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0, self.1, self.2)
    }
}

// ── Era record ───────────────────────────────────────────────────────────

/// Signed month number → Gregorian date of day 1 of that month.
///
/// Negative numbers are intercalary months and follow the positive month of
/// the same magnitude: ..., 3, 4, -4, 5, 6, ...
///
/// Map order is numeric, so every intercalary key comes first (-4, 3, 4, 5).
/// Use [`calendar_order`] to walk the months as they fell.
pub type Months = BTreeMap<i32, DateArray>;

/// Months of one year in calendar order: ..., 4, -4, 5, ...
pub fn calendar_order(months: &Months) -> Vec<(i32, DateArray)> {
    let mut ordered: Vec<(i32, DateArray)> = months.iter().map(|(&m, &d)| (m, d)).collect();
    ordered.sort_by_key(|&(m, _)| (m.unsigned_abs(), m < 0));
    ordered
}

/// Everything known about one era.
///
/// Entries whose source data was incomplete keep the fields that could be
/// built and omit the rest when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EraInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yomi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateArray>,
    /// Year number (1 = 元年) → months. Northern Court aliases share the
    /// referenced era's allocation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub years: BTreeMap<u32, Arc<Months>>,
}

impl EraInfo {
    /// True when every field of the generated record is present.
    pub fn is_complete(&self) -> bool {
        self.reading.is_some()
            && self.yomi.is_some()
            && self.start.is_some()
            && self.end.is_some()
            && !self.years.is_empty()
    }
}

// ── Generated table ──────────────────────────────────────────────────────

/// Era name → record, kept in era-list order.
///
/// Serialized as a JSON object in insertion order, so the same input always
/// produces the same bytes.
pub type EraTable = IndexMap<String, EraInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> EraInfo {
        let months: Months = [(4, DateArray(2019, 5, 1)), (-4, DateArray(2019, 5, 31))]
            .into_iter()
            .collect();
        EraInfo {
            reading: Some("れいわ".into()),
            yomi: Some("Reiwa".into()),
            start: Some(DateArray(2019, 5, 1)),
            end: None,
            years: [(1, Arc::new(months))].into_iter().collect(),
        }
    }

    #[test]
    fn test_date_array_is_a_json_triple() {
        let json = serde_json::to_string(&DateArray(1582, 10, 14)).unwrap();
        assert_eq!(json, "[1582,10,14]");
        assert_eq!(DateArray(1582, 10, 14).to_string(), "1582-10-14");
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let json = serde_json::to_string(&EraInfo::default()).unwrap();
        assert_eq!(json, "{}");
        assert!(!sample_info().is_complete());
    }

    #[test]
    fn test_table_keeps_insertion_order() {
        let mut table = EraTable::new();
        table.insert("令和".to_string(), sample_info());
        table.insert("大化".to_string(), EraInfo::default());
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.find("令和").unwrap() < json.find("大化").unwrap());

        let back: EraTable = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = back.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["令和", "大化"]);
        assert_eq!(back.get("令和"), Some(&sample_info()));
    }

    #[test]
    fn test_month_keys_are_signed_strings() {
        let json = serde_json::to_string(&sample_info()).unwrap();
        assert!(json.contains(r#""years":{"1":{"-4":[2019,5,31],"4":[2019,5,1]}}"#));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = EraTable::new();
        table.insert("明治".to_string(), EraInfo::default());
        table.insert("大正".to_string(), EraInfo::default());
        table.insert("明治".to_string(), sample_info());
        assert_eq!(table.len(), 2);
        assert_eq!(table.keys().next().map(String::as_str), Some("明治"));
        assert_eq!(table.get("明治"), Some(&sample_info()));
    }

    #[test]
    fn test_calendar_order_puts_intercalary_after_its_month() {
        let months: Months = [
            (3, DateArray(1830, 3, 25)),
            (-3, DateArray(1830, 4, 23)),
            (1, DateArray(1830, 1, 25)),
            (4, DateArray(1830, 5, 22)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<i32> = months.keys().copied().collect();
        assert_eq!(keys, vec![-3, 1, 3, 4]);

        let ordered: Vec<i32> = calendar_order(&months).into_iter().map(|(m, _)| m).collect();
        assert_eq!(ordered, vec![1, 3, -3, 4]);
    }
}
