//! Read-only era lookup table.
//!
//! Wraps the generated [`EraTable`]. Every accessor checks key presence and
//! returns `Option`/`bool`; nothing assumes an era, year or month exists.

use std::sync::Arc;

use gengou_types::{DateArray, EraInfo, EraTable, Months, calendar_order};

#[derive(Debug, Clone, Default)]
pub struct EraRegistry {
    table: EraTable,
}

impl EraRegistry {
    pub fn new(table: EraTable) -> Self {
        EraRegistry { table }
    }

    pub fn table(&self) -> &EraTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Eras in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EraInfo)> {
        self.table.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn era(&self, name: &str) -> Option<&EraInfo> {
        self.table.get(name)
    }

    pub fn has_era(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Months of one year. Alias years hand back the referenced era's `Arc`.
    pub fn months(&self, era: &str, year: u32) -> Option<&Arc<Months>> {
        self.era(era)?.years.get(&year)
    }

    /// Year 0 is never a table key; the 元年 sentinel is handled by callers.
    pub fn has_year(&self, era: &str, year: u32) -> bool {
        year >= 1 && self.months(era, year).is_some()
    }

    pub fn has_month(&self, era: &str, year: u32, month: i32) -> bool {
        self.anchor(era, year, month).is_some()
    }

    /// Gregorian date of day 1 of the given era-month.
    pub fn anchor(&self, era: &str, year: u32, month: i32) -> Option<DateArray> {
        self.months(era, year)?.get(&month).copied()
    }

    /// Month anchors of one year, intercalary months after their namesake.
    pub fn calendar_months(&self, era: &str, year: u32) -> Option<Vec<(i32, DateArray)>> {
        self.months(era, year).map(|months| calendar_order(months))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small hand-made registry shared by the parser and calendar tests.
    ///
    /// 令和 1–3 with real month starts; 文政 13 has an intercalary 3rd month;
    /// 天保 1 is 文政 13's alias.
    pub(crate) fn sample_registry() -> EraRegistry {
        let mut table = EraTable::new();

        let reiwa_1: Months = [(5, DateArray(2019, 5, 1)), (6, DateArray(2019, 6, 1))]
            .into_iter()
            .chain((7..=12).map(|m| (m, DateArray(2019, m as u32, 1))))
            .collect();
        let reiwa_2: Months = (1..=12).map(|m| (m, DateArray(2020, m as u32, 1))).collect();
        let reiwa_3: Months = (1..=12).map(|m| (m, DateArray(2021, m as u32, 1))).collect();
        table.insert(
            "令和".to_string(),
            EraInfo {
                reading: Some("れいわ".into()),
                yomi: Some("Reiwa".into()),
                start: Some(DateArray(2019, 5, 1)),
                end: None,
                years: [
                    (1, Arc::new(reiwa_1)),
                    (2, Arc::new(reiwa_2)),
                    (3, Arc::new(reiwa_3)),
                ]
                .into_iter()
                .collect(),
            },
        );

        let bunsei_13: Arc<Months> = Arc::new(
            [
                (1, DateArray(1830, 1, 25)),
                (2, DateArray(1830, 2, 23)),
                (3, DateArray(1830, 3, 25)),
                (-3, DateArray(1830, 4, 23)),
                (4, DateArray(1830, 5, 22)),
            ]
            .into_iter()
            .collect(),
        );
        table.insert(
            "文政".to_string(),
            EraInfo {
                years: [(13, Arc::clone(&bunsei_13))].into_iter().collect(),
                ..EraInfo::default()
            },
        );
        table.insert(
            "天保".to_string(),
            EraInfo {
                years: [(1, bunsei_13)].into_iter().collect(),
                ..EraInfo::default()
            },
        );

        EraRegistry::new(table)
    }

    #[test]
    fn test_lookups() {
        let reg = sample_registry();
        assert!(reg.has_era("令和"));
        assert!(!reg.has_era("平成"));
        assert!(reg.has_year("令和", 2));
        assert!(!reg.has_year("令和", 0));
        assert!(!reg.has_year("令和", 4));
        assert!(reg.has_month("令和", 1, 5));
        assert!(!reg.has_month("令和", 1, 4));
        assert!(reg.has_month("文政", 13, -3));
        assert!(!reg.has_month("文政", 13, -4));
        assert_eq!(reg.anchor("令和", 2, 5), Some(DateArray(2020, 5, 1)));
        assert_eq!(reg.anchor("平成", 2, 5), None);
    }

    #[test]
    fn test_alias_years_share_allocation() {
        let reg = sample_registry();
        let a = reg.months("文政", 13).unwrap();
        let b = reg.months("天保", 1).unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_registry_order_follows_table() {
        let reg = sample_registry();
        let names: Vec<&str> = reg.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["令和", "文政", "天保"]);
        assert_eq!(reg.era("天保").map(|e| e.years.len()), Some(1));
    }

    #[test]
    fn test_calendar_months() {
        let reg = sample_registry();
        let order: Vec<i32> = reg
            .calendar_months("天保", 1)
            .unwrap()
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        assert_eq!(order, vec![1, 2, 3, -3, 4]);
        assert_eq!(reg.calendar_months("天保", 2), None);
    }
}
