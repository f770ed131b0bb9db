//! Static tables that steer registry construction.
//!
//! Transition dates around the Northern/Southern Court split and a few
//! Edo-period changes cannot be read off the generic page layout, so their
//! start/end strings are given here. The remaining tables name the eras whose
//! source pages deviate from the usual conversion-table shape.

// ── Calendar labels ─────────────────────────────────────────────────

/// First cell of a data row holding Gregorian dates.
pub const GREGORIAN_LABEL: &str = "グレゴリオ暦";

/// First cell of a data row holding Julian dates.
pub const JULIAN_LABEL: &str = "ユリウス暦";

/// Gregorian label used by the eras in [`WESTERN_LABEL_ERAS`].
pub const WESTERN_LABEL: &str = "西暦";

/// First cell of an alias-table row listing Northern Court years.
pub const NORTHERN_COURT_LABEL: &str = "北朝";

// ── Era lists ───────────────────────────────────────────────────────

/// Southern Court eras whose years are defined through the Northern Court
/// tables instead of a conversion table of their own.
pub const ALIAS_TABLE_ERAS: &[&str] = &["延元", "興国", "正平"];

/// Eras whose conversion table labels Gregorian rows with 西暦.
pub const WESTERN_LABEL_ERAS: &[&str] = &["明治"];

pub fn uses_alias_table(era: &str) -> bool {
    ALIAS_TABLE_ERAS.contains(&era)
}

pub fn uses_western_label(era: &str) -> bool {
    WESTERN_LABEL_ERAS.contains(&era)
}

// ── Start/end overrides ─────────────────────────────────────────────

/// Literal start/end expressions for one era.
pub struct SpecialEraDates {
    pub name: &'static str,
    pub start: &'static str,
    pub end: &'static str,
}

pub static SPECIAL_ERA_DATES: &[SpecialEraDates] = &[
    SpecialEraDates {
        name: "大宝",
        start: "大宝1年3月21日",
        end: "大宝4年5月10日",
    },
    // ── 南北朝 ──
    SpecialEraDates {
        name: "元徳",
        start: "嘉暦4年8月29日",
        end: "元徳4年4月28日",
    },
    SpecialEraDates {
        name: "元弘",
        start: "元徳3年5月5日",
        end: "元弘4年1月29日",
    },
    SpecialEraDates {
        name: "正慶",
        start: "元徳3年8月9日",
        end: "正慶2年5月22日",
    },
    SpecialEraDates {
        name: "建武",
        start: "正慶2年5月22日",
        end: "建武5年8月28日",
    },
    SpecialEraDates {
        name: "文中",
        start: "建徳3年4月1日",
        end: "文中4年5月27日",
    },
    SpecialEraDates {
        name: "明徳",
        start: "康応2年3月26日",
        end: "明徳5年7月5日",
    },
    // ── 江戸 ──
    SpecialEraDates {
        name: "寛永",
        start: "元和10年2月30日",
        end: "寛永21年12月16日",
    },
    SpecialEraDates {
        name: "正保",
        start: "寛永21年12月16日",
        end: "正保5年2月15日",
    },
    SpecialEraDates {
        name: "承応",
        start: "慶安5年9月18日",
        end: "承応4年4月13日",
    },
    SpecialEraDates {
        name: "明治",
        start: "慶応4年9月8日",
        end: "明治5年12月2日",
    },
];

pub fn special_dates(era: &str) -> Option<&'static SpecialEraDates> {
    SPECIAL_ERA_DATES.iter().find(|s| s.name == era)
}
