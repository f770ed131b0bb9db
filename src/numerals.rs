//! Numeral parsing for era dates.
//!
//! Years, months and days show up as ASCII digits (令和2年), fullwidth digits
//! (令和２年), positional kanji digits (二〇一九) or kanji compositions with
//! 十 and 百 (二十一, 百五).

/// ASCII, fullwidth or kanji digit → value 0–9.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => kanji_digit(c),
    }
}

/// Single kanji digit character → value 0–9.
fn kanji_digit(c: char) -> Option<u32> {
    match c {
        '〇' => Some(0),
        '一' => Some(1),
        '二' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

fn kanji_marker(c: char) -> Option<u32> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        _ => None,
    }
}

/// Parse a numeral string → value.
///
/// Strings made only of digits are read positionally. Anything containing 十
/// or 百 must be a well-formed composition: markers in descending order, each
/// optionally preceded by a non-zero kanji digit, with an optional non-zero
/// trailing unit. Returns `None` for empty input, foreign characters,
/// malformed compositions and overflow.
pub fn parse_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.chars().all(|c| digit_value(c).is_some()) {
        return text.chars().try_fold(0u32, |acc, c| {
            acc.checked_mul(10)?.checked_add(digit_value(c)?)
        });
    }

    parse_composed(text)
}

/// 二十一 → 21, 百五 → 105, 三百二十 → 320.
fn parse_composed(text: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut pending: Option<u32> = None;
    let mut last_marker = u32::MAX;

    for c in text.chars() {
        if let Some(marker) = kanji_marker(c) {
            if marker >= last_marker {
                return None;
            }
            let coefficient = pending.take().unwrap_or(1);
            if coefficient == 0 {
                return None;
            }
            total = total.checked_add(coefficient * marker)?;
            last_marker = marker;
        } else {
            let d = kanji_digit(c)?;
            if pending.is_some() {
                return None;
            }
            pending = Some(d);
        }
    }

    match pending {
        Some(0) => None,
        Some(d) => total.checked_add(d),
        None => Some(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_ascii_and_fullwidth() {
        assert_eq!(parse_number("2"), Some(2));
        assert_eq!(parse_number("31"), Some(31));
        assert_eq!(parse_number("２"), Some(2));
        assert_eq!(parse_number("１２"), Some(12));
        assert_eq!(parse_number(" 7 "), Some(7));
        assert_eq!(parse_number("0"), Some(0));
    }

    #[test]
    fn test_parse_number_positional_kanji() {
        assert_eq!(parse_number("一"), Some(1));
        assert_eq!(parse_number("九"), Some(9));
        assert_eq!(parse_number("二〇"), Some(20));
        assert_eq!(parse_number("二〇一九"), Some(2019));
        assert_eq!(parse_number("〇"), Some(0));
    }

    #[test]
    fn test_parse_number_tens() {
        assert_eq!(parse_number("十"), Some(10));
        assert_eq!(parse_number("十一"), Some(11));
        assert_eq!(parse_number("二十"), Some(20));
        assert_eq!(parse_number("二十一"), Some(21));
        assert_eq!(parse_number("三十"), Some(30));
        assert_eq!(parse_number("九十九"), Some(99));
    }

    #[test]
    fn test_parse_number_hundreds() {
        assert_eq!(parse_number("百"), Some(100));
        assert_eq!(parse_number("百五"), Some(105));
        assert_eq!(parse_number("百十"), Some(110));
        assert_eq!(parse_number("二百"), Some(200));
        assert_eq!(parse_number("三百二十一"), Some(321));
    }

    #[test]
    fn test_parse_number_rejects_malformed() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("元"), None);
        assert_eq!(parse_number("年"), None);
        assert_eq!(parse_number("〇十"), None);
        assert_eq!(parse_number("十〇"), None);
        assert_eq!(parse_number("百〇五"), None);
        assert_eq!(parse_number("十百"), None);
        assert_eq!(parse_number("十十"), None);
        assert_eq!(parse_number("二三十"), None);
        assert_eq!(parse_number("2十"), None);
        assert_eq!(parse_number("1a"), None);
    }

    #[test]
    fn test_parse_number_overflow() {
        assert_eq!(parse_number("99999999999"), None);
    }
}
