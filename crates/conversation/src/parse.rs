//! Free-text scanning shared by the flow engine and the extractor.
//!
//! These are deliberately loose heuristics: they find amounts and item lines
//! in conversational text. Anything they miss re-prompts the user, so false
//! negatives are cheap and false positives are the thing to avoid — which is
//! why bare numbers are only trusted when no currency-marked amount exists.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use bahi_core::Money;
use bahi_invoicing::ItemInput;

/// Item name used when the user gives an amount with no describable name.
pub const DEFAULT_ITEM_NAME: &str = "Professional Services";

/// An amount with an explicit currency marker: `₹10,000`, `Rs. 500`,
/// `INR 200`, `1500 rupees`.
static MARKED_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:₹|rs\.?|inr|rupees?)\s*[0-9][0-9,]*(?:\.[0-9]{1,2})?|[0-9][0-9,]*(?:\.[0-9]{1,2})?\s*(?:rupees?|rs)\b",
    )
    .expect("hard-coded pattern compiles")
});

/// Any number at all. Fallback when nothing is currency-marked.
static BARE_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9][0-9,]*(?:\.[0-9]{1,2})?")
        .expect("hard-coded pattern compiles")
});

/// Find the most plausible amount in free text.
///
/// Currency-marked amounts win over bare numbers; returns the parsed value
/// and the byte range it occupied so callers can slice the surrounding text.
pub fn find_amount(text: &str) -> Option<(Money, Range<usize>)> {
    let m = MARKED_AMOUNT_RE
        .find(text)
        .or_else(|| BARE_AMOUNT_RE.find(text))?;
    let amount = parse_match(m.as_str())?;
    Some((amount, m.range()))
}

/// Parse invoice item lines out of free text.
///
/// Each currency-marked amount becomes one item; its name is the text
/// immediately before it (`Design work ₹10,000, hosting ₹1,000`). An amount
/// with no leading name takes the text after it, and failing that
/// [`DEFAULT_ITEM_NAME`]. With no marked amount at all, the last bare number
/// is treated as a single item's amount. Returns empty when no amount parses.
pub fn parse_items(text: &str) -> Vec<ItemInput> {
    let marked: Vec<(Money, Range<usize>)> = MARKED_AMOUNT_RE
        .find_iter(text)
        .filter_map(|m| parse_match(m.as_str()).map(|a| (a, m.range())))
        .filter(|(a, _)| a.is_positive())
        .collect();

    if !marked.is_empty() {
        let mut items = Vec::with_capacity(marked.len());
        let mut cursor = 0;
        for (i, (amount, range)) in marked.iter().enumerate() {
            let name = clean_name(&text[cursor..range.start])
                .or_else(|| {
                    // Lone leading amount: borrow the text up to the next one.
                    let tail_end = marked
                        .get(i + 1)
                        .map_or(text.len(), |(_, next)| next.start);
                    clean_name(&text[range.end..tail_end])
                })
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
            items.push(ItemInput::new(name, *amount));
            cursor = range.end;
        }
        return items;
    }

    // No currency marker anywhere: trust a single bare number.
    let Some(m) = BARE_AMOUNT_RE.find_iter(text).last() else {
        return Vec::new();
    };
    let Some(amount) = parse_match(m.as_str()).filter(|a| a.is_positive()) else {
        return Vec::new();
    };
    let name = clean_name(&text[..m.start()])
        .or_else(|| clean_name(&text[m.end()..]))
        .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
    vec![ItemInput::new(name, amount)]
}

fn parse_match(s: &str) -> Option<Money> {
    // Trailing-marker form ("1500 rupees"): strip the marker off the end.
    let s = s.trim();
    let stripped = ["rupees", "rupee", "rs"]
        .iter()
        .find_map(|marker| {
            let lower = s.to_lowercase();
            lower
                .strip_suffix(marker)
                .map(|rest| s[..rest.len()].trim_end())
        })
        .unwrap_or(s);
    Money::parse_rupees(stripped).ok()
}

/// Trim a would-be item name down to its meaningful words.
fn clean_name(segment: &str) -> Option<String> {
    let words: Vec<&str> = segment
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| ",.;:@-".contains(c)))
        .filter(|w| !w.is_empty())
        .collect();

    let filler = ["and", "for", "at", "of", "a", "an", "the", "with"];
    let start = words
        .iter()
        .position(|w| !filler.contains(&w.to_lowercase().as_str()))?;
    let mut end = words.len();
    while end > start && filler.contains(&words[end - 1].to_lowercase().as_str()) {
        end -= 1;
    }
    if start >= end {
        return None;
    }
    Some(words[start..end].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_marked_amount_before_bare_numbers() {
        let (amount, _) = find_amount("2 laptops for ₹45,000").unwrap();
        assert_eq!(amount, Money::from_rupees(45_000));
    }

    #[test]
    fn finds_bare_amount_when_nothing_is_marked() {
        let (amount, _) = find_amount("spent 750 on tea").unwrap();
        assert_eq!(amount, Money::from_rupees(750));
        assert!(find_amount("no numbers here").is_none());
    }

    #[test]
    fn trailing_marker_amounts_parse() {
        let (amount, _) = find_amount("got 1500 rupees").unwrap();
        assert_eq!(amount, Money::from_rupees(1500));
    }

    #[test]
    fn single_named_item() {
        let items = parse_items("Design work ₹10,000");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Design work");
        assert_eq!(items[0].amount, Money::from_rupees(10_000));
    }

    #[test]
    fn multiple_items_split_on_amounts() {
        let items = parse_items("Website ₹5,000, hosting ₹1,000 and domain ₹800");
        let got: Vec<(&str, i64)> = items
            .iter()
            .map(|i| (i.name.as_str(), i.amount.paise() / 100))
            .collect();
        assert_eq!(
            got,
            vec![("Website", 5000), ("hosting", 1000), ("domain", 800)]
        );
    }

    #[test]
    fn lone_amount_defaults_the_name() {
        let items = parse_items("₹2,500");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, DEFAULT_ITEM_NAME);
        assert_eq!(items[0].amount, Money::from_rupees(2500));
    }

    #[test]
    fn leading_amount_takes_trailing_name() {
        let items = parse_items("₹2,500 consulting");
        assert_eq!(items[0].name, "consulting");
    }

    #[test]
    fn bare_number_makes_one_item() {
        let items = parse_items("consulting retainer 12000");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "consulting retainer");
        assert_eq!(items[0].amount, Money::from_rupees(12_000));
    }

    #[test]
    fn no_amount_yields_nothing() {
        assert!(parse_items("some design work").is_empty());
        assert!(parse_items("").is_empty());
    }
}
