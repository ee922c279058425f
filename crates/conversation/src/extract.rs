//! Best-effort field extraction from one-shot messages.
//!
//! The contract is the trait: callers only depend on the input/output shape,
//! so the heuristic implementation can be swapped for something smarter
//! without touching the flows. Extraction failing is never an error — the
//! caller falls back to the guided flow.

use chrono::NaiveDate;

use bahi_core::{dates, Money};
use bahi_ledger::TransactionKind;

use crate::parse;

/// Fields pulled out of a one-shot message. Only the amount is guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub amount: Money,
    pub name: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Pulls transaction fields out of free text. `None` means "not confident
/// enough"; the caller should walk the user through the guided flow instead.
pub trait FieldExtractor {
    fn extract(&self, text: &str, kind: TransactionKind) -> Option<ExtractedFields>;
}

/// Delimiter-based extractor: finds the amount, then reads the party name
/// after a direction marker ("to"/"at" for expenses, "from" for income) and
/// the category after "for"/"under".
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl FieldExtractor for HeuristicExtractor {
    fn extract(&self, text: &str, kind: TransactionKind) -> Option<ExtractedFields> {
        let (amount, _) = parse::find_amount(text)?;
        if !amount.is_positive() {
            return None;
        }

        let name_markers: &[&str] = match kind {
            TransactionKind::Expense => &["paid to", "to", "at"],
            TransactionKind::Income => &["received from", "paid by", "from"],
        };

        Some(ExtractedFields {
            amount,
            name: after_marker(text, name_markers),
            category: after_marker(text, &["for", "under"]),
            date: find_date(text),
            notes: None,
        })
    }
}

/// Words that end a captured phrase.
const STOP_WORDS: &[&str] = &["for", "on", "under", "to", "from", "at", "today", "yesterday", "and"];

/// The words following the first matching marker, up to a stop word, an
/// amount, or punctuation.
fn after_marker(text: &str, markers: &[&str]) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for marker in markers {
        let marker_words: Vec<&str> = marker.split_whitespace().collect();
        let Some(end) = tokens.len().checked_sub(marker_words.len()) else {
            continue;
        };
        'starts: for i in 0..=end {
            for (j, mw) in marker_words.iter().enumerate() {
                if !tokens[i + j].eq_ignore_ascii_case(mw) {
                    continue 'starts;
                }
            }

            let mut captured = Vec::new();
            for token in &tokens[i + marker_words.len()..] {
                let word = token.trim_matches(|c: char| ",.;!?".contains(c));
                if word.is_empty() || looks_like_amount(word) {
                    break;
                }
                let lower = word.to_lowercase();
                if STOP_WORDS.contains(&lower.as_str()) {
                    break;
                }
                captured.push(word.to_string());
                // Punctuation after the word closes the phrase.
                if token.ends_with([',', '.', ';', '!', '?']) {
                    break;
                }
            }
            if !captured.is_empty() {
                return Some(captured.join(" "));
            }
        }
    }
    None
}

fn looks_like_amount(word: &str) -> bool {
    word.starts_with('₹')
        || word.chars().next().is_some_and(|c| c.is_ascii_digit())
        || matches!(word.to_lowercase().as_str(), "rs" | "rs." | "inr" | "rupees" | "rupee")
}

fn find_date(text: &str) -> Option<NaiveDate> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| ",.;!?".contains(c)))
        .find_map(dates::parse_user_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, Local};

    #[test]
    fn extracts_a_full_expense_sentence() {
        let fields = HeuristicExtractor
            .extract(
                "spent ₹500 at Office Mart for supplies yesterday",
                TransactionKind::Expense,
            )
            .unwrap();

        assert_eq!(fields.amount, Money::from_rupees(500));
        assert_eq!(fields.name.as_deref(), Some("Office Mart"));
        assert_eq!(fields.category.as_deref(), Some("supplies"));
        assert_eq!(
            fields.date,
            Local::now().date_naive().checked_sub_days(Days::new(1))
        );
    }

    #[test]
    fn extracts_income_with_the_from_marker() {
        let fields = HeuristicExtractor
            .extract("received ₹5,000 from Client XYZ", TransactionKind::Income)
            .unwrap();

        assert_eq!(fields.amount, Money::from_rupees(5000));
        assert_eq!(fields.name.as_deref(), Some("Client XYZ"));
        assert_eq!(fields.category, None);
        assert_eq!(fields.date, None);
    }

    #[test]
    fn no_amount_means_no_extraction() {
        assert!(HeuristicExtractor
            .extract("paid the electricity bill", TransactionKind::Expense)
            .is_none());
    }

    #[test]
    fn amount_only_still_extracts() {
        let fields = HeuristicExtractor
            .extract("₹1,200", TransactionKind::Expense)
            .unwrap();
        assert_eq!(fields.amount, Money::from_rupees(1200));
        assert_eq!(fields.name, None);
    }

    #[test]
    fn phrase_stops_before_the_amount() {
        let fields = HeuristicExtractor
            .extract("paid to Sharma Traders ₹2,000", TransactionKind::Expense)
            .unwrap();
        assert_eq!(fields.name.as_deref(), Some("Sharma Traders"));
    }

    #[test]
    fn explicit_date_token_is_picked_up() {
        let fields = HeuristicExtractor
            .extract("spent ₹300 at Cafe on 05/04/2025", TransactionKind::Expense)
            .unwrap();
        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2025, 4, 5));
    }
}
