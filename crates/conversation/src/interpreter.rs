//! Idle-state command routing.
//!
//! When a session has no active flow, every message lands here. Fixed
//! phrases are matched first, then one-shot heuristics (a verb class plus an
//! extractable amount), and anything left over is `Unknown` so the assistant
//! can answer with the help text.

use std::sync::LazyLock;

use regex::Regex;

use bahi_invoicing::ItemInput;
use bahi_ledger::{PeriodFilter, TransactionKind};

use crate::engine::is_cancel;
use crate::extract::{ExtractedFields, FieldExtractor, HeuristicExtractor};
use crate::parse;

/// What an idle-state message asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    StartInvoice,
    StartExpense,
    StartPayment,
    ShowInvoice(String),
    ShowLedger(String),
    ExpenseSummary(PeriodFilter),
    FinancialReport,
    Menu,
    Help,
    Cancel,
    OneShotInvoice {
        recipient: String,
        items: Vec<ItemInput>,
    },
    OneShotExpense(ExtractedFields),
    OneShotPayment(ExtractedFields),
    Unknown,
}

/// `invoice <recipient> for <items>` in one message.
static ONE_SHOT_INVOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:invoice|bill)\s+(.+?)\s+for\s+(.+)$")
        .expect("hard-coded pattern compiles")
});

/// An invoice id anywhere in the message (`show invoice INV-20250405120000`).
static INVOICE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(inv-\d+)\b").expect("hard-coded pattern compiles")
});

/// `ledger of <name>` / `balance for <name>` / `show ledger <name>`.
static LEDGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ledger|balance|khata)\s*(?:of|for)?\s+(.+)$")
        .expect("hard-coded pattern compiles")
});

pub struct CommandInterpreter {
    extractor: Box<dyn FieldExtractor + Send + Sync>,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(Box::new(HeuristicExtractor))
    }
}

impl CommandInterpreter {
    pub fn new(extractor: Box<dyn FieldExtractor + Send + Sync>) -> Self {
        Self { extractor }
    }

    pub fn interpret(&self, text: &str) -> Intent {
        let text = text.trim();
        let lower = text.to_lowercase();

        if is_cancel(text) {
            return Intent::Cancel;
        }
        if matches!(lower.as_str(), "menu" | "start" | "hi" | "hello" | "hey" | "namaste") {
            return Intent::Menu;
        }
        if lower == "?" || lower == "help" || lower.starts_with("help ") {
            return Intent::Help;
        }

        // Reads before writes: "expense summary" contains "expense".
        if (lower.contains("summary") || lower.contains("spending"))
            && !lower.contains("report")
        {
            return Intent::ExpenseSummary(period_of(&lower));
        }
        if lower.contains("report") || lower.contains("profit") {
            return Intent::FinancialReport;
        }
        if let Some(name) = ledger_target(text) {
            return Intent::ShowLedger(name);
        }
        if let Some(captures) = INVOICE_ID_RE.captures(text) {
            return Intent::ShowInvoice(captures[1].to_uppercase());
        }

        if lower.contains("invoice") || lower.contains("bill") {
            if let Some(intent) = one_shot_invoice(text) {
                return intent;
            }
            return Intent::StartInvoice;
        }

        if is_income_phrase(&lower) {
            return match self.extractor.extract(text, TransactionKind::Income) {
                Some(fields) => Intent::OneShotPayment(fields),
                None => Intent::StartPayment,
            };
        }
        if is_expense_phrase(&lower) {
            return match self.extractor.extract(text, TransactionKind::Expense) {
                Some(fields) => Intent::OneShotExpense(fields),
                None => Intent::StartExpense,
            };
        }

        Intent::Unknown
    }
}

fn is_income_phrase(lower: &str) -> bool {
    lower.contains("received")
        || lower.contains("payment")
        || lower.contains("paid me")
        || lower.contains("income")
        || lower.contains("got paid")
}

fn is_expense_phrase(lower: &str) -> bool {
    lower.contains("expense")
        || lower.contains("spent")
        || lower.contains("bought")
        || lower.contains("purchase")
        || lower.contains("paid")
}

fn period_of(lower: &str) -> PeriodFilter {
    if lower.contains("today") {
        PeriodFilter::Today
    } else if lower.contains("week") {
        PeriodFilter::Week
    } else if lower.contains("month") {
        PeriodFilter::Month
    } else {
        PeriodFilter::All
    }
}

fn ledger_target(text: &str) -> Option<String> {
    let captures = LEDGER_RE.captures(text)?;
    let name = captures.get(1)?.as_str().trim().trim_matches('"');
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

fn one_shot_invoice(text: &str) -> Option<Intent> {
    let captures = ONE_SHOT_INVOICE_RE.captures(text)?;
    let recipient = captures.get(1)?.as_str().trim();
    let items = parse::parse_items(captures.get(2)?.as_str());
    if recipient.is_empty() || items.is_empty() {
        return None;
    }
    Some(Intent::OneShotInvoice {
        recipient: recipient.to_string(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahi_core::Money;

    fn interpret(text: &str) -> Intent {
        CommandInterpreter::default().interpret(text)
    }

    #[test]
    fn fixed_phrases_route_directly() {
        assert_eq!(interpret("menu"), Intent::Menu);
        assert_eq!(interpret("Hello"), Intent::Menu);
        assert_eq!(interpret("help"), Intent::Help);
        assert_eq!(interpret("?"), Intent::Help);
        assert_eq!(interpret("cancel"), Intent::Cancel);
    }

    #[test]
    fn flow_starters() {
        assert_eq!(interpret("create invoice"), Intent::StartInvoice);
        assert_eq!(interpret("record expense"), Intent::StartExpense);
        assert_eq!(interpret("record payment"), Intent::StartPayment);
    }

    #[test]
    fn ledger_lookup_extracts_the_party_name() {
        assert_eq!(
            interpret("show ledger of Acme Co"),
            Intent::ShowLedger("Acme Co".to_string())
        );
        assert_eq!(
            interpret("balance for Sharma Traders"),
            Intent::ShowLedger("Sharma Traders".to_string())
        );
    }

    #[test]
    fn expense_summary_with_period_words() {
        assert_eq!(
            interpret("expense summary"),
            Intent::ExpenseSummary(PeriodFilter::All)
        );
        assert_eq!(
            interpret("expense summary for this month"),
            Intent::ExpenseSummary(PeriodFilter::Month)
        );
        assert_eq!(
            interpret("show my spending this week"),
            Intent::ExpenseSummary(PeriodFilter::Week)
        );
    }

    #[test]
    fn financial_report_phrase() {
        assert_eq!(interpret("financial report"), Intent::FinancialReport);
        assert_eq!(interpret("profit this month?"), Intent::FinancialReport);
    }

    #[test]
    fn one_shot_invoice_when_items_are_parseable() {
        let Intent::OneShotInvoice { recipient, items } =
            interpret("invoice Acme Co for Design work ₹10,000")
        else {
            panic!("expected a one-shot invoice");
        };
        assert_eq!(recipient, "Acme Co");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, Money::from_rupees(10_000));
    }

    #[test]
    fn invoice_without_items_starts_the_flow() {
        assert_eq!(interpret("I need an invoice"), Intent::StartInvoice);
    }

    #[test]
    fn invoice_id_in_the_message_means_a_lookup() {
        assert_eq!(
            interpret("show invoice INV-20250405120000"),
            Intent::ShowInvoice("INV-20250405120000".to_string())
        );
        // Ids are normalized to uppercase.
        assert_eq!(
            interpret("view inv-20250405120000"),
            Intent::ShowInvoice("INV-20250405120000".to_string())
        );
    }

    #[test]
    fn one_shot_expense_with_amount() {
        let Intent::OneShotExpense(fields) = interpret("spent ₹500 at Office Mart for supplies")
        else {
            panic!("expected a one-shot expense");
        };
        assert_eq!(fields.amount, Money::from_rupees(500));
        assert_eq!(fields.name.as_deref(), Some("Office Mart"));
    }

    #[test]
    fn one_shot_payment_with_amount() {
        let Intent::OneShotPayment(fields) = interpret("received ₹5,000 from Client XYZ")
        else {
            panic!("expected a one-shot payment");
        };
        assert_eq!(fields.name.as_deref(), Some("Client XYZ"));
    }

    #[test]
    fn payment_words_without_amount_start_the_flow() {
        assert_eq!(interpret("record a payment I received"), Intent::StartPayment);
    }

    #[test]
    fn gibberish_is_unknown() {
        assert_eq!(interpret("what's the weather"), Intent::Unknown);
        assert_eq!(interpret(""), Intent::Unknown);
    }
}
