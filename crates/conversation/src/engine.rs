//! The guided-flow state machine.
//!
//! `advance` is a pure function from (flow state, user text) to (next state,
//! reply). It never touches the session store, which keeps every transition
//! unit-testable with plain values. The assistant layer owns persistence and
//! acts on terminal [`Outcome`]s.

use bahi_core::{dates, Gstin, Money};
use bahi_invoicing::GstRate;

use crate::flow::{
    ExpenseDraft, ExpenseStep, FlowState, InvoiceDraft, InvoiceStep, PaymentDraft, PaymentStep,
};
use crate::parse;

/// Words that abort the current flow from any step.
pub const CANCEL_WORDS: &[&str] = &["cancel", "exit", "quit", "stop", "end"];

/// True when the message is a cancel command (checked before step dispatch).
pub fn is_cancel(text: &str) -> bool {
    let t = text.trim();
    CANCEL_WORDS.iter().any(|w| t.eq_ignore_ascii_case(w))
}

fn is_skip(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "skip" | "none" | "na" | "n/a")
}

/// Terminal result of a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    InvoiceReady(InvoiceDraft),
    ExpenseReady(ExpenseDraft),
    PaymentReady(PaymentDraft),
    Cancelled,
}

/// What the user should see next.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A prompt or re-prompt; the flow continues.
    Prompt(String),
    /// The flow finished; the assistant acts on it.
    Outcome(Outcome),
}

/// One transition: the state to store and the reply to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub next: FlowState,
    pub reply: Reply,
}

impl Turn {
    fn prompt(next: FlowState, text: impl Into<String>) -> Self {
        Turn {
            next,
            reply: Reply::Prompt(text.into()),
        }
    }

    fn outcome(outcome: Outcome) -> Self {
        Turn {
            next: FlowState::Idle,
            reply: Reply::Outcome(outcome),
        }
    }
}

pub struct ConversationEngine;

impl ConversationEngine {
    /// Start the guided invoice flow.
    pub fn open_invoice() -> Turn {
        let step = InvoiceStep::Recipient;
        Turn::prompt(
            FlowState::Invoice(step, InvoiceDraft::default()),
            invoice_prompt(step),
        )
    }

    /// Start the guided expense flow.
    pub fn open_expense() -> Turn {
        let step = ExpenseStep::Amount;
        Turn::prompt(
            FlowState::Expense(step, ExpenseDraft::default()),
            expense_prompt(step),
        )
    }

    /// Start the guided payment-received flow.
    pub fn open_payment() -> Turn {
        let step = PaymentStep::FromParty;
        Turn::prompt(
            FlowState::Payment(step, PaymentDraft::default()),
            payment_prompt(step),
        )
    }

    /// Advance one step. Cancel words win over everything else.
    pub fn advance(state: FlowState, input: &str) -> Turn {
        if is_cancel(input) {
            return Turn::outcome(Outcome::Cancelled);
        }
        let input = input.trim();
        match state {
            FlowState::Idle | FlowState::Ledger => Turn::prompt(
                FlowState::Idle,
                "Type 'menu' to see what I can do.".to_string(),
            ),
            FlowState::Invoice(step, draft) => advance_invoice(step, draft, input),
            FlowState::Expense(step, draft) => advance_expense(step, draft, input),
            FlowState::Payment(step, draft) => advance_payment(step, draft, input),
        }
    }
}

fn advance_invoice(step: InvoiceStep, mut draft: InvoiceDraft, input: &str) -> Turn {
    use InvoiceStep::*;
    match step {
        Recipient => {
            if input.is_empty() {
                return Turn::prompt(FlowState::Invoice(step, draft), invoice_prompt(step));
            }
            draft.recipient = Some(input.to_string());
            Turn::prompt(
                FlowState::Invoice(RecipientGst, draft),
                invoice_prompt(RecipientGst),
            )
        }
        RecipientGst => match read_gstin(input) {
            GstinAnswer::Skipped => {
                draft.recipient_gst = None;
                Turn::prompt(FlowState::Invoice(SenderGst, draft), invoice_prompt(SenderGst))
            }
            GstinAnswer::Valid(g) => {
                draft.recipient_gst = Some(g);
                Turn::prompt(FlowState::Invoice(SenderGst, draft), invoice_prompt(SenderGst))
            }
            GstinAnswer::Invalid => Turn::prompt(FlowState::Invoice(step, draft), GSTIN_REPROMPT),
        },
        SenderGst => match read_gstin(input) {
            GstinAnswer::Skipped => {
                draft.sender_gst = None;
                Turn::prompt(
                    FlowState::Invoice(PlaceOfSupply, draft),
                    invoice_prompt(PlaceOfSupply),
                )
            }
            GstinAnswer::Valid(g) => {
                draft.sender_gst = Some(g);
                Turn::prompt(
                    FlowState::Invoice(PlaceOfSupply, draft),
                    invoice_prompt(PlaceOfSupply),
                )
            }
            GstinAnswer::Invalid => Turn::prompt(FlowState::Invoice(step, draft), GSTIN_REPROMPT),
        },
        PlaceOfSupply => {
            draft.place_of_supply = if is_skip(input) || input.is_empty() {
                None
            } else {
                Some(input.to_string())
            };
            Turn::prompt(FlowState::Invoice(Items, draft), invoice_prompt(Items))
        }
        Items => {
            let items = parse::parse_items(input);
            if items.is_empty() {
                return Turn::prompt(
                    FlowState::Invoice(step, draft),
                    "I couldn't find an amount in that. List items like \
                     'Design work ₹10,000' (several items separated by commas).",
                );
            }
            draft.items = items;
            let summary = invoice_summary(&draft);
            Turn::prompt(FlowState::Invoice(Confirm, draft), summary)
        }
        Confirm => {
            if input.eq_ignore_ascii_case("confirm") {
                Turn::outcome(Outcome::InvoiceReady(draft))
            } else if input.eq_ignore_ascii_case("edit") {
                Turn::prompt(
                    FlowState::Invoice(Recipient, draft),
                    "Okay, let's go over it again. Your answers are kept; \
                     send a new value or repeat the old one.\n\
                     Who is this invoice for?",
                )
            } else {
                Turn::prompt(
                    FlowState::Invoice(step, draft),
                    "Type 'confirm' to create the invoice, 'edit' to change it, or 'cancel'.",
                )
            }
        }
    }
}

fn advance_expense(step: ExpenseStep, mut draft: ExpenseDraft, input: &str) -> Turn {
    use ExpenseStep::*;
    match step {
        Amount => match parse::find_amount(input) {
            Some((amount, _)) if amount.is_positive() => {
                draft.amount = Some(amount);
                Turn::prompt(FlowState::Expense(Date, draft), expense_prompt(Date))
            }
            _ => Turn::prompt(
                FlowState::Expense(step, draft),
                "I need a positive amount, like ₹500 or 1,250.50.",
            ),
        },
        Date => match dates::parse_user_date(input) {
            Some(date) => {
                draft.date = Some(date);
                Turn::prompt(FlowState::Expense(Category, draft), expense_prompt(Category))
            }
            None => Turn::prompt(
                FlowState::Expense(step, draft),
                "I couldn't read that date. Try 'today', 'yesterday' or 05/04/2025.",
            ),
        },
        Category => {
            draft.category = optional_text(input);
            Turn::prompt(FlowState::Expense(Vendor, draft), expense_prompt(Vendor))
        }
        Vendor => {
            draft.vendor = optional_text(input);
            Turn::prompt(FlowState::Expense(Notes, draft), expense_prompt(Notes))
        }
        Notes => {
            draft.notes = optional_text(input);
            let summary = expense_summary(&draft);
            Turn::prompt(FlowState::Expense(Confirm, draft), summary)
        }
        Confirm => {
            if input.eq_ignore_ascii_case("confirm") {
                Turn::outcome(Outcome::ExpenseReady(draft))
            } else if input.eq_ignore_ascii_case("edit") {
                Turn::prompt(
                    FlowState::Expense(Amount, draft),
                    "Okay, from the top. How much was the expense?",
                )
            } else {
                Turn::prompt(
                    FlowState::Expense(step, draft),
                    "Type 'confirm' to record the expense, 'edit' to change it, or 'cancel'.",
                )
            }
        }
    }
}

fn advance_payment(step: PaymentStep, mut draft: PaymentDraft, input: &str) -> Turn {
    use PaymentStep::*;
    match step {
        FromParty => {
            if input.is_empty() {
                return Turn::prompt(FlowState::Payment(step, draft), payment_prompt(step));
            }
            draft.from_party = Some(input.to_string());
            Turn::prompt(FlowState::Payment(Amount, draft), payment_prompt(Amount))
        }
        Amount => match parse::find_amount(input) {
            Some((amount, _)) if amount.is_positive() => {
                draft.amount = Some(amount);
                Turn::prompt(FlowState::Payment(Date, draft), payment_prompt(Date))
            }
            _ => Turn::prompt(
                FlowState::Payment(step, draft),
                "I need a positive amount, like ₹5,000.",
            ),
        },
        Date => match dates::parse_user_date(input) {
            Some(date) => {
                draft.date = Some(date);
                Turn::prompt(FlowState::Payment(Notes, draft), payment_prompt(Notes))
            }
            None => Turn::prompt(
                FlowState::Payment(step, draft),
                "I couldn't read that date. Try 'today', 'yesterday' or 05/04/2025.",
            ),
        },
        Notes => {
            draft.notes = optional_text(input);
            let summary = payment_summary(&draft);
            Turn::prompt(FlowState::Payment(Confirm, draft), summary)
        }
        Confirm => {
            if input.eq_ignore_ascii_case("confirm") {
                Turn::outcome(Outcome::PaymentReady(draft))
            } else if input.eq_ignore_ascii_case("edit") {
                Turn::prompt(
                    FlowState::Payment(FromParty, draft),
                    "Okay, from the top. Who paid you?",
                )
            } else {
                Turn::prompt(
                    FlowState::Payment(step, draft),
                    "Type 'confirm' to record the payment, 'edit' to change it, or 'cancel'.",
                )
            }
        }
    }
}

enum GstinAnswer {
    Skipped,
    Valid(Gstin),
    Invalid,
}

fn read_gstin(input: &str) -> GstinAnswer {
    if is_skip(input) || input.is_empty() {
        return GstinAnswer::Skipped;
    }
    match Gstin::parse(input) {
        Ok(g) => GstinAnswer::Valid(g),
        Err(_) => GstinAnswer::Invalid,
    }
}

const GSTIN_REPROMPT: &str = "That doesn't look like a GSTIN. It should be 15 characters \
     like 29ABCDE1234F1Z5 — or type 'skip'.";

fn optional_text(input: &str) -> Option<String> {
    if is_skip(input) || input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

fn invoice_prompt(step: InvoiceStep) -> &'static str {
    match step {
        InvoiceStep::Recipient => "Who is this invoice for? (party or company name)",
        InvoiceStep::RecipientGst => {
            "What's the recipient's GSTIN? Type 'skip' if they're not registered."
        }
        InvoiceStep::SenderGst => "What's your GSTIN? Type 'skip' to leave it off.",
        InvoiceStep::PlaceOfSupply => {
            "Which state is the place of supply? Type 'skip' if you're not sure."
        }
        InvoiceStep::Items => {
            "What are you billing for? List items like 'Design work ₹10,000' \
             (several items separated by commas)."
        }
        InvoiceStep::Confirm => {
            "Type 'confirm' to create the invoice, 'edit' to change it, or 'cancel'."
        }
    }
}

fn expense_prompt(step: ExpenseStep) -> &'static str {
    match step {
        ExpenseStep::Amount => "How much was the expense? (e.g. ₹500)",
        ExpenseStep::Date => "When was it? (today / yesterday / 05/04/2025)",
        ExpenseStep::Category => {
            "What category? (e.g. Supplies, Travel — 'skip' for Uncategorized)"
        }
        ExpenseStep::Vendor => "Who was it paid to? Type 'skip' if it's not tied to a party.",
        ExpenseStep::Notes => "Any notes? Type 'skip' for none.",
        ExpenseStep::Confirm => {
            "Type 'confirm' to record the expense, 'edit' to change it, or 'cancel'."
        }
    }
}

fn payment_prompt(step: PaymentStep) -> &'static str {
    match step {
        PaymentStep::FromParty => "Who paid you?",
        PaymentStep::Amount => "How much did you receive? (e.g. ₹5,000)",
        PaymentStep::Date => "When did it arrive? (today / yesterday / 05/04/2025)",
        PaymentStep::Notes => "Any notes? Type 'skip' for none.",
        PaymentStep::Confirm => {
            "Type 'confirm' to record the payment, 'edit' to change it, or 'cancel'."
        }
    }
}

/// Confirmation preview. GST shown at the standard rate; the engine applies
/// per-item rates when the invoice is actually built.
fn invoice_summary(draft: &InvoiceDraft) -> String {
    let base: Money = draft.items.iter().map(|i| i.amount).sum();
    let gst = base.percent_bps(GstRate::STANDARD.bps());

    let mut out = String::from("Here's the invoice so far:\n");
    out.push_str(&format!(
        "  To: {}",
        draft.recipient.as_deref().unwrap_or("(unnamed)")
    ));
    if let Some(g) = &draft.recipient_gst {
        out.push_str(&format!(" (GSTIN {g})"));
    }
    out.push('\n');
    if let Some(g) = &draft.sender_gst {
        out.push_str(&format!("  Your GSTIN: {g}\n"));
    }
    if let Some(pos) = &draft.place_of_supply {
        out.push_str(&format!("  Place of supply: {pos}\n"));
    }
    out.push_str("  Items:\n");
    for item in &draft.items {
        out.push_str(&format!("    - {}: {}\n", item.name, item.amount));
    }
    out.push_str(&format!(
        "  Base {base} + GST ({}) {gst} = {}\n",
        GstRate::STANDARD,
        base + gst
    ));
    out.push_str("Type 'confirm' to create it, 'edit' to change it, or 'cancel'.");
    out
}

fn expense_summary(draft: &ExpenseDraft) -> String {
    let mut out = String::from("Recording this expense:\n");
    out.push_str(&format!(
        "  Amount: {}\n",
        draft.amount.unwrap_or_else(Money::zero)
    ));
    if let Some(date) = draft.date {
        out.push_str(&format!("  Date: {date}\n"));
    }
    out.push_str(&format!(
        "  Category: {}\n",
        draft.category.as_deref().unwrap_or("Uncategorized")
    ));
    if let Some(vendor) = &draft.vendor {
        out.push_str(&format!("  Paid to: {vendor}\n"));
    }
    if let Some(notes) = &draft.notes {
        out.push_str(&format!("  Notes: {notes}\n"));
    }
    out.push_str("Type 'confirm' to record it, 'edit' to change it, or 'cancel'.");
    out
}

fn payment_summary(draft: &PaymentDraft) -> String {
    let mut out = String::from("Recording this payment:\n");
    out.push_str(&format!(
        "  From: {}\n",
        draft.from_party.as_deref().unwrap_or("(unnamed)")
    ));
    out.push_str(&format!(
        "  Amount: {}\n",
        draft.amount.unwrap_or_else(Money::zero)
    ));
    if let Some(date) = draft.date {
        out.push_str(&format!("  Date: {date}\n"));
    }
    if let Some(notes) = &draft.notes {
        out.push_str(&format!("  Notes: {notes}\n"));
    }
    out.push_str("Type 'confirm' to record it, 'edit' to change it, or 'cancel'.");
    out
}
