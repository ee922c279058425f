//! Plain-text response rendering.
//!
//! Everything the user sees outside flow prompts is built here: menu, help,
//! ledger views, success confirmations and the summary/report views. No
//! markup — the embedding surface decides presentation.

use bahi_invoicing::{Invoice, InvoiceStatus, TaxTreatment};
use bahi_ledger::{
    ExpenseSummary, FinancialReport, Ledger, PeriodFilter, Transaction, TransactionKind,
};
use bahi_core::Money;

pub const MENU: &str = "Here's what I can do:\n\
  - create invoice — a guided GST invoice, step by step\n\
  - record expense — log money going out\n\
  - record payment — log money coming in\n\
  - show invoice <id> — read back a created invoice\n\
  - show ledger of <party> — running balance with anyone\n\
  - expense summary — totals by category (add 'today', 'this week' or 'this month')\n\
  - financial report — income vs expenses\n\
Type 'cancel' at any time to stop what we're doing.";

pub const HELP: &str = "You can talk to me in plain language. Some examples:\n\
  - invoice Acme Co for Design work ₹10,000\n\
  - spent ₹500 at Office Mart for supplies\n\
  - received ₹5,000 from Client XYZ\n\
  - show ledger of Acme Co\n\
  - expense summary this month\n\
Or type 'menu' for the full list. 'cancel' stops any flow.";

pub const CANCELLED: &str =
    "Okay, cancelled. Nothing was saved. Type 'menu' whenever you're ready.";

pub const PERSIST_FAILED: &str =
    "Sorry — I couldn't save that just now. Please try again in a moment.";

pub const DEFECT: &str = "Sorry, something went wrong on my side. Let's start over — \
     type 'menu' to see what I can do.";

/// Ledger view: entries oldest-first, then the balance with plain wording.
pub fn ledger(ledger: &Ledger) -> String {
    let mut out = format!("Ledger for {}:\n", ledger.party);
    for entry in &ledger.entries {
        let kind = match entry.kind {
            bahi_ledger::EntryKind::Invoice => "invoice",
            bahi_ledger::EntryKind::Payment => "payment",
        };
        out.push_str(&format!(
            "  {}  {:<7}  {}{}\n",
            entry.date.format("%d/%m/%Y"),
            kind,
            entry.amount,
            entry
                .reason
                .as_deref()
                .map(|r| format!("  ({r})"))
                .unwrap_or_default(),
        ));
    }
    out.push_str(&balance_line(&ledger.party, ledger.balance));
    out
}

fn balance_line(party: &str, balance: Money) -> String {
    if balance.is_positive() {
        format!("Balance: {balance} — {party} owes you (receivable).")
    } else if balance.is_negative() {
        format!("Balance: {} — you owe {party} (payable).", balance.abs())
    } else {
        "Balance: ₹0.00 — all settled.".to_string()
    }
}

pub fn invoice_created(invoice: &Invoice) -> String {
    let mut out = format!(
        "Invoice {} created for {}.\n  Taxable value: {}\n",
        invoice.id, invoice.recipient, invoice.base_amount
    );
    match invoice.tax_treatment {
        TaxTreatment::Interstate => {
            out.push_str(&format!("  IGST: {}\n", invoice.igst_amount));
        }
        TaxTreatment::Intrastate => {
            out.push_str(&format!(
                "  CGST: {}\n  SGST: {}\n",
                invoice.cgst_amount, invoice.sgst_amount
            ));
        }
    }
    out.push_str(&format!(
        "  Total: {}\n  Due by: {}\n",
        invoice.total_amount,
        invoice.due_date.format("%d/%m/%Y")
    ));
    out.push_str(&format!(
        "Added {} to {}'s ledger.",
        invoice.total_amount, invoice.recipient
    ));
    out
}

/// Full read-back of a stored invoice.
pub fn invoice_details(invoice: &Invoice) -> String {
    let mut out = format!(
        "Invoice {} — {} ({})\n  Issued: {}\n  Due: {}\n",
        invoice.id,
        invoice.recipient,
        status_word(invoice.status),
        invoice.issue_date.format("%d/%m/%Y"),
        invoice.due_date.format("%d/%m/%Y"),
    );
    if let Some(g) = &invoice.recipient_gst {
        out.push_str(&format!("  Recipient GSTIN: {g}\n"));
    }
    if let Some(pos) = &invoice.place_of_supply {
        out.push_str(&format!("  Place of supply: {pos}\n"));
    }
    out.push_str("  Items:\n");
    for item in &invoice.items {
        out.push_str(&format!(
            "    - {} ({} x{}): {}\n",
            item.name, item.hsn_sac, item.quantity, item.taxable_value
        ));
    }
    out.push_str(&format!("  Taxable value: {}\n", invoice.base_amount));
    match invoice.tax_treatment {
        TaxTreatment::Interstate => {
            out.push_str(&format!("  IGST: {}\n", invoice.igst_amount));
        }
        TaxTreatment::Intrastate => {
            out.push_str(&format!(
                "  CGST: {}\n  SGST: {}\n",
                invoice.cgst_amount, invoice.sgst_amount
            ));
        }
    }
    out.push_str(&format!("  Total: {}", invoice.total_amount));
    out
}

fn status_word(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Pending => "pending",
        InvoiceStatus::Paid => "paid",
        InvoiceStatus::Void => "void",
    }
}

/// Confirmation for a recorded transaction, with the counterparty's new
/// balance when a ledger was touched.
pub fn transaction_recorded(txn: &Transaction, balance: Option<Money>) -> String {
    let mut out = match txn.kind {
        TransactionKind::Expense => format!(
            "Recorded an expense of {} under {}",
            txn.amount, txn.category
        ),
        TransactionKind::Income => format!("Recorded a payment of {}", txn.amount),
    };
    if let Some(name) = &txn.name {
        match txn.kind {
            TransactionKind::Expense => out.push_str(&format!(", paid to {name}")),
            TransactionKind::Income => out.push_str(&format!(" from {name}")),
        }
    }
    out.push('.');
    if let (Some(name), Some(balance)) = (&txn.name, balance) {
        out.push('\n');
        out.push_str(&balance_line(name, balance));
    }
    out
}

pub fn expense_summary(summary: &ExpenseSummary, filter: PeriodFilter) -> String {
    if summary.count == 0 {
        return format!("No expenses recorded {}.", period_label(filter));
    }
    let mut out = format!(
        "You spent {} across {} expense(s) {}.\n",
        summary.total,
        summary.count,
        period_label(filter)
    );
    for (category, amount) in &summary.by_category {
        out.push_str(&format!("  {category}: {amount}\n"));
    }
    out.pop();
    out
}

pub fn report(report: &FinancialReport, filter: PeriodFilter) -> String {
    format!(
        "Financial report {}:\n  Income: {}\n  Expenses: {}\n  Net: {}\n  Transactions: {}",
        period_label(filter),
        report.income,
        report.expenses,
        report.net,
        report.transaction_count
    )
}

fn period_label(filter: PeriodFilter) -> &'static str {
    match filter {
        PeriodFilter::All => "overall",
        PeriodFilter::Today => "today",
        PeriodFilter::Week => "over the last 7 days",
        PeriodFilter::Month => "this month",
        PeriodFilter::Range(..) => "in the selected period",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahi_ledger::{EntryKind, LedgerStore};

    #[test]
    fn ledger_wording_follows_the_balance_sign() {
        let store = LedgerStore::new();
        store.post(
            "Acme Co",
            EntryKind::Invoice,
            Money::from_rupees(11_800),
            Some("Design work".into()),
            chrono::Utc::now(),
        );
        let text = ledger(&store.get("Acme Co").unwrap());
        assert!(text.contains("Acme Co owes you"));
        assert!(text.contains("₹11,800.00"));
        assert!(text.contains("Design work"));

        store.post(
            "Acme Co",
            EntryKind::Payment,
            Money::from_rupees(11_800),
            None,
            chrono::Utc::now(),
        );
        let text = ledger(&store.get("Acme Co").unwrap());
        assert!(text.contains("all settled"));
    }

    #[test]
    fn invoice_details_show_status_and_split() {
        use bahi_invoicing::{InvoiceEngine, InvoiceInputs, ItemInput};

        let mut inputs = InvoiceInputs::new(
            "Acme Co",
            vec![ItemInput::new("Design work", Money::from_rupees(10_000))],
        );
        inputs.place_of_supply = Some("Delhi".to_string());
        let mut invoice = InvoiceEngine::build(inputs).unwrap();
        invoice.status = InvoiceStatus::Paid;

        let text = invoice_details(&invoice);
        assert!(text.contains("Acme Co (paid)"));
        assert!(text.contains("Design work"));
        assert!(text.contains("IGST: ₹1,800.00"));
        assert!(text.contains("Total: ₹11,800.00"));
    }

    #[test]
    fn empty_summary_has_a_friendly_line() {
        let summary = ExpenseSummary {
            total: Money::zero(),
            count: 0,
            by_category: Vec::new(),
        };
        assert_eq!(
            expense_summary(&summary, PeriodFilter::Today),
            "No expenses recorded today."
        );
    }
}
