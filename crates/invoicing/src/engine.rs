//! Invoice calculation engine.
//!
//! Pure: given collected inputs, produces a fully priced invoice or a
//! validation error. The conversation layer guarantees it never runs on
//! incomplete data; this module still validates everything it consumes.

use chrono::{DateTime, Days, Utc};

use bahi_core::{DomainError, DomainResult, Gstin, Money};

use crate::invoice::{
    GstRate, Invoice, InvoiceItem, InvoiceStatus, ItemInput, TaxTreatment, DEFAULT_SAC_CODE,
};

/// Everything the engine needs to price an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInputs {
    pub recipient: String,
    pub items: Vec<ItemInput>,
    pub recipient_gst: Option<Gstin>,
    pub sender_gst: Option<Gstin>,
    pub place_of_supply: Option<String>,
    /// Explicit seller state; when absent it is derived from `sender_gst`'s
    /// state-code prefix, and failing that supply is treated as interstate.
    pub seller_state: Option<String>,
    pub reverse_charge: bool,
    /// Issue timestamp; `None` means now. Tests pass a fixed instant.
    pub issued_at: Option<DateTime<Utc>>,
}

impl InvoiceInputs {
    pub fn new(recipient: impl Into<String>, items: Vec<ItemInput>) -> Self {
        Self {
            recipient: recipient.into(),
            items,
            recipient_gst: None,
            sender_gst: None,
            place_of_supply: None,
            seller_state: None,
            reverse_charge: false,
            issued_at: None,
        }
    }
}

pub struct InvoiceEngine;

impl InvoiceEngine {
    /// Price the inputs into a complete invoice.
    pub fn build(inputs: InvoiceInputs) -> DomainResult<Invoice> {
        let recipient = inputs.recipient.trim();
        if recipient.is_empty() {
            return Err(DomainError::validation("invoice recipient is required"));
        }
        if inputs.items.is_empty() {
            return Err(DomainError::validation(
                "cannot build an invoice without items",
            ));
        }

        let seller_state = inputs.seller_state.clone().or_else(|| {
            inputs
                .sender_gst
                .as_ref()
                .and_then(|g| g.state_name())
                .map(str::to_string)
        });
        let treatment =
            TaxTreatment::classify(inputs.place_of_supply.as_deref(), seller_state.as_deref());

        let mut items = Vec::with_capacity(inputs.items.len());
        for input in &inputs.items {
            items.push(Self::price_item(input, treatment)?);
        }

        let base_amount: Money = items.iter().map(|i| i.taxable_value).sum();
        let gst_amount: Money = items.iter().map(|i| i.gst_amount).sum();
        let cgst_amount: Money = items.iter().map(|i| i.cgst_amount).sum();
        let sgst_amount: Money = items.iter().map(|i| i.sgst_amount).sum();
        let igst_amount: Money = items.iter().map(|i| i.igst_amount).sum();
        let total_amount: Money = items.iter().map(|i| i.line_total).sum();

        let issue_date = inputs.issued_at.unwrap_or_else(Utc::now);
        let due_date = issue_date
            .date_naive()
            .checked_add_days(Days::new(30))
            .ok_or_else(|| DomainError::invariant("due date out of range"))?;

        let invoice = Invoice {
            id: format!("INV-{}", issue_date.format("%Y%m%d%H%M%S")),
            recipient: recipient.to_string(),
            recipient_gst: inputs.recipient_gst,
            sender_gst: inputs.sender_gst,
            place_of_supply: inputs.place_of_supply,
            seller_state,
            reverse_charge: inputs.reverse_charge,
            tax_treatment: treatment,
            items,
            base_amount,
            gst_amount,
            cgst_amount,
            sgst_amount,
            igst_amount,
            total_amount,
            issue_date,
            due_date,
            status: InvoiceStatus::Pending,
        };
        tracing::info!(
            id = %invoice.id,
            recipient = %invoice.recipient,
            total = %invoice.total_amount,
            treatment = ?invoice.tax_treatment,
            "invoice built"
        );
        Ok(invoice)
    }

    fn price_item(input: &ItemInput, treatment: TaxTreatment) -> DomainResult<InvoiceItem> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("item name is required"));
        }
        if input.amount.is_negative() {
            return Err(DomainError::validation(format!(
                "item '{name}' has a negative amount"
            )));
        }

        let quantity = input.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "item '{name}' quantity must be positive"
            )));
        }
        let discount_bps = input.discount_bps.unwrap_or(0);
        if discount_bps > 10_000 {
            return Err(DomainError::validation(format!(
                "item '{name}' discount exceeds 100%"
            )));
        }
        let gst_rate = input.gst_rate.unwrap_or_default();

        let base_amount = input.amount;
        // Informational per-unit rate; the line is priced off the base amount.
        let rate_per_unit = Money::from_paise(base_amount.paise() / quantity as i64);
        let discount_amount = base_amount.percent_bps(discount_bps);
        let taxable_value = base_amount - discount_amount;

        let (gst_amount, cgst_amount, sgst_amount, igst_amount) = match treatment {
            TaxTreatment::Interstate => {
                let gst = taxable_value.percent_bps(gst_rate.bps());
                (gst, Money::zero(), Money::zero(), gst)
            }
            TaxTreatment::Intrastate => {
                // Each half is rounded identically so CGST == SGST holds in
                // paise; the item's GST is defined as their sum.
                let half = half_tax(taxable_value, gst_rate);
                (half + half, half, half, Money::zero())
            }
        };

        Ok(InvoiceItem {
            name: name.to_string(),
            hsn_sac: input
                .hsn_sac
                .clone()
                .unwrap_or_else(|| DEFAULT_SAC_CODE.to_string()),
            quantity,
            unit: input.unit.clone().unwrap_or_else(|| "Service".to_string()),
            rate_per_unit,
            base_amount,
            discount_bps,
            discount_amount,
            taxable_value,
            gst_rate,
            gst_amount,
            cgst_amount,
            sgst_amount,
            igst_amount,
            line_total: taxable_value + gst_amount,
        })
    }
}

/// Half of `taxable × rate`, rounded half-up in paise.
fn half_tax(taxable: Money, rate: GstRate) -> Money {
    let paise = (taxable.paise() as i128 * rate.bps() as i128 + 10_000) / 20_000;
    Money::from_paise(paise as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn single_item_inputs(amount: Money) -> InvoiceInputs {
        InvoiceInputs::new("Acme Co", vec![ItemInput::new("Design work", amount)])
    }

    #[test]
    fn interstate_default_applies_igst() {
        // No seller state anywhere: interstate treatment even with a place
        // of supply present.
        let mut inputs = single_item_inputs(Money::from_rupees(10_000));
        inputs.place_of_supply = Some("Delhi".to_string());

        let invoice = InvoiceEngine::build(inputs).unwrap();
        assert_eq!(invoice.tax_treatment, TaxTreatment::Interstate);
        assert_eq!(invoice.base_amount, Money::from_rupees(10_000));
        assert_eq!(invoice.gst_amount, Money::from_rupees(1_800));
        assert_eq!(invoice.igst_amount, Money::from_rupees(1_800));
        assert_eq!(invoice.cgst_amount, Money::zero());
        assert_eq!(invoice.sgst_amount, Money::zero());
        assert_eq!(invoice.total_amount, Money::from_rupees(11_800));
    }

    #[test]
    fn intrastate_splits_gst_into_equal_halves() {
        let mut inputs = single_item_inputs(Money::from_rupees(10_000));
        inputs.place_of_supply = Some("Karnataka".to_string());
        inputs.seller_state = Some("Karnataka".to_string());

        let invoice = InvoiceEngine::build(inputs).unwrap();
        assert_eq!(invoice.tax_treatment, TaxTreatment::Intrastate);
        assert_eq!(invoice.cgst_amount, Money::from_rupees(900));
        assert_eq!(invoice.sgst_amount, Money::from_rupees(900));
        assert_eq!(invoice.gst_amount, Money::from_rupees(1_800));
        assert_eq!(invoice.igst_amount, Money::zero());
    }

    #[test]
    fn state_comparison_ignores_case_and_padding() {
        let mut inputs = single_item_inputs(Money::from_rupees(100));
        inputs.place_of_supply = Some(" karnataka ".to_string());
        inputs.seller_state = Some("Karnataka".to_string());

        let invoice = InvoiceEngine::build(inputs).unwrap();
        assert_eq!(invoice.tax_treatment, TaxTreatment::Intrastate);
    }

    #[test]
    fn seller_state_derives_from_sender_gstin() {
        let mut inputs = single_item_inputs(Money::from_rupees(100));
        inputs.sender_gst = Some(Gstin::parse("07ABCDE1234F1Z5").unwrap());
        inputs.place_of_supply = Some("Delhi".to_string());

        let invoice = InvoiceEngine::build(inputs).unwrap();
        assert_eq!(invoice.seller_state.as_deref(), Some("Delhi"));
        assert_eq!(invoice.tax_treatment, TaxTreatment::Intrastate);
    }

    #[test]
    fn discount_reduces_taxable_value_before_gst() {
        let mut inputs = InvoiceInputs::new(
            "Acme Co",
            vec![ItemInput {
                discount_bps: Some(1000), // 10%
                ..ItemInput::new("Design work", Money::from_rupees(10_000))
            }],
        );
        inputs.place_of_supply = Some("Delhi".to_string());

        let invoice = InvoiceEngine::build(inputs).unwrap();
        let item = &invoice.items[0];
        assert_eq!(item.discount_amount, Money::from_rupees(1_000));
        assert_eq!(item.taxable_value, Money::from_rupees(9_000));
        assert_eq!(item.gst_amount, Money::from_rupees(1_620));
        assert_eq!(invoice.total_amount, Money::from_rupees(10_620));
    }

    #[test]
    fn item_defaults_are_applied() {
        let invoice =
            InvoiceEngine::build(single_item_inputs(Money::from_rupees(500))).unwrap();
        let item = &invoice.items[0];
        assert_eq!(item.gst_rate, GstRate::STANDARD);
        assert_eq!(item.hsn_sac, DEFAULT_SAC_CODE);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit, "Service");
    }

    #[test]
    fn due_date_is_thirty_days_out() {
        let issued = "2025-04-05T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut inputs = single_item_inputs(Money::from_rupees(100));
        inputs.issued_at = Some(issued);

        let invoice = InvoiceEngine::build(inputs).unwrap();
        assert_eq!(invoice.id, "INV-20250405120000");
        assert_eq!(
            invoice.due_date,
            chrono::NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
        );
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let err = InvoiceEngine::build(InvoiceInputs::new("Acme Co", vec![])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_recipient_is_rejected() {
        let inputs = InvoiceInputs::new("  ", vec![ItemInput::new("x", Money::from_rupees(1))]);
        assert!(InvoiceEngine::build(inputs).is_err());
    }

    #[test]
    fn ledger_reason_names_sole_item_or_multiple() {
        let one = InvoiceEngine::build(single_item_inputs(Money::from_rupees(10))).unwrap();
        assert_eq!(one.ledger_reason(), "Design work");

        let two = InvoiceEngine::build(InvoiceInputs::new(
            "Acme Co",
            vec![
                ItemInput::new("Design", Money::from_rupees(10)),
                ItemInput::new("Hosting", Money::from_rupees(5)),
            ],
        ))
        .unwrap();
        assert_eq!(two.ledger_reason(), "Multiple items");
    }

    prop_compose! {
        fn arb_item()(
            paise in 1i64..50_000_000,
            rate in prop::sample::select(vec![25u32, 300, 500, 1200, 1800, 2800]),
            discount in 0u32..5000,
            qty in 1u32..50,
        ) -> ItemInput {
            ItemInput {
                gst_rate: Some(GstRate::from_bps(rate)),
                discount_bps: Some(discount),
                quantity: Some(qty),
                ..ItemInput::new("Line", Money::from_paise(paise))
            }
        }
    }

    proptest! {
        /// Aggregate totals are exactly the per-item sums, and every item
        /// carries exactly one of IGST or a CGST+SGST pair of equal halves.
        #[test]
        fn totals_and_split_invariants(
            items in prop::collection::vec(arb_item(), 1..8),
            intrastate in prop::bool::ANY,
        ) {
            let mut inputs = InvoiceInputs::new("Party", items);
            inputs.place_of_supply = Some("Kerala".to_string());
            if intrastate {
                inputs.seller_state = Some("Kerala".to_string());
            }

            let invoice = InvoiceEngine::build(inputs).unwrap();

            let base: Money = invoice.items.iter().map(|i| i.taxable_value).sum();
            let gst: Money = invoice.items.iter().map(|i| i.gst_amount).sum();
            let total: Money = invoice.items.iter().map(|i| i.line_total).sum();
            prop_assert_eq!(invoice.base_amount, base);
            prop_assert_eq!(invoice.gst_amount, gst);
            prop_assert_eq!(invoice.total_amount, total);
            prop_assert_eq!(invoice.total_amount, invoice.base_amount + invoice.gst_amount);

            for item in &invoice.items {
                prop_assert_eq!(item.taxable_value, item.base_amount - item.discount_amount);
                if item.gst_amount.is_positive() {
                    let igst_side = item.igst_amount.is_positive();
                    let split_side =
                        item.cgst_amount.is_positive() && item.sgst_amount.is_positive();
                    prop_assert!(igst_side != split_side);
                    if split_side {
                        prop_assert_eq!(item.cgst_amount, item.sgst_amount);
                        prop_assert_eq!(item.cgst_amount + item.sgst_amount, item.gst_amount);
                    } else {
                        prop_assert_eq!(item.igst_amount, item.gst_amount);
                    }
                }
            }
        }
    }
}
