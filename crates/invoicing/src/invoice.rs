//! Invoice data model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bahi_core::{Gstin, Money, ValueObject};

/// Default SAC code for professional/IT services.
pub const DEFAULT_SAC_CODE: &str = "9983";

/// GST rate in basis points (1800 = 18%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GstRate(u32);

impl GstRate {
    /// Standard services rate, 18%.
    pub const STANDARD: GstRate = GstRate(1800);

    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    pub const fn from_percent(percent: u32) -> Self {
        GstRate(percent * 100)
    }

    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl core::fmt::Display for GstRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

impl ValueObject for GstRate {}

/// Whether supply crosses state lines; decides IGST vs CGST+SGST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxTreatment {
    Interstate,
    Intrastate,
}

impl TaxTreatment {
    /// Classify from place of supply vs. the seller's state.
    ///
    /// Comparison is case-insensitive on trimmed names; an absent value on
    /// either side always classifies as interstate (IGST), matching how GST
    /// treats an unknown place of supply.
    pub fn classify(place_of_supply: Option<&str>, seller_state: Option<&str>) -> Self {
        match (place_of_supply, seller_state) {
            (Some(pos), Some(seller))
                if pos.trim().eq_ignore_ascii_case(seller.trim())
                    && !pos.trim().is_empty() =>
            {
                TaxTreatment::Intrastate
            }
            _ => TaxTreatment::Interstate,
        }
    }
}

/// Raw item data collected from a flow or a one-shot parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    /// Base amount for the whole line (before discount and GST).
    pub amount: Money,
    pub gst_rate: Option<GstRate>,
    pub hsn_sac: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
    /// Discount in basis points of the base amount.
    pub discount_bps: Option<u32>,
}

impl ItemInput {
    /// Item with just a name and amount; everything else defaulted.
    pub fn new(name: impl Into<String>, amount: Money) -> Self {
        Self {
            name: name.into(),
            amount,
            gst_rate: None,
            hsn_sac: None,
            quantity: None,
            unit: None,
            discount_bps: None,
        }
    }
}

/// A fully priced invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub name: String,
    pub hsn_sac: String,
    pub quantity: u32,
    pub unit: String,
    pub rate_per_unit: Money,
    pub base_amount: Money,
    pub discount_bps: u32,
    pub discount_amount: Money,
    /// `base_amount − discount_amount`.
    pub taxable_value: Money,
    pub gst_rate: GstRate,
    pub gst_amount: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    /// `taxable_value + gst_amount`.
    pub line_total: Money,
}

/// Invoice lifecycle status. The only field that may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Void,
}

/// A complete GST invoice. Immutable once built, except `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Time-derived id, e.g. `INV-20250405120000`.
    pub id: String,
    pub recipient: String,
    pub recipient_gst: Option<Gstin>,
    pub sender_gst: Option<Gstin>,
    pub place_of_supply: Option<String>,
    pub seller_state: Option<String>,
    pub reverse_charge: bool,
    pub tax_treatment: TaxTreatment,
    pub items: Vec<InvoiceItem>,
    /// Σ item taxable values.
    pub base_amount: Money,
    pub gst_amount: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    pub total_amount: Money,
    pub issue_date: DateTime<Utc>,
    /// Issue date + 30 days.
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Reason text for the matching ledger entry: the sole item's name, or a
    /// fixed marker when the invoice has several lines.
    pub fn ledger_reason(&self) -> String {
        if self.items.len() == 1 {
            self.items[0].name.clone()
        } else {
            "Multiple items".to_string()
        }
    }
}
