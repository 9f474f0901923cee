use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{InvoiceError, Result};
use crate::model::InvoiceType;

/// Wording that differs between sale and purchase invoices.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeLabels {
    pub title: String,
    pub invoice_number_label: String,
    pub party_heading: String,
    pub second_heading: String,
    pub details_heading: String,
    pub order_id_label: String,
    pub order_id_prefix: String,
    pub order_date_label: String,
    pub items_heading: String,
    pub rate_heading: String,
    pub terms: Vec<String>,
    pub left_signature: String,
    pub right_signature: String,
    pub thank_you: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonLabels {
    pub invoice_date_label: String,
    pub status_label: String,
    pub phone_label: String,
    pub email_label: String,
    pub website_label: String,
    pub gstin_label: String,
    pub not_available: String,
    pub generic_brand: String,
    pub col_serial: String,
    pub col_description: String,
    pub col_code: String,
    pub col_brand: String,
    pub col_qty: String,
    pub col_discount: String,
    pub col_amount: String,
    pub total_discount: String,
    pub grand_total: String,
    pub amount_in_words: String,
    pub terms_heading: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Deserialize)]
struct InvoiceLabelsFile {
    sale: TypeLabels,
    purchase: TypeLabels,
    common: CommonLabels,
}

/// Labels resolved for one invoice type.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceLabels {
    pub kind: &'static TypeLabels,
    pub common: &'static CommonLabels,
}

static INVOICE_LABELS: OnceLock<std::result::Result<InvoiceLabelsFile, String>> = OnceLock::new();

pub fn invoice_labels(invoice_type: InvoiceType) -> Result<InvoiceLabels> {
    let file = INVOICE_LABELS.get_or_init(|| {
        let json = include_str!("../../shared/invoiceLabels.json");
        serde_json::from_str::<InvoiceLabelsFile>(json)
            .map_err(|e| format!("failed to parse embedded shared/invoiceLabels.json: {e}"))
    });

    let file = file.as_ref().map_err(|e| InvoiceError::config(e.clone()))?;

    let kind = match invoice_type {
        InvoiceType::Sale => &file.sale,
        InvoiceType::Purchase => &file.purchase,
    };
    Ok(InvoiceLabels {
        kind,
        common: &file.common,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_labels_parse_for_both_types() {
        let sale = invoice_labels(InvoiceType::Sale).unwrap();
        let purchase = invoice_labels(InvoiceType::Purchase).unwrap();

        assert_eq!(sale.kind.title, "TAX INVOICE");
        assert_eq!(purchase.kind.title, "PURCHASE INVOICE");
        assert_eq!(sale.kind.terms.len(), 4);
        assert_eq!(purchase.kind.terms.len(), 5);
    }
}
