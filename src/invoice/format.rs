//! Formatting helpers shared by the layout engine: money, dates, invoice
//! numbers, amount-in-words and fixed-width text wrapping.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::model::{InvoiceType, OrderItem};

pub fn format_currency(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// `DD-MM-YYYY` for a date-like string; anything unparseable renders empty.
pub fn format_date(value: &str) -> String {
    parse_date(value).map(format_day_month_year).unwrap_or_default()
}

pub fn format_day_month_year(date: Date) -> String {
    format!("{:02}-{:02}-{}", date.day(), u8::from(date.month()), date.year())
}

fn parse_date(value: &str) -> Option<Date> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(ts.date());
    }
    // Local date-times ("2024-03-05T10:15:30.123") carry the date in the first ten chars.
    let head = s.get(..10)?;
    Date::parse(head, format_description!("[year]-[month]-[day]")).ok()
}

pub fn invoice_number(order_id: i64, invoice_type: InvoiceType, date: Date) -> String {
    format!(
        "{}-{}{:02}{:02}-{:04}",
        invoice_type.number_prefix(),
        date.year(),
        u8::from(date.month()),
        date.day(),
        order_id
    )
}

pub fn line_amount(rate: f64, quantity: i64, discount_percent: f64) -> f64 {
    rate * quantity as f64 * (1.0 - discount_percent / 100.0)
}

/// Sum of `sellingPrice × quantity × discount / 100` over discounted items.
pub fn total_discount<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> f64 {
    items
        .into_iter()
        .filter_map(|item| {
            let product = item.product_dto.as_ref()?;
            let discount = product.discount_percent();
            if discount <= 0.0 {
                return None;
            }
            let item_price = product.selling_price.unwrap_or(0.0) * item.quantity as f64;
            Some(item_price * (discount / 100.0))
        })
        .sum()
}

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    match n % 10 {
        0 => TENS[n / 10].to_string(),
        unit => format!("{} {}", TENS[n / 10], ONES[unit]),
    }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let mut parts: Vec<String> = Vec::new();
    if hundreds > 0 {
        parts.push(format!("{} Hundred", ONES[hundreds as usize]));
    }
    if rest > 0 {
        parts.push(below_hundred(rest));
    }
    parts.join(" ")
}

/// Spells a whole number using the Indian grouping (crore, lakh, thousand).
fn indian_words(n: u64) -> String {
    let crore = n / 10_000_000;
    let lakh = (n % 10_000_000) / 100_000;
    let thousand = (n % 100_000) / 1_000;
    let rest = n % 1_000;

    let mut parts: Vec<String> = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", indian_words(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// Whole-rupee part only; paise are dropped.
pub fn amount_in_words(amount: f64) -> String {
    if !amount.is_finite() || amount < 1.0 {
        return "Zero Rupees Only".to_string();
    }
    let rupees = amount.floor() as u64;
    format!("Rupees {} Only", indian_words(rupees))
}

pub fn wrap_text_lines(input: &str, max_chars: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in input.split_whitespace() {
        // Words longer than a whole line are split hard.
        let mut word = word;
        while word.chars().count() > max_chars && max_chars > 0 {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            out.push(word[..split_at].to_string());
            word = &word[split_at..];
        }
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(current);
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;
    use time::macros::date;

    fn item(selling_price: f64, quantity: i64, discount: f64) -> OrderItem {
        OrderItem {
            product_dto: Some(Product {
                selling_price: Some(selling_price),
                discount: Some(discount),
                ..Product::default()
            }),
            quantity,
            ..OrderItem::default()
        }
    }

    #[test]
    fn currency_has_two_decimals_and_rupee_sign() {
        assert_eq!(format_currency(1234.5), "₹1234.50");
        assert_eq!(format_currency(0.0), "₹0.00");
    }

    #[test]
    fn invoice_number_pads_order_id() {
        let day = date!(2024 - 03 - 05);
        assert_eq!(invoice_number(42, InvoiceType::Sale, day), "INV-20240305-0042");
        assert_eq!(invoice_number(42, InvoiceType::Purchase, day), "PINV-20240305-0042");
        assert_eq!(invoice_number(123456, InvoiceType::Sale, day), "INV-20240305-123456");
    }

    #[test]
    fn line_amount_applies_discount() {
        assert_eq!(format!("{:.2}", line_amount(100.0, 3, 10.0)), "270.00");
        assert_eq!(format!("{:.2}", line_amount(50.0, 1, 0.0)), "50.00");
    }

    #[test]
    fn total_discount_skips_undiscounted_items() {
        let items = [item(100.0, 2, 10.0), item(50.0, 1, 0.0)];
        assert_eq!(format!("{:.2}", total_discount(&items)), "20.00");
    }

    #[test]
    fn dates_render_day_first() {
        assert_eq!(format_date("2024-03-05T10:15:30"), "05-03-2024");
        assert_eq!(format_date("2024-03-05T10:15:30.250"), "05-03-2024");
        assert_eq!(format_date("2024-12-31T23:00:00Z"), "31-12-2024");
        assert_eq!(format_date("2024-01-09"), "09-01-2024");
        assert_eq!(format_date("not a date"), "");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn amount_in_words_uses_indian_grouping() {
        assert_eq!(amount_in_words(0.0), "Zero Rupees Only");
        assert_eq!(amount_in_words(0.75), "Zero Rupees Only");
        assert_eq!(amount_in_words(15.0), "Rupees Fifteen Only");
        assert_eq!(
            amount_in_words(1234.75),
            "Rupees One Thousand Two Hundred Thirty Four Only"
        );
        assert_eq!(amount_in_words(250_000.0), "Rupees Two Lakh Fifty Thousand Only");
        assert_eq!(
            amount_in_words(30_500_100.0),
            "Rupees Three Crore Five Lakh One Hundred Only"
        );
    }

    #[test]
    fn wrap_respects_budget_and_splits_long_words() {
        assert_eq!(
            wrap_text_lines("Brake pad set front axle", 10),
            vec!["Brake pad", "set front", "axle"]
        );
        assert_eq!(wrap_text_lines("ABCDEFGHIJKL", 5), vec!["ABCDE", "FGHIJ", "KL"]);
        assert!(wrap_text_lines("   ", 5).is_empty());
    }
}
