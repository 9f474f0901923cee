use invoice_desk_lib::invoice::{DrawOp, PageLayout};
use invoice_desk_lib::{
    layout, parse_orders, render_pdf, CompanyProfile, InvoiceType, LayoutContext, Order, OrderItem,
};
use time::macros::date;

const FIXTURE: &str = include_str!("fixtures/orders.json");

fn texts(page: &PageLayout) -> Vec<&str> {
    page.ops.iter().filter_map(DrawOp::text_content).collect()
}

#[test]
fn fixture_orders_become_a_single_page_pdf() {
    let orders = parse_orders(FIXTURE).unwrap();
    assert_eq!(orders.len(), 2);

    let company = CompanyProfile::embedded().unwrap();
    let ctx = LayoutContext {
        company: &company,
        issued_on: date!(2024 - 03 - 05),
    };
    let invoice = layout(&orders, InvoiceType::Sale, &ctx).unwrap();

    assert_eq!(invoice.invoice_number, "INV-20240305-0042");
    assert_eq!(invoice.file_name(), "INV-20240305-0042.pdf");
    assert_eq!(invoice.pages.len(), 1);

    let page = texts(&invoice.pages[0]);
    // Rate falls back to the product price; code and brand fall back to placeholders.
    for expected in [
        "1 Litre",
        "Air Filter",
        "N/A",
        "Generic",
        "Spark Plug",
        "₹810.00",
        "₹150.00",
        "₹302.00",
        "-₹90.00",
        "₹1262.00",
        "Amount in words: Rupees One Thousand Two Hundred Sixty Two Only",
    ] {
        assert!(page.contains(&expected), "missing {expected:?}");
    }
    assert!(!page.contains(&"NA"));

    let pdf = render_pdf(&invoice, None).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn long_orders_paginate_and_still_render() {
    let mut orders: Vec<Order> = parse_orders(FIXTURE).unwrap();
    let template: OrderItem = orders[0].order_items.as_ref().unwrap()[0].clone();
    orders[0].order_items = Some(vec![template; 70]);

    let company = CompanyProfile::embedded().unwrap();
    let ctx = LayoutContext {
        company: &company,
        issued_on: date!(2024 - 03 - 05),
    };
    let invoice = layout(&orders, InvoiceType::Sale, &ctx).unwrap();

    assert!(invoice.pages.len() >= 2);
    for page in &invoice.pages[1..] {
        let page_texts = texts(page);
        if page_texts.contains(&"Engine Oil 5W-30 Fully") {
            // Continuation pages open with the column heads.
            assert_eq!(page_texts.first(), Some(&"S.No."));
        }
    }
    assert!(invoice
        .pages
        .last()
        .unwrap()
        .contains_text("Authorized Signatory"));

    // Same inputs, same instructions.
    assert_eq!(invoice, layout(&orders, InvoiceType::Sale, &ctx).unwrap());

    let pdf = render_pdf(&invoice, None).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn layout_serializes_for_inspection() {
    let orders = parse_orders(FIXTURE).unwrap();
    let company = CompanyProfile::embedded().unwrap();
    let ctx = LayoutContext {
        company: &company,
        issued_on: date!(2024 - 03 - 05),
    };
    let invoice = layout(&orders, InvoiceType::Sale, &ctx).unwrap();

    let json = serde_json::to_value(&invoice).unwrap();
    assert_eq!(json["invoiceNumber"], "INV-20240305-0042");
    assert_eq!(json["invoiceType"], "SALE");
    assert_eq!(json["pages"][0]["number"], 1);
    assert!(json["pages"][0]["ops"]
        .as_array()
        .unwrap()
        .iter()
        .any(|op| op["op"] == "rect"));
}
