//! Sequential invoice layout.
//!
//! Every section reads the shared [`LayoutCursor`], emits its drawing
//! primitives onto the current page and advances the cursor. The cursor only
//! moves down, except when a page break resets it to the continuation margin.

use serde::Serialize;
use time::Date;
use tracing::{debug, info};

use super::draw_op::FontWeight::{self, Bold, Italic, Normal};
use super::draw_op::TextAlign::{self, Center, Left, Right};
use super::draw_op::{DrawOp, PageLayout, Rgb8, PAGE_H};
use super::format::{
    amount_in_words, format_currency, format_date, format_day_month_year, invoice_number,
    line_amount, total_discount, wrap_text_lines,
};
use super::invoice_labels::{invoice_labels, InvoiceLabels};
use crate::config::CompanyProfile;
use crate::error::{InvoiceError, Result};
use crate::model::{InvoiceType, Order, OrderItem, Party};

const PRIMARY: Rgb8 = Rgb8(41, 128, 185);
const SECONDARY: Rgb8 = Rgb8(52, 73, 94);
const LIGHT_GRAY: Rgb8 = Rgb8(245, 245, 245);
const BORDER: Rgb8 = Rgb8(189, 195, 199);
const ORANGE: Rgb8 = Rgb8(230, 126, 34);
const GREEN: Rgb8 = Rgb8(46, 204, 113);
const STRIPE: Rgb8 = Rgb8(250, 250, 250);
const TABLE_HEAD_FILL: Rgb8 = Rgb8(240, 240, 240);
const MUTED: Rgb8 = Rgb8(128, 128, 128);
const SUMMARY_FILL: Rgb8 = Rgb8(248, 249, 250);
const TERMS_FILL: Rgb8 = Rgb8(252, 252, 252);

const MARGIN_X: f32 = 20.0;
const CONTENT_W: f32 = 170.0;
const CENTER_X: f32 = 105.0;

const FIRST_PAGE_TOP: f32 = 15.0;
const CONTINUATION_TOP: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 10.0;

const TERMS_BREAK_Y: f32 = 240.0;
/// Heading, clause box and the gap below it.
const TERMS_BLOCK_H: f32 = 39.0;
const FOOTER_FROM_BOTTOM: f32 = 35.0;

const PARTY_HEADING_H: f32 = 7.0;
const PARTY_BOX_H: f32 = 32.0;
const PARTY_ADDRESS_CHARS: usize = 34;

const TABLE_BANNER_H: f32 = 8.0;
const TABLE_HEAD_H: f32 = 9.0;
const BODY_LINE_H: f32 = 3.0;
const BODY_PAD_Y: f32 = 2.0;
const CELL_PAD_X: f32 = 2.0;
/// Keeps the tallest row well inside one continuation page.
const MAX_CELL_LINES: usize = 12;

const SUMMARY_H: f32 = 36.0;

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    weight: FontWeight,
    color: Rgb8,
    align: TextAlign,
}

impl TextStyle {
    const fn new(size: f32, weight: FontWeight, color: Rgb8, align: TextAlign) -> Self {
        Self {
            size,
            weight,
            color,
            align,
        }
    }

    const fn colored(self, color: Rgb8) -> Self {
        Self { color, ..self }
    }

    const fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }
}

const TITLE: TextStyle = TextStyle::new(24.0, Bold, PRIMARY, Center);
const COMPANY_NAME: TextStyle = TextStyle::new(16.0, Bold, SECONDARY, Center);
const COMPANY_LINE: TextStyle = TextStyle::new(9.0, Normal, SECONDARY, Center);
const COMPANY_CONTACT: TextStyle = TextStyle::new(8.0, Normal, SECONDARY, Center);
const BADGE: TextStyle = TextStyle::new(8.0, Bold, Rgb8::WHITE, Center);
const META_LABEL: TextStyle = TextStyle::new(9.0, Bold, SECONDARY, Left);
const META_VALUE: TextStyle = TextStyle::new(9.0, Normal, PRIMARY, Left);
const SECTION_HEADING: TextStyle = TextStyle::new(9.0, Bold, Rgb8::WHITE, Center);
const PARTY_NAME: TextStyle = TextStyle::new(9.0, Bold, SECONDARY, Left);
const PARTY_LINE: TextStyle = TextStyle::new(8.0, Normal, SECONDARY, Left);
const DETAIL_LABEL: TextStyle = TextStyle::new(8.0, Bold, SECONDARY, Left);
const DETAIL_VALUE: TextStyle = TextStyle::new(8.0, Normal, PRIMARY, Left);
const TABLE_BANNER: TextStyle = TextStyle::new(10.0, Bold, Rgb8::WHITE, Center);
const TABLE_HEAD: TextStyle = TextStyle::new(8.0, Bold, SECONDARY, Center);
const TABLE_BODY: TextStyle = TextStyle::new(7.0, Normal, Rgb8::BLACK, Left);
const SUMMARY_LABEL: TextStyle = TextStyle::new(8.0, Normal, SECONDARY, Left);
const GRAND_TOTAL: TextStyle = TextStyle::new(10.0, Bold, Rgb8::WHITE, Left);
const AMOUNT_WORDS: TextStyle = TextStyle::new(8.0, Italic, SECONDARY, Left);
const TERMS_HEADING: TextStyle = TextStyle::new(9.0, Bold, Rgb8::WHITE, Left);
const TERMS_LINE: TextStyle = TextStyle::new(7.0, Normal, SECONDARY, Left);
const SIGNATURE: TextStyle = TextStyle::new(8.0, Normal, SECONDARY, Center);
const DISCLAIMER: TextStyle = TextStyle::new(6.0, Normal, MUTED, Center);
const THANK_YOU: TextStyle = TextStyle::new(8.0, Bold, PRIMARY, Center);

/// Inputs besides the orders themselves.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub company: &'a CompanyProfile,
    /// Stamped as the invoice date and embedded in the invoice number.
    pub issued_on: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLayout {
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub pages: Vec<PageLayout>,
}

impl InvoiceLayout {
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.invoice_number)
    }
}

/// Running vertical offset plus the pages emitted so far.
#[derive(Debug)]
pub struct LayoutCursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl LayoutCursor {
    fn new(top: f32) -> Self {
        Self {
            pages: vec![PageLayout::new(1)],
            y: top,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn advance(&mut self, dy: f32) {
        debug_assert!(dy >= 0.0, "layout cursor only moves down");
        self.y += dy;
    }

    fn remaining(&self) -> f32 {
        PAGE_H - BOTTOM_MARGIN - self.y
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(PageLayout::new(number));
        self.y = CONTINUATION_TOP;
        debug!(page = number, "starting continuation page");
    }

    /// Breaks to a new page when `height` no longer fits above the bottom margin.
    fn ensure_space(&mut self, height: f32) -> bool {
        if height > self.remaining() {
            self.break_page();
            true
        } else {
            false
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            size: style.size,
            weight: style.weight,
            color: style.color,
            align: style.align,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, fill: Rgb8) {
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            radius,
            fill: Some(fill),
            stroke: None,
            line_width: 0.0,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn framed_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Rgb8>,
        stroke: Rgb8,
        line_width: f32,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            radius,
            fill,
            stroke: Some(stroke),
            line_width,
        });
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, color: Rgb8, width: f32) {
        self.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            color,
            width,
        });
    }

    fn into_pages(self) -> Vec<PageLayout> {
        self.pages
    }
}

/// Lays out one invoice covering every order in `orders`.
pub fn layout(orders: &[Order], invoice_type: InvoiceType, ctx: &LayoutContext<'_>) -> Result<InvoiceLayout> {
    let primary = validate(orders, invoice_type)?;
    let labels = invoice_labels(invoice_type)?;
    let number = invoice_number(primary.order_id, invoice_type, ctx.issued_on);

    let mut cursor = LayoutCursor::new(FIRST_PAGE_TOP);
    add_header(&mut cursor, invoice_type, &labels, ctx.company);
    add_invoice_details(&mut cursor, &number, &labels, ctx.issued_on);
    add_party_block(&mut cursor, primary, invoice_type, &labels, ctx.company);
    let rows = add_items_table(&mut cursor, orders, &labels);
    add_summary(&mut cursor, orders, &labels);
    add_terms(&mut cursor, &labels);
    add_footer(&mut cursor, &labels);

    let pages = cursor.into_pages();
    info!(
        invoice_number = %number,
        invoice_type = invoice_type.as_str(),
        orders = orders.len(),
        rows,
        pages = pages.len(),
        "invoice laid out"
    );

    Ok(InvoiceLayout {
        invoice_number: number,
        invoice_type,
        pages,
    })
}

fn validate(orders: &[Order], invoice_type: InvoiceType) -> Result<&Order> {
    let primary = orders
        .first()
        .ok_or_else(|| InvoiceError::malformed("at least one order is required"))?;

    for order in orders {
        if order.invoice_type() != invoice_type {
            return Err(InvoiceError::malformed(format!(
                "order {} is a {} order but the invoice is {}",
                order.order_id,
                order.invoice_type().as_str(),
                invoice_type.as_str()
            )));
        }
        let items = order.order_items.as_ref().ok_or_else(|| {
            InvoiceError::malformed(format!("order {} has no item list", order.order_id))
        })?;
        if let Some(pos) = items.iter().position(|item| item.product_dto.is_none()) {
            return Err(InvoiceError::malformed(format!(
                "order {} item {} has no product",
                order.order_id,
                pos + 1
            )));
        }
    }

    Ok(primary)
}

fn add_header(
    cursor: &mut LayoutCursor,
    invoice_type: InvoiceType,
    labels: &InvoiceLabels,
    company: &CompanyProfile,
) {
    let common = labels.common;

    cursor.text(&labels.kind.title, CENTER_X, cursor.y(), TITLE);
    cursor.advance(10.0);

    cursor.text(&company.name, CENTER_X, cursor.y(), COMPANY_NAME);
    cursor.advance(8.0);

    cursor.rule(60.0, 150.0, cursor.y(), PRIMARY, 0.8);
    cursor.advance(8.0);

    cursor.text(&company.address, CENTER_X, cursor.y(), COMPANY_LINE);
    cursor.advance(4.0);
    cursor.text(&company.city, CENTER_X, cursor.y(), COMPANY_LINE);
    cursor.advance(6.0);

    let (left_x, right_x) = (70.0, 140.0);
    let y = cursor.y();
    cursor.text(format!("{}: {}", common.phone_label, company.phone), left_x, y, COMPANY_CONTACT);
    cursor.text(format!("{}: {}", common.gstin_label, company.gstin), right_x, y, COMPANY_CONTACT);
    cursor.advance(4.0);

    let y = cursor.y();
    cursor.text(format!("{}: {}", common.email_label, company.email), left_x, y, COMPANY_CONTACT);
    cursor.text(format!("{}: {}", common.website_label, company.website), right_x, y, COMPANY_CONTACT);
    cursor.advance(8.0);

    // Type badge, pinned to the top-right corner of the first page.
    let badge_color = match invoice_type {
        InvoiceType::Sale => GREEN,
        InvoiceType::Purchase => ORANGE,
    };
    let (badge_w, badge_h) = (25.0, 8.0);
    cursor.fill_rect(190.0 - badge_w, 10.0, badge_w, badge_h, 2.0, badge_color);
    cursor.text(invoice_type.as_str(), 190.0 - badge_w / 2.0, 15.5, BADGE);

    cursor.rule(MARGIN_X, MARGIN_X + CONTENT_W, cursor.y(), PRIMARY, 0.5);
    cursor.advance(8.0);
}

fn add_invoice_details(cursor: &mut LayoutCursor, number: &str, labels: &InvoiceLabels, issued_on: Date) {
    let y = cursor.y();
    cursor.framed_rect(MARGIN_X, y, CONTENT_W, 12.0, 0.0, Some(LIGHT_GRAY), BORDER, 0.3);

    cursor.text(&labels.kind.invoice_number_label, 25.0, y + 4.0, META_LABEL);
    cursor.text(number, 25.0, y + 8.0, META_VALUE);

    cursor.text(&labels.common.invoice_date_label, 140.0, y + 4.0, META_LABEL);
    cursor.text(format_day_month_year(issued_on), 140.0, y + 8.0, META_VALUE);

    cursor.advance(18.0);
}

/// Bill-to / ship-to (sale) or supplier / billed-to (purchase) columns.
/// Leaves the cursor untouched when the order has no party.
fn add_party_block(
    cursor: &mut LayoutCursor,
    order: &Order,
    invoice_type: InvoiceType,
    labels: &InvoiceLabels,
    company: &CompanyProfile,
) {
    let Some(party) = order.party() else {
        return;
    };

    let (first_fill, second_fill, accent) = match invoice_type {
        InvoiceType::Sale => (PRIMARY, PRIMARY, PRIMARY),
        InvoiceType::Purchase => (ORANGE, PRIMARY, ORANGE),
    };
    let kind = labels.kind;

    let y = cursor.y();
    cursor.fill_rect(20.0, y, 55.0, PARTY_HEADING_H, 1.0, first_fill);
    cursor.text(&kind.party_heading, 47.5, y + 4.5, SECTION_HEADING);
    cursor.fill_rect(80.0, y, 55.0, PARTY_HEADING_H, 1.0, second_fill);
    cursor.text(&kind.second_heading, 107.5, y + 4.5, SECTION_HEADING);
    cursor.fill_rect(140.0, y, 50.0, PARTY_HEADING_H, 1.0, first_fill);
    cursor.text(&kind.details_heading, 165.0, y + 4.5, SECTION_HEADING);
    cursor.advance(PARTY_HEADING_H);

    let y = cursor.y();
    party_box(cursor, party, 20.0, y, labels);
    match invoice_type {
        InvoiceType::Sale => party_box(cursor, party, 80.0, y, labels),
        InvoiceType::Purchase => company_box(cursor, company, 80.0, y, labels),
    }
    details_box(cursor, order, 140.0, y, labels, accent);

    cursor.advance(PARTY_BOX_H + 6.0);
}

fn party_box(cursor: &mut LayoutCursor, party: &Party, x: f32, y: f32, labels: &InvoiceLabels) {
    let common = labels.common;
    cursor.framed_rect(x, y, 55.0, PARTY_BOX_H, 1.0, Some(Rgb8::WHITE), BORDER, 0.3);
    cursor.text(&party.name, x + 3.0, y + 6.0, PARTY_NAME);

    if let Some(address) = party.address.as_deref().filter(|a| !a.trim().is_empty()) {
        // Three lines fit above the phone line.
        for (idx, line) in wrap_text_lines(address, PARTY_ADDRESS_CHARS).into_iter().take(3).enumerate() {
            cursor.text(line, x + 3.0, y + 10.0 + 4.0 * idx as f32, PARTY_LINE);
        }
    }

    let phone = party
        .contact_number
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(common.not_available.as_str());
    cursor.text(format!("{}: {}", common.phone_label, phone), x + 3.0, y + 22.0, PARTY_LINE);

    if let Some(email) = party.email.as_deref().filter(|e| !e.trim().is_empty()) {
        cursor.text(format!("{}: {}", common.email_label, email), x + 3.0, y + 26.0, PARTY_LINE);
    }
}

fn company_box(cursor: &mut LayoutCursor, company: &CompanyProfile, x: f32, y: f32, labels: &InvoiceLabels) {
    cursor.framed_rect(x, y, 55.0, PARTY_BOX_H, 1.0, Some(Rgb8::WHITE), BORDER, 0.3);
    cursor.text(&company.name, x + 3.0, y + 6.0, PARTY_NAME);

    let mut line_y = y + 10.0;
    for line in wrap_text_lines(&company.address, PARTY_ADDRESS_CHARS).into_iter().take(2) {
        cursor.text(line, x + 3.0, line_y, PARTY_LINE);
        line_y += 4.0;
    }
    cursor.text(&company.city, x + 3.0, line_y, PARTY_LINE);
    cursor.text(
        format!("{}: {}", labels.common.gstin_label, company.gstin),
        x + 3.0,
        line_y + 4.0,
        PARTY_LINE,
    );
}

fn details_box(cursor: &mut LayoutCursor, order: &Order, x: f32, y: f32, labels: &InvoiceLabels, accent: Rgb8) {
    let kind = labels.kind;
    let value = DETAIL_VALUE.colored(accent);
    cursor.framed_rect(x, y, 50.0, PARTY_BOX_H, 1.0, Some(Rgb8::WHITE), BORDER, 0.3);

    cursor.text(&kind.order_id_label, x + 3.0, y + 6.0, DETAIL_LABEL);
    cursor.text(format!("{}{}", kind.order_id_prefix, order.order_id), x + 3.0, y + 10.0, value);

    cursor.text(&kind.order_date_label, x + 3.0, y + 15.0, DETAIL_LABEL);
    cursor.text(
        format_date(order.created_at.as_deref().unwrap_or("")),
        x + 3.0,
        y + 19.0,
        value,
    );

    cursor.text(&labels.common.status_label, x + 3.0, y + 24.0, DETAIL_LABEL);
    cursor.text(
        order.order_status.clone().unwrap_or_default(),
        x + 3.0,
        y + 28.0,
        DETAIL_VALUE.colored(GREEN),
    );
}

#[derive(Debug, Clone, Copy)]
struct Column {
    width: f32,
    align: TextAlign,
    /// Character budget per wrapped line.
    wrap: usize,
}

const COLUMNS: [Column; 8] = [
    Column { width: 12.0, align: Center, wrap: 6 },
    Column { width: 45.0, align: Left, wrap: 30 },
    Column { width: 25.0, align: Center, wrap: 15 },
    Column { width: 20.0, align: Center, wrap: 11 },
    Column { width: 12.0, align: Center, wrap: 6 },
    Column { width: 20.0, align: Right, wrap: 12 },
    Column { width: 12.0, align: Center, wrap: 6 },
    Column { width: 24.0, align: Right, wrap: 14 },
];

const DISCOUNT_COL: usize = 6;
const AMOUNT_COL: usize = 7;

#[derive(Debug, Clone)]
struct TableRow {
    cells: [Vec<String>; 8],
    discounted: bool,
}

impl TableRow {
    fn build(serial: usize, item: &OrderItem, labels: &InvoiceLabels) -> Self {
        let common = labels.common;
        let product = item.product_dto.clone().unwrap_or_default();
        let rate = item.rate();
        let discount = product.discount_percent();

        let mut description = wrap_text_lines(&product.name, COLUMNS[1].wrap);
        if let Some(attribute) = product.display_attribute() {
            description.extend(wrap_text_lines(attribute, COLUMNS[1].wrap));
        }
        let description = clamp_lines(description, COLUMNS[1].wrap);

        let code = product
            .product_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(common.not_available.as_str());
        let brand = product
            .brand_name
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(common.generic_brand.as_str());

        let cell = |text: String, col: usize| clamp_lines(wrap_text_lines(&text, COLUMNS[col].wrap), COLUMNS[col].wrap);

        TableRow {
            cells: [
                vec![serial.to_string()],
                description,
                cell(code.to_string(), 2),
                cell(brand.to_string(), 3),
                vec![item.quantity.to_string()],
                vec![format_currency(rate)],
                vec![format!("{}%", discount)],
                vec![format_currency(line_amount(rate, item.quantity, discount))],
            ],
            discounted: discount > 0.0,
        }
    }

    fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }

    fn height(&self) -> f32 {
        self.line_count() as f32 * BODY_LINE_H + 2.0 * BODY_PAD_Y
    }
}

/// Cuts a wrapped cell to `MAX_CELL_LINES`, marking the cut with "...".
fn clamp_lines(mut lines: Vec<String>, max_chars: usize) -> Vec<String> {
    if lines.len() <= MAX_CELL_LINES {
        return lines;
    }
    lines.truncate(MAX_CELL_LINES);
    if let Some(last) = lines.last_mut() {
        let keep = max_chars.saturating_sub(3);
        *last = format!("{}...", last.chars().take(keep).collect::<String>().trim_end());
    }
    lines
}

fn column_lefts() -> [f32; 8] {
    let mut lefts = [0.0; 8];
    let mut x = MARGIN_X;
    for (idx, col) in COLUMNS.iter().enumerate() {
        lefts[idx] = x;
        x += col.width;
    }
    lefts
}

fn anchor_x(left: f32, col: &Column) -> f32 {
    match col.align {
        Left => left + CELL_PAD_X,
        Center => left + col.width / 2.0,
        Right => left + col.width - CELL_PAD_X,
    }
}

fn add_items_table(cursor: &mut LayoutCursor, orders: &[Order], labels: &InvoiceLabels) -> usize {
    let rows: Vec<TableRow> = orders
        .iter()
        .flat_map(|order| order.order_items.iter().flatten())
        .enumerate()
        .map(|(idx, item)| TableRow::build(idx + 1, item, labels))
        .collect();

    // Keep the banner together with the column heads and one row.
    cursor.ensure_space(TABLE_BANNER_H + 4.0 + TABLE_HEAD_H + BODY_LINE_H + 2.0 * BODY_PAD_Y);

    let y = cursor.y();
    cursor.fill_rect(MARGIN_X, y, CONTENT_W, TABLE_BANNER_H, 1.0, SECONDARY);
    cursor.text(&labels.kind.items_heading, CENTER_X, y + 5.5, TABLE_BANNER);
    cursor.advance(TABLE_BANNER_H + 4.0);

    draw_table_head(cursor, labels);

    for (idx, row) in rows.iter().enumerate() {
        let height = row.height();
        if cursor.ensure_space(height) {
            draw_table_head(cursor, labels);
        }
        draw_table_row(cursor, row, idx);
        cursor.advance(height);
    }

    cursor.advance(8.0);
    rows.len()
}

fn draw_table_head(cursor: &mut LayoutCursor, labels: &InvoiceLabels) {
    let common = labels.common;
    let heads = [
        common.col_serial.as_str(),
        common.col_description.as_str(),
        common.col_code.as_str(),
        common.col_brand.as_str(),
        common.col_qty.as_str(),
        labels.kind.rate_heading.as_str(),
        common.col_discount.as_str(),
        common.col_amount.as_str(),
    ];

    let y = cursor.y();
    for ((left, col), head) in column_lefts().into_iter().zip(COLUMNS.iter()).zip(heads) {
        cursor.framed_rect(left, y, col.width, TABLE_HEAD_H, 0.0, Some(TABLE_HEAD_FILL), BORDER, 0.2);
        cursor.text(head, left + col.width / 2.0, y + 5.8, TABLE_HEAD);
    }
    cursor.advance(TABLE_HEAD_H);
}

fn draw_table_row(cursor: &mut LayoutCursor, row: &TableRow, idx: usize) {
    let y = cursor.y();
    let height = row.height();
    let lines = row.line_count();
    let fill = (idx % 2 == 1).then_some(STRIPE);

    for (col_idx, (left, col)) in column_lefts().into_iter().zip(COLUMNS.iter()).enumerate() {
        cursor.framed_rect(left, y, col.width, height, 0.0, fill, BORDER, 0.2);

        let mut style = TextStyle { align: col.align, ..TABLE_BODY };
        if col_idx == AMOUNT_COL {
            style = style.bold().colored(PRIMARY);
        } else if col_idx == DISCOUNT_COL && row.discounted {
            style = style.bold().colored(ORANGE);
        }

        // Vertically centre shorter cells against the tallest one.
        let cell = &row.cells[col_idx];
        let offset = (lines - cell.len()) as f32 * BODY_LINE_H / 2.0;
        for (line_idx, line) in cell.iter().enumerate() {
            let baseline = y + BODY_PAD_Y + offset + BODY_LINE_H * (line_idx as f32 + 0.8);
            cursor.text(line.clone(), anchor_x(left, col), baseline, style);
        }
    }
}

fn add_summary(cursor: &mut LayoutCursor, orders: &[Order], labels: &InvoiceLabels) {
    let common = labels.common;
    let discount = total_discount(orders.iter().flat_map(|o| o.order_items.iter().flatten()));
    // The stored order totals are authoritative; they are not recomputed from the rows.
    let grand_total: f64 = orders.iter().map(|o| o.total_price.unwrap_or(0.0)).sum();

    cursor.ensure_space(SUMMARY_H);

    let (summary_x, summary_w) = (120.0, 70.0);
    let y = cursor.y();
    cursor.framed_rect(summary_x - 5.0, y - 5.0, summary_w + 10.0, 35.0, 2.0, Some(SUMMARY_FILL), BORDER, 0.3);

    if discount > 0.0 {
        let y = cursor.y();
        cursor.text(&common.total_discount, summary_x, y, SUMMARY_LABEL);
        cursor.text(
            format!("-{}", format_currency(discount)),
            summary_x + summary_w,
            y,
            TextStyle { align: Right, ..SUMMARY_LABEL.colored(ORANGE) },
        );
        cursor.advance(6.0);
    }

    let y = cursor.y();
    cursor.framed_rect(summary_x, y, summary_w, 10.0, 2.0, Some(PRIMARY), PRIMARY, 0.5);
    cursor.text(&common.grand_total, summary_x + 3.0, y + 6.5, GRAND_TOTAL);
    cursor.text(
        format_currency(grand_total),
        summary_x + summary_w - 3.0,
        y + 6.5,
        TextStyle { align: Right, ..GRAND_TOTAL },
    );
    cursor.advance(15.0);

    let y = cursor.y();
    cursor.fill_rect(MARGIN_X, y, CONTENT_W, 8.0, 1.0, LIGHT_GRAY);
    cursor.text(
        format!("{}: {}", common.amount_in_words, amount_in_words(grand_total)),
        25.0,
        y + 5.5,
        AMOUNT_WORDS,
    );
    cursor.advance(15.0);
}

fn add_terms(cursor: &mut LayoutCursor, labels: &InvoiceLabels) {
    let footer_top = PAGE_H - FOOTER_FROM_BOTTOM;
    if cursor.y() > TERMS_BREAK_Y || cursor.y() + TERMS_BLOCK_H > footer_top {
        cursor.break_page();
    }

    let y = cursor.y();
    cursor.fill_rect(MARGIN_X, y, CONTENT_W, 7.0, 1.0, SECONDARY);
    cursor.text(&labels.common.terms_heading, 25.0, y + 5.0, TERMS_HEADING);
    cursor.advance(7.0);

    let y = cursor.y();
    cursor.framed_rect(MARGIN_X, y, CONTENT_W, 25.0, 1.0, Some(TERMS_FILL), BORDER, 0.3);
    for (idx, clause) in labels.kind.terms.iter().enumerate() {
        cursor.text(clause, 25.0, y + 5.0 + 4.0 * idx as f32, TERMS_LINE);
    }
    cursor.advance(32.0);
}

/// Signatures and closing lines, anchored to the bottom of the last page.
fn add_footer(cursor: &mut LayoutCursor, labels: &InvoiceLabels) {
    let kind = labels.kind;
    let y = PAGE_H - FOOTER_FROM_BOTTOM;

    cursor.rule(30.0, 90.0, y, BORDER, 0.3);
    cursor.rule(120.0, 180.0, y, BORDER, 0.3);
    cursor.text(&kind.left_signature, 60.0, y + 5.0, SIGNATURE);
    cursor.text(&kind.right_signature, 150.0, y + 5.0, SIGNATURE);

    cursor.text(&labels.common.disclaimer, CENTER_X, y + 12.0, DISCLAIMER);
    cursor.text(&kind.thank_you, CENTER_X, y + 17.0, THANK_YOU);
}
