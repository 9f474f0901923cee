//! Invoice document pipeline: orders in, laid-out pages and PDF bytes out.

pub mod draw_op;
pub mod format;
pub mod invoice_labels;
pub mod invoice_layout;
pub mod pdf_writer;

pub use draw_op::{DrawOp, FontWeight, PageLayout, Rgb8, TextAlign, PAGE_H, PAGE_W};
pub use invoice_layout::{layout, InvoiceLayout, LayoutContext, LayoutCursor};
pub use pdf_writer::render_pdf;
