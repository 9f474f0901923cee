pub mod config;
pub mod error;
pub mod invoice;
pub mod model;
pub mod order_client;
pub mod output;
pub mod printer;
pub mod telemetry;

pub use config::{AppConfig, CompanyProfile};
pub use error::{InvoiceError, Result};
pub use invoice::{layout, render_pdf, InvoiceLayout, LayoutContext};
pub use model::{parse_orders, InvoiceType, Order, OrderItem, Party, Product};
pub use order_client::{OrderClient, OrderSource};
pub use output::{save_to_file, PrintJob, PrintSurface, SystemPrintSurface};
pub use printer::{DeliveryMode, InvoiceOutcome, InvoicePrinter, PrintOptions};
