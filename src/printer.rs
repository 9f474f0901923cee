use std::path::PathBuf;

use time::{Date, OffsetDateTime};
use tracing::{error, info};

use crate::config::{AppConfig, CompanyProfile};
use crate::error::Result;
use crate::invoice::{layout, render_pdf, InvoiceLayout, LayoutContext};
use crate::model::{InvoiceType, Order};
use crate::order_client::{OrderClient, OrderSource};
use crate::output::{save_to_file, PrintJob, PrintSurface, SystemPrintSurface};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Save the document instead of sending it to the print surface.
    pub force_download: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Download,
    DirectPrint,
}

impl DeliveryMode {
    pub fn select(options: PrintOptions, direct_print_supported: bool) -> Self {
        if options.force_download || !direct_print_supported {
            DeliveryMode::Download
        } else {
            DeliveryMode::DirectPrint
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceOutcome {
    Saved { invoice_number: String, path: PathBuf },
    Printing { invoice_number: String, job: PrintJob },
}

impl InvoiceOutcome {
    pub fn invoice_number(&self) -> &str {
        match self {
            InvoiceOutcome::Saved { invoice_number, .. } | InvoiceOutcome::Printing { invoice_number, .. } => {
                invoice_number
            }
        }
    }
}

/// Local calendar date, falling back to UTC when the offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Entry points that turn orders into a delivered invoice.
pub struct InvoicePrinter<S = OrderClient, P = SystemPrintSurface> {
    source: S,
    surface: P,
    company: CompanyProfile,
    output_dir: PathBuf,
    font_path: Option<PathBuf>,
    direct_print: bool,
}

impl InvoicePrinter {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            OrderClient::from_config(config)?,
            SystemPrintSurface::from_config(config),
            config,
        ))
    }
}

impl<S: OrderSource, P: PrintSurface> InvoicePrinter<S, P> {
    pub fn new(source: S, surface: P, config: &AppConfig) -> Self {
        Self {
            source,
            surface,
            company: config.company.clone(),
            output_dir: config.output_dir.clone(),
            font_path: config.font_path.clone(),
            direct_print: config.direct_print,
        }
    }

    /// Fetches one order and delivers its invoice.
    pub async fn print_invoice(&self, order_id: i64, options: PrintOptions) -> Result<InvoiceOutcome> {
        self.print_invoices(&[order_id], options).await
    }

    /// Fetches every order and delivers them as one combined invoice.
    pub async fn print_invoices(&self, order_ids: &[i64], options: PrintOptions) -> Result<InvoiceOutcome> {
        let orders = self
            .source
            .fetch_orders(order_ids)
            .await
            .inspect_err(|e| error!(?order_ids, error = %e, "could not fetch orders for invoice"))?;
        self.deliver(&orders, options)
            .await
            .inspect_err(|e| error!(?order_ids, error = %e, "invoice generation failed"))
    }

    /// Delivers an invoice for orders the caller already holds.
    pub async fn print_invoice_with_data(&self, orders: &[Order], options: PrintOptions) -> Result<InvoiceOutcome> {
        self.deliver(orders, options)
            .await
            .inspect_err(|e| error!(orders = orders.len(), error = %e, "invoice generation failed"))
    }

    /// Lays out and serializes without delivering.
    pub fn render(&self, orders: &[Order], issued_on: Date) -> Result<(InvoiceLayout, Vec<u8>)> {
        let invoice_type = orders.first().map(Order::invoice_type).unwrap_or(InvoiceType::Sale);
        let ctx = LayoutContext {
            company: &self.company,
            issued_on,
        };
        let layout = layout(orders, invoice_type, &ctx)?;
        let bytes = render_pdf(&layout, self.font_path.as_deref())?;
        Ok((layout, bytes))
    }

    async fn deliver(&self, orders: &[Order], options: PrintOptions) -> Result<InvoiceOutcome> {
        let (layout, bytes) = self.render(orders, today())?;
        let invoice_number = layout.invoice_number;

        match DeliveryMode::select(options, self.direct_print) {
            DeliveryMode::Download => {
                let path = save_to_file(&self.output_dir, &invoice_number, &bytes).await?;
                info!(
                    invoice = %invoice_number,
                    path = %path.display(),
                    "invoice downloaded; open the file to print it manually"
                );
                Ok(InvoiceOutcome::Saved { invoice_number, path })
            }
            DeliveryMode::DirectPrint => {
                let job = self.surface.submit(&bytes, &invoice_number).await?;
                Ok(InvoiceOutcome::Printing { invoice_number, job })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvoiceError;
    use crate::model::{OrderItem, Party, Product};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StaticOrders(HashMap<i64, Order>);

    #[async_trait]
    impl OrderSource for StaticOrders {
        async fn fetch_order(&self, order_id: i64) -> Result<Order> {
            self.0
                .get(&order_id)
                .cloned()
                .ok_or_else(|| InvoiceError::fetch(Some(404), format!("order {order_id} not found")))
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        submitted: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl PrintSurface for RecordingSurface {
        async fn submit(&self, document: &[u8], job_name: &str) -> Result<PrintJob> {
            if self.fail {
                return Err(InvoiceError::print("printer offline"));
            }
            self.submitted
                .lock()
                .unwrap()
                .push((job_name.to_string(), document.to_vec()));
            Ok(PrintJob {
                job_name: job_name.to_string(),
                document_path: PathBuf::from("/tmp/recorded.pdf"),
                release_after: Duration::from_secs(60),
            })
        }
    }

    fn order(id: i64) -> Order {
        Order {
            order_id: id,
            order_type: Some(InvoiceType::Sale),
            customer: Some(Party {
                name: "Ravi Motors".to_string(),
                ..Party::default()
            }),
            order_items: Some(vec![OrderItem {
                product_dto: Some(Product {
                    name: "Air filter".to_string(),
                    selling_price: Some(120.0),
                    ..Product::default()
                }),
                quantity: 2,
                ..OrderItem::default()
            }]),
            total_price: Some(240.0),
            ..Order::default()
        }
    }

    fn config(dir: &Path, direct_print: bool) -> AppConfig {
        let dir = dir.to_string_lossy().to_string();
        let direct = direct_print.to_string();
        AppConfig::from_lookup(move |key| match key {
            "INVOICE_OUTPUT_DIR" => Some(dir.clone()),
            "INVOICE_DIRECT_PRINT" => Some(direct.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn printer(
        dir: &Path,
        direct_print: bool,
        surface: RecordingSurface,
    ) -> InvoicePrinter<StaticOrders, RecordingSurface> {
        let orders = StaticOrders(HashMap::from([(42, order(42)), (43, order(43))]));
        InvoicePrinter::new(orders, surface, &config(dir, direct_print))
    }

    #[test]
    fn delivery_mode_honours_flag_and_capability() {
        let forced = PrintOptions { force_download: true };
        assert_eq!(DeliveryMode::select(PrintOptions::default(), true), DeliveryMode::DirectPrint);
        assert_eq!(DeliveryMode::select(forced, true), DeliveryMode::Download);
        assert_eq!(DeliveryMode::select(PrintOptions::default(), false), DeliveryMode::Download);
    }

    #[tokio::test]
    async fn direct_print_hands_the_pdf_to_the_surface() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), true, RecordingSurface::default());

        let outcome = p.print_invoice(42, PrintOptions::default()).await.unwrap();

        let InvoiceOutcome::Printing { invoice_number, job } = outcome else {
            panic!("expected a print job");
        };
        assert!(invoice_number.starts_with("INV-"));
        assert!(invoice_number.ends_with("-0042"));
        assert_eq!(job.job_name, invoice_number);

        let submitted = p.surface.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].1.starts_with(b"%PDF"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn force_download_saves_instead_of_printing() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), true, RecordingSurface::default());

        let outcome = p
            .print_invoice_with_data(&[order(7)], PrintOptions { force_download: true })
            .await
            .unwrap();

        let InvoiceOutcome::Saved { invoice_number, path } = outcome else {
            panic!("expected a saved file");
        };
        assert_eq!(path, dir.path().join(format!("{invoice_number}.pdf")));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        assert!(p.surface.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hosts_without_direct_print_always_download() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), false, RecordingSurface::default());

        let outcome = p.print_invoice(43, PrintOptions::default()).await.unwrap();
        assert!(matches!(outcome, InvoiceOutcome::Saved { .. }));
        assert!(outcome.invoice_number().ends_with("-0043"));
    }

    #[tokio::test]
    async fn batch_uses_first_order_for_the_number() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), true, RecordingSurface::default());

        let outcome = p.print_invoices(&[43, 42], PrintOptions::default()).await.unwrap();
        assert!(outcome.invoice_number().ends_with("-0043"));
    }

    #[tokio::test]
    async fn fetch_failure_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), false, RecordingSurface::default());

        let err = p.print_invoices(&[42, 99], PrintOptions::default()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::Fetch { status: Some(404), .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn malformed_data_is_rejected_before_delivery() {
        let dir = tempfile::tempdir().unwrap();
        let p = printer(dir.path(), false, RecordingSurface::default());

        let mut broken = order(1);
        broken.order_items = None;
        let err = p
            .print_invoice_with_data(&[broken], PrintOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::MalformedOrder(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn print_surface_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let surface = RecordingSurface {
            fail: true,
            ..RecordingSurface::default()
        };
        let p = printer(dir.path(), true, surface);

        let err = p.print_invoice(42, PrintOptions::default()).await.unwrap_err();
        assert!(matches!(err, InvoiceError::Print(_)));
    }
}
