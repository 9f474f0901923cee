use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvoiceError>;

/// Failures surfaced by invoice generation.
///
/// Each variant is reported once to the caller; nothing is retried.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Order data could not be fetched (transport error, non-success status, bad body).
    #[error("failed to fetch order data: {message}")]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    /// Caller handed over orders that cannot be laid out.
    #[error("malformed order data: {0}")]
    MalformedOrder(String),

    /// The document could not be serialized.
    #[error("failed to render invoice document: {0}")]
    Render(String),

    /// The document was built but the print surface failed.
    #[error("failed to print invoice: {0}")]
    Print(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InvoiceError {
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOrder(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn print(message: impl Into<String>) -> Self {
        Self::Print(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for InvoiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::fetch(err.status().map(|s| s.as_u16()), err.to_string())
    }
}
