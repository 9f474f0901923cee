use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};

/// Identity of the business issuing the invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub gstin: String,
}

static DEFAULT_COMPANY: OnceLock<std::result::Result<CompanyProfile, String>> = OnceLock::new();

impl CompanyProfile {
    /// Profile embedded from `shared/companyProfile.json`.
    pub fn embedded() -> Result<CompanyProfile> {
        let profile = DEFAULT_COMPANY.get_or_init(|| {
            let json = include_str!("../shared/companyProfile.json");
            serde_json::from_str::<CompanyProfile>(json)
                .map_err(|e| format!("failed to parse embedded shared/companyProfile.json: {e}"))
        });
        profile.clone().map_err(InvoiceError::Config)
    }

    pub fn from_file(path: &Path) -> Result<CompanyProfile> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InvoiceError::config(format!("cannot read company profile {}: {e}", path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            InvoiceError::config(format!("invalid company profile {}: {e}", path.display()))
        })
    }
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub output_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub print_command: String,
    pub print_cleanup: Duration,
    /// Whether the host can print directly; when false every invoice is downloaded instead.
    pub direct_print: bool,
    pub http_timeout: Duration,
    pub company: CompanyProfile,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let company = match var("INVOICE_COMPANY_FILE") {
            Some(path) => CompanyProfile::from_file(Path::new(&path))?,
            None => CompanyProfile::embedded()?,
        };

        Ok(AppConfig {
            api_base_url: var("INVOICE_API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            output_dir: PathBuf::from(var("INVOICE_OUTPUT_DIR").unwrap_or_else(|| ".".to_string())),
            font_path: var("INVOICE_FONT_PATH").map(PathBuf::from),
            print_command: var("INVOICE_PRINT_COMMAND").unwrap_or_else(|| "lp".to_string()),
            print_cleanup: Duration::from_secs(parse_u64(
                "INVOICE_PRINT_CLEANUP_SECS",
                var("INVOICE_PRINT_CLEANUP_SECS"),
                60,
            )?),
            direct_print: parse_bool("INVOICE_DIRECT_PRINT", var("INVOICE_DIRECT_PRINT"), true)?,
            http_timeout: Duration::from_secs(parse_u64(
                "INVOICE_HTTP_TIMEOUT_SECS",
                var("INVOICE_HTTP_TIMEOUT_SECS"),
                30,
            )?),
            company,
        })
    }
}

fn parse_u64(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| InvoiceError::config(format!("{key} must be a whole number of seconds, got '{v}'"))),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(InvoiceError::config(format!("{key} must be true or false, got '{other}'"))),
    }
}
