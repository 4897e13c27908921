use clap::{Parser, ValueEnum};
use sheetlink_core::{ColumnLayout, SheetRange};
use sheetlink_gateway::telemetry::LogFormat;
use sheetlink_mapping::DuplicatePolicy;
use sheetlink_storage::sheets::{DEFAULT_API_BASE, SPREADSHEETS_SCOPE};
use sheetlink_storage::ValueInputOption;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "SHEETLINK_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "SHEETLINK_STORAGE_BACKEND";
pub const DUPLICATE_POLICY_ENV: &str = "SHEETLINK_DUPLICATE_POLICY";
pub const COLUMN_ORDER_ENV: &str = "SHEETLINK_COLUMN_ORDER";
pub const LOG_FORMAT_ENV: &str = "SHEETLINK_LOG_FORMAT";
pub const SPREADSHEET_ID_ENV: &str = "SHEETLINK_SPREADSHEET_ID";
pub const RANGE_ENV: &str = "SHEETLINK_RANGE";
pub const VALUE_INPUT_ENV: &str = "SHEETLINK_VALUE_INPUT";
pub const SHEETS_API_BASE_ENV: &str = "SHEETLINK_SHEETS_API_BASE";
pub const ACCESS_TOKEN_ENV: &str = "SHEETLINK_SHEETS_ACCESS_TOKEN";
pub const CREDENTIALS_FILE_ENV: &str = "SHEETLINK_CREDENTIALS_FILE";
pub const CLIENT_EMAIL_ENV: &str = "SHEETLINK_GCP_CLIENT_EMAIL";
pub const CLIENT_ID_ENV: &str = "SHEETLINK_GCP_CLIENT_ID";
pub const PRIVATE_KEY_ENV: &str = "SHEETLINK_GCP_PRIVATE_KEY";
pub const TOKEN_URI_ENV: &str = "SHEETLINK_TOKEN_URI";
pub const SCOPE_ENV: &str = "SHEETLINK_SCOPE";
pub const REQUEST_TIMEOUT_ENV: &str = "SHEETLINK_REQUEST_TIMEOUT_SECS";
pub const MYSQL_DSN_ENV: &str = "SHEETLINK_MYSQL_DSN";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_RANGE: &str = "Sheet1!A2:C";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "sheets")]
    Sheets,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Sheets => write!(f, "sheets"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicyArg {
    #[value(name = "allow")]
    Allow,
    #[value(name = "reject")]
    Reject,
}

impl From<DuplicatePolicyArg> for DuplicatePolicy {
    fn from(value: DuplicatePolicyArg) -> Self {
        match value {
            DuplicatePolicyArg::Allow => DuplicatePolicy::Allow,
            DuplicatePolicyArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColumnOrderArg {
    /// Column A short url, column B long url.
    #[value(name = "short-first")]
    ShortFirst,
    /// Column A long url, column B short url.
    #[value(name = "long-first")]
    LongFirst,
}

impl From<ColumnOrderArg> for ColumnLayout {
    fn from(value: ColumnOrderArg) -> Self {
        match value {
            ColumnOrderArg::ShortFirst => ColumnLayout::SHORT_FIRST,
            ColumnOrderArg::LongFirst => ColumnLayout::LONG_FIRST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueInputArg {
    #[value(name = "raw")]
    Raw,
    #[value(name = "user-entered")]
    UserEntered,
}

impl From<ValueInputArg> for ValueInputOption {
    fn from(value: ValueInputArg) -> Self {
        match value {
            ValueInputArg::Raw => ValueInputOption::Raw,
            ValueInputArg::UserEntered => ValueInputOption::UserEntered,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sheetlink-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DUPLICATE_POLICY_ENV, value_enum, default_value = "allow")]
    pub duplicates: DuplicatePolicyArg,

    #[arg(long, env = COLUMN_ORDER_ENV, value_enum, default_value = "short-first")]
    pub column_order: ColumnOrderArg,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, env = SPREADSHEET_ID_ENV, required_if_eq("storage", "sheets"))]
    pub spreadsheet_id: Option<String>,

    #[arg(long, env = RANGE_ENV, default_value = DEFAULT_RANGE)]
    pub range: SheetRange,

    #[arg(long, env = VALUE_INPUT_ENV, value_enum, default_value = "raw")]
    pub value_input: ValueInputArg,

    #[arg(long, env = SHEETS_API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    pub sheets_api_base: String,

    /// Pre-issued bearer token; skips the service account exchange.
    #[arg(long, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Service account JSON key file.
    #[arg(long, env = CREDENTIALS_FILE_ENV)]
    pub credentials_file: Option<PathBuf>,

    #[arg(long, env = CLIENT_EMAIL_ENV)]
    pub client_email: Option<String>,

    #[arg(long, env = CLIENT_ID_ENV)]
    pub client_id: Option<String>,

    #[arg(long, env = PRIVATE_KEY_ENV, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Overrides the token endpoint named in the key.
    #[arg(long, env = TOKEN_URI_ENV)]
    pub token_uri: Option<String>,

    #[arg(long, env = SCOPE_ENV, value_delimiter = ',', default_value = SPREADSHEETS_SCOPE)]
    pub scope: Vec<String>,

    #[arg(long, env = REQUEST_TIMEOUT_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,
}
