//! Process configuration read from environment variables.

use std::net::SocketAddr;

use alerts::DEFAULT_RELAY_ENDPOINT;
use handlers::{AlertRecipients, DEFAULT_ALERT_EMAIL, DEFAULT_EMERGENCY_EMAIL};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_ORDERS_TABLE: &str = "Orders";
pub const DEFAULT_SETTINGS_TABLE: &str = "Settings";

/// Relay endpoint value that disables alert delivery.
const ALERTS_OFF: &str = "off";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ORDERPILOT_BIND '{value}' is not a socket address")]
    InvalidBind { value: String },

    #[error("ORDERPILOT_STORE '{value}' is not one of: memory, sheets")]
    UnknownStore { value: String },

    #[error("ORDERPILOT_LOG_FORMAT '{value}' is not one of: json, pretty")]
    UnknownLogFormat { value: String },

    #[error("{var} is required when ORDERPILOT_STORE=sheets")]
    MissingSheetsSetting { var: &'static str },
}

/// Where orders and settings are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process tables; contents are lost on exit.
    Memory,
    /// A Google spreadsheet.
    Sheets {
        spreadsheet_id: String,
        access_token: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub store: StoreBackend,
    pub orders_table: String,
    pub settings_table: String,
    /// `None` when alert delivery is switched off.
    pub alert_endpoint: Option<String>,
    pub recipients: AlertRecipients,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("ORDERPILOT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind { value: bind_raw })?;

        let sheet_id = get("GOOGLE_SHEET_ID");
        let store_kind = get("ORDERPILOT_STORE").unwrap_or_else(|| {
            if sheet_id.is_some() { "sheets" } else { "memory" }.to_string()
        });
        let store = match store_kind.to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "sheets" => StoreBackend::Sheets {
                spreadsheet_id: sheet_id.ok_or(ConfigError::MissingSheetsSetting {
                    var: "GOOGLE_SHEET_ID",
                })?,
                access_token: get("GOOGLE_ACCESS_TOKEN").ok_or(
                    ConfigError::MissingSheetsSetting {
                        var: "GOOGLE_ACCESS_TOKEN",
                    },
                )?,
            },
            _ => return Err(ConfigError::UnknownStore { value: store_kind }),
        };

        let log_format = match get("ORDERPILOT_LOG_FORMAT").as_deref() {
            None => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(v) => {
                return Err(ConfigError::UnknownLogFormat {
                    value: v.to_string(),
                })
            }
        };

        let alert_endpoint = match get("ORDERPILOT_ALERT_ENDPOINT") {
            Some(v) if v.eq_ignore_ascii_case(ALERTS_OFF) => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_RELAY_ENDPOINT.to_string()),
        };

        Ok(Self {
            bind,
            store,
            orders_table: get("ORDERPILOT_ORDERS_TABLE")
                .unwrap_or_else(|| DEFAULT_ORDERS_TABLE.to_string()),
            settings_table: get("ORDERPILOT_SETTINGS_TABLE")
                .unwrap_or_else(|| DEFAULT_SETTINGS_TABLE.to_string()),
            alert_endpoint,
            recipients: AlertRecipients {
                manual_action: get("ORDERPILOT_ALERT_EMAIL")
                    .unwrap_or_else(|| DEFAULT_ALERT_EMAIL.to_string()),
                emergency: get("ORDERPILOT_EMERGENCY_EMAIL")
                    .unwrap_or_else(|| DEFAULT_EMERGENCY_EMAIL.to_string()),
            },
            log_format,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
