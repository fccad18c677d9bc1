//! The autopilot router.
//!
//! [`Autopilot::decide`] is the pure decision function: given item names, a
//! settings snapshot, the rule table, and credential availability it returns a
//! [`RoutingOutcome`]. [`Autopilot::route`] wraps it with the settings load and
//! turns a failed load into [`RoutingOutcome::Error`] instead of propagating.
//!
//! Per item:
//!
//! 1. First rule (declaration order) whose keyword occurs in the name.
//! 2. Rule found, its toggle not `ON` → [`RouteKind::Skipped`].
//! 3. Toggle `ON`, vendor credential present → [`RouteKind::ApiSuccess`].
//! 4. Toggle `ON`, no credential → [`RouteKind::ManualRequired`].
//! 5. No rule → `AUTOPILOT_DEFAULT` decides, and the detail carries no kind.
//!
//! The global switch is checked before any item.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ports::SettingsStore;
use crate::{RuleTable, SettingKey, Settings, VendorCredentials};

/// Vendor label for unmatched items routed while `AUTOPILOT_DEFAULT` is on.
pub const DEFAULT_ROUTE_LABEL: &str = "Manual/Other";

/// Vendor label for unmatched items skipped while `AUTOPILOT_DEFAULT` is off.
pub const DEFAULT_SKIP_LABEL: &str = "Manual";

/// Reason reported when the global switch is off.
pub const GLOBAL_OFF_REASON: &str = "Global OFF";

/// Classification of a rule-matched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteKind {
    /// The vendor accepts automated orders and the item was handed over.
    ApiSuccess,
    /// The vendor is enabled but has no credential; a human must order it.
    ManualRequired,
    /// The vendor's toggle is off.
    Skipped,
}

/// Routing decision for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDetail {
    /// Item name as it appeared in the order.
    pub item: String,
    /// Vendor display name, or a default-route label.
    pub vendor: String,
    /// Human-readable status written into the ledger notes.
    pub status: String,
    /// Classification; `None` for items handled by the default toggle.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RouteKind>,
}

impl RoutingDetail {
    /// Ledger note for this item: `[<item> -> <vendor>: <status>]`.
    pub fn note(&self) -> String {
        format!("[{} -> {}: {}]", self.item, self.vendor, self.status)
    }
}

/// Result of routing a whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RoutingOutcome {
    /// Every item was examined.
    Processed {
        /// One entry per item, in order.
        details: Vec<RoutingDetail>,
    },
    /// The global switch is off; no item was examined.
    Skipped {
        /// Why routing was skipped.
        reason: String,
    },
    /// Routing could not run (e.g. the settings store was unreachable).
    Error {
        /// Description of the failure.
        error: String,
    },
}

impl RoutingOutcome {
    /// Per-item details; empty unless the outcome is `Processed`.
    pub fn details(&self) -> &[RoutingDetail] {
        match self {
            RoutingOutcome::Processed { details } => details,
            _ => &[],
        }
    }

    /// Returns `true` if any item needs a manual order.
    pub fn needs_manual(&self) -> bool {
        self.details()
            .iter()
            .any(|d| d.kind == Some(RouteKind::ManualRequired))
    }

    /// Returns `true` if any item was handed to a vendor API.
    pub fn any_api_success(&self) -> bool {
        self.details()
            .iter()
            .any(|d| d.kind == Some(RouteKind::ApiSuccess))
    }

    /// The error message when routing failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RoutingOutcome::Error { error } => Some(error),
            _ => None,
        }
    }

    /// Ledger notes: one line per routed item, then a critical line if
    /// routing failed.
    pub fn notes(&self) -> Vec<String> {
        let mut notes: Vec<String> = self.details().iter().map(RoutingDetail::note).collect();
        if let Some(error) = self.error_message() {
            notes.push(format!("CRITICAL ERROR: {error}"));
        }
        notes
    }
}

/// Rule table plus credential availability: everything the router needs
/// besides the per-request settings snapshot.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    rules: RuleTable,
    credentials: VendorCredentials,
}

impl Autopilot {
    /// Creates a router over `rules` with the given credential availability.
    pub fn new(rules: RuleTable, credentials: VendorCredentials) -> Self {
        Self { rules, credentials }
    }

    /// Routes `items` against `settings`. Pure: no I/O, no hidden state.
    pub fn decide<'a, I>(&self, items: I, settings: &Settings) -> RoutingOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !settings.global_enabled() {
            info!("global autopilot switch is off; skipping order");
            return RoutingOutcome::Skipped {
                reason: GLOBAL_OFF_REASON.to_string(),
            };
        }

        let details = items
            .into_iter()
            .map(|item| self.decide_item(item, settings))
            .collect();
        RoutingOutcome::Processed { details }
    }

    fn decide_item(&self, item: &str, settings: &Settings) -> RoutingDetail {
        let Some(rule) = self.rules.first_match(item) else {
            return if settings.is_on(SettingKey::DEFAULT) {
                debug!(item, "no rule matched; default autopilot on");
                RoutingDetail {
                    item: item.to_string(),
                    vendor: DEFAULT_ROUTE_LABEL.to_string(),
                    status: "Sent (Default)".to_string(),
                    kind: None,
                }
            } else {
                debug!(item, "no rule matched; default autopilot off");
                RoutingDetail {
                    item: item.to_string(),
                    vendor: DEFAULT_SKIP_LABEL.to_string(),
                    status: "Skipped (Default OFF)".to_string(),
                    kind: None,
                }
            };
        };

        let vendor = rule.vendor;
        let (status, kind) = if !settings.is_on(&rule.setting_key) {
            debug!(item, setting = %rule.setting_key, "vendor toggle off");
            ("Skipped (Setting OFF)".to_string(), RouteKind::Skipped)
        } else if self.credentials.has(vendor) {
            // Vendor dispatch is not wired up; credential presence is the
            // only capability check.
            info!(item, %vendor, "routed to vendor API");
            ("Sent via API".to_string(), RouteKind::ApiSuccess)
        } else {
            warn!(item, %vendor, "no API credential; flagging for manual order");
            (
                format!("⚠️ MANUAL ORDER: {vendor}"),
                RouteKind::ManualRequired,
            )
        };

        RoutingDetail {
            item: item.to_string(),
            vendor: vendor.display_name().to_string(),
            status,
            kind: Some(kind),
        }
    }

    /// Loads settings from `store` and routes `items`.
    ///
    /// Never fails: a settings load error becomes [`RoutingOutcome::Error`].
    pub async fn route<'a, I>(&self, store: &dyn SettingsStore, items: I) -> RoutingOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        match store.load_settings().await {
            Ok(settings) => self.decide(items, &settings),
            Err(err) => {
                warn!(error = %err, "autopilot could not load settings");
                RoutingOutcome::Error {
                    error: err.to_string(),
                }
            }
        }
    }
}
