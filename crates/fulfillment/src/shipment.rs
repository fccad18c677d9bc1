//! Shipment notices from print-on-demand vendors.
//!
//! Each provider posts its own payload shape. [`ShipmentNotice::classify`]
//! recognises the shape, and [`ShipmentNotice::normalize`] reduces every
//! variant to the same [`ShipmentUpdate`]: the storefront order id the vendor
//! echoes back, plus tracking number and carrier.
//!
//! Detection order matters because payloads are loosely typed:
//!
//! | Provider | Recognised by |
//! |----------|---------------|
//! | Printful | `type == "package_shipped"` with a `data.shipment` object |
//! | Printify | `topic == "order:shipment:created"` with a `resource` object |
//! | Gooten   | `ReferenceID` or `Properties.AccountReferenceId` |

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Vendor that sent a shipment notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentProvider {
    Printful,
    Printify,
    Gooten,
}

impl std::fmt::Display for ShipmentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Printful => "Printful",
            Self::Printify => "Printify",
            Self::Gooten => "Gooten",
        };
        f.write_str(name)
    }
}

/// Provider-independent content of a shipment notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentUpdate {
    pub provider: ShipmentProvider,
    /// Storefront order id the vendor echoed back. `None` when the payload
    /// carried none, in which case the notice cannot be applied.
    pub external_id: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider payloads
// ---------------------------------------------------------------------------

/// Printful `package_shipped` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulShipped {
    pub data: PrintfulData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulData {
    #[serde(default)]
    pub order: Option<ExternalRef>,
    pub shipment: PrintfulShipment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulShipment {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub carrier: Option<String>,
}

/// Printify `order:shipment:created` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintifyShipment {
    pub resource: PrintifyResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintifyResource {
    #[serde(default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub order: Option<ExternalRef>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub carrier: Option<String>,
}

/// Gooten order postback.
#[derive(Debug, Clone, Deserialize)]
pub struct GootenPostback {
    #[serde(rename = "ReferenceID", default, deserialize_with = "lenient_text")]
    pub reference_id: Option<String>,
    #[serde(rename = "Properties", default)]
    pub properties: Option<GootenProperties>,
    #[serde(rename = "TrackingNumber", default, deserialize_with = "lenient_text")]
    pub tracking_number: Option<String>,
    #[serde(rename = "CarrierName", default, deserialize_with = "lenient_text")]
    pub carrier_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GootenProperties {
    #[serde(rename = "AccountReferenceId", default, deserialize_with = "lenient_text")]
    pub account_reference_id: Option<String>,
}

/// `{ "external_id": ... }` wrapper used by Printful and Printify.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalRef {
    #[serde(default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
}

/// Accepts a string or a number; blanks, `null`, and other shapes become `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// A recognised shipment notice.
#[derive(Debug, Clone)]
pub enum ShipmentNotice {
    Printful(PrintfulShipped),
    Printify(PrintifyShipment),
    Gooten(GootenPostback),
}

impl ShipmentNotice {
    /// Recognises the provider from the raw payload. Returns `None` when no
    /// provider's shape matches.
    pub fn classify(body: &Value) -> Option<Self> {
        let present = |v: Option<&Value>| v.is_some_and(is_truthy);

        if body.get("type").and_then(Value::as_str) == Some("package_shipped")
            && present(body.pointer("/data/shipment"))
        {
            return serde_json::from_value(body.clone()).ok().map(Self::Printful);
        }

        if body.get("topic").and_then(Value::as_str) == Some("order:shipment:created")
            && present(body.get("resource"))
        {
            return serde_json::from_value(body.clone()).ok().map(Self::Printify);
        }

        if present(body.get("ReferenceID")) || present(body.pointer("/Properties/AccountReferenceId")) {
            return serde_json::from_value(body.clone()).ok().map(Self::Gooten);
        }

        None
    }

    /// Reduces the provider payload to a [`ShipmentUpdate`].
    pub fn normalize(&self) -> ShipmentUpdate {
        match self {
            Self::Printful(p) => ShipmentUpdate {
                provider: ShipmentProvider::Printful,
                external_id: p.data.order.as_ref().and_then(|o| o.external_id.clone()),
                tracking_number: p.data.shipment.tracking_number.clone(),
                carrier: p.data.shipment.carrier.clone(),
            },
            Self::Printify(p) => ShipmentUpdate {
                provider: ShipmentProvider::Printify,
                external_id: p.resource.external_id.clone().or_else(|| {
                    p.resource
                        .order
                        .as_ref()
                        .and_then(|o| o.external_id.clone())
                }),
                tracking_number: p.resource.tracking_number.clone(),
                carrier: p.resource.carrier.clone(),
            },
            Self::Gooten(g) => ShipmentUpdate {
                provider: ShipmentProvider::Gooten,
                external_id: g.reference_id.clone().or_else(|| {
                    g.properties
                        .as_ref()
                        .and_then(|p| p.account_reference_id.clone())
                }),
                tracking_number: g.tracking_number.clone(),
                carrier: g.carrier_name.clone(),
            },
        }
    }
}

/// Loose presence check for discriminating fields: `null`, `false`, `0`, and
/// `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
