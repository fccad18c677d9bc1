//! Fulfillment domain for OrderPilot.
//!
//! This crate holds every domain concept used by the webhook handlers: order
//! and routing types, the vendor rule table, the autopilot router, shipment
//! notice normalisation, alerts, and the port traits that infrastructure
//! crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** No I/O. The ledger, settings table,
//! and alert relay are reached only through [`ports`]; `sheets` and `alerts`
//! provide the implementations and `handlers` sequences the calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `OrderId`, `SettingKey`, `LookupKey`, `InvocationId` |
//! | [`types`] | `Money`, `Settings` snapshot |
//! | [`rules`] | `Vendor`, `VendorRule`, `RuleTable` |
//! | [`credentials`] | `VendorCredentials` |
//! | [`router`] | `Autopilot` and `RoutingOutcome` |
//! | [`checkout`] | Snipcart `order.completed` payload |
//! | [`order`] | `OrderRecord`, `FulfillmentStatus`, financial estimate |
//! | [`shipment`] | Provider shipment notices |
//! | [`alert`] | Operator alert composition |
//! | [`stats`] | Ledger financial summary |
//! | [`ports`] | Store and notifier traits |
//! | [`errors`] | `FulfillmentError` |

pub mod alert;
pub mod checkout;
pub mod credentials;
pub mod errors;
pub mod identifiers;
pub mod order;
pub mod ports;
pub mod router;
pub mod rules;
pub mod shipment;
pub mod stats;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use alert::{Alert, ManualActionContext};
pub use checkout::{CheckoutContent, CheckoutEvent, CheckoutItem};
pub use credentials::VendorCredentials;
pub use errors::FulfillmentError;
pub use identifiers::{InvocationId, LookupKey, OrderId, SettingKey};
pub use order::{FinancialEstimate, FulfillmentStatus, NewOrder, OrderRecord};
pub use ports::{AlertError, AlertNotifier, OrderLedger, SettingsStore, StoreError};
pub use router::{Autopilot, RouteKind, RoutingDetail, RoutingOutcome};
pub use rules::{RuleTable, Vendor, VendorRule};
pub use shipment::{ShipmentNotice, ShipmentProvider, ShipmentUpdate};
pub use stats::{FinancialSummary, RecentOrder};
pub use types::{Money, Settings};
