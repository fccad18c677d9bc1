//! Vendor rule table.
//!
//! A [`RuleTable`] is an ordered list of keyword → vendor mappings. Item names
//! are classified by scanning the table in declaration order and taking the
//! first rule whose keyword occurs in the name. The `priority` carried by some
//! rules is informational only and is never used to reorder the scan, so
//! a specific keyword must be declared before any generic keyword it contains
//! (e.g. `"Keepsake Pillow"` before `"Pillow"`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

/// A print-on-demand or manufacturing partner that can fulfil an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vendor {
    /// Fast overnight textile printing (pillows, blankets, portraits).
    CustomCat,
    /// Same-day cap panels. No API; always ordered by hand.
    CelebratePrints,
    /// Memorial urns.
    TrupointMemorials,
    /// Premium textiles with 1–2 day production.
    Contrado,
    /// Spreadshirt print-on-demand, 48 hour production.
    #[serde(rename = "SPOD")]
    Spod,
    /// Printify marketplace.
    Printify,
    /// Printful.
    Printful,
    /// Gooten. Only reached through shipment postbacks; no dispatch API key.
    Gooten,
}

impl Vendor {
    /// Every vendor, in a stable order.
    pub const ALL: [Vendor; 8] = [
        Vendor::CustomCat,
        Vendor::CelebratePrints,
        Vendor::TrupointMemorials,
        Vendor::Contrado,
        Vendor::Spod,
        Vendor::Printify,
        Vendor::Printful,
        Vendor::Gooten,
    ];

    /// Name used in routing notes, alerts, and API responses.
    pub fn display_name(self) -> &'static str {
        match self {
            Vendor::CustomCat => "CustomCat",
            Vendor::CelebratePrints => "CelebratePrints",
            Vendor::TrupointMemorials => "TrupointMemorials",
            Vendor::Contrado => "Contrado",
            Vendor::Spod => "SPOD",
            Vendor::Printify => "Printify",
            Vendor::Printful => "Printful",
            Vendor::Gooten => "Gooten",
        }
    }

    /// Environment variable holding this vendor's API credential.
    ///
    /// `None` means the vendor has no automated channel and every enabled
    /// item routed to it falls back to a manual order.
    pub fn credential_var(self) -> Option<&'static str> {
        match self {
            Vendor::CustomCat => Some("CUSTOMCAT_API_KEY"),
            Vendor::Spod => Some("SPOD_API_KEY"),
            Vendor::Printify => Some("PRINTIFY_API_KEY"),
            Vendor::Printful => Some("PRINTFUL_API_KEY"),
            Vendor::Contrado => Some("CONTRADO_API_KEY"),
            Vendor::TrupointMemorials => Some("TRUPOINT_API_KEY"),
            Vendor::CelebratePrints | Vendor::Gooten => None,
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One keyword → vendor mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRule {
    /// Case-sensitive substring looked for in the item name.
    pub keyword: String,
    /// Vendor the item is routed to when this rule matches.
    pub vendor: Vendor,
    /// Settings key whose value must be `"ON"` for automated routing.
    pub setting_key: String,
    /// Whether the vendor can ship overnight for this product line.
    pub supports_overnight: bool,
    /// Declared preference relative to other rules. Not used for ordering.
    pub priority: Option<u8>,
}

impl VendorRule {
    /// Creates a rule with no declared priority.
    pub fn new(
        keyword: impl Into<String>,
        vendor: Vendor,
        setting_key: impl Into<String>,
        supports_overnight: bool,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            vendor,
            setting_key: setting_key.into(),
            supports_overnight,
            priority: None,
        }
    }

    /// Sets the declared priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns `true` if the rule's keyword occurs in `item_name`.
    pub fn matches(&self, item_name: &str) -> bool {
        item_name.contains(self.keyword.as_str())
    }
}

/// Ordered rule list; see the module docs for matching semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<VendorRule>,
}

impl RuleTable {
    /// Creates a table that scans `rules` in the given order.
    pub fn new(rules: Vec<VendorRule>) -> Self {
        Self { rules }
    }

    /// Returns the first rule, in declaration order, matching `item_name`.
    pub fn first_match(&self, item_name: &str) -> Option<&VendorRule> {
        self.rules.iter().find(|rule| rule.matches(item_name))
    }
}

impl Default for RuleTable {
    /// The storefront's production routing table.
    fn default() -> Self {
        use Vendor::*;

        Self::new(vec![
            VendorRule::new("Keepsake Pillow", CustomCat, "AUTOPILOT_PILLOW", true),
            VendorRule::new("Premium Woven Blanket", CustomCat, "AUTOPILOT_BLANKET", true),
            VendorRule::new("Framed Portrait", CustomCat, "AUTOPILOT_PORTRAIT", true),
            VendorRule::new("Cap Panel", CelebratePrints, "AUTOPILOT_CAPPANEL", true),
            VendorRule::new("Urn", TrupointMemorials, "AUTOPILOT_URN", false),
            VendorRule::new("Pillow", Contrado, "AUTOPILOT_CONTRADO", false).with_priority(2),
            VendorRule::new("Woven", Contrado, "AUTOPILOT_CONTRADO", false).with_priority(2),
            VendorRule::new("Shirt", Spod, "AUTOPILOT_SPOD", false).with_priority(2),
            VendorRule::new("Hoodie", Spod, "AUTOPILOT_SPOD", false),
            VendorRule::new("Blanket", Printify, "AUTOPILOT_BLANKET", false),
            VendorRule::new("Stone", Printify, "AUTOPILOT_DEFAULT", false),
            // Shadowed by the SPOD "Shirt" rule above; kept so flipping the
            // order re-enables Printful for shirts.
            VendorRule::new("Shirt", Printful, "AUTOPILOT_TSHIRT", false),
            VendorRule::new("Mug", Printful, "AUTOPILOT_MUG", false),
            VendorRule::new("Candle", Printful, "AUTOPILOT_CANDLE", false),
            VendorRule::new("Ornament", Printful, "AUTOPILOT_ORNAMENT", false),
            VendorRule::new("Package", Gooten, "AUTOPILOT_COMFORT", false),
        ])
    }
}
