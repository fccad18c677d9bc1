//! Newtype domain identifiers.
//!
//! Every value that identifies something in the ledger or the settings table
//! is a distinct newtype. This keeps an [`OrderId`] from being passed where a
//! [`SettingKey`] is expected even though both are strings underneath.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Storefront order identifier (the Snipcart order token, e.g. `"SNIP-1042"`).
    ///
    /// Stored verbatim in the `Order ID` ledger column. Comparisons against
    /// incoming webhook ids go through [`LookupKey`].
    OrderId
}

string_id! {
    /// Key of a row in the settings table (e.g. `"AUTOPILOT_PILLOW"`).
    SettingKey
}

impl SettingKey {
    /// The global kill switch. Nothing is routed unless this is `ON`.
    pub const GLOBAL: &'static str = "AUTOPILOT_GLOBAL";

    /// Toggle consulted for items that match no vendor rule.
    pub const DEFAULT: &'static str = "AUTOPILOT_DEFAULT";
}

// ---------------------------------------------------------------------------
// Normalised lookup key
// ---------------------------------------------------------------------------

/// A trimmed, lower-cased string used to match ledger cells against values
/// received from outside (webhook ids, customer-supplied ids and emails).
///
/// Both sides of every ledger comparison are normalised the same way, so
/// `"  SNIP-1 "` and `"snip-1"` refer to the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Normalises `raw`. Returns `None` when nothing remains after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let v = raw.trim().to_lowercase();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns `true` if `cell` normalises to this key.
    pub fn matches(&self, cell: &str) -> bool {
        cell.trim().to_lowercase() == self.0
    }

    /// Returns the normalised key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single webhook activation.
///
/// Generated fresh for every inbound request and recorded on its tracing span
/// so all log lines from one invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
