//! Vendor credential availability.
//!
//! Only the *presence* of a vendor's API key influences routing; the key
//! itself is never stored here and never logged.

use std::collections::BTreeSet;

use crate::Vendor;

/// The set of vendors whose API credential is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorCredentials {
    available: BTreeSet<Vendor>,
}

impl VendorCredentials {
    /// No credentials at all; every enabled route falls back to manual.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds the set by asking `lookup` for each vendor's credential variable.
    ///
    /// A credential counts as present only when the value is non-empty after
    /// trimming. Vendors without a credential variable are never present.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let available = Vendor::ALL
            .into_iter()
            .filter(|vendor| {
                vendor
                    .credential_var()
                    .and_then(|var| lookup(var))
                    .is_some_and(|value| !value.trim().is_empty())
            })
            .collect();
        Self { available }
    }

    /// Marks `vendor` as having a credential. Vendors with no credential
    /// variable are ignored.
    pub fn with(mut self, vendor: Vendor) -> Self {
        if vendor.credential_var().is_some() {
            self.available.insert(vendor);
        }
        self
    }

    /// Returns `true` if `vendor` can be dispatched automatically.
    pub fn has(&self, vendor: Vendor) -> bool {
        self.available.contains(&vendor)
    }

    /// `(vendor, "OK" | "MISSING")` for every vendor that takes a credential.
    ///
    /// Used for the startup log line; never includes the credential value.
    pub fn status_report(&self) -> Vec<(Vendor, &'static str)> {
        Vendor::ALL
            .into_iter()
            .filter(|v| v.credential_var().is_some())
            .map(|v| (v, if self.has(v) { "OK" } else { "MISSING" }))
            .collect()
    }
}
