//! Layer-name rules that infer native dependencies and permissions.
//!
//! Plain case-insensitive substring matching: "Roadmap" also matches `map`.
//! Known to be imprecise.

use std::collections::BTreeSet;

pub const MAPS_PACKAGE: &str = "react-native-maps";

pub const CAMERA_PERMISSIONS: &[&str] = &[
    "android.permission.CAMERA",
    "ios.permission.NSCameraUsageDescription",
];

pub const LOCATION_PERMISSIONS: &[&str] = &[
    "android.permission.ACCESS_FINE_LOCATION",
    "ios.permission.NSLocationWhenInUseUsageDescription",
];

pub struct NamingRule {
    pub needles: &'static [&'static str],
    pub dependencies: &'static [&'static str],
    pub permissions: &'static [&'static str],
}

pub const NAMING_RULES: &[NamingRule] = &[
    NamingRule {
        needles: &["map"],
        dependencies: &[MAPS_PACKAGE],
        permissions: &[],
    },
    NamingRule {
        needles: &["camera", "avatar-upload"],
        dependencies: &[],
        permissions: CAMERA_PERMISSIONS,
    },
    NamingRule {
        needles: &["location"],
        dependencies: &[],
        permissions: LOCATION_PERMISSIONS,
    },
];

/// Sorted dependency and permission sets accumulated over a screen.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Requirements {
    pub dependencies: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

impl Requirements {
    /// Apply every rule whose needle occurs in `name`.
    pub fn observe(&mut self, name: &str) {
        let name = name.to_lowercase();
        for rule in NAMING_RULES {
            if rule.needles.iter().any(|n| name.contains(n)) {
                self.dependencies
                    .extend(rule.dependencies.iter().map(|d| d.to_string()));
                self.permissions
                    .extend(rule.permissions.iter().map(|p| p.to_string()));
            }
        }
    }
}
