// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Sketchcast gateway

/// Full version string with feature description
pub const VERSION: &str = "v0.3.0-provider-failover-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.3.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 0;

/// Minor version number
pub const VERSION_MINOR: u32 = 3;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "sketch-description",
    "live-guess",
    "prompt-composition",
    "style-directives",
    "provider-failover",
    "per-attempt-timeout",
    "poll-mode-providers",
    "bounded-concurrency",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Sketchcast {} ({})", VERSION_NUMBER, BUILD_DATE)
}
