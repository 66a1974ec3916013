//! Domain metadata and constants
//!
//! This module defines which entity domains each downstream integration
//! can expose by default.

/// Domains the haaska (Alexa) bridge can control.
pub static HAASKA_DOMAINS: &[&str] = &[
    "automation",
    "cover",
    "group",
    "input_boolean",
    "input_slider",
    "light",
    "lock",
    "media_player",
    "remote",
    "scene",
    "script",
    "switch",
];

/// Domains the homebridge (HomeKit) bridge can expose.
pub static HOMEBRIDGE_DOMAINS: &[&str] = &[
    "binary_sensor",
    "cover",
    "device_tracker",
    "input_boolean",
    "light",
    "lock",
    "sensor",
    "switch",
];

/// Default haaska domain allow-list as owned strings
pub fn default_haaska_domains() -> Vec<String> {
    HAASKA_DOMAINS.iter().map(|d| d.to_string()).collect()
}

/// Default homebridge domain allow-list as owned strings
pub fn default_homebridge_domains() -> Vec<String> {
    HOMEBRIDGE_DOMAINS.iter().map(|d| d.to_string()).collect()
}
