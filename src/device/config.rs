// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration loaded by the parent registry.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Error};

/// Configuration for a single device.
///
/// # Examples
///
/// ```
/// use knx_device::DeviceConfig;
///
/// let config = DeviceConfig::new("Kitchen.Light");
/// assert!(config.validate().is_ok());
///
/// let config = DeviceConfig::from_json(r#"{"name": "Hall.Sensor"}"#).unwrap();
/// assert_eq!(config.name, "Hall.Sensor");
///
/// assert!(DeviceConfig::from_json(r#"{"name": "  "}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Name identifying the device.
    pub name: String,
}

impl DeviceConfig {
    /// Creates a configuration with the given device name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the JSON is malformed, or
    /// `Error::Device` if the configuration is invalid.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can be used to build a device.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidConfiguration` if the name is empty or
    /// only whitespace.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.name.trim().is_empty() {
            return Err(DeviceError::InvalidConfiguration(
                "device name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
