// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `knx_device` library.
//!
//! This module provides the error hierarchy for the device core: value
//! validation, telegram dispatch, update callbacks, and device configuration.

use std::fmt;

use thiserror::Error;

use crate::subscription::SubscriptionId;

/// Boxed error returned by update callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A telegram could not be routed to a handler.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// One or more update callbacks failed during a notification pass.
    #[error("callback error: {0}")]
    Callbacks(#[from] CallbackErrors),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The device configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// The callback handle is already registered on this device.
    #[error("callback is already registered as {0}")]
    AlreadyRegistered(SubscriptionId),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A group address string could not be parsed.
    #[error("invalid group address: {0}")]
    InvalidGroupAddress(String),
}

/// Errors raised while routing a telegram to a device handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The telegram carries an APCI service code that is not a group
    /// read, write or response.
    #[error("unknown telegram type (APCI {apci:#05x})")]
    UnknownTelegramType {
        /// The unrecognized APCI code.
        apci: u16,
    },
}

/// A single update callback that did not complete successfully.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("{id} failed: {message}")]
    Failed {
        /// The subscription that failed.
        id: SubscriptionId,
        /// The error reported by the callback.
        message: String,
    },

    /// The callback task panicked or was cancelled by the runtime.
    #[error("{id} panicked: {message}")]
    Panicked {
        /// The subscription that panicked.
        id: SubscriptionId,
        /// The panic or join failure description.
        message: String,
    },
}

impl CallbackError {
    /// Returns the subscription that produced this error.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        match self {
            Self::Failed { id, .. } | Self::Panicked { id, .. } => *id,
        }
    }
}

/// All callback failures collected from one notification pass.
///
/// Only produced once every callback of the pass has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackErrors(Vec<CallbackError>);

impl CallbackErrors {
    pub(crate) fn new(errors: Vec<CallbackError>) -> Self {
        Self(errors)
    }

    /// Returns the individual failures in registration order.
    #[must_use]
    pub fn errors(&self) -> &[CallbackError] {
        &self.0
    }

    /// Returns the number of failed callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no callback failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CallbackErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} callback(s) failed", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CallbackErrors {}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
