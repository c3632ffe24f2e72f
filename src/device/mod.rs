// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device abstraction for bus devices.
//!
//! A [`Device`] holds the identity of a logical bus device and the callbacks
//! interested in its state. The [`DeviceHandler`] trait routes inbound
//! telegrams to per-intent hooks; concrete device kinds (switches, sensors)
//! override the hooks they care about.
//!
//! # Telegram flow
//!
//! ```text
//! telegram queue
//!       ↓
//! DeviceHandler::process(telegram)
//!       ↓ by TelegramType
//! process_group_read | process_group_write | process_group_response
//!                                                  ↓ (default)
//!                                          process_group_write
//!       ↓ (when the hook changed state)
//! Device::after_update() → every registered callback
//! ```
//!
//! # Implementing a device kind
//!
//! ```
//! use parking_lot::Mutex;
//! use knx_device::{Device, DeviceHandler, Result, Telegram};
//! use knx_device::types::{GroupAddress, Payload};
//!
//! struct Switch {
//!     device: Device,
//!     address: GroupAddress,
//!     state: Mutex<bool>,
//! }
//!
//! impl DeviceHandler for Switch {
//!     fn device(&self) -> &Device {
//!         &self.device
//!     }
//!
//!     fn kind(&self) -> &'static str {
//!         "Switch"
//!     }
//!
//!     fn has_group_address(&self, address: &GroupAddress) -> bool {
//!         *address == self.address
//!     }
//!
//!     async fn process_group_write(&self, telegram: &Telegram) -> Result<()> {
//!         let on = telegram.payload().and_then(Payload::as_binary) == Some(1);
//!         let changed = std::mem::replace(&mut *self.state.lock(), on) != on;
//!         if changed {
//!             self.after_update().await?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod config;

pub use config::DeviceConfig;

use std::sync::Arc;

use crate::error::{DispatchError, Error};
use crate::subscription::{CallbackRegistry, DeviceCallback, SubscriptionId};
use crate::telegram::{Telegram, TelegramType};
use crate::types::GroupAddress;

/// Declared kind of the base device.
const BASE_KIND: &str = "Device";

/// Identity and update callbacks of a logical bus device.
///
/// `Device` is a cheap handle: clones share the same name and callback
/// registry. Callbacks receive a clone of the handle they were notified
/// through.
///
/// # Examples
///
/// ```
/// use knx_device::{Device, DeviceConfig};
///
/// let device = Device::new("Living.Room.Dimmer");
/// assert_eq!(device.name(), "Living.Room.Dimmer");
///
/// let config = DeviceConfig::from_json(r#"{"name": "Hall.Sensor"}"#).unwrap();
/// let device = Device::from_config(&config).unwrap();
/// assert_eq!(device.name(), "Hall.Sensor");
/// ```
#[derive(Debug, Clone)]
pub struct Device {
    name: Arc<str>,
    callbacks: Arc<CallbackRegistry>,
}

impl Device {
    /// Creates a device with no registered callbacks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            callbacks: Arc::new(CallbackRegistry::new()),
        }
    }

    /// Creates a device from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidConfiguration` if the configuration is
    /// invalid.
    pub fn from_config(config: &DeviceConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::new(config.name.as_str()))
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if both handles refer to the same device.
    #[must_use]
    pub fn same_device(&self, other: &Device) -> bool {
        Arc::ptr_eq(&self.callbacks, &other.callbacks)
    }

    /// Returns the callback registry of this device.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Registers a callback to run on every [`after_update`](Self::after_update).
    ///
    /// Registering during a notification pass only affects later passes.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyRegistered` if this handle is already
    /// registered.
    pub fn register_device_updated_cb(
        &self,
        callback: DeviceCallback,
    ) -> Result<SubscriptionId, Error> {
        let id = self.callbacks.register(callback)?;
        tracing::debug!(device = %self.name, %id, "Registered update callback");
        Ok(id)
    }

    /// Unregisters a callback by identity.
    ///
    /// Returns `true` if the callback was registered. Unregistering during
    /// a notification pass does not interrupt that pass.
    pub fn unregister_device_updated_cb(&self, callback: &DeviceCallback) -> bool {
        let removed = self.callbacks.unregister(callback);
        tracing::debug!(device = %self.name, removed, "Unregistered update callback");
        removed
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.callbacks.unsubscribe(id);
        tracing::debug!(device = %self.name, %id, removed, "Unsubscribed update callback");
        removed
    }

    /// Notifies every registered callback that the device state may have
    /// changed.
    ///
    /// Callbacks registered when this call starts run exactly once, each on
    /// its own task. The call returns once all of them have finished.
    ///
    /// # Errors
    ///
    /// Returns `Error::Callbacks` listing the callbacks that failed. The
    /// other callbacks still ran to completion.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub async fn after_update(&self) -> Result<(), Error> {
        self.callbacks.dispatch(self).await.map_err(Error::Callbacks)
    }
}

/// Records that `action` is not supported by devices of `kind`.
///
/// This is the base behaviour of [`DeviceHandler::do_action`]. Overrides
/// call it for the actions they do not handle.
pub fn action_not_implemented(kind: &str, action: &str) {
    tracing::info!(action, kind, "Do not implemented action '{action}' for {kind}");
}

/// Telegram handling for a device kind.
///
/// [`process`](Self::process) routes a telegram to one of the
/// `process_group_*` hooks. The base hooks do nothing, except
/// [`process_group_response`](Self::process_group_response), which treats a
/// response as an authoritative write and forwards it to
/// [`process_group_write`](Self::process_group_write).
///
/// Hooks that change device state call [`after_update`](Self::after_update)
/// themselves; dispatch never notifies callbacks on its own.
#[allow(async_fn_in_trait)]
pub trait DeviceHandler {
    /// Returns the underlying device handle.
    fn device(&self) -> &Device;

    /// Returns the declared kind of this device, such as `"Switch"`.
    fn kind(&self) -> &'static str;

    /// Returns the device name.
    fn name(&self) -> &str {
        self.device().name()
    }

    /// Returns `true` if the device listens on `address`.
    fn has_group_address(&self, _address: &GroupAddress) -> bool {
        false
    }

    /// Returns the addresses a state-sync layer should read to refresh this
    /// device.
    fn state_addresses(&self) -> Vec<GroupAddress> {
        Vec::new()
    }

    /// Routes a telegram to the hook matching its type.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownTelegramType` for an unrecognized
    /// telegram type, or the error of the selected hook.
    async fn process(&self, telegram: &Telegram) -> Result<(), Error> {
        tracing::trace!(
            device = %self.name(),
            address = %telegram.group_address(),
            intent = %telegram.telegram_type(),
            "Processing telegram"
        );
        match telegram.telegram_type() {
            TelegramType::GroupRead => self.process_group_read(telegram).await,
            TelegramType::GroupWrite => self.process_group_write(telegram).await,
            TelegramType::GroupResponse => self.process_group_response(telegram).await,
            TelegramType::Unknown(apci) => Err(DispatchError::UnknownTelegramType { apci }.into()),
        }
    }

    /// Handles a read request.
    ///
    /// # Errors
    ///
    /// The base implementation never fails.
    async fn process_group_read(&self, _telegram: &Telegram) -> Result<(), Error> {
        Ok(())
    }

    /// Handles a write.
    ///
    /// # Errors
    ///
    /// The base implementation never fails.
    async fn process_group_write(&self, _telegram: &Telegram) -> Result<(), Error> {
        Ok(())
    }

    /// Handles a response by forwarding it unchanged to
    /// [`process_group_write`](Self::process_group_write).
    ///
    /// # Errors
    ///
    /// Returns the error of `process_group_write`.
    async fn process_group_response(&self, telegram: &Telegram) -> Result<(), Error> {
        self.process_group_write(telegram).await
    }

    /// Executes a named action such as `"on"`.
    ///
    /// The base implementation leaves the device untouched and logs that the
    /// action is not implemented for this kind. Unknown actions are not
    /// errors.
    ///
    /// # Errors
    ///
    /// The base implementation never fails.
    async fn do_action(&self, action: &str) -> Result<(), Error> {
        action_not_implemented(self.kind(), action);
        Ok(())
    }

    /// Notifies the device's update callbacks.
    ///
    /// # Errors
    ///
    /// See [`Device::after_update`].
    async fn after_update(&self) -> Result<(), Error> {
        self.device().after_update().await
    }
}

impl DeviceHandler for Device {
    fn device(&self) -> &Device {
        self
    }

    fn kind(&self) -> &'static str {
        BASE_KIND
    }
}
