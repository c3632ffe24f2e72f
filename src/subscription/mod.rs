// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Update callbacks for device state changes.
//!
//! Components that need to know when a device's state may have changed (a
//! state-sync layer, a UI bridge) register a [`DeviceUpdatedCallback`] on the
//! device. Every call to [`Device::after_update`](crate::Device::after_update)
//! runs each registered callback once and waits for all of them.
//!
//! # Overview
//!
//! - [`DeviceUpdatedCallback`] - The observer capability, implemented for
//!   async closures taking a [`Device`](crate::Device)
//! - [`SubscriptionId`] - Identifier returned on registration
//! - [`CallbackRegistry`] - Ordered, copy-on-write set of callbacks
//!
//! # Usage
//!
//! ```
//! use knx_device::Device;
//! use knx_device::subscription::callback_fn;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> knx_device::Result<()> {
//! let device = Device::new("Kitchen.Light");
//!
//! let callback = callback_fn(|device: Device| async move {
//!     println!("{} was updated", device.name());
//!     Ok(())
//! });
//!
//! device.register_device_updated_cb(callback.clone())?;
//! device.after_update().await?;
//!
//! device.unregister_device_updated_cb(&callback);
//! # Ok(())
//! # }
//! ```

mod callback;

pub use callback::{
    CallbackFuture, CallbackRegistry, DeviceCallback, DeviceUpdatedCallback, SubscriptionId,
    callback_fn,
};
