// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `knx_device` - Device core for KNX bus integrations.
//!
//! This library provides the device abstraction that sits between a
//! telegram queue and the code interested in device state:
//!
//! - **Dispatch**: route inbound telegrams to read, write and response hooks
//! - **Notification**: run registered async callbacks after state changes
//! - **Actions**: a named-action entry point for heterogeneous device kinds
//!
//! The bus connection, telegram wire encoding and the telegram queue are
//! provided by the surrounding integration.
//!
//! # Quick Start
//!
//! ```
//! use knx_device::{Device, DeviceHandler, Telegram};
//! use knx_device::subscription::callback_fn;
//! use knx_device::types::{GroupAddress, Payload};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> knx_device::Result<()> {
//!     let device = Device::new("Kitchen.Light");
//!
//!     let callback = callback_fn(|device: Device| async move {
//!         println!("{} may have changed", device.name());
//!         Ok(())
//!     });
//!     device.register_device_updated_cb(callback.clone())?;
//!
//!     // Route a telegram; the base device ignores it
//!     let address = GroupAddress::new(1, 2, 1)?;
//!     device.process(&Telegram::write(address, Payload::binary(1)?)).await?;
//!
//!     // Notify observers
//!     device.after_update().await?;
//!
//!     // Unknown actions are logged, not failed
//!     device.do_action("turn on").await?;
//!
//!     device.unregister_device_updated_cb(&callback);
//!     Ok(())
//! }
//! ```

mod device;
pub mod error;
pub mod subscription;
pub mod telegram;
pub mod types;

pub use device::{Device, DeviceConfig, DeviceHandler, action_not_implemented};
pub use error::{
    BoxError, CallbackError, CallbackErrors, DeviceError, DispatchError, Error, Result, ValueError,
};
pub use subscription::{CallbackRegistry, DeviceCallback, DeviceUpdatedCallback, SubscriptionId};
pub use telegram::{Telegram, TelegramType};
pub use types::{GroupAddress, Payload};
