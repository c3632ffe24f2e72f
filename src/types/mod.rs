// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types carried by telegrams.
//!
//! - [`GroupAddress`] - Logical destination of a telegram
//! - [`Payload`] - Binary or byte-array value of a telegram

mod group_address;
mod payload;

pub use group_address::GroupAddress;
pub use payload::Payload;
