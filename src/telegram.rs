// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telegrams delivered to devices by the telegram queue.
//!
//! A [`Telegram`] is an immutable value: the destination [`GroupAddress`],
//! an optional [`Payload`], and a [`TelegramType`] that selects the device
//! handler. Wire encoding happens elsewhere; the decoder hands over the APCI
//! service code through [`TelegramType::from_apci`].

use std::fmt;

use crate::types::{GroupAddress, Payload};

/// APCI group service codes.
const APCI_GROUP_READ: u16 = 0x000;
const APCI_GROUP_RESPONSE: u16 = 0x040;
const APCI_GROUP_WRITE: u16 = 0x080;

/// Intent of a telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TelegramType {
    /// Request for the current value of a group address.
    GroupRead,
    /// New value for a group address.
    #[default]
    GroupWrite,
    /// Answer to a read request, carrying the current value.
    GroupResponse,
    /// An APCI code the decoder could not classify.
    Unknown(u16),
}

impl TelegramType {
    /// Classifies an APCI service code.
    ///
    /// # Examples
    ///
    /// ```
    /// use knx_device::TelegramType;
    ///
    /// assert_eq!(TelegramType::from_apci(0x080), TelegramType::GroupWrite);
    /// assert_eq!(TelegramType::from_apci(0x2C0), TelegramType::Unknown(0x2C0));
    /// ```
    #[must_use]
    pub const fn from_apci(apci: u16) -> Self {
        match apci {
            APCI_GROUP_READ => Self::GroupRead,
            APCI_GROUP_RESPONSE => Self::GroupResponse,
            APCI_GROUP_WRITE => Self::GroupWrite,
            other => Self::Unknown(other),
        }
    }

    /// Returns the APCI service code of this telegram type.
    #[must_use]
    pub const fn apci(&self) -> u16 {
        match self {
            Self::GroupRead => APCI_GROUP_READ,
            Self::GroupResponse => APCI_GROUP_RESPONSE,
            Self::GroupWrite => APCI_GROUP_WRITE,
            Self::Unknown(apci) => *apci,
        }
    }
}

impl fmt::Display for TelegramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupRead => write!(f, "GroupRead"),
            Self::GroupWrite => write!(f, "GroupWrite"),
            Self::GroupResponse => write!(f, "GroupResponse"),
            Self::Unknown(apci) => write!(f, "Unknown({apci:#05x})"),
        }
    }
}

/// An addressed protocol message.
///
/// # Examples
///
/// ```
/// use knx_device::{Telegram, TelegramType};
/// use knx_device::types::{GroupAddress, Payload};
///
/// let telegram = Telegram::new(
///     GroupAddress::new(1, 2, 1).unwrap(),
///     Some(Payload::array([0x01, 0x02])),
///     TelegramType::GroupWrite,
/// );
///
/// assert_eq!(telegram.group_address().to_string(), "1/2/1");
/// assert_eq!(telegram.telegram_type(), TelegramType::GroupWrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Telegram {
    group_address: GroupAddress,
    payload: Option<Payload>,
    telegram_type: TelegramType,
}

impl Telegram {
    /// Creates a telegram.
    #[must_use]
    pub fn new(
        group_address: GroupAddress,
        payload: Option<Payload>,
        telegram_type: TelegramType,
    ) -> Self {
        Self {
            group_address,
            payload,
            telegram_type,
        }
    }

    /// Creates a read request, which carries no payload.
    #[must_use]
    pub fn read(group_address: GroupAddress) -> Self {
        Self::new(group_address, None, TelegramType::GroupRead)
    }

    /// Creates a write telegram.
    #[must_use]
    pub fn write(group_address: GroupAddress, payload: Payload) -> Self {
        Self::new(group_address, Some(payload), TelegramType::GroupWrite)
    }

    /// Creates a response telegram.
    #[must_use]
    pub fn response(group_address: GroupAddress, payload: Payload) -> Self {
        Self::new(group_address, Some(payload), TelegramType::GroupResponse)
    }

    /// Returns the destination address.
    #[must_use]
    pub fn group_address(&self) -> GroupAddress {
        self.group_address
    }

    /// Returns the payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Returns the telegram intent.
    #[must_use]
    pub fn telegram_type(&self) -> TelegramType {
        self.telegram_type
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Telegram group_address=\"{}\", telegram_type=\"{}\", payload=",
            self.group_address, self.telegram_type
        )?;
        match &self.payload {
            Some(payload) => write!(f, "\"{payload}\">"),
            None => write!(f, "None>"),
        }
    }
}
