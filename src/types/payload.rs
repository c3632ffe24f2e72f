// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telegram payload values.

use std::fmt;

use crate::error::ValueError;

/// Maximum value of a payload packed into the APCI octet.
const BINARY_MAX: u8 = 0x3F;

/// Value carried by a telegram.
///
/// Small values (booleans, steps) travel inside the 6 low bits of the APCI
/// octet; everything else is appended as a byte array. The representation
/// is private so a binary payload can only be built within its 6-bit range.
///
/// # Examples
///
/// ```
/// use knx_device::types::Payload;
///
/// let on = Payload::binary(1).unwrap();
/// let brightness = Payload::array([0x80]);
///
/// assert_eq!(on, Payload::from(true));
/// assert_eq!(on.as_binary(), Some(1));
/// assert_eq!(brightness.as_binary(), None);
/// assert_eq!(on.to_string(), "<Binary 0x01>");
/// assert_eq!(brightness.to_string(), "<Array 0x80>");
/// assert!(Payload::binary(0x40).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Binary(u8),
    Array(Vec<u8>),
}

impl Payload {
    /// Creates a binary payload.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` does not fit in 6 bits.
    pub fn binary(value: u8) -> Result<Self, ValueError> {
        if value > BINARY_MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(BINARY_MAX),
                actual: u16::from(value),
            });
        }
        Ok(Self(Repr::Binary(value)))
    }

    /// Creates an array payload.
    #[must_use]
    pub fn array(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Repr::Array(bytes.into()))
    }

    /// Returns the 6-bit value of a binary payload.
    #[must_use]
    pub fn as_binary(&self) -> Option<u8> {
        match self.0 {
            Repr::Binary(value) => Some(value),
            Repr::Array(_) => None,
        }
    }

    /// Returns `true` for a payload packed into the APCI octet.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self.0, Repr::Binary(_))
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Repr::Binary(value) => std::slice::from_ref(value),
            Repr::Array(bytes) => bytes,
        }
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Self(Repr::Binary(u8::from(value)))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.is_binary() { "Binary" } else { "Array" };
        write!(f, "<{label} 0x")?;
        for byte in self.as_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ">")
    }
}
