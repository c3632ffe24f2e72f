// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group address type for addressing telegrams.
//!
//! A KNX group address is a 16-bit value. It is usually written in
//! three-level notation (`main/middle/sub`, 5/3/8 bits), sometimes in
//! two-level notation (`main/sub`, 5/11 bits) or as a plain number.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

const MAIN_MAX: u8 = 31;
const MIDDLE_MAX: u8 = 7;
const SUB_TWO_LEVEL_MAX: u16 = 2047;

/// Logical destination address of a telegram.
///
/// # Examples
///
/// ```
/// use knx_device::types::GroupAddress;
///
/// let addr = GroupAddress::new(1, 2, 1).unwrap();
/// assert_eq!(addr.to_string(), "1/2/1");
///
/// let parsed: GroupAddress = "1/2/1".parse().unwrap();
/// assert_eq!(parsed, addr);
///
/// // Main group only has 5 bits
/// assert!(GroupAddress::new(32, 0, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupAddress(u16);

impl GroupAddress {
    /// Creates a group address from three-level parts.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `main` exceeds 31 or `middle`
    /// exceeds 7.
    pub fn new(main: u8, middle: u8, sub: u8) -> Result<Self, ValueError> {
        check_main(u16::from(main))?;
        if middle > MIDDLE_MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(MIDDLE_MAX),
                actual: u16::from(middle),
            });
        }
        Ok(Self(
            (u16::from(main) << 11) | (u16::from(middle) << 8) | u16::from(sub),
        ))
    }

    /// Creates a group address from two-level parts.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `main` exceeds 31 or `sub`
    /// exceeds 2047.
    pub fn two_level(main: u8, sub: u16) -> Result<Self, ValueError> {
        check_main(u16::from(main))?;
        if sub > SUB_TWO_LEVEL_MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: SUB_TWO_LEVEL_MAX,
                actual: sub,
            });
        }
        Ok(Self((u16::from(main) << 11) | sub))
    }

    /// Creates a group address from its raw 16-bit value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw 16-bit value.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Returns the main group (0-31).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn main(&self) -> u8 {
        (self.0 >> 11) as u8
    }

    /// Returns the middle group of the three-level notation (0-7).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn middle(&self) -> u8 {
        ((self.0 >> 8) & 0x07) as u8
    }

    /// Returns the sub group of the three-level notation (0-255).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn sub(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

fn check_main(main: u16) -> Result<(), ValueError> {
    if main > u16::from(MAIN_MAX) {
        return Err(ValueError::OutOfRange {
            min: 0,
            max: u16::from(MAIN_MAX),
            actual: main,
        });
    }
    Ok(())
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

impl From<u16> for GroupAddress {
    fn from(raw: u16) -> Self {
        Self::from_raw(raw)
    }
}

impl FromStr for GroupAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidGroupAddress(s.to_string());
        let parts = s
            .trim()
            .split('/')
            .map(|part| part.parse::<u16>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let narrow = |value: u16| u8::try_from(value).map_err(|_| invalid());
        match parts.as_slice() {
            [main, middle, sub] => Self::new(narrow(*main)?, narrow(*middle)?, narrow(*sub)?),
            [main, sub] => Self::two_level(narrow(*main)?, *sub),
            [raw] => Ok(Self(*raw)),
            _ => Err(invalid()),
        }
    }
}
