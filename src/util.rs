// This file is part of the chessbits library.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::num::TryFromIntError;

pub(crate) fn out_of_range_error() -> TryFromIntError {
    // TryFromIntError has a private constructor. Borrow one from a
    // conversion that is known to overflow.
    u8::try_from(u16::MAX).unwrap_err()
}

/// Implements `TryFrom<int>` for a fieldless enum by delegating to a
/// `const fn(u32) -> Option<Self>` constructor.
macro_rules! try_from_int_impl {
    ($type:ty, $ctor:path, $($t:ty)+) => {
        $(impl core::convert::TryFrom<$t> for $type {
            type Error = std::num::TryFromIntError;

            #[inline]
            fn try_from(value: $t) -> Result<$type, Self::Error> {
                u32::try_from(value)
                    .ok()
                    .and_then($ctor)
                    .ok_or_else(crate::util::out_of_range_error)
            }
        })+
    }
}

/// Implements `From<$type> for int` for a fieldless enum.
macro_rules! int_from_enum_impl {
    ($type:ty, $($t:ty)+) => {
        $(impl From<$type> for $t {
            #[inline]
            fn from(value: $type) -> $t {
                value as $t
            }
        })+
    }
}
