//! Helper functions and macros

use num_traits::ToPrimitive;

/// Check whether `v` fits a signed two's-complement field of `bits` bits.
///
/// # Examples
///
/// ```
/// use brisk::util::misc::fits_signed;
///
/// assert!(fits_signed(2047, 12));
/// assert!(fits_signed(-2048, 12));
/// assert!(!fits_signed(2048, 12));
/// assert!(!fits_signed(-2049, 12));
/// ```
#[inline(always)]
pub fn fits_signed<T: ToPrimitive>(v: T, bits: u32) -> bool {
    let bound = 1i64 << (bits - 1);

    matches!{
        v.to_i64(),
        Some(v) if v >= -bound && v < bound
    }
}

/// Check whether `v` fits an unsigned field of `bits` bits.
///
/// # Examples
///
/// ```
/// use brisk::util::misc::fits_unsigned;
///
/// assert!(fits_unsigned(0xFFFu32, 12));
/// assert!(!fits_unsigned(0x1000u32, 12));
/// ```
#[inline(always)]
pub fn fits_unsigned<T: ToPrimitive>(v: T, bits: u32) -> bool {
    matches!{
        v.to_u64(),
        Some(v) if v < (1u64 << bits)
    }
}

/// Convert `v` from 1-based to 0-based, clamping the result with `cap`.
pub const fn b0(v: usize, cap: usize) -> usize {
    let v = v.saturating_sub(1);
    if v < cap { v } else { cap }
}

#[doc(hidden)]
macro_rules! debug_from_display {
    ($type: ty) => {
        const _: fn() = || {
            fn assert_impl_display<T: std::fmt::Display>() {}
            assert_impl_display::<$type>();
        };

        impl std::fmt::Debug for $type {
            #[inline(always)]
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                writeln!(f)?;
                std::fmt::Display::fmt(self, f)
            }
        }
    };
}
