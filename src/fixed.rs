//! 16.16 fixed-point arithmetic and binary-angle trigonometry.
//!
//! The whole plane pipeline runs on the classic integer representation:
//! `Fixed` carries 16 fractional bits, angles are 32-bit BAMs where the full
//! circle wraps at `u32::MAX + 1`.  The fine sine table is built once at
//! first use instead of being baked into the binary.

use once_cell::sync::Lazy;

pub type Fixed = i32;

pub const FRACBITS: u32 = 16;
pub const FRACUNIT: Fixed = 1 << FRACBITS;

/// Binary angle: 0 = east, counter-clockwise, wraps at 2^32.
pub type Angle = u32;

pub const ANG90: Angle = 0x4000_0000;
pub const ANG180: Angle = 0x8000_0000;
pub const ANG270: Angle = 0xC000_0000;

/// Right-shift that turns an [`Angle`] into a fine-table index.
pub const ANGLETOFINESHIFT: u32 = 19;
/// Right-shift that turns an [`Angle`] into a sky-texture column.
pub const ANGLETOSKYSHIFT: u32 = 22;

pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;

#[inline(always)]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    ((a as i64 * b as i64) >> FRACBITS) as Fixed
}

/// Fixed-point division, saturating where the quotient would overflow
/// (the original engine clamps to MININT/MAXINT the same way).
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if (a.abs() >> 14) >= b.abs() {
        if (a ^ b) < 0 { Fixed::MIN } else { Fixed::MAX }
    } else {
        (((a as i64) << FRACBITS) / b as i64) as Fixed
    }
}

/// Quarter-circle of extra entries lets cosine read `sine[i + FINEANGLES/4]`
/// without masking.
static FINESINE: Lazy<Box<[Fixed]>> = Lazy::new(|| {
    let mut table = vec![0 as Fixed; FINEANGLES + FINEANGLES / 4];
    for (i, slot) in table.iter_mut().enumerate() {
        let a = (i as f64 + 0.5) * std::f64::consts::TAU / FINEANGLES as f64;
        *slot = (a.sin() * FRACUNIT as f64).round() as Fixed;
    }
    table.into_boxed_slice()
});

#[inline(always)]
pub fn fine_sine(i: usize) -> Fixed {
    FINESINE[i & FINEMASK]
}

#[inline(always)]
pub fn fine_cosine(i: usize) -> Fixed {
    FINESINE[(i & FINEMASK) + FINEANGLES / 4]
}

/// Sine of a BAM angle.
#[inline(always)]
pub fn sin_angle(a: Angle) -> Fixed {
    fine_sine((a >> ANGLETOFINESHIFT) as usize)
}

/// Cosine of a BAM angle.
#[inline(always)]
pub fn cos_angle(a: Angle) -> Fixed {
    fine_cosine((a >> ANGLETOFINESHIFT) as usize)
}

/// Convert radians (demo/camera space) to a BAM angle.
#[inline]
pub fn angle_from_radians(r: f32) -> Angle {
    let turns = (r as f64 / std::f64::consts::TAU).rem_euclid(1.0);
    (turns * 4294967296.0) as u64 as Angle
}

/// Convert map units (f32) to fixed point.
#[inline]
pub fn fixed_from_f32(v: f32) -> Fixed {
    (v * FRACUNIT as f32) as Fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_and_div_are_inverse_for_small_values() {
        let a = 3 * FRACUNIT + FRACUNIT / 2; // 3.5
        let b = 2 * FRACUNIT; // 2.0
        assert_eq!(fixed_mul(a, b), 7 * FRACUNIT);
        assert_eq!(fixed_div(7 * FRACUNIT, b), a);
    }

    #[test]
    fn div_saturates_instead_of_overflowing() {
        assert_eq!(fixed_div(Fixed::MAX, 1), Fixed::MAX);
        assert_eq!(fixed_div(Fixed::MAX, -1), Fixed::MIN);
    }

    #[test]
    fn quadrant_angles() {
        // the half-step table offset mirrors the sign a quadrant ahead
        assert_eq!(sin_angle(0), -cos_angle(ANG90));
        // sin(90°) ≈ 1.0 in 16.16
        assert!((sin_angle(ANG90) - FRACUNIT).abs() <= 2);
        assert!((cos_angle(ANG180) + FRACUNIT).abs() <= 2);
        // sine is odd around 180°
        let a = 0x1234_5678;
        assert!((sin_angle(a) + sin_angle(a.wrapping_add(ANG180))).abs() <= 2);
    }

    #[test]
    fn radians_round_trip() {
        let a = angle_from_radians(std::f32::consts::FRAC_PI_2);
        // within one fine-table step of ANG90
        assert!((a as i64 - ANG90 as i64).abs() < (1 << ANGLETOFINESHIFT));
    }
}
