//! Compile-time unit safety for stability-analysis quantities.
//!
//! Keeps angles, frequencies and time constants from being mixed up in the
//! analyzers: a rotor angle in radians cannot be passed where degrees are
//! expected, and an oscillation frequency in hertz cannot be confused with an
//! angular frequency in rad/s.
//!
//! All types are `#[repr(transparent)]` wrappers around `f64` and compile down
//! to the bare float.
//!
//! # Usage
//!
//! ```
//! use tops_core::units::{Degrees, Hertz, Radians};
//!
//! let f = Hertz(50.0);
//! let w = f.to_angular();
//! assert!((w.value() - 314.159_265).abs() < 1e-5);
//!
//! let delta = Degrees(30.0).to_radians();
//! assert!((delta.value().sin() - 0.5).abs() < 1e-12);
//!
//! // Would not compile: cannot add Hertz to Radians
//! // let wrong = f + delta;
//! let _: Radians = delta;
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl From<f64> for $type {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

// =============================================================================
// Angle Units
// =============================================================================

/// Angle in radians
///
/// Rotor angles, Park rotation angles and phasor arguments are all carried in
/// radians internally.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees
///
/// Used for display and for Bode phase output.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    /// Convert to degrees
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

}

impl Degrees {
    /// Convert to radians
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

// =============================================================================
// Frequency Units
// =============================================================================

/// Frequency in hertz (Hz)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hertz(pub f64);

impl_unit_ops!(Hertz, "Hz");

/// Angular frequency in radians per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RadiansPerSecond(pub f64);

impl_unit_ops!(RadiansPerSecond, "rad/s");

impl Hertz {
    /// ω = 2πf
    #[inline]
    pub fn to_angular(self) -> RadiansPerSecond {
        RadiansPerSecond(TAU * self.0)
    }

    /// Nordic / European system frequency
    pub const FIFTY: Self = Self(50.0);
}

impl RadiansPerSecond {
    /// f = ω / 2π
    #[inline]
    pub fn to_hertz(self) -> Hertz {
        Hertz(self.0 / TAU)
    }
}

// =============================================================================
// Time Units
// =============================================================================

/// Time or time constant in seconds
///
/// Inertia constants (H) are expressed in seconds on the machine base.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Seconds(pub f64);

impl_unit_ops!(Seconds, "s");

// =============================================================================
// Gain Units
// =============================================================================

/// Gain in decibels (20·log10 of an amplitude ratio)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Decibels(pub f64);

impl_unit_ops!(Decibels, "dB");

impl Decibels {
    /// Amplitude ratio to dB
    #[inline]
    pub fn from_amplitude(ratio: f64) -> Self {
        Decibels(20.0 * ratio.log10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_angle_conversion() {
        let deg = Degrees(180.0);
        let rad = deg.to_radians();

        assert!((rad.value() - PI).abs() < 1e-10);
        assert!((rad.to_degrees().value() - 180.0).abs() < 1e-10);
    }

    #[test]
    fn test_degrees_round_trip() {
        let deg = Degrees(-20.0);
        assert!((deg.to_radians().to_degrees().value() + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_conversion() {
        let w = Hertz(50.0).to_angular();
        assert!((w.value() - 100.0 * PI).abs() < 1e-10);
        assert!((w.to_hertz().value() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_decibels() {
        assert!(Decibels::from_amplitude(1.0).value().abs() < 1e-12);
        assert!((Decibels::from_amplitude(10.0).value() - 20.0).abs() < 1e-12);
        assert!((Decibels::from_amplitude(0.5).value() + 6.0206).abs() < 1e-4);
    }

    #[test]
    fn test_arithmetic() {
        let a = Seconds(6.5);
        assert_eq!((a * 2.0).value(), 13.0);
        assert_eq!((a - Seconds(0.5)).value(), 6.0);
        assert_eq!(a / Seconds(6.5), 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Hertz(50.0)), "50.0000 Hz");
        assert_eq!(format!("{}", Degrees(45.0)), "45.0000 °");
        assert_eq!(format!("{}", Seconds(6.5)), "6.5000 s");
    }
}
