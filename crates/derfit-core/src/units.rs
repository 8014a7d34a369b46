//! Unit-safe power quantities for connection categories.
//!
//! Installed load, category load bounds, generation ceilings and kit ratings are all
//! expressed in kilowatts. Kit ratings are quoted in kWp (peak) by vendors but compared
//! one-to-one against the kW ceilings of the reference tables, so they share the type.
//!
//! # Usage
//!
//! ```
//! use derfit_core::units::Kilowatts;
//!
//! let ceiling = Kilowatts(5.0);
//! let kit = Kilowatts::new(4.0);
//! assert!(kit <= ceiling);
//! assert_eq!(kit.to_string(), "4.00 kW");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power in kilowatts (kW)
///
/// Used for installed load, category load ranges, generation ceilings and kit ratings.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl Kilowatts {
    /// Zero kilowatts
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw numeric value
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Kilowatts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kW", self.0)
    }
}
