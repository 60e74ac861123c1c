use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Exact beat count in quarter notes, kept as a reduced fraction
///
/// Measure filling compares sums of durations against a 4-beat bar, so
/// durations are added exactly instead of as floats. Token denominators are
/// capped at 64, so every sum has a denominator dividing lcm(1..=64), about
/// 1.2e27, which fits comfortably in `i128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Beats {
    numerator: i128,
    denominator: i128,
}

impl Beats {
    pub const ZERO: Beats = Beats {
        numerator: 0,
        denominator: 1,
    };

    /// Beats in one 4/4 measure
    pub const MEASURE: Beats = Beats {
        numerator: 4,
        denominator: 1,
    };

    /// Create a beat count and reduce it. `denominator` must be non-zero.
    pub fn new(numerator: i128, denominator: i128) -> Self {
        assert!(denominator != 0, "beat denominator cannot be zero");
        let mut beats = Beats {
            numerator,
            denominator,
        };
        beats.reduce();
        beats
    }

    pub fn whole(n: i128) -> Self {
        Beats {
            numerator: n,
            denominator: 1,
        }
    }

    pub fn numerator(&self) -> i128 {
        self.numerator
    }

    pub fn denominator(&self) -> i128 {
        self.denominator
    }

    /// Quarter-note length as a float, for timing consumers
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    fn reduce(&mut self) {
        let gcd = gcd(self.numerator.abs(), self.denominator.abs());
        if gcd > 1 {
            self.numerator /= gcd;
            self.denominator /= gcd;
        }
        if self.denominator < 0 {
            self.numerator = -self.numerator;
            self.denominator = -self.denominator;
        }
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

fn lcm(a: i128, b: i128) -> i128 {
    (a / gcd(a, b)) * b
}

impl Default for Beats {
    fn default() -> Self {
        Beats::ZERO
    }
}

impl fmt::Display for Beats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl Add for Beats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let lcm = lcm(self.denominator, other.denominator);
        let a = self.numerator * (lcm / self.denominator);
        let b = other.numerator * (lcm / other.denominator);
        Beats::new(a + b, lcm)
    }
}

impl Sub for Beats {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let lcm = lcm(self.denominator, other.denominator);
        let a = self.numerator * (lcm / self.denominator);
        let b = other.numerator * (lcm / other.denominator);
        Beats::new(a - b, lcm)
    }
}

impl Sum for Beats {
    fn sum<I: Iterator<Item = Beats>>(iter: I) -> Self {
        iter.fold(Beats::ZERO, |acc, b| acc + b)
    }
}

impl PartialOrd for Beats {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Beats {
    fn cmp(&self, other: &Self) -> Ordering {
        // cross-multiplying could overflow; the difference stays small
        (*self - *other).numerator.cmp(&0)
    }
}
