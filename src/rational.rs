//! Exact onset arithmetic
//!
//! All onsets and durations are whole-note fractions. Tablature and
//! transcription encode tuplets differently (a triplet crotchet may arrive
//! as 1/3 from one side and 21/64 from the other), so onsets are compared
//! through a grid of the smallest rhythmic unit rather than exactly.

use num_rational::Rational64;

/// Re-export Rational for onset/duration calculations
pub type Rational = Rational64;

/// Smallest rhythmic unit used to align onsets (a semifusa triplet)
pub fn default_grid_unit() -> Rational {
    Rational::new(1, 96)
}

/// Absolute value without pulling in num-traits
pub fn abs(value: Rational) -> Rational {
    if value < Rational::from_integer(0) {
        -value
    } else {
        value
    }
}

/// Snap an onset to the nearest multiple of `grid_unit`
///
/// The onset is split into its integer and fractional parts; every
/// multiple of the unit within one whole is scanned and the one nearest to
/// the fractional part wins. Ties go to the higher multiple.
///
/// Example: `17/192` with unit `1/96` lies exactly between `8/96` and
/// `9/96` and snaps to `9/96`.
pub fn find_closest_multiple(onset: Rational, grid_unit: Rational) -> Rational {
    let whole = onset.trunc();
    let fraction = onset - whole;
    let steps = (Rational::from_integer(1) / grid_unit).ceil().to_integer();

    let mut best = Rational::from_integer(0);
    let mut best_distance: Option<Rational> = None;
    for k in 0..=steps {
        let candidate = grid_unit * k;
        let distance = abs(fraction - candidate);
        match best_distance {
            Some(d) if distance > d => {}
            _ => {
                best = candidate;
                best_distance = Some(distance);
            }
        }
    }

    whole + best
}

/// Round a fraction to the nearest integer-valued fraction
///
/// Works on the raw (unreduced) numerator and denominator: the numerator is
/// moved by 1, 2, 3, ... trying subtraction before addition at each step
/// until it divides the denominator.
///
/// `17/4` → `16/4` = `4`; raw `606/32` → `608/32` = `19`.
pub fn round_fraction(value: Rational) -> Rational {
    let numer = *value.numer();
    let denom = *value.denom();
    if denom == 0 || numer % denom == 0 {
        return Rational::from_integer(if denom == 0 { 0 } else { numer / denom });
    }

    let mut diff = 1;
    loop {
        if (numer - diff) % denom == 0 {
            return Rational::from_integer((numer - diff) / denom);
        }
        if (numer + diff) % denom == 0 {
            return Rational::from_integer((numer + diff) / denom);
        }
        diff += 1;
    }
}

/// Rounded onset as an integer count of grid units
pub fn onset_key(onset: Rational, grid_unit: Rational) -> i64 {
    round_fraction(onset / grid_unit).to_integer()
}
