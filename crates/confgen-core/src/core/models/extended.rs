use std::cmp::Ordering;
use std::fmt;

/// A real value extended with a positive-infinity sentinel.
///
/// `Infinite` marks a quantity that could not be evaluated (an energy that failed to
/// compute, a distance between incomparable geometries). It compares greater than every
/// finite value and equal to itself, so sequences of `ExtendedReal` have a total order and
/// can be sorted without special cases. Non-finite floats never appear inside `Finite`.
#[derive(Debug, Clone, Copy)]
pub enum ExtendedReal {
    Finite(f64),
    Infinite,
}

impl ExtendedReal {
    /// Wraps a float, mapping NaN and both infinities to `Infinite`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Finite(value)
        } else {
            Self::Infinite
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    #[inline]
    pub fn finite(&self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(*v),
            Self::Infinite => None,
        }
    }

    /// The value as a float, with `Infinite` mapped to `f64::INFINITY`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Finite(v) => v,
            Self::Infinite => f64::INFINITY,
        }
    }

    /// `self >= threshold`, where `Infinite` satisfies every threshold.
    #[inline]
    pub fn at_least(&self, threshold: f64) -> bool {
        match self {
            Self::Finite(v) => *v >= threshold,
            Self::Infinite => true,
        }
    }
}

impl From<f64> for ExtendedReal {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for ExtendedReal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExtendedReal {}

impl PartialOrd for ExtendedReal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExtendedReal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a.total_cmp(b),
            (Self::Finite(_), Self::Infinite) => Ordering::Less,
            (Self::Infinite, Self::Finite(_)) => Ordering::Greater,
            (Self::Infinite, Self::Infinite) => Ordering::Equal,
        }
    }
}

impl fmt::Display for ExtendedReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Self::Infinite => f.write_str("inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_inputs_become_infinite() {
        assert_eq!(ExtendedReal::new(f64::NAN), ExtendedReal::Infinite);
        assert_eq!(ExtendedReal::new(f64::INFINITY), ExtendedReal::Infinite);
        assert_eq!(ExtendedReal::new(f64::NEG_INFINITY), ExtendedReal::Infinite);
        assert_eq!(ExtendedReal::new(-3.5), ExtendedReal::Finite(-3.5));
    }

    #[test]
    fn infinite_is_greater_than_any_finite_value() {
        let inf = ExtendedReal::Infinite;
        assert!(inf > ExtendedReal::Finite(f64::MAX));
        assert!(ExtendedReal::Finite(-1e300) < inf);
        assert_eq!(inf.cmp(&ExtendedReal::Infinite), Ordering::Equal);
    }

    #[test]
    fn sorting_places_infinite_values_last() {
        let mut values = vec![
            ExtendedReal::Infinite,
            ExtendedReal::Finite(2.0),
            ExtendedReal::Finite(-1.0),
            ExtendedReal::Infinite,
            ExtendedReal::Finite(0.5),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                ExtendedReal::Finite(-1.0),
                ExtendedReal::Finite(0.5),
                ExtendedReal::Finite(2.0),
                ExtendedReal::Infinite,
                ExtendedReal::Infinite,
            ]
        );
    }

    #[test]
    fn at_least_treats_infinite_as_maximally_large() {
        assert!(ExtendedReal::Infinite.at_least(1e9));
        assert!(ExtendedReal::Finite(0.5).at_least(0.5));
        assert!(!ExtendedReal::Finite(0.49).at_least(0.5));
    }

    #[test]
    fn display_honours_precision_and_prints_inf() {
        assert_eq!(format!("{:.2}", ExtendedReal::Finite(1.23456)), "1.23");
        assert_eq!(format!("{}", ExtendedReal::Infinite), "inf");
    }
}
