use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "price must be finite");
        assert!(value >= 0.0, "price must be non-negative");

        Price(value)
    }

    /// Feed-facing constructor; rejects values `new` would panic on.
    pub fn try_new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Price(value))
        } else {
            None
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn with_digits(self, digits: u32) -> String {
        format!("{:.*}", digits as usize, self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_nan_and_negative() {
        assert!(Price::try_new(f64::NAN).is_none());
        assert!(Price::try_new(-0.5).is_none());
        assert_eq!(Price::try_new(1.25).map(Price::as_f64), Some(1.25));
    }

    #[test]
    fn formats_with_instrument_digits() {
        assert_eq!(Price::new(1.234567).with_digits(5), "1.23457");
        assert_eq!(Price::new(2350.1).with_digits(2), "2350.10");
        assert_eq!(Price::new(7.0).with_digits(0), "7");
    }
}
