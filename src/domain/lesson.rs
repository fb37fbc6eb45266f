use crate::error::BookingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Opaque identifier assigned to a lesson by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LessonId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LessonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monetary value between zero and [`Price::MAX`].
///
/// Wraps `rust_decimal::Decimal` so line totals are computed without float rounding.
/// The upper bound keeps `price * u32::MAX` summed over any realistic cart far
/// below `Decimal::MAX`, so the arithmetic below cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const MAX: Self = Self(dec!(1_000_000_000));

    pub fn new(value: Decimal) -> Result<Self, BookingError> {
        if (Decimal::ZERO..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BookingError::InvalidPrice)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = BookingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Price {
    type Output = Self;
    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// A bookable driving lesson as returned by the catalog service.
///
/// The session only ever holds read-only snapshots; `spaces` is the remaining
/// capacity at the moment the snapshot was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(alias = "_id")]
    pub id: LessonId,
    pub subject: String,
    pub location: String,
    pub price: Price,
    pub spaces: u32,
    #[serde(default)]
    pub image: String,
}

impl Lesson {
    pub fn is_available(&self) -> bool {
        self.spaces > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_rejects_negative() {
        assert!(Price::new(dec!(0)).is_ok());
        assert!(Price::new(dec!(49.99)).is_ok());
        assert!(matches!(
            Price::new(dec!(-1)),
            Err(BookingError::InvalidPrice)
        ));
    }

    #[test]
    fn test_price_rejects_values_above_max() {
        assert!(Price::new(dec!(1_000_000_000)).is_ok());
        assert!(matches!(
            Price::new(dec!(1_000_000_000.01)),
            Err(BookingError::InvalidPrice)
        ));
        assert!(Price::new(Decimal::MAX).is_err());
    }

    #[test]
    fn test_lesson_rejects_huge_price() {
        let json = r#"{"id":"abc","subject":"Parking","location":"York","price":79228162514264337593543950335,"spaces":4294967295}"#;
        assert!(serde_json::from_str::<Lesson>(json).is_err());
    }

    #[test]
    fn test_max_price_times_max_quantity_does_not_overflow() {
        let line = Price::MAX * u32::MAX;
        let total: Price = vec![line; 1000].into_iter().sum();
        assert!(total > line);
    }

    #[test]
    fn test_price_arithmetic() {
        let price = Price::new(dec!(12.50)).unwrap();
        assert_eq!(price * 3, Price::new(dec!(37.50)).unwrap());

        let total: Price = vec![price, price].into_iter().sum();
        assert_eq!(total, Price::new(dec!(25)).unwrap());
    }

    #[test]
    fn test_lesson_deserializes_mongo_style_id() {
        let json = r#"{"_id":"abc","subject":"Motorway","location":"Leeds","price":50,"spaces":5,"image":"motorway.png"}"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.id, LessonId::from("abc"));
        assert_eq!(lesson.price, Price::new(dec!(50)).unwrap());
        assert_eq!(lesson.spaces, 5);
    }

    #[test]
    fn test_lesson_rejects_negative_price() {
        let json = r#"{"id":"abc","subject":"Parking","location":"York","price":-5,"spaces":1}"#;
        assert!(serde_json::from_str::<Lesson>(json).is_err());
    }
}
