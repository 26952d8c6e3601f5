use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;
use std::fmt;

use crate::domain::FieldType;

const INTEGER_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;
const REAL_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1000.0;

/// A synthetic value produced for one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum MockValue {
    Text(String),
    Integer(i64),
    /// Already rounded to two decimal places
    Real(f64),
    Boolean(bool),
    /// Types without a generation rule (character, byte, short)
    Empty,
}

impl fmt::Display for MockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{:.2}", r),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Empty => Ok(()),
        }
    }
}

/// Stateless generator mapping a declared type to a random value.
///
/// Uses the thread-local RNG, so concurrent callers never share state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockValueGenerator;

impl MockValueGenerator {
    pub fn new() -> Self {
        Self
    }

    /// `field_name` is accepted for per-name rules but does not influence the value yet.
    pub fn generate(&self, field_type: FieldType, _field_name: &str) -> MockValue {
        match field_type {
            FieldType::String => MockValue::Text(Word().fake::<String>()),
            FieldType::Integer | FieldType::Long => {
                MockValue::Integer(rand::thread_rng().gen_range(INTEGER_RANGE))
            }
            FieldType::Double | FieldType::Float => {
                let value: f64 = rand::thread_rng().gen_range(REAL_RANGE);
                MockValue::Real((value * 100.0).round() / 100.0)
            }
            FieldType::Boolean => MockValue::Boolean(rand::thread_rng().gen_bool(0.5)),
            FieldType::Character | FieldType::Byte | FieldType::Short => MockValue::Empty,
        }
    }
}
