//! Cell value type codes

use std::fmt;

/// Value type code carried by the `ValueType` attribute of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Empty,
    Boolean,
    Integer,
    Float,
    Error,
    String,
    CellRange,
    Array,
}

impl ValueType {
    /// Numeric code as stored in the document
    pub fn code(&self) -> u16 {
        match self {
            ValueType::Empty => 10,
            ValueType::Boolean => 20,
            ValueType::Integer => 30,
            ValueType::Float => 40,
            ValueType::Error => 50,
            ValueType::String => 60,
            ValueType::CellRange => 70,
            ValueType::Array => 80,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            10 => Some(ValueType::Empty),
            20 => Some(ValueType::Boolean),
            30 => Some(ValueType::Integer),
            40 => Some(ValueType::Float),
            50 => Some(ValueType::Error),
            60 => Some(ValueType::String),
            70 => Some(ValueType::CellRange),
            80 => Some(ValueType::Array),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for code in (10..=80).step_by(10) {
            let value_type = ValueType::from_code(code).unwrap();
            assert_eq!(value_type.code(), code);
        }
        assert_eq!(ValueType::from_code(15), None);
        assert_eq!(ValueType::Float.to_string(), "40");
    }
}
