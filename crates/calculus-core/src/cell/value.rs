//! Cell value types

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::duration;

/// Represents the value stored in a cell
///
/// The variant is the cell's type: there is no separate type field that could
/// drift out of sync with the payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Whole number
    Integer(i64),

    /// Floating point number
    Float(f64),

    /// String value (formula text included, see [`Cell::formula`](super::Cell::formula))
    String(String),

    /// Point in time, always UTC
    Date(DateTime<Utc>),

    /// Elapsed time
    Duration(Duration),

    /// Error literal as stored by the source format (e.g. `#DIV/0!`)
    Error(String),
}

/// The category of a [`CellValue`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellValueType {
    Empty,
    Boolean,
    Integer,
    Float,
    String,
    Date,
    Duration,
    Error,
}

impl CellValueType {
    /// Lowercase name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            CellValueType::Empty => "empty",
            CellValueType::Boolean => "boolean",
            CellValueType::Integer => "integer",
            CellValueType::Float => "float",
            CellValueType::String => "string",
            CellValueType::Date => "date",
            CellValueType::Duration => "duration",
            CellValueType::Error => "error",
        }
    }
}

impl fmt::Display for CellValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Create a new error value
    pub fn error<S: Into<String>>(s: S) -> Self {
        CellValue::Error(s.into())
    }

    /// Coerce any displayable value into a string cell
    ///
    /// This is the fallback for types outside the closed set of cell categories.
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        CellValue::String(value.to_string())
    }

    /// Coerce any value into a string cell using its debug rendering
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        CellValue::String(format!("{:?}", value))
    }

    /// Get the type of the stored value
    pub fn value_type(&self) -> CellValueType {
        match self {
            CellValue::Empty => CellValueType::Empty,
            CellValue::Boolean(_) => CellValueType::Boolean,
            CellValue::Integer(_) => CellValueType::Integer,
            CellValue::Float(_) => CellValueType::Float,
            CellValue::String(_) => CellValueType::String,
            CellValue::Date(_) => CellValueType::Date,
            CellValue::Duration(_) => CellValueType::Duration,
            CellValue::Error(_) => CellValueType::Error,
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the value is an integer or a float
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a float (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            CellValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Render the value as plain text, the way text-based formats store it
    ///
    /// - booleans as `true`/`false`
    /// - numbers in their shortest exact decimal form, never in exponent notation
    /// - dates as `YYYY-MM-DDTHH:MM:SS` plus up to six significant fraction digits
    /// - durations in ISO-8601 form
    /// - empty cells as an empty string
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Float(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Date(d) => format_timestamp(d),
            CellValue::Duration(d) => duration::format(*d),
            CellValue::Error(e) => e.clone(),
        }
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let mut text = timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = timestamp.nanosecond() % 1_000_000_000 / 1_000;
    if micros > 0 {
        let fraction = format!("{:06}", micros);
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

macro_rules! from_narrow {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(n: $t) -> Self {
                    CellValue::Integer(n as i64)
                }
            }
        )*
    };
}

from_narrow!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! from_wide {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(n: $t) -> Self {
                    // Values beyond i64 keep their magnitude as a float
                    match i64::try_from(n) {
                        Ok(n) => CellValue::Integer(n),
                        Err(_) => CellValue::Float(n as f64),
                    }
                }
            }
        )*
    };
}

from_wide!(isize, usize, u64, i128, u128);

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        // Widen via the shortest decimal form so 0.1f32 stays 0.1
        CellValue::Float(n.to_string().parse().unwrap_or(n as f64))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

impl From<char> for CellValue {
    fn from(c: char) -> Self {
        CellValue::String(c.to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CellValue {
    fn from(d: DateTime<Tz>) -> Self {
        CellValue::Date(d.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d.and_utc())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(NaiveDateTime::from(d).and_utc())
    }
}

impl From<Duration> for CellValue {
    fn from(d: Duration) -> Self {
        CellValue::Duration(d)
    }
}

impl From<std::time::Duration> for CellValue {
    fn from(d: std::time::Duration) -> Self {
        match Duration::from_std(d) {
            Ok(d) => CellValue::Duration(d),
            Err(_) => CellValue::debug(&d),
        }
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

impl From<()> for CellValue {
    fn from(_: ()) -> Self {
        CellValue::Empty
    }
}

impl<T: fmt::Debug> From<Vec<T>> for CellValue {
    fn from(values: Vec<T>) -> Self {
        CellValue::debug(&values)
    }
}

impl<T: fmt::Debug> From<&[T]> for CellValue {
    fn from(values: &[T]) -> Self {
        CellValue::debug(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));
        assert_eq!(CellValue::from(42), CellValue::Integer(42));
        assert_eq!(CellValue::from(42u8), CellValue::Integer(42));
        assert_eq!(CellValue::from(-7i16), CellValue::Integer(-7));
        assert_eq!(CellValue::from(3.14), CellValue::Float(3.14));
        assert_eq!(CellValue::from(0.1f32), CellValue::Float(0.1));
        assert_eq!(CellValue::from("hello"), CellValue::string("hello"));
        assert_eq!(CellValue::from('x'), CellValue::string("x"));
        assert_eq!(CellValue::from(None::<i32>), CellValue::Empty);
        assert_eq!(CellValue::from(Some("a")), CellValue::string("a"));
        assert_eq!(CellValue::from(()), CellValue::Empty);
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(CellValue::from(u64::MAX >> 1), CellValue::Integer(i64::MAX));
        assert_eq!(CellValue::from(u64::MAX), CellValue::Float(u64::MAX as f64));
        assert_eq!(CellValue::from(7usize), CellValue::Integer(7));
    }

    #[test]
    fn test_value_type_matches_variant() {
        let cases = [
            (CellValue::from(()), CellValueType::Empty),
            (CellValue::from(false), CellValueType::Boolean),
            (CellValue::from(1), CellValueType::Integer),
            (CellValue::from(1.5), CellValueType::Float),
            (CellValue::from("s"), CellValueType::String),
            (
                CellValue::from(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
                CellValueType::Date,
            ),
            (CellValue::from(Duration::hours(1)), CellValueType::Duration),
            (CellValue::error("#N/A"), CellValueType::Error),
        ];
        for (value, expected) in cases {
            assert_eq!(value.value_type(), expected, "{:?}", value);
        }
    }

    #[test]
    fn test_formula_text_is_a_string() {
        let value = CellValue::from("=SUM(A1:A3)");
        assert_eq!(value.value_type(), CellValueType::String);
    }

    #[test]
    fn test_composite_values_coerce_to_string() {
        let empty: Vec<f64> = Vec::new();
        assert_eq!(CellValue::from(empty), CellValue::string("[]"));
        assert_eq!(CellValue::from(vec![1, 2]), CellValue::string("[1, 2]"));
        assert_eq!(
            CellValue::from(&["a", "b"][..]),
            CellValue::string(r#"["a", "b"]"#)
        );

        struct Point(i32, i32);
        impl fmt::Display for Point {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}, {})", self.0, self.1)
            }
        }
        assert_eq!(
            CellValue::display(&Point(1, 2)),
            CellValue::string("(1, 2)")
        );
    }

    #[test]
    fn test_naive_dates_are_utc() {
        let date = NaiveDate::from_ymd_opt(2019, 8, 13).unwrap();
        assert_eq!(
            CellValue::from(date),
            CellValue::Date(Utc.with_ymd_and_hms(2019, 8, 13, 0, 0, 0).unwrap())
        );
        let offset = chrono::FixedOffset::east_opt(3600).unwrap();
        let local = offset.with_ymd_and_hms(2019, 8, 13, 13, 0, 0).unwrap();
        assert_eq!(
            CellValue::from(local),
            CellValue::Date(Utc.with_ymd_and_hms(2019, 8, 13, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_std_duration() {
        assert_eq!(
            CellValue::from(std::time::Duration::from_secs(90)),
            CellValue::Duration(Duration::seconds(90))
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::Float(2.5).as_i64(), None);
        assert_eq!(CellValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(CellValue::string("x").as_str(), Some("x"));
        assert_eq!(CellValue::Empty.as_str(), None);
        assert!(CellValue::Integer(0).is_number());
        assert!(!CellValue::string("1").is_number());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Empty.to_text(), "");
        assert_eq!(CellValue::Boolean(false).to_text(), "false");
        assert_eq!(CellValue::Integer(-12).to_text(), "-12");
        assert_eq!(CellValue::Float(3.1415926535).to_text(), "3.1415926535");
        assert_eq!(CellValue::Float(42.0).to_text(), "42");
        assert_eq!(CellValue::Float(1e21).to_text(), "1000000000000000000000");
        assert_eq!(CellValue::Float(-0.0002).to_text(), "-0.0002");
        assert_eq!(
            CellValue::Duration(Duration::minutes(90)).to_text(),
            "PT1H30M"
        );
        assert_eq!(CellValue::error("#REF!").to_text(), "#REF!");
    }

    #[test]
    fn test_to_text_dates() {
        let t = Utc.with_ymd_and_hms(2019, 8, 13, 12, 13, 14).unwrap();
        assert_eq!(CellValue::Date(t).to_text(), "2019-08-13T12:13:14");

        let t = NaiveDate::from_ymd_opt(2019, 8, 13)
            .unwrap()
            .and_hms_micro_opt(12, 13, 14, 250_000)
            .unwrap()
            .and_utc();
        assert_eq!(CellValue::Date(t).to_text(), "2019-08-13T12:13:14.25");
    }
}
