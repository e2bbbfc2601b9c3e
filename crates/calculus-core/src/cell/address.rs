//! Cell address codec
//!
//! Converts between zero-based `(row, column)` pairs and A1-style references.
//! Column letters form a bijective base-26 numeral (A..Z, AA..AZ, BA..), rows are
//! one-based in the textual form.

use std::fmt;
use std::str::FromStr;

use lazy_regex::regex_captures;

use crate::error::{Error, Result};

/// A cell address (e.g., "A1", "AH12")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., AA=26)
    pub column: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Only uppercase letters followed by digits are accepted; the whole string
    /// must match.
    ///
    /// # Examples
    /// ```
    /// use calculus_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("AH12").unwrap();
    /// assert_eq!(addr.row, 11);
    /// assert_eq!(addr.column, 33);
    ///
    /// assert!(CellAddress::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (_, letters, digits) = regex_captures!(r"^([A-Z]+)([0-9]+)$", s)
            .ok_or_else(|| Error::MalformedReference(s.to_string()))?;

        let column = Self::letters_to_column(letters)
            .ok_or_else(|| Error::MalformedReference(s.to_string()))?;

        // Rows are 1-based externally; "A0" has no zero-based counterpart
        let row = digits
            .parse::<u32>()
            .ok()
            .and_then(|r| r.checked_sub(1))
            .ok_or_else(|| Error::MalformedReference(s.to_string()))?;

        Ok(Self { row, column })
    }

    /// Format a `(row, column)` pair as an A1-style reference
    ///
    /// Signed inputs are accepted so that callers doing coordinate arithmetic get
    /// an [`Error::InvalidCoordinate`] instead of a wrapped-around address.
    ///
    /// ```
    /// use calculus_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::format(999, 999).unwrap(), "ALL1000");
    /// assert!(CellAddress::format(-1, 0).is_err());
    /// ```
    pub fn format(row: i64, column: i64) -> Result<String> {
        if row < 0 || column < 0 || row >= u32::MAX as i64 || column > u32::MAX as i64 {
            return Err(Error::InvalidCoordinate { row, column });
        }
        Ok(Self::new(row as u32, column as u32).to_string())
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(column: u32) -> String {
        let mut letters = Vec::new();
        let mut value = column;

        loop {
            if value < 26 {
                letters.push(b'A' + value as u8);
                break;
            }
            letters.push(b'A' + (value % 26) as u8);
            value = value / 26 - 1;
        }

        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Convert uppercase column letters to an index (A = 0, Z = 25, AA = 26, etc.)
    ///
    /// Every letter but the last contributes `26^k * (digit + 1)`, the last one
    /// contributes its digit directly. Returns `None` on overflow or a character
    /// outside `A..=Z`.
    pub fn letters_to_column(letters: &str) -> Option<u32> {
        let bytes = letters.as_bytes();
        let (last, init) = bytes.split_last()?;

        let mut column: u64 = 0;
        for (i, &b) in init.iter().enumerate() {
            if !b.is_ascii_uppercase() {
                return None;
            }
            let exponent = (init.len() - i) as u32;
            let weight = 26u64.checked_pow(exponent)?;
            column = column.checked_add(weight.checked_mul((b - b'A') as u64 + 1)?)?;
        }

        if !last.is_ascii_uppercase() {
            return None;
        }
        column = column.checked_add((last - b'A') as u64)?;

        u32::try_from(column).ok()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Self::column_to_letters(self.column),
            self.row as u64 + 1
        )
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u32, u32)> for CellAddress {
    fn from((row, column): (u32, u32)) -> Self {
        Self::new(row, column)
    }
}

/// Parse an A1-style reference into a zero-based `(row, column)` pair
pub fn parse_coordinate(reference: &str) -> Result<(u32, u32)> {
    CellAddress::parse(reference).map(|addr| (addr.row, addr.column))
}

/// Format a zero-based `(row, column)` pair as an A1-style reference
pub fn format_coordinate(row: i64, column: i64) -> Result<String> {
    CellAddress::format(row, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(51), "AZ");
        assert_eq!(CellAddress::column_to_letters(52), "BA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A"), Some(0));
        assert_eq!(CellAddress::letters_to_column("Z"), Some(25));
        assert_eq!(CellAddress::letters_to_column("AA"), Some(26));
        assert_eq!(CellAddress::letters_to_column("ZZ"), Some(701));
        assert_eq!(CellAddress::letters_to_column("AAA"), Some(702));
        assert_eq!(CellAddress::letters_to_column("XFD"), Some(16383));
        assert_eq!(CellAddress::letters_to_column(""), None);
        assert_eq!(CellAddress::letters_to_column("a"), None);
        assert_eq!(CellAddress::letters_to_column("ZZZZZZZZZZ"), None);
    }

    #[test]
    fn test_parse_known_references() {
        let cases = [
            ("A1", 0, 0),
            ("Y17", 16, 24),
            ("AH12", 11, 33),
            ("BD27", 26, 55),
            ("ALL1000", 999, 999),
        ];
        for (reference, row, column) in cases {
            assert_eq!(
                parse_coordinate(reference).unwrap(),
                (row, column),
                "{}",
                reference
            );
            assert_eq!(
                format_coordinate(row as i64, column as i64).unwrap(),
                reference
            );
        }
    }

    #[test]
    fn test_parse_errors() {
        for reference in ["a1", "1A", "", "A", "1", "A1 ", " A1", "$A$1", "Ab1", "A0"] {
            assert!(
                matches!(
                    CellAddress::parse(reference),
                    Err(Error::MalformedReference(_))
                ),
                "{:?} should be rejected",
                reference
            );
        }
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(
            format_coordinate(-1, 0),
            Err(Error::InvalidCoordinate { row: -1, column: 0 })
        );
        assert_eq!(
            format_coordinate(0, -5),
            Err(Error::InvalidCoordinate { row: 0, column: -5 })
        );
    }

    #[test]
    fn test_display_and_from_str() {
        let addr: CellAddress = "BD27".parse().unwrap();
        assert_eq!(addr, CellAddress::new(26, 55));
        assert_eq!(addr.to_string(), "BD27");
    }

    proptest! {
        #[test]
        fn test_format_parse_roundtrip(row in 0u32..2_000_000, column in 0u32..500_000) {
            let reference = format_coordinate(row as i64, column as i64).unwrap();
            prop_assert_eq!(parse_coordinate(&reference).unwrap(), (row, column));
        }

        #[test]
        fn test_parse_format_roundtrip(reference in "[A-Z]{1,4}[1-9][0-9]{0,6}") {
            let (row, column) = parse_coordinate(&reference).unwrap();
            prop_assert_eq!(format_coordinate(row as i64, column as i64).unwrap(), reference);
        }
    }
}
