//! Move representation and the peer-to-peer wire format.
//!
//! A move travels between peers as one ASCII line of four comma-separated
//! integers, `fromRow,fromCol,toRow,toCol`, each in 0-7.

use crate::Square;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing a wire record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("invalid move record: expected 4 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid move record: field {index} is not an integer: '{value}'")]
    NotAnInteger { index: usize, value: String },

    #[error("invalid move record: coordinate {0} out of range 0-7")]
    OutOfRange(i64),

    #[error("invalid move record: {0} bytes is too long")]
    TooLong(usize),

    #[error("invalid move record: not valid UTF-8")]
    NotUtf8,
}

/// Longest record accepted, excluding the newline. A canonical record is
/// seven bytes; the rest leaves room for padding around the fields.
pub const MAX_WIRE_LEN: usize = 15;

/// A move from one square to another: the sole unit exchanged with the peer.
///
/// Castling and promotion are not encoded; both peers derive them from the
/// piece and squares involved.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    /// Serializes the move as a wire record, without the trailing newline.
    pub fn to_wire(self) -> String {
        format!(
            "{},{},{},{}",
            self.from.row(),
            self.from.col(),
            self.to.row(),
            self.to.col()
        )
    }

    /// Parses a wire record. Surrounding whitespace (including the line
    /// terminator) is ignored.
    pub fn from_wire(line: &str) -> Result<Self, WireError> {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != 4 {
            return Err(WireError::FieldCount(fields.len()));
        }

        Ok(Move {
            from: square_at(&fields, 0)?,
            to: square_at(&fields, 2)?,
        })
    }

    /// Parses a raw record as read off the connection, newline stripped.
    ///
    /// Records longer than [`MAX_WIRE_LEN`] or not valid UTF-8 are refused
    /// before any field is looked at.
    pub fn from_wire_bytes(record: &[u8]) -> Result<Self, WireError> {
        if record.len() > MAX_WIRE_LEN {
            return Err(WireError::TooLong(record.len()));
        }
        let line = std::str::from_utf8(record).map_err(|_| WireError::NotUtf8)?;
        Move::from_wire(line)
    }
}

/// Reads the row and column fields starting at `index`.
fn square_at(fields: &[&str], index: usize) -> Result<Square, WireError> {
    let row = coordinate(fields, index)?;
    let col = coordinate(fields, index + 1)?;
    match (u8::try_from(row), u8::try_from(col)) {
        (Ok(r), Ok(c)) => Square::new(r, c),
        _ => None,
    }
    .ok_or(WireError::OutOfRange(if (0..8).contains(&row) { col } else { row }))
}

fn coordinate(fields: &[&str], index: usize) -> Result<i64, WireError> {
    let field = fields[index].trim();
    field.parse().map_err(|_| WireError::NotAnInteger {
        index,
        value: field.to_string(),
    })
}

impl FromStr for Move {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_wire(s)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}{})", self.from, self.to)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}
