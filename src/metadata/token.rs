//! 4-byte metadata tokens as embedded in call-site operands and signatures.
//!
//! A token packs a table selector into its high byte and a 1-based row index into the low
//! 24 bits. `call 0x0A000003` therefore addresses row 3 of the MemberRef table.
//!
//! # Examples
//!
//! ```rust
//! use ilmock::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::new(0x0A00_0003);
//! assert_eq!(token.table(), 0x0A);
//! assert_eq!(token.table_id(), Some(TableId::MemberRef));
//! assert_eq!(token.row(), 3);
//! assert_eq!(Token::from_parts(TableId::MemberRef, 3), token);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableId;

/// A metadata token: table selector in the high byte, 1-based row in the low 24 bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Wrap a raw 4-byte token value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Build a token from a table and row.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Build a token from the little-endian operand bytes following a call opcode.
    #[must_use]
    pub fn from_operand(bytes: [u8; 4]) -> Self {
        Token(u32::from_le_bytes(bytes))
    }

    /// The raw token value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table selector (high byte).
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table selector as a known [`TableId`], or `None` for selectors this crate does not model.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_selector(self.table())
    }

    /// The 1-based row index (low 24 bits).
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// `true` for the all-zero token.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
