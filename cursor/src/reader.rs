//! Read cursor over a digit-encoded payload.

use crate::error::{CursorError, CursorResult};
use crate::number::{DoubleNumber, Number};

/// A read cursor over a deciphered payload string.
///
/// Every read advances the position by exactly the number of characters
/// consumed. Loaders compare the final [`position`](Self::position) against
/// the payload's declared total length as an integrity check.
#[derive(Debug)]
pub struct Cursor<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of characters remaining.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if the cursor has consumed the whole payload.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Reads a [`Number`]: one digit-count digit, then that many digits.
    pub fn read_number(&mut self) -> CursorResult<Number> {
        let count = self.read_count_digit()?;
        let value = self.read_digit_run(count)?;
        Ok(Number::new(value))
    }

    /// Reads a [`DoubleNumber`]: a [`Number`] digit count, then the digits.
    pub fn read_double_number(&mut self) -> CursorResult<DoubleNumber> {
        let count = self.read_number()?.raw() as usize;
        let value = self.read_digit_run(count)?;
        Ok(DoubleNumber::new(value))
    }

    /// Reads a string field: one length digit, then that many characters.
    pub fn read_string(&mut self) -> CursorResult<String> {
        let length = self.read_count_digit()?;
        let bytes = self.data.as_bytes();
        if self.pos + length > bytes.len() {
            return Err(CursorError::UnexpectedEnd {
                requested: length,
                available: bytes.len() - self.pos,
            });
        }
        let value = self
            .data
            .get(self.pos..self.pos + length)
            .ok_or(CursorError::UnexpectedEnd {
                requested: length,
                available: bytes.len() - self.pos,
            })?
            .to_owned();
        self.pos += length;
        Ok(value)
    }

    fn read_count_digit(&mut self) -> CursorResult<usize> {
        let bytes = self.data.as_bytes();
        let Some(&byte) = bytes.get(self.pos) else {
            return Err(CursorError::UnexpectedEnd {
                requested: 1,
                available: 0,
            });
        };
        if !byte.is_ascii_digit() {
            return Err(CursorError::NonDigit {
                position: self.pos,
                found: byte as char,
            });
        }
        self.pos += 1;
        Ok((byte - b'0') as usize)
    }

    fn read_digit_run(&mut self, count: usize) -> CursorResult<u64> {
        let bytes = self.data.as_bytes();
        if self.pos + count > bytes.len() {
            return Err(CursorError::UnexpectedEnd {
                requested: count,
                available: bytes.len() - self.pos,
            });
        }
        if count > 20 {
            return Err(CursorError::DigitOverflow { count });
        }
        let mut value: u64 = 0;
        for offset in 0..count {
            let byte = bytes[self.pos + offset];
            if !byte.is_ascii_digit() {
                return Err(CursorError::NonDigit {
                    position: self.pos + offset,
                    found: byte as char,
                });
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                .ok_or(CursorError::DigitOverflow { count })?;
        }
        self.pos += count;
        Ok(value)
    }
}
