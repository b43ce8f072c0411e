//! Length-prefixed digit cursor primitives for the ptdsave codec.
//!
//! This crate provides [`Cursor`] and [`Writer`] for reading and writing the
//! decimal digit-prefixed payload format, along with the [`Number`] and
//! [`DoubleNumber`] integer wrappers.
//!
//! # Design Principles
//!
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about profiles,
//!   parties, or save slots.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use cursor::{Cursor, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_number(456u64).unwrap();
//! writer.write_string("n").unwrap();
//!
//! let payload = writer.finish();
//!
//! let mut cursor = Cursor::new(&payload);
//! assert_eq!(cursor.read_number().unwrap().raw(), 456);
//! assert_eq!(cursor.read_string().unwrap(), "n");
//! assert!(cursor.is_finished());
//! ```

mod error;
mod number;
mod reader;
mod writer;

pub use error::{CursorError, CursorResult};
pub use number::{DoubleNumber, Number, NUMBER_MAX};
pub use reader::Cursor;
pub use writer::Writer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Number::new(0);
        let _ = DoubleNumber::new(0);
        let _ = Writer::new();
        let _: CursorResult<()> = Ok(());
        assert_eq!(NUMBER_MAX, 10_000_000_000);
    }

    #[test]
    fn framed_buffer_passes_its_own_integrity_check() {
        let mut writer = Writer::new();
        writer.write_number(2u64).unwrap();
        writer.write_double_number(117u64).unwrap();
        writer.write_string("n").unwrap();
        let framed = writer.into_framed();

        let mut cursor = Cursor::new(&framed);
        let declared = cursor.read_number().unwrap().raw() as usize;
        cursor.read_number().unwrap();
        cursor.read_double_number().unwrap();
        cursor.read_string().unwrap();
        assert_eq!(cursor.position(), declared);
    }
}
