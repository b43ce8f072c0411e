//! Transport framing for the ptdsave service.
//!
//! This crate covers everything between the HTTP body and the structural
//! payload codec: the digit/letter substitution cipher every payload passes
//! through, the additive checksum the client verifies on story loads, and
//! the `key=value` form framing used in both directions.
//!
//! # Example
//!
//! ```
//! use wire::{decipher, encipher};
//!
//! let payload = "29812111";
//! let sent = encipher(payload);
//! assert_eq!(sent, "woeywyyy");
//! assert_eq!(decipher(&sent), payload);
//! ```

mod checksum;
mod cipher;
mod error;
mod form;

pub use checksum::story_checksum;
pub use cipher::{decipher, encipher, TRANSLATE_KEY};
pub use error::{WireError, WireResult};
pub use form::{percent_decode, Request, Response};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Request::default();
        let _ = Response::new();
        let _: WireResult<()> = Ok(());
        assert_eq!(TRANSLATE_KEY.len(), 10);
    }

    #[test]
    fn cipher_and_checksum_compose() {
        let cs = encipher("12345");
        let check = story_checksum(&format!("woqy{cs}"));
        assert_eq!(check, story_checksum(&format!("woqy{cs}")));
    }
}
