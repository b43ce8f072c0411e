//! Save payload loaders and encoders for the ptdsave service.
//!
//! This crate ties the digit cursor, the substitution cipher and the record
//! definitions together into the loaders the save service runs:
//!
//! - Party diffs: field-tagged insert/update/delete entries (`extra3`)
//! - Profile flag updates and profile list encoding (`extra`)
//! - Inventory and extra-info lists (`extra4`, `extra2`)
//!
//! Every loader deciphers its payload, walks it with a bounds-checked
//! cursor, and finishes by checking the cursor position against the
//! payload's declared total length. Every encoder produces the framed,
//! cipher-encoded string the client expects.
//!
//! # Design Principles
//!
//! - **Correctness first** - Wire layouts are fixed by the game client and
//!   covered by captured payload fixtures.
//! - **Closed tag set** - Party field tags are an enum; unknown tags fail
//!   decoding instead of falling through.
//! - **No partial commits** - Loaders return fully decoded results or an
//!   error; nothing is persisted from here.

mod error;
mod extras;
mod inventory;
mod party;
mod profile;
mod tag;

pub use error::{CodecError, CodecResult};
pub use extras::{decode_extras, encode_extras};
pub use inventory::{decode_items, encode_items};
pub use party::{decode_party, encode_party, PartyDiff};
pub use profile::{
    apply_update, encode_profiles, encode_story_profile, nickname_positions, ProfileUpdate,
};
pub use tag::{FieldTag, UpdateField};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = PartyDiff::default();
        let _ = ProfileUpdate::default();
        let _: CodecResult<()> = Ok(());
        assert_eq!(FieldTag::Release.raw(), 15);
    }
}
