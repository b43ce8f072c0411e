//! Party member record.

use serde::{Deserialize, Serialize};

/// A single stored party member.
///
/// `save_id` is assigned by the save service, unique within a save, and is
/// how the partial-update protocol addresses the record. `nickname` never
/// travels inside the encoded payload; it rides in a separate parameter
/// channel keyed by payload position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub save_id: u64,
    pub pokedex_num: u64,
    pub exp: u64,
    pub level: u64,
    pub moves: [u64; 4],
    pub targeting_type: u64,
    pub gender: u64,
    pub party_position: u64,
    /// Elemental/shiny/shadow modifier, derived on decode as the combined
    /// element value minus the pokedex number; may go negative for hacked
    /// saves, which then fail re-encoding.
    pub extra: i64,
    pub held_item: u64,
    /// `"h"` for hacked, `"n"` for normal.
    pub hacked_tag: String,
    pub selected_move: u64,
    pub selected_ability: u64,
    pub nickname: Option<String>,
}
