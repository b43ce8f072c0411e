//! Story profile record.

use serde::{Deserialize, Serialize};

/// One of a player's numbered story save slots.
///
/// `game_version` and `gender` arrive from the client as raw form strings
/// and are stored verbatim; the client interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Slot number (1, 2, 3).
    pub profile_id: u64,
    pub nickname: String,
    /// The client's version pick, like red/blue ("2" is Omega).
    pub game_version: String,
    pub gender: String,
    pub money: u64,
    pub max_level_accomplished: u64,
    pub max_level_complete: u64,
}

impl Profile {
    /// The canonical profile a brand-new game starts from.
    ///
    /// The new-game flags overwrite nickname, version and gender before the
    /// profile is ever stored; these are the fallback values the client
    /// itself assumes.
    #[must_use]
    pub fn new_game() -> Self {
        Self {
            profile_id: 1,
            nickname: "Red".to_owned(),
            game_version: "2".to_owned(),
            gender: "0".to_owned(),
            money: 10,
            max_level_accomplished: 1,
            max_level_complete: 1,
        }
    }
}
