//! Inventory item record.

use serde::{Deserialize, Serialize};

/// An inventory entry: which item, and how many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: u64,
    pub quantity: u64,
}
