//! Inventory payload loading and encoding (`extra4`).

use cursor::{Cursor, Writer};
use records::Item;
use wire::{decipher, encipher};

use crate::error::{CodecError, CodecResult};

/// Loads the item list from a `saveStory` payload.
pub fn decode_items(payload: &str) -> CodecResult<Vec<Item>> {
    let plain = decipher(payload);
    let mut cur = Cursor::new(&plain);

    let final_index = cur.read_number()?.raw() as usize;
    let count = cur.read_number()?.raw();
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(Item {
            item_id: cur.read_number()?.raw(),
            quantity: cur.read_number()?.raw(),
        });
    }

    if cur.position() != final_index {
        return Err(CodecError::LengthMismatch {
            expected: final_index,
            actual: cur.position(),
        });
    }
    Ok(items)
}

/// Encodes the item list for the `loadStoryProfile` response.
pub fn encode_items(items: &[Item]) -> CodecResult<String> {
    let mut writer = Writer::new();
    writer.write_number(items.len() as u64)?;
    for item in items {
        writer.write_number(item.item_id)?;
        writer.write_number(item.quantity)?;
    }
    Ok(encipher(&writer.into_framed()))
}
