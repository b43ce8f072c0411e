//! Extra-info payload loading and encoding (`extra2`).

use cursor::{Cursor, Writer};
use records::ExtraInfo;
use wire::{decipher, encipher};

use crate::error::{CodecError, CodecResult};

/// Loads the extra-info list from a `saveStory` payload.
pub fn decode_extras(payload: &str) -> CodecResult<Vec<ExtraInfo>> {
    let plain = decipher(payload);
    let mut cur = Cursor::new(&plain);

    let final_index = cur.read_number()?.raw() as usize;
    let count = cur.read_number()?.raw();
    let mut infos = Vec::with_capacity(count as usize);
    for _ in 0..count {
        infos.push(ExtraInfo {
            info_id: cur.read_number()?.raw(),
            info_value: cur.read_number()?.raw(),
        });
    }

    if cur.position() != final_index {
        return Err(CodecError::LengthMismatch {
            expected: final_index,
            actual: cur.position(),
        });
    }
    Ok(infos)
}

/// Encodes the extra-info list for the `loadStoryProfile` response.
pub fn encode_extras(infos: &[ExtraInfo]) -> CodecResult<String> {
    let mut writer = Writer::new();
    writer.write_number(infos.len() as u64)?;
    for info in infos {
        writer.write_number(info.info_id)?;
        writer.write_number(info.info_value)?;
    }
    Ok(encipher(&writer.into_framed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let infos = vec![
            ExtraInfo {
                info_id: 1,
                info_value: 0,
            },
            ExtraInfo {
                info_id: 2,
                info_value: 40,
            },
        ];
        let payload = encode_extras(&infos).unwrap();
        assert_eq!(decode_extras(&payload).unwrap(), infos);
    }

    #[test]
    fn empty_list_roundtrip() {
        let payload = encode_extras(&[]).unwrap();
        assert_eq!(decode_extras(&payload).unwrap(), Vec::new());
    }

    #[test]
    fn truncated_payload_is_fatal() {
        // Declares two entries but carries one.
        let mut writer = Writer::new();
        writer.write_number(2u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_number(0u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_extras(&payload).unwrap_err();
        assert!(matches!(err, CodecError::Cursor(_)));
    }

    #[test]
    fn wrong_declared_length_is_fatal() {
        // Header declares six characters but the entries end at four.
        let err = decode_extras(&encipher("1610")).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                expected: 6,
                actual: 4
            }
        );
    }
}
