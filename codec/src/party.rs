//! Party diff loading and story party encoding.
//!
//! The `saveStory` request ships the party as a field-tagged diff against
//! the previously stored records: fresh entries arrive with save id 0 and a
//! full-data field, existing entries are addressed by save id and carry any
//! number of targeted field updates, and releases are a bare tag. The
//! response direction re-encodes the whole stored party in a fixed field
//! order.

use std::collections::BTreeMap;

use cursor::{Cursor, CursorError, Writer};
use records::Pokemon;
use wire::{decipher, encipher, Response};

use crate::error::{CodecError, CodecResult};
use crate::tag::{FieldTag, UpdateField};

/// The outcome of loading a party diff payload.
///
/// The three lists are disjoint by construction except that a pokemon
/// inserted and then further updated in the same payload appears in both
/// `to_insert` and `to_update` with identical final state, matching the
/// client's own bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyDiff {
    pub to_insert: Vec<Pokemon>,
    pub to_update: Vec<Pokemon>,
    pub to_delete: Vec<Pokemon>,
}

/// Where an in-flight entry's record lives during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Existing(usize),
    Inserted(usize),
}

/// Loads a party diff payload against the currently stored party.
///
/// `existing` is consumed: field updates are applied to it in place before
/// the output lists are materialized. `nicknames` maps 1-based payload
/// positions to nicknames, which travel outside the encoded payload.
///
/// Fresh entries receive sequential save ids starting at one past the
/// largest stored id; the counter is reseeded from `existing` on every
/// call and never persisted.
pub fn decode_party(
    payload: &str,
    existing: Vec<Pokemon>,
    nicknames: &BTreeMap<u64, String>,
) -> CodecResult<PartyDiff> {
    let plain = decipher(payload);
    let mut cur = Cursor::new(&plain);

    let final_index = cur.read_number()?.raw() as usize;
    let entry_count = cur.read_number()?.raw();

    let mut existing = existing;
    let mut inserted: Vec<Pokemon> = Vec::new();
    let mut updates: Vec<Target> = Vec::new();
    let mut deletes: Vec<Target> = Vec::new();
    let mut next_id = existing
        .iter()
        .map(|p| p.save_id)
        .max()
        .map_or(1, |max| max + 1);

    for position in 1..=entry_count {
        let field_count = cur.read_number()?.raw();
        let save_id = cur.read_double_number()?.raw();

        let (entry_id, mut target) = if save_id == 0 {
            let id = next_id;
            next_id += 1;
            (id, None)
        } else {
            let index = existing
                .iter()
                .position(|p| p.save_id == save_id)
                .ok_or(CodecError::PokemonNotFound { save_id })?;
            (save_id, Some(Target::Existing(index)))
        };

        for _ in 0..field_count {
            let tag = FieldTag::try_from(cur.read_number()?.raw())?;
            match tag {
                FieldTag::FullData => {
                    if target.is_some() {
                        return Err(CodecError::UnexpectedFullData { save_id: entry_id });
                    }
                    let pokemon = read_full_data(&mut cur, entry_id, position, nicknames)?;
                    inserted.push(pokemon);
                    target = Some(Target::Inserted(inserted.len() - 1));
                }
                FieldTag::Release => {
                    let t = target.ok_or(CodecError::FieldBeforeFullData { tag: tag.raw() })?;
                    deletes.push(t);
                }
                FieldTag::Update(field) => {
                    let t = target.ok_or(CodecError::FieldBeforeFullData {
                        tag: field.raw(),
                    })?;
                    if !updates.contains(&t) {
                        updates.push(t);
                    }
                    let pokemon = resolve(&mut existing, &mut inserted, t);
                    apply_update(&mut cur, pokemon, field, position, nicknames)?;
                }
            }
        }
    }

    if cur.position() != final_index {
        return Err(CodecError::LengthMismatch {
            expected: final_index,
            actual: cur.position(),
        });
    }

    let to_update = materialize(&updates, &existing, &inserted);
    let to_delete = materialize(&deletes, &existing, &inserted);

    Ok(PartyDiff {
        to_insert: inserted,
        to_update,
        to_delete,
    })
}

fn materialize(targets: &[Target], existing: &[Pokemon], inserted: &[Pokemon]) -> Vec<Pokemon> {
    targets
        .iter()
        .map(|t| match *t {
            Target::Existing(i) => existing[i].clone(),
            Target::Inserted(i) => inserted[i].clone(),
        })
        .collect()
}

fn resolve<'a>(
    existing: &'a mut [Pokemon],
    inserted: &'a mut [Pokemon],
    target: Target,
) -> &'a mut Pokemon {
    match target {
        Target::Existing(i) => &mut existing[i],
        Target::Inserted(i) => &mut inserted[i],
    }
}

fn read_full_data(
    cur: &mut Cursor<'_>,
    save_id: u64,
    position: u64,
    nicknames: &BTreeMap<u64, String>,
) -> CodecResult<Pokemon> {
    let pokedex_num = cur.read_number()?.raw();
    let exp = cur.read_double_number()?.raw();
    let level = cur.read_number()?.raw();
    let mut moves = [0u64; 4];
    for slot in &mut moves {
        *slot = cur.read_number()?.raw();
    }
    let targeting_type = cur.read_number()?.raw();
    let gender = cur.read_number()?.raw();
    let party_position = cur.read_number()?.raw();
    // The client folds the elemental modifier into the pokedex number;
    // zero means no modifier at all.
    let element = cur.read_number()?.raw();
    let extra = if element == 0 {
        0
    } else {
        element as i64 - pokedex_num as i64
    };
    let held_item = cur.read_number()?.raw();
    let hacked_tag = cur.read_string()?;
    let pokemon = Pokemon {
        save_id,
        pokedex_num,
        exp,
        level,
        moves,
        targeting_type,
        gender,
        party_position,
        extra,
        held_item,
        hacked_tag,
        selected_move: cur.read_number()?.raw(),
        selected_ability: cur.read_number()?.raw(),
        nickname: nicknames.get(&position).cloned(),
    };
    // Two unused trailing numbers, consumed for cursor alignment only.
    cur.read_number()?;
    cur.read_number()?;
    Ok(pokemon)
}

fn apply_update(
    cur: &mut Cursor<'_>,
    pokemon: &mut Pokemon,
    field: UpdateField,
    position: u64,
    nicknames: &BTreeMap<u64, String>,
) -> CodecResult<()> {
    match field {
        UpdateField::Level => pokemon.level = cur.read_number()?.raw(),
        UpdateField::Exp => pokemon.exp = cur.read_double_number()?.raw(),
        UpdateField::Moves => {
            for slot in &mut pokemon.moves {
                *slot = cur.read_number()?.raw();
            }
        }
        UpdateField::HeldItem => pokemon.held_item = cur.read_number()?.raw(),
        UpdateField::Evolution => pokemon.pokedex_num = cur.read_number()?.raw(),
        // The client sends trades as a plain pokedex overwrite, same as
        // evolutions. Kept exactly as observed.
        UpdateField::Trade => pokemon.pokedex_num = cur.read_number()?.raw(),
        UpdateField::Nickname => {
            let nickname = nicknames
                .get(&position)
                .ok_or(CodecError::NicknameMissing { position })?;
            pokemon.nickname = Some(nickname.clone());
        }
        UpdateField::Position => pokemon.party_position = cur.read_number()?.raw(),
        UpdateField::HackedTag => pokemon.hacked_tag = cur.read_string()?,
        UpdateField::SelectedMove => pokemon.selected_move = cur.read_number()?.raw(),
        UpdateField::SelectedAbility => pokemon.selected_ability = cur.read_number()?.raw(),
        UpdateField::ReservedA | UpdateField::ReservedB => {
            cur.read_number()?;
        }
    }
    Ok(())
}

/// Encodes the stored party for the `loadStoryProfile` response.
///
/// Records are sorted by `party_position` in place first; the client
/// displays them in emission order. Each nickname is written to `params`
/// under `PN<i>` keyed by 1-based emission index, never into the payload.
pub fn encode_party(pokemons: &mut [Pokemon], params: &mut Response) -> CodecResult<String> {
    pokemons.sort_by_key(|p| p.party_position);

    let mut writer = Writer::new();
    writer.write_number(pokemons.len() as u64)?;
    for (index, pokemon) in pokemons.iter().enumerate() {
        params.push(
            format!("PN{}", index + 1),
            pokemon.nickname.clone().unwrap_or_default(),
        );
        writer.write_number(pokemon.pokedex_num)?;
        writer.write_double_number(pokemon.exp)?;
        writer.write_number(pokemon.level)?;
        for &move_id in &pokemon.moves {
            writer.write_number(move_id)?;
        }
        writer.write_number(pokemon.targeting_type)?;
        writer.write_number(pokemon.gender)?;
        writer.write_double_number(pokemon.save_id)?;
        writer.write_number(pokemon.party_position)?;
        let extra = u64::try_from(pokemon.extra)
            .map_err(|_| CursorError::NegativeValue {
                value: pokemon.extra,
            })?;
        writer.write_number(extra)?;
        writer.write_number(pokemon.held_item)?;
        writer.write_string(&pokemon.hacked_tag)?;
        writer.write_number(0u64)?;
        writer.write_number(pokemon.selected_move)?;
        writer.write_number(pokemon.selected_ability)?;
        writer.write_number(0u64)?;
        writer.write_number(0u64)?;
    }

    Ok(encipher(&writer.into_framed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nicknames(entries: &[(u64, &str)]) -> BTreeMap<u64, String> {
        entries
            .iter()
            .map(|&(i, name)| (i, name.to_owned()))
            .collect()
    }

    #[test]
    fn empty_party_payload() {
        // Header "14", zero entries.
        let payload = encipher("1410");
        let diff = decode_party(&payload, Vec::new(), &BTreeMap::new()).unwrap();
        assert!(diff.to_insert.is_empty());
        assert!(diff.to_update.is_empty());
        assert!(diff.to_delete.is_empty());
    }

    #[test]
    fn unknown_tag_is_fatal() {
        // One entry, save id 0, one field with tag 16.
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(0u64).unwrap();
        writer.write_number(16u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_party(&payload, Vec::new(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, CodecError::UnknownFieldTag { tag: 16 });
    }

    #[test]
    fn update_for_unknown_save_id_is_fatal() {
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(7u64).unwrap();
        writer.write_number(2u64).unwrap();
        writer.write_number(9u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_party(&payload, Vec::new(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, CodecError::PokemonNotFound { save_id: 7 });
    }

    #[test]
    fn length_mismatch_is_fatal() {
        // Declared length one past the real end.
        let plain = "1510";
        let payload = encipher(plain);
        let err = decode_party(&payload, Vec::new(), &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn release_marks_record_for_deletion() {
        let stored = Pokemon {
            save_id: 2,
            pokedex_num: 19,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        };
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(2u64).unwrap();
        writer.write_number(FieldTag::Release.raw()).unwrap();
        let payload = encipher(&writer.into_framed());

        let diff = decode_party(&payload, vec![stored.clone()], &BTreeMap::new()).unwrap();
        assert_eq!(diff.to_delete, vec![stored]);
        assert!(diff.to_insert.is_empty());
        assert!(diff.to_update.is_empty());
    }

    #[test]
    fn repeated_updates_record_once() {
        let stored = Pokemon {
            save_id: 1,
            level: 5,
            exp: 100,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        };
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(2u64).unwrap();
        writer.write_double_number(1u64).unwrap();
        writer.write_number(UpdateField::Level.raw()).unwrap();
        writer.write_number(6u64).unwrap();
        writer.write_number(UpdateField::Exp.raw()).unwrap();
        writer.write_double_number(120u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let diff = decode_party(&payload, vec![stored], &BTreeMap::new()).unwrap();
        assert_eq!(diff.to_update.len(), 1);
        assert_eq!(diff.to_update[0].level, 6);
        assert_eq!(diff.to_update[0].exp, 120);
    }

    #[test]
    fn fresh_ids_continue_from_stored_maximum() {
        let stored = Pokemon {
            save_id: 9,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        };
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(0u64).unwrap();
        writer.write_number(FieldTag::FullData.raw()).unwrap();
        // pokedex, exp, level, moves x4, targeting, gender, position,
        // element, held item, tag, selected move/ability, two unused.
        writer.write_number(19u64).unwrap();
        writer.write_double_number(18u64).unwrap();
        writer.write_number(4u64).unwrap();
        for m in [1u64, 3, 4, 0] {
            writer.write_number(m).unwrap();
        }
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_number(0u64).unwrap();
        writer.write_number(0u64).unwrap();
        writer.write_string("n").unwrap();
        writer.write_number(3u64).unwrap();
        writer.write_number(0u64).unwrap();
        writer.write_number(0u64).unwrap();
        writer.write_number(0u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let diff = decode_party(&payload, vec![stored], &nicknames(&[(1, "Rattata")])).unwrap();
        assert_eq!(diff.to_insert.len(), 1);
        assert_eq!(diff.to_insert[0].save_id, 10);
        assert_eq!(diff.to_insert[0].nickname.as_deref(), Some("Rattata"));
    }

    #[test]
    fn full_data_for_existing_record_is_fatal() {
        let stored = Pokemon {
            save_id: 3,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        };
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(3u64).unwrap();
        writer.write_number(FieldTag::FullData.raw()).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_party(&payload, vec![stored], &BTreeMap::new()).unwrap_err();
        assert_eq!(err, CodecError::UnexpectedFullData { save_id: 3 });
    }

    #[test]
    fn update_before_full_data_is_fatal() {
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(0u64).unwrap();
        writer.write_number(UpdateField::Level.raw()).unwrap();
        writer.write_number(7u64).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_party(&payload, Vec::new(), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, CodecError::FieldBeforeFullData { tag: 2 });
    }

    #[test]
    fn nickname_update_requires_sidechannel_entry() {
        let stored = Pokemon {
            save_id: 1,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        };
        let mut writer = Writer::new();
        writer.write_number(1u64).unwrap();
        writer.write_number(1u64).unwrap();
        writer.write_double_number(1u64).unwrap();
        writer.write_number(UpdateField::Nickname.raw()).unwrap();
        let payload = encipher(&writer.into_framed());

        let err = decode_party(&payload, vec![stored], &BTreeMap::new()).unwrap_err();
        assert_eq!(err, CodecError::NicknameMissing { position: 1 });
    }

    #[test]
    fn encode_sorts_by_party_position() {
        let mut party = vec![
            Pokemon {
                save_id: 2,
                party_position: 1,
                hacked_tag: "n".to_owned(),
                nickname: Some("Second".to_owned()),
                ..Pokemon::default()
            },
            Pokemon {
                save_id: 1,
                party_position: 0,
                hacked_tag: "n".to_owned(),
                nickname: Some("First".to_owned()),
                ..Pokemon::default()
            },
        ];
        let mut params = Response::new();
        encode_party(&mut party, &mut params).unwrap();

        assert_eq!(party[0].save_id, 1, "sort is a required side effect");
        assert_eq!(params.get("PN1"), Some("First"));
        assert_eq!(params.get("PN2"), Some("Second"));
    }

    #[test]
    fn encode_rejects_negative_extra() {
        let mut party = vec![Pokemon {
            save_id: 1,
            extra: -5,
            hacked_tag: "n".to_owned(),
            ..Pokemon::default()
        }];
        let mut params = Response::new();
        let err = encode_party(&mut party, &mut params).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Cursor(CursorError::NegativeValue { value: -5 })
        ));
    }
}
