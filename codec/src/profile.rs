//! Profile flag updates and profile list encoding.
//!
//! Unlike the party diff, profile changes arrive as named boolean flags in
//! the percent-decoded `extra` form: `NewGameSave` gates the identity
//! fields, `MSave` the money field, `LevelSave` the two level fields. The
//! gated values for money and levels are cipher-encoded digit strings.

use std::collections::BTreeMap;

use cursor::Writer;
use records::Profile;
use wire::{decipher, encipher, Response};

use crate::error::{CodecError, CodecResult};

/// A parsed profile flag form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// `Save=true` was present. Required for any update to apply.
    pub save: bool,
    /// `NewGameSave=true` was present.
    pub new_game: bool,
    pub nickname: Option<String>,
    pub game_version: Option<String>,
    pub gender: Option<String>,
    pub money: Option<u64>,
    /// `(max_level_accomplished, max_level_complete)`.
    pub levels: Option<(u64, u64)>,
}

impl ProfileUpdate {
    /// Parses the flag form.
    ///
    /// Each gate flag pulls its value fields along: a set flag with a
    /// missing value is fatal, as is a money or level value that does not
    /// decipher to a number.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> CodecResult<Self> {
        let flag = |name: &str| fields.get(name).is_some_and(|v| v == "true");
        let mut update = Self {
            save: flag("Save"),
            new_game: flag("NewGameSave"),
            ..Self::default()
        };

        if update.new_game {
            update.nickname = Some(require(fields, "Nickname")?.to_owned());
            update.game_version = Some(require(fields, "Color")?.to_owned());
            update.gender = Some(require(fields, "Gender")?.to_owned());
        }
        if flag("MSave") {
            update.money = Some(ciphered_value(fields, "MA")?);
        }
        if flag("LevelSave") {
            update.levels = Some((
                ciphered_value(fields, "LevelA")?,
                ciphered_value(fields, "LevelC")?,
            ));
        }
        Ok(update)
    }
}

fn require<'a>(
    fields: &'a BTreeMap<String, String>,
    name: &'static str,
) -> CodecResult<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or(CodecError::MissingField { name })
}

fn ciphered_value(fields: &BTreeMap<String, String>, name: &'static str) -> CodecResult<u64> {
    let raw = require(fields, name)?;
    decipher(raw)
        .parse()
        .map_err(|_| CodecError::InvalidFieldValue {
            name,
            value: raw.to_owned(),
        })
}

/// Applies a flag update to a stored profile, or starts a new one.
///
/// A missing profile requires the new-game flag; that check runs before
/// the save-flag check, matching the client's request ordering.
pub fn apply_update(profile: Option<Profile>, update: &ProfileUpdate) -> CodecResult<Profile> {
    let mut profile = match profile {
        Some(profile) => profile,
        None => {
            if !update.new_game {
                return Err(CodecError::MissingNewGame);
            }
            Profile::new_game()
        }
    };
    if !update.save {
        return Err(CodecError::MissingSaveFlag);
    }

    if update.new_game {
        if let Some(nickname) = &update.nickname {
            profile.nickname = nickname.clone();
        }
        if let Some(version) = &update.game_version {
            profile.game_version = version.clone();
        }
        if let Some(gender) = &update.gender {
            profile.gender = gender.clone();
        }
    }
    if let Some(money) = update.money {
        profile.money = money;
    }
    if let Some((accomplished, complete)) = update.levels {
        profile.max_level_accomplished = accomplished;
        profile.max_level_complete = complete;
    }
    Ok(profile)
}

/// Collects the `PokeNick<i>` side-channel entries from the flag form.
///
/// Keys that do not parse as positions are ignored.
#[must_use]
pub fn nickname_positions(fields: &BTreeMap<String, String>) -> BTreeMap<u64, String> {
    fields
        .iter()
        .filter_map(|(key, value)| {
            let position = key.strip_prefix("PokeNick")?.parse().ok()?;
            Some((position, value.clone()))
        })
        .collect()
}

/// Encodes the player's profile list for the `loadStory` response.
///
/// Profile nicknames and versions ride the parameter channel keyed by slot
/// number; the payload itself carries raw digit counts and string fields.
pub fn encode_profiles(profiles: &[Profile], params: &mut Response) -> CodecResult<String> {
    let mut writer = Writer::new();
    writer.write_digit(profiles.len() as u64)?;
    for profile in profiles {
        writer.write_digit(profile.profile_id)?;
        writer.write_string(&profile.money.to_string())?;
        writer.write_string(&profile.max_level_complete.to_string())?;
        writer.write_string(&profile.max_level_accomplished.to_string())?;
        params.push(
            format!("Nickname{}", profile.profile_id),
            profile.nickname.clone(),
        );
        params.push(
            format!("Version{}", profile.profile_id),
            profile.game_version.clone(),
        );
    }
    Ok(encipher(&writer.into_framed()))
}

/// Encodes one profile's level header for the `loadStoryProfile` response.
pub fn encode_story_profile(profile: &Profile) -> CodecResult<String> {
    let mut writer = Writer::new();
    writer.write_number(profile.max_level_complete)?;
    writer.write_number(profile.max_level_accomplished)?;
    Ok(encipher(&writer.into_framed()))
}
