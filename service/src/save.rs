//! Save/load orchestration over the four record databases.

use std::collections::BTreeMap;

use codec::{
    apply_update, decode_extras, decode_items, decode_party, encode_extras, encode_items,
    encode_party, encode_profiles, encode_story_profile, nickname_positions, ProfileUpdate,
};
use records::{ExtraInfo, Item, Pokemon, Profile};
use store::{Database, DocumentRegistry, Field, OrQuery, Query, StoreOptions, StoreResult};
use wire::{percent_decode, Request, Response, WireError};

use crate::error::{ServiceError, ServiceResult};

/// The four databases a save is spread across.
///
/// Profiles are keyed `"{email}${profile}"`; party, item and counter
/// records are keyed by their record id, exactly as the game client
/// expects them back.
#[derive(Debug)]
pub struct SaveStores {
    profiles: Database<Profile>,
    extras: Database<ExtraInfo>,
    party: Database<Pokemon>,
    items: Database<Item>,
}

impl SaveStores {
    /// Opens the databases, disk-backed when options are given.
    pub fn open(options: Option<&StoreOptions>) -> StoreResult<Self> {
        let registry = DocumentRegistry::new();
        Ok(Self {
            profiles: Database::open("ptd3_profiles_database", options, registry.clone())?,
            extras: Database::open("ptd3_extra_info_database", options, registry.clone())?,
            party: Database::open("ptd3_pokemon_database", options, registry.clone())?,
            items: Database::open("ptd3_item_database", options, registry)?,
        })
    }

    /// `loadStory`: the account's profile list.
    pub fn profiles_list(&self, email: &str) -> ServiceResult<Response> {
        let query: OrQuery = Query::new([Field::new("key").starts_with(format!("{email}$"))])?
            .into();
        let profiles = self.profiles.fetch(Some(&query), 0, None, false)?;

        let mut response = Response::new();
        response.push("Result", "Success");
        let payload = encode_profiles(&profiles, &mut response)?;
        response.push("extra", payload);
        Ok(response)
    }

    /// `loadStoryProfile`: one profile's full save.
    ///
    /// The caller appends the checksum fields; everything else, including
    /// the out-of-band nickname parameters, lands here.
    pub fn story_profile(&self, email: &str, which_profile: &str) -> ServiceResult<Response> {
        let key = format!("{email}${which_profile}");
        let profile = self
            .profiles
            .get(&key)?
            .ok_or(ServiceError::ProfileNotFound { key })?;
        let extras = self.extras.fetch(None, 0, None, false)?;
        let mut party = self.party.fetch(None, 0, None, true)?;
        let items = self.items.fetch(None, 0, None, false)?;

        let mut response = Response::new();
        response.push("Result", "Success");
        let profile_payload = encode_story_profile(&profile)?;
        response.push("extra", profile_payload);
        let extras_payload = encode_extras(&extras)?;
        response.push("extra2", extras_payload);
        let party_payload = encode_party(&mut party, &mut response)?;
        response.push("extra3", party_payload);
        let items_payload = encode_items(&items)?;
        response.push("extra4", items_payload);
        Ok(response)
    }

    /// `saveStory`: apply a full save diff and report the fresh save ids.
    ///
    /// The profile flag form rides `extra`, counters `extra2`, the party
    /// diff `extra3`, the inventory `extra4`. `extra5` is the client's own
    /// checksum of the request and is ignored.
    pub fn save_story(&mut self, request: &Request) -> ServiceResult<Response> {
        let email = field(request, "Email")?;
        let which_profile = field(request, "whichProfile")?;
        let profile_key = format!("{email}${which_profile}");

        let flag_form = parse_flag_form(&percent_decode(field(request, "extra")?))?;
        let update = ProfileUpdate::from_fields(&flag_form)?;
        let stored_profile = self.profiles.get(&profile_key)?;
        let mut profile = apply_update(stored_profile, &update)?;
        // The slot number is addressed by the outer request, not the form.
        profile.profile_id =
            which_profile
                .parse()
                .map_err(|_| ServiceError::InvalidParameter {
                    name: "whichProfile",
                    value: which_profile.to_owned(),
                })?;

        let nicknames = nickname_positions(&flag_form);
        let stored_party = self.party.fetch(None, 0, None, true)?;

        let extras = decode_extras(field(request, "extra2")?)?;
        let diff = decode_party(field(request, "extra3")?, stored_party, &nicknames)?;
        let items = decode_items(field(request, "extra4")?)?;

        self.profiles.put(&profile_key, &profile)?;
        self.extras.put_many(
            extras.iter().map(|info| (info.info_id.to_string(), *info)),
            false,
        )?;
        let upserts: Vec<(String, Pokemon)> = diff
            .to_insert
            .iter()
            .chain(&diff.to_update)
            .map(|pokemon| (pokemon.save_id.to_string(), pokemon.clone()))
            .collect();
        self.party.put_many(upserts, true)?;
        for pokemon in &diff.to_delete {
            self.party.delete(&pokemon.save_id.to_string())?;
        }
        self.items.put_many(
            items.iter().map(|item| (item.item_id.to_string(), *item)),
            false,
        )?;

        let mut response = Response::new();
        response.push("Result", "Success");
        response.push("CS", crate::handler::checksum_salt());
        for pokemon in &diff.to_insert {
            response.push(
                format!("PID{}", pokemon.party_position),
                pokemon.save_id.to_string(),
            );
        }
        Ok(response)
    }
}

fn field<'a>(request: &'a Request, name: &'static str) -> ServiceResult<&'a str> {
    request
        .get(name)
        .ok_or(ServiceError::MissingParameter { name })
}

/// Splits the percent-decoded profile flag form on `&` and the first `=`.
fn parse_flag_form(form: &str) -> ServiceResult<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for fragment in form.split('&') {
        let (key, value) = fragment
            .split_once('=')
            .ok_or_else(|| WireError::MalformedField {
                field: fragment.to_owned(),
            })?;
        fields.insert(key.to_owned(), value.to_owned());
    }
    Ok(fields)
}
