//! Party update field tags.

use crate::error::CodecError;

/// The closed set of field tags the party diff protocol carries.
///
/// Tag values 1 through 15 are fixed by the game client: 1 is full data,
/// 15 is a release, everything between is a targeted field update.
/// Anything else is rejected at decode time with
/// [`CodecError::UnknownFieldTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    /// Complete record for a freshly caught pokemon.
    FullData,
    /// A targeted update to one field group.
    Update(UpdateField),
    /// Release: the record is deleted.
    Release,
}

/// The field groups a targeted update can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateField {
    /// Level changed.
    Level,
    /// Experience changed.
    Exp,
    /// All four move slots, as one group.
    Moves,
    /// Held item changed.
    HeldItem,
    /// Evolution: overwrites the pokedex number.
    Evolution,
    /// Nickname changed; the value rides the parameter channel.
    Nickname,
    /// Party position changed.
    Position,
    /// Hacked/normal tag changed.
    HackedTag,
    /// Trade: the client sends the same pokedex overwrite as Evolution.
    Trade,
    /// Selected move changed.
    SelectedMove,
    /// Selected ability changed.
    SelectedAbility,
    /// Reserved slot; carries one number, always zero in practice.
    ReservedA,
    /// Reserved slot; carries one number, always zero in practice.
    ReservedB,
}

impl FieldTag {
    /// Returns the wire value of this tag.
    #[must_use]
    pub const fn raw(self) -> u64 {
        match self {
            Self::FullData => 1,
            Self::Update(field) => field.raw(),
            Self::Release => 15,
        }
    }
}

impl UpdateField {
    /// Returns the wire value of this field group.
    #[must_use]
    pub const fn raw(self) -> u64 {
        match self {
            Self::Level => 2,
            Self::Exp => 3,
            Self::Moves => 4,
            Self::HeldItem => 5,
            Self::Evolution => 6,
            Self::Nickname => 7,
            Self::Position => 8,
            Self::HackedTag => 9,
            Self::Trade => 10,
            Self::SelectedMove => 11,
            Self::SelectedAbility => 12,
            Self::ReservedA => 13,
            Self::ReservedB => 14,
        }
    }
}

impl TryFrom<u64> for FieldTag {
    type Error = CodecError;

    fn try_from(tag: u64) -> Result<Self, CodecError> {
        match tag {
            1 => Ok(Self::FullData),
            2 => Ok(Self::Update(UpdateField::Level)),
            3 => Ok(Self::Update(UpdateField::Exp)),
            4 => Ok(Self::Update(UpdateField::Moves)),
            5 => Ok(Self::Update(UpdateField::HeldItem)),
            6 => Ok(Self::Update(UpdateField::Evolution)),
            7 => Ok(Self::Update(UpdateField::Nickname)),
            8 => Ok(Self::Update(UpdateField::Position)),
            9 => Ok(Self::Update(UpdateField::HackedTag)),
            10 => Ok(Self::Update(UpdateField::Trade)),
            11 => Ok(Self::Update(UpdateField::SelectedMove)),
            12 => Ok(Self::Update(UpdateField::SelectedAbility)),
            13 => Ok(Self::Update(UpdateField::ReservedA)),
            14 => Ok(Self::Update(UpdateField::ReservedB)),
            15 => Ok(Self::Release),
            other => Err(CodecError::UnknownFieldTag { tag: other }),
        }
    }
}
