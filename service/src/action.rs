//! Client actions.

use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// The actions the game client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Register screen.
    CreateAccount,
    /// Login screen.
    LoadAccount,
    /// Story load popup: list the account's profiles.
    LoadStory,
    /// Story profile popup: load one profile's full save.
    LoadStoryProfile,
    /// Story save popup: apply a save diff.
    SaveStory,
    /// Story delete popup. In the protocol, not implemented here.
    DeleteStory,
}

impl Action {
    /// Returns the wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAccount => "createAccount",
            Self::LoadAccount => "loadAccount",
            Self::LoadStory => "loadStory",
            Self::LoadStoryProfile => "loadStoryProfile",
            Self::SaveStory => "saveStory",
            Self::DeleteStory => "deleteStory",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, ServiceError> {
        match s {
            "createAccount" => Ok(Self::CreateAccount),
            "loadAccount" => Ok(Self::LoadAccount),
            "loadStory" => Ok(Self::LoadStory),
            "loadStoryProfile" => Ok(Self::LoadStoryProfile),
            "saveStory" => Ok(Self::SaveStory),
            "deleteStory" => Ok(Self::DeleteStory),
            other => Err(ServiceError::UnsupportedAction {
                action: other.to_owned(),
            }),
        }
    }
}
