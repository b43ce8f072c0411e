//! Top-level request dispatch.

use rand::Rng;
use wire::{encipher, story_checksum, Request, Response};

use crate::action::Action;
use crate::error::{ServiceError, ServiceResult};
use crate::save::SaveStores;

/// The checksum salt the client concatenates to the party payload.
#[must_use]
pub fn checksum_salt() -> String {
    encipher("12345")
}

/// Handles one client request against the stores.
///
/// The whole service is this one function of (request, stores): no
/// retries, no partial commits, every failure propagates to the transport.
pub fn handle_request(request: &Request, stores: &mut SaveStores) -> ServiceResult<Response> {
    let action: Action = request
        .get("Action")
        .ok_or(ServiceError::MissingParameter { name: "Action" })?
        .parse()?;

    match action {
        Action::CreateAccount | Action::LoadAccount => Ok(account_response()),
        Action::LoadStory => {
            let email = field(request, "Email")?;
            stores.profiles_list(email)
        }
        Action::LoadStoryProfile => {
            let email = field(request, "Email")?;
            let which_profile = field(request, "whichProfile")?;
            let mut response = stores.story_profile(email, which_profile)?;

            let salt = checksum_salt();
            let party_payload = response.get("extra3").unwrap_or_default().to_owned();
            let checksum = story_checksum(&format!("{party_payload}{salt}"));
            response.push("CS", salt);
            response.push("extra5", encipher(&checksum.to_string()));
            Ok(response)
        }
        Action::SaveStory => stores.save_story(request),
        Action::DeleteStory => Err(ServiceError::NotImplemented {
            action: "deleteStory",
        }),
    }
}

/// Both account actions answer the same way; there are no real accounts.
///
/// The UID feeds one client-side calculation (trainer-specific elemental)
/// and is otherwise meaningless.
fn account_response() -> Response {
    let uid = rand::thread_rng().gen_range(100..=1000);
    let mut response = Response::new();
    response.push("Result", "Success");
    response.push("UID", uid.to_string());
    response.push("Reason", "loadedAccount");
    response
}

fn field<'a>(request: &'a Request, name: &'static str) -> ServiceResult<&'a str> {
    request
        .get(name)
        .ok_or(ServiceError::MissingParameter { name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_salt_is_the_ciphered_constant() {
        assert_eq!(checksum_salt(), "ywcqa");
    }

    #[test]
    fn account_actions_answer_with_uid() {
        let mut stores = SaveStores::open(None).unwrap();
        for action in ["createAccount", "loadAccount"] {
            let request =
                Request::from_body(&format!("Action={action}&Email=a@b&Pass=x")).unwrap();
            let response = handle_request(&request, &mut stores).unwrap();
            assert_eq!(response.get("Result"), Some("Success"));
            assert_eq!(response.get("Reason"), Some("loadedAccount"));
            let uid: u32 = response.get("UID").unwrap().parse().unwrap();
            assert!((100..=1000).contains(&uid));
        }
    }

    #[test]
    fn missing_action_is_fatal() {
        let mut stores = SaveStores::open(None).unwrap();
        let request = Request::from_body("Email=a@b").unwrap();
        let err = handle_request(&request, &mut stores).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::MissingParameter { name: "Action" }
        ));
    }

    #[test]
    fn unknown_action_reports_the_value() {
        let mut stores = SaveStores::open(None).unwrap();
        let request = Request::from_body("Action=mysteryGift").unwrap();
        let err = handle_request(&request, &mut stores).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::UnsupportedAction { action } if action == "mysteryGift"
        ));
    }

    #[test]
    fn delete_story_is_not_implemented() {
        let mut stores = SaveStores::open(None).unwrap();
        let request = Request::from_body("Action=deleteStory&Email=a@b").unwrap();
        let err = handle_request(&request, &mut stores).unwrap_err();
        assert!(matches!(err, ServiceError::NotImplemented { .. }));
    }
}
