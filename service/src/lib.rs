//! Save/load action handling for the ptdsave service.
//!
//! The service is a pure function of (action, request fields, stores):
//! the transport hands in a parsed [`wire::Request`], this crate runs the
//! loaders and the store, and hands back an ordered [`wire::Response`].
//! The HTTP layer, static files and configuration loading live outside.

mod action;
mod error;
mod handler;
mod save;

pub use action::Action;
pub use error::{ServiceError, ServiceResult};
pub use handler::{checksum_salt, handle_request};
pub use save::SaveStores;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = SaveStores::open(None).unwrap();
        let _: ServiceResult<()> = Ok(());
        assert_eq!(Action::SaveStory.as_str(), "saveStory");
    }
}
