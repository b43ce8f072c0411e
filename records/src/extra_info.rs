//! Opaque save counter record.

use serde::{Deserialize, Serialize};

/// An opaque key/value counter pair the client tracks per save.
///
/// The service never interprets these; it stores and echoes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraInfo {
    pub info_id: u64,
    pub info_value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let info = ExtraInfo {
            info_id: 2,
            info_value: 40,
        };
        let value = serde_json::to_value(info).unwrap();
        let back: ExtraInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, info);
    }
}
