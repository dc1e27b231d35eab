// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Lesser General Public License that can be found
// in the LICENSE file.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Errors about invalid string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    /// More than 65535 bytes once encoded.
    TooLong,

    /// Contains a character forbidden in packet strings.
    InvalidChar,
}

/// Validate a packet string field.
///
/// The character data in a UTF-8 Encoded String MUST be well-formed UTF-8
/// and MUST NOT include an encoding of the null character U+0000
/// [MQTT-1.5.3-2]. The two byte length prefix limits the encoded form
/// to 65535 bytes.
///
/// # Errors
///
/// Returns error if `s` is too long or contains U+0000.
pub fn validate_utf8_string(s: &str) -> Result<(), StringError> {
    if s.len() > u16::MAX as usize {
        return Err(StringError::TooLong);
    }
    if s.chars().any(|c| c == '\u{0}') {
        return Err(StringError::InvalidChar);
    }
    Ok(())
}

/// Errors about invalid client id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdError {
    IsEmpty,

    /// More than 65535 characters.
    TooLong,
}

/// Validate client id length.
///
/// Length is counted in unicode scalar values, so a code point beyond the
/// basic plane counts as one character no matter how many bytes it takes.
///
/// # Errors
///
/// Returns error if `client_id` is empty or longer than 65535 characters.
pub fn validate_client_id(client_id: &str) -> Result<(), ClientIdError> {
    let chars = client_id.chars().count();
    if chars == 0 {
        return Err(ClientIdError::IsEmpty);
    }
    if chars > u16::MAX as usize {
        return Err(ClientIdError::TooLong);
    }
    Ok(())
}

/// Generate random alphanumeric string, used as default client id.
#[must_use]
pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_utf8_string() {
        assert!(validate_utf8_string("a/b").is_ok());
        assert_eq!(
            validate_utf8_string("a\u{0}b"),
            Err(StringError::InvalidChar)
        );
        let long = "x".repeat(65536);
        assert_eq!(validate_utf8_string(&long), Err(StringError::TooLong));
    }

    #[test]
    fn test_validate_client_id_counts_scalar_values() {
        assert_eq!(validate_client_id(""), Err(ClientIdError::IsEmpty));
        // U+1D11E takes four UTF-8 bytes but counts as one character.
        assert!(validate_client_id("𝄞").is_ok());
    }

    #[test]
    fn test_random_string() {
        let s = random_string(8);
        assert_eq!(s.len(), 8);
    }
}
