// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request signing and secret generation for the identity provider.
//!
//! Nothing here performs I/O. All randomness comes from `rand::rng()`,
//! a CSPRNG reseeded from the operating system.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use sha2::Sha256;
use std::sync::LazyLock;

type HmacSha256 = Hmac<Sha256>;

/// Shortest password the generator will produce (Cognito default policy).
pub const MIN_PASSWORD_LENGTH: usize = 8;

const UPPER_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const NUMBER_CHARS: &[u8] = b"0123456789";
const SPECIAL_CHARS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

const LICENSE_SECTION_SIZE: usize = 5;
const LICENSE_SECTIONS: usize = 4;

static LICENSE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{5}-[A-Z]{5}-[A-Z]{5}-[A-Z]{5}$").expect("license key pattern is valid")
});

/// Compute the `SECRET_HASH` parameter required on every auth call made
/// with a client that has a secret.
///
/// `base64(HMAC-SHA256(key = client_secret, message = user_id + client_id))`
pub fn cognito_secret_hash(user_id: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(user_id.as_bytes());
    mac.update(client_id.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Which character classes a generated password must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub length: usize,
    pub require_upper: bool,
    pub require_lower: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for PasswordConfig {
    /// The policy used for generated account passwords.
    fn default() -> Self {
        Self {
            length: 15,
            require_upper: true,
            require_lower: true,
            require_number: true,
            require_special: true,
        }
    }
}

impl PasswordConfig {
    fn required_classes(&self) -> Vec<&'static [u8]> {
        [
            (self.require_upper, UPPER_CHARS),
            (self.require_lower, LOWER_CHARS),
            (self.require_number, NUMBER_CHARS),
            (self.require_special, SPECIAL_CHARS),
        ]
        .into_iter()
        .filter_map(|(required, class)| required.then_some(class))
        .collect()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password length must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("password length too short to satisfy requirements")]
    TooManyClasses,

    #[error("at least one character class must be required")]
    NoClasses,
}

/// Generate a random password satisfying `config`.
///
/// One character is drawn from each required class, the rest uniformly
/// from the union of those classes, and the result is shuffled so the
/// required characters do not sit at predictable positions.
pub fn generate_password(config: &PasswordConfig) -> Result<String, PasswordError> {
    if config.length < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let classes = config.required_classes();
    if classes.is_empty() {
        return Err(PasswordError::NoClasses);
    }
    if config.length < classes.len() {
        return Err(PasswordError::TooManyClasses);
    }

    let mut rng = rand::rng();
    let union: Vec<u8> = classes.concat();

    let mut password: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();

    while password.len() < config.length {
        password.push(union[rng.random_range(0..union.len())]);
    }

    // Fisher-Yates
    password.shuffle(&mut rng);

    // Every byte came from an ASCII table above.
    Ok(password.into_iter().map(char::from).collect())
}

/// Generate a license key of the form `XXXXX-XXXXX-XXXXX-XXXXX`.
pub fn generate_license_key() -> String {
    let mut rng = rand::rng();
    (0..LICENSE_SECTIONS)
        .map(|_| {
            (0..LICENSE_SECTION_SIZE)
                .map(|_| char::from(UPPER_CHARS[rng.random_range(0..UPPER_CHARS.len())]))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Check a license key is four groups of five uppercase ASCII letters.
pub fn validate_license_key(key: &str) -> bool {
    LICENSE_KEY_PATTERN.is_match(key)
}
