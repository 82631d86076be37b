use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a generated [`Uid`].
pub const UID_LENGTH: usize = 11;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Identifier of a metadata object.
///
/// Generated UIDs are 11 characters long: one letter followed by ten
/// alphanumerics. UIDs arriving in a payload are accepted as-is; use
/// [`Uid::parse`] when the format must be enforced.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap an existing identifier without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse an identifier, rejecting anything that is not a well-formed UID.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        if Self::is_valid(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(TypeError::InvalidUid(value.to_string()))
        }
    }

    /// Generate a fresh random UID.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut uid = String::with_capacity(UID_LENGTH);
        uid.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
        for _ in 1..UID_LENGTH {
            uid.push(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char);
        }
        Self(uid)
    }

    /// Returns `true` if `value` has the shape of a generated UID.
    pub fn is_valid(value: &str) -> bool {
        let bytes = value.as_bytes();
        bytes.len() == UID_LENGTH
            && bytes[0].is_ascii_alphabetic()
            && bytes.iter().all(u8::is_ascii_alphanumeric)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The authenticated user on whose behalf an import runs.
///
/// The importer never fabricates a principal: it is resolved by the caller's
/// authentication layer and handed in with the bundle parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: Uid,
    pub username: String,
    /// Granted authorities. `ALL` grants everything.
    #[serde(default)]
    pub authorities: BTreeSet<String>,
    #[serde(default)]
    pub superuser: bool,
}

impl Principal {
    /// Authority that implies every other authority.
    pub const ALL: &'static str = "ALL";

    pub fn new(uid: impl Into<Uid>, username: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            username: username.into(),
            authorities: BTreeSet::new(),
            superuser: false,
        }
    }

    /// A principal holding the `ALL` authority.
    pub fn superuser(uid: impl Into<Uid>, username: impl Into<String>) -> Self {
        let mut principal = Self::new(uid, username).with_authority(Self::ALL);
        principal.superuser = true;
        principal
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.insert(authority.into());
        self
    }

    /// Returns `true` if the principal holds `authority` directly or through `ALL`.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.superuser
            || self.authorities.contains(Self::ALL)
            || self.authorities.contains(authority)
    }

    /// `username [uid]`, used as an error-report argument.
    pub fn identifiers_with_name(&self) -> String {
        format!("{} [{}]", self.username, self.uid)
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_uid_is_valid() {
        for _ in 0..100 {
            let uid = Uid::generate();
            assert_eq!(uid.as_str().len(), UID_LENGTH);
            assert!(Uid::is_valid(uid.as_str()), "{uid} should be valid");
        }
    }

    #[test]
    fn parse_rejects_malformed_uids() {
        assert!(Uid::parse("short").is_err());
        assert!(Uid::parse("1bcdefghijk").is_err()); // leading digit
        assert!(Uid::parse("abcdefghij-").is_err());
        assert_eq!(Uid::parse("fbfJHSPpUQD").unwrap().as_str(), "fbfJHSPpUQD");
    }

    #[test]
    fn superuser_has_every_authority() {
        let admin = Principal::superuser("xE7jOejl9FI", "admin");
        assert!(admin.has_authority("dataElement:create"));
        assert!(admin.has_authority("anything"));
    }

    #[test]
    fn plain_principal_checks_authorities() {
        let user = Principal::new("AbCdEfGhIj1", "alice").with_authority("dataElement:create");
        assert!(user.has_authority("dataElement:create"));
        assert!(!user.has_authority("dataElement:delete"));
        assert_eq!(user.identifiers_with_name(), "alice [AbCdEfGhIj1]");
    }

    #[test]
    fn uid_serializes_transparently() {
        let uid = Uid::new("fbfJHSPpUQD");
        assert_eq!(serde_json::to_string(&uid).unwrap(), "\"fbfJHSPpUQD\"");
    }

    proptest! {
        #[test]
        fn parse_accepts_only_well_formed(s in "[a-zA-Z][a-zA-Z0-9]{10}") {
            prop_assert!(Uid::parse(&s).is_ok());
        }
    }
}
