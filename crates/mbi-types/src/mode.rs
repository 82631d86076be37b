use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::MetadataObject;

/// What the import does with the submitted objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    /// Only create new objects; existing ones are rejected.
    Create,
    /// Only update existing objects; unknown ones are rejected.
    Update,
    /// Create new objects and update existing ones.
    #[default]
    CreateAndUpdate,
    /// Delete existing objects.
    Delete,
}

impl ImportStrategy {
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update)
    }

    pub fn is_create_and_update(&self) -> bool {
        matches!(self, Self::CreateAndUpdate)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// How validation failures affect the rest of the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomicMode {
    /// Any error anywhere discards the whole payload.
    #[default]
    All,
    /// Only the offending objects are discarded.
    Object,
    /// Errors are reported but nothing is discarded.
    None,
}

impl AtomicMode {
    /// Whether validators drop the objects they reject.
    pub fn removes_rejected(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// How an incoming object is folded into the stored one on update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeMode {
    /// Leave the stored object untouched.
    None,
    /// Overwrite only fields that are present and non-null in the incoming object.
    Merge,
    /// Overwrite every owned field, including with nulls.
    #[default]
    Replace,
}

/// How often pending writes are forced to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlushMode {
    /// Flush at natural boundaries (after each type and at the end).
    #[default]
    Auto,
    /// Flush after every mutated object.
    Object,
}

/// Whether a bundle is committed or only validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleMode {
    #[default]
    Commit,
    Validate,
}

/// Lifecycle of a bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleStatus {
    #[default]
    Created,
    Validated,
    Committed,
}

/// Which identifier is used to match payload objects and references
/// against stored state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreheatIdentifier {
    #[default]
    Uid,
    Code,
    /// UID when present, otherwise code.
    Auto,
}

impl PreheatIdentifier {
    /// The identifier value this strategy uses for `object`.
    pub fn identifier_of<'a>(&self, object: &'a MetadataObject) -> Option<&'a str> {
        let uid = object.uid.as_ref().map(|u| u.as_str()).filter(|s| !s.is_empty());
        let code = object.code.as_deref().filter(|s| !s.is_empty());
        match self {
            Self::Uid => uid,
            Self::Code => code,
            Self::Auto => uid.or(code),
        }
    }

    /// Human-readable identification used as an error-report argument,
    /// e.g. `ANC visits [fbfJHSPpUQD] (dataElement)`.
    pub fn identifiers_with_name(&self, object: &MetadataObject) -> String {
        let name = object.display_name().unwrap_or_default();
        let ids = match self {
            Self::Uid => object.uid.as_ref().map(|u| u.to_string()).unwrap_or_default(),
            Self::Code => object.code.clone().unwrap_or_default(),
            Self::Auto => {
                let uid = object.uid.as_ref().map(|u| u.to_string()).unwrap_or_default();
                match &object.code {
                    Some(code) => format!("{uid}, {code}"),
                    None => uid,
                }
            }
        };
        format!("{name} [{ids}] ({})", object.object_type)
    }
}

macro_rules! display_from_str {
    ($ty:ty, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $(Self::$variant => $text,)+
                };
                f.write_str(s)
            }
        }

        impl FromStr for $ty {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(TypeError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

display_from_str!(ImportStrategy, "import strategy", {
    Create => "CREATE",
    Update => "UPDATE",
    CreateAndUpdate => "CREATE_AND_UPDATE",
    Delete => "DELETE",
});

display_from_str!(AtomicMode, "atomic mode", {
    All => "ALL",
    Object => "OBJECT",
    None => "NONE",
});

display_from_str!(MergeMode, "merge mode", {
    None => "NONE",
    Merge => "MERGE",
    Replace => "REPLACE",
});

display_from_str!(FlushMode, "flush mode", {
    Auto => "AUTO",
    Object => "OBJECT",
});

display_from_str!(BundleMode, "bundle mode", {
    Commit => "COMMIT",
    Validate => "VALIDATE",
});

display_from_str!(BundleStatus, "bundle status", {
    Created => "CREATED",
    Validated => "VALIDATED",
    Committed => "COMMITTED",
});

display_from_str!(PreheatIdentifier, "preheat identifier", {
    Uid => "UID",
    Code => "CODE",
    Auto => "AUTO",
});
