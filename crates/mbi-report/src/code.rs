use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad class of a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Authorization,
    Schema,
    Uniqueness,
    MandatoryAttribute,
    Existence,
    Reference,
    Duplicate,
}

/// Error codes attached to [`ErrorReport`](crate::ErrorReport)s.
///
/// The numbering follows the importer's long-standing catalogue so that
/// clients matching on codes keep working.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Create denied.
    E3000,
    /// Update denied.
    E3001,
    /// Delete denied.
    E3002,
    /// Missing required property.
    E4000,
    /// Value longer than allowed.
    E4001,
    /// Value shorter than allowed.
    E4002,
    /// Value of the wrong type.
    E4003,
    /// Number out of range.
    E4008,
    /// Unique attribute value already taken.
    E4009,
    /// Mandatory attribute missing.
    E4011,
    /// Object exists but strategy is CREATE.
    E5000,
    /// Object does not exist but strategy needs it.
    E5001,
    /// Dangling reference.
    E5002,
    /// Unique property value already taken.
    E5003,
    /// Duplicate identifier within the payload.
    E5004,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        Self::E3000,
        Self::E3001,
        Self::E3002,
        Self::E4000,
        Self::E4001,
        Self::E4002,
        Self::E4003,
        Self::E4008,
        Self::E4009,
        Self::E4011,
        Self::E5000,
        Self::E5001,
        Self::E5002,
        Self::E5003,
        Self::E5004,
    ];

    /// Default English message with `{0}`, `{1}`, ... placeholders for the
    /// report's positional arguments.
    pub fn template(&self) -> &'static str {
        match self {
            Self::E3000 => "User `{0}` is not allowed to create objects of type {1}",
            Self::E3001 => "User `{0}` is not allowed to update object `{1}`",
            Self::E3002 => "User `{0}` is not allowed to delete object `{1}`",
            Self::E4000 => "Missing required property `{0}`",
            Self::E4001 => {
                "Maximum length of property `{0}` is {1}, but given length was {2}"
            }
            Self::E4002 => {
                "Minimum length of property `{0}` is {1}, but given length was {2}"
            }
            Self::E4003 => "Property `{0}` expects a value of type {1}",
            Self::E4008 => {
                "Allowed range for numeric property `{0}` is [{1} to {2}], but number was {3}"
            }
            Self::E4009 => {
                "Attribute `{0}` is unique, and value `{1}` already exists on object `{2}`"
            }
            Self::E4011 => "Attribute `{0}` is mandatory, but no value was found",
            Self::E5000 => {
                "Found matching object for reference, but import mode is CREATE. \
                 Identifier was {0}, and object was {1}"
            }
            Self::E5001 => {
                "No matching object for reference. Identifier was {0}, and object was {1}"
            }
            Self::E5002 => "Invalid reference {0} on object {1} for association `{2}`",
            Self::E5003 => {
                "Property `{0}` with value `{1}` on object {2} already exists on object {3}"
            }
            Self::E5004 => {
                "Id `{0}` for type `{1}` exists on more than one object in the payload"
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::E3000 | Self::E3001 | Self::E3002 => ErrorCategory::Authorization,
            Self::E4000 | Self::E4001 | Self::E4002 | Self::E4003 | Self::E4008 => {
                ErrorCategory::Schema
            }
            Self::E4009 | Self::E5003 => ErrorCategory::Uniqueness,
            Self::E4011 => ErrorCategory::MandatoryAttribute,
            Self::E5000 | Self::E5001 => ErrorCategory::Existence,
            Self::E5002 => ErrorCategory::Reference,
            Self::E5004 => ErrorCategory::Duplicate,
        }
    }

    /// Substitute `args` into the template. Placeholders without a matching
    /// argument are left as-is.
    pub fn render(&self, args: &[String]) -> String {
        let mut message = self.template().to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_positional_args() {
        let message = ErrorCode::E5003.render(&[
            "code".into(),
            "A".into(),
            "second [b]".into(),
            "first [a]".into(),
        ]);
        assert_eq!(
            message,
            "Property `code` with value `A` on object second [b] already exists on object first [a]"
        );
    }

    #[test]
    fn render_leaves_missing_placeholders() {
        let message = ErrorCode::E4011.render(&[]);
        assert!(message.contains("{0}"));
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::E5004.to_string(), "E5004");
        assert_eq!(serde_json::to_string(&ErrorCode::E3000).unwrap(), "\"E3000\"");
    }

    #[test]
    fn every_code_has_a_category_and_template() {
        for code in ErrorCode::ALL {
            assert!(!code.template().is_empty());
            let _ = code.category();
        }
        assert_eq!(ErrorCode::E5002.category(), ErrorCategory::Reference);
        assert_eq!(ErrorCode::E4009.category(), ErrorCategory::Uniqueness);
    }
}
