use mbi_types::ObjectType;

/// Errors raised while building or querying the schema registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A type was registered twice.
    #[error("schema for type {0} is already registered")]
    DuplicateType(ObjectType),

    /// A type declares the same property twice.
    #[error("type {object_type} declares property `{property}` more than once")]
    DuplicateProperty {
        object_type: ObjectType,
        property: String,
    },

    /// A reference property points at a type nobody registered.
    #[error("property `{property}` of type {object_type} references unknown type {target}")]
    UnknownTarget {
        object_type: ObjectType,
        property: String,
        target: ObjectType,
    },

    /// Lookup of a type that has no schema.
    #[error("no schema registered for type {0}")]
    UnknownType(ObjectType),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
