/// ID types for pipeline entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, Sqlite, Type,
};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the identifier is empty or whitespace
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        #[cfg(feature = "sqlx")]
        impl Type<Sqlite> for $name {
            fn type_info() -> SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<Sqlite>>::encode_by_ref(&self.0, args)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<Sqlite>>::decode(value)?;
                Ok($name(s))
            }
        }
    };
}

string_id!(
    /// User identifier (owner of a playlist)
    UserId
);

string_id!(
    /// Playlist identifier, primary key of the playlist table
    PlaylistId
);

string_id!(
    /// Submission nonce carried in the queue message
    RequestId
);
