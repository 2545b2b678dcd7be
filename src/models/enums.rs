use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Language {
    English => "english",
    Tamil => "tamil",
});

str_enum!(InputKind {
    Text => "text",
    Voice => "voice",
    Image => "image",
});

impl Language {
    /// ISO 639-1 code, as used by the translation service.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Tamil => "ta",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}

impl Default for InputKind {
    fn default() -> Self {
        Self::Text
    }
}
