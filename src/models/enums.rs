use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
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

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(SuggestionKind {
    Symptoms => "symptoms",
    Conditions => "conditions",
    Allergies => "allergies",
    Medications => "medications",
});

str_enum!(Frequency {
    Never => "Never",
    Rarely => "Rarely",
    Sometimes => "Sometimes",
    Often => "Often",
    Always => "Always",
});

impl Frequency {
    /// Case-insensitive parse for user free text ("often", "OFTEN", "Often").
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Some(Self::Never),
            "rarely" => Some(Self::Rarely),
            "sometimes" => Some(Self::Sometimes),
            "often" => Some(Self::Often),
            "always" => Some(Self::Always),
            _ => None,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Sometimes
    }
}
