use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a collaborator
    UserId
);
numeric_id!(
    /// Unique identifier for a group of collaborators
    GroupId
);
numeric_id!(
    /// Unique identifier for a formation (course)
    FormationId
);
numeric_id!(
    /// Unique identifier for a section within a formation
    SectionId
);
numeric_id!(
    /// Unique identifier for a lesson
    LessonId
);
numeric_id!(
    /// Unique identifier for a quiz
    QuizId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_display() {
        assert_eq!(LessonId::new(42).to_string(), "42");
    }

    #[test]
    fn formation_id_from_str() {
        let id: FormationId = " 123 ".parse().unwrap();
        assert_eq!(id, FormationId::new(123));
    }

    #[test]
    fn user_id_from_str_invalid() {
        let err = "abc".parse::<UserId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse UserId from string");
    }

    #[test]
    fn debug_includes_type_name() {
        assert_eq!(format!("{:?}", QuizId::new(7)), "QuizId(7)");
    }
}
