use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of a model object.
///
/// Handles are random v4 UUIDs assigned when an object is added. Renaming an
/// object or changing its fields keeps the handle, so target fields stay valid.
/// In model files a handle is the hyphenated UUID; in diagnostics it is shown
/// in braces, e.g. `{67e55044-10b1-426f-9247-bb680e5fe0c8}`.
#[derive(Eq, PartialEq, Hash, Ord, PartialOrd, Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(Uuid);

impl Handle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts the UUID with or without the surrounding braces.
impl FromStr for Handle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(s);
        Uuid::parse_str(bare).map(Self)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0)
    }
}
