//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-text biography
    pub bio: Option<String>,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub bio: Option<String>,
}

/// Update author request. Absent fields are left untouched; `bio` may be
/// cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
}

impl CreateAuthor {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            bio: self.bio,
        }
    }
}

impl UpdateAuthor {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            bio: self.bio,
        }
    }

    /// Apply the supplied fields onto `author`.
    pub fn merge_into(&self, author: &mut Author) {
        if let Some(ref name) = self.name {
            author.name = name.clone();
        }
        if let Some(ref bio) = self.bio {
            author.bio = bio.clone();
        }
    }
}
