use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::entity::{Entity, EntityType};
use crate::redact::REDACTED;

/// Stored credential record. Partitioned by email, which is the natural key.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub user_id: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

impl Entity for User {
    const TYPE: EntityType = EntityType::User;

    fn key_id(&self) -> &str {
        &self.email
    }
}

// Hand-written so the hash never reaches a log line.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("password_hash", &REDACTED)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// What callers are allowed to see of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
