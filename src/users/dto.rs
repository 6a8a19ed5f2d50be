use serde::Serialize;
use uuid::Uuid;

use crate::users::repo_types::UserRecord;

/// Public part of the user returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
        }
    }
}

impl UserRecord {
    pub fn to_user_response(&self) -> UserResponse {
        UserResponse::from(self)
    }
}
