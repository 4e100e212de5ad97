//! `GET /users`: the authenticated user's profile.

use serde::{Deserialize, Deserializer, Serialize};

use super::{ApiClient, ApiError, BearerToken};

/// Profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Helix sends this as a decimal string; plain numbers are accepted too.
    #[serde(deserialize_with = "deserialize_user_id")]
    pub id: u64,
    pub display_name: String,
    /// Empty unless the `user:read:email` scope was granted.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_image_url: String,
}

impl User {
    /// True for the "no user" value held while signed out.
    pub fn is_empty(&self) -> bool {
        *self == User::default()
    }
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    data: Vec<User>,
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid user id {text:?}: {e}"))),
    }
}

/// Fetches the profile list and returns its first record.
///
/// Returns `Ok(None)` when the provider answers with an empty list.
///
/// # Errors
/// Returns an error on transport failure, non-2xx status or a malformed body.
pub async fn fetch_current_user(
    client: &ApiClient,
    credential: Option<&BearerToken>,
) -> Result<Option<User>, ApiError> {
    let response: UsersResponse = client.get_json("/users", credential).await?;
    Ok(response.data.into_iter().next())
}
