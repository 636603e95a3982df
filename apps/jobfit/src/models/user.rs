use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend user ids arrive either as numbers or as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Int(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// The authenticated user as returned by the backend and persisted under `authUser`.
///
/// Fields the client does not know about are kept in `extra` so a
/// persist/restore cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_complete: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Applies a partial update in place. Only fields present in the patch change.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(flag) = patch.profile_complete {
            self.profile_complete = flag;
        }
        for (key, value) in patch.extra {
            self.extra.insert(key, value);
        }
    }
}

/// Partial user fields accepted by `SessionStore::update_profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_complete: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPatch {
    pub fn profile_complete(flag: bool) -> Self {
        Self {
            profile_complete: Some(flag),
            ..Self::default()
        }
    }
}

/// An authenticated identity. Token and user only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}
