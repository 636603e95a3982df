//! Local profile cache. Keeps the target role and resume across restarts,
//! independent of the backend.
//!
//! The record lives in a single-record store (`userDB` / `users`, key
//! [`PROFILE_RECORD_ID`]). Writes read the current record, merge, and put the
//! whole record back.

use tracing::{debug, info};

use crate::models::{ProfileRecord, ProfileUpdate, PROFILE_RECORD_ID};
use crate::storage::{RecordStore, StorageError};

pub mod editor;
pub mod object_urls;
pub mod onboarding;

pub use editor::{ProfileEditor, SaveOutcome};
pub use object_urls::{ObjectUrls, ResumeUrl};
pub use onboarding::complete_profile;

pub const PROFILE_DB_NAME: &str = "userDB";
pub const PROFILE_STORE_NAME: &str = "users";

pub struct ProfileCache<R> {
    store: R,
}

impl<R: RecordStore<ProfileRecord>> ProfileCache<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Returns the cached profile, or the empty shape if nothing was saved yet.
    /// Creates the store on first use.
    pub async fn read_profile(&self) -> Result<ProfileRecord, StorageError> {
        self.store.open().await?;
        let record = self.store.get(PROFILE_RECORD_ID).await?;
        debug!("Profile cache read (present: {})", record.is_some());
        Ok(record.unwrap_or_else(ProfileRecord::empty))
    }

    /// Merges `update` into the cached profile and writes it back whole.
    pub async fn write_profile(&self, update: ProfileUpdate) -> Result<ProfileRecord, StorageError> {
        let mut record = self.read_profile().await?;
        record.apply(update);
        record.id = PROFILE_RECORD_ID;

        self.store.put(PROFILE_RECORD_ID, record.clone()).await?;
        info!(
            "Profile cache written (role set: {}, resume: {})",
            !record.role.is_empty(),
            record.resume.is_some()
        );
        Ok(record)
    }
}
