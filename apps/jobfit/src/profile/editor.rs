use tracing::{info, warn};

use super::object_urls::{ObjectUrls, ResumeUrl};
use super::ProfileCache;
use crate::backend::{AuthBackend, ProfileSubmission};
use crate::errors::ClientError;
use crate::models::{ProfileRecord, ProfileUpdate, ResumeBlob};
use crate::storage::{RecordStore, StorageError};

#[derive(Debug, Default)]
struct SavedProfile {
    role: String,
    resume: Option<ResumeBlob>,
    url: Option<ResumeUrl>,
}

#[derive(Debug)]
struct Draft {
    role: String,
    resume: Option<(ResumeBlob, ResumeUrl)>,
}

/// What happened on [`ProfileEditor::save`]. The local write always stood;
/// `remote_error` is set when the backend did not accept the change.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub record: ProfileRecord,
    pub remote_error: Option<String>,
}

/// Edit/cancel/save flow over the cached profile.
///
/// Selecting a file while editing gets its own display URL; cancelling drops
/// the draft (revoking that URL) and saving replaces the previous one.
#[derive(Debug)]
pub struct ProfileEditor {
    urls: ObjectUrls,
    saved: SavedProfile,
    draft: Option<Draft>,
}

impl ProfileEditor {
    pub fn new(urls: ObjectUrls) -> Self {
        Self {
            urls,
            saved: SavedProfile::default(),
            draft: None,
        }
    }

    pub async fn load<R: RecordStore<ProfileRecord>>(
        &mut self,
        cache: &ProfileCache<R>,
    ) -> Result<(), StorageError> {
        let record = cache.read_profile().await?;
        self.draft = None;
        self.saved = SavedProfile {
            url: record.resume.as_ref().map(|blob| self.urls.create(blob)),
            role: record.role,
            resume: record.resume,
        };
        Ok(())
    }

    pub fn begin_edit(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(Draft {
                role: self.saved.role.clone(),
                resume: None,
            });
        }
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Ignored unless editing.
    pub fn set_role(&mut self, role: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.role = role.to_string();
        }
    }

    /// Ignored unless editing.
    pub fn set_resume(&mut self, blob: ResumeBlob) {
        if let Some(draft) = self.draft.as_mut() {
            let url = self.urls.create(&blob);
            draft.resume = Some((blob, url));
        }
    }

    /// Restores the last saved values.
    pub fn cancel(&mut self) {
        if self.draft.take().is_some() {
            info!("Profile edit cancelled");
        }
    }

    pub fn role(&self) -> &str {
        match &self.draft {
            Some(draft) => &draft.role,
            None => &self.saved.role,
        }
    }

    pub fn resume(&self) -> Option<&ResumeBlob> {
        match self.draft.as_ref().and_then(|d| d.resume.as_ref()) {
            Some((blob, _)) => Some(blob),
            None => self.saved.resume.as_ref(),
        }
    }

    pub fn resume_file_name(&self) -> &str {
        self.resume().map(|r| r.file_name.as_str()).unwrap_or("")
    }

    pub fn resume_url(&self) -> Option<&str> {
        match self.draft.as_ref().and_then(|d| d.resume.as_ref()) {
            Some((_, url)) => Some(url.as_str()),
            None => self.saved.url.as_ref().map(ResumeUrl::as_str),
        }
    }

    /// Writes the draft to the local cache, then submits it to the backend.
    ///
    /// A storage failure leaves the draft in place and returns `Err`. A remote
    /// failure is reported in the outcome; the local change is kept.
    pub async fn save<R: RecordStore<ProfileRecord>>(
        &mut self,
        cache: &ProfileCache<R>,
        backend: &dyn AuthBackend,
        token: Option<&str>,
    ) -> Result<SaveOutcome, ClientError> {
        let Some(draft) = self.draft.take() else {
            return Ok(SaveOutcome {
                record: cache.read_profile().await?,
                remote_error: None,
            });
        };

        let update = ProfileUpdate {
            role: Some(draft.role.clone()),
            resume: draft.resume.as_ref().map(|(blob, _)| blob.clone()),
        };
        let record = match cache.write_profile(update).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Profile save failed locally: {e}");
                self.draft = Some(draft);
                return Err(e.into());
            }
        };

        let Draft { role, resume } = draft;
        let submission = ProfileSubmission {
            target_role: role.clone(),
            resume: resume.as_ref().map(|(blob, _)| blob.clone()),
        };
        self.saved.role = role;
        if let Some((blob, url)) = resume {
            self.saved.resume = Some(blob);
            self.saved.url = Some(url);
        }

        let remote_error = match token {
            None => Some(ClientError::NoSession.user_message()),
            Some(token) => match backend.update_profile(token, &submission).await {
                Ok(_) => None,
                Err(e) => {
                    warn!("Profile update rejected by backend: {e}");
                    Some(e.user_message())
                }
            },
        };

        Ok(SaveOutcome {
            record,
            remote_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use crate::test_support::{FakeBackend, FakeReply};

    fn blob(name: &str) -> ResumeBlob {
        ResumeBlob::from_upload(name, b"%PDF-1.7".to_vec()).unwrap()
    }

    async fn seeded(
        role: &str,
        resume: Option<ResumeBlob>,
    ) -> ProfileCache<MemoryRecordStore<ProfileRecord>> {
        let cache = ProfileCache::new(MemoryRecordStore::new("users"));
        cache
            .write_profile(ProfileUpdate {
                role: Some(role.to_string()),
                resume,
            })
            .await
            .unwrap();
        cache
    }

    #[tokio::test]
    async fn test_cancel_restores_saved_values() {
        let urls = ObjectUrls::new();
        let cache = seeded("Analyst", Some(blob("old.pdf"))).await;
        let mut editor = ProfileEditor::new(urls.clone());
        editor.load(&cache).await.unwrap();
        let saved_url = editor.resume_url().unwrap().to_string();

        editor.begin_edit();
        editor.set_role("Engineer");
        editor.set_resume(blob("new.pdf"));
        assert_eq!(editor.role(), "Engineer");
        assert_eq!(editor.resume_file_name(), "new.pdf");
        let draft_url = editor.resume_url().unwrap().to_string();
        assert_eq!(urls.live_count(), 2);

        editor.cancel();
        assert!(!editor.is_editing());
        assert_eq!(editor.role(), "Analyst");
        assert_eq!(editor.resume_file_name(), "old.pdf");
        assert_eq!(editor.resume_url(), Some(saved_url.as_str()));
        assert!(!urls.is_live(&draft_url));
        assert_eq!(cache.read_profile().await.unwrap().role, "Analyst");
    }

    #[tokio::test]
    async fn test_edits_ignored_outside_edit_mode() {
        let cache = seeded("Analyst", None).await;
        let mut editor = ProfileEditor::new(ObjectUrls::new());
        editor.load(&cache).await.unwrap();

        editor.set_role("Ignored");
        editor.set_resume(blob("ignored.pdf"));
        assert_eq!(editor.role(), "Analyst");
        assert!(editor.resume().is_none());
    }

    #[tokio::test]
    async fn test_save_writes_locally_and_submits() {
        let urls = ObjectUrls::new();
        let cache = seeded("Analyst", Some(blob("old.pdf"))).await;
        let backend = FakeBackend::default();
        let mut editor = ProfileEditor::new(urls.clone());
        editor.load(&cache).await.unwrap();
        let old_url = editor.resume_url().unwrap().to_string();

        editor.begin_edit();
        editor.set_role("Engineer");
        editor.set_resume(blob("new.pdf"));
        let outcome = editor.save(&cache, &backend, Some("tok")).await.unwrap();

        assert_eq!(outcome.remote_error, None);
        assert_eq!(outcome.record.role, "Engineer");
        assert_eq!(outcome.record.resume_file_name(), "new.pdf");
        assert!(!editor.is_editing());
        assert!(!urls.is_live(&old_url));
        assert_eq!(urls.live_count(), 1);

        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].target_role, "Engineer");
        assert_eq!(backend.tokens(), vec!["tok"]);
    }

    #[tokio::test]
    async fn test_save_role_only_keeps_stored_resume() {
        let cache = seeded("Analyst", Some(blob("old.pdf"))).await;
        let backend = FakeBackend::default();
        let mut editor = ProfileEditor::new(ObjectUrls::new());
        editor.load(&cache).await.unwrap();

        editor.begin_edit();
        editor.set_role("Engineer");
        let outcome = editor.save(&cache, &backend, Some("tok")).await.unwrap();

        assert_eq!(outcome.record.resume_file_name(), "old.pdf");
        assert_eq!(editor.resume_file_name(), "old.pdf");
        assert!(backend.submissions()[0].resume.is_none());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_write() {
        let cache = seeded("Analyst", None).await;
        let backend = FakeBackend::default();
        backend.set_profile(FakeReply::Server(500, "boom".to_string()));
        let mut editor = ProfileEditor::new(ObjectUrls::new());
        editor.load(&cache).await.unwrap();

        editor.begin_edit();
        editor.set_role("Engineer");
        let outcome = editor.save(&cache, &backend, Some("tok")).await.unwrap();

        assert_eq!(outcome.remote_error.as_deref(), Some("boom"));
        assert_eq!(cache.read_profile().await.unwrap().role, "Engineer");
        assert_eq!(editor.role(), "Engineer");
    }

    #[tokio::test]
    async fn test_save_without_token_skips_backend() {
        let cache = seeded("Analyst", None).await;
        let backend = FakeBackend::default();
        let mut editor = ProfileEditor::new(ObjectUrls::new());
        editor.load(&cache).await.unwrap();

        editor.begin_edit();
        editor.set_role("Engineer");
        let outcome = editor.save(&cache, &backend, None).await.unwrap();

        assert!(outcome.remote_error.is_some());
        assert!(backend.calls().is_empty());
        assert_eq!(cache.read_profile().await.unwrap().role, "Engineer");
    }

    #[tokio::test]
    async fn test_local_failure_keeps_draft() {
        let store = MemoryRecordStore::new("users");
        let cache = ProfileCache::new(store.clone());
        let backend = FakeBackend::default();
        let mut editor = ProfileEditor::new(ObjectUrls::new());
        editor.load(&cache).await.unwrap();

        editor.begin_edit();
        editor.set_role("Engineer");
        store.fail_writes(true);

        assert!(editor.save(&cache, &backend, Some("tok")).await.is_err());
        assert!(editor.is_editing());
        assert_eq!(editor.role(), "Engineer");
        assert!(backend.calls().is_empty());
    }
}
