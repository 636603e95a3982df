use tracing::info;

use super::ProfileCache;
use crate::backend::ProfileSubmission;
use crate::errors::{ClientError, FieldError};
use crate::models::{ProfileRecord, ProfileUpdate, ResumeBlob, UserPatch};
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, RecordStore};

/// First-time profile setup: submits role and resume, caches them locally and
/// marks the signed-in user's profile complete.
pub async fn complete_profile<K, R>(
    session: &mut SessionStore<K>,
    cache: &ProfileCache<R>,
    role: &str,
    resume: Option<ResumeBlob>,
) -> Result<ProfileRecord, ClientError>
where
    K: KeyValueStore,
    R: RecordStore<ProfileRecord>,
{
    let mut errors = Vec::new();
    if role.trim().is_empty() {
        errors.push(FieldError::new("targetRole", "Target role is required"));
    }
    if resume.is_none() {
        errors.push(FieldError::new("resume", "Please upload your resume"));
    }
    let Some(resume) = resume.filter(|_| errors.is_empty()) else {
        return Err(ClientError::Validation(errors));
    };

    let token = session.token().ok_or(ClientError::NoSession)?.to_string();
    let submission = ProfileSubmission {
        target_role: role.trim().to_string(),
        resume: Some(resume.clone()),
    };
    session.backend().update_profile(&token, &submission).await?;

    let record = cache
        .write_profile(ProfileUpdate {
            role: Some(submission.target_role),
            resume: Some(resume),
        })
        .await?;

    if !session.update_profile(UserPatch::profile_complete(true)) {
        return Err(ClientError::NoSession);
    }
    info!("Profile setup complete");
    Ok(record)
}
