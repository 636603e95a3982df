use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::models::ResumeBlob;

/// Registry of temporary display URLs derived from resume blobs.
///
/// Every URL is handed out as a [`ResumeUrl`] guard and revoked when the
/// guard is dropped, so a replaced or torn-down view cannot leak it.
#[derive(Clone, Debug, Default)]
pub struct ObjectUrls {
    live: Arc<Mutex<HashSet<String>>>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, blob: &ResumeBlob) -> ResumeUrl {
        let url = format!("blob:jobfit/{}", Uuid::new_v4());
        self.lock().insert(url.clone());
        debug!("Created display URL for {}", blob.file_name);
        ResumeUrl {
            url,
            registry: self.clone(),
        }
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, url: &str) {
        self.lock().remove(url);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A live display URL. Revoked on drop.
#[derive(Debug)]
pub struct ResumeUrl {
    url: String,
    registry: ObjectUrls,
}

impl ResumeUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ResumeUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
