use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::jobs::{AdzunaClient, JobSearch};
use crate::models::ProfileRecord;
use crate::profile::{ObjectUrls, ProfileCache, PROFILE_DB_NAME, PROFILE_STORE_NAME};
use crate::session::SessionStore;
use crate::storage::{FileKeyValueStore, FileRecordStore};

/// Everything the client needs, wired against the file-backed stores under
/// `config.data_dir`. Owned by the caller; nothing here is global.
pub struct AppState {
    pub config: Config,
    pub session: SessionStore<FileKeyValueStore>,
    pub profile: ProfileCache<FileRecordStore<ProfileRecord>>,
    pub jobs: JobSearch,
    pub urls: ObjectUrls,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let backend = HttpBackend::new(
            &config.backend_url,
            &config.register_path,
            config.http_timeout,
        )?;
        info!("Backend client initialized ({})", config.backend_url);

        let source = AdzunaClient::new(
            &config.adzuna_app_id,
            &config.adzuna_app_key,
            &config.adzuna_region,
            config.http_timeout,
        )?;
        info!("Job source initialized (region: {})", config.adzuna_region);

        let session = SessionStore::new(FileKeyValueStore::new(&config.data_dir), Arc::new(backend));
        let profile = ProfileCache::new(FileRecordStore::new(
            &config.data_dir,
            PROFILE_DB_NAME,
            PROFILE_STORE_NAME,
        ));

        Ok(Self {
            session,
            profile,
            jobs: JobSearch::new(Arc::new(source)),
            urls: ObjectUrls::new(),
            config,
        })
    }
}
