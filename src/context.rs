use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    CheckpointStore, DigestSource, KnownVersionStore, NotifierService, TicketSourceService,
    VersionSource,
};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub ticket_source: Arc<dyn TicketSourceService>,
    pub notifier: Arc<dyn NotifierService>,
    pub checkpoint_store: Arc<dyn CheckpointStore>,
    pub version_watch: Option<VersionWatchServices>,
    pub digest_source: Option<Arc<dyn DigestSource>>,
}

/// The version watch keeps its own file, apart from the ticket checkpoint.
#[derive(Clone)]
pub struct VersionWatchServices {
    pub source: Arc<dyn VersionSource>,
    pub known_version: Arc<dyn KnownVersionStore>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        ticket_source: Arc<dyn TicketSourceService>,
        notifier: Arc<dyn NotifierService>,
        checkpoint_store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            config,
            ticket_source,
            notifier,
            checkpoint_store,
            version_watch: None,
            digest_source: None,
        }
    }

    pub fn with_version_watch(
        mut self,
        source: Arc<dyn VersionSource>,
        known_version: Arc<dyn KnownVersionStore>,
    ) -> Self {
        self.version_watch = Some(VersionWatchServices {
            source,
            known_version,
        });
        self
    }

    pub fn with_digest_source(mut self, digest_source: Arc<dyn DigestSource>) -> Self {
        self.digest_source = Some(digest_source);
        self
    }
}
