use std::sync::Arc;

use hubs_domain::backup::BackupService;
use hubs_domain::counters::LikeCounters;
use hubs_domain::likes::LikeService;
use hubs_domain::ports::cms::LikeStorePort;
use hubs_domain::ports::content::ContentPort;
use hubs_domain::ports::identity::IdentityPort;
use hubs_domain::reconcile::Reconciler;
use hubs_infra::config::AppConfig;
use hubs_infra::directus::DirectusClient;
use hubs_infra::mastodon::MastodonClient;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub content: Arc<dyn ContentPort>,
    pub identity: Arc<dyn IdentityPort>,
    pub likes: LikeService,
    pub reconciler: Arc<Reconciler>,
    pub backup: Arc<BackupService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let directus = Arc::new(DirectusClient::from_config(&config));
        let mastodon = Arc::new(MastodonClient::from_config(&config));
        Self::with_ports(config, directus.clone(), directus, mastodon)
    }

    pub fn with_ports(
        config: AppConfig,
        likes_store: Arc<dyn LikeStorePort>,
        content: Arc<dyn ContentPort>,
        identity: Arc<dyn IdentityPort>,
    ) -> Self {
        let counters = Arc::new(LikeCounters::new());
        let likes = LikeService::new(counters.clone(), likes_store.clone());
        let reconciler = Arc::new(Reconciler::new(
            counters.clone(),
            likes_store.clone(),
            config.restore_page_size,
        ));
        let backup = Arc::new(BackupService::new(counters, likes_store));
        Self {
            config,
            content,
            identity,
            likes,
            reconciler,
            backup,
        }
    }
}
