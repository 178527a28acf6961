use crate::cache::ObjectCache;
use crate::cache::object_cache::moka::MokaCacheWrapper;
use crate::config::AppConfig;
use crate::errors::{QuizSystemError, Result};
use crate::services::EngineContext;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub engine: EngineContext,
}

/// 创建缓存实例（进程内 Moka 缓存）
fn create_cache() -> Arc<dyn ObjectCache> {
    let config = AppConfig::get();
    debug!(
        "Creating Moka cache (capacity {}, ttl {}s)",
        config.cache.memory.max_capacity, config.cache.default_ttl
    );
    Arc::new(MokaCacheWrapper::from_config(&config.cache))
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和测验引擎协作者
pub async fn prepare_server_startup() -> Result<StartupContext> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| QuizSystemError::startup("Failed to install rustls crypto provider"))?;

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache();
    warn!("Cache backend initialized");

    let config = AppConfig::get();
    let engine = EngineContext::from_storage(storage.clone(), config.quiz.clone());
    debug!(
        "Quiz engine ready (start retry limit {}, notifications {})",
        config.quiz.start_retry_limit,
        if config.quiz.notifications_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(StartupContext {
        storage,
        cache,
        engine,
    })
}
