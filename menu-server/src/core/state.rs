use dashmap::DashMap;
use std::sync::Arc;

use crate::core::Config;
use crate::db::{CatalogStorage, StorageResult};

/// 资源版本管理器
///
/// 每次成功写入后递增对应资源的版本号，
/// 客户端可以通过版本号判断本地数据是否过期。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 所有 handler 共享
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | CatalogStorage | redb 菜单存储 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
///
/// 克隆成本很低 (内部均为 Arc)。
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: CatalogStorage,
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 打开数据目录下的存储并构建状态
    pub fn initialize(config: &Config) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = CatalogStorage::open(config.catalog_path())?;
        tracing::info!(path = %config.catalog_path().display(), "Catalog storage opened");
        Ok(Self::with_storage(config.clone(), storage))
    }

    /// 使用已有存储构建状态 (测试使用内存存储)
    pub fn with_storage(config: Config, storage: CatalogStorage) -> Self {
        Self {
            config,
            storage,
            resource_versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// 写入成功后递增资源版本
    pub fn bump_version(&self, resource: &str) -> u64 {
        let version = self.resource_versions.increment(resource);
        tracing::debug!(resource, version, "Resource version bumped");
        version
    }
}
