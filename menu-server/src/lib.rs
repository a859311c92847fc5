//! Menu Server - 菜单排序服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 redb 存储，位置批量写入单事务执行
//! - **HTTP API** (`api`): 菜单 / 分区 / 菜品 CRUD 与排序接口
//! - **核心** (`core`): 配置、状态、服务器启动
//!
//! # 模块结构
//!
//! ```text
//! menu-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、校验
//! └── db/            # redb 存储层
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState, build_app};
pub use db::{CatalogStorage, StorageError};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 按配置初始化日志 (级别 + 可选日志目录)
pub fn setup_environment(config: &Config) {
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
}
