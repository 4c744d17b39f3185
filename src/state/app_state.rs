//! 应用状态

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 全局 shutdown token，用于优雅关闭 HTTP 服务
static GLOBAL_SHUTDOWN: std::sync::OnceLock<CancellationToken> = std::sync::OnceLock::new();

/// 获取全局 shutdown token
pub fn get_shutdown_token() -> CancellationToken {
    GLOBAL_SHUTDOWN
        .get_or_init(CancellationToken::new)
        .clone()
}

/// 触发全局 shutdown；token 尚未创建时先创建，之后获取的 token 均已取消
pub fn trigger_shutdown() {
    get_shutdown_token().cancel();
}

use crate::config::env::EnvConfig;
use crate::infra::{CommandInvoker, CommandRunner, DokkuClient};
use crate::services::apps::{AppService, ListingSettings};

/// 应用状态
///
/// 请求之间只共享只读配置和命令执行器，没有可变状态
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 应用聚合服务
    pub apps: AppService,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 使用给定的命令执行器创建状态
    pub fn new(config: EnvConfig, invoker: Arc<dyn CommandInvoker>) -> Self {
        let dokku = DokkuClient::new(invoker, config.dokku_bin.clone());
        let apps = AppService::new(dokku, ListingSettings::from(&config));

        Self {
            config,
            apps,
            started_at: Utc::now(),
        }
    }

    /// 使用真实进程执行器创建状态
    pub fn from_config(config: EnvConfig) -> Self {
        tracing::info!(
            port = config.port,
            dokku_bin = %config.dokku_bin,
            command_timeout = ?config.command_timeout,
            fetch_concurrency = config.fetch_concurrency,
            list_timeout = ?config.list_timeout,
            "Loaded configuration"
        );

        let runner = Arc::new(CommandRunner::new(config.command_timeout));
        Self::new(config, runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 全局 token 只能取消一次，两种顺序放在同一个测试里
    #[test]
    fn test_shutdown_token_shared() {
        trigger_shutdown();
        let token = get_shutdown_token();
        assert!(token.is_cancelled());

        trigger_shutdown();
        assert!(get_shutdown_token().is_cancelled());
        assert!(token.is_cancelled());
    }
}
