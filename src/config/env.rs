//! 环境变量配置加载

use std::env;
use std::time::Duration;
use tracing::warn;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 监听地址
    pub bind_addr: String,
    /// 服务监听端口
    pub port: u16,
    /// dokku 可执行文件（名称或路径）
    pub dokku_bin: String,
    /// 单条命令超时
    pub command_timeout: Duration,
    /// 应用列表接口的报告并发抓取上限
    pub fetch_concurrency: usize,
    /// 应用列表接口的总超时
    pub list_timeout: Duration,
    /// 生成 git URL 的前缀，后接应用名
    pub git_url_prefix: String,
    /// 应用列表中展示的分支
    pub git_branch: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            dokku_bin: "dokku".to_string(),
            command_timeout: Duration::from_secs(constants::COMMAND_TIMEOUT_SECS),
            fetch_concurrency: constants::FETCH_CONCURRENCY,
            list_timeout: Duration::from_secs(constants::LIST_TIMEOUT_SECS),
            git_url_prefix: "https://github.com/".to_string(),
            git_branch: "master".to_string(),
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置，未设置或无法解析的项使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = parse_var("PORT").unwrap_or(defaults.port);
        let dokku_bin = env::var("DOKKU_BIN")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.dokku_bin);

        let command_timeout = parse_var("COMMAND_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.command_timeout);

        // 并发为 0 时 buffered 会永远挂起
        let fetch_concurrency = parse_var::<usize>("FETCH_CONCURRENCY")
            .unwrap_or(defaults.fetch_concurrency)
            .max(1);

        let list_timeout = parse_var("LIST_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.list_timeout);

        let git_url_prefix = env::var("GIT_URL_PREFIX").unwrap_or(defaults.git_url_prefix);
        let git_branch = env::var("GIT_BRANCH").unwrap_or(defaults.git_branch);

        Self {
            bind_addr,
            port,
            dokku_bin,
            command_timeout,
            fetch_concurrency,
            list_timeout,
            git_url_prefix,
            git_branch,
        }
    }
}

/// 读取并解析环境变量；值无法解析时告警并返回 None
fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = %name, value = %raw, "Ignoring unparsable environment variable");
            None
        }
    }
}

/// 常量
pub mod constants {
    /// 服务名
    pub const SERVICE_NAME: &str = "dokku-agent";

    /// 单条 dokku 命令超时（秒）
    pub const COMMAND_TIMEOUT_SECS: u64 = 30;

    /// 应用列表报告并发数
    pub const FETCH_CONCURRENCY: usize = 4;

    /// 应用列表总超时（秒）
    pub const LIST_TIMEOUT_SECS: u64 = 60;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.dokku_bin, "dokku");
        assert_eq!(config.git_url_prefix, "https://github.com/");
        assert_eq!(config.git_branch, "master");
        assert_eq!(config.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_var() {
        env::set_var("DOKKU_AGENT_TEST_NUMBER", " 42 ");
        assert_eq!(parse_var::<u16>("DOKKU_AGENT_TEST_NUMBER"), Some(42));

        env::set_var("DOKKU_AGENT_TEST_NUMBER", "not-a-number");
        assert_eq!(parse_var::<u16>("DOKKU_AGENT_TEST_NUMBER"), None);

        env::remove_var("DOKKU_AGENT_TEST_NUMBER");
        assert_eq!(parse_var::<u16>("DOKKU_AGENT_TEST_NUMBER"), None);
    }
}
