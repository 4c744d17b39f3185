//! Dokku CLI 客户端
//!
//! 封装 dokku 子命令，输出交给 `Report` / `parse_app_list` 解析

use std::sync::Arc;
use tracing::debug;

use super::command::{CommandError, CommandInvoker};
use crate::domain::app::parse_app_list;
use crate::domain::report::Report;

/// dokku 子命令
pub mod subcommand {
    pub const APPS_LIST: &str = "apps:list";
    pub const APPS_REPORT: &str = "apps:report";
    pub const APPS_CREATE: &str = "apps:create";
    pub const APPS_DESTROY: &str = "apps:destroy";
    pub const CONFIG_SHOW: &str = "config:show";
    pub const DOMAINS_REPORT: &str = "domains:report";
}

/// Dokku 客户端
#[derive(Clone)]
pub struct DokkuClient {
    invoker: Arc<dyn CommandInvoker>,
    bin: String,
}

impl DokkuClient {
    pub fn new(invoker: Arc<dyn CommandInvoker>, bin: impl Into<String>) -> Self {
        Self {
            invoker,
            bin: bin.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        debug!(bin = %self.bin, args = ?args, "Invoking dokku");
        self.invoker.run(&self.bin, args).await
    }

    /// 列出所有应用名（按输出顺序）
    pub async fn list_apps(&self) -> Result<Vec<String>, CommandError> {
        let output = self.run(&[subcommand::APPS_LIST]).await?;
        Ok(parse_app_list(&output))
    }

    pub async fn app_report(&self, app: &str) -> Result<Report, CommandError> {
        self.report(subcommand::APPS_REPORT, app).await
    }

    pub async fn config_show(&self, app: &str) -> Result<Report, CommandError> {
        self.report(subcommand::CONFIG_SHOW, app).await
    }

    pub async fn domains_report(&self, app: &str) -> Result<Report, CommandError> {
        self.report(subcommand::DOMAINS_REPORT, app).await
    }

    pub async fn create_app(&self, app: &str) -> Result<(), CommandError> {
        self.run(&[subcommand::APPS_CREATE, app]).await.map(|_| ())
    }

    pub async fn destroy_app(&self, app: &str) -> Result<(), CommandError> {
        self.run(&[subcommand::APPS_DESTROY, app]).await.map(|_| ())
    }

    async fn report(&self, subcommand: &str, app: &str) -> Result<Report, CommandError> {
        let output = self.run(&[subcommand, app]).await?;
        Ok(Report::parse(&output))
    }
}
