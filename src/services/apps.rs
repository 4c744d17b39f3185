//! 应用聚合服务
//!
//! 调用 dokku 获取报告，组装成应用列表和应用详情。
//! 读接口不会因为单个命令失败而整体失败：失败被记录为 `Issue` 并随响应返回。

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::EnvConfig;
use crate::domain::app::{
    self, AppDetails, AppRecord, AppsResponse, DomainDetails, Issue, ReportDetails, APP_STATUS,
};
use crate::domain::report::Report;
use crate::infra::command::CommandError;
use crate::infra::dokku::{subcommand, DokkuClient};

/// 应用列表组装参数
#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub git_url_prefix: String,
    pub git_branch: String,
    /// 报告抓取并发上限（至少为 1）
    pub concurrency: usize,
    /// 整个列表请求的截止时长
    pub timeout: Duration,
}

impl From<&EnvConfig> for ListingSettings {
    fn from(config: &EnvConfig) -> Self {
        Self {
            git_url_prefix: config.git_url_prefix.clone(),
            git_branch: config.git_branch.clone(),
            concurrency: config.fetch_concurrency.max(1),
            timeout: config.list_timeout,
        }
    }
}

/// 应用聚合服务
#[derive(Clone)]
pub struct AppService {
    dokku: DokkuClient,
    settings: ListingSettings,
}

impl AppService {
    pub fn new(dokku: DokkuClient, settings: ListingSettings) -> Self {
        Self { dokku, settings }
    }

    /// 列出应用及其报告
    ///
    /// 报告按 `concurrency` 并发抓取，结果保持 `apps:list` 的顺序；
    /// 截止时间之后仍未完成的抓取以空报告返回
    pub async fn list_apps(&self) -> AppsResponse {
        let names = match self.dokku.list_apps().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Failed to list apps");
                return AppsResponse {
                    apps: Vec::new(),
                    issues: vec![Issue::new(subcommand::APPS_LIST, e.to_string())],
                };
            }
        };

        let deadline = Instant::now() + self.settings.timeout;
        let apps: Vec<AppRecord> = stream::iter(names)
            .map(|name| self.fetch_record(name, deadline))
            .buffered(self.settings.concurrency)
            .collect()
            .await;

        info!(count = apps.len(), "Listed apps");

        AppsResponse {
            apps,
            issues: Vec::new(),
        }
    }

    async fn fetch_record(&self, name: String, deadline: Instant) -> AppRecord {
        let mut issues = Vec::new();

        // buffered 惰性创建 future，截止后轮到的应用不再启动 dokku
        let report = if Instant::now() >= deadline {
            self.deadline_missed(&name, &mut issues)
        } else {
            match tokio::time::timeout_at(deadline, self.dokku.app_report(&name)).await {
                Ok(result) => collect_report(subcommand::APPS_REPORT, &name, result, &mut issues),
                Err(_) => self.deadline_missed(&name, &mut issues),
            }
        };

        self.build_record(name, report, issues)
    }

    fn deadline_missed(&self, name: &str, issues: &mut Vec<Issue>) -> Report {
        warn!(app = %name, "App report missed the listing deadline");
        issues.push(Issue::new(
            subcommand::APPS_REPORT,
            format!("listing deadline of {:?} exceeded", self.settings.timeout),
        ));
        Report::default()
    }

    /// 由 `apps:report` 报告构建列表项；创建时间无法读取时使用 epoch 并记录问题
    pub fn build_record(&self, name: String, report: Report, mut issues: Vec<Issue>) -> AppRecord {
        let created_at = match app::created_at(&report) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(app = %name, error = %e, "Failed to read app creation time");
                issues.push(Issue::from(&e));
                DateTime::<Utc>::default()
            }
        };

        AppRecord {
            git_url: format!("{}{}", self.settings.git_url_prefix, name),
            git_branch: self.settings.git_branch.clone(),
            created_at: app::format_rfc1123(created_at),
            status: APP_STATUS.to_string(),
            details: report,
            issues,
            name,
        }
    }

    /// 获取应用详情：三份报告并发抓取，失败的报告按空报告处理
    pub async fn app_details(&self, name: &str) -> AppDetails {
        let (report, config, domains) = tokio::join!(
            self.dokku.app_report(name),
            self.dokku.config_show(name),
            self.dokku.domains_report(name),
        );

        let mut issues = Vec::new();
        let report = collect_report(subcommand::APPS_REPORT, name, report, &mut issues);
        let config = collect_report(subcommand::CONFIG_SHOW, name, config, &mut issues);
        let domains = collect_report(subcommand::DOMAINS_REPORT, name, domains, &mut issues);

        AppDetails {
            config,
            domain: DomainDetails::from_report(&domains),
            report: ReportDetails::from_report(&report),
            issues,
        }
    }

    pub async fn create_app(&self, name: &str) -> Result<(), CommandError> {
        self.dokku.create_app(name).await?;
        info!(app = %name, "App created");
        Ok(())
    }

    pub async fn destroy_app(&self, name: &str) -> Result<(), CommandError> {
        self.dokku.destroy_app(name).await?;
        info!(app = %name, "App destroyed");
        Ok(())
    }
}

/// 取出报告；失败时记录日志和问题，返回空报告
fn collect_report(
    command: &str,
    app: &str,
    result: Result<Report, CommandError>,
    issues: &mut Vec<Issue>,
) -> Report {
    match result {
        Ok(report) => report,
        Err(e) => {
            warn!(app = %app, command = %command, error = %e, "Failed to fetch report");
            issues.push(Issue::new(command, e.to_string()));
            Report::default()
        }
    }
}
