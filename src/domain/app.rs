//! 应用相关领域模型
//!
//! JSON 字段名沿用 PascalCase（`Name`、`GitUrl`、`AppVhosts` ...），保持与现有客户端兼容

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::report::Report;

/// `apps:report` 中的创建时间字段（Unix 秒）
pub const CREATED_AT_FIELD: &str = "App created at";
pub const APP_DIR_FIELD: &str = "App dir";
pub const APP_LOCKED_FIELD: &str = "App locked";
pub const DOMAINS_ENABLED_FIELD: &str = "Domains app enabled";
pub const DOMAINS_APP_VHOSTS_FIELD: &str = "Domains app vhosts";
pub const DOMAINS_GLOBAL_VHOSTS_FIELD: &str = "Domains global vhosts";

/// 应用状态，dokku 报告中没有对应字段，固定为 running
pub const APP_STATUS: &str = "running";

/// 字段读取错误：区分"字段缺失"与"字段无法解析"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field '{0}' is missing")]
    Missing(String),
    #[error("field '{field}' has invalid value '{value}'")]
    Invalid { field: String, value: String },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            FieldError::Missing(field) => field,
            FieldError::Invalid { field, .. } => field,
        }
    }
}

/// 非致命问题：某条命令失败或某个字段无法读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// 出问题的命令（如 `apps:report`）或字段名
    pub source: String,
    pub message: String,
}

impl Issue {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl From<&FieldError> for Issue {
    fn from(err: &FieldError) -> Self {
        Self::new(err.field(), err.to_string())
    }
}

/// `?name=<app>` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct AppNameQuery {
    pub name: Option<String>,
}

impl AppNameQuery {
    /// 去除空白后的应用名，缺失或为空时返回 None
    pub fn app_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// 应用列表中的单个应用
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppRecord {
    pub name: String,
    pub git_url: String,
    pub git_branch: String,
    /// RFC 1123 格式的创建时间
    pub created_at: String,
    pub status: String,
    /// 原始 `apps:report` 报告
    pub details: Report,
    #[serde(rename = "issues", skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

/// 应用列表响应
#[derive(Debug, Serialize)]
pub struct AppsResponse {
    pub apps: Vec<AppRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

/// 应用详情
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppDetails {
    /// `config:show` 报告
    pub config: Report,
    pub domain: DomainDetails,
    pub report: ReportDetails,
    #[serde(rename = "issues", skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

/// 域名配置（来自 `domains:report`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainDetails {
    pub enabled: bool,
    pub app_vhosts: Vec<String>,
    pub global_vhosts: Vec<String>,
}

impl DomainDetails {
    pub fn from_report(report: &Report) -> Self {
        Self {
            enabled: report.flag(DOMAINS_ENABLED_FIELD),
            app_vhosts: report.hosts(DOMAINS_APP_VHOSTS_FIELD),
            global_vhosts: report.hosts(DOMAINS_GLOBAL_VHOSTS_FIELD),
        }
    }
}

/// 应用基本信息（来自 `apps:report`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportDetails {
    pub dir: String,
    pub locked: bool,
}

impl ReportDetails {
    pub fn from_report(report: &Report) -> Self {
        Self {
            dir: report.text(APP_DIR_FIELD),
            locked: report.flag(APP_LOCKED_FIELD),
        }
    }
}

/// 解析 `apps:list` 输出：跳过首行标题，其余非空行各是一个应用名
pub fn parse_app_list(output: &str) -> Vec<String> {
    output
        .trim()
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 读取创建时间
pub fn created_at(report: &Report) -> Result<DateTime<Utc>, FieldError> {
    let value = report
        .get(CREATED_AT_FIELD)
        .ok_or_else(|| FieldError::Missing(CREATED_AT_FIELD.to_string()))?;

    let invalid = || FieldError::Invalid {
        field: CREATED_AT_FIELD.to_string(),
        value: value.to_string(),
    };

    let secs = parse_prefixed_int(value).ok_or_else(invalid)?;
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(invalid)
}

/// 解析整数，支持可选符号和进制前缀：
/// `0x`/`0X` 十六进制，`0o`/`0O` 和前导 `0` 八进制，`0b`/`0B` 二进制，其余十进制
///
/// 不接受下划线数字分隔符（如 `0x_1F`、`1_000`）
pub fn parse_prefixed_int(value: &str) -> Option<i64> {
    let (negative, unsigned) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let (radix, digits) = if let Some(rest) = strip_radix_prefix(unsigned, 'x') {
        (16, rest)
    } else if let Some(rest) = strip_radix_prefix(unsigned, 'o') {
        (8, rest)
    } else if let Some(rest) = strip_radix_prefix(unsigned, 'b') {
        (2, rest)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix 自己也接受符号，这里只允许前面出现一次
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn strip_radix_prefix(value: &str, marker: char) -> Option<&str> {
    let rest = value.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

/// RFC 1123 格式，如 `Mon, 02 Jan 2006 15:04:05 UTC`
pub fn format_rfc1123(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}
