//! 统一错误处理
//!
//! 提供 `ApiError` 枚举实现 `IntoResponse`，失败时返回结构化的 JSON 错误体

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::infra::command::CommandError;

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 400 - 请求无效
    BadRequest(String),
    /// 500 - dokku 无法启动（未安装、不在 PATH 中）
    ToolUnavailable(String),
    /// 500 - dokku 以非零状态退出，附带 stderr
    CommandFailed { message: String, stderr: String },
    /// 504 - dokku 超时
    Timeout(String),
}

impl ApiError {
    /// 创建请求无效错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::ToolUnavailable(_)
            | ApiError::CommandFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match &err {
            CommandError::SpawnFailed { .. } => ApiError::ToolUnavailable(err.to_string()),
            CommandError::Timeout { .. } => ApiError::Timeout(err.to_string()),
            CommandError::Failed { program, code, stderr } => ApiError::CommandFailed {
                message: match code {
                    Some(code) => format!("{} exited with status {}", program, code),
                    None => format!("{} was killed by a signal", program),
                },
                stderr: stderr.trim().to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg) => ErrorResponse::new("bad_request", msg),
            ApiError::ToolUnavailable(msg) => ErrorResponse::new("tool_unavailable", msg),
            ApiError::CommandFailed { message, stderr } => {
                ErrorResponse::new("command_failed", message).with_details(stderr)
            }
            ApiError::Timeout(msg) => ErrorResponse::new("timeout", msg),
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(m) => write!(f, "Bad request: {}", m),
            ApiError::ToolUnavailable(m) => write!(f, "Tool unavailable: {}", m),
            ApiError::CommandFailed { message, stderr } => {
                write!(f, "Command failed: {} ({})", message, stderr)
            }
            ApiError::Timeout(m) => write!(f, "Timeout: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;
