//! 命令执行器
//!
//! 提供统一的命令执行接口，支持：
//! - stdout/stderr 分离
//! - 超时控制（超时后子进程被 kill）
//! - `CommandInvoker` trait，handler 通过注入获得执行器，测试中可替换为 mock

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

/// 命令执行错误
#[derive(Debug, Error)]
pub enum CommandError {
    /// 命令启动失败（可执行文件不存在、无权限等）
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 命令以非零状态退出，携带捕获的 stderr
    #[error("{program} exited with {}: {}", describe_code(.code), .stderr.trim())]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// 命令超时
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

impl CommandError {
    /// 捕获的 stderr（仅 `Failed` 有）
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// 外部命令调用接口
#[async_trait]
pub trait CommandInvoker: Send + Sync {
    /// 同步语义执行一次命令：成功返回 stdout，失败返回携带 stderr 的错误
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// 命令执行器
///
/// 每次调用都受 `timeout` 约束，超时的子进程在 future 被丢弃时 kill
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandInvoker for CommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        debug!(program = %program, args = ?args, "Running command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|source| CommandError::SpawnFailed {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                error!(program = %program, args = ?args, "Command timed out after {:?}", self.timeout);
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Mock 执行器：按 "program arg1 arg2" 查表返回预设结果
#[cfg(test)]
pub(crate) struct MockInvoker {
    responses: std::collections::HashMap<String, Result<String, String>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockInvoker {
    pub fn new() -> Self {
        Self {
            responses: std::collections::HashMap::new(),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn ok(mut self, command: &str, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), Ok(stdout.to_string()));
        self
    }

    pub fn fail(mut self, command: &str, stderr: &str) -> Self {
        self.responses
            .insert(command.to_string(), Err(stderr.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandInvoker for MockInvoker {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let key = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(key.clone());

        match self.responses.get(&key) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => Err(CommandError::Failed {
                program: program.to_string(),
                code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Err(CommandError::SpawnFailed {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no mock response"),
            }),
        }
    }
}
