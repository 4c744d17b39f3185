//! HTTP 层集成测试
//!
//! 在随机端口上启动真实的 axum 服务，用 reqwest 访问

use async_trait::async_trait;
use dokku_agent::config::EnvConfig;
use dokku_agent::infra::{CommandError, CommandInvoker, CommandRunner};
use dokku_agent::state::AppState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 按完整命令行返回预设 stdout 的执行器，未登记的命令视为以状态 1 退出
struct FakeDokku {
    outputs: HashMap<String, String>,
}

impl FakeDokku {
    fn new(outputs: &[(&str, &str)]) -> Self {
        Self {
            outputs: outputs
                .iter()
                .map(|(cmd, out)| (cmd.to_string(), out.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl CommandInvoker for FakeDokku {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let key = format!("{} {}", program, args.join(" "));
        self.outputs
            .get(&key)
            .cloned()
            .ok_or_else(|| CommandError::Failed {
                program: program.to_string(),
                code: Some(1),
                stderr: format!(" !     unknown command: {}", key),
            })
    }
}

async fn start_test_server(invoker: Arc<dyn CommandInvoker>) -> String {
    start_test_server_with(EnvConfig::default(), invoker).await
}

async fn start_test_server_with(config: EnvConfig, invoker: Arc<dyn CommandInvoker>) -> String {
    let state = Arc::new(AppState::new(config, invoker));
    let router = dokku_agent::api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// 使用真实执行器，但 dokku 可执行文件不存在
async fn start_server_without_tool() -> String {
    let config = EnvConfig {
        dokku_bin: "dokku-agent-test-missing-binary".to_string(),
        ..EnvConfig::default()
    };
    start_test_server_with(config, Arc::new(CommandRunner::new(Duration::from_secs(5)))).await
}

/// GET 并返回 (status, JSON body)；空 body 返回 Value::Null
async fn get(base: &str, path: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .get(format!("{}{}", base, path))
        .header("origin", "http://dashboard.local")
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, body)
}

fn fake_dokku() -> Arc<dyn CommandInvoker> {
    Arc::new(FakeDokku::new(&[
        ("dokku apps:list", "=====> My Apps\napp1\napp2\n"),
        (
            "dokku apps:report app1",
            "=====> app1 app information\n       App created at:    1650000000\n       App dir:           /home/dokku/app1\n       App locked:        false\n",
        ),
        ("dokku apps:report app2", "=====> app2 app information\n       App dir: /home/dokku/app2\n"),
        ("dokku config:show app1", "=====> app1 env vars\nPORT:   5000\nDATABASE_URL: postgres://db:5432/app1\n"),
        (
            "dokku domains:report app1",
            "=====> app1 domains information\n       Domains app enabled:  true\n       Domains app vhosts:   app1.example.com www.example.com\n       Domains global vhosts:\n",
        ),
        ("dokku apps:create fresh", "-----> Creating fresh..."),
        ("dokku apps:destroy app1", "-----> Destroying app1"),
    ]))
}

#[tokio::test]
async fn test_health_endpoint() {
    let base = start_test_server(fake_dokku()).await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "dokku-agent");
}

#[tokio::test]
async fn test_list_apps() {
    let base = start_test_server(fake_dokku()).await;
    let (status, body) = get(&base, "/apps").await;
    assert_eq!(status, 200);

    let apps = body["apps"].as_array().unwrap();
    assert_eq!(apps.len(), 2);

    assert_eq!(apps[0]["Name"], "app1");
    assert_eq!(apps[0]["GitUrl"], "https://github.com/app1");
    assert_eq!(apps[0]["GitBranch"], "master");
    assert_eq!(apps[0]["Status"], "running");
    assert_eq!(apps[0]["CreatedAt"], "Fri, 15 Apr 2022 05:20:00 UTC");
    assert_eq!(apps[0]["Details"]["App dir"], "/home/dokku/app1");
    assert!(apps[0].get("issues").is_none());

    // app2 没有创建时间：仍然列出，时间回退为 epoch
    assert_eq!(apps[1]["Name"], "app2");
    assert_eq!(apps[1]["CreatedAt"], "Thu, 01 Jan 1970 00:00:00 UTC");
    assert_eq!(apps[1]["issues"][0]["source"], "App created at");
}

#[tokio::test]
async fn test_app_details() {
    let base = start_test_server(fake_dokku()).await;
    let (status, body) = get(&base, "/apps/details?name=app1").await;
    assert_eq!(status, 200);

    let details = &body["app1"];
    assert_eq!(details["Report"]["Dir"], "/home/dokku/app1");
    assert_eq!(details["Report"]["Locked"], false);
    assert_eq!(details["Config"]["PORT"], "5000");
    // 值含冒号的行被丢弃
    assert!(details["Config"].get("DATABASE_URL").is_none());
    assert_eq!(details["Domain"]["Enabled"], true);
    assert_eq!(
        details["Domain"]["AppVhosts"],
        serde_json::json!(["app1.example.com", "www.example.com"])
    );
    assert_eq!(details["Domain"]["GlobalVhosts"], serde_json::json!([""]));
}

#[tokio::test]
async fn test_app_details_missing_name() {
    let base = start_test_server(fake_dokku()).await;
    let (status, body) = get(&base, "/apps/details").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_create_and_destroy() {
    let base = start_test_server(fake_dokku()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/apps/create?name=fresh", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let (status, body) = get(&base, "/apps/destroy?name=app1").await;
    assert_eq!(status, 204);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_create_failure_is_structured() {
    let base = start_test_server(fake_dokku()).await;
    let (status, body) = get(&base, "/apps/create?name=app1").await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "command_failed");
    assert!(body["details"].as_str().unwrap().contains("unknown command"));
}

#[tokio::test]
async fn test_cors_header() {
    let base = start_test_server(fake_dokku()).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/apps", base))
        .header("origin", "http://dashboard.local")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_tool_unreachable() {
    let base = start_server_without_tool().await;

    let (status, body) = get(&base, "/apps/create?name=web").await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "tool_unavailable");

    let (status, _) = get(&base, "/apps/destroy?name=web").await;
    assert_eq!(status, 500);

    let (status, body) = get(&base, "/apps").await;
    assert_eq!(status, 200);
    assert_eq!(body["apps"], serde_json::json!([]));
    assert_eq!(body["issues"][0]["source"], "apps:list");

    let (status, body) = get(&base, "/apps/details?name=web").await;
    assert_eq!(status, 200);
    assert_eq!(body["web"]["Report"]["Dir"], "");
    assert_eq!(body["web"]["issues"].as_array().unwrap().len(), 3);
}
