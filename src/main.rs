//! Dokku Agent - 以 JSON HTTP API 暴露 dokku 应用管理
//!
//! Usage:
//! - Normal mode: `dokku-agent`
//! - With custom port: `dokku-agent --port 9000`

use dokku_agent::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("Dokku Agent - HTTP API for dokku app management");
    println!();
    println!("USAGE:");
    println!("    dokku-agent [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PORT                  Listening port (default: 8080)");
    println!("    BIND_ADDR             Bind address (default: 0.0.0.0)");
    println!("    DOKKU_BIN             dokku executable (default: dokku)");
    println!("    COMMAND_TIMEOUT_SECS  Per-command timeout (default: 30)");
    println!("    FETCH_CONCURRENCY     Parallel report fetches for /apps (default: 4)");
    println!("    LIST_TIMEOUT_SECS     Overall /apps deadline (default: 60)");
    println!("    GIT_URL_PREFIX        Prefix for derived git URLs (default: https://github.com/)");
    println!("    GIT_BRANCH            Branch shown for apps (default: master)");
    println!("    RUST_LOG              Log filter");
}

fn main() {
    let config = parse_args();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(dokku_agent::init_and_run_agent_with_config(config)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
