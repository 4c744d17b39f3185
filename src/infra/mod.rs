//! 基础设施模块
//!
//! 封装外部依赖（命令执行、dokku CLI）

pub mod command;
pub mod dokku;

pub use command::{CommandError, CommandInvoker, CommandRunner};
pub use dokku::DokkuClient;
