//! 运行时状态模块
//!
//! 管理应用状态和关闭信号

pub mod app_state;

pub use app_state::AppState;
