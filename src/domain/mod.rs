//! 领域模型模块
//!
//! 纯数据结构与 dokku 输出解析，不依赖 axum/tokio

pub mod app;
pub mod report;

// Re-exports for convenience
pub use app::{AppDetails, AppNameQuery, AppRecord, AppsResponse, DomainDetails, Issue, ReportDetails};
pub use report::Report;
