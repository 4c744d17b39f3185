//! Dokku 报告解析
//!
//! `apps:report`、`config:show`、`domains:report` 都输出 `字段: 值` 形式的文本，
//! 这里把它解析为字段名到值的映射

use serde::Serialize;
use std::collections::BTreeMap;

/// 解析后的报告：字段名 -> 值（两侧空白已去除）
///
/// 只保留恰好被冒号分成两段的行，值本身含冒号的行（如 URL）会被丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report(BTreeMap<String, String>);

impl Report {
    /// 解析命令输出
    pub fn parse(output: &str) -> Self {
        let mut fields = BTreeMap::new();

        for line in output.trim().lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if value.contains(':') {
                continue;
            }
            // 重复字段以最后一次出现为准
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }

        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// 字段值，缺失时为空字符串
    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    /// 布尔字段：仅当值严格等于 `"true"` 时为真
    pub fn flag(&self, field: &str) -> bool {
        self.get(field) == Some("true")
    }

    /// 空格分隔的主机名列表
    ///
    /// 按单个空格切分，不合并连续空格；字段为空或缺失时得到 `[""]`
    pub fn hosts(&self, field: &str) -> Vec<String> {
        self.get(field)
            .unwrap_or_default()
            .split(' ')
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
