//! 场景状态
//!
//! 每个场景一份的变量表，步骤把结果写入 `lastRun`，
//! 后续步骤通过 `${name}` 引用。状态只被当前持有 `&mut World` 的步骤访问，
//! 场景内步骤顺序执行，因此不加锁；并行执行同一场景的步骤不在支持范围内。

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::utils::template::fill_template;

/// 最近一次步骤结果的变量名
pub const LAST_RUN: &str = "lastRun";

/// 本地文件根目录的变量名
pub const DIRECTORY: &str = "directory";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioState {
    values: HashMap<String, Value>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn last_run(&self) -> Option<&Value> {
        self.get(LAST_RUN)
    }

    /// 序列化结果并保存为 `lastRun`
    pub fn set_last_run<T: Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(LAST_RUN, value);
        Ok(())
    }

    /// 替换文本中的变量引用，未设置的变量保持原样
    pub fn fill(&self, text: &str) -> String {
        fill_template(text, |name| self.values.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_uses_state_values() {
        let mut state = ScenarioState::new();
        state.set("bucketName", "my-bucket");
        assert_eq!(state.fill("${bucketName}"), "my-bucket");
        assert_eq!(state.fill("literal"), "literal");
        assert_eq!(state.fill("${unset}"), "${unset}");
    }

    #[test]
    fn test_missing_lookup_is_explicit() {
        let state = ScenarioState::new();
        assert!(state.get("anything").is_none());
        assert!(state.last_run().is_none());
    }

    #[test]
    fn test_set_last_run_serializes() {
        let mut state = ScenarioState::new();
        state.set_last_run(&vec!["x.txt", "y.txt"]).unwrap();
        assert_eq!(state.last_run(), Some(&json!(["x.txt", "y.txt"])));
        assert_eq!(state.fill("${lastRun.1}"), "y.txt");
    }
}
