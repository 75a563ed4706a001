//! 结果步骤
//!
//! 设置场景变量，以及对 `lastRun` 做断言。

use anyhow::{Context, ensure};
use cucumber::{given, then};
use serde_json::Value;

use crate::steps::state::LAST_RUN;
use crate::steps::world::S3World;
use crate::utils::template::render;

/// 判断结果是否包含 `needle`
///
/// 列表中任一元素（或元素的 `name` 字段）等于 `needle` 即为包含；
/// 其他值按渲染后的文本做子串匹配。
pub fn contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| {
            render(item) == needle || item.get("name").and_then(Value::as_str) == Some(needle)
        }),
        other => render(other).contains(needle),
    }
}

fn last_run(world: &S3World) -> anyhow::Result<&Value> {
    world
        .state
        .last_run()
        .with_context(|| format!("{} has not been set in this scenario", LAST_RUN))
}

#[given(regex = r#"^set "([^"]*)" to "([^"]*)"$"#)]
async fn set_variable(world: &mut S3World, name: String, value: String) {
    let name = world.fill(&name);
    let value = world.fill(&value);
    world.state.set(name, value);
}

#[then(regex = r#"^the last run is "([^"]*)"$"#)]
async fn last_run_is(world: &mut S3World, expected: String) -> anyhow::Result<()> {
    let expected = world.fill(&expected);
    let actual = render(last_run(world)?);
    ensure!(actual == expected, "expected {:?} but the last run was {:?}", expected, actual);
    Ok(())
}

#[then(regex = r#"^the last run contains "([^"]*)"$"#)]
async fn last_run_contains(world: &mut S3World, needle: String) -> anyhow::Result<()> {
    let needle = world.fill(&needle);
    let value = last_run(world)?;
    ensure!(contains(value, &needle), "the last run {} does not contain {:?}", value, needle);
    Ok(())
}

#[then(regex = r#"^the last run does not contain "([^"]*)"$"#)]
async fn last_run_does_not_contain(world: &mut S3World, needle: String) -> anyhow::Result<()> {
    let needle = world.fill(&needle);
    let value = last_run(world)?;
    ensure!(!contains(value, &needle), "the last run {} contains {:?}", value, needle);
    Ok(())
}

#[then(regex = r#"^"([^"]*)" is equal to "([^"]*)"$"#)]
async fn values_are_equal(world: &mut S3World, left: String, right: String) -> anyhow::Result<()> {
    let left = world.fill(&left);
    let right = world.fill(&right);
    ensure!(left == right, "{:?} is not equal to {:?}", left, right);
    Ok(())
}
