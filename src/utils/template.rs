use serde_json::Value;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// 替换文本中的 `${name}` 引用
///
/// `lookup` 按变量名返回值；字符串原样插入，其他 JSON 值插入其紧凑文本。
/// 变量名支持用 `.` 访问对象字段或数组下标，例如 `${lastRun.0.name}`。
/// 找不到的变量保留原始的 `${name}` 文本，未闭合的 `${` 也原样保留。
///
/// # 示例
///
/// ```
/// use s3_steps::utils::template::fill_template;
/// use serde_json::json;
///
/// let vars = json!({ "bucketName": "my-bucket" });
/// let lookup = |name: &str| vars.get(name).cloned();
///
/// assert_eq!(fill_template("${bucketName}", lookup), "my-bucket");
/// assert_eq!(fill_template("plain", lookup), "plain");
/// assert_eq!(fill_template("${missing}", lookup), "${missing}");
/// ```
pub fn fill_template<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Value>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let expr = &after_open[..end];
        match resolve(expr.trim(), &lookup) {
            Some(value) => out.push_str(&render(&value)),
            None => {
                out.push_str(OPEN);
                out.push_str(expr);
                out.push(CLOSE);
            }
        }
        rest = &after_open[end + 1..];
    }

    out.push_str(rest);
    out
}

/// 将 JSON 值渲染为插入文本
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn resolve<F>(expr: &str, lookup: &F) -> Option<Value>
where
    F: Fn(&str) -> Option<Value>,
{
    if expr.is_empty() {
        return None;
    }
    // 整体变量名优先，允许名字本身带点
    if let Some(value) = lookup(expr) {
        return Some(value);
    }

    let mut segments = expr.split('.');
    let mut current = lookup(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(mut map) => map.remove(segment)?,
            Value::Array(mut items) => {
                let index: usize = segment.parse().ok()?;
                if index >= items.len() {
                    return None;
                }
                items.swap_remove(index)
            }
            _ => return None,
        };
    }
    Some(current)
}
