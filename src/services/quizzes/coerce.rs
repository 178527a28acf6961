//! 宽松类型转换
//!
//! 客户端提交的题目与答案类型不可靠，这里把任意 JSON 值转换为字符串、下标或数字。

use serde_json::Value;

/// 与 JavaScript `String(value)` 一致的字符串化
pub fn loose_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => loose_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// 宽松解析数字：数字、数字字符串、布尔值
pub fn loose_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// 解析选项下标，超出 `[0, len)` 时返回 None
pub fn option_index(value: &Value, len: usize) -> Option<usize> {
    let number = match value {
        Value::Number(_) | Value::String(_) => loose_number(value)?,
        _ => return None,
    };
    if number < 0.0 || number.fract() != 0.0 {
        return None;
    }
    let index = number as usize;
    (index < len).then_some(index)
}

/// 宽松布尔：true、"true"、非零数字
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_like_javascript() {
        assert_eq!(loose_string(&json!(1)), "1");
        assert_eq!(loose_string(&json!(1.0)), "1");
        assert_eq!(loose_string(&json!(2.5)), "2.5");
        assert_eq!(loose_string(&json!(null)), "null");
        assert_eq!(loose_string(&json!(true)), "true");
        assert_eq!(loose_string(&json!([0, 2])), "0,2");
        assert_eq!(loose_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(loose_string(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn parses_indices_within_bounds() {
        assert_eq!(option_index(&json!(1), 2), Some(1));
        assert_eq!(option_index(&json!("1"), 2), Some(1));
        assert_eq!(option_index(&json!(" 0 "), 2), Some(0));
        assert_eq!(option_index(&json!(2), 2), None);
        assert_eq!(option_index(&json!(-1), 2), None);
        assert_eq!(option_index(&json!(0.5), 2), None);
        assert_eq!(option_index(&json!("x"), 2), None);
        assert_eq!(option_index(&json!(true), 2), None);
    }

    #[test]
    fn numbers_and_truthiness() {
        assert_eq!(loose_number(&json!("85")), Some(85.0));
        assert_eq!(loose_number(&json!("abc")), None);
        assert_eq!(loose_number(&json!(null)), None);
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("true"))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!("no"))));
        assert!(!truthy(None));
    }
}
