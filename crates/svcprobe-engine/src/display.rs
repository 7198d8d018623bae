//! Human-readable rendering of values
//!
//! [`dump`] renders a method's return value; [`display_arguments`] renders
//! the argument list shown in a call signature.

use std::fmt::Write;

use svcprobe_sdk::Value;

const STEP: usize = 4;

/// Recursive dump of a returned value.
///
/// Scalars print as plain text and a null or empty result prints `null`.
/// Lists and maps print one `[key] => value` line per entry inside an
/// indented, parenthesised block:
///
/// ```text
/// Map
/// (
///     [id] => 7
///     [tags] => List
///         (
///             [0] => admin
///         )
///
/// )
/// ```
pub fn dump(value: &Value) -> String {
    match value.scalar_text() {
        Some(text) if text.is_empty() => "null".to_string(),
        Some(text) => text,
        None => {
            let mut out = String::new();
            write_value(&mut out, value, 0);
            out.truncate(out.trim_end().len());
            out
        }
    }
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    let entries: Vec<(String, &Value)> = match value {
        Value::List(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        Value::Map(pairs) => pairs.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Null => {
            out.push_str("null");
            return;
        }
        scalar => {
            out.push_str(&scalar.scalar_text().unwrap_or_default());
            return;
        }
    };

    let pad = " ".repeat(indent);
    let entry_pad = " ".repeat(indent + STEP);
    let _ = writeln!(out, "{}", header(value));
    let _ = writeln!(out, "{pad}(");
    for (key, item) in entries {
        let _ = write!(out, "{entry_pad}[{key}] => ");
        write_value(out, item, indent + 2 * STEP);
        out.push('\n');
    }
    let _ = writeln!(out, "{pad})");
}

fn header(value: &Value) -> &'static str {
    match value {
        Value::Map(_) => "Map",
        _ => "List",
    }
}

/// Argument list as shown inside a call signature, e.g. `42, 'bob', [1, 2], null`
pub fn display_arguments(args: &[Value]) -> String {
    args.iter().map(display_argument).collect::<Vec<_>>().join(", ")
}

fn display_argument(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => (f.trunc() as i64).to_string(),
        Value::Str(s) if s.chars().all(|c| c.is_ascii_digit() || c == '.') => integer_part(s),
        Value::Str(s) => format!("'{s}'"),
        Value::List(items) => format!("[{}]", display_arguments(items)),
        Value::Map(pairs) => {
            let shown: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{k} => {}", display_argument(v)))
                .collect();
            format!("[{}]", shown.join(", "))
        }
    }
}

// "0012.50" -> "12", "" -> "0"
fn integer_part(numeric: &str) -> String {
    let digits: &str = numeric.split('.').next().unwrap_or_default();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_scalars() {
        assert_eq!(dump(&Value::Null), "null");
        assert_eq!(dump(&Value::from("")), "null");
        assert_eq!(dump(&Value::from("hello")), "hello");
        assert_eq!(dump(&Value::Int(0)), "0");
        assert_eq!(dump(&Value::Bool(false)), "false");
        assert_eq!(dump(&Value::Float(1.5)), "1.5");
    }

    #[test]
    fn test_dump_list() {
        let value = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(dump(&value), "List\n(\n    [0] => 1\n    [1] => a\n)");
    }

    #[test]
    fn test_dump_nested() {
        let value = Value::map([
            ("id", Value::Int(7)),
            ("tags", Value::List(vec![Value::from("admin")])),
            ("email", Value::Null),
        ]);
        let expected = "Map\n\
                        (\n    \
                        [id] => 7\n    \
                        [tags] => List\n        \
                        (\n            \
                        [0] => admin\n        \
                        )\n\n    \
                        [email] => null\n\
                        )";
        assert_eq!(dump(&value), expected);
    }

    #[test]
    fn test_dump_empty_list() {
        assert_eq!(dump(&Value::List(vec![])), "List\n(\n)");
    }

    #[test]
    fn test_display_arguments() {
        let args = vec![
            Value::from("42"),
            Value::from("bob"),
            Value::List(vec![Value::from("1"), Value::from("x")]),
            Value::Null,
            Value::Bool(true),
            Value::from("3.75"),
            Value::Float(2.9),
        ];
        assert_eq!(display_arguments(&args), "42, 'bob', [1, 'x'], null, true, 3, 2");
    }

    #[test]
    fn test_display_arguments_edge_cases() {
        assert_eq!(display_arguments(&[]), "");
        assert_eq!(display_arguments(&[Value::from("")]), "0");
        assert_eq!(display_arguments(&[Value::from("007")]), "7");
        assert_eq!(
            display_arguments(&[Value::map([("k", Value::Int(1))])]),
            "[k => 1]"
        );
    }
}
