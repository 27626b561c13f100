//! Helpers callable from templates: arithmetic, case conversion, escaping,
//! container construction, jq queries and serialization.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Environment, Error, ErrorKind, Value};

use crate::cases::{self, CaseFolding};

type FnResult<T> = std::result::Result<T, Error>;

/// Registers every helper on `env`. Case conversions use `case`.
pub fn register(env: &mut Environment<'static>, case: CaseFolding) {
    env.add_function("add", add);
    env.add_function("sub", sub);
    env.add_function("mul", mul);
    env.add_function("div", div);
    env.add_function("rem", rem);

    env.add_function("join", join);

    register_string_helper(env, "uppercase", move |s: String| case.upper(&s));
    register_string_helper(env, "lowercase", move |s: String| case.lower(&s));
    register_string_helper(env, "titlecase", move |s: String| case.title(&s));
    register_string_helper(env, "pascalcase", move |s: String| case.pascal(&s));
    register_string_helper(env, "camelcase", move |s: String| case.camel(&s));
    register_string_helper(env, "snakecase", |s: String| cases::snake(&s));
    register_string_helper(env, "kebabcase", |s: String| cases::kebab(&s));
    register_string_helper(env, "constcase", move |s: String| case.constant(&s));
    register_string_helper(env, "dotcase", |s: String| cases::dot(&s));
    register_string_helper(env, "sentencecase", move |s: String| case.sentence(&s));

    env.add_function("escapebackslash", escape_backslash);
    env.add_filter("escapebackslash", escape_backslash);
    env.add_function("escapedouble", escape_double);
    env.add_filter("escapedouble", escape_double);
    env.add_function("escapehtml", escape_html);
    env.add_filter("escapehtml", escape_html);
    env.add_function("repl", repl);
    env.add_filter("repl", repl);

    env.add_function("ismap", |v: Value| v.kind() == ValueKind::Map);
    env.add_function("isstr", |v: Value| v.kind() == ValueKind::String);
    env.add_function("isint", |v: Value| v.is_integer());
    env.add_function("isarr", |v: Value| v.kind() == ValueKind::Seq);

    env.add_function("map", map);
    env.add_function("list", |items: Rest<Value>| Value::from(items.0));
    env.add_function("set", set);
    env.add_function("append", append);
    env.add_function("slice", slice);

    env.add_function("jq1", jq1);
    env.add_function("jqn", jqn);

    env.add_function("toml", to_toml);
    env.add_function("yaml", to_yaml);
    env.add_function("json", to_json);
    env.add_function("dump", dump);
    env.add_function("probe", probe);
    env.add_function("err", err);
}

fn register_string_helper<F>(env: &mut Environment<'static>, name: &'static str, f: F)
where
    F: Fn(String) -> String + Clone + Send + Sync + 'static,
{
    env.add_function(name, f.clone());
    env.add_filter(name, f);
}

fn invalid(detail: String) -> Error {
    Error::new(ErrorKind::InvalidOperation, detail)
}

fn overflow(name: &str) -> Error {
    invalid(format!("{name}: integer overflow"))
}

fn add(values: Rest<i64>) -> FnResult<i64> {
    values.iter().try_fold(0i64, |acc, &v| acc.checked_add(v).ok_or_else(|| overflow("add")))
}

fn mul(values: Rest<i64>) -> FnResult<i64> {
    values.iter().try_fold(1i64, |acc, &v| acc.checked_mul(v).ok_or_else(|| overflow("mul")))
}

/// Left fold over at least two operands.
fn fold_operands(
    name: &str,
    values: &[i64],
    op: impl Fn(i64, i64) -> FnResult<i64>,
) -> FnResult<i64> {
    match values {
        [first, rest @ ..] if !rest.is_empty() => {
            rest.iter().try_fold(*first, |acc, &v| op(acc, v))
        }
        _ => Err(Error::new(
            ErrorKind::MissingArgument,
            format!("{name}: at least 2 operands required, got {}", values.len()),
        )),
    }
}

fn sub(values: Rest<i64>) -> FnResult<i64> {
    fold_operands("sub", &values, |a, b| a.checked_sub(b).ok_or_else(|| overflow("sub")))
}

fn div(values: Rest<i64>) -> FnResult<i64> {
    fold_operands("div", &values, |a, b| {
        if b == 0 {
            return Err(invalid("div: division by zero".to_string()));
        }
        a.checked_div(b).ok_or_else(|| overflow("div"))
    })
}

fn rem(a: i64, b: i64) -> FnResult<i64> {
    if b == 0 {
        return Err(invalid("rem: division by zero".to_string()));
    }
    a.checked_rem(b).ok_or_else(|| overflow("rem"))
}

fn join(items: Value, sep: Option<String>) -> FnResult<String> {
    let parts: Vec<String> = items.try_iter()?.map(|item| item.to_string()).collect();
    Ok(parts.join(sep.as_deref().unwrap_or("")))
}

fn escape_backslash(s: String, chars: String) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if chars.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn escape_double(s: String, chars: String) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if chars.contains(c) {
            escaped.push(c);
        }
        escaped.push(c);
    }
    escaped
}

fn escape_html(s: String) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn repl(s: String, from: String, to: String) -> String {
    s.replace(&from, &to)
}

fn map(args: Rest<Value>) -> FnResult<Value> {
    if args.len() % 2 != 0 {
        return Err(invalid(format!(
            "map: tried to construct a map with an odd number of arguments ({})",
            args.len()
        )));
    }

    let mut entries = Vec::with_capacity(args.len() / 2);
    for chunk in args.chunks(2) {
        let key = chunk[0]
            .as_str()
            .ok_or_else(|| invalid(format!("map: key {} is not a string", chunk[0])))?;
        entries.push((key.to_string(), chunk[1].clone()));
    }
    Ok(Value::from_iter(entries))
}

fn set(map: Value, key: String, value: Value) -> FnResult<Value> {
    if map.kind() != ValueKind::Map {
        return Err(invalid(format!("set: expected a map, got {}", map.kind())));
    }

    let mut entries = Vec::new();
    let mut replaced = false;
    for k in map.try_iter()? {
        if k.as_str() == Some(key.as_str()) {
            entries.push((k, value.clone()));
            replaced = true;
        } else {
            let v = map.get_item(&k)?;
            entries.push((k, v));
        }
    }
    if !replaced {
        entries.push((Value::from(key), value));
    }
    Ok(Value::from_iter(entries))
}

fn append(list: Value, items: Rest<Value>) -> FnResult<Value> {
    if list.kind() != ValueKind::Seq {
        return Err(invalid(format!("append: expected a list, got {}", list.kind())));
    }
    let appended: Vec<Value> = list.try_iter()?.chain(items.0).collect();
    Ok(Value::from(appended))
}

fn slice(seq: Value, start: usize, end: Option<usize>) -> FnResult<Value> {
    let check = |len: usize| -> FnResult<(usize, usize)> {
        let end = end.unwrap_or(len);
        if start > end || end > len {
            return Err(invalid(format!("slice: bounds [{start}:{end}] out of range for length {len}")));
        }
        Ok((start, end))
    };

    if let Some(s) = seq.as_str() {
        let chars: Vec<char> = s.chars().collect();
        let (start, end) = check(chars.len())?;
        return Ok(Value::from(chars[start..end].iter().collect::<String>()));
    }

    if seq.kind() == ValueKind::Seq {
        let items: Vec<Value> = seq.try_iter()?.collect();
        let (start, end) = check(items.len())?;
        return Ok(Value::from(items[start..end].to_vec()));
    }

    Err(invalid(format!("slice: expected a string or a list, got {}", seq.kind())))
}

fn to_json_value(value: &Value) -> FnResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, "value is not serializable").with_source(e))
}

/// Runs a jq program against `value` and collects its results.
fn run_jq(query: &str, value: &Value, first_only: bool) -> FnResult<Vec<Value>> {
    use jaq_core::load::{Arena, File, Loader};
    use jaq_core::{Compiler, Ctx, RcIter};
    use jaq_json::Val;

    let input = Val::from(to_json_value(value)?);

    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = Arena::default();
    let modules = loader
        .load(&arena, File { code: query, path: () })
        .map_err(|_| invalid(format!("invalid jq query: {query}")))?;
    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|_| invalid(format!("invalid jq query: {query}")))?;

    let inputs = RcIter::new(core::iter::empty());
    let mut results = Vec::new();
    for output in filter.run((Ctx::new([], &inputs), input)) {
        let output = output.map_err(|e| invalid(format!("jq: {e}")))?;
        results.push(Value::from_serialize(serde_json::Value::from(output)));
        if first_only {
            break;
        }
    }
    Ok(results)
}

fn jq1(query: String, value: Value) -> FnResult<Value> {
    Ok(run_jq(&query, &value, true)?.into_iter().next().unwrap_or(Value::from(())))
}

fn jqn(query: String, value: Value) -> FnResult<Value> {
    Ok(Value::from(run_jq(&query, &value, false)?))
}

fn serialization_error(format: &str, e: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::new(ErrorKind::BadSerialization, format!("cannot serialize value as {format}"))
        .with_source(e)
}

fn to_toml(value: Value) -> FnResult<String> {
    let encoded = toml::to_string(&value).map_err(|e| serialization_error("TOML", e))?;
    Ok(encoded.trim().to_string())
}

fn to_yaml(value: Value) -> FnResult<String> {
    let encoded = serde_yaml::to_string(&value).map_err(|e| serialization_error("YAML", e))?;
    Ok(encoded.trim().to_string())
}

fn to_json(value: Value) -> FnResult<String> {
    let encoded = serde_json::to_string(&value).map_err(|e| serialization_error("JSON", e))?;
    Ok(encoded.trim().to_string())
}

fn dump(value: Value) -> FnResult<String> {
    serde_json::to_string_pretty(&value).map_err(|e| serialization_error("JSON", e))
}

fn probe(value: Value) -> FnResult<Value> {
    eprintln!("{}", dump(value.clone())?);
    Ok(value)
}

fn err(message: String) -> FnResult<Value> {
    Err(invalid(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_formatter(crate::renderer::format_value);
        register(&mut env, CaseFolding::default());
        env
    }

    fn eval(source: &str) -> Result<String, Error> {
        env().render_str(source, ())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("{{ add(1, 2, 3) }}").unwrap(), "6");
        assert_eq!(eval("{{ add() }}").unwrap(), "0");
        assert_eq!(eval("{{ sub(10, 3, 2) }}").unwrap(), "5");
        assert_eq!(eval("{{ mul() }}").unwrap(), "1");
        assert_eq!(eval("{{ div(20, 2, 5) }}").unwrap(), "2");
        assert_eq!(eval("{{ rem(7, 3) }}").unwrap(), "1");
    }

    #[test]
    fn test_arithmetic_errors() {
        assert!(eval("{{ sub(1) }}").is_err());
        assert!(eval("{{ div(1, 0) }}").is_err());
        assert!(eval("{{ rem(1, 0) }}").is_err());
        assert!(eval("{{ rem(1, 2, 3) }}").is_err());
        assert!(eval("{{ add(9223372036854775807, 1) }}").is_err());
    }

    #[test]
    fn test_escapes() {
        assert_eq!(escape_backslash("a\"b".to_string(), "\"".to_string()), "a\\\"b");
        assert_eq!(escape_double("it's".to_string(), "'".to_string()), "it''s");
        assert_eq!(escape_html("<a & 'b'>".to_string()), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            eval("{% set m = set(map('a', 1), 'b', 2) %}{{ m.a }}{{ m.b }}{{ ismap(m) }}").unwrap(),
            "12true"
        );
        assert_eq!(eval("{{ append(list(1, 2), 3) | join(',') }}").unwrap(), "1,2,3");
        assert_eq!(eval("{{ slice('hello', 1, 3) }}").unwrap(), "el");
        assert!(eval("{{ slice(list(1), 0, 5) }}").is_err());
        assert!(eval("{{ map('a') }}").is_err());
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(eval("{{ 'hello big world' | snakecase }}").unwrap(), "hello_big_world");
        assert_eq!(eval("{{ constcase('hello world') }}").unwrap(), "HELLO_WORLD");
    }

    #[test]
    fn test_jq() {
        assert_eq!(eval("{{ jq1('.a', map('a', 5)) }}").unwrap(), "5");
        assert_eq!(eval("{{ jqn('.[]', list(1, 2)) | join('-') }}").unwrap(), "1-2");
        assert!(eval("{{ jq1('.[', list()) }}").is_err());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(eval("{{ json(map('a', 1)) }}").unwrap(), r#"{"a":1}"#);
        assert_eq!(eval("{{ toml(map('a', 1)) }}").unwrap(), "a = 1");
        assert_eq!(eval("{{ yaml(map('a', 1)) }}").unwrap(), "a: 1");
    }

    #[test]
    fn test_err_fails_with_message() {
        let err = eval("{{ err('boom') }}").unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
