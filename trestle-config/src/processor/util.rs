use std::{iter::Peekable, str::Chars};

use trestle_core::err::{bail, Context, Result};
use serde_yaml::{Mapping, Value};

use super::{ConfigExprResult, ConfigStringExpr as X};

/// Recursively walks the configuration nodes and uses the supplied callback
/// to transform any strings found
pub(crate) fn process_strings(node: Value, cb: &impl Fn(String) -> Result<Value>) -> Result<Value> {
    Ok(match node {
        Value::String(str) => {
            cb(str.clone()).with_context(|| format!("Failed to process config string {}", str))?
        }
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(|n| process_strings(n, cb))
                .collect::<Result<Vec<Value>>>()?,
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| -> Result<(Value, Value)> {
                    Ok((process_strings(k, cb)?, process_strings(v, cb)?))
                })
                .collect::<Result<Mapping>>()?,
        ),
        n => n,
    })
}

/// Resolves nested interpolations bottom-up, handing each interpolation
/// node to `cb` once its own parts have been resolved
pub(crate) fn process_expression(
    exp: X,
    cb: &impl Fn(X) -> Result<ConfigExprResult>,
) -> Result<ConfigExprResult> {
    Ok(match exp {
        X::Constant(_) => ConfigExprResult::Expr(exp),
        X::Concat(parts) => ConfigExprResult::Expr(X::Concat(process_parts(parts, cb)?)),
        X::Interpolation(parts) => cb(X::Interpolation(process_parts(parts, cb)?))?,
    })
}

fn process_parts(parts: Vec<X>, cb: &impl Fn(X) -> Result<ConfigExprResult>) -> Result<Vec<X>> {
    parts
        .into_iter()
        .map(|p| process_expression(p, cb).and_then(into_expr))
        .collect()
}

/// Yaml nested inside a larger string is embedded as text
fn into_expr(res: ConfigExprResult) -> Result<X> {
    Ok(match res {
        ConfigExprResult::Expr(exp) => exp,
        ConfigExprResult::Yaml(Value::String(s)) => X::Constant(s),
        ConfigExprResult::Yaml(node) => X::Constant(
            serde_yaml::to_string(&node)?
                .trim_end_matches('\n')
                .to_string(),
        ),
    })
}

/// Converts a (partially) resolved expression back into a string
pub(crate) fn expression_to_string(exp: X) -> String {
    match exp {
        X::Constant(s) => s,
        X::Concat(parts) => parts.into_iter().map(expression_to_string).collect(),
        X::Interpolation(parts) => format!(
            "${{{}}}",
            parts
                .into_iter()
                .map(expression_to_string)
                .collect::<Vec<_>>()
                .join(":")
        ),
    }
}

/// Returns the remaining parts of an interpolation if its leading parts
/// are the constants in `prefix`
pub(crate) fn match_interpolation(exp: &X, prefix: &[&str]) -> Option<Vec<String>> {
    let parts = match exp {
        X::Interpolation(parts) => parts,
        _ => return None,
    };

    let strings = parts
        .iter()
        .map(|p| match p {
            X::Constant(s) => Some(s.clone()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    if strings.len() < prefix.len() || strings.iter().zip(prefix).any(|(a, b)| a != b) {
        return None;
    }

    Some(strings[prefix.len()..].to_vec())
}

/// Parse strings into an expression AST
pub(crate) fn parse_expression(str: &str) -> Result<X> {
    let mut chars = str.chars().peekable();
    let (nodes, _) = parse_part(&mut chars, str, false)?;

    Ok(simplify(nodes))
}

/// Parses until the end of input or, inside an interpolation, until an
/// unescaped ':' or '}' which is returned as the terminator
fn parse_part(
    chars: &mut Peekable<Chars>,
    src: &str,
    in_interpolation: bool,
) -> Result<(Vec<X>, Option<char>)> {
    let mut nodes = vec![];

    loop {
        match chars.next() {
            None if in_interpolation => {
                bail!("Failed to parse expression \"{}\", found unclosed ${{...}}", src)
            }
            None => return Ok((nodes, None)),
            Some('\\') => {
                if let Some(c) = chars.next() {
                    push_char(&mut nodes, c);
                }
            }
            Some('$') if chars.peek() == Some(&'{') => {
                chars.next();
                nodes.push(parse_interpolation(chars, src)?);
            }
            Some(c @ (':' | '}')) if in_interpolation => return Ok((nodes, Some(c))),
            Some('}') => bail!(
                "Failed to parse ${{...}} expression, could not match closing bracket in string \"{}\"",
                src
            ),
            Some(c) => push_char(&mut nodes, c),
        }
    }
}

fn parse_interpolation(chars: &mut Peekable<Chars>, src: &str) -> Result<X> {
    let mut parts = vec![];

    if chars.peek() == Some(&'}') {
        chars.next();
        return Ok(X::Interpolation(parts));
    }

    loop {
        let (nodes, term) = parse_part(chars, src, true)?;
        parts.push(simplify(nodes));

        if term == Some('}') {
            return Ok(X::Interpolation(parts));
        }
    }
}

fn push_char(nodes: &mut Vec<X>, c: char) {
    if let Some(X::Constant(s)) = nodes.last_mut() {
        s.push(c);
    } else {
        nodes.push(X::Constant(c.to_string()));
    }
}

fn simplify(mut nodes: Vec<X>) -> X {
    match nodes.len() {
        0 => X::Constant(String::new()),
        1 => nodes.remove(0),
        _ => X::Concat(nodes),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_expression_constants() {
        assert_eq!(parse_expression("").unwrap(), X::Constant("".to_string()));
        assert_eq!(
            parse_expression("abc").unwrap(),
            X::Constant("abc".to_string())
        );
        assert_eq!(
            parse_expression("abc:123").unwrap(),
            X::Constant("abc:123".to_string())
        );
    }

    #[test]
    fn test_parse_expression_escaping() {
        assert_eq!(
            parse_expression("test\\escaped").unwrap(),
            X::Constant("testescaped".to_string())
        );
        assert_eq!(
            parse_expression("escaped\\").unwrap(),
            X::Constant("escaped".to_string())
        );
        assert_eq!(
            parse_expression("\\\\").unwrap(),
            X::Constant("\\".to_string())
        );
        assert_eq!(
            parse_expression("\\${env:A}").unwrap(),
            X::Constant("${env:A}".to_string())
        );
    }

    #[test]
    fn test_parse_expression_interpolation() {
        assert_eq!(parse_expression("${}").unwrap(), X::Interpolation(vec![]));
        assert_eq!(
            parse_expression("${abc:def:ghi}").unwrap(),
            X::Interpolation(vec![
                X::Constant("abc".to_owned()),
                X::Constant("def".to_owned()),
                X::Constant("ghi".to_owned())
            ])
        );
        assert_eq!(
            parse_expression("${FOO::BAR}").unwrap(),
            X::Interpolation(vec![
                X::Constant("FOO".to_owned()),
                X::Constant("".to_owned()),
                X::Constant("BAR".to_owned()),
            ])
        );
    }

    #[test]
    fn test_parse_expression_interpolation_nested() {
        assert_eq!(
            parse_expression("${${}}").unwrap(),
            X::Interpolation(vec![X::Interpolation(vec![])])
        );
        assert_eq!(
            parse_expression("${abc:${def}:ghi}").unwrap(),
            X::Interpolation(vec![
                X::Constant("abc".to_owned()),
                X::Interpolation(vec![X::Constant("def".to_owned())]),
                X::Constant("ghi".to_owned())
            ])
        );
    }

    #[test]
    fn test_parse_expression_interpolation_concat() {
        assert_eq!(
            parse_expression("a${b}c${d}").unwrap(),
            X::Concat(vec![
                X::Constant("a".to_owned()),
                X::Interpolation(vec![X::Constant("b".to_owned())]),
                X::Constant("c".to_owned()),
                X::Interpolation(vec![X::Constant("d".to_owned())])
            ])
        );
    }

    #[test]
    fn test_parse_expression_unbalanced() {
        assert!(parse_expression("${abc").is_err());
        assert!(parse_expression("abc}").is_err());
    }

    #[test]
    fn test_expression_to_string_keeps_unresolved() {
        let exp = parse_expression("pre-${unknown:x}").unwrap();

        assert_eq!(expression_to_string(exp), "pre-${unknown:x}");
    }

    #[test]
    fn test_match_interpolation() {
        let exp = parse_expression("${env:A:b}").unwrap();

        assert_eq!(
            match_interpolation(&exp, &["env"]),
            Some(vec!["A".to_string(), "b".to_string()])
        );
        assert_eq!(match_interpolation(&exp, &["dir"]), None);
        assert_eq!(
            match_interpolation(&X::Constant("env".into()), &["env"]),
            None
        );
    }
}
