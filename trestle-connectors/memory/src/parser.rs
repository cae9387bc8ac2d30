use std::fmt::{self, Display};

use trestle_connectors_base::common::{state, ObjectKind, SqlError};
use trestle_core::{
    data::DataValue,
    err::{Error, Result},
};

/// A schema-qualified object name, unqualified names resolve to the
/// schema of the current user
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct ObjectName {
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectName {
    pub fn resolve(&self, default_schema: &str) -> (String, String) {
        (
            self.schema
                .clone()
                .unwrap_or_else(|| default_schema.to_string()),
            self.name.clone(),
        )
    }
}

impl Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub(crate) enum Privilege {
    Select,
    Insert,
    Delete,
}

/// The statements understood by the memory engine
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Statement {
    CreateSchema(String),
    CreateTable {
        name: ObjectName,
        columns: Vec<String>,
    },
    CreateView {
        name: ObjectName,
        source: ObjectName,
    },
    Drop {
        kind: ObjectKind,
        name: ObjectName,
    },
    Insert {
        table: ObjectName,
        rows: Vec<Vec<DataValue>>,
    },
    Delete {
        table: ObjectName,
    },
    Select {
        source: ObjectName,
        count: bool,
    },
    Values(Vec<DataValue>),
    Grant {
        privileges: Vec<Privilege>,
        object: ObjectName,
        grantees: Vec<String>,
        revoke: bool,
    },
}

fn syntax_error(sql: &str, msg: impl Display) -> Error {
    Error::new(SqlError::new(
        state::SYNTAX_ERROR,
        format!("Syntax error: {} in \"{}\"", msg, sql),
    ))
}

/// Parses a single statement
pub(crate) fn parse(sql: &str) -> Result<Statement> {
    let sql = sql.trim().trim_end_matches(';').trim();
    let mut cur = Cursor::new(sql);

    let stmt = if cur.keyword("CREATE") {
        if cur.keyword("SCHEMA") {
            Statement::CreateSchema(cur.ident()?)
        } else if cur.keyword("TABLE") {
            let name = cur.object_name()?;
            let body = cur.parenthesized()?;
            let columns = split_top_level(body)
                .into_iter()
                .map(|col| {
                    col.split_whitespace()
                        .next()
                        .map(normalise_ident)
                        .ok_or_else(|| syntax_error(sql, "empty column definition"))
                })
                .collect::<Result<Vec<_>>>()?;
            Statement::CreateTable { name, columns }
        } else if cur.keyword("VIEW") {
            let name = cur.object_name()?;
            cur.expect("AS")?;
            cur.expect("SELECT")?;
            cur.expect_symbol('*')?;
            cur.expect("FROM")?;
            Statement::CreateView {
                name,
                source: cur.object_name()?,
            }
        } else {
            return Err(syntax_error(sql, "unsupported CREATE"));
        }
    } else if cur.keyword("DROP") {
        let kind = if cur.keyword("TABLE") {
            ObjectKind::Table
        } else if cur.keyword("VIEW") {
            ObjectKind::View
        } else if cur.keyword("SCHEMA") {
            ObjectKind::Schema
        } else {
            return Err(syntax_error(sql, "unsupported DROP"));
        };
        let name = cur.object_name()?;
        if kind == ObjectKind::Schema {
            cur.expect("RESTRICT")?;
        }
        Statement::Drop { kind, name }
    } else if cur.keyword("INSERT") {
        cur.expect("INTO")?;
        let table = cur.object_name()?;
        cur.expect("VALUES")?;
        let mut rows = vec![];
        loop {
            let body = cur.parenthesized()?;
            rows.push(
                split_top_level(body)
                    .into_iter()
                    .map(|v| parse_literal(sql, v))
                    .collect::<Result<Vec<_>>>()?,
            );
            if !cur.symbol(',') {
                break;
            }
        }
        Statement::Insert { table, rows }
    } else if cur.keyword("DELETE") {
        cur.expect("FROM")?;
        Statement::Delete {
            table: cur.object_name()?,
        }
    } else if cur.keyword("SELECT") {
        let count = if cur.symbol('*') {
            false
        } else if cur.keyword("COUNT") {
            let inner = cur.parenthesized()?;
            if inner.trim() != "*" {
                return Err(syntax_error(sql, "only COUNT(*) is supported"));
            }
            true
        } else {
            return Err(syntax_error(sql, "only SELECT * and SELECT COUNT(*) are supported"));
        };
        cur.expect("FROM")?;
        Statement::Select {
            source: cur.object_name()?,
            count,
        }
    } else if cur.keyword("VALUES") {
        let rest = cur.rest();
        let rest = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest);
        Statement::Values(
            split_top_level(rest)
                .into_iter()
                .map(|v| parse_literal(sql, v))
                .collect::<Result<Vec<_>>>()?,
        )
    } else if cur.keyword("GRANT") || cur.keyword("REVOKE") {
        let revoke = sql[..6].eq_ignore_ascii_case("REVOKE");
        let privileges = if cur.keyword("ALL") {
            cur.expect("PRIVILEGES")?;
            vec![Privilege::Select, Privilege::Insert, Privilege::Delete]
        } else {
            let mut privileges = vec![];
            loop {
                privileges.push(if cur.keyword("SELECT") {
                    Privilege::Select
                } else if cur.keyword("INSERT") {
                    Privilege::Insert
                } else if cur.keyword("DELETE") {
                    Privilege::Delete
                } else {
                    return Err(syntax_error(sql, "unsupported privilege"));
                });
                if !cur.symbol(',') {
                    break;
                }
            }
            privileges
        };
        cur.expect("ON")?;
        let object = cur.object_name()?;
        if !(cur.keyword("TO") || cur.keyword("FROM")) {
            return Err(syntax_error(sql, "expected TO or FROM"));
        }
        let grantees = split_top_level(cur.rest())
            .into_iter()
            .map(normalise_ident)
            .collect();
        return Ok(Statement::Grant {
            privileges,
            object,
            grantees,
            revoke,
        });
    } else {
        return Err(syntax_error(sql, "unsupported statement"));
    };

    if !cur.rest().is_empty() {
        return Err(syntax_error(sql, format!("unexpected \"{}\"", cur.rest())));
    }

    Ok(stmt)
}

/// Identifiers are upper cased unless quoted
pub(crate) fn normalise_ident(ident: &str) -> String {
    let ident = ident.trim();
    match ident.strip_prefix('"').and_then(|i| i.strip_suffix('"')) {
        Some(quoted) => quoted.to_string(),
        None => ident.to_uppercase(),
    }
}

fn parse_literal(sql: &str, lit: &str) -> Result<DataValue> {
    let lit = lit.trim();

    if let Some(inner) = lit.strip_prefix('\'').and_then(|l| l.strip_suffix('\'')) {
        return Ok(DataValue::Utf8String(inner.replace("''", "'")));
    }

    if lit.eq_ignore_ascii_case("NULL") {
        return Ok(DataValue::Null);
    }
    if lit.eq_ignore_ascii_case("TRUE") {
        return Ok(DataValue::Boolean(true));
    }
    if lit.eq_ignore_ascii_case("FALSE") {
        return Ok(DataValue::Boolean(false));
    }
    if let Ok(i) = lit.parse::<i64>() {
        return Ok(DataValue::Int64(i));
    }
    if let Ok(f) = lit.parse::<f64>() {
        return Ok(DataValue::Float64(f));
    }

    Err(syntax_error(sql, format!("invalid literal {}", lit)))
}

/// Splits on commas which are not nested in parentheses or quotes
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0;
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            ',' if !quoted && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = s[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }

    parts
}

/// Walks a statement left to right
struct Cursor<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        self.sql[self.pos..].trim()
    }

    fn skip_ws(&mut self) {
        let rest = &self.sql[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consumes the keyword if it is next
    fn keyword(&mut self, kw: &str) -> bool {
        self.skip_ws();
        let rest = &self.sql[self.pos..];
        let word_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());

        if word_len == kw.len() && rest[..word_len].eq_ignore_ascii_case(kw) {
            self.pos += word_len;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kw: &str) -> Result<()> {
        if self.keyword(kw) {
            Ok(())
        } else {
            Err(syntax_error(self.sql, format!("expected {}", kw)))
        }
    }

    fn symbol(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.sql[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char) -> Result<()> {
        if self.symbol(c) {
            Ok(())
        } else {
            Err(syntax_error(self.sql, format!("expected '{}'", c)))
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_ws();
        let rest = &self.sql[self.pos..];

        let len = if let Some(quoted) = rest.strip_prefix('"') {
            quoted
                .find('"')
                .map(|end| end + 2)
                .ok_or_else(|| syntax_error(self.sql, "unterminated identifier"))?
        } else {
            rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len())
        };

        if len == 0 {
            return Err(syntax_error(self.sql, "expected identifier"));
        }

        self.pos += len;
        Ok(normalise_ident(&rest[..len]))
    }

    fn object_name(&mut self) -> Result<ObjectName> {
        let first = self.ident()?;

        if self.sql[self.pos..].starts_with('.') {
            self.pos += 1;
            Ok(ObjectName {
                schema: Some(first),
                name: self.ident()?,
            })
        } else {
            Ok(ObjectName {
                schema: None,
                name: first,
            })
        }
    }

    /// Consumes a balanced `( ... )` group and returns its contents
    fn parenthesized(&mut self) -> Result<&'a str> {
        self.expect_symbol('(')?;
        let start = self.pos;
        let mut depth = 1;
        let mut quoted = false;

        for (i, c) in self.sql[start..].char_indices() {
            match c {
                '\'' => quoted = !quoted,
                '(' if !quoted => depth += 1,
                ')' if !quoted => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = start + i + 1;
                        return Ok(&self.sql[start..start + i]);
                    }
                }
                _ => {}
            }
        }

        Err(syntax_error(self.sql, "unbalanced parentheses"))
    }
}
