//! Structured WHERE/HAVING conditions and their compiler.
//!
//! A [`ConditionList`] is an ordered list of [`Condition`]s. The first entry
//! never carries a conjunction; every later entry is joined to its
//! predecessor with the AND/OR it was added with. Rendering walks the list in
//! order and registers each bound value in the running [`Parameters`] at the
//! moment its placeholder is generated.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ident::Column;
use crate::inflector::{self, Inflector};
use crate::params::Parameters;
use crate::statement::{SelectQuery, Statement};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// How an entry is joined to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// Comparison operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    /// `<>`
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    Is,
    IsNot,
    Between,
    NotBetween,
    In,
    NotIn,
}

impl Op {
    pub const ALL: [Op; 15] = [
        Op::Eq,
        Op::Ne,
        Op::NotEq,
        Op::Lt,
        Op::Lte,
        Op::Gt,
        Op::Gte,
        Op::Like,
        Op::NotLike,
        Op::Is,
        Op::IsNot,
        Op::Between,
        Op::NotBetween,
        Op::In,
        Op::NotIn,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::NotEq => "<>",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Is => "IS",
            Op::IsNot => "IS NOT",
            Op::Between => "BETWEEN",
            Op::NotBetween => "NOT BETWEEN",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.as_sql().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| Error::unknown_method(s, Op::ALL.iter().map(|op| op.as_sql())))
    }
}

/// The right-hand side of a simple comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(Value),
    Pair(Value, Value),
    List(Vec<Value>),
    /// Renders the literal `NULL` without a placeholder.
    Null,
}

/// One condition payload.
#[derive(Debug, Clone)]
pub enum Predicate {
    Simple {
        column: Column,
        op: Op,
        operand: Operand,
    },
    /// Verbatim SQL; `bindings` are registered as given.
    Raw { sql: String, bindings: Parameters },
    /// Correlated `EXISTS` on `table`.
    ///
    /// `column` defaults to the singular current table + `_id`,
    /// `parent_column` to `id`.
    Exists {
        table: String,
        column: Option<String>,
        parent_column: Option<String>,
        exists: bool,
    },
    /// `EXISTS` over an arbitrary select.
    ExistsQuery { query: Box<SelectQuery>, exists: bool },
    Group(ConditionList),
}

/// A predicate and the conjunction joining it to its predecessor.
#[derive(Debug, Clone)]
pub struct Condition {
    pub operator: Option<Conjunction>,
    pub predicate: Predicate,
}

impl Condition {
    pub fn is_grouped(&self) -> bool {
        matches!(self.predicate, Predicate::Group(_))
    }
}

/// Which clause a list is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Where,
    Having,
}

/// Running state shared by every fragment of one statement compilation.
pub struct RenderContext<'a> {
    pub dialect: Dialect,
    pub inflector: &'a dyn Inflector,
    /// Current table, used as the placeholder prefix and EXISTS parent.
    pub table: &'a str,
    pub params: &'a mut Parameters,
}

impl RenderContext<'_> {
    /// Generate a placeholder for `column` and register `value`.
    pub fn bind(&mut self, column: &str, value: Value) -> String {
        self.params.bind(self.table, column, value)
    }
}

/// An ordered list of conditions.
#[derive(Debug, Clone, Default)]
pub struct ConditionList {
    entries: Vec<Condition>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a predicate. The first entry's conjunction is always dropped.
    pub fn push(&mut self, conjunction: Conjunction, predicate: Predicate) {
        if let Predicate::Group(ref group) = predicate
            && group.is_empty()
        {
            return;
        }
        let operator = if self.entries.is_empty() {
            None
        } else {
            Some(conjunction)
        };
        self.entries.push(Condition {
            operator,
            predicate,
        });
    }

    pub fn entries(&self) -> &[Condition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Compile the list into SQL text (without the WHERE/HAVING keyword).
    pub fn render(&self, kind: ClauseKind, cx: &mut RenderContext<'_>) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let body = render_predicate(&entry.predicate, kind, cx);
            if body.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
                if let Some(op) = entry.operator {
                    out.push_str(op.as_sql());
                    out.push(' ');
                }
            }
            out.push_str(&body);
        }
        out
    }
}

fn format_column(column: &Column, kind: ClauseKind, dialect: Dialect) -> String {
    match (kind, column) {
        (ClauseKind::Having, Column::Name(name)) => dialect.quote_ident(name),
        _ => dialect.quote_column(column),
    }
}

fn render_predicate(predicate: &Predicate, kind: ClauseKind, cx: &mut RenderContext<'_>) -> String {
    match predicate {
        Predicate::Group(list) => {
            let nested = list.render(kind, cx);
            if nested.is_empty() {
                nested
            } else {
                format!("({nested})")
            }
        }
        Predicate::Raw { sql, bindings } => {
            cx.params.merge(bindings);
            sql.clone()
        }
        Predicate::Exists {
            table,
            column,
            parent_column,
            exists,
        } => {
            let column = column
                .clone()
                .unwrap_or_else(|| inflector::foreign_key(cx.inflector, cx.table));
            let parent_column = parent_column.as_deref().unwrap_or("id");
            let d = cx.dialect;
            let subquery = format!(
                "SELECT {} FROM {} WHERE {}.{} = {}.{}",
                d.quote(&column),
                d.quote(table),
                d.quote(table),
                d.quote(&column),
                d.quote(cx.table),
                d.quote(parent_column),
            );
            format!("{} ({subquery})", exists_keyword(*exists))
        }
        Predicate::ExistsQuery { query, exists } => {
            let subquery = query.compile_into(cx.params);
            if subquery.is_empty() {
                return subquery;
            }
            format!("{} ({subquery})", exists_keyword(*exists))
        }
        Predicate::Simple {
            column,
            op,
            operand,
        } => render_simple(column, *op, operand, kind, cx),
    }
}

fn exists_keyword(exists: bool) -> &'static str {
    if exists { "EXISTS" } else { "NOT EXISTS" }
}

fn render_simple(
    column: &Column,
    op: Op,
    operand: &Operand,
    kind: ClauseKind,
    cx: &mut RenderContext<'_>,
) -> String {
    let col = format_column(column, kind, cx.dialect);
    let raw = column.as_str();

    match operand {
        Operand::Pair(low, high) => {
            let a = cx.bind(raw, low.clone());
            let b = cx.bind(raw, high.clone());
            format!("{col} {op} {a} AND {b}")
        }
        Operand::List(values) => {
            if values.is_empty() {
                // IN () is not valid SQL
                return if op == Op::NotIn { "1 = 1" } else { "1 = 0" }.to_string();
            }
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| cx.bind(raw, v.clone()))
                .collect();
            format!("{col} {op} ({})", placeholders.join(", "))
        }
        Operand::Null => format!("{col} {op} NULL"),
        Operand::Single(value) => {
            let p = cx.bind(raw, value.clone());
            format!("{col} {op} {p}")
        }
    }
}
