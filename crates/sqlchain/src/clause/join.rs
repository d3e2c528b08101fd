use super::Fragment;
use crate::condition::{Op, RenderContext};
use crate::ident::Column;
use crate::inflector;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// An explicit join predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOn {
    pub local: Column,
    pub op: Op,
    pub foreign: Column,
}

/// One joined table.
///
/// Without an explicit `on`, non-cross joins use the naming convention
/// `<current>.id = <joined>.<singular(current)>_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEntry {
    pub kind: JoinKind,
    pub table: String,
    pub alias: Option<String>,
    pub on: Option<JoinOn>,
}

/// Joined tables in insertion order.
#[derive(Debug, Clone, Default)]
pub struct JoinClause {
    entries: Vec<JoinEntry>,
    error: Option<String>,
}

impl JoinClause {
    pub fn push(&mut self, entry: JoinEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JoinEntry] {
        &self.entries
    }

    /// Patch the predicate of the most recently added join.
    pub fn set_last_on(&mut self, on: JoinOn) {
        match self.entries.last_mut() {
            Some(entry) if entry.kind == JoinKind::Cross => {
                self.error.get_or_insert_with(|| {
                    format!("CROSS JOIN {} does not take an ON predicate", entry.table)
                });
            }
            Some(entry) => entry.on = Some(on),
            None => {
                self.error
                    .get_or_insert_with(|| "on() called before any join".to_string());
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn render_entry(entry: &JoinEntry, cx: &RenderContext<'_>) -> String {
        let d = cx.dialect;
        let mut sql = format!("{} {}", entry.kind.as_sql(), d.quote(&entry.table));
        if let Some(alias) = &entry.alias {
            sql.push(' ');
            sql.push_str(&d.quote_ident(alias));
        }
        if entry.kind == JoinKind::Cross {
            return sql;
        }

        let (local, op, foreign) = match &entry.on {
            Some(on) => (d.quote_column(&on.local), on.op, d.quote_column(&on.foreign)),
            None => {
                let target = entry.alias.as_deref().unwrap_or(&entry.table);
                let fk = inflector::foreign_key(cx.inflector, cx.table);
                (
                    d.quote(&format!("{}.id", cx.table)),
                    Op::Eq,
                    d.quote(&format!("{target}.{fk}")),
                )
            }
        };
        format!("{sql} ON {local} {op} {foreign}")
    }
}

impl Fragment for JoinClause {
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        self.entries
            .iter()
            .map(|e| Self::render_entry(e, cx))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.error = None;
    }
}

/// JOIN chain methods.
pub trait Join: Sized {
    fn join_clause(&mut self) -> &mut JoinClause;

    fn join(mut self, kind: JoinKind, table: &str, alias: Option<&str>) -> Self {
        self.join_clause().push(JoinEntry {
            kind,
            table: table.to_string(),
            alias: alias.map(str::to_string),
            on: None,
        });
        self
    }

    fn inner_join(self, table: &str) -> Self {
        self.join(JoinKind::Inner, table, None)
    }

    fn inner_join_as(self, table: &str, alias: &str) -> Self {
        self.join(JoinKind::Inner, table, Some(alias))
    }

    fn left_join(self, table: &str) -> Self {
        self.join(JoinKind::Left, table, None)
    }

    fn left_join_as(self, table: &str, alias: &str) -> Self {
        self.join(JoinKind::Left, table, Some(alias))
    }

    fn right_join(self, table: &str) -> Self {
        self.join(JoinKind::Right, table, None)
    }

    fn right_join_as(self, table: &str, alias: &str) -> Self {
        self.join(JoinKind::Right, table, Some(alias))
    }

    fn cross_join(self, table: &str) -> Self {
        self.join(JoinKind::Cross, table, None)
    }

    fn cross_join_as(self, table: &str, alias: &str) -> Self {
        self.join(JoinKind::Cross, table, Some(alias))
    }

    /// `ON local = foreign` for the last join.
    fn on(self, local: impl Into<Column>, foreign: impl Into<Column>) -> Self {
        self.on_op(local, Op::Eq, foreign)
    }

    /// `ON local <op> foreign` for the last join.
    fn on_op(mut self, local: impl Into<Column>, op: Op, foreign: impl Into<Column>) -> Self {
        self.join_clause().set_last_on(JoinOn {
            local: local.into(),
            op,
            foreign: foreign.into(),
        });
        self
    }
}
