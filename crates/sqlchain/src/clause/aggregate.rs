use super::Fragment;
use crate::condition::RenderContext;
use crate::ident::Column;

/// Aggregate functions, in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 5] = [
        AggregateKind::Count,
        AggregateKind::Sum,
        AggregateKind::Avg,
        AggregateKind::Min,
        AggregateKind::Max,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Aggregate expressions of the select list, keyed by alias per kind.
#[derive(Debug, Clone, Default)]
pub struct AggregateClause {
    by_kind: [Vec<(String, Column)>; 5],
}

impl AggregateClause {
    /// Add an aggregate. A repeated alias for the same kind replaces the column.
    pub fn push(&mut self, kind: AggregateKind, column: Column, alias: Option<&str>) {
        let alias = alias.map_or_else(|| column.as_str().to_string(), str::to_string);
        let entries = &mut self.by_kind[kind.index()];
        match entries.iter_mut().find(|(a, _)| *a == alias) {
            Some(entry) => entry.1 = column,
            None => entries.push((alias, column)),
        }
    }

    pub fn entries(&self, kind: AggregateKind) -> &[(String, Column)] {
        &self.by_kind[kind.index()]
    }

    /// Rendered expressions for one kind, e.g. `SUM("total") AS "revenue"`.
    pub fn render_kind(&self, kind: AggregateKind, cx: &RenderContext<'_>) -> Vec<String> {
        self.entries(kind)
            .iter()
            .map(|(alias, column)| {
                let expr = format!("{}({})", kind.as_sql(), cx.dialect.quote_column(column));
                if alias == column.as_str() {
                    expr
                } else {
                    format!("{expr} AS {}", cx.dialect.quote_ident(alias))
                }
            })
            .collect()
    }
}

impl Fragment for AggregateClause {
    /// Comma-separated aggregate expressions, without a keyword.
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let cx: &RenderContext<'_> = cx;
        AggregateKind::ALL
            .iter()
            .flat_map(|k| self.render_kind(*k, cx))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn is_empty(&self) -> bool {
        self.by_kind.iter().all(Vec::is_empty)
    }

    fn clear(&mut self) {
        self.by_kind.iter_mut().for_each(Vec::clear);
    }
}

/// Aggregate chain methods. An alias of `None` means "alias = column".
pub trait Aggregates: Sized {
    fn aggregate_clause(&mut self) -> &mut AggregateClause;

    fn aggregate(mut self, kind: AggregateKind, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate_clause().push(kind, column.into(), alias);
        self
    }

    /// `COUNT(*)`
    fn count_all(self, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Count, "*", alias)
    }

    fn count(self, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Count, column, alias)
    }

    fn sum(self, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Sum, column, alias)
    }

    fn avg(self, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Avg, column, alias)
    }

    fn min(self, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Min, column, alias)
    }

    fn max(self, column: impl Into<Column>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateKind::Max, column, alias)
    }
}
