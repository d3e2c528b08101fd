//! SELECT statement builder.

use super::{Statement, StatementKind, check_error, normalize_whitespace, set_table};
use crate::clause::{
    AggregateClause, Aggregates, Fragment, GroupBy, GroupClause, Having, HavingClause, Join,
    JoinClause, OrderBy, OrderClause, Where, WhereClause,
};
use crate::condition::RenderContext;
use crate::connection::Connection;
use crate::error::Result;
use crate::ident::{Column, Raw};
use crate::params::Parameters;
use crate::row::FromRow;
use crate::value::Value;

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub column: Column,
    pub alias: Option<String>,
}

impl From<Column> for SelectColumn {
    fn from(column: Column) -> Self {
        SelectColumn {
            column,
            alias: None,
        }
    }
}

impl From<&str> for SelectColumn {
    fn from(column: &str) -> Self {
        Column::from(column).into()
    }
}

impl From<String> for SelectColumn {
    fn from(column: String) -> Self {
        Column::from(column).into()
    }
}

impl From<Raw> for SelectColumn {
    fn from(column: Raw) -> Self {
        Column::from(column).into()
    }
}

/// `(column, alias)`
impl From<(&str, &str)> for SelectColumn {
    fn from((column, alias): (&str, &str)) -> Self {
        SelectColumn {
            column: column.into(),
            alias: Some(alias.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct Union {
    all: bool,
    query: SelectQuery,
}

/// SELECT query builder.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    conn: Connection,
    table: String,
    alias: Option<String>,
    columns: Vec<SelectColumn>,
    distinct: bool,
    joins: JoinClause,
    wheres: WhereClause,
    groups: GroupClause,
    havings: HavingClause,
    orders: OrderClause,
    aggregates: AggregateClause,
    unions: Vec<Union>,
    limit: Option<u64>,
    offset: Option<u64>,
    build_error: Option<String>,
}

impl SelectQuery {
    /// Create an untargeted SELECT bound to `conn`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            table: String::new(),
            alias: None,
            columns: Vec::new(),
            distinct: false,
            joins: JoinClause::default(),
            wheres: WhereClause::default(),
            groups: GroupClause::default(),
            havings: HavingClause::default(),
            orders: OrderClause::default(),
            aggregates: AggregateClause::default(),
            unions: Vec::new(),
            limit: None,
            offset: None,
            build_error: None,
        }
    }

    // ==================== Target ====================

    /// Set the table to select from. The target can only be set once.
    pub fn from(mut self, table: &str) -> Self {
        set_table(&mut self.table, &mut self.build_error, table);
        self
    }

    /// Set the table and its alias.
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        set_table(&mut self.table, &mut self.build_error, table);
        self.alias = Some(alias.to_string()).filter(|a| !a.is_empty());
        self
    }

    pub fn target(&self) -> &str {
        &self.table
    }

    // ==================== Columns ====================

    /// Append columns to the select list.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SelectColumn>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(SelectColumn::from(column.into()));
        self
    }

    /// `column AS alias`
    pub fn column_as(mut self, column: impl Into<Column>, alias: &str) -> Self {
        self.columns.push(SelectColumn {
            column: column.into(),
            alias: Some(alias.to_string()),
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== Pagination ====================

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// 1-based page of `per_page` rows.
    pub fn page(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    // ==================== UNION ====================

    /// Append `UNION <select>`; the closure receives a fresh select on the same connection.
    pub fn union<F>(mut self, build: F) -> Self
    where
        F: FnOnce(SelectQuery) -> SelectQuery,
    {
        let query = build(SelectQuery::new(self.conn.clone()));
        self.unions.push(Union { all: false, query });
        self
    }

    /// Append `UNION ALL <select>`.
    pub fn union_all<F>(mut self, build: F) -> Self
    where
        F: FnOnce(SelectQuery) -> SelectQuery,
    {
        let query = build(SelectQuery::new(self.conn.clone()));
        self.unions.push(Union { all: true, query });
        self
    }

    // ==================== Accessors ====================

    pub fn wheres(&self) -> &WhereClause {
        &self.wheres
    }

    pub fn joins(&self) -> &JoinClause {
        &self.joins
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) fn with_where(mut self, wheres: WhereClause) -> Self {
        self.wheres = wheres;
        self
    }

    // ==================== Execution ====================

    /// Execute and map all rows to `T`.
    pub fn get<T: FromRow>(&self) -> Result<Vec<T>> {
        let built = self.checked_build()?;
        let rows = self.conn.fetch_all_built(self.kind(), &built)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map the first row to `T`, if any.
    pub fn first<T: FromRow>(&self) -> Result<Option<T>> {
        let built = self.checked_build()?;
        let row = self.conn.fetch_one_built(self.kind(), &built)?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute and return the first column of the first row.
    pub fn value(&self) -> Result<Option<Value>> {
        let built = self.checked_build()?;
        let row = self.conn.fetch_one_built(self.kind(), &built)?;
        Ok(row.and_then(|r| r.into_values().into_iter().next()))
    }

    // ==================== Rendering ====================

    fn render_select_list(&self, cx: &mut RenderContext<'_>) -> String {
        let d = cx.dialect;
        let mut items: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let col = d.quote_column(&c.column);
                match &c.alias {
                    Some(alias) if alias != c.column.as_str() => {
                        format!("{col} AS {}", d.quote_ident(alias))
                    }
                    _ => col,
                }
            })
            .collect();

        let aggregates = self.aggregates.render(cx);
        if !aggregates.is_empty() {
            items.push(aggregates);
        }

        let list = if items.is_empty() {
            "*".to_string()
        } else {
            items.join(", ")
        };
        let distinct = if self.distinct { "DISTINCT " } else { "" };

        let mut sql = format!("SELECT {distinct}{list} FROM {}", d.quote(&self.table));
        if let Some(alias) = &self.alias {
            sql.push(' ');
            sql.push_str(&d.quote_ident(alias));
        }
        sql
    }
}

impl Statement for SelectQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn connection(&self) -> &Connection {
        &self.conn
    }

    fn compile_into(&self, params: &mut Parameters) -> String {
        if self.table.is_empty() {
            return String::new();
        }
        let mut cx = RenderContext {
            dialect: self.conn.dialect(),
            inflector: self.conn.inflector(),
            table: &self.table,
            params,
        };

        let mut parts = vec![
            self.render_select_list(&mut cx),
            self.joins.render(&mut cx),
            self.wheres.render(&mut cx),
            self.groups.render(&mut cx),
            self.havings.render(&mut cx),
            self.orders.render(&mut cx),
        ];
        for union in &self.unions {
            let sql = union.query.compile_into(cx.params);
            if !sql.is_empty() {
                let keyword = if union.all { "UNION ALL" } else { "UNION" };
                parts.push(format!("{keyword} {sql}"));
            }
        }
        if let Some(limit) = self.limit {
            let p = cx.bind("limit", Value::from(limit));
            parts.push(format!("LIMIT {p}"));
        }
        if let Some(offset) = self.offset {
            let p = cx.bind("offset", Value::from(offset));
            parts.push(format!("OFFSET {p}"));
        }

        normalize_whitespace(&parts.join(" "))
    }

    fn validate(&self) -> Result<()> {
        check_error(self.build_error.as_deref())?;
        check_error(self.wheres.error())?;
        check_error(self.joins.error())?;
        for union in &self.unions {
            union.query.validate()?;
        }
        Ok(())
    }

    fn clean(self) -> Self {
        Self::new(self.conn)
    }
}

impl Where for SelectQuery {
    fn where_clause(&mut self) -> &mut WhereClause {
        &mut self.wheres
    }
}

impl Having for SelectQuery {
    fn having_clause(&mut self) -> &mut HavingClause {
        &mut self.havings
    }
}

impl OrderBy for SelectQuery {
    fn order_clause(&mut self) -> &mut OrderClause {
        &mut self.orders
    }
}

impl GroupBy for SelectQuery {
    fn group_clause(&mut self) -> &mut GroupClause {
        &mut self.groups
    }

    fn on_group_by(&mut self, column: &Column) {
        if !self.columns.iter().any(|c| c.column == *column) {
            self.columns.push(SelectColumn::from(column.clone()));
        }
    }
}

impl Join for SelectQuery {
    fn join_clause(&mut self) -> &mut JoinClause {
        &mut self.joins
    }
}

impl Aggregates for SelectQuery {
    fn aggregate_clause(&mut self) -> &mut AggregateClause {
        &mut self.aggregates
    }
}
