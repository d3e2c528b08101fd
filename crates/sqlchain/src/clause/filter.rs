use super::Fragment;
use crate::condition::{
    ClauseKind, ConditionList, Conjunction, Op, Operand, Predicate, RenderContext,
};
use crate::error::Error;
use crate::ident::{Column, Raw};
use crate::params::Parameters;
use crate::statement::{SelectQuery, Statement};
use crate::value::Value;

/// Accumulated WHERE conditions.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    conditions: ConditionList,
    error: Option<String>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &ConditionList {
        &self.conditions
    }

    pub fn push(&mut self, conjunction: Conjunction, predicate: Predicate) {
        self.conditions.push(conjunction, predicate);
    }

    /// Fold a scoped group in as one parenthesized entry.
    pub fn push_group(&mut self, conjunction: Conjunction, group: WhereClause) {
        if self.error.is_none() {
            self.error = group.error;
        }
        self.conditions
            .push(conjunction, Predicate::Group(group.conditions));
    }

    /// First usage error recorded while chaining, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.error.get_or_insert(message);
    }

    /// Append all of `other`'s entries, keeping their conjunctions.
    pub(crate) fn extend(&mut self, other: &WhereClause) {
        for entry in other.conditions.entries() {
            self.conditions.push(
                entry.operator.unwrap_or(Conjunction::And),
                entry.predicate.clone(),
            );
        }
        if self.error.is_none() {
            self.error = other.error.clone();
        }
    }
}

impl Fragment for WhereClause {
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let body = self.conditions.render(ClauseKind::Where, cx);
        if body.is_empty() {
            body
        } else {
            format!("WHERE {body}")
        }
    }

    fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn clear(&mut self) {
        self.conditions.clear();
        self.error = None;
    }
}

/// A WHERE-only builder handed to [`Where::where_group`] closures.
#[derive(Debug, Clone, Default)]
pub struct WhereGroup {
    clause: WhereClause,
}

impl WhereGroup {
    pub fn into_clause(self) -> WhereClause {
        self.clause
    }
}

impl Where for WhereGroup {
    fn where_clause(&mut self) -> &mut WhereClause {
        &mut self.clause
    }
}

/// Push an `[NOT] EXISTS (<query>)` entry, carrying over the subquery's usage error.
fn push_exists_query(clause: &mut WhereClause, query: SelectQuery, exists: bool) {
    if let Err(err) = query.validate() {
        clause.record_error(match err {
            Error::InvalidArgument(message) => message,
            other => other.to_string(),
        });
    }
    clause.push(
        Conjunction::And,
        Predicate::ExistsQuery {
            query: Box::new(query),
            exists,
        },
    );
}

fn simple(column: impl Into<Column>, op: Op, operand: Operand) -> Predicate {
    Predicate::Simple {
        column: column.into(),
        op,
        operand,
    }
}

/// WHERE chain methods.
///
/// Every method appends one entry and returns the builder.
pub trait Where: Sized {
    fn where_clause(&mut self) -> &mut WhereClause;

    // ==================== Comparisons ====================

    /// `column = value`
    fn where_eq(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Eq, value)
    }

    /// `column <op> value`
    fn where_op(mut self, column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        self.where_clause().push(
            Conjunction::And,
            simple(column, op, Operand::Single(value.into())),
        );
        self
    }

    /// Like [`Where::where_op`], with the operator given as text (`">="`, `"not like"`).
    ///
    /// An unknown operator is recorded and reported by `validate()`.
    fn where_cmp(mut self, column: impl Into<Column>, op: &str, value: impl Into<Value>) -> Self {
        match op.parse::<Op>() {
            Ok(op) => self.where_op(column, op, value),
            Err(e) => {
                self.where_clause().record_error(e.to_string());
                self
            }
        }
    }

    fn or_where_eq(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::Eq, value)
    }

    fn or_where_op(mut self, column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        self.where_clause().push(
            Conjunction::Or,
            simple(column, op, Operand::Single(value.into())),
        );
        self
    }

    // ==================== LIKE ====================

    fn where_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::Like, pattern)
    }

    fn where_not_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::NotLike, pattern)
    }

    fn or_where_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::Like, pattern)
    }

    fn or_where_not_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::NotLike, pattern)
    }

    // ==================== NULL checks ====================

    fn where_null(mut self, column: impl Into<Column>) -> Self {
        self.where_clause()
            .push(Conjunction::And, simple(column, Op::Is, Operand::Null));
        self
    }

    fn where_not_null(mut self, column: impl Into<Column>) -> Self {
        self.where_clause()
            .push(Conjunction::And, simple(column, Op::IsNot, Operand::Null));
        self
    }

    fn or_where_null(mut self, column: impl Into<Column>) -> Self {
        self.where_clause()
            .push(Conjunction::Or, simple(column, Op::Is, Operand::Null));
        self
    }

    fn or_where_not_null(mut self, column: impl Into<Column>) -> Self {
        self.where_clause()
            .push(Conjunction::Or, simple(column, Op::IsNot, Operand::Null));
        self
    }

    // ==================== BETWEEN ====================

    fn where_between(
        mut self,
        column: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::And,
            simple(column, Op::Between, Operand::Pair(low.into(), high.into())),
        );
        self
    }

    fn where_not_between(
        mut self,
        column: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::And,
            simple(column, Op::NotBetween, Operand::Pair(low.into(), high.into())),
        );
        self
    }

    fn or_where_between(
        mut self,
        column: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::Or,
            simple(column, Op::Between, Operand::Pair(low.into(), high.into())),
        );
        self
    }

    fn or_where_not_between(
        mut self,
        column: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::Or,
            simple(column, Op::NotBetween, Operand::Pair(low.into(), high.into())),
        );
        self
    }

    // ==================== IN ====================

    fn where_in<I, V>(mut self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.where_clause()
            .push(Conjunction::And, simple(column, Op::In, Operand::List(list)));
        self
    }

    fn where_not_in<I, V>(mut self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.where_clause()
            .push(Conjunction::And, simple(column, Op::NotIn, Operand::List(list)));
        self
    }

    fn or_where_in<I, V>(mut self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.where_clause()
            .push(Conjunction::Or, simple(column, Op::In, Operand::List(list)));
        self
    }

    fn or_where_not_in<I, V>(mut self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.where_clause()
            .push(Conjunction::Or, simple(column, Op::NotIn, Operand::List(list)));
        self
    }

    // ==================== Raw ====================

    /// Append a verbatim fragment. The caller is responsible for its safety.
    fn where_raw(mut self, sql: impl Into<String>) -> Self {
        self.where_clause().push(
            Conjunction::And,
            Predicate::Raw {
                sql: sql.into(),
                bindings: Parameters::new(),
            },
        );
        self
    }

    fn or_where_raw(mut self, sql: impl Into<String>) -> Self {
        self.where_clause().push(
            Conjunction::Or,
            Predicate::Raw {
                sql: sql.into(),
                bindings: Parameters::new(),
            },
        );
        self
    }

    /// Append a verbatim fragment together with its named parameters.
    ///
    /// ```ignore
    /// q.where_raw_bind("age >= :min_age", [(":min_age", 21)])
    /// ```
    fn where_raw_bind<I, K, V>(mut self, sql: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.where_clause().push(
            Conjunction::And,
            Predicate::Raw {
                sql: sql.into(),
                bindings: bindings.into_iter().collect(),
            },
        );
        self
    }

    /// Append a raw fragment given as [`Raw`].
    fn where_fragment(self, fragment: Raw) -> Self {
        self.where_raw(fragment.0)
    }

    // ==================== Groups ====================

    /// Build a parenthesized group joined with AND.
    fn where_group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(WhereGroup) -> WhereGroup,
    {
        let group = build(WhereGroup::default()).into_clause();
        self.where_clause().push_group(Conjunction::And, group);
        self
    }

    /// Build a parenthesized group joined with OR.
    fn or_where_group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(WhereGroup) -> WhereGroup,
    {
        let group = build(WhereGroup::default()).into_clause();
        self.where_clause().push_group(Conjunction::Or, group);
        self
    }

    // ==================== EXISTS ====================

    /// `EXISTS (SELECT column FROM table WHERE table.column = current.parent_column)`.
    ///
    /// `column` defaults to the singular of the current table + `_id`,
    /// `parent_column` to `id`.
    fn where_exists(
        mut self,
        table: &str,
        column: Option<&str>,
        parent_column: Option<&str>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::And,
            Predicate::Exists {
                table: table.to_string(),
                column: column.map(str::to_string),
                parent_column: parent_column.map(str::to_string),
                exists: true,
            },
        );
        self
    }

    fn where_not_exists(
        mut self,
        table: &str,
        column: Option<&str>,
        parent_column: Option<&str>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::And,
            Predicate::Exists {
                table: table.to_string(),
                column: column.map(str::to_string),
                parent_column: parent_column.map(str::to_string),
                exists: false,
            },
        );
        self
    }

    fn or_where_exists(
        mut self,
        table: &str,
        column: Option<&str>,
        parent_column: Option<&str>,
    ) -> Self {
        self.where_clause().push(
            Conjunction::Or,
            Predicate::Exists {
                table: table.to_string(),
                column: column.map(str::to_string),
                parent_column: parent_column.map(str::to_string),
                exists: true,
            },
        );
        self
    }

    /// `EXISTS (<query>)`; the subquery's parameters share this statement's store.
    fn where_exists_query(mut self, query: SelectQuery) -> Self {
        push_exists_query(self.where_clause(), query, true);
        self
    }

    fn where_not_exists_query(mut self, query: SelectQuery) -> Self {
        push_exists_query(self.where_clause(), query, false);
        self
    }
}
