use super::Fragment;
use crate::condition::{
    ClauseKind, ConditionList, Conjunction, Op, Operand, Predicate, RenderContext,
};
use crate::ident::Column;
use crate::params::Parameters;
use crate::value::Value;

/// Accumulated HAVING conditions.
///
/// Columns are quoted as single identifiers since HAVING usually refers to
/// select aliases.
#[derive(Debug, Clone, Default)]
pub struct HavingClause {
    conditions: ConditionList,
}

impl HavingClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &ConditionList {
        &self.conditions
    }

    pub fn push(&mut self, conjunction: Conjunction, predicate: Predicate) {
        self.conditions.push(conjunction, predicate);
    }
}

impl Fragment for HavingClause {
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let body = self.conditions.render(ClauseKind::Having, cx);
        if body.is_empty() {
            body
        } else {
            format!("HAVING {body}")
        }
    }

    fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn clear(&mut self) {
        self.conditions.clear();
    }
}

/// A HAVING-only builder handed to [`Having::having_group`] closures.
#[derive(Debug, Clone, Default)]
pub struct HavingGroup {
    clause: HavingClause,
}

impl HavingGroup {
    pub fn into_clause(self) -> HavingClause {
        self.clause
    }
}

impl Having for HavingGroup {
    fn having_clause(&mut self) -> &mut HavingClause {
        &mut self.clause
    }
}

/// HAVING chain methods.
pub trait Having: Sized {
    fn having_clause(&mut self) -> &mut HavingClause;

    fn having_eq(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.having_op(column, Op::Eq, value)
    }

    fn having_op(mut self, column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Simple {
                column: column.into(),
                op,
                operand: Operand::Single(value.into()),
            },
        );
        self
    }

    fn or_having_eq(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.or_having_op(column, Op::Eq, value)
    }

    fn or_having_op(mut self, column: impl Into<Column>, op: Op, value: impl Into<Value>) -> Self {
        self.having_clause().push(
            Conjunction::Or,
            Predicate::Simple {
                column: column.into(),
                op,
                operand: Operand::Single(value.into()),
            },
        );
        self
    }

    fn having_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.having_op(column, Op::Like, pattern)
    }

    fn having_not_like(self, column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        self.having_op(column, Op::NotLike, pattern)
    }

    fn having_null(mut self, column: impl Into<Column>) -> Self {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Simple {
                column: column.into(),
                op: Op::Is,
                operand: Operand::Null,
            },
        );
        self
    }

    fn having_not_null(mut self, column: impl Into<Column>) -> Self {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Simple {
                column: column.into(),
                op: Op::IsNot,
                operand: Operand::Null,
            },
        );
        self
    }

    fn having_between(
        mut self,
        column: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Simple {
                column: column.into(),
                op: Op::Between,
                operand: Operand::Pair(low.into(), high.into()),
            },
        );
        self
    }

    fn having_in<I, V>(mut self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Simple {
                column: column.into(),
                op: Op::In,
                operand: Operand::List(values.into_iter().map(Into::into).collect()),
            },
        );
        self
    }

    fn having_raw(mut self, sql: impl Into<String>) -> Self {
        self.having_clause().push(
            Conjunction::And,
            Predicate::Raw {
                sql: sql.into(),
                bindings: Parameters::new(),
            },
        );
        self
    }

    fn having_group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(HavingGroup) -> HavingGroup,
    {
        let group = build(HavingGroup::default()).into_clause();
        self.having_clause()
            .push(Conjunction::And, Predicate::Group(group.conditions));
        self
    }

    fn or_having_group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(HavingGroup) -> HavingGroup,
    {
        let group = build(HavingGroup::default()).into_clause();
        self.having_clause()
            .push(Conjunction::Or, Predicate::Group(group.conditions));
        self
    }
}
