use super::{Model, UPDATED_AT, now};
use crate::clause::{
    AggregateKind, Aggregates, GroupBy, GroupClause, Having, HavingClause, Join, JoinClause,
    OrderBy, OrderClause, Where, WhereClause, WhereGroup,
};
use crate::condition::Conjunction;
use crate::connection::Connection;
use crate::data::Data;
use crate::error::{Error, Result};
use crate::ident::{Column, raw};
use crate::inflector;
use crate::row::Row;
use crate::statement::{BuiltQuery, DeleteQuery, SelectQuery, Statement, UpdateQuery};
use crate::value::Value;
use std::marker::PhantomData;

/// Which soft-deleted rows a query sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trashed {
    /// Only live rows.
    #[default]
    Exclude,
    Include,
    Only,
}

/// A SELECT scoped to model `M`, hydrating rows into `M`.
///
/// The soft-delete filter is applied when the query runs, ahead of every
/// user condition: `WHERE "t"."deleted_at" IS NULL AND (<conditions>)`.
pub struct ModelQuery<M> {
    select: SelectQuery,
    trashed: Trashed,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for ModelQuery<M> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            trashed: self.trashed,
            _model: PhantomData,
        }
    }
}

impl<M: Model> ModelQuery<M> {
    pub fn new(conn: Connection) -> Self {
        Self {
            select: SelectQuery::new(conn).from(&M::table()),
            trashed: Trashed::default(),
            _model: PhantomData,
        }
    }

    fn conn(&self) -> &Connection {
        self.select.connection()
    }

    // ==================== Soft delete ====================

    pub fn with_trashed(mut self) -> Self {
        self.trashed = Trashed::Include;
        self
    }

    pub fn only_trashed(mut self) -> Self {
        self.trashed = Trashed::Only;
        self
    }

    pub fn trashed(&self) -> Trashed {
        self.trashed
    }

    /// User conditions with the soft-delete filter in front.
    fn scoped_where(&self) -> WhereClause {
        let conditions = self.select.wheres().clone();
        let Some(column) = M::SOFT_DELETE else {
            return conditions;
        };
        let column = format!("{}.{column}", M::table());
        let filter = match self.trashed {
            Trashed::Include => return conditions,
            Trashed::Exclude => WhereGroup::default().where_null(column.as_str()),
            Trashed::Only => WhereGroup::default().where_not_null(column.as_str()),
        };
        let mut scoped = filter.into_clause();
        scoped.push_group(Conjunction::And, conditions);
        scoped
    }

    /// The SELECT this query runs.
    pub fn select(&self) -> SelectQuery {
        self.select.clone().with_where(self.scoped_where())
    }

    // ==================== Chain ====================

    pub fn limit(mut self, n: u64) -> Self {
        self.select = self.select.limit(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.select = self.select.offset(n);
        self
    }

    /// Apply the scope registered under `name` in [`Model::scopes`].
    pub fn scope(self, name: &str) -> Result<Self> {
        let scopes = M::scopes();
        match scopes.iter().find(|(scope, _)| *scope == name) {
            Some((_, apply)) => Ok(apply(self)),
            None => Err(Error::unknown_method(
                name,
                scopes.iter().map(|(scope, _)| *scope),
            )),
        }
    }

    /// Keep rows that have at least one related `R` row
    /// (`R.<singular M table>_id = M.<primary key>`).
    pub fn where_has<R: Model>(self) -> Self {
        self.where_exists(&R::table(), None, Some(M::PRIMARY_KEY))
    }

    /// Keep rows without any related `R` row.
    pub fn where_doesnt_have<R: Model>(self) -> Self {
        self.where_not_exists(&R::table(), None, Some(M::PRIMARY_KEY))
    }

    // ==================== Fetching ====================

    pub fn get(&self) -> Result<Vec<M>> {
        self.select().get::<M>()
    }

    pub fn first(&self) -> Result<Option<M>> {
        self.select().limit(1).first::<M>()
    }

    /// The row with the highest primary key.
    pub fn last(&self) -> Result<Option<M>> {
        self.select()
            .order_desc(M::PRIMARY_KEY)
            .limit(1)
            .first::<M>()
    }

    /// First row whose [`Model::FIND_BY`] column equals `id`.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<M>> {
        let column = M::FIND_BY.unwrap_or(M::PRIMARY_KEY);
        self.clone().where_eq(column, id).first()
    }

    pub fn exists(&self) -> Result<bool> {
        let row = self
            .select()
            .column(raw("1"))
            .limit(1)
            .first::<Row>()?;
        Ok(row.is_some())
    }

    // ==================== Aggregates ====================

    fn aggregate_value(&self, kind: AggregateKind, column: &str) -> Result<Value> {
        let alias = format!("{}_{column}", kind.as_sql().to_lowercase());
        let row = self
            .select()
            .aggregate(kind, column, Some(alias.as_str()))
            .first::<Row>()?;
        Ok(row
            .and_then(|r| r.get(&alias).cloned())
            .unwrap_or(Value::Null))
    }

    /// `COUNT(<primary key>)`, aliased `count_<primary key>`.
    pub fn count(&self) -> Result<i64> {
        Ok(self
            .aggregate_value(AggregateKind::Count, M::PRIMARY_KEY)?
            .as_i64()
            .unwrap_or(0))
    }

    pub fn sum(&self, column: &str) -> Result<f64> {
        Ok(self
            .aggregate_value(AggregateKind::Sum, column)?
            .as_f64()
            .unwrap_or(0.0))
    }

    pub fn avg(&self, column: &str) -> Result<f64> {
        Ok(self
            .aggregate_value(AggregateKind::Avg, column)?
            .as_f64()
            .unwrap_or(0.0))
    }

    pub fn min(&self, column: &str) -> Result<f64> {
        Ok(self
            .aggregate_value(AggregateKind::Min, column)?
            .as_f64()
            .unwrap_or(0.0))
    }

    pub fn max(&self, column: &str) -> Result<f64> {
        Ok(self
            .aggregate_value(AggregateKind::Max, column)?
            .as_f64()
            .unwrap_or(0.0))
    }

    // ==================== Writes ====================

    /// UPDATE every matching row; stamps `updated_at` for timestamped models.
    pub fn update(&self, data: impl Into<Data>) -> Result<u64> {
        let mut data: Data = data.into();
        if M::TIMESTAMPS {
            data.set(UPDATED_AT, now());
        }
        UpdateQuery::new(self.conn().clone())
            .table(&M::table())
            .set(data)
            .with_joins(self.select.joins().clone())
            .with_where(self.scoped_where())
            .execute()
    }

    /// Delete matching rows; soft-deleting models stamp their delete column.
    pub fn delete(&self) -> Result<u64> {
        match M::SOFT_DELETE {
            Some(column) => {
                let mut data = Data::new().with(column, now());
                if M::TIMESTAMPS {
                    data.set(UPDATED_AT, now());
                }
                UpdateQuery::new(self.conn().clone())
                    .table(&M::table())
                    .set(data)
                    .with_joins(self.select.joins().clone())
                    .with_where(self.scoped_where())
                    .execute()
            }
            None => self.force_delete(),
        }
    }

    /// Delete matching rows even when the model soft-deletes.
    pub fn force_delete(&self) -> Result<u64> {
        DeleteQuery::new(self.conn().clone())
            .from(&M::table())
            .with_joins(self.select.joins().clone())
            .with_where(self.scoped_where())
            .execute()
    }

    /// Clear the delete column of matching trashed rows.
    pub fn restore(&self) -> Result<u64> {
        let Some(column) = M::SOFT_DELETE else {
            return Ok(0);
        };
        self.clone()
            .only_trashed()
            .update(Data::new().with(column, Value::Null))
    }

    // ==================== Inspection ====================

    pub fn to_sql(&self) -> String {
        self.select().to_sql()
    }

    pub fn build(&self) -> BuiltQuery {
        self.select().build()
    }

    /// Foreign key other tables use to reference `M`.
    pub fn foreign_key(&self) -> String {
        inflector::foreign_key(self.conn().inflector(), &M::table())
    }
}

impl<M> Where for ModelQuery<M> {
    fn where_clause(&mut self) -> &mut WhereClause {
        self.select.where_clause()
    }
}

impl<M> OrderBy for ModelQuery<M> {
    fn order_clause(&mut self) -> &mut OrderClause {
        self.select.order_clause()
    }
}

impl<M> GroupBy for ModelQuery<M> {
    fn group_clause(&mut self) -> &mut GroupClause {
        self.select.group_clause()
    }

    fn on_group_by(&mut self, column: &Column) {
        self.select.on_group_by(column);
    }
}

impl<M> Having for ModelQuery<M> {
    fn having_clause(&mut self) -> &mut HavingClause {
        self.select.having_clause()
    }
}

impl<M> Join for ModelQuery<M> {
    fn join_clause(&mut self) -> &mut JoinClause {
        self.select.join_clause()
    }
}
