//! Query facade: remembers a target table and hands out fresh builders.

use crate::connection::Connection;
use crate::data::Data;
use crate::model::Model;
use crate::statement::{DeleteQuery, InsertQuery, RawQuery, SelectColumn, SelectQuery, UpdateQuery};

/// Factory for statement builders on one connection.
///
/// Every call returns a new builder, so builders from the same facade never
/// share clause state.
///
/// ```ignore
/// let users = conn.table("users");
/// let active = users.select_all().where_eq("active", true).get::<Row>()?;
/// let gone = users.delete().where_op("last_seen", Op::Lt, cutoff).execute()?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    conn: Connection,
    table: Option<String>,
}

impl Query {
    pub fn new(conn: Connection) -> Self {
        Self { conn, table: None }
    }

    /// Remember `table` as the target of the next builders.
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Target the table of model `M`.
    pub fn model<M: Model>(self) -> Self {
        self.table(&M::table())
    }

    pub fn current_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn target(&self) -> &str {
        self.table.as_deref().unwrap_or_default()
    }

    /// A SELECT of `columns` on the current table.
    pub fn select<I, C>(&self, columns: I) -> SelectQuery
    where
        I: IntoIterator<Item = C>,
        C: Into<SelectColumn>,
    {
        self.select_all().columns(columns)
    }

    /// `SELECT *` on the current table.
    pub fn select_all(&self) -> SelectQuery {
        SelectQuery::new(self.conn.clone()).from(self.target())
    }

    /// An INSERT of one row.
    pub fn insert(&self, data: impl Into<Data>) -> InsertQuery {
        InsertQuery::new(self.conn.clone())
            .into_table(self.target())
            .values(data)
    }

    /// An INSERT of several rows under one VALUES list.
    pub fn insert_many<I, D>(&self, rows: I) -> InsertQuery
    where
        I: IntoIterator<Item = D>,
        D: Into<Data>,
    {
        InsertQuery::new(self.conn.clone())
            .into_table(self.target())
            .rows(rows)
    }

    pub fn update(&self) -> UpdateQuery {
        UpdateQuery::new(self.conn.clone()).table(self.target())
    }

    pub fn delete(&self) -> DeleteQuery {
        DeleteQuery::new(self.conn.clone()).from(self.target())
    }

    /// Literal SQL with caller-supplied named parameters.
    pub fn raw(&self, sql: impl Into<String>) -> RawQuery {
        RawQuery::new(self.conn.clone(), sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Where;
    use crate::dialect::Dialect;
    use crate::statement::Statement;

    #[test]
    fn test_fresh_builder_per_call() {
        let users = Connection::offline(Dialect::Postgres).table("users");
        let first = users.select_all().where_eq("id", 1);
        let second = users.select_all();

        assert_eq!(first.to_sql(), r#"SELECT * FROM "users" WHERE "id" = :users_id_0"#);
        assert_eq!(second.to_sql(), r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_facade_kinds() {
        let tasks = Connection::offline(Dialect::Sqlite).table("tasks");

        assert_eq!(
            tasks.select(["id", "title"]).to_sql(),
            "SELECT `id`, `title` FROM `tasks`"
        );
        assert_eq!(
            tasks.insert([("title", "write")]).to_sql(),
            "INSERT INTO `tasks` (`title`) VALUES (:tasks_title_0)"
        );
        assert_eq!(
            tasks.update().set_value("done", true).where_eq("id", 3).to_sql(),
            "UPDATE `tasks` SET `done` = :tasks_done_0 WHERE `id` = :tasks_id_1"
        );
        assert_eq!(
            tasks.delete().where_eq("id", 3).to_sql(),
            "DELETE FROM `tasks` WHERE `id` = :tasks_id_0"
        );
        assert_eq!(tasks.raw("SELECT 1").to_sql(), "SELECT 1");
    }

    #[test]
    fn test_untargeted_facade_renders_empty() {
        let q = Connection::offline(Dialect::Ansi).query();
        assert_eq!(q.select_all().to_sql(), "");
        assert!(q.select_all().checked_build().is_err());
    }
}
