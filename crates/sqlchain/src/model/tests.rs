use super::*;
use crate::clause::{OrderBy, Where};
use crate::condition::Op;
use crate::dialect::Dialect;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: Option<i64>,
    name: String,
    age: i64,
}

impl User {
    fn new(name: &str, age: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age,
        }
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
        })
    }
}

fn adults(q: ModelQuery<User>) -> ModelQuery<User> {
    q.where_op("age", Op::Gte, 18)
}

impl Model for User {
    fn attributes(&self) -> Data {
        Data::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("age", self.age)
    }

    fn set_id(&mut self, id: Value) {
        self.id = id.as_i64();
    }

    fn scopes() -> Vec<(&'static str, Scope<Self>)> {
        vec![("adults", adults as Scope<Self>)]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Task {
    id: Option<i64>,
    user_id: i64,
    title: String,
}

impl FromRow for Task {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Task {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
        })
    }
}

impl Model for Task {
    const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
    const TIMESTAMPS: bool = true;

    fn attributes(&self) -> Data {
        Data::new()
            .with("id", self.id)
            .with("user_id", self.user_id)
            .with("title", self.title.as_str())
    }

    fn set_id(&mut self, id: Value) {
        self.id = id.as_i64();
    }
}

fn offline() -> Connection {
    Connection::offline(Dialect::Postgres)
}

#[test]
fn test_table_names() {
    assert_eq!(User::table(), "users");
    assert_eq!(Task::table(), "tasks");
}

#[test]
fn test_soft_delete_filter_wraps_conditions() {
    let q = Task::query(&offline())
        .where_eq("user_id", 1)
        .or_where_eq("title", "x");
    assert_eq!(
        q.to_sql(),
        r#"SELECT * FROM "tasks" WHERE "tasks"."deleted_at" IS NULL AND ("user_id" = :tasks_user_id_0 OR "title" = :tasks_title_1)"#
    );

    assert_eq!(
        Task::query(&offline()).with_trashed().where_eq("user_id", 1).to_sql(),
        r#"SELECT * FROM "tasks" WHERE "user_id" = :tasks_user_id_0"#
    );
    assert_eq!(
        Task::query(&offline()).only_trashed().to_sql(),
        r#"SELECT * FROM "tasks" WHERE "tasks"."deleted_at" IS NOT NULL"#
    );
}

#[test]
fn test_models_without_soft_delete_are_unfiltered() {
    assert_eq!(User::query(&offline()).to_sql(), r#"SELECT * FROM "users""#);
}

#[test]
fn test_scope() {
    let q = User::query(&offline()).scope("adults").unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT * FROM "users" WHERE "age" >= :users_age_0"#
    );
}

#[test]
fn test_unknown_scope_suggests() {
    let err = User::query(&offline()).scope("adult").err().unwrap();
    assert!(err.is_usage_error());
    assert_eq!(
        err.to_string(),
        "Call to undefined method `adult`. Did you mean `adults`?"
    );
}

#[test]
fn test_where_has() {
    assert_eq!(
        User::query(&offline()).where_has::<Task>().to_sql(),
        r#"SELECT * FROM "users" WHERE EXISTS (SELECT "user_id" FROM "tasks" WHERE "tasks"."user_id" = "users"."id")"#
    );
    assert_eq!(
        User::query(&offline()).where_doesnt_have::<Task>().to_sql(),
        r#"SELECT * FROM "users" WHERE NOT EXISTS (SELECT "user_id" FROM "tasks" WHERE "tasks"."user_id" = "users"."id")"#
    );
}

#[test]
fn test_has_many_query() {
    let user = User {
        id: Some(4),
        ..User::new("ann", 30)
    };
    let tasks: ModelQuery<Task> = user.has_many(&offline(), None, None);
    assert_eq!(
        tasks.with_trashed().to_sql(),
        r#"SELECT * FROM "tasks" WHERE "user_id" = :tasks_user_id_0"#
    );
}

#[test]
fn test_offline_execution_fails() {
    let err = User::all(&offline()).unwrap_err();
    assert!(matches!(err, Error::NoConnection));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::sqlite::SqliteExecutor;
    use crate::statement::Statement;

    fn connect() -> Connection {
        let conn = Connection::new(SqliteExecutor::open_in_memory().unwrap());
        for sql in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER NOT NULL)",
            "CREATE TABLE tasks (id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INTEGER NOT NULL, title TEXT NOT NULL, created_at TEXT, updated_at TEXT, deleted_at TEXT)",
        ] {
            conn.query().raw(sql).execute().unwrap();
        }
        conn
    }

    #[test]
    fn test_save_find_refresh() {
        let conn = connect();
        let mut ann = User::new("ann", 30);
        assert!(ann.save(&conn).unwrap());
        assert_eq!(ann.id, Some(1));

        ann.age = 31;
        assert!(ann.save(&conn).unwrap());
        assert_eq!(User::find(&conn, 1).unwrap(), Some(ann.clone()));

        let mut stale = ann.clone();
        stale.name = "changed locally".into();
        assert!(stale.refresh(&conn).unwrap());
        assert_eq!(stale.name, "ann");

        let err = User::find_or_fail(&conn, 99).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_aggregates_and_scopes() {
        let conn = connect();
        for (name, age) in [("ann", 30), ("bob", 12), ("cy", 45)] {
            User::create(&conn, User::new(name, age).attributes()).unwrap();
        }

        let users = User::query(&conn);
        assert_eq!(users.count().unwrap(), 3);
        assert_eq!(users.sum("age").unwrap(), 87.0);
        assert_eq!(users.max("age").unwrap(), 45.0);
        assert_eq!(users.min("age").unwrap(), 12.0);
        assert_eq!(users.avg("age").unwrap(), 29.0);
        assert!(users.exists().unwrap());

        let adults = User::query(&conn).scope("adults").unwrap();
        assert_eq!(adults.count().unwrap(), 2);
        let names: Vec<String> = adults
            .order_asc("name")
            .get()
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["ann", "cy"]);

        assert_eq!(User::query(&conn).last().unwrap().map(|u| u.name), Some("cy".into()));
    }

    #[test]
    fn test_relations() {
        let conn = connect();
        let mut ann = User::new("ann", 30);
        ann.save(&conn).unwrap();
        let mut bob = User::new("bob", 40);
        bob.save(&conn).unwrap();

        for title in ["write", "review"] {
            let mut task = Task {
                id: None,
                user_id: 1,
                title: title.to_string(),
            };
            task.save(&conn).unwrap();
        }

        let tasks = ann.has_many::<Task>(&conn, None, None).get().unwrap();
        assert_eq!(tasks.len(), 2);
        let first: Option<Task> = ann.has_one(&conn, None, None).unwrap();
        assert_eq!(first.map(|t| t.title), Some("write".into()));

        let owner: Option<User> = tasks[0].belongs_to(&conn, None).unwrap();
        assert_eq!(owner, Some(ann.clone()));

        let with_tasks = User::query(&conn).where_has::<Task>().get().unwrap();
        assert_eq!(with_tasks, vec![ann]);
        let idle = User::query(&conn).where_doesnt_have::<Task>().get().unwrap();
        assert_eq!(idle, vec![bob]);
    }

    #[test]
    fn test_soft_delete_lifecycle() {
        let conn = connect();
        let id = Task::create(&conn, [("user_id", Value::Int(1)), ("title", "a".into())])
            .unwrap()
            .unwrap();
        Task::create(&conn, [("user_id", Value::Int(1)), ("title", "b".into())]).unwrap();

        let stamped = conn
            .table("tasks")
            .select(["created_at", "updated_at"])
            .first::<Row>()
            .unwrap()
            .unwrap();
        assert!(stamped.try_get::<chrono::NaiveDateTime>("created_at").is_ok());

        assert_eq!(Task::destroy(&conn, id.clone()).unwrap(), 1);
        assert_eq!(Task::query(&conn).count().unwrap(), 1);
        assert_eq!(Task::query(&conn).with_trashed().count().unwrap(), 2);
        assert_eq!(Task::query(&conn).only_trashed().count().unwrap(), 1);
        assert_eq!(Task::find(&conn, id.clone()).unwrap(), None);

        assert_eq!(Task::query(&conn).restore().unwrap(), 1);
        assert_eq!(Task::query(&conn).count().unwrap(), 2);

        assert_eq!(Task::query(&conn).where_eq("title", "b").force_delete().unwrap(), 1);
        assert_eq!(Task::query(&conn).with_trashed().count().unwrap(), 1);
    }

    #[test]
    fn test_create_stamps_null_created_at() {
        let conn = connect();
        Task::create(
            &conn,
            [
                ("user_id", Value::Int(1)),
                ("title", "a".into()),
                (CREATED_AT, Value::Null),
            ],
        )
        .unwrap();
        Task::create(
            &conn,
            [
                ("user_id", Value::Int(1)),
                ("title", "b".into()),
                (CREATED_AT, "2020-01-02 03:04:05".into()),
            ],
        )
        .unwrap();

        let rows = conn
            .table("tasks")
            .select(["title", CREATED_AT, UPDATED_AT])
            .order_asc("id")
            .get::<Row>()
            .unwrap();
        assert!(rows[0].try_get::<chrono::NaiveDateTime>(CREATED_AT).is_ok());
        assert!(rows[0].try_get::<chrono::NaiveDateTime>(UPDATED_AT).is_ok());
        assert_eq!(
            rows[1].get(CREATED_AT),
            Some(&Value::from("2020-01-02 03:04:05"))
        );
    }

    #[test]
    fn test_query_update() {
        let conn = connect();
        User::create(&conn, [("name", Value::from("ann")), ("age", Value::Int(30))]).unwrap();
        User::create(&conn, [("name", Value::from("bob")), ("age", Value::Int(12))]).unwrap();

        let affected = User::query(&conn)
            .where_op("age", Op::Lt, 18)
            .update([("age", 18)])
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(User::query(&conn).min("age").unwrap(), 18.0);
    }
}
