//! Builder compilation tests.

use super::*;
use crate::clause::{Aggregates, Direction, GroupBy, Having, Join, OrderBy, Where};
use crate::condition::Op;
use crate::data::Data;
use crate::dialect::Dialect;
use crate::ident::raw;
use crate::value::Value;

fn pg() -> Connection {
    Connection::offline(Dialect::Postgres)
}

fn mysql() -> Connection {
    Connection::offline(Dialect::MySql)
}

fn names(params: &Parameters) -> Vec<String> {
    params.names().map(str::to_string).collect()
}

#[test]
fn test_select_basic() {
    let q = SelectQuery::new(pg()).from("users");
    assert_eq!(q.to_sql(), r#"SELECT * FROM "users""#);
    assert!(q.parameters().is_empty());
}

#[test]
fn test_select_untargeted_is_empty() {
    assert_eq!(SelectQuery::new(pg()).where_eq("id", 1).to_sql(), "");
}

#[test]
fn test_compilation_is_idempotent() {
    let q = SelectQuery::new(pg())
        .from("users")
        .where_eq("status", "active")
        .where_in("role", ["admin", "owner"])
        .limit(5);

    assert_eq!(q.build(), q.build());
    assert_eq!(q.to_sql(), q.to_sql());
}

#[test]
fn test_placeholders_match_parameters() {
    let q = SelectQuery::new(pg())
        .from("orders")
        .where_eq("customer.id", 9)
        .where_between("total", 10, 99)
        .or_where_in("state", ["open", "held"])
        .group_by("state")
        .having_op("state", Op::Ne, "void")
        .offset(20)
        .limit(10);

    let built = q.build();
    assert_eq!(placeholder::names(&built.sql), names(&built.params));
    assert_eq!(built.params.get(":orders_customer_id_0"), Some(&Value::Int(9)));
}

#[test]
fn test_where_grouping() {
    let q = SelectQuery::new(pg())
        .from("t")
        .where_eq("a", 1)
        .where_group(|g| g.where_eq("b", 2).or_where_eq("c", 3));

    assert_eq!(
        q.to_sql(),
        r#"SELECT * FROM "t" WHERE "a" = :t_a_0 AND ("b" = :t_b_1 OR "c" = :t_c_2)"#
    );
}

#[test]
fn test_empty_group_is_dropped() {
    let q = SelectQuery::new(pg())
        .from("t")
        .where_group(|g| g)
        .where_eq("a", 1);
    assert_eq!(q.to_sql(), r#"SELECT * FROM "t" WHERE "a" = :t_a_0"#);
}

#[test]
fn test_in_and_between_expansion() {
    let built = SelectQuery::new(pg())
        .from("users")
        .where_in("id", [1, 2, 3])
        .where_between("age", 18, 30)
        .build();

    assert_eq!(
        built.sql,
        r#"SELECT * FROM "users" WHERE "id" IN (:users_id_0, :users_id_1, :users_id_2) AND "age" BETWEEN :users_age_3 AND :users_age_4"#
    );
    assert_eq!(built.params.len(), 5);
    assert_eq!(built.params.get(":users_age_4"), Some(&Value::Int(30)));
}

#[test]
fn test_empty_in_lists() {
    let q = SelectQuery::new(pg())
        .from("users")
        .where_in("id", Vec::<i64>::new())
        .or_where_not_in("id", Vec::<i64>::new());
    assert_eq!(q.to_sql(), r#"SELECT * FROM "users" WHERE 1 = 0 OR 1 = 1"#);
}

#[test]
fn test_null_checks_have_no_placeholder() {
    let built = SelectQuery::new(pg())
        .from("users")
        .where_null("deleted_at")
        .or_where_not_null("banned_at")
        .build();
    assert_eq!(
        built.sql,
        r#"SELECT * FROM "users" WHERE "deleted_at" IS NULL OR "banned_at" IS NOT NULL"#
    );
    assert!(built.params.is_empty());
}

#[test]
fn test_where_raw_bind() {
    let q = SelectQuery::new(pg())
        .from("users")
        .where_eq("active", true)
        .where_raw_bind("lower(email) = :email", [(":email", "a@b.c")]);
    let built = q.build();
    assert_eq!(
        built.sql,
        r#"SELECT * FROM "users" WHERE "active" = :users_active_0 AND lower(email) = :email"#
    );
    assert_eq!(built.params.get(":email"), Some(&Value::from("a@b.c")));
}

#[test]
fn test_where_exists_query_shares_store() {
    let sub = SelectQuery::new(pg())
        .from("orders")
        .column(raw("1"))
        .where_raw(r#""orders"."user_id" = "users"."id""#)
        .where_eq("state", "open");
    let built = SelectQuery::new(pg())
        .from("users")
        .where_eq("state", "active")
        .where_exists_query(sub)
        .build();

    assert_eq!(
        built.sql,
        r#"SELECT * FROM "users" WHERE "state" = :users_state_0 AND EXISTS (SELECT 1 FROM "orders" WHERE "orders"."user_id" = "users"."id" AND "state" = :orders_state_1)"#
    );
    assert_eq!(built.params.len(), 2);
}

#[test]
fn test_exists_subquery_errors_reach_the_parent() {
    let bad = || SelectQuery::new(pg()).from("posts").where_cmp("x", "<>=", 1);

    let q = SelectQuery::new(pg()).from("users").where_exists_query(bad());
    assert!(matches!(q.validate(), Err(Error::InvalidArgument(_))));
    assert!(q.execute().unwrap_err().is_usage_error());

    let grouped = SelectQuery::new(pg())
        .from("users")
        .where_eq("active", true)
        .where_group(|g| g.where_not_exists_query(bad()));
    assert!(grouped.validate().is_err());

    let update = UpdateQuery::new(pg())
        .table("users")
        .set_value("flagged", true)
        .where_exists_query(bad());
    assert!(update.validate().is_err());

    let delete = DeleteQuery::new(pg()).from("users").where_not_exists_query(bad());
    assert!(delete.validate().is_err());

    let good = SelectQuery::new(pg()).from("posts").where_eq("x", 1);
    let q = SelectQuery::new(pg()).from("users").where_exists_query(good);
    assert!(q.validate().is_ok());
}

#[test]
fn test_page_does_not_overflow() {
    let q = SelectQuery::new(pg()).from("users").page(u64::MAX, u64::MAX);
    let built = q.build();
    assert_eq!(built.params.get(":users_limit_0"), Some(&Value::from(u64::MAX)));
    assert_eq!(built.params.get(":users_offset_1"), Some(&Value::from(u64::MAX)));

    let first = SelectQuery::new(pg()).from("users").page(0, 10).build();
    assert_eq!(first.params.get(":users_offset_1"), Some(&Value::Int(0)));
}

#[test]
fn test_order_limit_offset() {
    let built = SelectQuery::new(pg())
        .from("posts")
        .order_desc("created_at")
        .order_asc("title")
        .order_by("created_at", Direction::Asc)
        .page(3, 10)
        .build();

    assert_eq!(
        built.sql,
        r#"SELECT * FROM "posts" ORDER BY "created_at" ASC, "title" ASC LIMIT :posts_limit_0 OFFSET :posts_offset_1"#
    );
    assert_eq!(built.params.get(":posts_limit_0"), Some(&Value::Int(10)));
    assert_eq!(built.params.get(":posts_offset_1"), Some(&Value::Int(20)));
}

#[test]
fn test_aggregates_group_having() {
    let q = SelectQuery::new(pg())
        .from("orders")
        .group_by("status")
        .count_all(Some("n"))
        .sum("total", Some("total"))
        .having_op("n", Op::Gt, 1);

    assert_eq!(
        q.to_sql(),
        r#"SELECT "status", COUNT(*) AS "n", SUM("total") FROM "orders" GROUP BY "status" HAVING "n" > :orders_n_0"#
    );
}

#[test]
fn test_distinct_and_aliases() {
    let q = SelectQuery::new(mysql())
        .from_as("users", "u")
        .distinct()
        .columns([("u.name", "name"), ("u.email", "contact")]);
    assert_eq!(
        q.to_sql(),
        "SELECT DISTINCT `u`.`name` AS `name`, `u`.`email` AS `contact` FROM `users` `u`"
    );
}

#[test]
fn test_join_default_keys() {
    let q = SelectQuery::new(pg()).from("tasks").inner_join("users");
    assert_eq!(
        q.to_sql(),
        r#"SELECT * FROM "tasks" INNER JOIN "users" ON "tasks"."id" = "users"."task_id""#
    );

    let aliased = SelectQuery::new(pg()).from("tasks").left_join_as("users", "u");
    assert_eq!(
        aliased.to_sql(),
        r#"SELECT * FROM "tasks" LEFT JOIN "users" "u" ON "tasks"."id" = "u"."task_id""#
    );
}

#[test]
fn test_join_explicit_on() {
    let q = SelectQuery::new(pg())
        .from("tasks")
        .inner_join("users")
        .on("tasks.user_id", "users.id")
        .cross_join("tags");
    assert_eq!(
        q.to_sql(),
        r#"SELECT * FROM "tasks" INNER JOIN "users" ON "tasks"."user_id" = "users"."id" CROSS JOIN "tags""#
    );
}

#[test]
fn test_on_without_join_fails_validation() {
    let q = SelectQuery::new(pg()).from("tasks").on("a", "b");
    assert_eq!(q.to_sql(), r#"SELECT * FROM "tasks""#);
    let err = q.validate().unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_retargeting_is_rejected() {
    let q = SelectQuery::new(pg()).from("users").from("posts");
    assert_eq!(q.target(), "users");
    assert!(q.validate().is_err());
}

#[test]
fn test_dialect_quoting() {
    let q = |conn: Connection| {
        SelectQuery::new(conn)
            .from("app.users")
            .column("users.first\"name")
            .to_sql()
    };
    assert_eq!(
        q(pg()),
        r#"SELECT "users"."first""name" FROM "app"."users""#
    );
    assert_eq!(
        q(Connection::offline(Dialect::Sqlite)),
        "SELECT `users`.`first\"name` FROM `app`.`users`"
    );
}

#[test]
fn test_placeholder_names_are_sanitized() {
    let built = SelectQuery::new(pg())
        .from("my-table")
        .where_eq("data->>'k'", 1)
        .build();
    assert_eq!(names(&built.params), vec![":my_table_data____k__0"]);
}

#[test]
fn test_union_placeholders_do_not_collide() {
    let built = SelectQuery::new(pg())
        .from("users")
        .column("id")
        .where_eq("role", "admin")
        .union(|q| q.from("users").column("id").where_eq("role", "owner"))
        .union_all(|q| q.from("guests").column("id"))
        .limit(5)
        .build();

    assert_eq!(
        built.sql,
        r#"SELECT "id" FROM "users" WHERE "role" = :users_role_0 UNION SELECT "id" FROM "users" WHERE "role" = :users_role_1 UNION ALL SELECT "id" FROM "guests" LIMIT :users_limit_2"#
    );
    assert_eq!(built.params.get(":users_role_1"), Some(&Value::from("owner")));
}

#[test]
fn test_to_raw_sql_replaces_whole_tokens() {
    let q = SelectQuery::new(pg()).from("t").where_in("x", 0..11);
    assert_eq!(
        q.to_raw_sql(),
        r#"SELECT * FROM "t" WHERE "x" IN (0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10)"#
    );

    let text = SelectQuery::new(pg()).from("t").where_eq("name", "O'Brien");
    assert_eq!(
        text.to_raw_sql(),
        r#"SELECT * FROM "t" WHERE "name" = 'O''Brien'"#
    );
}

#[test]
fn test_clean_resets_everything() {
    let q = SelectQuery::new(pg())
        .from("users")
        .distinct()
        .column("id")
        .where_eq("a", 1)
        .inner_join("posts")
        .group_by("a")
        .having_eq("a", 1)
        .order_asc("a")
        .limit(1)
        .union(|u| u.from("admins"))
        .clean();

    assert_eq!(q.to_sql(), "");
    assert!(q.parameters().is_empty());
    assert_eq!(q.from("posts").to_sql(), r#"SELECT * FROM "posts""#);
}

// ==================== INSERT ====================

#[test]
fn test_insert_multi_row() {
    let built = InsertQuery::new(pg())
        .into_table("users")
        .rows([
            Data::new().with("name", "ann").with("age", 30),
            Data::new().with("name", "bob").with("age", 41),
        ])
        .build();

    assert_eq!(
        built.sql,
        r#"INSERT INTO "users" ("name", "age") VALUES (:users_name_0, :users_age_1), (:users_name_2, :users_age_3)"#
    );
    assert_eq!(built.params.len(), 4);
    assert_eq!(built.params.get(":users_age_3"), Some(&Value::Int(41)));
}

#[test]
fn test_insert_missing_column_binds_null() {
    let built = InsertQuery::new(pg())
        .into_table("users")
        .values([("name", "ann"), ("email", "a@x")])
        .values([("name", "bob")])
        .build();
    assert_eq!(built.params.get(":users_email_3"), Some(&Value::Null));
}

#[test]
fn test_insert_default_values() {
    assert_eq!(
        InsertQuery::new(pg()).into_table("events").to_sql(),
        r#"INSERT INTO "events" DEFAULT VALUES"#
    );
    assert_eq!(
        InsertQuery::new(mysql()).into_table("events").to_sql(),
        "INSERT INTO `events` () VALUES ()"
    );
}

#[test]
fn test_insert_rejects_mixed_empty_rows() {
    let q = InsertQuery::new(pg())
        .into_table("events")
        .rows([Data::new(), Data::new().with("kind", "login")]);
    assert!(matches!(q.validate(), Err(Error::InvalidArgument(_))));

    let q = InsertQuery::new(pg())
        .into_table("events")
        .rows([Data::new().with("kind", "login"), Data::new()]);
    assert!(q.validate().is_err());

    let q = InsertQuery::new(pg()).into_table("events").values(Data::new());
    assert!(q.validate().is_ok());
}

#[test]
fn test_insert_rejects_blank_column() {
    let q = InsertQuery::new(pg()).into_table("users").set("", 1);
    assert!(matches!(q.validate(), Err(Error::InvalidArgument(_))));
}

// ==================== UPDATE ====================

#[test]
fn test_update_sql() {
    let q = UpdateQuery::new(pg())
        .table("users")
        .set([("name", "ann"), ("email", "a@x")])
        .where_eq("id", 7);
    assert_eq!(
        q.to_sql(),
        r#"UPDATE "users" SET "name" = :users_name_0, "email" = :users_email_1 WHERE "id" = :users_id_2"#
    );
    assert!(q.validate().is_ok());
}

#[test]
fn test_update_with_join() {
    let q = UpdateQuery::new(mysql())
        .table("posts")
        .inner_join("users")
        .on("posts.user_id", "users.id")
        .set_value("posts.hidden", true)
        .where_eq("users.banned", true);
    assert_eq!(
        q.to_sql(),
        "UPDATE `posts` INNER JOIN `users` ON `posts`.`user_id` = `users`.`id` SET `posts`.`hidden` = :posts_posts_hidden_0 WHERE `users`.`banned` = :posts_users_banned_1"
    );
}

#[test]
fn test_update_invalid_payloads() {
    let empty = UpdateQuery::new(pg()).table("users").where_eq("id", 1);
    assert!(matches!(empty.validate(), Err(Error::InvalidArgument(_))));
    assert!(matches!(empty.execute(), Err(Error::InvalidArgument(_))));

    let blank = UpdateQuery::new(pg()).table("users").set_value("", 1);
    assert!(blank.validate().is_err());

    assert!(Data::from_json(serde_json::json!(["a", "b"])).is_err());
}

// ==================== DELETE ====================

#[test]
fn test_delete_sql() {
    assert_eq!(
        DeleteQuery::new(pg()).from("users").where_eq("id", 3).to_sql(),
        r#"DELETE FROM "users" WHERE "id" = :users_id_0"#
    );
    assert_eq!(
        DeleteQuery::new(mysql())
            .from("posts")
            .inner_join("users")
            .on("posts.user_id", "users.id")
            .where_eq("users.banned", true)
            .to_sql(),
        "DELETE `posts` FROM `posts` INNER JOIN `users` ON `posts`.`user_id` = `users`.`id` WHERE `users`.`banned` = :posts_users_banned_0"
    );
}

// ==================== RAW ====================

#[test]
fn test_raw_is_verbatim() {
    let q = RawQuery::new(pg(), "SELECT  *\n FROM t WHERE a = :a").bind("a", 1);
    assert_eq!(q.to_sql(), "SELECT  *\n FROM t WHERE a = :a");
    assert_eq!(q.parameters().get(":a"), Some(&Value::Int(1)));
    assert_eq!(q.clean().to_sql(), "");
}

// ==================== Execution ====================

#[test]
fn test_execute_errors_before_the_driver() {
    let untargeted = SelectQuery::new(pg());
    assert!(matches!(untargeted.execute(), Err(Error::EmptyQuery)));

    let offline = DeleteQuery::new(pg()).from("users");
    assert!(matches!(offline.execute(), Err(Error::NoConnection)));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::row::Row;
    use crate::sqlite::SqliteExecutor;

    fn connect() -> Connection {
        let conn = Connection::new(SqliteExecutor::open_in_memory().unwrap());
        RawQuery::new(
            conn.clone(),
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT, qty INTEGER, price REAL)",
        )
        .execute()
        .unwrap();
        conn
    }

    #[test]
    fn test_round_trip() {
        let conn = connect();
        assert_eq!(conn.dialect(), Dialect::Sqlite);

        let inserted = InsertQuery::new(conn.clone())
            .into_table("items")
            .rows([
                Data::new().with("name", "bolt").with("qty", 10).with("price", 0.25),
                Data::new().with("name", "nut").with("qty", 0).with("price", 0.1),
                Data::new().with("name", "gear").with("qty", 3).with("price", 4.5),
            ])
            .execute()
            .unwrap();
        assert_eq!(inserted, 3);

        let in_stock = SelectQuery::new(conn.clone())
            .from("items")
            .column("name")
            .where_op("qty", Op::Gt, 0)
            .order_asc("name")
            .get::<Row>()
            .unwrap();
        let names: Vec<String> = in_stock
            .iter()
            .map(|r| r.try_get::<String>("name").unwrap())
            .collect();
        assert_eq!(names, vec!["bolt", "gear"]);

        let updated = UpdateQuery::new(conn.clone())
            .table("items")
            .set_value("qty", 5)
            .where_eq("name", "nut")
            .execute()
            .unwrap();
        assert_eq!(updated, 1);

        let total = SelectQuery::new(conn.clone())
            .from("items")
            .sum("qty", Some("total"))
            .value()
            .unwrap();
        assert_eq!(total, Some(Value::Int(18)));

        let deleted = DeleteQuery::new(conn.clone())
            .from("items")
            .where_between("price", 0.0, 1.0)
            .execute()
            .unwrap();
        assert_eq!(deleted, 2);

        let left = RawQuery::new(conn.clone(), "SELECT name FROM items WHERE qty > :min")
            .bind(":min", 1)
            .first::<Row>()
            .unwrap()
            .unwrap();
        assert_eq!(left.get("name"), Some(&Value::from("gear")));
    }

    #[test]
    fn test_insert_get_id() {
        let conn = connect();
        let id = InsertQuery::new(conn.clone())
            .into_table("items")
            .set("name", "cog")
            .insert_get_id()
            .unwrap();
        assert_eq!(id, Some(Value::Int(1)));
    }

    #[test]
    fn test_driver_errors_pass_through() {
        let conn = connect();
        let err = SelectQuery::new(conn)
            .from("missing_table")
            .get::<Row>()
            .unwrap_err();
        assert!(matches!(err, Error::Sqlite(_)));
    }
}
