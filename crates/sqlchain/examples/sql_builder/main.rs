//! Example demonstrating sqlchain's statement builders.
//!
//! Run with:
//!   cargo run --example sql_builder -p sqlchain
//!
//! No database is needed: every statement is built against an offline
//! connection and printed with its parameters.

use sqlchain::BuiltQuery;
use sqlchain::prelude::*;

fn show(label: &str, built: &BuiltQuery) {
    println!("[{label}]");
    println!("  SQL:    {}", built.sql);
    for (name, value) in built.params.iter() {
        println!("  {name} = {}", value.to_sql_literal());
    }
    println!("  raw:    {}", built.to_raw_sql());
    println!();
}

// ─── SELECT ─────────────────────────────────────────────────────────────────

fn demo_select(conn: &Connection) {
    let q = conn
        .table("users")
        .select(["id", "name", "email"])
        .where_eq("status", "active")
        .where_group(|g| g.where_null("banned_at").or_where_op("karma", Op::Gt, 100))
        .where_in("role", ["admin", "editor"])
        .order_desc("created_at")
        .page(2, 20);
    show("select", &q.build());
}

fn demo_aggregate(conn: &Connection) {
    let q = conn
        .table("orders")
        .select_all()
        .group_by("customer_id")
        .sum("total", Some("revenue"))
        .count_all(Some("orders"))
        .having_op("revenue", Op::Gt, 1000);
    show("aggregate", &q.build());
}

fn demo_join(conn: &Connection) {
    let q = conn
        .table("tasks")
        .select(["tasks.title", "users.name"])
        .left_join("users")
        .on("tasks.user_id", "users.id")
        .where_not_null("tasks.due_at");
    show("join", &q.build());
}

fn demo_union(conn: &Connection) {
    let q = conn
        .table("customers")
        .select(["email"])
        .union(|u| u.from("subscribers").column("email"));
    show("union", &q.build());
}

// ─── Writes ─────────────────────────────────────────────────────────────────

fn demo_writes(conn: &Connection) {
    let insert = conn.table("users").insert_many([
        [("name", Value::from("ann")), ("age", Value::from(30))],
        [("name", Value::from("bob")), ("age", Value::from(41))],
    ]);
    show("insert", &insert.build());

    let update = conn
        .table("users")
        .update()
        .set_value("status", "inactive")
        .where_op("last_login", Op::Lt, "2024-01-01");
    show("update", &update.build());

    let delete = conn.table("sessions").delete().where_op("expires_at", Op::Lt, "2024-01-01");
    show("delete", &delete.build());
}

fn demo_raw(conn: &Connection) {
    let q = conn
        .query()
        .raw("SELECT * FROM users WHERE id = :id OR parent_id = :id")
        .bind(":id", 7);
    show("raw", &q.build());
}

// ─── Validation ─────────────────────────────────────────────────────────────

fn demo_validation(conn: &Connection) {
    let broken = conn
        .table("users")
        .select_all()
        .where_cmp("age", "~~", 3);
    match broken.validate() {
        Ok(()) => println!("[validation] unexpectedly valid"),
        Err(err) => println!("[validation] {err}"),
    }
    println!();
}

fn main() -> Result<()> {
    for dialect in [Dialect::Postgres, Dialect::MySql] {
        println!("==================== {dialect:?} ====================\n");
        let conn = Connection::offline(dialect);
        demo_select(&conn);
        demo_aggregate(&conn);
        demo_join(&conn);
        demo_union(&conn);
        demo_writes(&conn);
        demo_raw(&conn);
        demo_validation(&conn);
    }
    Ok(())
}
