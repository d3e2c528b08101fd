//! Example demonstrating sqlchain models: persistence, scopes, relations
//! and soft deletes.
//!
//! Run with:
//!   cargo run --example models -p sqlchain
//!
//! Uses an in-memory SQLite database.

use sqlchain::prelude::*;

// ─── Models ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Author {
    id: Option<i64>,
    name: String,
    active: bool,
}

impl FromRow for Author {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Author {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
        })
    }
}

fn active(q: ModelQuery<Author>) -> ModelQuery<Author> {
    q.where_eq("active", true)
}

impl Model for Author {
    fn attributes(&self) -> Data {
        Data::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("active", self.active)
    }

    fn set_id(&mut self, id: Value) {
        self.id = id.as_i64();
    }

    fn scopes() -> Vec<(&'static str, Scope<Self>)> {
        vec![("active", active as Scope<Self>)]
    }
}

#[derive(Debug, Clone)]
struct Post {
    id: Option<i64>,
    author_id: i64,
    title: String,
    views: i64,
}

impl FromRow for Post {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Post {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            title: row.try_get("title")?,
            views: row.try_get("views")?,
        })
    }
}

impl Model for Post {
    const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
    const TIMESTAMPS: bool = true;

    fn attributes(&self) -> Data {
        Data::new()
            .with("id", self.id)
            .with("author_id", self.author_id)
            .with("title", self.title.as_str())
            .with("views", self.views)
    }

    fn set_id(&mut self, id: Value) {
        self.id = id.as_i64();
    }
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn connect() -> Result<Connection> {
    let conn = Connection::new(SqliteExecutor::open_in_memory()?);
    for sql in [
        "CREATE TABLE authors (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, active INTEGER NOT NULL)",
        "CREATE TABLE posts (id INTEGER PRIMARY KEY AUTOINCREMENT, author_id INTEGER NOT NULL, title TEXT NOT NULL, views INTEGER NOT NULL DEFAULT 0, created_at TEXT, updated_at TEXT, deleted_at TEXT)",
    ] {
        conn.query().raw(sql).execute()?;
    }
    Ok(conn)
}

fn main() -> Result<()> {
    let conn = connect()?;

    let mut ann = Author {
        id: None,
        name: "ann".into(),
        active: true,
    };
    ann.save(&conn)?;
    Author::create(&conn, [("name", Value::from("bob")), ("active", Value::from(false))])?;
    println!("created authors, ann has id {:?}", ann.id);

    for (title, views) in [("hello", 10), ("again", 25), ("draft", 0)] {
        let mut post = Post {
            id: None,
            author_id: ann.id.unwrap_or_default(),
            title: title.into(),
            views,
        };
        post.save(&conn)?;
    }

    // Scopes and aggregates
    let actives = Author::query(&conn).scope("active")?.get()?;
    println!("active authors: {:?}", actives.iter().map(|a| &a.name).collect::<Vec<_>>());
    println!("total views: {}", Post::query(&conn).sum("views")?);
    println!("popular posts: {}", Post::query(&conn).where_op("views", Op::Gt, 5).count()?);

    if let Err(err) = Author::query(&conn).scope("actve") {
        println!("scope lookup: {err}");
    }

    // Relations
    let posts = ann.has_many::<Post>(&conn, None, None).order_desc("views").get()?;
    for post in &posts {
        let author: Option<Author> = post.belongs_to(&conn, None)?;
        println!(
            "{} ({} views) by {}",
            post.title,
            post.views,
            author.map(|a| a.name).unwrap_or_default()
        );
    }
    let idle = Author::query(&conn).where_doesnt_have::<Post>().get()?;
    println!("authors without posts: {}", idle.len());

    // Soft deletes
    Post::query(&conn).where_eq("title", "draft").delete()?;
    println!("visible posts: {}", Post::query(&conn).count()?);
    println!("trashed posts: {}", Post::query(&conn).only_trashed().count()?);
    Post::query(&conn).only_trashed().restore()?;
    println!("after restore: {}", Post::query(&conn).count()?);

    // Lookups
    let found = Post::find_or_fail(&conn, 1)?;
    println!("post #1 is {:?}", found.title);
    match Post::find_or_fail(&conn, 99) {
        Ok(_) => println!("post #99 exists"),
        Err(err) => println!("post #99: {err}"),
    }

    Ok(())
}
