use super::Fragment;
use crate::condition::RenderContext;
use crate::ident::Column;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// ORDER BY entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OrderClause {
    entries: Vec<(Column, Direction)>,
}

impl OrderClause {
    /// Add an entry; ordering an existing column again replaces its direction.
    pub fn push(&mut self, column: Column, direction: Direction) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = direction,
            None => self.entries.push((column, direction)),
        }
    }

    pub fn entries(&self) -> &[(Column, Direction)] {
        &self.entries
    }
}

impl Fragment for OrderClause {
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|(c, d)| format!("{} {}", cx.dialect.quote_column(c), d.as_sql()))
            .collect();
        format!("ORDER BY {}", items.join(", "))
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// ORDER BY chain methods.
pub trait OrderBy: Sized {
    fn order_clause(&mut self) -> &mut OrderClause;

    fn order_by(mut self, column: impl Into<Column>, direction: Direction) -> Self {
        self.order_clause().push(column.into(), direction);
        self
    }

    fn order_asc(self, column: impl Into<Column>) -> Self {
        self.order_by(column, Direction::Asc)
    }

    fn order_desc(self, column: impl Into<Column>) -> Self {
        self.order_by(column, Direction::Desc)
    }
}
