use super::Fragment;
use crate::condition::RenderContext;
use crate::ident::Column;

/// GROUP BY columns.
#[derive(Debug, Clone, Default)]
pub struct GroupClause {
    columns: Vec<Column>,
}

impl GroupClause {
    pub fn push(&mut self, column: Column) {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl Fragment for GroupClause {
    fn render(&self, cx: &mut RenderContext<'_>) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| cx.dialect.quote_column(c))
            .collect();
        format!("GROUP BY {}", cols.join(", "))
    }

    fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn clear(&mut self) {
        self.columns.clear();
    }
}

/// GROUP BY chain methods.
pub trait GroupBy: Sized {
    fn group_clause(&mut self) -> &mut GroupClause;

    /// Called for every grouped column; selects add it to their column list.
    fn on_group_by(&mut self, _column: &Column) {}

    fn group_by(mut self, column: impl Into<Column>) -> Self {
        let column = column.into();
        self.on_group_by(&column);
        self.group_clause().push(column);
        self
    }
}
