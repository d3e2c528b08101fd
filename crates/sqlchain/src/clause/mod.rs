//! Clause accumulators and the chain traits that feed them.
//!
//! Every statement builder owns one accumulator per clause it supports
//! (`WhereClause`, `JoinClause`, ...) and implements the matching chain trait
//! by handing out a mutable reference to it. Scoped sub-builders
//! ([`WhereGroup`], [`HavingGroup`]) implement only their own trait, so a
//! closure building a nested group cannot reach unrelated statement methods.

mod aggregate;
mod filter;
mod group;
mod having;
mod join;
mod order;

pub use aggregate::{AggregateClause, AggregateKind, Aggregates};
pub use filter::{Where, WhereClause, WhereGroup};
pub use group::{GroupBy, GroupClause};
pub use having::{Having, HavingClause, HavingGroup};
pub use join::{Join, JoinClause, JoinEntry, JoinKind, JoinOn};
pub use order::{Direction, OrderBy, OrderClause};

use crate::condition::RenderContext;

/// A piece of a statement that renders to SQL and contributes parameters.
pub trait Fragment {
    /// Render the fragment, keyword included. Empty state renders `""`.
    fn render(&self, cx: &mut RenderContext<'_>) -> String;

    fn is_empty(&self) -> bool;

    fn clear(&mut self);
}
