//! The query and modification engine.
//!
//! Pure functions over a [`crate::persistence::TableStore`]. The engine knows
//! nothing about queues, sessions or files: callers hand it a store they
//! already hold exclusively and decide themselves when to persist.

mod lookup;
mod modify;
mod query;

pub use lookup::{get, get_all};
pub use modify::{init_table, modify};
pub use query::{
    InitTableArgs, LookupQuery, ModificationKind, ModificationQuery, ModifyOutcome, Predicate,
};
