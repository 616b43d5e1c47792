//! Persistence as tables needs to have the following components
//! - Value (a single JSON scalar)
//! - Row (one value per key, order is important)
//! - Table (named keys and the rows under them)
//! - TableStore (every table of one store file, plus timestamps)
//! - DurableStore (loads and saves a whole TableStore)
//!

//  All modules of this lib
mod file;
mod row;
mod store;
mod table;
mod value;

//  External API
pub use file::{DurableStore, JsonFile};
pub use row::Row;
pub use store::TableStore;
pub use table::Table;
pub use value::Value;
