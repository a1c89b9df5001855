//! Generic filterable, sortable, paginated table with row selection.

pub mod cells;
pub mod error;
pub mod filter;
pub mod order;
pub mod query;
pub mod state;
pub mod types;
pub mod view;

pub use error::TableError;
pub use query::{SelectLink, TableLinks, TableQuery};
pub use state::Table;
pub use types::{Cell, CellAction, ColumnSpec, FilterKind, SortDirection};
pub use view::TableView;
