//! FILENAME: core/pivot-engine/src/lib.rs
//! Statistics pivot subsystem.
//!
//! Turns the recorder's per-entity series into one wide table and derives
//! the column schema the serializers write. Depends on `engine` for the
//! shared data model.
//!
//! Layers:
//! - `engine`: series to table (HOW rows are joined)
//! - `schema`: table to column specs (WHAT the columns are)

pub mod engine;
pub mod schema;

pub use engine::{pivot_series, PivotError};
pub use schema::infer_columns;
