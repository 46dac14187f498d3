//! Helpers over prepared tables and the consolidated dataset.
//!
//! Currently implemented:
//!
//! - [`temporal_mask()`] / [`filter_rows()`]: select rows of a prepared table by year and/or month
//! - [`reduce()`]: common reductions (count/sum/min/max/mean) over a consolidated column
//! - [`column_info()`]: count, null count, distinct count and numeric statistics of a column
//!
//! ## Example: filter by period, consolidate, reduce
//!
//! ```rust
//! use rust_data_consolidation::consolidate::{consolidate, ConsolidateOptions};
//! use rust_data_consolidation::prepare::prepare_table;
//! use rust_data_consolidation::processing::{filter_rows, reduce, temporal_mask, ReduceOp};
//! use rust_data_consolidation::types::{Cell, RawTable};
//!
//! # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
//! let raw = RawTable::new(
//!     "vendas.csv",
//!     vec!["Data".to_string(), "Quantidade".to_string()],
//!     vec![
//!         vec![Cell::text("2024-01-15"), Cell::text("2")],
//!         vec![Cell::text("2024-02-20"), Cell::text("3")],
//!         vec![Cell::text("2024-01-30"), Cell::text("4")],
//!     ],
//! );
//! let table = prepare_table(raw)?;
//!
//! // January only.
//! let mask = temporal_mask(&table, Some(2024), Some(1)).unwrap();
//! let january = prepare_table(filter_rows(&table, &mask))?;
//!
//! let ds = consolidate(&[january], &ConsolidateOptions::default())?;
//! assert_eq!(reduce(&ds, "Quantidade", ReduceOp::Sum), Some(Cell::Float64(6.0)));
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod reduce;

pub use filter::{filter_rows, temporal_mask};
pub use reduce::{ColumnInfo, NumericProfile, ReduceOp, column_info, reduce};
