//! In-memory labeled tables
//!
//! `lf_core` holds typed [`Column`]s in a [`Table`] that shares one row
//! [`Index`], and the transformations over them: masks and slicing, sorting,
//! ranking, grouping, pivoting and merging.
//!
//! ```
//! use lf_core::{Column, Table};
//!
//! let table = Table::from_columns([
//!     Column::string("city", ["Oslo", "Lima", "Oslo"]),
//!     Column::int("sales", vec![3, 5, 4]),
//! ])
//! .unwrap();
//!
//! let totals = table.groupby(&["city"]).unwrap().agg("sum".parse().unwrap()).unwrap();
//! assert_eq!(totals.nrows(), 2);
//! ```

pub mod data;

pub use data::{
    AggFunc, CmpOp, Column, DType, DataError, GroupOptions, Index, JoinType, MeltOptions,
    MergeOptions, Predicate, RankMethod, RankOptions, Result, Table, TableBuilder, Value,
};
