//! Filter and predicate composition for observation datasets.
//!
//! Builders produce [`Predicate`] values over a normalized entity graph
//! (datasets joined with offerings, phenomena, procedures, features,
//! categories and platforms). Storage backends either translate them or
//! evaluate them directly against [`Row`] views.
//!
//! # Example
//!
//! ```rust
//! use obs_query::{DbQuery, FilterComposer};
//!
//! let mut query = DbQuery::default();
//! query.phenomena.insert("12".to_string());
//!
//! let predicate = FilterComposer::match_filters(&query);
//! assert!(predicate.to_string().contains("phenomenon.id IN (12)"));
//! ```

pub mod builders;
pub mod filter;
pub mod predicate;

pub use builders::{parse_ids, DatasetPredicates, EntityPredicates, ObservationPredicates};
pub use filter::{DbQuery, FilterComposer};
pub use predicate::{
    Cell, Column, DatasetSubquery, Key, NoSubqueries, Predicate, Row, SubqueryResolver, ValueSet,
};
