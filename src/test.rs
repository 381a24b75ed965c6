//! Assertion macros for checking tables against the functions they approximate.
//!
//! # Macros
//!
//! ### [`crate::assert_close`]
//! Asserts that two floating-point values are approximately equal.
//! - Uses a small multiple of machine epsilon, relative to the magnitude of the values, unless a tolerance is given.
//! - `assert_eq!` equivalent for floats.
//!
//! ### [`crate::assert_all_close`]
//! Element-wise [`crate::assert_close`] over two slices.
//!
//! ### [`crate::assert_table_matches`]
//! Samples a table over its domain and asserts that it stays within an absolute tolerance of a reference function.
//! On failure, reports the worst sample point so you can tell a bad fit from a bad hash.
//!
//! ```rust
//! use polylut::{assert_table_matches, FunctionContainer, LookupTableParameters, TableKind, TableRegistry};
//!
//! let registry = TableRegistry::standard();
//! let func = FunctionContainer::new(f64::sin);
//! let kind: TableKind = "UniformEqSpaceInterpTable<3>".parse().unwrap();
//! let table = registry.create(kind, &func, LookupTableParameters::new(0.0, 3.0, 0.01)).unwrap();
//!
//! assert_table_matches!(table, f64::sin, 1e-9);
//! ```
mod assertions;
