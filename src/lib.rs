//! # Polylut
//! ## Piecewise polynomial lookup tables, sized to a tolerance
//!
//! Evaluating `exp`, `erf` or some expensive special function millions of times is slow.
//! A lookup table splits the domain into small subintervals, fits a low-order polynomial on
//! each one ahead of time, and afterwards evaluates with one multiply-add hash and one
//! Horner pass.
//!
//! The hard part is choosing the grid. This crate does it for you:
//! - Pick how each subinterval is fitted (interpolation, Taylor, Hermite, Padé, ...)
//! - Ask for a tolerance, or a memory budget, and get the coarsest grid that meets it
//! - Optionally put more subintervals where the function is steep
//! - Save the result as JSON and load it back bit-for-bit
//!
//! ```rust
//! use polylut::{FunctionContainer, Generator, LookupTable, TableRegistry};
//!
//! let func = FunctionContainer::new(f64::exp)
//!     .with_derivatives(7, |x, out: &mut [f64]| out.fill(x.exp()))
//!     .unwrap();
//! let generator: Generator<f64> = Generator::new(TableRegistry::standard(), func, -3.0, 3.0);
//!
//! // The largest step whose worst-case error is within 1e-6
//! let kind = "UniformTaylorTable<4>".parse().unwrap();
//! let table = generator.by_tolerance_abs(kind, 1e-6).unwrap();
//!
//! let x = 1.2345;
//! assert!((table.evaluate(x) - x.exp()).abs() < 1e-5);
//! ```
//!
//! # Core Concepts
//! - The function being approximated is a [`FunctionContainer`]: `f` itself, plus an optional
//!   oracle for its derivatives. Taylor, Hermite, Padé tables and nonuniform grids need one.
//! - A table kind ([`TableKind`]) is a fitting [`Strategy`] on a [`GridKind`]:
//!     - [`GridKind::Uniform`] grids hash with a single multiply.
//!     - [`GridKind::NonUniform`] grids hash through a cubic [`TransferFunction`] that places
//!       more subintervals where `f` is steep.
//! - A [`Table`] stores one [`Polynomial`] per subinterval. [`LookupTable`] is its object-safe
//!   interface, so tables of different orders can be boxed together.
//! - A [`TableRegistry`] is the set of kinds a program builds, and turns a kind into a table.
//! - The [`ErrorEstimator`] measures the worst-case error of a table against `f`, in a wider type
//!   if you like.
//! - The [`Generator`] chooses the step size from a tolerance, a byte budget, or a file.
//! - [`FailureProofTable`] makes any argument safe by falling back to `f` outside the domain.
//! - [`CompositeTable`] joins tables built over adjacent subdomains, each with its own kind and step.
//!
//! # Testing utilities
//!
//! The assertion macros used throughout the crate's own tests are exported in [`test`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // Interval counts are nowhere near 2^52
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod test;

pub mod error;
pub mod solvers;
pub mod value;

mod composite;
mod estimate;
mod failure_proof;
mod function;
mod generator;
mod polynomial;
mod registry;
mod strategy;
mod table;
mod transfer;

#[cfg(feature = "plotting")]
mod plotting;

pub use composite::CompositeTable;
pub use error::{Error, Result};
pub use estimate::{ErrorEstimator, WorstCase};
pub use failure_proof::{ArgumentRecord, ArgumentSummary, FailureProofTable};
pub use function::{FunctionContainer, MAX_DERIVATIVE_ORDER};
pub use generator::{Generator, Request, SearchOptions};
pub use polynomial::Polynomial;
pub use registry::{Strategy, TableKind, TableRegistry, MAX_DEGREE};
pub use table::{
    EntryRecord, Grid, GridKind, LookupTable, LookupTableParameters, Table, TableRecord, MAX_INTERVALS,
    RECORD_COMMENT,
};
pub use transfer::TransferFunction;

pub use nalgebra;
pub use num_traits;
