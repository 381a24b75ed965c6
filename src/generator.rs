//! Building tables from a goal instead of a grid.
//!
//! A [`Generator`] holds the function and domain, and picks the step size for a table kind
//! from what the caller actually cares about:
//! - [`Generator::by_step`]: the step is given.
//! - [`Generator::by_tolerance`]: the coarsest step whose worst-case error is within a tolerance.
//! - [`Generator::by_size`]: the step whose table takes up a given number of bytes.
//! - [`Generator::by_file`] / [`Generator::write_through`]: a table persisted earlier.
//!
//! ```rust
//! use polylut::{FunctionContainer, Generator, TableRegistry};
//!
//! let func = FunctionContainer::new(f64::exp);
//! let generator: Generator<f64> = Generator::new(TableRegistry::standard(), func, -1.0, 1.0);
//!
//! let kind = "UniformChebyInterpTable<3>".parse().unwrap();
//! let table = generator.by_tolerance_abs(kind, 1e-8).unwrap();
//! assert!(generator.error_at_step(kind, table.step_size()).unwrap() <= 1e-8);
//! ```
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::estimate::ErrorEstimator;
use crate::function::FunctionContainer;
use crate::registry::{TableKind, TableRegistry};
use crate::solvers::{bracketed_root, ScalarOptions};
use crate::table::{LookupTable, LookupTableParameters, TableRecord};
use crate::value::{SteppedValues, Value};

/// Samples per subinterval written by [`Generator::plot_at`]
const PLOT_SAMPLES_PER_STEP: usize = 100;

/// Limits of the step-size search in [`Generator::by_tolerance`]
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions<E: Value> {
    /// Tables built before giving up
    pub max_iter: usize,

    /// The search stops once the bracket on the step size is this narrow, relative to the step
    pub step_rtol: E,
}

impl<E: Value> Default for SearchOptions<E> {
    fn default() -> Self {
        Self {
            max_iter: 50,
            step_rtol: <E as num_traits::float::FloatCore>::epsilon().sqrt(),
        }
    }
}

/// What a table should satisfy; see [`Generator::generate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request<T: Value, E: Value = f64> {
    /// Exactly this step size
    Step(T),

    /// Worst-case error within `abs`, with `rel` weighting large values of `f`
    Tolerance {
        /// Absolute tolerance
        abs: E,

        /// Relative tolerance
        rel: E,
    },

    /// About this many bytes of coefficients
    Size(usize),
}

/// Builds tables of one function over one domain.
///
/// `T` is the table's type. `E` is the type errors are measured in, and should be at least
/// as wide as `T`.
///
/// `E` defaults to `f64`. An `f32` table is then measured with extra precision, but an `f64`
/// table is not: errors within a few ulps of `f` are lost in rounding. For tolerances that
/// tight, give the estimator a more accurate reference through
/// [`ErrorEstimator::with_reference`] and pass it in with [`Generator::with_estimator`].
#[derive(Debug, Clone)]
pub struct Generator<T: Value, E: Value = f64> {
    registry: TableRegistry,
    func: FunctionContainer<T>,
    min_arg: T,
    max_arg: T,
    estimator: ErrorEstimator<E>,
    search: SearchOptions<E>,
}

impl<T: Value, E: Value> Generator<T, E> {
    /// A generator for tables of `func` over `[min_arg, max_arg]`
    pub fn new(registry: TableRegistry, func: FunctionContainer<T>, min_arg: T, max_arg: T) -> Self {
        Self {
            registry,
            func,
            min_arg,
            max_arg,
            estimator: ErrorEstimator::new(E::one()),
            search: SearchOptions::default(),
        }
    }

    /// Uses `estimator` (its minimizer options and reference function) for every error
    /// measurement; the relative tolerance is set per call.
    #[must_use]
    pub fn with_estimator(mut self, estimator: ErrorEstimator<E>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Replaces the limits of the tolerance search
    #[must_use]
    pub fn with_search(mut self, search: SearchOptions<E>) -> Self {
        self.search = search;
        self
    }

    /// The function tables are built from
    pub fn func(&self) -> &FunctionContainer<T> {
        &self.func
    }

    /// The kinds this generator can build
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Lower end of the domain
    pub fn min_arg(&self) -> T {
        self.min_arg
    }

    /// Upper end of the domain
    pub fn max_arg(&self) -> T {
        self.max_arg
    }

    fn params(&self, step_size: T) -> LookupTableParameters<T> {
        LookupTableParameters::new(self.min_arg, self.max_arg, step_size)
    }

    fn span(&self) -> T {
        self.max_arg - self.min_arg
    }

    /// Builds the table that meets `request`
    ///
    /// # Errors
    /// Whatever the corresponding `by_*` method returns.
    pub fn generate(&self, kind: TableKind, request: Request<T, E>) -> Result<Box<dyn LookupTable<T>>> {
        match request {
            Request::Step(step_size) => self.by_step(kind, step_size),
            Request::Tolerance { abs, rel } => self.by_tolerance(kind, abs, rel),
            Request::Size(bytes) => self.by_size(kind, bytes),
        }
    }

    /// Builds a table with the given step size.
    ///
    /// # Errors
    /// - [`Error::UnknownTable`] if `kind` is not in the registry.
    /// - [`Error::InvalidArgument`] if the step size or domain is invalid.
    /// - [`Error::MissingDerivative`] if the function lacks derivatives `kind` needs.
    pub fn by_step(&self, kind: TableKind, step_size: T) -> Result<Box<dyn LookupTable<T>>> {
        self.registry.create(kind, &self.func, self.params(step_size))
    }

    /// Builds the table with the largest step size whose worst-case error is within `a_tol`.
    ///
    /// The error is measured as `|f - L| / (1 + (r_tol / a_tol) |f|)`, so `r_tol` loosens the
    /// requirement where `|f|` is large. The error is assumed to grow with the step size; the
    /// search brackets the step between 0 and the whole domain and narrows it with
    /// [`bracketed_root`].
    ///
    /// Running out of iterations is only a warning: the finest table that was checked to be
    /// within tolerance is returned.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `a_tol` is not positive or `r_tol` is negative.
    /// - [`Error::NonConvergence`] if no step size at all was found within tolerance.
    /// - Any error from building a table, see [`Generator::by_step`].
    pub fn by_tolerance(&self, kind: TableKind, a_tol: E, r_tol: E) -> Result<Box<dyn LookupTable<T>>> {
        if !(a_tol > E::zero()) || !num_traits::float::FloatCore::is_finite(a_tol) {
            return Err(Error::invalid(format!("absolute tolerance must be positive, got {a_tol:e}")));
        }
        if !(r_tol >= E::zero()) {
            return Err(Error::invalid(format!("relative tolerance must not be negative, got {r_tol:e}")));
        }
        self.registry.check(kind)?;

        let estimator = self.estimator.clone().with_rel_tol(r_tol / a_tol);
        let span = self.span();

        // High order tables on small domains often need just one subinterval
        let coarsest = self.by_step(kind, span)?;
        let coarse_error = estimator.worst_case_error(coarsest.as_ref(), &self.func)?;
        log::debug!("{kind}: error {coarse_error:e} at step {span:e}");
        if coarse_error <= a_tol {
            log::info!("{kind}: step {span:e} (whole domain) meets tolerance {a_tol:e}");
            return Ok(coarsest);
        }

        let mut best: Option<(E, Box<dyn LookupTable<T>>)> = None;
        let g = |step: E| -> Result<E> {
            let table = self.by_step(kind, T::try_cast(step)?)?;
            let error = estimator.worst_case_error(table.as_ref(), &self.func)?;
            log::debug!("{kind}: error {error:e} at step {step:e}");
            if error <= a_tol {
                best = Some((error, table));
            }
            Ok(error - a_tol)
        };

        let options = ScalarOptions {
            max_iter: self.search.max_iter,
            tol: <E as num_traits::float::FloatCore>::min_positive_value(),
            rtol: self.search.step_rtol,
        };
        let span_e = E::try_cast(span)?;
        let search = bracketed_root(g, E::zero(), span_e, -a_tol, coarse_error - a_tol, options)?;

        let Some((error, table)) = best else {
            return Err(Error::NonConvergence {
                iterations: search.iterations,
                error: num_traits::cast(search.function_value + a_tol).unwrap_or(f64::NAN),
                tolerance: num_traits::cast(a_tol).unwrap_or(f64::NAN),
            });
        };

        if !search.converged {
            log::warn!(
                "{kind}: step search stopped after {} iterations with bracket [{:e}, {:e}]; \
                 returning step {:e} with error {error:e} for tolerance {a_tol:e}",
                search.iterations,
                search.bracket.0,
                search.bracket.1,
                table.step_size()
            );
        }
        log::info!(
            "{kind}: step {:e} meets tolerance {a_tol:e} (error {error:e}, {} iterations)",
            table.step_size(),
            search.iterations
        );
        Ok(table)
    }

    /// [`Generator::by_tolerance`] with `tol` as both the absolute and relative tolerance
    ///
    /// # Errors
    /// See [`Generator::by_tolerance`].
    pub fn by_tolerance_abs(&self, kind: TableKind, tol: E) -> Result<Box<dyn LookupTable<T>>> {
        self.by_tolerance(kind, tol, tol)
    }

    /// Builds a table taking up about `bytes` bytes.
    ///
    /// Two probe tables, with 2 and 10 subintervals, fix a linear model of size against
    /// subinterval count; the step size comes from that model. The result is not checked
    /// against `bytes`, and is off by at most an entry or so.
    ///
    /// # Errors
    /// - [`Error::DegenerateProbes`] if both probes have the same size.
    /// - [`Error::InvalidArgument`] if `bytes` is too small for any table.
    /// - Any error from building a table, see [`Generator::by_step`].
    pub fn by_size(&self, kind: TableKind, bytes: usize) -> Result<Box<dyn LookupTable<T>>> {
        let span = self.span();
        let probe = |intervals: usize| -> Result<(T, T)> {
            let table = self.by_step(kind, span / T::from_positive_int(intervals))?;
            Ok((T::try_cast(table.num_intervals())?, T::try_cast(table.data_size())?))
        };
        let (n1, s1) = probe(2)?;
        let (n2, s2) = probe(10)?;

        if s1 == s2 || n1 == n2 {
            return Err(Error::DegenerateProbes {
                size: s1.as_usize().unwrap_or(0),
            });
        }

        let per_interval = (s2 - s1) / (n2 - n1);
        let intervals = n1 + (T::try_cast(bytes)? - s1) / per_interval;
        let step_size = span / intervals;
        if !(step_size > T::zero()) || !num_traits::float::FloatCore::is_finite(step_size) {
            return Err(Error::invalid(format!(
                "requested memory size is too small: {bytes} bytes for {kind}"
            )));
        }

        log::info!("{kind}: step {step_size:e} for about {bytes} bytes");
        self.by_step(kind, step_size)
    }

    /// Loads a table persisted with [`LookupTable::save`].
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `path` does not end in `.json`.
    /// - [`Error::Io`] or [`Error::Json`] if the file cannot be read or parsed.
    /// - [`Error::NameMismatch`] if the file holds a different kind of table.
    pub fn by_file(&self, kind: TableKind, path: impl AsRef<Path>) -> Result<Box<dyn LookupTable<T>>> {
        let path = path.as_ref();
        require_json(path)?;

        let record = TableRecord::load(path)?;
        let expected = kind.to_string();
        if record.name != expected {
            return Err(Error::NameMismatch {
                expected,
                found: record.name,
            });
        }

        log::info!("{kind}: loaded from {}", path.display());
        self.registry.load(&record)
    }

    /// Loads the table at `path` if the file exists; otherwise builds it to `request` and
    /// saves it there.
    ///
    /// # Errors
    /// See [`Generator::by_file`] and [`Generator::generate`].
    pub fn write_through(
        &self,
        kind: TableKind,
        request: Request<T, E>,
        path: impl AsRef<Path>,
    ) -> Result<Box<dyn LookupTable<T>>> {
        let path = path.as_ref();
        require_json(path)?;
        if path.exists() {
            return self.by_file(kind, path);
        }

        log::info!("{kind}: no table at {}, generating", path.display());
        let table = self.generate(kind, request)?;
        table.save(path)?;
        Ok(table)
    }

    /// Worst-case error of the table with the given step size, relative tolerance 1
    ///
    /// # Errors
    /// Any error from building the table, see [`Generator::by_step`].
    pub fn error_at_step(&self, kind: TableKind, step_size: T) -> Result<E> {
        self.error_at_step_with(kind, step_size, E::one())
    }

    /// Worst-case error of the table with the given step size, measured as
    /// `|f - L| / (1 + rel_tol |f|)`. A `rel_tol` of 0 gives the plain absolute error.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `rel_tol` is negative or not finite.
    /// - Any error from building the table, see [`Generator::by_step`].
    pub fn error_at_step_with(&self, kind: TableKind, step_size: T, rel_tol: E) -> Result<E> {
        if rel_tol < E::zero() || !num_traits::float::FloatCore::is_finite(rel_tol) {
            return Err(Error::invalid(format!("relative tolerance {rel_tol:e} must be finite and non-negative")));
        }

        let table = self.by_step(kind, step_size)?;
        self.estimator
            .clone()
            .with_rel_tol(rel_tol)
            .worst_case_error(table.as_ref(), &self.func)
    }

    /// Writes `x f(x) L(x)` rows every `step_size / 100` over the domain, for plotting
    /// with external tools.
    ///
    /// # Errors
    /// - Any error from building the table, see [`Generator::by_step`].
    /// - [`Error::Io`] if writing fails.
    pub fn plot_at(&self, kind: TableKind, step_size: T, mut writer: impl Write) -> Result<()> {
        let table = self.by_step(kind, step_size)?;
        writeln!(writer, "# x func impl")?;
        for (x, exact, approx) in self.samples(table.as_ref(), step_size) {
            writeln!(writer, "{x} {exact} {approx}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders `f`, the table, and their absolute difference to an SVG file
    ///
    /// # Errors
    /// - Any error from building the table, see [`Generator::by_step`].
    /// - [`Error::Plotting`] if rendering fails.
    #[cfg(feature = "plotting")]
    pub fn plot_svg(&self, kind: TableKind, step_size: T, path: impl AsRef<Path>) -> Result<()> {
        let table = self.by_step(kind, step_size)?;
        let samples: Vec<(f64, f64, f64)> = self
            .samples(table.as_ref(), step_size)
            .map(|(x, exact, approx)| {
                let cast = |v: T| num_traits::cast::<T, f64>(v).unwrap_or(f64::NAN);
                (cast(x), cast(exact), cast(approx))
            })
            .collect();
        crate::plotting::render(path.as_ref(), &kind.to_string(), &samples)
    }

    fn samples<'t>(
        &'t self,
        table: &'t dyn LookupTable<T>,
        step_size: T,
    ) -> impl Iterator<Item = (T, T, T)> + 't {
        let spacing = step_size / T::from_positive_int(PLOT_SAMPLES_PER_STEP);
        SteppedValues::new(self.min_arg..=self.max_arg, spacing)
            .map(move |x| (x, self.func.call(x), table.evaluate(x)))
    }
}

fn require_json(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(()),
        _ => Err(Error::invalid(format!(
            "table files must have a .json extension: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::assert_close;
    use crate::registry::Strategy;

    fn exp() -> FunctionContainer<f64> {
        FunctionContainer::new(f64::exp)
            .with_derivatives(7, |x, out: &mut [f64]| out.fill(x.exp()))
            .unwrap()
    }

    fn generator(min: f64, max: f64) -> Generator<f64> {
        Generator::new(TableRegistry::standard(), exp(), min, max)
    }

    fn cubic() -> TableKind {
        TableKind::uniform(Strategy::EqSpace { degree: 3 })
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("polylut-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_by_step() {
        let table = generator(-3.0, 3.0).by_step(cubic(), 0.5).unwrap();
        assert_eq!(table.num_intervals(), 12);
        assert_eq!(table.name(), "UniformEqSpaceInterpTable<3>");

        assert!(matches!(
            generator(-3.0, 3.0).by_step(cubic(), 0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            generator(-3.0, 3.0).by_step(cubic(), -1.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_by_tolerance_meets_tolerance() {
        let _ = env_logger::builder().is_test(true).try_init();
        let generator = generator(-3.0, 3.0);
        let table = generator.by_tolerance_abs(cubic(), 1e-6).unwrap();

        let error = ErrorEstimator::new(1.0).worst_case_error(table.as_ref(), generator.func()).unwrap();
        assert!(error <= 1e-6, "{error:e}");
        assert!(table.step_size() < 6.0);

        // Not needlessly fine: twice the step is out of tolerance
        let coarser = generator.error_at_step(cubic(), 2.0 * table.step_size()).unwrap();
        assert!(coarser > 1e-6, "{coarser:e}");
    }

    #[test]
    fn test_error_at_step_relative_weight() {
        // Large values of f: the default metric divides the error by about f
        let generator = generator(0.0, 10.0);
        let linear = TableKind::uniform(Strategy::EqSpace { degree: 1 });

        let weighted = generator.error_at_step(linear, 0.5).unwrap();
        assert_eq!(generator.error_at_step_with(linear, 0.5, 1.0).unwrap(), weighted);

        let absolute = generator.error_at_step_with(linear, 0.5, 0.0).unwrap();
        assert!(absolute > 100.0 * weighted, "{absolute:e} vs {weighted:e}");
        assert!(absolute > 100.0, "{absolute:e}");

        assert!(matches!(
            generator.error_at_step_with(linear, 0.5, -1.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tolerance_is_monotone() {
        let generator = generator(-1.0, 2.0);
        let kind = TableKind::uniform(Strategy::Chebyshev { degree: 2 });

        let steps: Vec<f64> = [1e-4, 1e-6, 1e-8]
            .into_iter()
            .map(|tol| generator.by_tolerance_abs(kind, tol).unwrap().step_size())
            .collect();
        assert!(steps[0] > steps[1] && steps[1] > steps[2], "{steps:?}");
    }

    #[test]
    fn test_by_tolerance_whole_domain() {
        // A quadratic is exact, so the first probe already passes
        let func = FunctionContainer::new(|x: f64| x * x - 1.0);
        let generator: Generator<f64> = Generator::new(TableRegistry::standard(), func, 0.0, 4.0);
        let kind = TableKind::uniform(Strategy::EqSpace { degree: 2 });
        let table = generator.by_tolerance_abs(kind, 1e-10).unwrap();
        assert_eq!(table.num_intervals(), 1);
        assert_eq!(table.step_size(), 4.0);
    }

    #[test]
    fn test_by_tolerance_rejects_bad_tolerance() {
        let generator = generator(0.0, 1.0);
        assert!(matches!(generator.by_tolerance(cubic(), 0.0, 0.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(generator.by_tolerance(cubic(), 1e-6, -1.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            generator.by_tolerance(cubic(), f64::NAN, 0.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unreachable_tolerance() {
        // The table cannot follow a jump, however fine the grid
        let func = FunctionContainer::new(|x: f64| if x < 0.3 { 0.0 } else { 1.0 });
        let generator: Generator<f64> = Generator::new(TableRegistry::standard(), func, 0.0, 1.0)
            .with_search(SearchOptions {
                max_iter: 12,
                ..SearchOptions::default()
            });
        let kind = TableKind::uniform(Strategy::EqSpace { degree: 1 });
        assert!(matches!(
            generator.by_tolerance(kind, 1e-3, 0.0),
            Err(Error::NonConvergence { iterations: 12, .. })
        ));
    }

    #[test]
    fn test_by_size() {
        let generator = generator(-3.0, 3.0);
        let probe = generator.by_step(cubic(), 1.0).unwrap();
        let target = 2 * probe.data_size();

        let table = generator.by_size(cubic(), target).unwrap();
        assert!(table.step_size() < 0.6 * probe.step_size());

        // Within one entry of the request
        let entry = 4 * std::mem::size_of::<f64>();
        assert!(table.data_size().abs_diff(target) <= entry, "{} vs {target}", table.data_size());
    }

    #[test]
    fn test_by_size_too_small() {
        let generator = generator(-3.0, 3.0);
        assert!(matches!(generator.by_size(cubic(), 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_nonuniform_peak_is_denser() {
        // A narrow bump at 0.5 on a flat background
        let bump = |x: f64| (-200.0 * (x - 0.5).powi(2)).exp();
        let func = FunctionContainer::new(bump)
            .with_derivatives(1, move |x, out: &mut [f64]| {
                out[0] = bump(x);
                out[1] = -400.0 * (x - 0.5) * bump(x);
            })
            .unwrap();
        let generator: Generator<f64> = Generator::new(TableRegistry::standard(), func, 0.0, 1.0);
        let table = generator
            .by_step(TableKind::nonuniform(Strategy::CubicHermite), 0.05)
            .unwrap();

        let width = |x: f64| {
            let (i, _) = table.grid().hash(x);
            let (lo, hi) = table.bounds_of_subinterval(i);
            hi - lo
        };
        assert!(width(0.5) < width(0.02));
        assert!(width(0.5) < width(0.98));
    }

    #[test]
    fn test_write_through_caches() {
        let path = temp_path("write-through.json");
        let _ = std::fs::remove_file(&path);
        let generator = generator(-1.0, 1.0);

        let built = generator.write_through(cubic(), Request::Step(0.125), &path).unwrap();
        assert!(path.exists());

        // The second call reads the file; a different request would otherwise give a different table
        let loaded = generator.write_through(cubic(), Request::Step(0.5), &path).unwrap();
        assert_eq!(loaded.step_size(), 0.125);
        for x in SteppedValues::new(-1.0..=1.0, 0.01) {
            assert_eq!(loaded.evaluate(x), built.evaluate(x), "x = {x}");
        }

        let other = TableKind::uniform(Strategy::Taylor { degree: 3 });
        assert!(matches!(generator.by_file(other, &path), Err(Error::NameMismatch { .. })));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_by_file_requires_json() {
        let generator = generator(-1.0, 1.0);
        assert!(matches!(
            generator.by_file(cubic(), "table.txt"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.by_file(cubic(), temp_path("missing.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_plot_at() {
        let generator = generator(0.0, 1.0);
        let mut out = Vec::new();
        generator.plot_at(cubic(), 0.5, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("# x func impl"));

        let rows: Vec<Vec<f64>> = lines
            .map(|line| line.split(' ').map(|v| v.parse().unwrap()).collect())
            .collect();
        assert!((200..=201).contains(&rows.len()));
        for row in &rows {
            assert_close!(row[1], row[0].exp());
            assert_close!(row[2], row[1], tol = 1e-3);
        }
    }

    #[test]
    fn test_generate_dispatch() {
        let generator = generator(-1.0, 1.0);
        let table = generator.generate(cubic(), Request::Step(0.25)).unwrap();
        assert_eq!(table.num_intervals(), 8);

        let table = generator
            .generate(cubic(), Request::Tolerance { abs: 1e-4, rel: 0.0 })
            .unwrap();
        let error = ErrorEstimator::new(0.0).worst_case_error(table.as_ref(), generator.func()).unwrap();
        assert!(error <= 1e-4);
    }
}
