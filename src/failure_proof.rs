//! A table that falls back to its function outside the domain, and a usage histogram.
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::function::FunctionContainer;
use crate::registry::TableKind;
use crate::table::{Grid, LookupTable, TableRecord};
use crate::value::Value;

/// Widest row of the text histogram
const HISTOGRAM_WIDTH: usize = 15;

/// Wraps a table so that any argument is safe to evaluate.
///
/// Arguments in `[min_arg, max_arg]` go to the table; anything else, NaN included, goes to
/// the function itself. Optionally, the out-of-domain arguments are counted in an
/// [`ArgumentRecord`] to show where callers stray.
///
/// ```rust
/// # use polylut::{FailureProofTable, FunctionContainer, LookupTable, LookupTableParameters, TableRegistry};
/// let func = FunctionContainer::new(f64::sin);
/// let kind = "UniformEqSpaceInterpTable<3>".parse().unwrap();
/// let table = TableRegistry::standard()
///     .create(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.1))
///     .unwrap();
///
/// let safe = FailureProofTable::new(table, func);
/// assert_eq!(safe.evaluate(100.0), 100f64.sin());
/// assert_eq!(safe.name(), "FailureProofUniformEqSpaceInterpTable<3>");
/// ```
#[derive(Debug)]
pub struct FailureProofTable<T: Value> {
    table: Box<dyn LookupTable<T>>,
    func: FunctionContainer<T>,
    name: String,
    arguments: Option<ArgumentRecord<T>>,
}

impl<T: Value> FailureProofTable<T> {
    /// Guards `table` with the function it was built from
    pub fn new(table: Box<dyn LookupTable<T>>, func: FunctionContainer<T>) -> Self {
        let name = format!("FailureProof{}", table.name());
        Self {
            table,
            func,
            name,
            arguments: None,
        }
    }

    /// Counts out-of-domain arguments in `buckets` bins over `[hist_min, hist_max]`
    ///
    /// # Errors
    /// See [`ArgumentRecord::new`].
    pub fn with_record(mut self, hist_min: T, hist_max: T, buckets: usize) -> Result<Self> {
        self.arguments = Some(ArgumentRecord::new(hist_min, hist_max, buckets)?);
        Ok(self)
    }

    /// The out-of-domain arguments seen so far, if recording
    pub fn arguments(&self) -> Option<&ArgumentRecord<T>> {
        self.arguments.as_ref()
    }

    /// The guarded table
    pub fn inner(&self) -> &dyn LookupTable<T> {
        self.table.as_ref()
    }
}

impl<T: Value> LookupTable<T> for FailureProofTable<T> {
    fn evaluate(&self, x: T) -> T {
        if self.table.min_arg() <= x && x <= self.table.max_arg() {
            return self.table.evaluate(x);
        }

        if let Some(arguments) = &self.arguments {
            arguments.record(x);
        }
        self.func.call(x)
    }

    fn kind(&self) -> TableKind {
        self.table.kind()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn grid(&self) -> &Grid<T> {
        self.table.grid()
    }

    fn order(&self) -> usize {
        self.table.order()
    }

    fn num_table_entries(&self) -> usize {
        self.table.num_table_entries()
    }

    fn data_size(&self) -> usize {
        self.table.data_size()
    }

    /// The guarded table's record; it loads back as the bare table
    fn record(&self) -> Result<TableRecord> {
        self.table.record()
    }
}

/// Thread-safe histogram of arguments.
///
/// Each bucket has its own lock, so concurrent callers only contend when they land in the
/// same bucket. The peak bucket and the extreme arguments share one more lock.
#[derive(Debug)]
pub struct ArgumentRecord<T: Value> {
    hist_min: T,
    hist_max: T,
    buckets: Vec<Mutex<u64>>,
    stats: Mutex<Stats<T>>,
}

#[derive(Debug, Clone, Copy)]
struct Stats<T> {
    peak_bucket: usize,
    peak_count: u64,
    outside: u64,
    min_recorded: Option<T>,
    max_recorded: Option<T>,
}

/// Snapshot of an [`ArgumentRecord`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArgumentSummary {
    /// Lower end of the histogram
    #[serde(rename = "minArg")]
    pub hist_min: f64,

    /// Upper end of the histogram
    #[serde(rename = "maxArg")]
    pub hist_max: f64,

    /// Count per bucket
    pub histogram: Vec<u64>,

    /// Index of the fullest bucket
    pub peak_index: usize,

    /// Arguments that fell outside `[minArg, maxArg]`
    pub out_of_bounds: u64,

    /// Smallest argument seen
    pub min_recorded: Option<f64>,

    /// Largest argument seen
    pub max_recorded: Option<f64>,
}

impl<T: Value> ArgumentRecord<T> {
    /// An empty histogram of `buckets` equal bins over `[hist_min, hist_max]`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the range is empty or `buckets` is 0.
    pub fn new(hist_min: T, hist_max: T, buckets: usize) -> Result<Self> {
        if !(hist_min < hist_max) {
            return Err(Error::invalid(format!(
                "histogram range is empty: [{hist_min:e}, {hist_max:e}]"
            )));
        }
        if buckets == 0 {
            return Err(Error::invalid("histogram needs at least one bucket"));
        }

        Ok(Self {
            hist_min,
            hist_max,
            buckets: (0..buckets).map(|_| Mutex::new(0)).collect(),
            stats: Mutex::new(Stats {
                peak_bucket: 0,
                peak_count: 0,
                outside: 0,
                min_recorded: None,
                max_recorded: None,
            }),
        })
    }

    /// Bucket of `x`, if it is inside the histogram
    fn bucket_of(&self, x: T) -> Option<usize> {
        if !(self.hist_min <= x && x <= self.hist_max) {
            return None;
        }

        let n = self.buckets.len();
        let scaled = T::from_positive_int(n) * (x - self.hist_min) / (self.hist_max - self.hist_min);
        let index = num_traits::float::FloatCore::floor(scaled).as_usize().unwrap_or(0);
        Some(index.min(n - 1))
    }

    /// Counts one argument.
    ///
    /// The bucket lock is taken before the stats lock and both are held for the update, so
    /// a bucket count and the peak it feeds change together. [`ArgumentRecord::summary`]
    /// reads the buckets one at a time, so a summary taken while other threads record is
    /// only a close snapshot.
    pub fn record(&self, x: T) {
        let mut bucket = self
            .bucket_of(x)
            .map(|i| (i, self.buckets[i].lock().unwrap_or_else(PoisonError::into_inner)));
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);

        match bucket.as_mut() {
            Some((i, count)) => {
                **count += 1;
                if **count > stats.peak_count {
                    stats.peak_bucket = *i;
                    stats.peak_count = **count;
                }
            }
            None => stats.outside += 1,
        }

        if !x.is_nan() {
            if stats.min_recorded.map_or(true, |m| x < m) {
                stats.min_recorded = Some(x);
            }
            if stats.max_recorded.map_or(true, |m| x > m) {
                stats.max_recorded = Some(x);
            }
        }
    }

    /// Count per bucket
    pub fn counts(&self) -> Vec<u64> {
        self.buckets
            .iter()
            .map(|b| *b.lock().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    /// Arguments counted in some bucket
    pub fn total_recorded(&self) -> u64 {
        self.counts().iter().sum()
    }

    /// Bounds of bucket `i`
    pub fn bucket_bounds(&self, i: usize) -> (T, T) {
        let n = T::from_positive_int(self.buckets.len());
        let width = self.hist_max - self.hist_min;
        (
            self.hist_min + width * T::from_positive_int(i) / n,
            self.hist_min + width * T::from_positive_int(i + 1) / n,
        )
    }

    /// A serializable snapshot
    pub fn summary(&self) -> ArgumentSummary {
        let to_f64 = |v: T| num_traits::cast::<T, f64>(v).unwrap_or(f64::NAN);
        let histogram = self.counts();
        let stats = *self.stats.lock().unwrap_or_else(PoisonError::into_inner);

        ArgumentSummary {
            hist_min: to_f64(self.hist_min),
            hist_max: to_f64(self.hist_max),
            histogram,
            peak_index: stats.peak_bucket,
            out_of_bounds: stats.outside,
            min_recorded: stats.min_recorded.map(to_f64),
            max_recorded: stats.max_recorded.map(to_f64),
        }
    }
}

/// One row of stars per bucket, scaled so the peak bucket is 15 wide; empty if nothing was recorded
impl<T: Value> std::fmt::Display for ArgumentRecord<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts = self.counts();
        let peak = counts.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            return Ok(());
        }

        for (i, &count) in counts.iter().enumerate() {
            // Any bucket with a hit gets at least one star
            let stars = usize::try_from(count.saturating_mul(HISTOGRAM_WIDTH as u64).div_ceil(peak))
                .unwrap_or(HISTOGRAM_WIDTH);
            let (lo, hi) = self.bucket_bounds(i);
            writeln!(
                f,
                "{:<width$} [{lo:.3e}, {hi:.3e}) with {count} evaluations",
                "*".repeat(stars),
                width = HISTOGRAM_WIDTH
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Strategy, TableRegistry};
    use crate::table::LookupTableParameters;

    fn guarded() -> FailureProofTable<f64> {
        let func = FunctionContainer::new(f64::cos);
        let kind = TableKind::uniform(Strategy::EqSpace { degree: 3 });
        let table = TableRegistry::standard()
            .create(kind, &func, LookupTableParameters::new(0.0, 1.0, 0.1))
            .unwrap();
        FailureProofTable::new(table, func)
    }

    #[test]
    fn test_falls_back_outside_domain() {
        let table = guarded();
        for x in [-1.0, 1.0 + 1e-9, 5.0, 1e6] {
            assert_eq!(table.evaluate(x), x.cos());
        }
        for x in [0.0, 0.37, 1.0] {
            assert_eq!(table.evaluate(x), table.inner().evaluate(x));
        }
        assert!(table.evaluate(f64::NAN).is_nan());
        assert_eq!(table.num_intervals(), 10);
        assert!(table.arguments().is_none());
    }

    #[test]
    fn test_records_out_of_domain_arguments() {
        let table = guarded().with_record(-10.0, 10.0, 4).unwrap();
        for x in [-7.0, 2.0, 3.0, 7.5, 8.0, 9.0, 0.5, 50.0] {
            table.evaluate(x);
        }

        let record = table.arguments().unwrap();
        // 0.5 is inside the table's domain and never reaches the record
        assert_eq!(record.counts(), vec![1, 0, 2, 3]);
        assert_eq!(record.total_recorded(), 6);

        let summary = record.summary();
        assert_eq!(summary.peak_index, 3);
        assert_eq!(summary.out_of_bounds, 1);
        assert_eq!(summary.min_recorded, Some(-7.0));
        assert_eq!(summary.max_recorded, Some(50.0));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["minArg"], -10.0);
        assert_eq!(json["histogram"][3], 3);
    }

    #[test]
    fn test_histogram_text() {
        let record = ArgumentRecord::new(0.0, 4.0, 4).unwrap();
        assert_eq!(record.to_string(), "");

        for x in [0.5, 0.5, 0.5, 2.5, 4.0] {
            record.record(x);
        }
        let text = record.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with(&"*".repeat(15)));
        assert!(rows[1].starts_with(' '));
        assert!(rows[2].starts_with("***** "));
        assert!(rows[3].ends_with("with 1 evaluations"));
    }

    #[test]
    fn test_concurrent_recording() {
        let record = ArgumentRecord::new(0.0, 1.0, 10).unwrap();
        std::thread::scope(|s| {
            for t in 0..4 {
                let record = &record;
                s.spawn(move || {
                    for i in 0..1000 {
                        record.record(f64::from((i + t) % 10) / 10.0 + 0.05);
                    }
                });
            }
        });
        assert_eq!(record.total_recorded(), 4000);
        assert_eq!(record.counts(), vec![400; 10]);
    }

    #[test]
    fn test_concurrent_peak_matches_counts() {
        let record = ArgumentRecord::new(0.0, 1.0, 4).unwrap();
        std::thread::scope(|s| {
            for t in 0..4usize {
                let record = &record;
                s.spawn(move || {
                    for i in 0..1000usize {
                        // Bucket 2 gets twice as many hits as any other
                        let bucket = [0u8, 1, 2, 2, 3][(i + t) % 5];
                        record.record(f64::from(bucket) / 4.0 + 0.1);
                    }
                    record.record(-1.0 - t as f64);
                });
            }
        });

        let summary = record.summary();
        assert_eq!(summary.histogram, vec![800, 800, 1600, 800]);
        assert_eq!(summary.peak_index, 2);
        assert_eq!(summary.out_of_bounds, 4);
        assert_eq!(summary.min_recorded, Some(-4.0));
        assert_eq!(summary.max_recorded, Some(3.0 / 4.0 + 0.1));
    }

    #[test]
    fn test_bad_histogram() {
        assert!(ArgumentRecord::new(1.0, 1.0, 4).is_err());
        assert!(ArgumentRecord::new(0.0, 1.0, 0).is_err());
    }
}
