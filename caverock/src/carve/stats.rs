//! Running statistics of carving noise, used to tune thresholds.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;


/// An observer of the noise values carvers compare against their thresholds. Cave
/// carvers report the weakest value of each tuple, cavern carvers report each product.
/// Observers have no influence on carving.
pub trait NoiseObserver: Send + Sync {

    fn observe(&self, value: f64);

}


/// Aggregated noise values since the last reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseReport {
    pub count: u64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}


/// Lock-free noise statistics that logs and restarts a report every given number of
/// observations. Aggregates may be slightly off when threads observe concurrently with
/// a reset, only the count is exact.
#[derive(Debug)]
pub struct NoiseStats {
    /// Name displayed in reports.
    name: &'static str,
    /// Number of observations between two reports, zero to never report.
    report_every: u64,
    count: AtomicU64,
    /// Bits of the floating sum.
    sum: AtomicU64,
    /// Bits of the floating minimum.
    min: AtomicU64,
    /// Bits of the floating maximum.
    max: AtomicU64,
}

impl NoiseStats {

    pub fn new(name: &'static str, report_every: u64) -> Self {
        Self {
            name,
            report_every,
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            min: AtomicU64::new(f64::INFINITY.to_bits()),
            max: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
        }
    }

    /// Read the current aggregates without resetting them.
    pub fn snapshot(&self) -> NoiseReport {
        make_report(
            self.count.load(Ordering::Acquire),
            f64::from_bits(self.sum.load(Ordering::Acquire)),
            f64::from_bits(self.min.load(Ordering::Acquire)),
            f64::from_bits(self.max.load(Ordering::Acquire)),
        )
    }

    /// Reset the aggregates and return their values before the reset.
    pub fn reset(&self) -> NoiseReport {
        let count = self.count.swap(0, Ordering::AcqRel);
        self.take(count)
    }

    fn take(&self, count: u64) -> NoiseReport {
        make_report(
            count,
            f64::from_bits(self.sum.swap(0f64.to_bits(), Ordering::AcqRel)),
            f64::from_bits(self.min.swap(f64::INFINITY.to_bits(), Ordering::AcqRel)),
            f64::from_bits(self.max.swap(f64::NEG_INFINITY.to_bits(), Ordering::AcqRel)),
        )
    }

}

impl NoiseObserver for NoiseStats {

    fn observe(&self, value: f64) {

        update_f64(&self.sum, |sum| sum + value);
        update_f64(&self.min, |min| min.min(value));
        update_f64(&self.max, |max| max.max(value));

        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        if self.report_every != 0 && count >= self.report_every {
            // Only the thread that observes the exact count resets, others continue
            // accumulating into the next report.
            if self.count.compare_exchange(count, 0, Ordering::AcqRel, Ordering::Relaxed).is_ok() {
                let report = self.take(count);
                info!("{} noise over {} samples: average {:.4}, min {:.4}, max {:.4}",
                    self.name, report.count, report.average, report.min, report.max);
            }
        }

    }

}

#[inline]
fn make_report(count: u64, sum: f64, min: f64, max: f64) -> NoiseReport {
    NoiseReport {
        count,
        average: if count == 0 { 0.0 } else { sum / count as f64 },
        min,
        max,
    }
}

#[inline]
fn update_f64(atomic: &AtomicU64, func: impl Fn(f64) -> f64) {
    let _ = atomic.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        Some(func(f64::from_bits(bits)).to_bits())
    });
}
