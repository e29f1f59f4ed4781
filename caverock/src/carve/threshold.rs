//! Per-altitude noise thresholds of a column, closing caves off near the surface.


/// Shape of the threshold increase between the transition boundary and the top of the
/// column. Both curves are strictly increasing over the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampCurve {
    #[default]
    Linear,
    /// Slow start just above the boundary, steep near the surface.
    EaseIn,
}

impl RampCurve {

    /// Map a ramp progress in [0, 1] to an interpolation factor in [0, 1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            RampCurve::Linear => t,
            RampCurve::EaseIn => t * t,
        }
    }

}


/// Threshold values of a carver, the ceiling is reached at the top of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdProfile {
    pub base: f64,
    pub ceiling: f64,
    pub curve: RampCurve,
}


/// The threshold of every altitude of a column, from bottom to top inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    bottom: i32,
    values: Vec<f64>,
}

impl ThresholdTable {

    /// Compute the thresholds of the inclusive range `bottom..=top`. The transition
    /// boundary is clamped to 1, at and below it the base threshold applies, above it
    /// the threshold ramps up to reach the profile ceiling at `top`.
    pub fn generate(profile: &ThresholdProfile, bottom: i32, top: i32, transition: i32) -> Self {

        let transition = transition.max(1);
        let ramp_height = (top - transition) as f64;

        let values = (bottom..=top)
            .map(|y| {
                if y <= transition {
                    profile.base
                } else {
                    let t = (y - transition) as f64 / ramp_height;
                    profile.base + (profile.ceiling - profile.base) * profile.curve.apply(t)
                }
            })
            .collect();

        Self { bottom, values }

    }

    /// Get the threshold at the given altitude, none if outside of the table.
    #[inline]
    pub fn get(&self, y: i32) -> Option<f64> {
        let index = usize::try_from(y - self.bottom).ok()?;
        self.values.get(index).copied()
    }

    /// Lowest altitude of the table.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Highest altitude of the table, below the bottom if the table is empty.
    #[inline]
    pub fn top(&self) -> i32 {
        self.bottom + self.values.len() as i32 - 1
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    const PROFILE: ThresholdProfile = ThresholdProfile { base: 0.5, ceiling: 0.9, curve: RampCurve::Linear };

    fn check_profile(table: &ThresholdTable, profile: &ThresholdProfile, transition: i32) {
        let mut prev = f64::NEG_INFINITY;
        for y in table.bottom()..=table.top() {
            let value = table.get(y).unwrap();
            if y <= transition {
                assert_eq!(value, profile.base, "y = {y}");
            } else {
                assert!(value > prev, "y = {y}, {value} <= {prev}");
            }
            prev = value;
        }
    }

    #[test]
    fn constant_then_increasing() {
        for curve in [RampCurve::Linear, RampCurve::EaseIn] {
            let profile = ThresholdProfile { curve, ..PROFILE };
            for (bottom, top, transition) in [(0, 60, 50), (1, 128, 1), (5, 255, 200), (0, 40, 80)] {
                let table = ThresholdTable::generate(&profile, bottom, top, transition);
                check_profile(&table, &profile, transition);
            }
        }
    }

    #[test]
    fn ramp_reaches_ceiling() {
        let table = ThresholdTable::generate(&PROFILE, 0, 60, 50);
        assert_eq!(table.get(50), Some(0.5));
        assert!((table.get(60).unwrap() - 0.9).abs() < 1e-12);
        assert!((table.get(55).unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(table.get(61), None);
        assert_eq!(table.get(-1), None);
    }

    #[test]
    fn boundary_clamped() {
        let table = ThresholdTable::generate(&PROFILE, 0, 10, -20);
        assert_eq!(table.get(0), Some(0.5));
        assert_eq!(table.get(1), Some(0.5));
        assert!(table.get(2).unwrap() > 0.5);
    }

    #[test]
    fn empty_range() {
        let table = ThresholdTable::generate(&PROFILE, 10, 9, 5);
        assert_eq!(table.get(9), None);
        assert_eq!(table.get(10), None);
        assert_eq!(table.top(), 9);
    }

}
