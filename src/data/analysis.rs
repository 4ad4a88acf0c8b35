//! RPM irregularity heuristic and fault prediction.
//!
//! The heuristic looks at a short window of recent RPM readings and raises
//! up to four irregularities. Each irregularity maps to a fixed set of
//! candidate faults. [`predict_fault`] then adds candidates from the
//! instantaneous temperature, RPM and vibration, and picks a primary fault
//! by severity.

use std::collections::BTreeSet;
use std::fmt;

use super::stats;

/// Coefficient of variation (percent) above which RPM is considered unstable.
pub const VARIATION_LIMIT_PCT: f64 = 15.0;
/// RPM floor checked against the last three readings.
pub const RPM_FLOOR: f64 = 1000.0;
/// RPM ceiling checked against the last three readings.
pub const RPM_CEILING: f64 = 3200.0;
/// Spread of successive RPM deltas above which the pattern is irregular.
pub const PATTERN_DELTA_STD_LIMIT: f64 = 150.0;

/// Readings inspected by the floor and ceiling checks.
const RECENT_READINGS: usize = 3;
/// Readings inspected by the pattern check.
const PATTERN_READINGS: usize = 5;

const OVERHEAT_TEMP: f64 = 100.0;
const OVERLOAD_TEMP: f64 = 110.0;
const FUEL_STARVED_RPM: f64 = 1500.0;
const OVERSPEED_RPM: f64 = 3200.0;
const IMBALANCE_VIBRATION: f64 = 4.0;
const BEARING_VIBRATION: f64 = 3.0;

/// A probable engine fault.
///
/// Variants are declared from most to least severe, and fault sets iterate
/// in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fault {
    EngineOverload,
    CoolingFailure,
    WornSparkPlugs,
    EngineImbalance,
    DefectiveSparkPlugs,
    IgnitionProblem,
    IgnitionCoils,
    ThrottleFailure,
    TransmissionProblem,
    FuelProblem,
    CloggedAirFilter,
    CloggedFilter,
    SensorFailure,
    DamagedSensors,
    BearingProblems,
}

impl Fault {
    pub fn label(&self) -> &'static str {
        match self {
            Fault::EngineOverload => "Engine overload",
            Fault::CoolingFailure => "Cooling failure",
            Fault::WornSparkPlugs => "Worn spark plugs",
            Fault::EngineImbalance => "Engine imbalance",
            Fault::DefectiveSparkPlugs => "Defective spark plugs",
            Fault::IgnitionProblem => "Ignition problem",
            Fault::IgnitionCoils => "Ignition coils",
            Fault::ThrottleFailure => "Throttle failure",
            Fault::TransmissionProblem => "Transmission problem",
            Fault::FuelProblem => "Fuel problem",
            Fault::CloggedAirFilter => "Clogged air filter",
            Fault::CloggedFilter => "Clogged filter",
            Fault::SensorFailure => "Sensor failure",
            Fault::DamagedSensors => "Damaged sensors",
            Fault::BearingProblems => "Bearing problems",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Faults considered first when choosing the primary fault.
const PRIMARY_PRIORITY: [Fault; 4] = [
    Fault::EngineOverload,
    Fault::CoolingFailure,
    Fault::WornSparkPlugs,
    Fault::EngineImbalance,
];

/// Something unusual in the RPM window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Irregularity {
    /// Coefficient of variation over the window, in percent.
    HighVariation(f64),
    VeryLowRpm,
    VeryHighRpm,
    IrregularPattern,
}

impl Irregularity {
    /// Candidate faults implied by this irregularity.
    pub fn faults(&self) -> [Fault; 3] {
        match self {
            Irregularity::HighVariation(_) => [
                Fault::WornSparkPlugs,
                Fault::IgnitionProblem,
                Fault::CloggedAirFilter,
            ],
            Irregularity::VeryLowRpm => [
                Fault::SensorFailure,
                Fault::FuelProblem,
                Fault::CloggedFilter,
            ],
            Irregularity::VeryHighRpm => [
                Fault::ThrottleFailure,
                Fault::TransmissionProblem,
                Fault::EngineOverload,
            ],
            Irregularity::IrregularPattern => [
                Fault::DefectiveSparkPlugs,
                Fault::IgnitionCoils,
                Fault::DamagedSensors,
            ],
        }
    }
}

impl fmt::Display for Irregularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Irregularity::HighVariation(pct) => write!(f, "High RPM variation ({:.1}%)", pct),
            Irregularity::VeryLowRpm => write!(f, "Very low RPM (<{})", RPM_FLOOR),
            Irregularity::VeryHighRpm => write!(f, "Very high RPM (>{})", RPM_CEILING),
            Irregularity::IrregularPattern => f.write_str("Irregular RPM pattern"),
        }
    }
}

/// Result of [`analyze_rpm`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpmAnalysis {
    pub irregularities: Vec<Irregularity>,
    pub probable_faults: BTreeSet<Fault>,
}

/// Coefficient of variation of `values` in percent.
///
/// Zero for an empty window or a non-positive mean.
pub fn variation_pct(values: &[f64]) -> f64 {
    match (stats::mean(values), stats::population_std(values)) {
        (Some(mean), Some(std)) if mean > 0.0 => std / mean * 100.0,
        _ => 0.0,
    }
}

/// Flag irregularities in a window of recent RPM readings.
pub fn analyze_rpm(values: &[f64]) -> RpmAnalysis {
    let mut analysis = RpmAnalysis::default();
    if values.is_empty() {
        return analysis;
    }

    let variation = variation_pct(values);
    if variation > VARIATION_LIMIT_PCT {
        analysis.irregularities.push(Irregularity::HighVariation(variation));
    }

    let recent = &values[values.len().saturating_sub(RECENT_READINGS)..];
    if recent.iter().any(|&rpm| rpm < RPM_FLOOR) {
        analysis.irregularities.push(Irregularity::VeryLowRpm);
    }
    if recent.iter().any(|&rpm| rpm > RPM_CEILING) {
        analysis.irregularities.push(Irregularity::VeryHighRpm);
    }

    if values.len() > PATTERN_READINGS {
        let deltas = stats::diff(&values[values.len() - PATTERN_READINGS..]);
        if stats::population_std(&deltas).unwrap_or(0.0) > PATTERN_DELTA_STD_LIMIT {
            analysis.irregularities.push(Irregularity::IrregularPattern);
        }
    }

    analysis.probable_faults = analysis.irregularities.iter().flat_map(|i| i.faults()).collect();
    analysis
}

/// Irregularities, candidate faults and the single most likely fault.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub irregularities: Vec<Irregularity>,
    pub probable_faults: BTreeSet<Fault>,
    /// `None` when no fault is suspected.
    pub primary: Option<Fault>,
}

impl Prediction {
    pub fn has_irregularities(&self) -> bool {
        !self.irregularities.is_empty()
    }

    /// Label of the primary fault, or "No fault detected".
    pub fn primary_label(&self) -> &'static str {
        self.primary.map_or("No fault detected", |f| f.label())
    }
}

/// Combine the RPM window analysis with instantaneous threshold checks.
pub fn predict_fault(temperature: f64, rpm: f64, vibration: f64, window: &[f64]) -> Prediction {
    let RpmAnalysis {
        irregularities,
        mut probable_faults,
    } = analyze_rpm(window);

    let instantaneous = [
        (temperature > OVERHEAT_TEMP, Fault::CoolingFailure),
        (temperature > OVERLOAD_TEMP, Fault::EngineOverload),
        (rpm < FUEL_STARVED_RPM, Fault::FuelProblem),
        (rpm > OVERSPEED_RPM, Fault::ThrottleFailure),
        (vibration > IMBALANCE_VIBRATION, Fault::EngineImbalance),
        (vibration > BEARING_VIBRATION, Fault::BearingProblems),
    ];
    probable_faults.extend(instantaneous.iter().filter(|(hit, _)| *hit).map(|(_, f)| *f));

    let primary = PRIMARY_PRIORITY
        .iter()
        .find(|f| probable_faults.contains(*f))
        .or_else(|| probable_faults.iter().next())
        .copied();

    Prediction {
        irregularities,
        probable_faults,
        primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faults(list: &[Fault]) -> BTreeSet<Fault> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(analyze_rpm(&[]), RpmAnalysis::default());
        assert_eq!(variation_pct(&[]), 0.0);
    }

    #[test]
    fn test_constant_rpm_raises_nothing() {
        let window = [2000.0; 10];
        assert_eq!(variation_pct(&window), 0.0);
        let analysis = analyze_rpm(&window);
        assert!(analysis.irregularities.is_empty());
        assert!(analysis.probable_faults.is_empty());
    }

    #[test]
    fn test_high_variation() {
        // mean 2000, population std 1000
        let analysis = analyze_rpm(&[1000.0, 3000.0]);
        assert_eq!(analysis.irregularities, vec![Irregularity::HighVariation(50.0)]);
        assert_eq!(
            analysis.probable_faults,
            faults(&[Fault::WornSparkPlugs, Fault::IgnitionProblem, Fault::CloggedAirFilter])
        );
        assert_eq!(analysis.irregularities[0].to_string(), "High RPM variation (50.0%)");
    }

    #[test]
    fn test_low_rpm_in_last_three() {
        let analysis = analyze_rpm(&[1100.0, 1050.0, 990.0]);
        assert_eq!(analysis.irregularities, vec![Irregularity::VeryLowRpm]);
        assert_eq!(
            analysis.probable_faults,
            faults(&[Fault::SensorFailure, Fault::FuelProblem, Fault::CloggedFilter])
        );
    }

    #[test]
    fn test_low_rpm_outside_last_three_is_ignored() {
        let analysis = analyze_rpm(&[950.0, 1100.0, 1100.0, 1100.0]);
        assert!(analysis.irregularities.is_empty());
    }

    #[test]
    fn test_high_rpm_in_last_three() {
        let analysis = analyze_rpm(&[3300.0, 3250.0, 3210.0]);
        assert_eq!(analysis.irregularities, vec![Irregularity::VeryHighRpm]);
        assert_eq!(
            analysis.probable_faults,
            faults(&[Fault::ThrottleFailure, Fault::TransmissionProblem, Fault::EngineOverload])
        );
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let analysis = analyze_rpm(&[1000.0, 1000.0, 1000.0]);
        assert!(analysis.irregularities.is_empty());
        let analysis = analyze_rpm(&[3200.0, 3200.0, 3200.0]);
        assert!(analysis.irregularities.is_empty());
    }

    #[test]
    fn test_irregular_pattern() {
        // Last five alternate by 400 RPM; overall variation stays under 15%
        let window = [2000.0, 2000.0, 2400.0, 2000.0, 2400.0, 2000.0];
        let analysis = analyze_rpm(&window);
        assert_eq!(analysis.irregularities, vec![Irregularity::IrregularPattern]);
        assert_eq!(
            analysis.probable_faults,
            faults(&[Fault::DefectiveSparkPlugs, Fault::IgnitionCoils, Fault::DamagedSensors])
        );
    }

    #[test]
    fn test_pattern_needs_more_than_five_readings() {
        let window = [2000.0, 2400.0, 2000.0, 2400.0, 2000.0];
        assert!(!analyze_rpm(&window).irregularities.contains(&Irregularity::IrregularPattern));
    }

    #[test]
    fn test_steady_ramp_is_not_irregular() {
        // Constant deltas have zero spread
        let window = [1500.0, 1700.0, 1900.0, 2100.0, 2300.0, 2500.0];
        assert!(!analyze_rpm(&window).irregularities.contains(&Irregularity::IrregularPattern));
    }

    #[test]
    fn test_duplicate_faults_collapse() {
        // The high-RPM flag and the overspeed check both name the throttle
        let prediction = predict_fault(80.0, 3300.0, 1.0, &[3300.0, 3300.0, 3300.0]);
        let throttle = prediction
            .probable_faults
            .iter()
            .filter(|f| **f == Fault::ThrottleFailure)
            .count();
        assert_eq!(throttle, 1);
    }

    #[test]
    fn test_primary_fault_overload_beats_cooling() {
        let prediction = predict_fault(115.0, 2000.0, 1.0, &[2000.0]);
        assert!(prediction.probable_faults.contains(&Fault::CoolingFailure));
        assert_eq!(prediction.primary, Some(Fault::EngineOverload));
    }

    #[test]
    fn test_primary_fault_cooling() {
        let prediction = predict_fault(105.0, 2000.0, 1.0, &[2000.0]);
        assert_eq!(prediction.primary, Some(Fault::CoolingFailure));
    }

    #[test]
    fn test_primary_fault_spark_plugs_beats_imbalance() {
        let prediction = predict_fault(80.0, 3000.0, 4.5, &[1000.0, 3000.0]);
        assert!(prediction.probable_faults.contains(&Fault::EngineImbalance));
        assert_eq!(prediction.primary, Some(Fault::WornSparkPlugs));
    }

    #[test]
    fn test_primary_fault_imbalance() {
        let prediction = predict_fault(80.0, 2000.0, 4.5, &[2000.0]);
        assert!(prediction.probable_faults.contains(&Fault::BearingProblems));
        assert_eq!(prediction.primary, Some(Fault::EngineImbalance));
    }

    #[test]
    fn test_primary_fault_falls_back_to_first_remaining() {
        let prediction = predict_fault(80.0, 2000.0, 3.5, &[2000.0]);
        assert_eq!(prediction.probable_faults, faults(&[Fault::BearingProblems]));
        assert_eq!(prediction.primary, Some(Fault::BearingProblems));
    }

    #[test]
    fn test_low_rpm_suggests_fuel_problem() {
        let prediction = predict_fault(80.0, 1400.0, 1.0, &[1400.0]);
        assert_eq!(prediction.primary, Some(Fault::FuelProblem));
        assert!(!prediction.has_irregularities());
    }

    #[test]
    fn test_no_fault_detected() {
        let prediction = predict_fault(80.0, 2000.0, 1.0, &[2000.0, 2000.0]);
        assert!(prediction.probable_faults.is_empty());
        assert_eq!(prediction.primary, None);
        assert_eq!(prediction.primary_label(), "No fault detected");
    }
}
