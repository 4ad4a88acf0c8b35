//! Catalogue of simulated fault scenarios.
//!
//! Each scenario carries the operator-facing description printed by the
//! fault simulator and the alert text sent when alerts are enabled.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default engine temperature used when simulating a fault, in °C.
pub const DEFAULT_FAULT_TEMPERATURE: f64 = 110.0;

/// Accepted range for the simulated temperature, in °C.
pub const FAULT_TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 50.0..=150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultScenario {
    SparkPlugs,
    EngineOverload,
    CoolingFailure,
    CloggedFilter,
}

/// Static description of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioInfo {
    pub title: &'static str,
    pub symptoms: &'static str,
    pub cause: &'static str,
    pub remedy: &'static str,
    /// Maintenance interval or prevention advice.
    pub note: &'static str,
}

impl FaultScenario {
    pub const ALL: [FaultScenario; 4] = [
        FaultScenario::SparkPlugs,
        FaultScenario::EngineOverload,
        FaultScenario::CoolingFailure,
        FaultScenario::CloggedFilter,
    ];

    pub fn info(&self) -> ScenarioInfo {
        match self {
            FaultScenario::SparkPlugs => ScenarioInfo {
                title: "Spark plug failure",
                symptoms: "Unstable RPM, rising temperature",
                cause: "Wear or contamination of the spark plugs",
                remedy: "Replace the spark plugs",
                note: "Replace every 30,000 km",
            },
            FaultScenario::EngineOverload => ScenarioInfo {
                title: "Engine overload",
                symptoms: "Temperature > 110°C, loss of power",
                cause: "Excess load or aggressive driving",
                remedy: "Reduce the load and check the oil level",
                note: "Drive smoothly and respect the rated load",
            },
            FaultScenario::CoolingFailure => ScenarioInfo {
                title: "Cooling system failure",
                symptoms: "Persistently high temperature, fan not running",
                cause: "Coolant leak or damaged fan",
                remedy: "Repair leaks and check the fan",
                note: "Check the coolant level regularly",
            },
            FaultScenario::CloggedFilter => ScenarioInfo {
                title: "Clogged air filter",
                symptoms: "Low RPM, variable temperature",
                cause: "Dirt accumulated in the air filter",
                remedy: "Replace the air filter",
                note: "Replace every 15,000 km",
            },
        }
    }

    /// Multi-line description printed by the simulator.
    pub fn describe(&self) -> String {
        let info = self.info();
        format!(
            "{}\n  Symptoms:    {}\n  Cause:       {}\n  Remedy:      {}\n  Maintenance: {}",
            info.title, info.symptoms, info.cause, info.remedy, info.note
        )
    }

    /// Alert body announcing a simulated fault at `temperature`.
    pub fn alert_body(&self, temperature: f64) -> String {
        let info = self.info();
        format!(
            "🔧 SIMULATION: {}\n• Symptoms: {}\n• Temperature: {:.0}°C",
            info.title, info.symptoms, temperature
        )
    }
}

impl fmt::Display for FaultScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().title)
    }
}
