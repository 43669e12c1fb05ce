use tracing::debug;

use crate::models::{VitalParameter, VitalStatus, VitalThresholds};

impl VitalParameter {
    pub fn thresholds(&self) -> VitalThresholds {
        match self {
            VitalParameter::HeartRate => VitalThresholds {
                warning: (50.0, 100.0),
                critical: (40.0, 120.0),
            },
            VitalParameter::OxygenLevel => VitalThresholds {
                warning: (92.0, 100.0),
                critical: (90.0, 100.0),
            },
            // Degrees Celsius
            VitalParameter::Temperature => VitalThresholds {
                warning: (36.5, 37.5),
                critical: (35.0, 38.5),
            },
            VitalParameter::RespiratoryRate => VitalThresholds {
                warning: (12.0, 20.0),
                critical: (10.0, 25.0),
            },
        }
    }
}

fn within((low, high): (f64, f64), value: f64) -> bool {
    value >= low && value <= high
}

pub fn classify_vital(parameter: VitalParameter, value: f64) -> VitalStatus {
    let thresholds = parameter.thresholds();

    if !within(thresholds.critical, value) {
        VitalStatus::Critical
    } else if !within(thresholds.warning, value) {
        VitalStatus::Warning
    } else {
        VitalStatus::Normal
    }
}

/// Classifies a reading keyed by its dashboard name. Parameters without
/// thresholds are always normal.
pub fn classify_named_vital(parameter: &str, value: f64) -> VitalStatus {
    match parameter.parse::<VitalParameter>() {
        Ok(parameter) => classify_vital(parameter, value),
        Err(_) => {
            debug!("No thresholds for vital sign {:?}", parameter);
            VitalStatus::Normal
        }
    }
}
