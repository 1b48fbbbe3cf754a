use serde::{Deserialize, Serialize};

/// One instrument reading taken at a test point during calibration.
///
/// Numeric ranges are not validated here; the shapes exist so both sides of
/// the HTTP boundary serialize the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
    pub power: f64,
}

/// One completed calibration certificate: the measurement series plus the
/// administrative metadata printed on the certificate.
///
/// Constructed by the backend and held read-only by the frontend; the list
/// view replaces its copy wholesale on every reload. `customer` is optional
/// and must stay `None` through serialization (never an empty string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub measurements: Vec<Measurement>,
    pub calibration_date: String,
    pub certificate_number: String,
    pub model_details: String,
    pub company_name: String,
    pub po_number: String,
    #[serde(default)]
    pub customer: Option<String>,
}

impl CalibrationData {
    /// An empty record for form initialization.
    pub fn blank() -> Self {
        Self {
            measurements: Vec::new(),
            calibration_date: String::new(),
            certificate_number: String::new(),
            model_details: String::new(),
            company_name: String::new(),
            po_number: String::new(),
            customer: None,
        }
    }
}

impl Measurement {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            voltage: 0.0,
            current: 0.0,
            frequency: 0.0,
            power: 0.0,
        }
    }
}
