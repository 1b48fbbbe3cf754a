use contracts::domain::calibration::aggregate::CalibrationData;
use leptos::prelude::*;

use super::api::{CalibrationsApi, HttpCalibrationsApi};

/// Snapshot of everything the calibration pages observe.
///
/// The record list is replaced wholesale on every successful load; failures
/// leave it stale-but-valid and surface the error text in `message`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationsState {
    pub records: Vec<CalibrationData>,
    pub loading: bool,
    pub message: String,
}

impl CalibrationsState {
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn apply_load(&mut self, outcome: Result<Vec<CalibrationData>, String>) {
        self.loading = false;
        match outcome {
            Ok(records) => self.records = records,
            Err(error) => self.message = format!("Error loading calibrations: {error}"),
        }
    }

    pub fn apply_open_folder(&mut self, outcome: Result<(), String>) {
        if let Err(error) = outcome {
            self.message = format!("Error opening folder: {error}");
        }
    }

    pub fn apply_save(&mut self, outcome: Result<String, String>) {
        match outcome {
            Ok(confirmation) => self.message = confirmation,
            Err(error) => self.message = format!("Error saving calibration: {error}"),
        }
    }

    pub fn apply_update(&mut self, outcome: Result<String, String>) {
        match outcome {
            Ok(confirmation) => self.message = confirmation,
            Err(error) => self.message = format!("Error updating calibration: {error}"),
        }
    }

    pub fn apply_generate_pdf(&mut self, outcome: Result<(), String>) {
        if let Err(error) = outcome {
            self.message = format!("Error generating PDF: {error}");
        }
    }
}

pub fn create_state() -> RwSignal<CalibrationsState> {
    RwSignal::new(CalibrationsState::default())
}

/// Facade the pages act through. Every action is fire-and-forget: nothing is
/// returned to the caller, failures land in `message`, and overlapping calls
/// settle last-write-wins.
#[derive(Clone, Copy)]
pub struct CalibrationStore {
    pub state: RwSignal<CalibrationsState>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self {
            state: create_state(),
        }
    }

    pub fn load_calibrations(&self) {
        self.load_calibrations_with(HttpCalibrationsApi);
    }

    pub fn load_calibrations_with<A: CalibrationsApi + 'static>(&self, api: A) {
        let state = self.state;
        state.update(|s| s.begin_load());
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api.fetch_calibrations().await;
            state.update(|s| s.apply_load(outcome));
        });
    }

    pub fn open_calibro_folder(&self) {
        self.open_calibro_folder_with(HttpCalibrationsApi);
    }

    pub fn open_calibro_folder_with<A: CalibrationsApi + 'static>(&self, api: A) {
        let state = self.state;
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api.open_folder().await;
            state.update(|s| s.apply_open_folder(outcome));
        });
    }

    pub fn save_calibration(&self, data: CalibrationData) {
        self.save_calibration_with(HttpCalibrationsApi, data);
    }

    pub fn save_calibration_with<A: CalibrationsApi + 'static>(&self, api: A, data: CalibrationData) {
        let state = self.state;
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api.save_calibration(&data).await;
            state.update(|s| s.apply_save(outcome));
        });
    }

    pub fn update_calibration(&self, data: CalibrationData) {
        self.update_calibration_with(HttpCalibrationsApi, data);
    }

    pub fn update_calibration_with<A: CalibrationsApi + 'static>(
        &self,
        api: A,
        data: CalibrationData,
    ) {
        let state = self.state;
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api.update_calibration(&data).await;
            state.update(|s| s.apply_update(outcome));
        });
    }

    pub fn generate_pdf(&self, certificate_number: String) {
        self.generate_pdf_with(HttpCalibrationsApi, certificate_number);
    }

    pub fn generate_pdf_with<A: CalibrationsApi + 'static>(
        &self,
        api: A,
        certificate_number: String,
    ) {
        let state = self.state;
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = api.generate_pdf(&certificate_number).await;
            state.update(|s| s.apply_generate_pdf(outcome));
        });
    }
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::calibration::aggregate::Measurement;

    fn record(certificate_number: &str) -> CalibrationData {
        CalibrationData {
            measurements: vec![Measurement {
                name: "TP-1".into(),
                voltage: 230.0,
                current: 1.5,
                frequency: 50.0,
                power: 345.0,
            }],
            calibration_date: "2024-01-01".into(),
            certificate_number: certificate_number.into(),
            model_details: "X".into(),
            company_name: "Acme".into(),
            po_number: "PO-1".into(),
            customer: None,
        }
    }

    #[test]
    fn successful_load_replaces_records_wholesale() {
        let mut state = CalibrationsState::default();
        state.records = vec![record("C-old")];

        state.begin_load();
        state.apply_load(Ok(vec![record("C-1"), record("C-2")]));

        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].certificate_number, "C-1");
        assert!(!state.loading);
        assert_eq!(state.message, "");
    }

    #[test]
    fn failed_load_keeps_stale_records_and_sets_message() {
        let mut state = CalibrationsState::default();
        state.apply_load(Ok(vec![record("C-1")]));

        state.begin_load();
        state.apply_load(Err("timeout".into()));

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].certificate_number, "C-1");
        assert_eq!(state.message, "Error loading calibrations: timeout");
        assert!(!state.loading);
    }

    #[test]
    fn failed_load_on_empty_store_matches_contract() {
        let mut state = CalibrationsState::default();
        state.apply_load(Err("timeout".into()));

        assert_eq!(state.message, "Error loading calibrations: timeout");
        assert!(state.records.is_empty());
    }

    #[test]
    fn loading_is_true_only_while_in_flight() {
        let mut state = CalibrationsState::default();
        assert!(!state.loading);

        state.begin_load();
        assert!(state.loading);
        state.apply_load(Ok(Vec::new()));
        assert!(!state.loading);

        state.begin_load();
        state.apply_load(Err("boom".into()));
        assert!(!state.loading);
    }

    #[test]
    fn open_folder_success_changes_nothing() {
        let mut state = CalibrationsState::default();
        state.apply_load(Ok(vec![record("C-1")]));
        let before = state.clone();

        state.apply_open_folder(Ok(()));

        assert_eq!(state, before);
    }

    #[test]
    fn open_folder_failure_only_sets_message() {
        let mut state = CalibrationsState::default();
        state.apply_load(Ok(vec![record("C-1")]));

        state.apply_open_folder(Err("denied".into()));

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.message, "Error opening folder: denied");
    }

    #[test]
    fn null_customer_survives_a_load() {
        let json = r#"[{
            "measurements": [],
            "calibration_date": "2024-01-01",
            "certificate_number": "C-1",
            "model_details": "X",
            "company_name": "Acme",
            "po_number": "PO-1",
            "customer": null
        }]"#;
        let records: Vec<CalibrationData> = serde_json::from_str(json).unwrap();

        let mut state = CalibrationsState::default();
        state.apply_load(Ok(records));

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].customer, None);
    }

    #[test]
    fn save_outcome_lands_in_message() {
        let mut state = CalibrationsState::default();
        state.apply_save(Ok("Calibration data saved successfully".into()));
        assert_eq!(state.message, "Calibration data saved successfully");

        state.apply_save(Err("Calibration C-1 already exists".into()));
        assert_eq!(
            state.message,
            "Error saving calibration: Calibration C-1 already exists"
        );
    }

    #[test]
    fn later_outcome_overwrites_earlier_message() {
        // No in-flight guard: whichever call settles last wins.
        let mut state = CalibrationsState::default();
        state.apply_open_folder(Err("first".into()));
        state.apply_load(Err("second".into()));
        assert_eq!(state.message, "Error loading calibrations: second");
    }
}
