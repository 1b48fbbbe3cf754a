use contracts::domain::calibration::aggregate::CalibrationData;
use leptos::prelude::*;

/// App-wide UI state shared across pages via context.
#[derive(Clone, Copy)]
pub struct AppGlobalContext {
    /// Record picked on the past-calibrations page for editing; the
    /// new-calibration page takes it when it mounts.
    pub edit_request: RwSignal<Option<CalibrationData>>,
}

impl AppGlobalContext {
    pub fn new() -> Self {
        Self {
            edit_request: RwSignal::new(None),
        }
    }

    pub fn request_edit(&self, record: CalibrationData) {
        self.edit_request.set(Some(record));
    }

    /// Take the pending edit request, leaving none behind.
    pub fn take_edit_request(&self) -> Option<CalibrationData> {
        let taken = self.edit_request.get_untracked();
        if taken.is_some() {
            self.edit_request.set(None);
        }
        taken
    }
}

impl Default for AppGlobalContext {
    fn default() -> Self {
        Self::new()
    }
}
