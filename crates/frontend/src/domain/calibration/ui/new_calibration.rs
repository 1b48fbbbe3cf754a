use crate::domain::calibration::store::CalibrationStore;
use crate::layout::global_context::AppGlobalContext;
use contracts::domain::calibration::aggregate::{CalibrationData, Measurement};
use leptos::prelude::*;

/// Customer is optional: a blank input stays absent instead of becoming an
/// empty string.
fn normalize_customer(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// ViewModel for the calibration entry form.
#[derive(Clone, Copy)]
pub struct NewCalibrationViewModel {
    pub form: RwSignal<CalibrationData>,
    /// True when the form was seeded from an existing record; submit then
    /// updates in place instead of saving a new certificate.
    pub editing: RwSignal<bool>,
}

impl NewCalibrationViewModel {
    pub fn new() -> Self {
        let mut blank = CalibrationData::blank();
        blank.measurements.push(Measurement::blank());
        Self {
            form: RwSignal::new(blank),
            editing: RwSignal::new(false),
        }
    }

    /// Seed the form from a pending edit request, if any.
    pub fn load_edit_request(&self, globals: &AppGlobalContext) {
        if let Some(record) = globals.take_edit_request() {
            self.form.set(record);
            self.editing.set(true);
        }
    }

    pub fn add_measurement(&self) {
        self.form.update(|f| f.measurements.push(Measurement::blank()));
    }

    pub fn remove_measurement(&self, index: usize) {
        self.form.update(|f| {
            if index < f.measurements.len() {
                f.measurements.remove(index);
            }
        });
    }

    pub fn reset(&self) {
        let mut blank = CalibrationData::blank();
        blank.measurements.push(Measurement::blank());
        self.form.set(blank);
        self.editing.set(false);
    }

    pub fn submit(&self, store: CalibrationStore) {
        let current = self.form.get_untracked();
        if self.editing.get_untracked() {
            store.update_calibration(current);
        } else {
            store.save_calibration(current);
        }
    }
}

impl Default for NewCalibrationViewModel {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
#[allow(non_snake_case)]
pub fn NewCalibrationPage() -> impl IntoView {
    let store = use_context::<CalibrationStore>().expect("CalibrationStore not found in context");
    let globals =
        use_context::<AppGlobalContext>().expect("AppGlobalContext not found in context");

    let vm = NewCalibrationViewModel::new();
    vm.load_edit_request(&globals);

    let message = move || store.state.get().message;
    let measurement_count = move || vm.form.get().measurements.len();

    view! {
        <div class="page">
            <div class="header">
                <div class="header__content">
                    <h1 class="header__title">
                        {move || if vm.editing.get() { "Edit Calibration" } else { "New Calibration" }}
                    </h1>
                </div>
                <div class="header__actions">
                    <button class="button button--secondary" on:click=move |_| vm.reset()>
                        {"Clear"}
                    </button>
                    <button class="button button--primary" on:click=move |_| vm.submit(store)>
                        {move || if vm.editing.get() { "Update Calibration" } else { "Save Calibration" }}
                    </button>
                </div>
            </div>

            {move || {
                let text = message();
                (!text.is_empty()).then(|| view! {
                    <div class="warning-box">
                        <span class="warning-box__text">{text}</span>
                    </div>
                })
            }}

            <div class="details-form">
                <div class="form-group">
                    <label for="certificate_number">{"Certificate Number"}</label>
                    <input
                        type="text"
                        id="certificate_number"
                        prop:value=move || vm.form.get().certificate_number
                        prop:disabled=move || vm.editing.get()
                        on:input=move |ev| {
                            vm.form.update(|f| f.certificate_number = event_target_value(&ev));
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="calibration_date">{"Calibration Date"}</label>
                    <input
                        type="date"
                        id="calibration_date"
                        prop:value=move || vm.form.get().calibration_date
                        on:input=move |ev| {
                            vm.form.update(|f| f.calibration_date = event_target_value(&ev));
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="company_name">{"Company"}</label>
                    <input
                        type="text"
                        id="company_name"
                        prop:value=move || vm.form.get().company_name
                        on:input=move |ev| {
                            vm.form.update(|f| f.company_name = event_target_value(&ev));
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="customer">{"Customer (optional)"}</label>
                    <input
                        type="text"
                        id="customer"
                        prop:value=move || vm.form.get().customer.unwrap_or_default()
                        on:input=move |ev| {
                            vm.form.update(|f| f.customer = normalize_customer(&event_target_value(&ev)));
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="po_number">{"PO Number"}</label>
                    <input
                        type="text"
                        id="po_number"
                        prop:value=move || vm.form.get().po_number
                        on:input=move |ev| {
                            vm.form.update(|f| f.po_number = event_target_value(&ev));
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="model_details">{"Model Details"}</label>
                    <input
                        type="text"
                        id="model_details"
                        prop:value=move || vm.form.get().model_details
                        on:input=move |ev| {
                            vm.form.update(|f| f.model_details = event_target_value(&ev));
                        }
                    />
                </div>
            </div>

            <div class="header">
                <div class="header__content">
                    <h2 class="header__title">{"Measurements"}</h2>
                </div>
                <div class="header__actions">
                    <button class="button button--secondary" on:click=move |_| vm.add_measurement()>
                        {"Add Measurement"}
                    </button>
                </div>
            </div>

            {move || (0..measurement_count()).map(|i| {
                let value_of = move || {
                    vm.form.get().measurements.get(i).cloned().unwrap_or_else(Measurement::blank)
                };
                view! {
                    <div class="measurement-row">
                        <input
                            type="text"
                            placeholder="Test point"
                            prop:value=move || value_of().name
                            on:input=move |ev| vm.form.update(|f| {
                                if let Some(m) = f.measurements.get_mut(i) {
                                    m.name = event_target_value(&ev);
                                }
                            })
                        />
                        <input
                            type="number"
                            placeholder="Voltage (V)"
                            prop:value=move || value_of().voltage.to_string()
                            on:input=move |ev| vm.form.update(|f| {
                                if let Some(m) = f.measurements.get_mut(i) {
                                    m.voltage = event_target_value(&ev).parse().unwrap_or(0.0);
                                }
                            })
                        />
                        <input
                            type="number"
                            placeholder="Current (A)"
                            prop:value=move || value_of().current.to_string()
                            on:input=move |ev| vm.form.update(|f| {
                                if let Some(m) = f.measurements.get_mut(i) {
                                    m.current = event_target_value(&ev).parse().unwrap_or(0.0);
                                }
                            })
                        />
                        <input
                            type="number"
                            placeholder="Frequency (Hz)"
                            prop:value=move || value_of().frequency.to_string()
                            on:input=move |ev| vm.form.update(|f| {
                                if let Some(m) = f.measurements.get_mut(i) {
                                    m.frequency = event_target_value(&ev).parse().unwrap_or(0.0);
                                }
                            })
                        />
                        <input
                            type="number"
                            placeholder="Power (W)"
                            prop:value=move || value_of().power.to_string()
                            on:input=move |ev| vm.form.update(|f| {
                                if let Some(m) = f.measurements.get_mut(i) {
                                    m.power = event_target_value(&ev).parse().unwrap_or(0.0);
                                }
                            })
                        />
                        <button class="button button--small" on:click=move |_| vm.remove_measurement(i)>
                            {"Remove"}
                        </button>
                    </div>
                }
            }).collect_view()}
        </div>
    }
}
