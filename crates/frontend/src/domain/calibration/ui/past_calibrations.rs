use crate::domain::calibration::store::CalibrationStore;
use crate::layout::global_context::AppGlobalContext;
use crate::routes::routes::{Route, RouterContext};
use contracts::domain::calibration::aggregate::CalibrationData;
use leptos::prelude::*;

#[derive(Clone, Debug)]
pub struct CalibrationRow {
    pub certificate_number: String,
    pub calibration_date: String,
    pub company_name: String,
    pub customer: String,
    pub po_number: String,
    pub model_details: String,
    pub measurement_count: usize,
}

impl From<&CalibrationData> for CalibrationRow {
    fn from(c: &CalibrationData) -> Self {
        Self {
            certificate_number: c.certificate_number.clone(),
            calibration_date: c.calibration_date.clone(),
            company_name: c.company_name.clone(),
            customer: c.customer.clone().unwrap_or_else(|| "-".to_string()),
            po_number: c.po_number.clone(),
            model_details: c.model_details.clone(),
            measurement_count: c.measurements.len(),
        }
    }
}

#[component]
#[allow(non_snake_case)]
pub fn PastCalibrationsPage() -> impl IntoView {
    let store = use_context::<CalibrationStore>().expect("CalibrationStore not found in context");
    let globals =
        use_context::<AppGlobalContext>().expect("AppGlobalContext not found in context");
    let router = use_context::<RouterContext>().expect("RouterContext not found in context");

    store.load_calibrations();

    let rows = move || {
        store
            .state
            .get()
            .records
            .iter()
            .map(CalibrationRow::from)
            .collect::<Vec<_>>()
    };
    let message = move || store.state.get().message;
    let loading = move || store.state.get().loading;

    // Hand the full record to the new-calibration page for editing
    let handle_edit = move |certificate_number: String| {
        let record = store
            .state
            .get_untracked()
            .records
            .iter()
            .find(|r| r.certificate_number == certificate_number)
            .cloned();
        if let Some(record) = record {
            globals.request_edit(record);
            router.navigate(Route::NewCalibration);
        }
    };

    view! {
        <div class="page">
            <div class="header">
                <div class="header__content">
                    <h1 class="header__title">{"Past Calibrations"}</h1>
                </div>
                <div class="header__actions">
                    <button class="button button--secondary" on:click=move |_| store.load_calibrations()>
                        {"Refresh"}
                    </button>
                    <button class="button button--secondary" on:click=move |_| store.open_calibro_folder()>
                        {"Open Folder"}
                    </button>
                </div>
            </div>

            {move || {
                let text = message();
                (!text.is_empty()).then(|| view! {
                    <div class="warning-box">
                        <span class="warning-box__icon">"⚠"</span>
                        <span class="warning-box__text">{text}</span>
                    </div>
                })
            }}

            <Show when=move || loading()>
                <div class="loading-indicator">{"Loading..."}</div>
            </Show>

            <div class="table">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            <th class="table__header-cell">{"Certificate"}</th>
                            <th class="table__header-cell">{"Date"}</th>
                            <th class="table__header-cell">{"Company"}</th>
                            <th class="table__header-cell">{"Customer"}</th>
                            <th class="table__header-cell">{"PO"}</th>
                            <th class="table__header-cell">{"Model"}</th>
                            <th class="table__header-cell">{"Measurements"}</th>
                            <th class="table__header-cell">{"Actions"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || rows().into_iter().map(|row| {
                            let cert_for_click = row.certificate_number.clone();
                            let cert_for_pdf = row.certificate_number.clone();
                            view! {
                                <tr
                                    class="table__row"
                                    on:click=move |_| handle_edit(cert_for_click.clone())
                                >
                                    <td class="table__cell">{row.certificate_number.clone()}</td>
                                    <td class="table__cell">{row.calibration_date}</td>
                                    <td class="table__cell">{row.company_name}</td>
                                    <td class="table__cell">{row.customer}</td>
                                    <td class="table__cell">{row.po_number}</td>
                                    <td class="table__cell">{row.model_details}</td>
                                    <td class="table__cell">{row.measurement_count}</td>
                                    <td class="table__cell">
                                        <button
                                            class="button button--small"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                store.generate_pdf(cert_for_pdf.clone());
                                            }
                                        >
                                            {"PDF"}
                                        </button>
                                    </td>
                                </tr>
                            }
                        }).collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}
