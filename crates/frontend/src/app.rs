use crate::domain::calibration::store::CalibrationStore;
use crate::layout::global_context::AppGlobalContext;
use crate::routes::routes::{AppRoutes, RouterContext};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Shared state for the whole app via context.
    provide_context(AppGlobalContext::new());
    provide_context(CalibrationStore::new());
    provide_context(RouterContext::new());

    view! {
        <AppRoutes />
    }
}
