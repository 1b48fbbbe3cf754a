use leptos::prelude::*;

use crate::domain::calibration::ui::{NewCalibrationPage, PastCalibrationsPage};

/// The two pages reachable from the navigation bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    NewCalibration,
    PastCalibrations,
}

impl Route {
    /// Parse a `location.hash` fragment. The root path redirects to the
    /// new-calibration page; unknown fragments land there as well.
    pub fn from_hash(hash: &str) -> Self {
        match hash.trim_start_matches('#') {
            "/past" => Route::PastCalibrations,
            _ => Route::NewCalibration,
        }
    }

    pub fn to_hash(self) -> &'static str {
        match self {
            Route::NewCalibration => "#/new",
            Route::PastCalibrations => "#/past",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::NewCalibration => "New Calibration",
            Route::PastCalibrations => "Past Calibrations",
        }
    }
}

/// Hash-based router state: the current route lives in a signal and is
/// mirrored into the URL fragment.
#[derive(Clone, Copy)]
pub struct RouterContext {
    pub current: RwSignal<Route>,
}

impl RouterContext {
    pub fn new() -> Self {
        let initial = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .map(|hash| Route::from_hash(&hash))
            .unwrap_or(Route::NewCalibration);
        Self {
            current: RwSignal::new(initial),
        }
    }

    /// Mirror the route signal into `location.hash`. Runs once when the
    /// shell component is created.
    pub fn init_router_integration(&self) {
        let this = *self;
        Effect::new(move |_| {
            let new_hash = this.current.get().to_hash();

            let current_hash = web_sys::window()
                .and_then(|w| w.location().hash().ok())
                .unwrap_or_default();

            // Only update the URL if it actually changed
            if current_hash != new_hash {
                if let Some(w) = web_sys::window() {
                    if let Ok(history) = w.history() {
                        let _ = history.replace_state_with_url(
                            &wasm_bindgen::JsValue::NULL,
                            "",
                            Some(new_hash),
                        );
                    }
                }
            }
        });
    }

    pub fn navigate(&self, route: Route) {
        self.current.set(route);
    }
}

impl Default for RouterContext {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn AppRoutes() -> impl IntoView {
    let router = use_context::<RouterContext>().expect("RouterContext not found in context");
    router.init_router_integration();

    let nav_class = move |route: Route| {
        if router.current.get() == route {
            "nav__link nav__link--active"
        } else {
            "nav__link"
        }
    };

    view! {
        <div class="app">
            <nav class="nav">
                <span class="nav__title">{"Calibration Records"}</span>
                <button
                    class=move || nav_class(Route::NewCalibration)
                    on:click=move |_| router.navigate(Route::NewCalibration)
                >
                    {Route::NewCalibration.title()}
                </button>
                <button
                    class=move || nav_class(Route::PastCalibrations)
                    on:click=move |_| router.navigate(Route::PastCalibrations)
                >
                    {Route::PastCalibrations.title()}
                </button>
            </nav>
            <main class="content">
                {move || match router.current.get() {
                    Route::NewCalibration => view! { <NewCalibrationPage /> }.into_any(),
                    Route::PastCalibrations => view! { <PastCalibrationsPage /> }.into_any(),
                }}
            </main>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_redirects_to_new() {
        assert_eq!(Route::from_hash(""), Route::NewCalibration);
        assert_eq!(Route::from_hash("#"), Route::NewCalibration);
        assert_eq!(Route::from_hash("#/"), Route::NewCalibration);
    }

    #[test]
    fn root_and_new_render_the_same_route() {
        assert_eq!(Route::from_hash(""), Route::from_hash("#/new"));
        assert_eq!(Route::from_hash("#/"), Route::from_hash("#/new"));
    }

    #[test]
    fn known_fragments_parse() {
        assert_eq!(Route::from_hash("#/new"), Route::NewCalibration);
        assert_eq!(Route::from_hash("#/past"), Route::PastCalibrations);
    }

    #[test]
    fn unknown_fragments_fall_back_to_new() {
        assert_eq!(Route::from_hash("#/bogus"), Route::NewCalibration);
    }

    #[test]
    fn hash_round_trips() {
        for route in [Route::NewCalibration, Route::PastCalibrations] {
            assert_eq!(Route::from_hash(route.to_hash()), route);
        }
    }
}
