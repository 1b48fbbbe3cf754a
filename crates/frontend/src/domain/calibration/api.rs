use contracts::domain::calibration::aggregate::CalibrationData;

use crate::shared::api_utils::api_url;

/// Narrow client interface for the calibration backend.
///
/// The store depends on this trait only, so the transport stays swappable
/// and state transitions can be exercised without a server.
#[allow(async_fn_in_trait)]
pub trait CalibrationsApi {
    async fn fetch_calibrations(&self) -> Result<Vec<CalibrationData>, String>;
    async fn open_folder(&self) -> Result<(), String>;
    async fn save_calibration(&self, data: &CalibrationData) -> Result<String, String>;
    async fn update_calibration(&self, data: &CalibrationData) -> Result<String, String>;
    async fn generate_pdf(&self, certificate_number: &str) -> Result<(), String>;
}

/// HTTP implementation over the browser fetch API.
#[derive(Clone, Copy, Default)]
pub struct HttpCalibrationsApi;

async fn read_text(resp: &web_sys::Response) -> Result<String, String> {
    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("{e:?}"))?;
    text.as_string().ok_or_else(|| "bad text".to_string())
}

async fn request(
    method: &str,
    path: &str,
    body: Option<String>,
) -> Result<web_sys::Response, String> {
    use wasm_bindgen::JsCast;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = &body {
        opts.set_body(&wasm_bindgen::JsValue::from_str(body));
    }

    let request =
        Request::new_with_str_and_init(&api_url(path), &opts).map_err(|e| format!("{e:?}"))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| format!("{e:?}"))?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| format!("{e:?}"))?;
    }

    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let resp_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{e:?}"))?;
    let resp: Response = resp_value.dyn_into().map_err(|e| format!("{e:?}"))?;

    if !resp.ok() {
        // The backend puts the error display string in the body
        let detail = read_text(&resp).await.unwrap_or_default();
        if detail.is_empty() {
            return Err(format!("HTTP {}", resp.status()));
        }
        return Err(detail);
    }
    Ok(resp)
}

impl CalibrationsApi for HttpCalibrationsApi {
    async fn fetch_calibrations(&self) -> Result<Vec<CalibrationData>, String> {
        let resp = request("GET", "/api/calibrations", None).await?;
        let text = read_text(&resp).await?;
        serde_json::from_str(&text).map_err(|e| format!("{e}"))
    }

    async fn open_folder(&self) -> Result<(), String> {
        request("POST", "/api/folder/open", None).await?;
        Ok(())
    }

    async fn save_calibration(&self, data: &CalibrationData) -> Result<String, String> {
        let body = serde_json::to_string(data).map_err(|e| format!("{e}"))?;
        let resp = request("POST", "/api/calibrations", Some(body)).await?;
        read_text(&resp).await
    }

    async fn update_calibration(&self, data: &CalibrationData) -> Result<String, String> {
        let body = serde_json::to_string(data).map_err(|e| format!("{e}"))?;
        let resp = request("PUT", "/api/calibrations", Some(body)).await?;
        read_text(&resp).await
    }

    async fn generate_pdf(&self, certificate_number: &str) -> Result<(), String> {
        let path = format!("/api/calibrations/{}/pdf", certificate_number);
        request("POST", &path, None).await?;
        Ok(())
    }
}
