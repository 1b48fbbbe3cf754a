use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::calibration::aggregate::CalibrationData;

use crate::domain::calibration::service::{self, ServiceError};
use crate::shared::config;
use crate::shared::data::db;

/// Failures carry their display string in the body so the UI can surface
/// the raw error text in its message line.
fn error_response(err: ServiceError) -> (StatusCode, String) {
    let status = match &err {
        ServiceError::DuplicateCertificate(_) => StatusCode::CONFLICT,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!("calibration request failed: {err}");
    (status, err.to_string())
}

/// GET /api/calibrations
pub async fn list_all() -> Result<Json<Vec<CalibrationData>>, (StatusCode, String)> {
    service::list_all(db::get_connection())
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /api/calibrations
pub async fn save(
    Json(data): Json<CalibrationData>,
) -> Result<String, (StatusCode, String)> {
    service::save(db::get_connection(), &data)
        .await
        .map_err(error_response)
}

/// PUT /api/calibrations
pub async fn update(
    Json(data): Json<CalibrationData>,
) -> Result<String, (StatusCode, String)> {
    service::update(db::get_connection(), &data)
        .await
        .map_err(error_response)
}

/// POST /api/folder/open
pub async fn open_folder() -> Result<(), (StatusCode, String)> {
    service::open_data_folder(config::get_config()).map_err(error_response)
}

/// POST /api/calibrations/:certificate_number/pdf
pub async fn generate_pdf(
    Path(certificate_number): Path<String>,
) -> Result<(), (StatusCode, String)> {
    service::generate_pdf(db::get_connection(), config::get_config(), &certificate_number)
        .await
        .map(|_| ())
        .map_err(error_response)
}
