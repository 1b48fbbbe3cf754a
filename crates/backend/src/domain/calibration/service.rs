use std::path::{Path, PathBuf};

use anyhow::Context;
use contracts::domain::calibration::aggregate::CalibrationData;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use super::repository;
use crate::shared::config::{self, Config};
use crate::shared::pdf;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Calibration {0} already exists")]
    DuplicateCertificate(String),
    #[error("Calibration {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Persist a new certificate. Certificate numbers are the natural key, so a
/// second record under the same number is rejected up front.
pub async fn save(db: &DatabaseConnection, data: &CalibrationData) -> ServiceResult<String> {
    if repository::find_row_by_certificate(db, &data.certificate_number)
        .await?
        .is_some()
    {
        return Err(ServiceError::DuplicateCertificate(
            data.certificate_number.clone(),
        ));
    }

    repository::insert(db, data).await?;
    Ok("Calibration data saved successfully".to_string())
}

/// Overwrite the record stored under `data.certificate_number`.
pub async fn update(db: &DatabaseConnection, data: &CalibrationData) -> ServiceResult<String> {
    let found = repository::update(db, data).await?;
    if !found {
        return Err(ServiceError::NotFound(data.certificate_number.clone()));
    }
    Ok("Calibration updated successfully".to_string())
}

pub async fn list_all(db: &DatabaseConnection) -> ServiceResult<Vec<CalibrationData>> {
    Ok(repository::list_all(db).await?)
}

/// Open the data directory in the OS file browser.
pub fn open_data_folder(config: &Config) -> ServiceResult<()> {
    let dir = config::get_data_dir(config);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    opener::open(&dir).with_context(|| format!("opening {}", dir.display()))?;
    Ok(())
}

/// Folder a certificate PDF lands in: a per-customer subfolder when the
/// record names a customer, `general` otherwise.
fn certificate_dir(data_dir: &Path, customer: Option<&str>) -> PathBuf {
    let base = data_dir.join("certificates");
    match customer {
        Some(customer) => base.join(customer.replace(' ', "_")),
        None => base.join("general"),
    }
}

/// Render the certificate PDF for `certificate_number` and open it in the
/// system viewer. Returns the path it was written to.
pub async fn generate_pdf(
    db: &DatabaseConnection,
    config: &Config,
    certificate_number: &str,
) -> ServiceResult<PathBuf> {
    let data = repository::get_by_certificate(db, certificate_number)
        .await?
        .ok_or_else(|| ServiceError::NotFound(certificate_number.to_string()))?;

    let dir = certificate_dir(&config::get_data_dir(config), data.customer.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating certificate directory {}", dir.display()))?;

    let cert_path = dir.join(format!("{}.pdf", certificate_number));
    pdf::generate_certificate(&data, &cert_path)?;

    opener::open(&cert_path).with_context(|| format!("opening {}", cert_path.display()))?;

    Ok(cert_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use contracts::domain::calibration::aggregate::Measurement;
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    fn sample(certificate_number: &str) -> CalibrationData {
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

    #[tokio::test]
    async fn save_then_list() {
        let db = test_db().await;
        let confirmation = save(&db, &sample("C-1")).await.unwrap();
        assert_eq!(confirmation, "Calibration data saved successfully");

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].customer, None);
    }

    #[tokio::test]
    async fn duplicate_certificate_is_rejected() {
        let db = test_db().await;
        save(&db, &sample("C-1")).await.unwrap();

        let err = save(&db, &sample("C-1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateCertificate(ref c) if c == "C-1"));
        assert_eq!(err.to_string(), "Calibration C-1 already exists");
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let db = test_db().await;
        let err = update(&db, &sample("C-404")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref c) if c == "C-404"));
    }

    #[test]
    fn certificate_dir_uses_customer_subfolder() {
        let dir = certificate_dir(Path::new("/data"), Some("Acme Corp"));
        assert_eq!(dir, PathBuf::from("/data/certificates/Acme_Corp"));
    }

    #[test]
    fn certificate_dir_defaults_to_general() {
        let dir = certificate_dir(Path::new("/data"), None);
        assert_eq!(dir, PathBuf::from("/data/certificates/general"));
    }
}
