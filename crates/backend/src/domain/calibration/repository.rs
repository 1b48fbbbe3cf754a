use chrono::Utc;
use contracts::domain::calibration::aggregate::{CalibrationData, Measurement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

pub mod calibration_row {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "calibration")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub calibration_date: String,
        pub certificate_number: String,
        pub model_details: String,
        pub company_name: String,
        pub po_number: String,
        pub customer: Option<String>,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::measurement_row::Entity")]
        Measurement,
    }

    impl Related<super::measurement_row::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Measurement.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod measurement_row {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "measurement")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub calibration_id: i32,
        pub name: String,
        pub voltage: f64,
        pub current: f64,
        pub frequency: f64,
        pub power: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::calibration_row::Entity",
            from = "Column::CalibrationId",
            to = "super::calibration_row::Column::Id"
        )]
        Calibration,
    }

    impl Related<super::calibration_row::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Calibration.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

fn to_measurement(m: measurement_row::Model) -> Measurement {
    Measurement {
        name: m.name,
        voltage: m.voltage,
        current: m.current,
        frequency: m.frequency,
        power: m.power,
    }
}

fn to_calibration(row: calibration_row::Model, measurements: Vec<Measurement>) -> CalibrationData {
    CalibrationData {
        measurements,
        calibration_date: row.calibration_date,
        certificate_number: row.certificate_number,
        model_details: row.model_details,
        company_name: row.company_name,
        po_number: row.po_number,
        customer: row.customer,
    }
}

async fn measurements_for(
    db: &DatabaseConnection,
    calibration_id: i32,
) -> anyhow::Result<Vec<Measurement>> {
    let rows = measurement_row::Entity::find()
        .filter(measurement_row::Column::CalibrationId.eq(calibration_id))
        .order_by_asc(measurement_row::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_measurement).collect())
}

async fn insert_measurements<C: ConnectionTrait>(
    conn: &C,
    calibration_id: i32,
    items: &[Measurement],
) -> anyhow::Result<()> {
    for m in items {
        let active = measurement_row::ActiveModel {
            calibration_id: Set(calibration_id),
            name: Set(m.name.clone()),
            voltage: Set(m.voltage),
            current: Set(m.current),
            frequency: Set(m.frequency),
            power: Set(m.power),
            ..Default::default()
        };
        active.insert(conn).await?;
    }
    Ok(())
}

/// All records, newest first, each with its measurement rows.
pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<CalibrationData>> {
    let rows = calibration_row::Entity::find()
        .order_by_desc(calibration_row::Column::CreatedAt)
        .all(db)
        .await?;

    let mut calibrations = Vec::with_capacity(rows.len());
    for row in rows {
        let measurements = measurements_for(db, row.id).await?;
        calibrations.push(to_calibration(row, measurements));
    }
    Ok(calibrations)
}

pub async fn find_row_by_certificate(
    db: &DatabaseConnection,
    certificate_number: &str,
) -> anyhow::Result<Option<calibration_row::Model>> {
    let row = calibration_row::Entity::find()
        .filter(calibration_row::Column::CertificateNumber.eq(certificate_number))
        .one(db)
        .await?;
    Ok(row)
}

pub async fn get_by_certificate(
    db: &DatabaseConnection,
    certificate_number: &str,
) -> anyhow::Result<Option<CalibrationData>> {
    let Some(row) = find_row_by_certificate(db, certificate_number).await? else {
        return Ok(None);
    };
    let measurements = measurements_for(db, row.id).await?;
    Ok(Some(to_calibration(row, measurements)))
}

/// Insert a record and its measurement rows in one transaction.
pub async fn insert(db: &DatabaseConnection, data: &CalibrationData) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    let active = calibration_row::ActiveModel {
        calibration_date: Set(data.calibration_date.clone()),
        certificate_number: Set(data.certificate_number.clone()),
        model_details: Set(data.model_details.clone()),
        company_name: Set(data.company_name.clone()),
        po_number: Set(data.po_number.clone()),
        customer: Set(data.customer.clone()),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    };
    let row = active.insert(&txn).await?;

    insert_measurements(&txn, row.id, &data.measurements).await?;

    txn.commit().await?;
    Ok(())
}

/// Update the record with `data.certificate_number`, replacing its
/// measurement rows wholesale. Returns false when no such record exists.
pub async fn update(db: &DatabaseConnection, data: &CalibrationData) -> anyhow::Result<bool> {
    let Some(existing) = find_row_by_certificate(db, &data.certificate_number).await? else {
        return Ok(false);
    };

    let txn = db.begin().await?;

    let mut active = existing.clone().into_active_model();
    active.calibration_date = Set(data.calibration_date.clone());
    active.model_details = Set(data.model_details.clone());
    active.company_name = Set(data.company_name.clone());
    active.po_number = Set(data.po_number.clone());
    active.customer = Set(data.customer.clone());
    active.update(&txn).await?;

    measurement_row::Entity::delete_many()
        .filter(measurement_row::Column::CalibrationId.eq(existing.id))
        .exec(&txn)
        .await?;
    insert_measurements(&txn, existing.id, &data.measurements).await?;

    txn.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    fn sample(certificate_number: &str, customer: Option<&str>) -> CalibrationData {
        CalibrationData {
            measurements: vec![
                Measurement {
                    name: "TP-1".into(),
                    voltage: 230.0,
                    current: 1.5,
                    frequency: 50.0,
                    power: 345.0,
                },
                Measurement {
                    name: "TP-2".into(),
                    voltage: 115.0,
                    current: 0.5,
                    frequency: 60.0,
                    power: 57.5,
                },
            ],
            calibration_date: "2024-01-01".into(),
            certificate_number: certificate_number.into(),
            model_details: "X".into(),
            company_name: "Acme".into(),
            po_number: "PO-1".into(),
            customer: customer.map(Into::into),
        }
    }

    #[tokio::test]
    async fn insert_then_list_round_trips() {
        let db = test_db().await;
        insert(&db, &sample("C-1", None)).await.unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].certificate_number, "C-1");
        assert_eq!(all[0].customer, None);
        assert_eq!(all[0].measurements.len(), 2);
        assert_eq!(all[0].measurements[0].name, "TP-1");
        assert_eq!(all[0].measurements[1].power, 57.5);
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let db = test_db().await;
        insert(&db, &sample("C-1", None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        insert(&db, &sample("C-2", Some("Globex"))).await.unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].certificate_number, "C-2");
        assert_eq!(all[1].certificate_number, "C-1");
    }

    #[tokio::test]
    async fn update_replaces_measurement_rows() {
        let db = test_db().await;
        insert(&db, &sample("C-1", None)).await.unwrap();

        let mut changed = sample("C-1", Some("Globex"));
        changed.measurements = vec![Measurement {
            name: "TP-9".into(),
            voltage: 12.0,
            current: 0.1,
            frequency: 400.0,
            power: 1.2,
        }];
        changed.po_number = "PO-2".into();

        let found = update(&db, &changed).await.unwrap();
        assert!(found);

        let stored = get_by_certificate(&db, "C-1").await.unwrap().unwrap();
        assert_eq!(stored.po_number, "PO-2");
        assert_eq!(stored.customer, Some("Globex".to_string()));
        assert_eq!(stored.measurements.len(), 1);
        assert_eq!(stored.measurements[0].name, "TP-9");
    }

    #[tokio::test]
    async fn update_of_unknown_certificate_reports_missing() {
        let db = test_db().await;
        let found = update(&db, &sample("C-404", None)).await.unwrap();
        assert!(!found);
    }

    #[tokio::test]
    async fn duplicate_certificate_violates_unique_constraint() {
        let db = test_db().await;
        insert(&db, &sample("C-1", None)).await.unwrap();
        assert!(insert(&db, &sample("C-1", None)).await.is_err());
    }
}
