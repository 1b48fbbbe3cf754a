use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Open (creating if necessary) the sqlite database at `db_path`, bring its
/// schema up to date, and store the connection for process-wide access.
pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    migrate_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("database already initialized"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

async fn execute(conn: &DatabaseConnection, sql: &str) -> anyhow::Result<()> {
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        sql.to_string(),
    ))
    .await?;
    Ok(())
}

/// Column names of `table`, empty when the table does not exist.
async fn table_columns(conn: &DatabaseConnection, table: &str) -> anyhow::Result<Vec<String>> {
    let pragma = format!("PRAGMA table_info('{}');", table);
    let rows = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, pragma))
        .await?;
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(row.try_get::<String>("", "name")?);
    }
    Ok(columns)
}

/// Create the tables when they do not exist yet (minimal schema bootstrap).
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    execute(
        conn,
        r#"
        CREATE TABLE IF NOT EXISTS calibration (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            calibration_date TEXT NOT NULL,
            certificate_number TEXT NOT NULL UNIQUE,
            model_details TEXT NOT NULL,
            company_name TEXT NOT NULL,
            po_number TEXT NOT NULL,
            customer TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .await?;

    execute(
        conn,
        r#"
        CREATE TABLE IF NOT EXISTS measurement (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            calibration_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            voltage REAL NOT NULL,
            current REAL NOT NULL,
            frequency REAL NOT NULL,
            power REAL NOT NULL,
            FOREIGN KEY(calibration_id) REFERENCES calibration(id)
        );
        "#,
    )
    .await?;

    Ok(())
}

/// Bring an existing database forward to the current schema.
///
/// Two historical layouts are handled:
/// - databases created before the optional `customer` field existed;
/// - databases where measurement values lived as columns on the
///   calibration table instead of in their own table.
pub async fn migrate_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let columns = table_columns(conn, "calibration").await?;
    if columns.is_empty() {
        return Ok(());
    }

    if !columns.iter().any(|c| c == "customer") {
        tracing::info!("Adding customer column to calibration table");
        execute(conn, "ALTER TABLE calibration ADD COLUMN customer TEXT;").await?;
    }

    let embedded_measurement_columns = ["voltage", "current", "frequency", "power"];
    if columns
        .iter()
        .any(|c| embedded_measurement_columns.contains(&c.as_str()))
    {
        tracing::info!("Rebuilding calibration table without embedded measurement columns");

        execute(
            conn,
            r#"
            CREATE TABLE calibration_new (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                calibration_date TEXT NOT NULL,
                certificate_number TEXT NOT NULL UNIQUE,
                model_details TEXT NOT NULL,
                company_name TEXT NOT NULL,
                po_number TEXT NOT NULL,
                customer TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .await?;

        execute(
            conn,
            r#"
            INSERT INTO calibration_new
                (id, calibration_date, certificate_number, model_details,
                 company_name, po_number, customer, created_at)
            SELECT id, calibration_date, certificate_number, model_details,
                   company_name, po_number, customer, created_at
            FROM calibration;
            "#,
        )
        .await?;

        execute(conn, "DROP TABLE calibration;").await?;
        execute(conn, "ALTER TABLE calibration_new RENAME TO calibration;").await?;

        tracing::info!("Calibration table rebuild completed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mem_conn() -> DatabaseConnection {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let conn = mem_conn().await;
        bootstrap_schema(&conn).await.unwrap();
        bootstrap_schema(&conn).await.unwrap();

        let columns = table_columns(&conn, "calibration").await.unwrap();
        assert!(columns.iter().any(|c| c == "certificate_number"));
        assert!(columns.iter().any(|c| c == "customer"));
    }

    #[tokio::test]
    async fn migration_adds_customer_column() {
        let conn = mem_conn().await;
        execute(
            &conn,
            r#"
            CREATE TABLE calibration (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                calibration_date TEXT NOT NULL,
                certificate_number TEXT NOT NULL UNIQUE,
                model_details TEXT NOT NULL,
                company_name TEXT NOT NULL,
                po_number TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .await
        .unwrap();
        execute(
            &conn,
            r#"
            INSERT INTO calibration
                (calibration_date, certificate_number, model_details,
                 company_name, po_number, created_at)
            VALUES ('2024-01-01', 'C-1', 'X', 'Acme', 'PO-1', '2024-01-01T00:00:00Z');
            "#,
        )
        .await
        .unwrap();

        migrate_schema(&conn).await.unwrap();

        let columns = table_columns(&conn, "calibration").await.unwrap();
        assert!(columns.iter().any(|c| c == "customer"));

        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT certificate_number, customer FROM calibration;".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].try_get::<String>("", "certificate_number").unwrap(),
            "C-1"
        );
        assert_eq!(rows[0].try_get::<Option<String>>("", "customer").unwrap(), None);
    }

    #[tokio::test]
    async fn migration_extracts_embedded_measurement_columns() {
        let conn = mem_conn().await;
        execute(
            &conn,
            r#"
            CREATE TABLE calibration (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                calibration_date TEXT NOT NULL,
                certificate_number TEXT NOT NULL UNIQUE,
                model_details TEXT NOT NULL,
                company_name TEXT NOT NULL,
                po_number TEXT NOT NULL,
                customer TEXT,
                voltage REAL,
                current REAL,
                frequency REAL,
                power REAL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .await
        .unwrap();
        execute(
            &conn,
            r#"
            INSERT INTO calibration
                (calibration_date, certificate_number, model_details, company_name,
                 po_number, customer, voltage, current, frequency, power, created_at)
            VALUES ('2024-01-01', 'C-9', 'X', 'Acme', 'PO-9', 'Globex',
                    230.0, 1.0, 50.0, 230.0, '2024-01-01T00:00:00Z');
            "#,
        )
        .await
        .unwrap();

        migrate_schema(&conn).await.unwrap();

        let columns = table_columns(&conn, "calibration").await.unwrap();
        assert!(!columns.iter().any(|c| c == "voltage"));
        assert!(columns.iter().any(|c| c == "customer"));

        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT certificate_number, customer FROM calibration;".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].try_get::<Option<String>>("", "customer").unwrap(),
            Some("Globex".to_string())
        );
    }
}
