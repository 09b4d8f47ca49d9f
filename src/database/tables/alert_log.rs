//! Módulo de persistencia para el historial de alertas.
//!


use sqlx::{Executor, PgConnection, PgPool};
use crate::alert::domain::{AlertId, NewAlert};
use crate::database::domain::AlertLogRow;


/// Crea la tabla `alert_log`.
///
/// # Schema
/// * `id`: Serial (Auto-incremental), orden de inserción.
/// * `value` / `threshold`: Valores formateados al momento de la detección.
/// * `status`: `Warning` o `Critical`.
pub async fn create_table_alert_log(pool: &PgPool) -> Result<(), sqlx::Error>  {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS alert_log (
            id                   BIGSERIAL PRIMARY KEY,
            fan_id               INTEGER NOT NULL,
            fan_name             TEXT NOT NULL,
            sensor_type          TEXT NOT NULL,
            value                TEXT NOT NULL,
            threshold            TEXT NOT NULL,
            unit                 TEXT NOT NULL,
            status               TEXT NOT NULL,
            timestamp            TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#
    )
        .await?;

    Ok(())
}


pub async fn insert_alert_log(conn: &mut PgConnection,
                              alert: NewAlert
) -> Result<AlertId, sqlx::Error> {

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO alert_log (fan_id, fan_name, sensor_type, value, threshold, unit, status, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id"
    )
        .bind(i32::from(alert.fan_id))
        .bind(alert.fan_name)
        .bind(alert.sensor_type.as_str())
        .bind(alert.value)
        .bind(alert.threshold)
        .bind(alert.unit)
        .bind(alert.status.as_str())
        .bind(alert.timestamp)
        .fetch_one(&mut *conn)
        .await
}


/// Historial completo, más reciente primero (a igual marca, mayor `id` primero).
pub async fn select_alert_log(pool: &PgPool) -> Result<Vec<AlertLogRow>, sqlx::Error> {
    sqlx::query_as::<_, AlertLogRow>(
        "SELECT id, fan_id, fan_name, sensor_type, value, threshold, unit, status, timestamp
         FROM alert_log
         ORDER BY timestamp DESC, id DESC"
    )
        .fetch_all(pool)
        .await
}


pub async fn delete_alert_log(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM alert_log").execute(&mut *conn).await?;
    Ok(())
}
