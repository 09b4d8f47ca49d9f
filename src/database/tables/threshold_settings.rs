//! Módulo de persistencia para los umbrales configurados.
//!


use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};
use crate::database::domain::ThresholdRow;
use crate::sensor::domain::ThresholdSet;


/// Crea la tabla `threshold_settings`, un umbral por `(fan_id, sensor_type)`.
pub async fn create_table_threshold_settings(pool: &PgPool) -> Result<(), sqlx::Error>  {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS threshold_settings (
            fan_id               INTEGER NOT NULL,
            sensor_type          TEXT NOT NULL,
            value                DOUBLE PRECISION NOT NULL,
            unit                 TEXT NOT NULL,
            PRIMARY KEY (fan_id, sensor_type)
        );
        "#
    )
        .await?;

    Ok(())
}


pub async fn select_threshold_settings(pool: &PgPool) -> Result<Vec<ThresholdRow>, sqlx::Error> {
    sqlx::query_as::<_, ThresholdRow>(
        "SELECT fan_id, sensor_type, value, unit FROM threshold_settings ORDER BY fan_id, sensor_type"
    )
        .fetch_all(pool)
        .await
}


/// Bloquea la tabla contra escrituras concurrentes hasta el fin de la transacción.
pub async fn lock_threshold_settings(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("LOCK TABLE threshold_settings IN SHARE ROW EXCLUSIVE MODE").execute(&mut *conn).await?;
    Ok(())
}


pub async fn count_threshold_settings(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM threshold_settings")
        .fetch_one(&mut *conn)
        .await
}


/// Borra todos los umbrales e inserta `thresholds`. Debe ejecutarse dentro de una
/// transacción para que el reemplazo sea atómico.
pub async fn replace_threshold_settings(conn: &mut PgConnection,
                                        thresholds: ThresholdSet
) -> Result<(), sqlx::Error> {

    sqlx::query("DELETE FROM threshold_settings").execute(&mut *conn).await?;

    if thresholds.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO threshold_settings (fan_id, sensor_type, value, unit) "
    );

    query_builder.push_values(thresholds.iter(), |mut b, data| {
        b.push_bind(i32::from(data.fan_id))
            .push_bind(data.sensor_type.as_str())
            .push_bind(data.value)
            .push_bind(data.unit.clone());
    });

    let query = query_builder.build();
    query.execute(&mut *conn).await?;

    Ok(())
}
