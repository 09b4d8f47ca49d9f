//! Módulo de persistencia para las lecturas vigentes de los sensores.
//!


use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};
use crate::database::domain::SensorDataRow;
use crate::sensor::domain::Reading;


/// Crea la tabla `sensor_data`, con una fila por `(fan_id, sensor_type)`.
///
/// # Schema
/// * `fan_id`: Identificador del ventilador.
/// * `sensor_type`: `temperature`, `humidity`, `vibration` o `gas`.
/// * `value`: Último valor leído.
/// * `timestamp`: Momento de la lectura.
pub async fn create_table_sensor_data(pool: &PgPool) -> Result<(), sqlx::Error>  {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_data (
            fan_id               INTEGER NOT NULL,
            sensor_type          TEXT NOT NULL,
            value                DOUBLE PRECISION NOT NULL,
            unit                 TEXT NOT NULL,
            timestamp            TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (fan_id, sensor_type)
        );
        "#
    )
        .await?;

    Ok(())
}


/// Inserta o reemplaza un lote de lecturas (último valor gana).
pub async fn upsert_sensor_data(conn: &mut PgConnection,
                                data_vec: Vec<Reading>
) -> Result<(), sqlx::Error> {

    if data_vec.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO sensor_data (fan_id, sensor_type, value, unit, timestamp) "
    );

    query_builder.push_values(data_vec, |mut b, data| {
        b.push_bind(i32::from(data.fan_id))
            .push_bind(data.sensor_type.as_str())
            .push_bind(data.value)
            .push_bind(data.unit)
            .push_bind(data.timestamp);
    });

    query_builder.push(
        " ON CONFLICT (fan_id, sensor_type) DO UPDATE SET
            value = EXCLUDED.value,
            unit = EXCLUDED.unit,
            timestamp = EXCLUDED.timestamp"
    );

    let query = query_builder.build();
    query.execute(&mut *conn).await?;

    Ok(())
}


pub async fn select_sensor_data(pool: &PgPool) -> Result<Vec<SensorDataRow>, sqlx::Error> {
    sqlx::query_as::<_, SensorDataRow>(
        "SELECT fan_id, sensor_type, value, unit, timestamp FROM sensor_data ORDER BY fan_id, sensor_type"
    )
        .fetch_all(pool)
        .await
}
