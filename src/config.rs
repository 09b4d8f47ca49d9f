pub mod fans {
    use crate::sensor::domain::FanId;

    pub const IDS: [FanId; 2] = [1, 2];
}

pub mod evaluation {
    /// Por encima de `valor / umbral > CRITICAL_RATIO` la severidad pasa a `Critical`.
    pub const CRITICAL_RATIO: f64 = 1.1;
    /// Ventana usada para contar alertas recientes en la presentación.
    pub const RECENT_ALERT_WINDOW_HOURS: i64 = 24;
}

pub mod channels {
    pub const MONITOR_INBOX: usize = 64;
    pub const RECORDER: usize = 200;
    pub const TIMER: usize = 10;
    pub const SUBSCRIPTION: usize = 16;
}

pub mod postgres {
    use tokio::time::{Duration};

    pub const WAIT_FOR: Duration = Duration::from_secs(5);
    pub const CHANNEL_SENSOR_DATA: &str = "sensor_data";
    pub const CHANNEL_THRESHOLD_SETTINGS: &str = "threshold_settings";
    pub const CHANNEL_ALERT_LOG: &str = "alert_log";
}
