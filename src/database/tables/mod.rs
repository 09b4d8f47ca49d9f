pub mod alert_log;
pub mod sensor_data;
pub mod threshold_settings;
