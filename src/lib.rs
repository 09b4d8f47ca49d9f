pub mod alert;
pub mod channels;
pub mod config;
pub mod context;
pub mod database;
pub mod feed;
pub mod monitor;
pub mod presenter;
pub mod recorder;
pub mod sensor;
pub mod settings;
pub mod simulator;
pub mod status;
pub mod store;
pub mod system;
pub mod timer;
