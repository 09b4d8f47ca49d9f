pub mod domain;
pub mod handle;
pub mod logic;
