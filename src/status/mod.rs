pub mod domain;
pub mod logic;
