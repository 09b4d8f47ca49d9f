pub mod domain;
pub mod logic;
pub mod repository;
pub mod tables;
