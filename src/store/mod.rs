pub mod domain;
pub mod memory;
pub mod subscription;
