pub mod crypto;
pub mod envelope;
pub mod memory;
pub mod preferences;
pub mod repository;
pub mod vault;
