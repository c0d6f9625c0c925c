pub mod alert;
pub mod analytics;
pub mod chart;
pub mod price;
pub mod settings;
pub mod state;
pub mod transaction;
