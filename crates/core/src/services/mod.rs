pub mod alert_service;
pub mod analytics_service;
pub mod chart_service;
pub mod export_service;
pub mod portfolio_service;
pub mod price_feed;
pub mod price_service;
