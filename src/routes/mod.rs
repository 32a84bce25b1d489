pub mod health;
pub mod subscriptions;

pub use health::create_health_routes;
pub use subscriptions::create_subscription_routes;
