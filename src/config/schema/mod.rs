mod core;
mod delivery;
mod gateway;
mod observability;
mod story;
mod telegram;

pub use self::core::Config;
pub use delivery::DeliveryConfig;
pub use gateway::GatewayConfig;
pub use observability::ObservabilityConfig;
pub use story::StoryConfig;
pub use telegram::TelegramConfig;
