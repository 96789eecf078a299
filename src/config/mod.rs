pub mod schema;

pub use schema::{
    Config, DeliveryConfig, GatewayConfig, ObservabilityConfig, StoryConfig, TelegramConfig,
};
