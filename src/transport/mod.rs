//! Chat transport: outbound message kinds, the `Channel` seam, delivery with
//! retry, the Telegram Bot API client and the webhook gateway.

pub mod gateway;
pub mod outbound;
pub mod recording;
pub mod retry;
pub mod telegram;
pub mod traits;

pub use outbound::{ChatAction, Outbound, PREFIX_AUDIO, PREFIX_PHOTO};
pub use recording::RecordingChannel;
pub use retry::{RetryPolicy, deliver};
pub use telegram::TelegramChannel;
pub use traits::{Channel, ChannelFuture, IncomingMessage};
