use super::{POLL_BACKOFF, TelegramChannel};
use crate::sessions::ChatId;
use crate::transport::outbound::{ChatAction, Outbound};
use crate::transport::traits::{Channel, ChannelFuture, IncomingMessage};

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send<'a>(&'a self, outbound: &'a Outbound) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            self.call(outbound.endpoint(), &outbound.body()).await?;
            Ok(())
        })
    }

    fn send_chat_action<'a>(&'a self, chat: ChatId, action: ChatAction) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            let body = serde_json::json!({ "chat_id": chat, "action": action });
            self.call("sendChatAction", &body).await?;
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<IncomingMessage>,
    ) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let updates = match self.get_updates(offset).await {
                    Ok(updates) => updates,
                    Err(error) => {
                        tracing::warn!(%error, "Telegram poll error");
                        tokio::time::sleep(POLL_BACKOFF).await;
                        continue;
                    }
                };

                for update in updates {
                    // Advance offset past this update
                    offset = offset.max(update.update_id + 1);

                    let Some(message) = IncomingMessage::from_update(update) else {
                        continue;
                    };
                    tracing::debug!(chat_id = %message.chat, text = %message.text, "telegram update");

                    if tx.send(message).await.is_err() {
                        return Ok(());
                    }
                }
            }
        })
    }
}
