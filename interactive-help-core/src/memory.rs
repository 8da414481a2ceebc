//! In-memory gateway for tests and simulations.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::gateway::{InputQueue, MessagingGateway, UserInput};
use crate::types::{
    ChannelHandle, MessageHandle, ReactionEvent, RenderedPage, TextEvent, UserId,
};

/// A page the gateway was asked to send.
#[derive(Clone, Debug, PartialEq)]
pub struct SentMessage {
    pub handle: MessageHandle,
    pub user: UserId,
    pub page: RenderedPage,
}

#[derive(Debug, Default)]
struct Log {
    channels: HashMap<UserId, ChannelHandle>,
    channel_users: HashMap<String, UserId>,
    channels_created: usize,
    sent: Vec<SentMessage>,
    reactions: Vec<(String, String)>,
    deleted: Vec<MessageHandle>,
}

/// Records everything the navigator does and replays scripted user input.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inputs: InputQueue,
    log: Mutex<Log>,
    changed: Notify,
    fail_next_send: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, user: &UserId, input: UserInput) {
        self.inputs.push(user, input);
    }

    pub fn push_reaction(&self, user: &UserId, symbol: &str) {
        self.push(user, UserInput::reaction(symbol));
    }

    pub fn push_text(&self, user: &UserId, text: &str) {
        self.push(user, UserInput::text(text));
    }

    /// Queue a whole conversation for `user`.
    pub fn script(&self, user: &UserId, inputs: impl IntoIterator<Item = UserInput>) {
        for input in inputs {
            self.push(user, input);
        }
    }

    /// Make the next `send` fail with a transport error.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.log().sent.clone()
    }

    pub fn sent_to(&self, user: &UserId) -> Vec<SentMessage> {
        self.log()
            .sent
            .iter()
            .filter(|m| &m.user == user)
            .cloned()
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageHandle> {
        self.log().deleted.clone()
    }

    /// Symbols registered on `message`, in completion order.
    pub fn registered_reactions(&self, message: &MessageHandle) -> Vec<String> {
        self.log()
            .reactions
            .iter()
            .filter(|(id, _)| *id == message.message_id)
            .map(|(_, symbol)| symbol.clone())
            .collect()
    }

    pub fn channels_created(&self) -> usize {
        self.log().channels_created
    }

    /// Wait until at least `count` messages were sent to `user`.
    pub async fn wait_for_sent(&self, user: &UserId, count: usize) -> Vec<SentMessage> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let sent = self.sent_to(user);
            if sent.len() >= count {
                return sent;
            }
            notified.await;
        }
    }

    /// Wait until at least `count` reactions were registered on `message`.
    pub async fn wait_for_reactions(&self, message: &MessageHandle, count: usize) -> Vec<String> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let registered = self.registered_reactions(message);
            if registered.len() >= count {
                return registered;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl MessagingGateway for MemoryGateway {
    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelHandle> {
        let mut log = self.log();
        if let Some(channel) = log.channels.get(user) {
            return Ok(channel.clone());
        }
        let channel = ChannelHandle {
            channel_id: Uuid::now_v7().to_string(),
        };
        log.channels_created += 1;
        log.channels.insert(user.clone(), channel.clone());
        log.channel_users
            .insert(channel.channel_id.clone(), user.clone());
        Ok(channel)
    }

    async fn send(&self, channel: &ChannelHandle, page: &RenderedPage) -> Result<MessageHandle> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("send rejected by transport"));
        }
        let handle = {
            let mut log = self.log();
            let user = log
                .channel_users
                .get(&channel.channel_id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown channel {}", channel.channel_id))?;
            let handle = MessageHandle {
                message_id: Uuid::now_v7().to_string(),
                channel_id: channel.channel_id.clone(),
            };
            log.sent.push(SentMessage {
                handle: handle.clone(),
                user,
                page: page.clone(),
            });
            handle
        };
        self.changed.notify_waiters();
        Ok(handle)
    }

    async fn register_selectable_reaction(
        &self,
        message: &MessageHandle,
        symbol: &str,
    ) -> Result<()> {
        self.log()
            .reactions
            .push((message.message_id.clone(), symbol.to_string()));
        self.changed.notify_waiters();
        Ok(())
    }

    async fn await_reaction(
        &self,
        user: &UserId,
        _message: &MessageHandle,
    ) -> Result<ReactionEvent> {
        Ok(self.inputs.next_reaction(user).await)
    }

    async fn await_message(&self, user: &UserId, _channel: &ChannelHandle) -> Result<TextEvent> {
        Ok(self.inputs.next_text(user).await)
    }

    async fn delete_message(&self, message: &MessageHandle) -> Result<()> {
        self.log().deleted.push(message.clone());
        self.changed.notify_waiters();
        Ok(())
    }
}
