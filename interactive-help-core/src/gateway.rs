//! Messaging gateway seam.
//!
//! The navigator talks to the chat transport exclusively through
//! [`MessagingGateway`], enabling pluggable transports (in-memory for tests,
//! console, a real chat client).

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;

use crate::types::{
    ChannelHandle, MessageHandle, ReactionEvent, RenderedPage, TextEvent, UserId,
};

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Return the private channel with `user`, creating it if absent.
    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelHandle>;

    async fn send(&self, channel: &ChannelHandle, page: &RenderedPage) -> Result<MessageHandle>;

    /// Offer `symbol` as a reaction on `message`.
    async fn register_selectable_reaction(&self, message: &MessageHandle, symbol: &str)
        -> Result<()>;

    /// Suspend until `user` reacts to `message`.
    async fn await_reaction(&self, user: &UserId, message: &MessageHandle)
        -> Result<ReactionEvent>;

    /// Suspend until `user` writes in `channel`.
    async fn await_message(&self, user: &UserId, channel: &ChannelHandle) -> Result<TextEvent>;

    async fn delete_message(&self, message: &MessageHandle) -> Result<()>;
}

// ─── InputQueue ───────────────────────────────────────────────

/// One input from a user, as delivered by a transport.
#[derive(Clone, Debug, PartialEq)]
pub enum UserInput {
    Reaction(ReactionEvent),
    Text(TextEvent),
}

impl UserInput {
    pub fn reaction(symbol: impl Into<String>) -> Self {
        UserInput::Reaction(ReactionEvent::new(symbol))
    }

    pub fn text(text: impl Into<String>) -> Self {
        UserInput::Text(TextEvent::new(text))
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: HashMap<UserId, VecDeque<UserInput>>,
    text_listeners: HashMap<UserId, usize>,
}

/// Per-user inbox with chat-transport delivery rules, shared by the
/// in-memory and console gateways.
///
/// Inputs are consumed in arrival order. A text message at the head of a
/// user's inbox while nobody awaits text for that user is dropped, as a chat
/// client drops events no listener is waiting for. Register the text waiter
/// before the reaction waiter when racing both (`tokio::select!` with
/// `biased;`), so a typed answer is never taken for a stray.
#[derive(Debug, Default)]
pub struct InputQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, user: &UserId, input: UserInput) {
        self.lock()
            .pending
            .entry(user.clone())
            .or_default()
            .push_back(input);
        self.notify.notify_waiters();
    }

    pub fn pending(&self, user: &UserId) -> usize {
        self.lock().pending.get(user).map_or(0, VecDeque::len)
    }

    pub async fn next_reaction(&self, user: &UserId) -> ReactionEvent {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                let listening = state.text_listeners.get(user).copied().unwrap_or(0) > 0;
                if let Some(queue) = state.pending.get_mut(user) {
                    loop {
                        match queue.front() {
                            Some(UserInput::Reaction(_)) => {
                                if let Some(UserInput::Reaction(event)) = queue.pop_front() {
                                    return event;
                                }
                            }
                            Some(UserInput::Text(_)) if !listening => {
                                let dropped = queue.pop_front();
                                debug!(%user, ?dropped, "dropping text nobody waits for");
                            }
                            _ => break,
                        }
                    }
                }
            }

            notified.await;
        }
    }

    pub async fn next_text(&self, user: &UserId) -> TextEvent {
        let _listener = TextListener::register(self, user);
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(queue) = state.pending.get_mut(user) {
                    if matches!(queue.front(), Some(UserInput::Text(_))) {
                        if let Some(UserInput::Text(event)) = queue.pop_front() {
                            return event;
                        }
                    }
                }
            }

            notified.await;
        }
    }
}

/// Marks a pending text wait for one user; unregisters on drop.
struct TextListener<'a> {
    queue: &'a InputQueue,
    user: UserId,
}

impl<'a> TextListener<'a> {
    fn register(queue: &'a InputQueue, user: &UserId) -> Self {
        *queue
            .lock()
            .text_listeners
            .entry(user.clone())
            .or_default() += 1;
        Self {
            queue,
            user: user.clone(),
        }
    }
}

impl Drop for TextListener<'_> {
    fn drop(&mut self) {
        let mut state = self.queue.lock();
        if let Some(count) = state.text_listeners.get_mut(&self.user) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.text_listeners.remove(&self.user);
            }
        }
        drop(state);
        self.queue.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1")
    }

    #[tokio::test]
    async fn test_reactions_in_order() {
        let q = InputQueue::new();
        q.push(&user(), UserInput::reaction("1"));
        q.push(&user(), UserInput::reaction("2"));
        assert_eq!(q.next_reaction(&user()).await.symbol, "1");
        assert_eq!(q.next_reaction(&user()).await.symbol, "2");
    }

    #[tokio::test]
    async fn test_stray_text_dropped_without_listener() {
        let q = InputQueue::new();
        q.push(&user(), UserInput::text("hello?"));
        q.push(&user(), UserInput::reaction("1"));
        assert_eq!(q.next_reaction(&user()).await.symbol, "1");
        assert_eq!(q.pending(&user()), 0);
    }

    #[tokio::test]
    async fn test_text_kept_for_text_listener() {
        let q = InputQueue::new();
        q.push(&user(), UserInput::text("Iron Guild"));
        let u = user();
        let event = tokio::select! {
            biased;
            t = q.next_text(&u) => UserInput::Text(t),
            r = q.next_reaction(&u) => UserInput::Reaction(r),
        };
        assert_eq!(event, UserInput::text("Iron Guild"));
    }

    #[tokio::test]
    async fn test_reaction_wins_race_over_later_text() {
        let q = InputQueue::new();
        q.push(&user(), UserInput::reaction("🔙"));
        q.push(&user(), UserInput::text("late"));
        let u = user();
        let event = tokio::select! {
            biased;
            t = q.next_text(&u) => UserInput::Text(t),
            r = q.next_reaction(&u) => UserInput::Reaction(r),
        };
        assert_eq!(event, UserInput::reaction("🔙"));
        // Nobody listens for text any more: the late message is dropped on
        // the next reaction wait.
        q.push(&user(), UserInput::reaction("1"));
        assert_eq!(q.next_reaction(&user()).await.symbol, "1");
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_push() {
        let q = std::sync::Arc::new(InputQueue::new());
        let waiter = {
            let q = q.clone();
            tokio::spawn(async move { q.next_reaction(&UserId::new("u1")).await })
        };
        tokio::task::yield_now().await;
        q.push(&user(), UserInput::reaction("👌"));
        assert_eq!(waiter.await.unwrap().symbol, "👌");
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let q = InputQueue::new();
        q.push(&UserId::new("other"), UserInput::reaction("2"));
        q.push(&user(), UserInput::reaction("1"));
        assert_eq!(q.next_reaction(&user()).await.symbol, "1");
        assert_eq!(q.pending(&UserId::new("other")), 1);
    }
}
