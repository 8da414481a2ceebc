//! Terminal transport.
//!
//! Pages are printed to a writer; lines read from a reader become user
//! input. A line naming a reaction symbol used anywhere in the help graph is
//! a reaction, anything else is a text message. Keycap triggers can be typed
//! as their bare digit, and `q` leaves the help.
//!
//! Lines are classified against the whole graph rather than the page on
//! screen, so input typed (or piped) ahead of a page still follows links.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use interactive_help::{
    ChannelHandle, HelpGraph, InputQueue, MessageHandle, MessagingGateway, Presentation,
    ReactionEvent, RenderedPage, TextEvent, UserId, UserInput,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

const RULE: &str = "────────────────────────────────────────";

pub struct ConsoleGateway<W> {
    user: UserId,
    exit: String,
    symbols: HashSet<String>,
    out: tokio::sync::Mutex<W>,
    inputs: InputQueue,
    channel: Mutex<Option<ChannelHandle>>,
}

impl<W> ConsoleGateway<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Console for `user` browsing `graph`.
    pub fn new(user: UserId, out: W, graph: &HelpGraph) -> Self {
        let symbols = graph
            .page_ids()
            .filter_map(|id| graph.page(id))
            .flat_map(|page| page.trigger_list())
            .map(str::to_string)
            .collect();
        Self {
            user,
            exit: graph.exit_trigger().to_string(),
            symbols,
            out: tokio::sync::Mutex::new(out),
            inputs: InputQueue::new(),
            channel: Mutex::new(None),
        }
    }

    fn classify(&self, line: &str) -> UserInput {
        let line = line.trim();
        if line == "q" || line == self.exit {
            return UserInput::reaction(self.exit.clone());
        }
        if self.symbols.contains(line) {
            return UserInput::reaction(line);
        }
        if line.len() == 1 && line.bytes().all(|b| b.is_ascii_digit()) {
            let keycap = format!("{}\u{20e3}", line);
            if self.symbols.contains(&keycap) {
                return UserInput::reaction(keycap);
            }
        }
        UserInput::text(line)
    }

    /// Feed lines from `reader` to the session until end of input, which
    /// counts as leaving the help.
    pub fn spawn_reader<R>(self: &Arc<Self>, reader: R) -> JoinHandle<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let console = Arc::clone(self);
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        let input = console.classify(&line);
                        debug!(?input, "console input");
                        console.inputs.push(&console.user, input);
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "stdin read failed");
                        break;
                    }
                }
            }
            console
                .inputs
                .push(&console.user, UserInput::reaction(console.exit.clone()));
        })
    }

    async fn write(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> MessagingGateway for ConsoleGateway<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn open_private_channel(&self, _user: &UserId) -> Result<ChannelHandle> {
        let mut channel = self.channel.lock().unwrap_or_else(|e| e.into_inner());
        let channel = channel.get_or_insert_with(|| ChannelHandle {
            channel_id: Uuid::now_v7().to_string(),
        });
        Ok(channel.clone())
    }

    async fn send(&self, channel: &ChannelHandle, page: &RenderedPage) -> Result<MessageHandle> {
        let handle = MessageHandle {
            message_id: Uuid::now_v7().to_string(),
            channel_id: channel.channel_id.clone(),
        };

        let mut block = String::new();
        block.push_str(RULE);
        block.push('\n');
        if let Presentation::Embed {
            title: Some(title), ..
        } = &page.presentation
        {
            block.push_str(&format!("{}\n\n", title));
        }
        block.push_str(&page.text);
        block.push('\n');
        block.push_str(RULE);
        block.push('\n');
        self.write(&block).await?;
        Ok(handle)
    }

    async fn register_selectable_reaction(
        &self,
        message: &MessageHandle,
        symbol: &str,
    ) -> Result<()> {
        debug!(message_id = %message.message_id, %symbol, "reaction offered");
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
        debug!(message_id = %message.message_id, "message closed");
        Ok(())
    }
}
