//! Session driver.
//!
//! One navigator serves every user. Each call to [`Navigator::start_session`]
//! runs one traversal to completion:
//!
//! ```text
//! DISPLAYING ──► AWAITING_INPUT ──► RESOLVING ──► DISPLAYING
//!                  ▲      │ unknown       │
//!                  └──────┘ reaction      └──► TERMINATED (exit trigger)
//! ```
//!
//! There is no timeout: a session waits until the user leaves through the
//! exit trigger or the gateway fails.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::NavError;
use crate::events::SessionEvent;
use crate::gateway::{MessagingGateway, UserInput};
use crate::graph::HelpGraph;
use crate::link::Link;
use crate::page::Page;
use crate::session::{SessionContext, SessionReport, SessionState};
use crate::types::{ChannelHandle, EntryId, MessageHandle, PageId, UserId};

pub struct Navigator {
    gateway: Arc<dyn MessagingGateway>,
    graph: Arc<HelpGraph>,
}

impl Navigator {
    pub fn new(gateway: Arc<dyn MessagingGateway>, graph: Arc<HelpGraph>) -> Self {
        Self { gateway, graph }
    }

    pub fn graph(&self) -> &HelpGraph {
        &self.graph
    }

    pub fn gateway(&self) -> &Arc<dyn MessagingGateway> {
        &self.gateway
    }

    /// Run a session for `user` starting on `entry` until the user exits.
    ///
    /// The entry page has no inbound link: no callback runs before it is
    /// first displayed.
    pub async fn start_session(
        &self,
        user: &UserId,
        entry: PageId,
    ) -> Result<SessionReport, NavError> {
        self.graph.page(entry).ok_or(NavError::UnknownPage(entry))?;
        self.run(SessionContext::new(user.clone(), entry), None)
            .await
    }

    /// Run a session whose first page is chosen by an entry link.
    ///
    /// The link's callbacks run with an empty input history, exactly like a
    /// regular link taken from a page.
    pub async fn start_session_via(
        &self,
        user: &UserId,
        entry: EntryId,
    ) -> Result<SessionReport, NavError> {
        let link = self.graph.entry(entry).ok_or(NavError::UnknownEntry(entry))?;
        let first = link
            .targets()
            .first()
            .copied()
            .ok_or(NavError::UnknownEntry(entry))?;
        self.run(SessionContext::new(user.clone(), first), Some((entry, link)))
            .await
    }

    /// Run a session as its own task. A failure is logged and returned
    /// through the handle; other sessions keep running.
    pub fn spawn_session(
        self: &Arc<Self>,
        user: UserId,
        entry: PageId,
    ) -> JoinHandle<Result<SessionReport, NavError>> {
        let navigator = Arc::clone(self);
        tokio::spawn(async move {
            let result = navigator.start_session(&user, entry).await;
            if let Err(err) = &result {
                error!(%user, error = %err, "help session failed");
            }
            result
        })
    }

    async fn run(
        &self,
        mut session: SessionContext,
        via: Option<(EntryId, &Link)>,
    ) -> Result<SessionReport, NavError> {
        let span = info_span!(
            "help_session",
            session_id = %session.session_id(),
            user = %session.user(),
        );
        self.traverse(&mut session, via).instrument(span).await?;

        Ok(session.into_report())
    }

    async fn traverse(
        &self,
        session: &mut SessionContext,
        via: Option<(EntryId, &Link)>,
    ) -> Result<(), NavError> {
        if let Some((entry, link)) = via {
            let first = link.run_callbacks_and_select(session).await?;
            session.set_current_page(first);
            session.record(SessionEvent::EntryLinkTaken { entry, to: first });
        }
        info!(page = %session.current_page(), "session started");

        let user = session.user().clone();
        let exit = self.graph.exit_trigger();

        loop {
            // ── DISPLAYING ──
            session.set_state(SessionState::Displaying);
            let page_id = session.current_page();
            let page = self
                .graph
                .page(page_id)
                .ok_or(NavError::UnknownPage(page_id))?;

            let channel = self
                .gateway
                .open_private_channel(&user)
                .await
                .map_err(NavError::Gateway)?;
            let rendered = page.render(session.content_override(page_id), session.input_history());
            let message = self
                .gateway
                .send(&channel, &rendered)
                .await
                .map_err(NavError::Gateway)?;
            session.record(SessionEvent::Displayed {
                page: page_id,
                message_id: message.message_id.clone(),
            });
            debug!(page = %page_id, message_id = %message.message_id, "page displayed");
            self.register_triggers(&message, page);

            // ── AWAITING_INPUT ──
            session.set_state(SessionState::AwaitingInput);
            let (link, symbol) = loop {
                let input = self
                    .await_input(&user, &channel, &message, page.needs_free_text_input())
                    .await?;
                match input {
                    UserInput::Reaction(event) if event.symbol == exit => {
                        session.set_state(SessionState::Resolving);
                        self.gateway
                            .delete_message(&message)
                            .await
                            .map_err(NavError::Gateway)?;
                        session.set_state(SessionState::Terminated);
                        session.record(SessionEvent::Terminated { page: page_id });
                        info!(page = %page_id, "session terminated");
                        return Ok(());
                    }
                    UserInput::Reaction(event) => match page.resolve(Some(event.symbol.as_str())) {
                        Some(link) => break (link, Some(event.symbol)),
                        None => {
                            debug!(page = %page_id, symbol = %event.symbol, "ignoring reaction");
                            session.record(SessionEvent::InputIgnored {
                                page: page_id,
                                symbol: event.symbol,
                            });
                        }
                    },
                    UserInput::Text(event) => match page.resolve(None) {
                        Some(link) => {
                            let position = session.push_input(event.text);
                            session.record(SessionEvent::TextCaptured {
                                page: page_id,
                                position,
                            });
                            break (link, None);
                        }
                        None => debug!(page = %page_id, "ignoring text message"),
                    },
                }
            };

            // ── RESOLVING ──
            session.set_state(SessionState::Resolving);
            let next = link.run_callbacks_and_select(session).await?;
            self.gateway
                .delete_message(&message)
                .await
                .map_err(NavError::Gateway)?;
            debug!(from = %page_id, to = %next, kind = ?link.kind(), "link taken");
            session.record(SessionEvent::LinkTaken {
                from: page_id,
                kind: link.kind(),
                symbol,
                to: next,
            });
            session.set_current_page(next);
        }
    }

    /// Offer every trigger of `page` plus the exit trigger on `message`.
    /// Registrations run detached; a failed one only loses that reaction.
    fn register_triggers(&self, message: &MessageHandle, page: &Page) {
        let symbols = page
            .trigger_list()
            .into_iter()
            .chain(std::iter::once(self.graph.exit_trigger()))
            .map(str::to_string);

        for symbol in symbols {
            let gateway = Arc::clone(&self.gateway);
            let message = message.clone();
            tokio::spawn(
                async move {
                    if let Err(err) = gateway.register_selectable_reaction(&message, &symbol).await
                    {
                        warn!(
                            message_id = %message.message_id,
                            %symbol,
                            error = %err,
                            "failed to register reaction"
                        );
                    }
                }
                .in_current_span(),
            );
        }
    }

    /// Wait for a reaction, racing it against a typed message when the page
    /// has a free-text link. The text wait is registered first.
    async fn await_input(
        &self,
        user: &UserId,
        channel: &ChannelHandle,
        message: &MessageHandle,
        wants_text: bool,
    ) -> Result<UserInput, NavError> {
        let input = if wants_text {
            tokio::select! {
                biased;
                text = self.gateway.await_message(user, channel) => text.map(UserInput::Text),
                reaction = self.gateway.await_reaction(user, message) => {
                    reaction.map(UserInput::Reaction)
                }
            }
        } else {
            self.gateway
                .await_reaction(user, message)
                .await
                .map(UserInput::Reaction)
        };
        input.map_err(NavError::Gateway)
    }
}
