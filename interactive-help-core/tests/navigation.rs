//! End-to-end navigation tests against the in-memory gateway
//!
//! These tests verify that:
//! 1. Reactions move between pages and shortcuts lead back
//! 2. The exit trigger deletes the displayed message and ends the session
//! 3. Free-text inputs accumulate in the session history
//! 4. Callbacks branch and rewrite content without leaking across sessions

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use interactive_help::{
    Callback, CallbackContext, ChannelHandle, GraphBuilder, HelpGraph, HookOutcome, LinkHook,
    LinkSpec, MemoryGateway, MessageHandle, MessagingGateway, NavError, Navigator, Page, PageId,
    ReactionEvent, RenderedPage, SentMessage, SessionEvent, Shortcut, TextEvent, UserId,
    UserInput, DEFAULT_EXIT_TRIGGER, DEFAULT_LINK_TRIGGERS,
};
use pretty_assertions::assert_eq;

const EXIT: &str = DEFAULT_EXIT_TRIGGER;
const ONE: &str = DEFAULT_LINK_TRIGGERS[0];

fn navigator(graph: HelpGraph) -> (Arc<MemoryGateway>, Arc<Navigator>) {
    let gateway = Arc::new(MemoryGateway::new());
    let navigator = Arc::new(Navigator::new(gateway.clone(), Arc::new(graph)));
    (gateway, navigator)
}

fn texts(sent: &[SentMessage]) -> Vec<String> {
    sent.iter().map(|m| m.page.text.clone()).collect()
}

/// A ──1⃣──► B, with B's parent shortcut back to A.
fn two_pages() -> (HelpGraph, PageId, PageId) {
    let mut builder = GraphBuilder::default();
    let a = builder.add_page(Page::new("Page A"));
    let b = builder.add_page(Page::new("Page B"));
    builder
        .add_link(a, LinkSpec::new(b).description("Go to B"))
        .unwrap();
    (builder.build().unwrap(), a, b)
}

// =============================================================================
// BASIC TRAVERSAL
// =============================================================================

#[tokio::test]
async fn test_round_trip_through_parent_shortcut() {
    let (graph, a, b) = two_pages();
    let (gw, nav) = navigator(graph);
    let ana = UserId::new("ana");
    gw.script(
        &ana,
        [
            UserInput::reaction(ONE),
            UserInput::reaction("🔙"),
            UserInput::reaction(EXIT),
        ],
    );

    let report = nav.start_session(&ana, a).await.unwrap();

    assert_eq!(report.final_page, a);
    assert!(report.input_history.is_empty());
    assert_eq!(report.displayed_pages(), vec![a, b, a]);
    assert_eq!(
        texts(&gw.sent_to(&ana)),
        vec!["Page A\n\n1\u{20e3} Go to B", "Page B", "Page A\n\n1\u{20e3} Go to B"]
    );
    assert_eq!(gw.deleted().len(), 3);
    assert_eq!(gw.channels_created(), 1);
}

#[tokio::test]
async fn test_exit_deletes_displayed_message_once() {
    let (graph, a, b) = two_pages();
    let (gw, nav) = navigator(graph);
    let ana = UserId::new("ana");
    gw.script(&ana, [UserInput::reaction(ONE), UserInput::reaction(EXIT)]);

    let report = nav.start_session(&ana, a).await.unwrap();

    let sent = gw.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        gw.deleted(),
        vec![sent[0].handle.clone(), sent[1].handle.clone()]
    );
    assert_eq!(
        report.events.last(),
        Some(&SessionEvent::Terminated { page: b })
    );
}

#[tokio::test]
async fn test_unknown_reaction_and_stray_text_are_ignored() {
    let (graph, a, b) = two_pages();
    let (gw, nav) = navigator(graph);
    let ana = UserId::new("ana");
    gw.script(
        &ana,
        [
            UserInput::reaction("🤷"),
            UserInput::text("hello?"),
            UserInput::reaction(ONE),
            UserInput::reaction(EXIT),
        ],
    );

    let report = nav.start_session(&ana, a).await.unwrap();

    assert_eq!(report.displayed_pages(), vec![a, b]);
    assert!(report.events.contains(&SessionEvent::InputIgnored {
        page: a,
        symbol: "🤷".into(),
    }));
    assert!(report.input_history.is_empty());
    assert_eq!(gw.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_without_exit_keeps_waiting() {
    let (graph, a, _) = two_pages();
    let (gw, nav) = navigator(graph);
    let ana = UserId::new("ana");

    let mut session = nav.spawn_session(ana.clone(), a);
    gw.wait_for_sent(&ana, 1).await;

    let waited = tokio::time::timeout(Duration::from_secs(24 * 3600), &mut session).await;
    assert!(waited.is_err(), "session ended without the exit trigger");

    gw.push_reaction(&ana, EXIT);
    let report = session.await.unwrap().unwrap();
    assert_eq!(report.final_page, a);
}

#[tokio::test]
async fn test_dead_end_page_waits_for_exit() {
    let mut builder = GraphBuilder::default();
    let end = builder.add_page(Page::new("Nothing to see here"));
    let (gw, nav) = navigator(builder.build().unwrap());
    let ana = UserId::new("ana");

    let session = nav.spawn_session(ana.clone(), end);
    let sent = gw.wait_for_sent(&ana, 1).await;
    assert_eq!(sent[0].page.text, "Nothing to see here");
    assert_eq!(gw.wait_for_reactions(&sent[0].handle, 1).await, vec![EXIT]);

    gw.push_reaction(&ana, EXIT);
    let report = session.await.unwrap().unwrap();
    assert_eq!(report.displayed_pages(), vec![end]);
}

#[tokio::test]
async fn test_every_trigger_and_exit_are_offered() {
    let mut builder = GraphBuilder::default();
    let root = builder.add_page(Page::new("Root"));
    let mid = builder.add_page(Page::new("Mid"));
    let leaf = builder.add_page(Page::new("Leaf"));
    builder.add_link(root, LinkSpec::new(mid)).unwrap();
    builder.add_link(mid, LinkSpec::new(leaf)).unwrap();
    builder
        .mark_as_root_of(root, &[mid, leaf], Shortcut::default())
        .unwrap();
    let (gw, nav) = navigator(builder.build().unwrap());
    let ana = UserId::new("ana");

    let session = nav.spawn_session(ana.clone(), mid);
    let sent = gw.wait_for_sent(&ana, 1).await;
    let mut registered = gw.wait_for_reactions(&sent[0].handle, 4).await;
    registered.sort();

    let mut expected = vec![ONE, "🔙", "🔝", EXIT];
    expected.sort();
    assert_eq!(registered, expected);

    gw.push_reaction(&ana, EXIT);
    session.await.unwrap().unwrap();
}

// =============================================================================
// FREE-TEXT INPUT
// =============================================================================

#[tokio::test]
async fn test_input_history_grows_per_text_hop() {
    let mut builder = GraphBuilder::default();
    let ask_name = builder.add_page(Page::new("Your name?"));
    let ask_colour = builder.add_page(Page::computed(|inputs| {
        format!(
            "Hi {}, favourite colour?",
            inputs.last().map(String::as_str).unwrap_or("stranger")
        )
    }));
    let done = builder.add_page(Page::computed(|inputs| inputs.join(" / ")));
    builder
        .add_link(ask_name, LinkSpec::new(ask_colour).free_text().backlink(false))
        .unwrap();
    builder
        .add_link(ask_colour, LinkSpec::new(done).free_text().backlink(false))
        .unwrap();
    let (gw, nav) = navigator(builder.build().unwrap());
    let ana = UserId::new("ana");
    gw.script(
        &ana,
        [
            UserInput::text("Ana"),
            UserInput::text("teal"),
            UserInput::reaction(EXIT),
        ],
    );

    let report = nav.start_session(&ana, ask_name).await.unwrap();

    assert_eq!(report.input_history, vec!["Ana", "teal"]);
    assert_eq!(
        texts(&gw.sent_to(&ana)),
        vec!["Your name?", "Hi Ana, favourite colour?", "Ana / teal"]
    );
    let positions: Vec<usize> = report
        .events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::TextCaptured { position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

// =============================================================================
// GUILD REGISTRATION (callbacks)
// =============================================================================

struct GuildDirectory {
    guilds: Vec<&'static str>,
}

#[async_trait]
impl LinkHook for GuildDirectory {
    async fn call(&self, _ctx: &CallbackContext<'_>) -> anyhow::Result<HookOutcome> {
        Ok(HookOutcome::SetContent(format!(
            "List of existing guilds :\n\n{}",
            self.guilds.join("\n")
        )))
    }
}

struct Guild {
    graph: HelpGraph,
    start: PageId,
    registered: PageId,
    taken: PageId,
    listing: PageId,
}

fn guild_graph() -> Guild {
    let mut b = GraphBuilder::default();
    let start = b.add_page(Page::new("Welcome to this (fake) guild functionality."));
    let guild = b.add_page(Page::new("What would you like to do ?"));
    let listing = b.add_page(Page::new(""));
    let register = b.add_page(Page::new(
        "To register your guild, first type the name of your guild",
    ));
    let leader = b.add_page(Page::new(
        "Good ! Now type the name of the leader of the guild",
    ));
    let registered = b.add_page(Page::new(""));
    let taken = b.add_page(Page::new("Sorry, this guild already exist..."));

    b.add_link(
        leader,
        LinkSpec::new([registered, taken])
            .free_text()
            .backlink(false)
            .callback(Callback::select(|ctx| {
                usize::from(ctx.input_from_end(1) == Some("blabla"))
            }))
            .callback(Callback::compute_content(|ctx| {
                if ctx.selected != 0 {
                    return None;
                }
                Some(format!(
                    "Congrats ! You created the guild {}, leaded by {} !",
                    ctx.input_from_end(2)?,
                    ctx.input_from_end(1)?
                ))
            })),
    )
    .unwrap();
    b.add_link(register, LinkSpec::new(leader).free_text().backlink(false))
        .unwrap();
    b.add_link(
        guild,
        LinkSpec::new(listing)
            .trigger("👁")
            .description("Get the list of existing guilds")
            .callback(Callback::hook(GuildDirectory {
                guilds: vec!["Iron Guild", "Mega Guild"],
            })),
    )
    .unwrap();
    b.add_link(
        guild,
        LinkSpec::new(register)
            .trigger("➕")
            .description("Register your own guild"),
    )
    .unwrap();
    b.add_link(
        start,
        LinkSpec::new(guild)
            .trigger("😀")
            .description("Let's get started !"),
    )
    .unwrap();
    b.mark_as_parent_of(guild, &[register, leader, registered, taken], Shortcut::default())
        .unwrap();
    b.mark_as_root_of(
        start,
        &[guild, listing, register, leader, registered, taken],
        Shortcut::default(),
    )
    .unwrap();

    Guild {
        graph: b.build().unwrap(),
        start,
        registered,
        taken,
        listing,
    }
}

fn register_script(guild_name: &str, leader: &str) -> Vec<UserInput> {
    vec![
        UserInput::reaction("😀"),
        UserInput::reaction("➕"),
        UserInput::text(guild_name),
        UserInput::text(leader),
        UserInput::reaction(EXIT),
    ]
}

#[tokio::test]
async fn test_guild_registration_succeeds() {
    let g = guild_graph();
    let (gw, nav) = navigator(g.graph);
    let ana = UserId::new("ana");
    // Only the leader name decides; a guild called "blabla" is fine.
    gw.script(&ana, register_script("blabla", "Sam"));

    let report = nav.start_session(&ana, g.start).await.unwrap();

    assert_eq!(report.final_page, g.registered);
    assert_eq!(report.input_history, vec!["blabla", "Sam"]);
    let sent = gw.sent_to(&ana);
    assert_eq!(
        sent.last().unwrap().page.text,
        "Congrats ! You created the guild blabla, leaded by Sam !"
    );
}

#[tokio::test]
async fn test_guild_registration_fails_for_reserved_leader() {
    let g = guild_graph();
    let (gw, nav) = navigator(g.graph);
    let ana = UserId::new("ana");
    gw.script(&ana, register_script("Iron Guild", "blabla"));

    let report = nav.start_session(&ana, g.start).await.unwrap();

    assert_eq!(report.final_page, g.taken);
    let sent = gw.sent_to(&ana);
    assert_eq!(
        sent.last().unwrap().page.text,
        "Sorry, this guild already exist..."
    );
}

#[tokio::test]
async fn test_guild_listing_computed_by_hook() {
    let g = guild_graph();
    let (gw, nav) = navigator(g.graph);
    let ana = UserId::new("ana");
    gw.script(
        &ana,
        [
            UserInput::reaction("😀"),
            UserInput::reaction("👁"),
            UserInput::reaction(EXIT),
        ],
    );

    let report = nav.start_session(&ana, g.start).await.unwrap();

    assert_eq!(report.final_page, g.listing);
    assert_eq!(
        gw.sent_to(&ana).last().unwrap().page.text,
        "List of existing guilds :\n\nIron Guild\nMega Guild"
    );
}

// =============================================================================
// SESSION ISOLATION & FAILURES
// =============================================================================

#[tokio::test]
async fn test_content_override_stays_in_its_session() {
    let mut builder = GraphBuilder::default();
    let lobby = builder.add_page(Page::new("Lobby"));
    let profile = builder.add_page(Page::new("Generic profile"));
    builder
        .add_link(
            lobby,
            LinkSpec::new(profile)
                .callback(Callback::compute_content(|ctx| {
                    Some(format!("Profile of {}", ctx.user))
                })),
        )
        .unwrap();
    let (gw, nav) = navigator(builder.build().unwrap());
    let ana = UserId::new("ana");
    let bo = UserId::new("bo");

    gw.push_reaction(&ana, ONE);
    let ana_session = nav.spawn_session(ana.clone(), lobby);
    let ana_sent = gw.wait_for_sent(&ana, 2).await;
    assert_eq!(ana_sent[1].page.text, "Profile of ana");

    // Ana is still on the overridden page while Bo opens it.
    gw.push_reaction(&bo, EXIT);
    nav.start_session(&bo, profile).await.unwrap();
    assert_eq!(gw.sent_to(&bo)[0].page.text, "Generic profile");

    gw.push_reaction(&ana, EXIT);
    let report = ana_session.await.unwrap().unwrap();
    assert_eq!(report.final_page, profile);
}

#[tokio::test]
async fn test_broken_link_fails_only_its_session() {
    let mut builder = GraphBuilder::default();
    let home = builder.add_page(Page::new("Home"));
    let next = builder.add_page(Page::new("Next"));
    builder
        .add_link(
            home,
            LinkSpec::new(next)
                .trigger("💥")
                .callback(Callback::select(|_| 5)),
        )
        .unwrap();
    builder
        .add_link(home, LinkSpec::new(next).trigger("✅"))
        .unwrap();
    let (gw, nav) = navigator(builder.build().unwrap());
    let ana = UserId::new("ana");
    let bo = UserId::new("bo");
    gw.push_reaction(&ana, "💥");
    gw.script(&bo, [UserInput::reaction("✅"), UserInput::reaction(EXIT)]);

    let ana_session = nav.spawn_session(ana.clone(), home);
    let bo_session = nav.spawn_session(bo.clone(), home);

    let ana_result = ana_session.await.unwrap();
    assert!(matches!(
        ana_result,
        Err(NavError::SelectionOutOfRange { index: 5, len: 1 })
    ));
    let bo_report = bo_session.await.unwrap().unwrap();
    assert_eq!(bo_report.final_page, next);
}

#[tokio::test]
async fn test_entry_link_callbacks_choose_first_page() {
    let mut builder = GraphBuilder::default();
    let beginner = builder.add_page(Page::new("Beginner guide"));
    let expert = builder.add_page(Page::new("Expert guide"));
    let entry = builder
        .entry_link(
            LinkSpec::new([beginner, expert])
                .callback(Callback::select(|ctx| {
                    usize::from(ctx.user.as_str() == "expert")
                }))
                .callback(Callback::compute_content(|ctx| {
                    ctx.inputs
                        .is_empty()
                        .then(|| format!("Welcome {}", ctx.user))
                })),
        )
        .unwrap();
    let (gw, nav) = navigator(builder.build().unwrap());
    let user = UserId::new("expert");
    gw.push_reaction(&user, EXIT);

    let report = nav.start_session_via(&user, entry).await.unwrap();

    assert_eq!(report.final_page, expert);
    assert_eq!(
        report.events[1],
        SessionEvent::EntryLinkTaken { entry, to: expert }
    );
    assert_eq!(gw.sent_to(&user)[0].page.text, "Welcome expert");
}

/// Gateway that cannot add reactions to messages.
struct NoReactions(MemoryGateway);

#[async_trait]
impl MessagingGateway for NoReactions {
    async fn open_private_channel(&self, user: &UserId) -> anyhow::Result<ChannelHandle> {
        self.0.open_private_channel(user).await
    }

    async fn send(
        &self,
        channel: &ChannelHandle,
        page: &RenderedPage,
    ) -> anyhow::Result<MessageHandle> {
        self.0.send(channel, page).await
    }

    async fn register_selectable_reaction(
        &self,
        _message: &MessageHandle,
        _symbol: &str,
    ) -> anyhow::Result<()> {
        Err(anyhow!("missing permission: add reactions"))
    }

    async fn await_reaction(
        &self,
        user: &UserId,
        message: &MessageHandle,
    ) -> anyhow::Result<ReactionEvent> {
        self.0.await_reaction(user, message).await
    }

    async fn await_message(
        &self,
        user: &UserId,
        channel: &ChannelHandle,
    ) -> anyhow::Result<TextEvent> {
        self.0.await_message(user, channel).await
    }

    async fn delete_message(&self, message: &MessageHandle) -> anyhow::Result<()> {
        self.0.delete_message(message).await
    }
}

#[tokio::test]
async fn test_failed_registration_does_not_stop_session() {
    let (graph, a, b) = two_pages();
    let gateway = Arc::new(NoReactions(MemoryGateway::new()));
    let nav = Navigator::new(gateway.clone(), Arc::new(graph));
    let ana = UserId::new("ana");
    gateway
        .0
        .script(&ana, [UserInput::reaction(ONE), UserInput::reaction(EXIT)]);

    let report = nav.start_session(&ana, a).await.unwrap();

    assert_eq!(report.displayed_pages(), vec![a, b]);
    assert_eq!(gateway.0.sent().len(), 2);
}
