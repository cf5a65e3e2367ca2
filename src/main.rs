//! pokecards - paginated Pokemon card browser

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use pokecards::action::Action;
use pokecards::api::{Catalogue, PokeApiClient};
use pokecards::config::{Args, Config};
use pokecards::effect::Effect;
use pokecards::enrich::{enrich_entries, load_page};
use pokecards::logging;
use pokecards::reducer::reducer;
use pokecards::search::fetch_name_universe;
use pokecards::state::AppState;
use pokecards::ui::{CardsComponentId, CardsContext, CardsUi};

const TICK_MS: u64 = 120;

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args);
    let _log_guard = logging::init(&config.log_dir);
    let debug = DebugSession::new(args.debug);

    let catalogue: Arc<dyn Catalogue> = Arc::new(
        PokeApiClient::new(config.api_base.clone(), config.timeout)
            .map_err(|err| io::Error::other(format!("catalogue client: {err}")))?,
    );

    let (page_size, search_page_size) = (config.page_size, config.search_page_size);
    let state = debug
        .load_state_or_else_async(|| async move {
            Ok::<AppState, io::Error>(AppState::new(page_size, search_page_size))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(
        api_base = %config.api_base,
        page_size = config.page_size,
        "session started"
    );
    let result = run_app(
        &mut terminal,
        &debug,
        store,
        catalogue,
        config.universe_batch,
        replay_actions,
    )
    .await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    catalogue: Arc<dyn Catalogue>,
    universe_batch: usize,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(CardsUi::new()));
    let mut bus: EventBus<AppState, Action, CardsComponentId, CardsContext> = EventBus::new();
    let keybindings: Keybindings<CardsContext> = Keybindings::new();

    let ui_cards = Rc::clone(&ui);
    bus.register(CardsComponentId::Cards, move |event, state| {
        ui_cards
            .borrow_mut()
            .handle_cards_event(&event.kind, state)
    });

    let ui_overlay = Rc::clone(&ui);
    bus.register(CardsComponentId::Overlay, move |event, state| {
        ui_overlay
            .borrow_mut()
            .handle_overlay_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(CardsComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search.editing => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/') if state.overlay.is_none() => {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, &catalogue, universe_batch),
        )
        .await
}

/// Runs catalogue work off the event loop. Keyed tasks replace any earlier
/// task with the same key, so at most one page load, one name index fetch and
/// one search enrichment are in flight.
fn handle_effect(
    effect: Effect,
    ctx: &mut EffectContext<Action>,
    catalogue: &Arc<dyn Catalogue>,
    universe_batch: usize,
) {
    match effect {
        Effect::LoadPage { offset, limit } => {
            let catalogue = Arc::clone(catalogue);
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                match load_page(catalogue.as_ref(), offset, limit).await {
                    Ok(batch) => Action::PageDidLoad {
                        offset,
                        records: batch.records,
                        listed: batch.listed,
                    },
                    Err(error) => {
                        tracing::warn!(offset, %error, "page load failed");
                        Action::PageDidError { offset, error }
                    }
                }
            });
        }
        Effect::LoadNameUniverse => {
            let catalogue = Arc::clone(catalogue);
            ctx.tasks().spawn(TaskKey::new("universe"), async move {
                match fetch_name_universe(catalogue.as_ref(), universe_batch).await {
                    Ok(entries) => Action::UniverseDidLoad(entries),
                    Err(error) => {
                        tracing::warn!(%error, "name index fetch failed");
                        Action::UniverseDidError(error)
                    }
                }
            });
        }
        Effect::SearchRecords {
            generation,
            entries,
        } => {
            tracing::debug!(generation, matches = entries.len(), "search enrichment started");
            let catalogue = Arc::clone(catalogue);
            ctx.tasks().spawn(TaskKey::new("search"), async move {
                match enrich_entries(catalogue.as_ref(), &entries).await {
                    Ok(records) => Action::SearchDidLoad {
                        generation,
                        records,
                    },
                    Err(error) => {
                        tracing::warn!(generation, %error, "search enrichment failed");
                        Action::SearchDidError { generation, error }
                    }
                }
            });
        }
        Effect::CancelSearch => {
            ctx.tasks().cancel(&TaskKey::new("search"));
        }
    }
}
