use dyex::app::{AccountData, App, NavLink, Screen};
use dyex::config::{warn_if_unsaved, Config};
use dyex::fetch::{self, BlockData};
use dyex::indexer::IndexerClient;
use dyex::metadata::MetadataClient;
use dyex::rpc::decode::DecodedTx;
use dyex::rpc::TxRecord;
use dyex::search::SearchQuery;
use dyex::session::ConnectionResult;
use dyex::{logging, ui};

use anyhow::Result;
use ratatui::{
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    },
    prelude::*,
};
use std::io::stdout;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tui_input::backend::crossterm::EventHandler;

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&logging::default_log_path()?)?;
    let config = Config::load()?;

    run_tui(config).await?;

    Ok(())
}

/// Messages from async tasks back to the main loop
enum AsyncMessage {
    BlockResult(Result<BlockData>),
    TxResult(Result<(TxRecord, Option<DecodedTx>)>),
    AccountResult(Result<AccountData>),
}

/// REST collaborators shared by the query tasks
#[derive(Clone)]
struct Services {
    indexer: IndexerClient,
    metadata: MetadataClient,
}

async fn run_tui(config: Config) -> Result<()> {
    let services = Services {
        indexer: IndexerClient::new(&config.indexer_url)?,
        metadata: MetadataClient::new(&config.metadata_url)?,
    };

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(config);

    let (tx, mut rx) = mpsc::channel::<AsyncMessage>(10);

    info!("starting");
    let mut result = Ok(());
    if app.rpc_url.is_some() {
        result = connect(&mut terminal, &mut app).await;
    }
    if result.is_ok() {
        result = run_event_loop(&mut terminal, &mut app, &services, tx, &mut rx).await;
    }

    app.session.disconnect().await;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    info!("exiting");

    result
}

/// Connect with a loading screen, then return home
async fn connect(terminal: &mut Term, app: &mut App) -> Result<()> {
    app.set_loading("Connecting...");
    terminal.draw(|frame| ui::draw(frame, app))?;

    match app.connect().await {
        ConnectionResult::Connected(_) => {
            if let Err(e) = app.session.load_params().await {
                warn!(error = %format!("{e:#}"), "parameter load skipped");
            }
        }
        ConnectionResult::Failed(reason) => {
            warn!(%reason, "connection failed");
        }
    }

    app.go_home();
    Ok(())
}

async fn run_event_loop(
    terminal: &mut Term,
    app: &mut App,
    services: &Services,
    tx: mpsc::Sender<AsyncMessage>,
    rx: &mut mpsc::Receiver<AsyncMessage>,
) -> Result<()> {
    loop {
        app.session.drain_events();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Check for async results
        while let Ok(msg) = rx.try_recv() {
            match msg {
                AsyncMessage::BlockResult(Ok((info, transactions, undecoded))) => {
                    app.set_block_result(info, transactions, undecoded);
                }
                AsyncMessage::TxResult(Ok((record, decoded))) => app.set_tx_result(record, decoded),
                AsyncMessage::AccountResult(Ok(data)) => app.set_account_result(data),
                AsyncMessage::BlockResult(Err(e))
                | AsyncMessage::TxResult(Err(e))
                | AsyncMessage::AccountResult(Err(e)) => {
                    warn!(error = %format!("{e:#}"), "query failed");
                    // Use {:#} to get full error chain from anyhow
                    app.set_error(format!("{e:#}"));
                }
            }
        }

        // Poll for input events
        if event::poll(std::time::Duration::from_millis(50))? {
            let ev = event::read()?;

            if let Event::Key(key) = &ev {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global keys
                match key.code {
                    KeyCode::Esc => {
                        app.should_quit = true;
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.should_quit = true;
                    }
                    _ => {}
                }

                // Screen-specific keys
                if app.is_on_home() {
                    if app.needs_rpc_setup() {
                        // RPC setup mode
                        match key.code {
                            KeyCode::Enter => match app.submit_rpc() {
                                Ok(_) => connect(terminal, app).await?,
                                Err(e) => app.set_error(e),
                            },
                            KeyCode::Esc => {}
                            _ => {
                                app.rpc_input.handle_event(&ev);
                            }
                        }
                    } else {
                        // Normal search mode with history
                        match key.code {
                            KeyCode::Enter => {
                                // Check if a history item is selected
                                if let Some(query) = app.get_selected_history_query() {
                                    app.clear_history_selection();
                                    // Add to history again to move it to top
                                    warn_if_unsaved(
                                        app.config.add_recent_search(query.clone()),
                                        "recent_searches",
                                    );
                                    execute_search(app, services, &query, tx.clone());
                                } else if let Some(query) = app.submit_search() {
                                    execute_search(app, services, &query, tx.clone());
                                }
                            }
                            KeyCode::Up => {
                                app.select_history_prev();
                            }
                            KeyCode::Down => {
                                app.select_history_next();
                            }
                            KeyCode::Tab => {
                                app.open_live_feed();
                            }
                            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                                app.open_params();
                            }
                            KeyCode::Delete | KeyCode::Backspace
                                if app.selected_history_index.is_some() =>
                            {
                                app.delete_selected_history();
                            }
                            KeyCode::Esc => {}
                            _ => {
                                // Any other key clears history selection and goes to search
                                app.clear_history_selection();
                                app.search_input.handle_event(&ev);
                            }
                        }
                    }
                } else if !app.is_loading() {
                    match key.code {
                        KeyCode::Up | KeyCode::Char('k') => {
                            app.select_prev();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            app.select_next();
                        }
                        KeyCode::Tab => {
                            app.toggle_mode();
                        }
                        KeyCode::Enter => {
                            if let Some(link) = app.get_selected_link() {
                                navigate_to_link(app, services, link, tx.clone());
                            }
                        }
                        KeyCode::Char(']') => app.next_page(),
                        KeyCode::Char('[') => app.prev_page(),
                        KeyCode::Char('s') => {
                            if let Some(size) = app.cycle_page_size() {
                                warn_if_unsaved(app.config.set_page_size(size), "page_size");
                            }
                        }
                        KeyCode::Char('l') if !matches!(app.screen, Screen::LiveFeed(_)) => {
                            app.open_live_feed();
                        }
                        KeyCode::Char('p') if !matches!(app.screen, Screen::Params) => {
                            app.open_params();
                        }
                        KeyCode::Char('r')
                            if matches!(app.screen, Screen::Error(_) | Screen::AccountResult(_)) =>
                        {
                            if let Some(query) = app.last_query.clone() {
                                execute_search(app, services, &query, tx.clone());
                            }
                        }
                        KeyCode::Backspace | KeyCode::Char('b') => {
                            app.go_back();
                        }
                        KeyCode::Char('h') => {
                            app.go_home();
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn navigate_to_link(
    app: &mut App,
    services: &Services,
    link: NavLink,
    tx: mpsc::Sender<AsyncMessage>,
) {
    execute_search(app, services, &link.as_query(), tx);
}

fn execute_search(
    app: &mut App,
    services: &Services,
    query: &str,
    tx: mpsc::Sender<AsyncMessage>,
) {
    let parsed = SearchQuery::parse(query);

    if let SearchQuery::Invalid(reason) = parsed {
        app.set_error(reason);
        return;
    }

    let Some(client) = app.session.client() else {
        app.set_error("Not connected. Go home (h) to configure the RPC endpoint.".into());
        return;
    };

    app.last_query = Some(query.to_string());
    let rpc_url = app.session.address().unwrap_or_default().to_string();
    info!(query = %parsed.description(), "search");

    let with_rpc = move |e: anyhow::Error| anyhow::anyhow!("{e:#}\n\nRPC: {rpc_url}");

    match parsed {
        SearchQuery::BlockHeight(height) => {
            app.set_loading(&format!("Fetching block {height}..."));
            tokio::spawn(async move {
                let result = fetch::fetch_block(client.as_ref(), Some(height))
                    .await
                    .map_err(with_rpc);
                let _ = tx.send(AsyncMessage::BlockResult(result)).await;
            });
        }
        SearchQuery::Latest => {
            app.set_loading("Fetching latest block...");
            tokio::spawn(async move {
                let result = fetch::fetch_block(client.as_ref(), None)
                    .await
                    .map_err(with_rpc);
                let _ = tx.send(AsyncMessage::BlockResult(result)).await;
            });
        }
        SearchQuery::TxHash(hash) => {
            app.set_loading("Fetching transaction...");
            tokio::spawn(async move {
                let result = fetch::fetch_tx(client.as_ref(), &hash)
                    .await
                    .map_err(with_rpc);
                let _ = tx.send(AsyncMessage::TxResult(result)).await;
            });
        }
        SearchQuery::Address(address) => {
            app.set_loading("Fetching account...");
            let services = services.clone();
            tokio::spawn(async move {
                let result = fetch::fetch_account(
                    client.as_ref(),
                    &services.indexer,
                    &services.metadata,
                    &address,
                )
                .await
                .map_err(with_rpc);
                let _ = tx.send(AsyncMessage::AccountResult(result)).await;
            });
        }
        SearchQuery::Invalid(_) => {}
    }
}
