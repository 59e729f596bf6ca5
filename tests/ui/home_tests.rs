//! Home screen UI tests

use super::*;
use dyex::app::Screen;

#[test]
fn test_home_screen_with_rpc_shows_title() {
    let app = create_test_app(Screen::Home, true);
    let buffer = render_to_buffer(&app, 80, 30);

    assert!(buffer_contains(&buffer, "████"));
    assert!(buffer_contains(&buffer, "dYdX Chain Explorer"));
}

#[test]
fn test_home_screen_with_rpc_shows_search_bar() {
    let app = create_test_app(Screen::Home, true);
    let buffer = render_to_buffer(&app, 80, 30);

    assert!(buffer_contains(&buffer, "Search"));
}

#[test]
fn test_home_screen_shows_network_status() {
    let app = create_test_app(Screen::Home, true);
    let buffer = render_to_buffer(&app, 100, 40);

    assert!(buffer_contains(&buffer, "Network Status"));
    assert!(buffer_contains(&buffer, "dydx-mainnet-1"));
    assert!(buffer_contains(&buffer, "#12345678"));
}

#[test]
fn test_home_screen_shows_rpc_url_and_state() {
    let app = create_test_app(Screen::Home, true);
    let buffer = render_to_buffer(&app, 100, 40);

    assert!(buffer_contains(&buffer, "wss://dydx-rpc.example.com/websocket"));
    // No live client in tests
    assert!(buffer_contains(&buffer, "(connecting)"));
}

#[test]
fn test_home_screen_shows_recent_searches() {
    let app = create_test_app(Screen::Home, true);
    let buffer = render_to_buffer(&app, 100, 40);

    assert!(buffer_contains(&buffer, "Recent Searches"));
    assert!(buffer_contains(&buffer, "latest"));
}

#[test]
fn test_home_screen_no_rpc_shows_setup() {
    let app = create_test_app(Screen::Home, false);
    let buffer = render_to_buffer(&app, 100, 30);

    assert!(buffer_contains(&buffer, "RPC Configuration Required"));
    // The default node is offered as placeholder
    assert!(buffer_contains(&buffer, "wss://dydx-ops-rpc"));
}

#[test]
fn test_home_screen_shows_connection_failure() {
    let mut app = create_test_app(Screen::Home, false);
    app.connection_failure = Some("Timed out connecting to wss://bad".to_string());
    let buffer = render_to_buffer(&app, 100, 30);

    assert!(buffer_contains(&buffer, "Timed out connecting"));
}
