//! Common UI tests - error, loading, layout, and navigation

use super::*;
use dyex::app::{AccountResult, BlockResult, FeedFocus, LiveFeed, Screen, TxResult};

fn block_screen() -> Screen {
    Screen::BlockResult(BlockResult {
        info: mock_block_info(),
        transactions: mock_decoded_txs(),
        undecoded: 1,
        selected_index: 0,
        list_mode: true,
    })
}

fn tx_screen() -> Screen {
    Screen::TxResult(TxResult {
        record: mock_tx_record(),
        decoded: mock_decoded_txs().into_iter().next(),
        selected_link: 0,
        message_scroll: 0,
    })
}

// ==================== Error Screen Tests ====================

#[test]
fn test_error_screen_shows_message() {
    let screen = Screen::Error("Failed to fetch block 99: connection timeout".to_string());
    let app = create_test_app(screen, true);
    let buffer = render_to_buffer(&app, 80, 30);

    assert!(buffer_contains(&buffer, "Error"));
    assert!(buffer_contains(&buffer, "connection timeout"));
}

#[test]
fn test_error_screen_multiline_chain() {
    let screen = Screen::Error("Failed to fetch block 99\n\nRPC: wss://node/websocket".to_string());
    let app = create_test_app(screen, true);
    let buffer = render_to_buffer(&app, 80, 30);

    assert!(buffer_contains(&buffer, "RPC: wss://node/websocket"));
}

// ==================== Loading Screen Tests ====================

#[test]
fn test_loading_screen_shows_message() {
    let screen = Screen::Loading("Fetching block 12345678...".to_string());
    let app = create_test_app(screen, true);
    let buffer = render_to_buffer(&app, 80, 30);

    assert!(buffer_contains(&buffer, "Loading"));
    assert!(buffer_contains(&buffer, "Fetching block 12345678"));
}

// ==================== Navigation Help Tests ====================

#[test]
fn test_screens_show_navigation_help() {
    let screens = vec![Screen::Home, block_screen(), tx_screen(), Screen::Params];

    for screen in screens {
        let app = create_test_app(screen, true);
        let buffer = render_to_buffer(&app, 100, 40);

        assert!(buffer_contains(&buffer, "Esc quit"));
    }
}

// ==================== Layout Tests ====================

#[test]
fn test_small_terminal_renders_without_panic() {
    let screens = vec![
        Screen::Home,
        block_screen(),
        tx_screen(),
        Screen::AccountResult(AccountResult::from_data(mock_account_data(12), 10)),
        Screen::LiveFeed(LiveFeed {
            focus: FeedFocus::Txs,
            selected_index: 0,
        }),
        Screen::Params,
        Screen::Error("Error".to_string()),
        Screen::Loading("Loading...".to_string()),
    ];

    for screen in screens {
        let app = create_test_app(screen, true);
        // This should not panic even with very small dimensions
        let _ = render_to_buffer(&app, 40, 10);
    }
}

#[test]
fn test_large_terminal_renders_without_panic() {
    let app = create_test_app(Screen::Home, true);
    let _ = render_to_buffer(&app, 200, 100);
}
