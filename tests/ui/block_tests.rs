//! Block page UI tests

use super::*;
use dyex::app::{BlockResult, Screen};

fn block_app(list_mode: bool, undecoded: usize) -> App {
    let screen = Screen::BlockResult(BlockResult {
        info: mock_block_info(),
        transactions: mock_decoded_txs(),
        undecoded,
        selected_index: 0,
        list_mode,
    });
    create_test_app(screen, true)
}

#[test]
fn test_block_screen_shows_height() {
    let buffer = render_to_buffer(&block_app(true, 0), 100, 40);
    assert!(buffer_contains(&buffer, "Block #12345678"));
}

#[test]
fn test_block_screen_shows_header_fields() {
    let buffer = render_to_buffer(&block_app(false, 0), 100, 40);

    assert!(buffer_contains(&buffer, "Parent Block: #12345677"));
    assert!(buffer_contains(&buffer, "2024-05-01 12:30:45 UTC"));
    assert!(buffer_contains(&buffer, "dydx-mainnet-1"));
    assert!(buffer_contains(&buffer, "Transactions: 3"));
}

#[test]
fn test_block_screen_list_mode_shows_transactions() {
    let buffer = render_to_buffer(&block_app(true, 0), 120, 40);

    assert!(buffer_contains(&buffer, "[selected]"));
    assert!(buffer_contains(&buffer, "5C504ED432"));
    assert!(buffer_contains(&buffer, "Send"));
    assert!(buffer_contains(&buffer, "MsgPlaceOrder"));
    assert!(buffer_contains(&buffer, "0.005 dydx"));
}

#[test]
fn test_block_screen_link_mode_hint() {
    let buffer = render_to_buffer(&block_app(false, 0), 120, 40);
    assert!(buffer_contains(&buffer, "[Tab to select]"));
}

#[test]
fn test_block_screen_reports_undecoded() {
    let buffer = render_to_buffer(&block_app(true, 1), 120, 40);
    assert!(buffer_contains(&buffer, "1 transaction(s) could not be decoded"));
}

#[test]
fn test_block_screen_empty_block() {
    let screen = Screen::BlockResult(BlockResult {
        info: BlockInfo {
            txs: vec![],
            ..mock_block_info()
        },
        transactions: vec![],
        undecoded: 0,
        selected_index: 0,
        list_mode: true,
    });
    let app = create_test_app(screen, true);
    let buffer = render_to_buffer(&app, 100, 40);

    assert!(buffer_contains(&buffer, "No transactions in this block"));
}
