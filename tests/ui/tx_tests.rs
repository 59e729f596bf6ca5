//! Transaction page UI tests

use super::*;
use dyex::app::{Screen, TxResult};

fn tx_app(record: TxRecord, decoded: Option<DecodedTx>, selected_link: usize) -> App {
    let screen = Screen::TxResult(TxResult {
        record,
        decoded,
        selected_link,
        message_scroll: 0,
    });
    create_test_app(screen, true)
}

#[test]
fn test_tx_screen_shows_hash_and_status() {
    let decoded = mock_decoded_txs().into_iter().next();
    let buffer = render_to_buffer(&tx_app(mock_tx_record(), decoded, 0), 120, 40);

    assert!(buffer_contains(&buffer, TX_HASH));
    assert!(buffer_contains(&buffer, "Success"));
    assert!(buffer_contains(&buffer, "Block: #12345678"));
}

#[test]
fn test_tx_screen_shows_decoded_send() {
    let decoded = mock_decoded_txs().into_iter().next();
    let buffer = render_to_buffer(&tx_app(mock_tx_record(), decoded, 1), 120, 40);

    assert!(buffer_contains(&buffer, "Messages (1)"));
    assert!(buffer_contains(&buffer, ADDRESS));
    assert!(buffer_contains(&buffer, RECIPIENT));
    assert!(buffer_contains(&buffer, "Amount: 2.5 usdc"));
    assert!(buffer_contains(&buffer, "Memo: rebalance"));
}

#[test]
fn test_tx_screen_opaque_message() {
    let decoded = mock_decoded_txs().into_iter().nth(1);
    let buffer = render_to_buffer(&tx_app(mock_tx_record(), decoded, 0), 120, 40);

    assert!(buffer_contains(&buffer, "MsgPlaceOrder"));
    assert!(buffer_contains(&buffer, "Size: 120 bytes"));
}

#[test]
fn test_tx_screen_failed_shows_log() {
    let buffer = render_to_buffer(&tx_app(mock_failed_tx_record(), None, 0), 120, 40);

    assert!(buffer_contains(&buffer, "Failed (code 5)"));
    assert!(buffer_contains(&buffer, "insufficient funds"));
}

#[test]
fn test_tx_screen_undecodable_body() {
    let buffer = render_to_buffer(&tx_app(mock_tx_record(), None, 0), 120, 40);
    assert!(buffer_contains(&buffer, "could not be decoded"));
}

#[test]
fn test_tx_screen_reports_dropped_messages() {
    let mut decoded = mock_decoded_txs().remove(0);
    decoded.message_count = 2;
    let buffer = render_to_buffer(&tx_app(mock_tx_record(), Some(decoded), 0), 120, 40);

    assert!(buffer_contains(&buffer, "Messages (2)"));
    assert!(buffer_contains(&buffer, "1 message(s) failed to decode"));
}
