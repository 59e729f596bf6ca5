//! Live feed and parameter page UI tests

use super::*;
use dyex::app::{FeedFocus, LiveFeed, Screen};
use dyex::rpc::ParamsModule;

fn live_app() -> App {
    let mut app = create_test_app(
        Screen::LiveFeed(LiveFeed {
            focus: FeedFocus::Blocks,
            selected_index: 0,
        }),
        true,
    );
    app.session.state.push_block(BlockInfo {
        height: 12345679,
        ..mock_block_info()
    });
    app.session.state.push_tx(mock_tx_record());
    app
}

#[test]
fn test_live_feed_shows_streams() {
    let buffer = render_to_buffer(&live_app(), 120, 40);

    assert!(buffer_contains(&buffer, "New Blocks (2)"));
    assert!(buffer_contains(&buffer, "#12345679"));
    assert!(buffer_contains(&buffer, "Transactions (1)"));
    assert!(buffer_contains(&buffer, "5C504ED432"));
}

#[test]
fn test_live_feed_without_subscriptions_is_idle() {
    let buffer = render_to_buffer(&live_app(), 120, 40);
    assert!(buffer_contains(&buffer, "idle"));
}

#[test]
fn test_live_feed_waiting_when_empty() {
    let app = create_test_app(
        Screen::LiveFeed(LiveFeed {
            focus: FeedFocus::Txs,
            selected_index: 0,
        }),
        true,
    );
    let buffer = render_to_buffer(&app, 120, 40);
    assert!(buffer_contains(&buffer, "Waiting for transactions"));
}

#[test]
fn test_params_page_lists_modules() {
    let mut app = create_test_app(Screen::Params, true);
    app.session.state.params.insert(
        ParamsModule::Staking,
        vec![("bond_denom".to_string(), "adydx".to_string())],
    );
    let buffer = render_to_buffer(&app, 100, 40);

    assert!(buffer_contains(&buffer, "Chain Parameters"));
    assert!(buffer_contains(&buffer, "bond_denom: adydx"));
    assert!(buffer_contains(&buffer, "unavailable"));
}
