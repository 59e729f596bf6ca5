//! Account page UI tests

use super::*;
use dyex::app::{AccountResult, Screen};

fn account_app(ibc_count: usize, page_size: usize) -> App {
    let result = AccountResult::from_data(mock_account_data(ibc_count), page_size);
    create_test_app(Screen::AccountResult(result), true)
}

#[test]
fn test_account_screen_shows_account_fields() {
    let buffer = render_to_buffer(&account_app(0, 10), 120, 50);

    assert!(buffer_contains(&buffer, ADDRESS));
    assert!(buffer_contains(&buffer, "Account Number: 4242"));
    assert!(buffer_contains(&buffer, "Sequence: 17"));
}

#[test]
fn test_account_screen_normalizes_balances() {
    let buffer = render_to_buffer(&account_app(0, 10), 120, 50);

    assert!(buffer_contains(&buffer, "1.5 USDC (uusdc)"));
    assert!(buffer_contains(&buffer, "2 dydx (adydx)"));
}

#[test]
fn test_account_screen_shows_delegations() {
    let buffer = render_to_buffer(&account_app(0, 10), 120, 50);

    assert!(buffer_contains(&buffer, "Delegations (1)"));
    assert!(buffer_contains(&buffer, "1 dydx"));
}

#[test]
fn test_account_screen_shows_positions_with_precision() {
    let buffer = render_to_buffer(&account_app(0, 10), 120, 50);

    assert!(buffer_contains(&buffer, "Asset Positions (1)"));
    assert!(buffer_contains(&buffer, "1,000.25 USDC"));
    assert!(buffer_contains(&buffer, "(USD Coin)"));
    assert!(buffer_contains(&buffer, "Total Equity: 1000.25"));
}

#[test]
fn test_account_screen_paginates_ibc_tokens() {
    let buffer = render_to_buffer(&account_app(23, 10), 120, 60);

    assert!(buffer_contains(&buffer, "IBC Tokens (23)"));
    assert!(buffer_contains(&buffer, "page 1/3"));
    assert!(buffer_contains(&buffer, "10 per page"));
}

#[test]
fn test_account_screen_page_navigation() {
    let mut app = account_app(23, 10);
    app.next_page();
    app.next_page();
    let buffer = render_to_buffer(&app, 120, 60);

    assert!(buffer_contains(&buffer, "page 3/3"));
}

#[test]
fn test_account_screen_unknown_account() {
    let mut data = mock_account_data(0);
    data.overview.account = None;
    let app = create_test_app(
        Screen::AccountResult(AccountResult::from_data(data, 10)),
        true,
    );
    let buffer = render_to_buffer(&app, 120, 50);

    assert!(buffer_contains(&buffer, "Account not found on chain"));
}

#[test]
fn test_account_screen_shows_perpetuals_and_prices() {
    use dyex::indexer::PerpetualPosition;
    use dyex::metadata::AssetPrice;
    use rust_decimal::Decimal;

    let mut data = mock_account_data(0);
    data.parent.subaccounts[0].open_perpetual_positions.insert(
        "ETH-USD".to_string(),
        PerpetualPosition {
            market: "ETH-USD".to_string(),
            side: PositionSide::Short,
            size: "-2.5".to_string(),
            entry_price: Some("3100".to_string()),
            unrealized_pnl: Some("-12.5".to_string()),
        },
    );
    data.prices = vec![AssetPrice {
        symbol: "USDC".to_string(),
        price: Some(Decimal::new(10001, 4)),
        percent_change_24h: Some(Decimal::new(-5, 2)),
    }];
    let app = create_test_app(
        Screen::AccountResult(AccountResult::from_data(data, 10)),
        true,
    );
    let buffer = render_to_buffer(&app, 120, 50);

    assert!(buffer_contains(&buffer, "free 800  margin"));
    assert!(buffer_contains(&buffer, "-2.5 ETH-USD  entry 3100  pnl -12.5"));
    assert!(buffer_contains(&buffer, "@ $1.0001 (-0.05%)"));
}
