//! UI rendering tests for dyex
//!
//! These tests ensure the UI renders correctly by comparing against expected buffer output.
//! Run with: cargo test --test ui_tests

pub mod account_tests;
pub mod block_tests;
pub mod common_tests;
pub mod home_tests;
pub mod live_tests;
pub mod tx_tests;

use dyex::app::{AccountData, App, Screen};
use dyex::config::Config;
use dyex::indexer::{AssetPosition, ParentSubaccount, PositionSide, Subaccount};
use dyex::metadata::AssetInfo;
use dyex::rpc::decode::{DecodedMessage, DecodedTx};
use dyex::rpc::{Account, AccountOverview, BlockInfo, Coin, Delegation, NodeStatus, TxRecord};
use dyex::ui::draw;

use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::collections::BTreeMap;

pub const ADDRESS: &str = "dydx1s8ezl0mm9h5vuvm5uvn8x3ds4ewpwwmgkhl2hd";
pub const RECIPIENT: &str = "dydx1xxr6rgjyrs4a6ap0zfmt3cwpn28x3qvf9pzfau";
pub const TX_HASH: &str = "5C504ED432CB51138BCF09AA5E8A410DD4A1E204EF84BFED1BE16DFBA1B22060";

// ==================== Test Data Builders ====================

pub fn mock_config() -> Config {
    Config {
        rpc_url: Some("wss://dydx-rpc.example.com/websocket".to_string()),
        recent_searches: vec![
            ADDRESS.to_string(),
            "latest".to_string(),
            "12345678".to_string(),
        ],
        ..Default::default()
    }
}

pub fn mock_config_no_rpc() -> Config {
    Config {
        rpc_url: None,
        recent_searches: vec![],
        ..Default::default()
    }
}

pub fn mock_node_status() -> NodeStatus {
    NodeStatus {
        network: "dydx-mainnet-1".to_string(),
        version: "0.38.6".to_string(),
        moniker: "kingnodes".to_string(),
        latest_block_height: 12345678,
        latest_block_time: "2024-05-01T12:30:45.123Z".to_string(),
        catching_up: false,
    }
}

pub fn mock_block_info() -> BlockInfo {
    BlockInfo {
        height: 12345678,
        hash: Some("ABC123DEF456789ABC123DEF456789ABC123DEF456789ABC123DEF456789ABCD".to_string()),
        chain_id: "dydx-mainnet-1".to_string(),
        time: "2024-05-01T12:30:45.123456789Z".to_string(),
        proposer: "9F3B1C2D4E5F60718293A4B5C6D7E8F901234567".to_string(),
        app_hash: "1111111111111111111111111111111111111111111111111111111111111111".to_string(),
        signatures: 60,
        txs: vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
    }
}

fn coin(denom: &str, amount: &str) -> Coin {
    Coin {
        denom: denom.to_string(),
        amount: amount.to_string(),
    }
}

pub fn mock_decoded_txs() -> Vec<DecodedTx> {
    vec![
        DecodedTx {
            hash: TX_HASH.to_string(),
            messages: vec![DecodedMessage::Send {
                from: ADDRESS.to_string(),
                to: RECIPIENT.to_string(),
                amount: vec![coin("uusdc", "2500000")],
            }],
            message_count: 1,
            memo: "rebalance".to_string(),
            fee: vec![coin("adydx", "5000000000000000")],
            gas_limit: 200_000,
            timeout_height: 0,
            signatures: 1,
        },
        DecodedTx {
            hash: "BBBB111122223333444455556666777788889999AAAABBBBCCCCDDDDEEEEFFFF".to_string(),
            messages: vec![DecodedMessage::Opaque {
                type_url: "/dydxprotocol.clob.MsgPlaceOrder".to_string(),
                size: 120,
            }],
            message_count: 1,
            ..Default::default()
        },
    ]
}

pub fn mock_tx_record() -> TxRecord {
    TxRecord {
        hash: TX_HASH.to_string(),
        height: 12345678,
        index: 3,
        code: 0,
        gas_wanted: 200_000,
        gas_used: 87_654,
        ..Default::default()
    }
}

pub fn mock_failed_tx_record() -> TxRecord {
    TxRecord {
        code: 5,
        codespace: "sdk".to_string(),
        log: "insufficient funds".to_string(),
        ..mock_tx_record()
    }
}

pub fn mock_account_data(ibc_count: usize) -> AccountData {
    let mut balances = vec![coin("uusdc", "1500000"), coin("adydx", "2000000000000000000")];
    for i in 0..ibc_count {
        balances.push(coin(&format!("ibc/{i:064X}"), "100"));
    }

    let mut asset_positions = BTreeMap::new();
    asset_positions.insert(
        "USDC".to_string(),
        AssetPosition {
            symbol: "USDC".to_string(),
            side: PositionSide::Long,
            size: "1000250000".to_string(),
            asset_id: "0".to_string(),
            subaccount_number: 0,
        },
    );

    AccountData {
        overview: AccountOverview {
            address: ADDRESS.to_string(),
            account: Some(Account {
                address: ADDRESS.to_string(),
                account_number: 4242,
                sequence: 17,
                pub_key_type: Some("secp256k1".to_string()),
                module_name: None,
            }),
            balances,
            delegations: vec![Delegation {
                validator_address: "dydxvaloper1q9wsfz3rfk5wu7edqgkrx7j6ppsj9jz9m3c0vm".to_string(),
                shares: "1000000000000000000.000000000000000000".to_string(),
                balance: Some(coin("adydx", "1000000000000000000")),
            }],
        },
        parent: ParentSubaccount {
            equity: Some("1000.25".to_string()),
            free_collateral: Some("800".to_string()),
            subaccounts: vec![Subaccount {
                address: ADDRESS.to_string(),
                subaccount_number: 0,
                equity: "1000.25".to_string(),
                free_collateral: "800".to_string(),
                margin_enabled: true,
                asset_positions: asset_positions.clone(),
                open_perpetual_positions: BTreeMap::new(),
            }],
        },
        positions: asset_positions.into_values().collect(),
        assets: vec![AssetInfo {
            symbol: "USDC".to_string(),
            name: Some("USD Coin".to_string()),
            atomic_resolution: Some(-6),
            ..Default::default()
        }],
        prices: vec![],
    }
}

pub fn create_test_app(screen: Screen, with_rpc: bool) -> App {
    let config = if with_rpc {
        mock_config()
    } else {
        mock_config_no_rpc()
    };
    let mut app = App::new(config);
    app.screen = screen;
    if with_rpc {
        app.session.state.node = Some(mock_node_status());
        app.session.state.push_block(mock_block_info());
    }
    app
}

// ==================== Helper Functions ====================

/// Render the app to a buffer and return it
pub fn render_to_buffer(app: &App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();

    terminal
        .draw(|frame| {
            draw(frame, app);
        })
        .unwrap();

    terminal.backend().buffer().clone()
}

/// Check if buffer contains a specific string anywhere
pub fn buffer_contains(buffer: &Buffer, needle: &str) -> bool {
    let content = buffer_to_string(buffer);
    content.contains(needle)
}

/// Convert buffer to a single string for searching
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut content = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            content.push(
                buffer
                    .cell((x, y))
                    .map(|c| c.symbol().chars().next().unwrap_or(' '))
                    .unwrap_or(' '),
            );
        }
        content.push('\n');
    }
    content
}

/// Get a specific line from the buffer
#[allow(dead_code)]
pub fn buffer_line(buffer: &Buffer, y: u16) -> String {
    let mut line = String::new();
    for x in 0..buffer.area.width {
        if let Some(cell) = buffer.cell((x, y)) {
            line.push_str(cell.symbol());
        }
    }
    line.trim_end().to_string()
}

/// Print buffer for debugging
#[allow(dead_code)]
pub fn print_buffer(buffer: &Buffer) {
    for y in 0..buffer.area.height {
        println!("{}", buffer_line(buffer, y));
    }
}
