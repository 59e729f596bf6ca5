use std::sync::Arc;

use crate::config::{warn_if_unsaved, Config, DEFAULT_RPC_URL};
use crate::indexer::{AssetPosition, ParentSubaccount};
use crate::metadata::{AssetInfo, AssetPrice};
use crate::pagination::{ibc_tokens, Paginator};
use crate::precision::{normalize_amount, resolve_positions, NormalizedAmount, PositionView, PrecisionMap};
use crate::rpc::decode::DecodedTx;
use crate::rpc::{to_ws_url, AccountOverview, BlockInfo, Coin, Connector, TxRecord, WsConnector};
use crate::session::{ConnectionResult, Session};
use tui_input::Input;

#[derive(Debug, Clone)]
pub enum Screen {
    Home,
    Loading(String),
    BlockResult(BlockResult),
    TxResult(TxResult),
    AccountResult(AccountResult),
    LiveFeed(LiveFeed),
    Params,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct BlockResult {
    pub info: BlockInfo,
    pub transactions: Vec<DecodedTx>,
    /// Txs whose envelope could not be decoded
    pub undecoded: usize,
    pub selected_index: usize,
    pub list_mode: bool, // true = tx list, false = info links
}

#[derive(Debug, Clone)]
pub struct TxResult {
    pub record: TxRecord,
    /// `None` when the envelope failed to decode
    pub decoded: Option<DecodedTx>,
    pub selected_link: usize, // 0 = block, then message accounts
    pub message_scroll: usize,
}

// Max visible items in scrollable sections
pub const MAX_VISIBLE_MESSAGES: usize = 4;
pub const MAX_VISIBLE_FEED: usize = 20;

impl TxResult {
    fn links(&self) -> Vec<(usize, NavLink)> {
        // (message index + 1, link); 0 marks the block link
        let mut links = vec![(0, NavLink::Block(self.record.height))];
        if let Some(decoded) = &self.decoded {
            for (i, msg) in decoded.messages.iter().enumerate() {
                for account in msg.accounts() {
                    links.push((i + 1, NavLink::Account(account.to_string())));
                }
            }
        }
        links
    }
}

/// A balance with its display amount
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceView {
    pub coin: Coin,
    pub amount: NormalizedAmount,
}

/// Everything fetched for an account search
#[derive(Debug, Clone, Default)]
pub struct AccountData {
    pub overview: AccountOverview,
    pub parent: ParentSubaccount,
    pub positions: Vec<AssetPosition>,
    pub assets: Vec<AssetInfo>,
    pub prices: Vec<AssetPrice>,
}

#[derive(Debug, Clone)]
pub struct AccountResult {
    pub overview: AccountOverview,
    pub balances: Vec<BalanceView>,
    pub ibc_tokens: Vec<BalanceView>,
    pub ibc_pager: Paginator,
    pub delegations: Vec<(String, Option<NormalizedAmount>)>,
    pub parent: ParentSubaccount,
    pub positions: Vec<PositionView>,
    pub prices: Vec<AssetPrice>,
}

impl AccountResult {
    pub fn from_data(data: AccountData, page_size: usize) -> Self {
        let map = PrecisionMap::from_assets(&data.assets);
        let view = |coin: &Coin| BalanceView {
            coin: coin.clone(),
            amount: normalize_amount(&coin.amount, &coin.denom, None, &map),
        };

        let ibc: Vec<BalanceView> = ibc_tokens(&data.overview.balances)
            .iter()
            .map(view)
            .collect();
        let balances = data
            .overview
            .balances
            .iter()
            .filter(|c| !c.denom.starts_with("ibc/"))
            .map(view)
            .collect();
        let delegations = data
            .overview
            .delegations
            .iter()
            .map(|d| {
                (
                    d.validator_address.clone(),
                    d.balance
                        .as_ref()
                        .map(|c| normalize_amount(&c.amount, &c.denom, None, &map)),
                )
            })
            .collect();

        Self {
            ibc_pager: Paginator::new(ibc.len(), page_size),
            ibc_tokens: ibc,
            balances,
            delegations,
            positions: resolve_positions(&data.positions, &data.assets),
            prices: data.prices,
            parent: data.parent,
            overview: data.overview,
        }
    }

    fn keep_page_of(&mut self, previous: &AccountResult) {
        let mut pager = previous.ibc_pager.clone();
        pager.set_total_items(self.ibc_tokens.len());
        self.ibc_pager = pager;
    }

    pub fn visible_ibc_tokens(&self) -> &[BalanceView] {
        self.ibc_pager.page_items(&self.ibc_tokens)
    }

    pub fn price_of(&self, symbol: &str) -> Option<&AssetPrice> {
        self.prices.iter().find(|p| p.symbol == symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFocus {
    Blocks,
    Txs,
}

#[derive(Debug, Clone)]
pub struct LiveFeed {
    pub focus: FeedFocus,
    pub selected_index: usize, // 0 = newest
}

/// Navigable links from a screen
#[derive(Debug, Clone, PartialEq)]
pub enum NavLink {
    Account(String),
    Block(u64),
    Transaction(String),
}

impl NavLink {
    pub fn as_query(&self) -> String {
        match self {
            NavLink::Account(addr) => addr.clone(),
            NavLink::Block(height) => height.to_string(),
            NavLink::Transaction(hash) => hash.clone(),
        }
    }
}

pub struct App {
    pub config: Config,
    pub screen: Screen,
    pub history: Vec<Screen>,
    pub search_input: Input,
    pub rpc_input: Input,
    pub selected_history_index: Option<usize>,
    pub should_quit: bool,
    pub rpc_url: Option<String>,
    pub session: Session,
    /// Reason of the last failed connection attempt
    pub connection_failure: Option<String>,
    /// Last executed search, for retry from the error screen
    pub last_query: Option<String>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(config: Config, connector: Arc<dyn Connector>) -> Self {
        let rpc_url = config.rpc_url.clone();

        Self {
            config,
            screen: Screen::Home,
            history: Vec::new(),
            search_input: Input::default(),
            rpc_input: Input::default(),
            selected_history_index: None,
            should_quit: false,
            rpc_url,
            session: Session::new(connector),
            connection_failure: None,
            last_query: None,
        }
    }

    /// Accept the RPC input. Empty input selects the default node.
    pub fn submit_rpc(&mut self) -> Result<String, String> {
        let input = self.rpc_input.value().trim();
        let url = if input.is_empty() {
            DEFAULT_RPC_URL.to_string()
        } else {
            input.to_string()
        };

        to_ws_url(&url).map_err(|e| format!("Invalid RPC URL: {e}"))?;

        self.rpc_url = Some(url.clone());
        warn_if_unsaved(self.config.set_rpc(url.clone()), "rpc_url");
        self.rpc_input.reset();
        Ok(url)
    }

    /// Connect the session to the configured RPC URL
    pub async fn connect(&mut self) -> ConnectionResult {
        let Some(url) = self.rpc_url.clone() else {
            return ConnectionResult::Failed("No RPC configured".to_string());
        };
        let result = self.session.connect(&url).await;
        self.connection_failure = match &result {
            ConnectionResult::Connected(_) => None,
            ConnectionResult::Failed(reason) => Some(reason.clone()),
        };
        result
    }

    pub fn needs_rpc_setup(&self) -> bool {
        self.rpc_url.is_none() || self.session.connection_error()
    }

    pub fn has_rpc(&self) -> bool {
        self.session.is_connected()
    }

    pub fn get_recent_searches(&self) -> &[String] {
        &self.config.recent_searches
    }

    pub fn select_history_prev(&mut self) {
        let len = self.config.recent_searches.len();
        if len == 0 {
            return;
        }

        self.selected_history_index = match self.selected_history_index {
            None => Some(0),
            Some(0) => None, // Wrap to search input
            Some(i) => Some(i - 1),
        };
    }

    pub fn select_history_next(&mut self) {
        let len = self.config.recent_searches.len();
        if len == 0 {
            return;
        }

        self.selected_history_index = match self.selected_history_index {
            None => Some(0),
            Some(i) if i >= len - 1 => None, // Wrap to search input
            Some(i) => Some(i + 1),
        };
    }

    pub fn get_selected_history_query(&self) -> Option<String> {
        self.selected_history_index
            .and_then(|i| self.config.recent_searches.get(i).cloned())
    }

    pub fn clear_history_selection(&mut self) {
        self.selected_history_index = None;
    }

    pub fn delete_selected_history(&mut self) {
        if let Some(idx) = self.selected_history_index {
            if idx < self.config.recent_searches.len() {
                self.config.recent_searches.remove(idx);
                warn_if_unsaved(self.config.save(), "recent_searches");

                if self.config.recent_searches.is_empty() {
                    self.selected_history_index = None;
                } else if idx >= self.config.recent_searches.len() {
                    self.selected_history_index = Some(self.config.recent_searches.len() - 1);
                }
            }
        }
    }

    pub fn submit_search(&mut self) -> Option<String> {
        let value = self.search_input.value().trim();
        if value.is_empty() {
            return None;
        }

        let query = value.to_string();
        self.search_input.reset();
        warn_if_unsaved(self.config.add_recent_search(query.clone()), "recent_searches");
        Some(query)
    }

    pub fn navigate_to(&mut self, screen: Screen) {
        if !matches!(self.screen, Screen::Home | Screen::Loading(_)) {
            self.history.push(self.screen.clone());
        }
        self.screen = screen;
    }

    pub fn go_back(&mut self) -> bool {
        if let Some(prev) = self.history.pop() {
            self.screen = prev;
        } else {
            self.go_home();
        }
        true
    }

    pub fn go_home(&mut self) {
        self.history.clear();
        self.screen = Screen::Home;
    }

    pub fn set_loading(&mut self, msg: &str) {
        if !matches!(
            self.screen,
            Screen::Home | Screen::Loading(_) | Screen::Error(_)
        ) {
            self.history.push(self.screen.clone());
        }
        self.screen = Screen::Loading(msg.to_string());
    }

    pub fn set_error(&mut self, msg: String) {
        if !matches!(
            self.screen,
            Screen::Home | Screen::Loading(_) | Screen::Error(_)
        ) {
            self.history.push(self.screen.clone());
        }
        self.screen = Screen::Error(msg);
    }

    pub fn set_block_result(&mut self, info: BlockInfo, transactions: Vec<DecodedTx>, undecoded: usize) {
        self.navigate_to(Screen::BlockResult(BlockResult {
            info,
            transactions,
            undecoded,
            selected_index: 0,
            list_mode: true,
        }));
    }

    pub fn set_tx_result(&mut self, record: TxRecord, decoded: Option<DecodedTx>) {
        self.navigate_to(Screen::TxResult(TxResult {
            record,
            decoded,
            selected_link: 0,
            message_scroll: 0,
        }));
    }

    /// A reload of the account that was on screen replaces its history
    /// entry and stays on the same IBC page
    pub fn set_account_result(&mut self, data: AccountData) {
        let mut result = AccountResult::from_data(data, self.config.page_size);
        if let Some(Screen::AccountResult(previous)) = self.history.last() {
            if previous.overview.address == result.overview.address {
                result.keep_page_of(previous);
                self.history.pop();
            }
        }
        self.navigate_to(Screen::AccountResult(result));
    }

    pub fn open_live_feed(&mut self) {
        self.navigate_to(Screen::LiveFeed(LiveFeed {
            focus: FeedFocus::Blocks,
            selected_index: 0,
        }));
    }

    pub fn open_params(&mut self) {
        self.navigate_to(Screen::Params);
    }

    pub fn is_on_home(&self) -> bool {
        matches!(self.screen, Screen::Home)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.screen, Screen::Loading(_))
    }

    fn feed_len(&self, focus: FeedFocus) -> usize {
        let len = match focus {
            FeedFocus::Blocks => self.session.state.blocks.len(),
            FeedFocus::Txs => self.session.state.txs.len(),
        };
        len.min(MAX_VISIBLE_FEED)
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        let feed_len = match &self.screen {
            Screen::LiveFeed(feed) => self.feed_len(feed.focus),
            _ => 0,
        };

        match &mut self.screen {
            Screen::BlockResult(result) => {
                if result.list_mode && result.selected_index > 0 {
                    result.selected_index -= 1;
                }
            }
            Screen::TxResult(result) => {
                let links = result.links();
                result.selected_link = if result.selected_link > 0 {
                    result.selected_link - 1
                } else {
                    links.len() - 1
                };
                scroll_to_link(result, &links);
            }
            Screen::LiveFeed(feed) => {
                if feed.selected_index > 0 {
                    feed.selected_index -= 1;
                } else if feed_len > 0 {
                    feed.selected_index = feed_len - 1;
                }
            }
            _ => {}
        }
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        let feed_len = match &self.screen {
            Screen::LiveFeed(feed) => self.feed_len(feed.focus),
            _ => 0,
        };

        match &mut self.screen {
            Screen::BlockResult(result) => {
                if result.list_mode
                    && !result.transactions.is_empty()
                    && result.selected_index < result.transactions.len() - 1
                {
                    result.selected_index += 1;
                }
            }
            Screen::TxResult(result) => {
                let links = result.links();
                result.selected_link = (result.selected_link + 1) % links.len();
                scroll_to_link(result, &links);
            }
            Screen::LiveFeed(feed) => {
                if feed_len > 0 {
                    feed.selected_index = (feed.selected_index + 1) % feed_len;
                }
            }
            _ => {}
        }
    }

    /// Toggle between list mode and link mode (blocks), or between the
    /// block and tx columns (live feed)
    pub fn toggle_mode(&mut self) {
        match &mut self.screen {
            Screen::BlockResult(result) => {
                result.list_mode = !result.list_mode;
                result.selected_index = 0;
            }
            Screen::LiveFeed(feed) => {
                feed.focus = match feed.focus {
                    FeedFocus::Blocks => FeedFocus::Txs,
                    FeedFocus::Txs => FeedFocus::Blocks,
                };
                feed.selected_index = 0;
            }
            _ => {}
        }
    }

    pub fn next_page(&mut self) {
        if let Screen::AccountResult(result) = &mut self.screen {
            result.ibc_pager.next_page();
        }
    }

    pub fn prev_page(&mut self) {
        if let Screen::AccountResult(result) = &mut self.screen {
            result.ibc_pager.prev_page();
        }
    }

    /// Cycle the IBC page size; returns the new size so it can be persisted
    pub fn cycle_page_size(&mut self) -> Option<usize> {
        if let Screen::AccountResult(result) = &mut self.screen {
            result.ibc_pager.cycle_page_size();
            self.config.page_size = result.ibc_pager.page_size();
            return Some(self.config.page_size);
        }
        None
    }

    /// Get the currently selected navigation link
    pub fn get_selected_link(&self) -> Option<NavLink> {
        match &self.screen {
            Screen::BlockResult(result) => {
                if result.list_mode {
                    result
                        .transactions
                        .get(result.selected_index)
                        .map(|tx| NavLink::Transaction(tx.hash.clone()))
                } else if result.info.height > 1 {
                    Some(NavLink::Block(result.info.height - 1))
                } else {
                    None
                }
            }
            Screen::TxResult(result) => result
                .links()
                .get(result.selected_link)
                .map(|(_, link)| link.clone()),
            Screen::LiveFeed(feed) => {
                let state = &self.session.state;
                match feed.focus {
                    FeedFocus::Blocks => state
                        .blocks
                        .iter()
                        .rev()
                        .nth(feed.selected_index)
                        .map(|b| NavLink::Block(b.height)),
                    FeedFocus::Txs => state
                        .txs
                        .iter()
                        .rev()
                        .nth(feed.selected_index)
                        .map(|t| NavLink::Transaction(t.hash.clone())),
                }
            }
            _ => None,
        }
    }
}

/// Keep the message owning the selected link inside the visible window
fn scroll_to_link(result: &mut TxResult, links: &[(usize, NavLink)]) {
    let Some(&(owner, _)) = links.get(result.selected_link) else {
        return;
    };
    if owner == 0 {
        return;
    }
    let msg_idx = owner - 1;
    if msg_idx < result.message_scroll {
        result.message_scroll = msg_idx;
    } else if msg_idx >= result.message_scroll + MAX_VISIBLE_MESSAGES {
        result.message_scroll = msg_idx - MAX_VISIBLE_MESSAGES + 1;
    }
}
