//! Typed Cosmos queries on top of [`ChainRpc::abci_query`].

use anyhow::{Context, Result};
use cosmrs::proto::cosmos::{
    auth::v1beta1::{BaseAccount, ModuleAccount, QueryAccountRequest, QueryAccountResponse},
    bank::v1beta1::{QueryAllBalancesRequest, QueryAllBalancesResponse},
    distribution::v1beta1 as distribution,
    gov::v1beta1 as gov,
    mint::v1beta1 as mint,
    slashing::v1beta1 as slashing,
    staking::v1beta1::{
        self as staking, QueryDelegatorDelegationsRequest, QueryDelegatorDelegationsResponse,
    },
};
use prost::Message;
use tracing::debug;

use super::{Account, AccountOverview, ChainRpc, Coin, Delegation, ParamsModule};
use crate::error::ExplorerError;
use crate::precision::{plain_decimal, shift_decimal};

const BASE_ACCOUNT: &str = "/cosmos.auth.v1beta1.BaseAccount";
const MODULE_ACCOUNT: &str = "/cosmos.auth.v1beta1.ModuleAccount";

/// Cosmos `LegacyDec` values travel as integers scaled by 10^18
const LEGACY_DEC_PRECISION: u32 = 18;

async fn query<Req, Resp>(rpc: &dyn ChainRpc, path: &str, request: Req) -> Result<Resp>
where
    Req: Message,
    Resp: Message + Default,
{
    debug!(path, "abci query");
    let bytes = rpc.abci_query(path, request.encode_to_vec()).await?;
    Resp::decode(bytes.as_slice())
        .map_err(ExplorerError::from)
        .with_context(|| format!("Failed to decode {path} response"))
}

fn is_not_found(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<ExplorerError>() {
        Some(ExplorerError::Query { log, .. }) => log.to_lowercase().contains("not found"),
        _ => false,
    }
}

fn coin(c: cosmrs::proto::cosmos::base::v1beta1::Coin) -> Coin {
    Coin {
        denom: c.denom,
        amount: c.amount,
    }
}

/// Auth account record; `None` if the chain has never seen the address
pub async fn account(rpc: &dyn ChainRpc, address: &str) -> Result<Option<Account>> {
    let request = QueryAccountRequest {
        address: address.to_string(),
    };
    let response: QueryAccountResponse =
        match query(rpc, "/cosmos.auth.v1beta1.Query/Account", request).await {
            Ok(r) => r,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

    let Some(any) = response.account else {
        return Ok(None);
    };

    let (base, module_name) = match any.type_url.as_str() {
        BASE_ACCOUNT => (BaseAccount::decode(any.value.as_slice())?, None),
        MODULE_ACCOUNT => {
            let module = ModuleAccount::decode(any.value.as_slice())?;
            (module.base_account.unwrap_or_default(), Some(module.name))
        }
        other => {
            debug!(type_url = other, "unsupported account type");
            return Ok(Some(Account {
                address: address.to_string(),
                ..Default::default()
            }));
        }
    };

    Ok(Some(Account {
        address: if base.address.is_empty() {
            address.to_string()
        } else {
            base.address
        },
        account_number: base.account_number,
        sequence: base.sequence,
        pub_key_type: base.pub_key.map(|pk| pk.type_url),
        module_name,
    }))
}

pub async fn balances(rpc: &dyn ChainRpc, address: &str) -> Result<Vec<Coin>> {
    let request = QueryAllBalancesRequest {
        address: address.to_string(),
        ..Default::default()
    };
    let response: QueryAllBalancesResponse =
        query(rpc, "/cosmos.bank.v1beta1.Query/AllBalances", request).await?;
    Ok(response.balances.into_iter().map(coin).collect())
}

pub async fn delegations(rpc: &dyn ChainRpc, address: &str) -> Result<Vec<Delegation>> {
    let request = QueryDelegatorDelegationsRequest {
        delegator_addr: address.to_string(),
        ..Default::default()
    };
    let response: QueryDelegatorDelegationsResponse = match query(
        rpc,
        "/cosmos.staking.v1beta1.Query/DelegatorDelegations",
        request,
    )
    .await
    {
        Ok(r) => r,
        Err(e) if is_not_found(&e) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    Ok(response
        .delegation_responses
        .into_iter()
        .map(|d| {
            let delegation = d.delegation.unwrap_or_default();
            Delegation {
                validator_address: delegation.validator_address,
                shares: format_legacy_dec(&delegation.shares),
                balance: d.balance.map(coin),
            }
        })
        .collect())
}

/// Account record, balances and delegations in one go
pub async fn account_overview(rpc: &dyn ChainRpc, address: &str) -> Result<AccountOverview> {
    let account = account(rpc, address).await?;
    let balances = balances(rpc, address).await?;
    let delegations = delegations(rpc, address).await?;

    Ok(AccountOverview {
        address: address.to_string(),
        account,
        balances,
        delegations,
    })
}

/// Module parameters as display key/value pairs
pub async fn params(rpc: &dyn ChainRpc, module: ParamsModule) -> Result<Vec<(String, String)>> {
    let pairs = match module {
        ParamsModule::Staking => {
            let r: staking::QueryParamsResponse = query(
                rpc,
                "/cosmos.staking.v1beta1.Query/Params",
                staking::QueryParamsRequest {},
            )
            .await?;
            let p = r.params.unwrap_or_default();
            vec![
                kv("bond_denom", p.bond_denom),
                kv("max_validators", p.max_validators),
                kv("max_entries", p.max_entries),
                kv(
                    "unbonding_time",
                    format_seconds(p.unbonding_time.map(|d| d.seconds)),
                ),
                kv("min_commission_rate", format_legacy_dec(&p.min_commission_rate)),
            ]
        }
        ParamsModule::Mint => {
            let r: mint::QueryParamsResponse = query(
                rpc,
                "/cosmos.mint.v1beta1.Query/Params",
                mint::QueryParamsRequest {},
            )
            .await?;
            let p = r.params.unwrap_or_default();
            vec![
                kv("mint_denom", p.mint_denom),
                kv("inflation_max", format_legacy_dec(&p.inflation_max)),
                kv("inflation_min", format_legacy_dec(&p.inflation_min)),
                kv("goal_bonded", format_legacy_dec(&p.goal_bonded)),
                kv("blocks_per_year", p.blocks_per_year),
            ]
        }
        ParamsModule::Distribution => {
            let r: distribution::QueryParamsResponse = query(
                rpc,
                "/cosmos.distribution.v1beta1.Query/Params",
                distribution::QueryParamsRequest {},
            )
            .await?;
            let p = r.params.unwrap_or_default();
            vec![
                kv("community_tax", format_legacy_dec(&p.community_tax)),
                kv("withdraw_addr_enabled", p.withdraw_addr_enabled),
            ]
        }
        ParamsModule::Slashing => {
            let r: slashing::QueryParamsResponse = query(
                rpc,
                "/cosmos.slashing.v1beta1.Query/Params",
                slashing::QueryParamsRequest {},
            )
            .await?;
            let p = r.params.unwrap_or_default();
            vec![
                kv("signed_blocks_window", p.signed_blocks_window),
                kv(
                    "min_signed_per_window",
                    format_legacy_dec(&String::from_utf8_lossy(&p.min_signed_per_window)),
                ),
                kv(
                    "downtime_jail_duration",
                    format_seconds(p.downtime_jail_duration.map(|d| d.seconds)),
                ),
            ]
        }
        ParamsModule::Governance => {
            let r: gov::QueryParamsResponse = query(
                rpc,
                "/cosmos.gov.v1beta1.Query/Params",
                gov::QueryParamsRequest {
                    params_type: "deposit".to_string(),
                },
            )
            .await?;
            let p = r.deposit_params.unwrap_or_default();
            let min_deposit = p
                .min_deposit
                .into_iter()
                .map(|c| format!("{} {}", c.amount, c.denom))
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                kv("min_deposit", min_deposit),
                kv(
                    "max_deposit_period",
                    format_seconds(p.max_deposit_period.map(|d| d.seconds)),
                ),
            ]
        }
    };
    Ok(pairs)
}

fn kv(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn format_seconds(seconds: Option<i64>) -> String {
    match seconds {
        Some(s) if s % 86_400 == 0 && s > 0 => format!("{}d", s / 86_400),
        Some(s) if s % 3_600 == 0 && s > 0 => format!("{}h", s / 3_600),
        Some(s) => format!("{s}s"),
        None => "-".to_string(),
    }
}

/// Render a `LegacyDec` wire value. Values that already carry a point
/// are shown as-is.
pub fn format_legacy_dec(raw: &str) -> String {
    if raw.is_empty() || raw.contains('.') {
        return raw.to_string();
    }
    match shift_decimal(raw, LEGACY_DEC_PRECISION) {
        Some(d) => plain_decimal(&d),
        None => raw.to_string(),
    }
}
