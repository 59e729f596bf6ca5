//! Amount normalization: turns raw on-chain integer amounts into display
//! amounts using asset precision metadata.
//!
//! Exponent lookup order for a denom:
//! 1. exact symbol match in the [`PrecisionMap`]
//! 2. case-insensitive substring match in either direction, longest symbol wins
//! 3. conventional minimal-unit prefix (`u` = 10^6, `a` = 10^18)
//!
//! Amounts are shifted as [`BigDecimal`] by moving the scale, so 256-bit
//! `sdk.Int` balances stay exact.

use bigdecimal::num_bigint::Sign;
use bigdecimal::BigDecimal;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::indexer::{AssetPosition, PositionSide};
use crate::metadata::AssetInfo;

/// Fraction digits kept in formatted amounts
pub const DISPLAY_DECIMALS: u32 = 6;

const MINIMAL_UNIT_PREFIXES: &[(char, u32)] = &[('u', 6), ('a', 18)];

/// Symbol -> exponent lookup that remembers insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionMap {
    entries: Vec<(String, u32)>,
}

impl PrecisionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets without any precision field are skipped
    pub fn from_assets(assets: &[AssetInfo]) -> Self {
        let mut map = Self::new();
        for asset in assets {
            if let Some(exponent) = asset.exponent() {
                map.insert(&asset.symbol, exponent);
            }
        }
        map
    }

    /// Insert or update; an updated symbol keeps its original position
    pub fn insert(&mut self, symbol: &str, exponent: u32) {
        match self.entries.iter_mut().find(|(s, _)| s == symbol) {
            Some(entry) => entry.1 = exponent,
            None => self.entries.push((symbol.to_string(), exponent)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, e)| *e)
    }

    /// Case-insensitive containment in either direction. When several symbols
    /// match, the longest wins; equal lengths keep insertion order.
    pub fn fuzzy(&self, denom: &str) -> Option<(&str, u32)> {
        let needle = denom.to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let mut best: Option<(&str, u32)> = None;
        for (symbol, exponent) in &self.entries {
            if symbol.is_empty() {
                continue;
            }
            let candidate = symbol.to_lowercase();
            if !(needle.contains(&candidate) || candidate.contains(&needle)) {
                continue;
            }
            let longer = match best {
                Some((current, _)) => symbol.len() > current.len(),
                None => true,
            };
            if longer {
                best = Some((symbol.as_str(), *exponent));
            }
        }
        best
    }

    /// Exact match first, then fuzzy
    pub fn resolve(&self, denom: &str) -> Option<(&str, u32)> {
        self.entries
            .iter()
            .find(|(s, _)| s == denom)
            .map(|(s, e)| (s.as_str(), *e))
            .or_else(|| self.fuzzy(denom))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display-ready amount derived from a raw on-chain amount
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAmount {
    pub raw: String,
    /// Shifted amount, or the raw value when no conversion applied.
    /// `None` only when the raw string is not a number.
    pub converted: Option<BigDecimal>,
    pub formatted: String,
    pub base_denom: String,
    pub was_converted: bool,
}

/// Normalize `raw` (minimal units of `denom`).
///
/// An explicit `exponent` skips the lookup. Raw amounts with a fractional
/// part are already display-scaled and are never shifted.
pub fn normalize_amount(
    raw: &str,
    denom: &str,
    exponent: Option<u32>,
    map: &PrecisionMap,
) -> NormalizedAmount {
    let raw = raw.trim();
    let stripped = strip_minimal_prefix(denom);

    let resolved = if raw.contains('.') {
        None
    } else if let Some(exp) = exponent {
        Some((exp, stripped.map(|(_, base)| base).unwrap_or(denom).to_string()))
    } else if let Some((symbol, exp)) = map.resolve(denom) {
        Some((exp, symbol.to_string()))
    } else {
        stripped.map(|(exp, base)| (exp, base.to_string()))
    };

    if let Some((exp, base_denom)) = resolved {
        if let Some(value) = shift_decimal(raw, exp) {
            return NormalizedAmount {
                raw: raw.to_string(),
                formatted: format_big_decimal(&value, DISPLAY_DECIMALS),
                converted: Some(value),
                base_denom,
                was_converted: true,
            };
        }
    }

    let parsed = parse_amount(raw);
    NormalizedAmount {
        raw: raw.to_string(),
        formatted: parsed
            .as_ref()
            .map(|d| format_big_decimal(d, DISPLAY_DECIMALS))
            .unwrap_or_else(|| raw.to_string()),
        converted: parsed,
        base_denom: denom.to_string(),
        was_converted: false,
    }
}

/// Plain decimal notation only: optional `-`, digits, at most one point
fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let plain = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !plain {
        return None;
    }
    BigDecimal::from_str(raw).ok()
}

/// Divide by 10^exponent by moving the decimal point.
/// `None` when `raw` is not a plain decimal number.
pub fn shift_decimal(raw: &str, exponent: u32) -> Option<BigDecimal> {
    let (digits, scale) = parse_amount(raw.trim())?.into_bigint_and_exponent();
    Some(BigDecimal::new(digits, scale + i64::from(exponent)))
}

/// Sign, integer digits and fraction digits without trailing zeros
fn split_digits(value: &BigDecimal) -> (bool, String, String) {
    let (int, scale) = value.as_bigint_and_exponent();
    let negative = int.sign() == Sign::Minus;
    let mut digits = int.magnitude().to_string();
    if scale <= 0 {
        digits.push_str(&"0".repeat(scale.unsigned_abs() as usize));
        return (negative, digits, String::new());
    }

    let scale = scale as usize;
    if digits.len() <= scale {
        digits.insert_str(0, &"0".repeat(scale + 1 - digits.len()));
    }
    let frac = digits.split_off(digits.len() - scale);
    (negative, digits, frac.trim_end_matches('0').to_string())
}

fn join_grouped(negative: bool, digits: &str, frac: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + frac.len() + 2);
    if negative {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Group thousands and truncate to `max_decimals`, trimming trailing zeros
pub fn format_big_decimal(value: &BigDecimal, max_decimals: u32) -> String {
    let (negative, digits, frac) = split_digits(&value.with_scale(i64::from(max_decimals)));
    join_grouped(negative, &digits, &frac)
}

/// Full precision, no grouping: `0.050000` -> `0.05`
pub fn plain_decimal(value: &BigDecimal) -> String {
    let (negative, digits, frac) = split_digits(value);
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{digits}")
    } else {
        format!("{sign}{digits}.{frac}")
    }
}

/// `uusdc` -> (6, `usdc`), `adydx` -> (18, `dydx`). IBC and factory denoms never match.
pub fn strip_minimal_prefix(denom: &str) -> Option<(u32, &str)> {
    if denom.contains('/') {
        return None;
    }
    let mut chars = denom.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if rest.len() < 3 || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    MINIMAL_UNIT_PREFIXES
        .iter()
        .find(|(prefix, _)| *prefix == first)
        .map(|(_, exp)| (*exp, rest))
}

/// [`format_big_decimal`] for `Decimal` values such as prices
pub fn format_decimal(value: Decimal, max_decimals: u32) -> String {
    let truncated = value
        .round_dp_with_strategy(max_decimals, RoundingStrategy::ToZero)
        .normalize();
    let text = truncated.to_string();
    let (int_part, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    match int_part.strip_prefix('-') {
        Some(digits) => join_grouped(true, digits, frac),
        None => join_grouped(false, int_part, frac),
    }
}

/// An indexer asset position joined with its resolved precision
#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub subaccount_number: u32,
    pub symbol: String,
    pub name: Option<String>,
    pub side: PositionSide,
    pub exponent: Option<u32>,
    pub amount: NormalizedAmount,
}

/// Merge indexer positions with metadata. The exponent of an asset follows
/// [`AssetInfo::exponent`] precedence; assets absent from metadata go
/// through the regular denom lookup.
pub fn resolve_positions(positions: &[AssetPosition], assets: &[AssetInfo]) -> Vec<PositionView> {
    let map = PrecisionMap::from_assets(assets);

    let mut views: Vec<PositionView> = positions
        .iter()
        .map(|position| {
            let asset = assets.iter().find(|a| a.symbol == position.symbol);
            let exponent = asset
                .and_then(AssetInfo::exponent)
                .or_else(|| map.resolve(&position.symbol).map(|(_, e)| e));
            let mut amount = normalize_amount(&position.size, &position.symbol, exponent, &map);
            if amount.was_converted {
                amount.base_denom = position.symbol.clone();
            }

            PositionView {
                subaccount_number: position.subaccount_number,
                symbol: position.symbol.clone(),
                name: asset.and_then(|a| a.name.clone()),
                side: position.side,
                exponent,
                amount,
            }
        })
        .collect();

    views.sort_by(|a, b| {
        a.subaccount_number
            .cmp(&b.subaccount_number)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    views
}
