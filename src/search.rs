/// Bech32 limit on the human-readable part
const MAX_HRP_LEN: usize = 83;

const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Represents the type of search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Bech32 account address (dydx1...)
    Address(String),
    /// Transaction hash (64 hex chars, optional 0x), normalized to upper case
    TxHash(String),
    /// Block height
    BlockHeight(u64),
    /// The chain tip
    Latest,
    /// Invalid or unrecognized query
    Invalid(String),
}

impl SearchQuery {
    /// Parse a search string into a typed query
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Self::Invalid("Empty query".to_string());
        }

        if trimmed.eq_ignore_ascii_case("latest") {
            return Self::Latest;
        }

        let lower = trimmed.to_lowercase();
        if looks_like_bech32(&lower) {
            return match validate_bech32(&lower) {
                Ok(()) => Self::Address(lower),
                Err(reason) => Self::Invalid(reason),
            };
        }

        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"));

        if let Some(hex_part) = hex_part {
            return Self::parse_hash(trimmed, hex_part);
        }

        if trimmed.len() == 64 {
            return Self::parse_hash(trimmed, trimmed);
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return match trimmed.parse::<u64>() {
                Ok(height) => Self::BlockHeight(height),
                Err(_) => Self::Invalid(format!("Block height too large: {trimmed}")),
            };
        }

        Self::Invalid(format!("Unrecognized query format: {trimmed}"))
    }

    fn parse_hash(original: &str, hex_part: &str) -> Self {
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::Invalid(format!("Invalid hex characters in: {original}"));
        }
        if hex_part.len() != 64 {
            return Self::Invalid(format!(
                "Tx hash must be 64 hex chars, got {}",
                hex_part.len()
            ));
        }
        Self::TxHash(hex_part.to_uppercase())
    }

    /// Returns a human-readable description of the query type
    pub fn description(&self) -> String {
        match self {
            Self::Address(addr) => format!("Account: {addr}"),
            Self::TxHash(hash) => format!("Transaction: {hash}"),
            Self::BlockHeight(height) => format!("Block: {height}"),
            Self::Latest => "Latest block".to_string(),
            Self::Invalid(reason) => format!("Invalid: {reason}"),
        }
    }
}

/// `<hrp>1<data>` with a letters-only hrp. All-hex strings stay hashes.
fn looks_like_bech32(input: &str) -> bool {
    match input.rsplit_once('1') {
        Some((hrp, _)) => {
            !hrp.is_empty()
                && hrp.chars().all(|c| c.is_ascii_lowercase())
                && !input.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Shape check only: separator, charset and length. Any hrp is accepted
/// (`dydx`, `dydxvaloper`, other Cosmos chains); the checksum is left to the node.
fn validate_bech32(address: &str) -> Result<(), String> {
    let Some((hrp, data)) = address.rsplit_once('1') else {
        return Err(format!("Missing separator in address: {address}"));
    };
    if hrp.len() > MAX_HRP_LEN {
        return Err(format!("Address prefix too long: {hrp}"));
    }
    if let Some(bad) = data.chars().find(|c| !BECH32_CHARSET.contains(*c)) {
        return Err(format!("Invalid character '{bad}' in address"));
    }
    // 20-byte accounts are 38 data chars, 32-byte module accounts 58
    if !(38..=58).contains(&data.len()) {
        return Err(format!("Unexpected address length: {}", address.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "dydx1s8ezl0mm9h5vuvm5uvn8x3ds4ewpwwmgkhl2hd";
    const HASH: &str = "5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    #[test]
    fn test_parse_address() {
        assert_eq!(
            SearchQuery::parse(ADDRESS),
            SearchQuery::Address(ADDRESS.to_string())
        );
    }

    #[test]
    fn test_parse_address_uppercase_normalized() {
        assert_eq!(
            SearchQuery::parse(&ADDRESS.to_uppercase()),
            SearchQuery::Address(ADDRESS.to_string())
        );
    }

    #[test]
    fn test_parse_address_bad_charset() {
        // 'b' is not in the bech32 charset
        let bad = "dydx1b8ezl0mm9h5vuvm5uvn8x3ds4ewpwwmgkhl2hd";
        assert!(matches!(SearchQuery::parse(bad), SearchQuery::Invalid(_)));
    }

    #[test]
    fn test_parse_address_any_prefix() {
        let cosmos = "cosmos1s8ezl0mm9h5vuvm5uvn8x3ds4ewpwwmgkhl2hd";
        assert_eq!(
            SearchQuery::parse(cosmos),
            SearchQuery::Address(cosmos.to_string())
        );
        let valoper = "dydxvaloper1q9wsfz3rfk5wu7edqgkrx7j6ppsj9jz9m3c0vm";
        assert_eq!(
            SearchQuery::parse(valoper),
            SearchQuery::Address(valoper.to_string())
        );
    }

    #[test]
    fn test_hex_with_letter_prefix_stays_hash() {
        // hrp-shaped prefix, but every char is hex
        let hash = format!("abcdef1{}", "0".repeat(57));
        assert_eq!(
            SearchQuery::parse(&hash),
            SearchQuery::TxHash(hash.to_uppercase())
        );
    }

    #[test]
    fn test_parse_address_wrong_length() {
        assert!(matches!(
            SearchQuery::parse("dydx1qqqq"),
            SearchQuery::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_tx_hash() {
        assert_eq!(
            SearchQuery::parse(HASH),
            SearchQuery::TxHash(HASH.to_uppercase())
        );
        assert_eq!(
            SearchQuery::parse(&format!("0x{HASH}")),
            SearchQuery::TxHash(HASH.to_uppercase())
        );
    }

    #[test]
    fn test_parse_short_hex_invalid() {
        assert!(matches!(
            SearchQuery::parse("0xBC614E"),
            SearchQuery::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_block_height() {
        assert_eq!(
            SearchQuery::parse("12345678"),
            SearchQuery::BlockHeight(12345678)
        );
    }

    #[test]
    fn test_parse_latest() {
        assert_eq!(SearchQuery::parse(" Latest "), SearchQuery::Latest);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            SearchQuery::parse("vitalik.eth"),
            SearchQuery::Invalid(_)
        ));
        assert!(matches!(SearchQuery::parse(""), SearchQuery::Invalid(_)));
    }

    #[test]
    fn test_description() {
        assert_eq!(SearchQuery::BlockHeight(5).description(), "Block: 5");
        assert_eq!(SearchQuery::Latest.description(), "Latest block");
    }
}
