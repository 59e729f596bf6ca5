//! Protobuf transaction decoding.
//!
//! The envelope (`TxRaw`, body, auth info) must decode or the whole tx is
//! rejected. Individual messages are decoded through a [`MessageDecoder`];
//! unknown type URLs become [`DecodedMessage::Opaque`] entries and payloads
//! that fail to decode are dropped.

use cosmrs::proto::cosmos::{
    bank::v1beta1::MsgSend,
    distribution::v1beta1::MsgWithdrawDelegatorReward,
    gov::v1beta1::MsgVote,
    staking::v1beta1::{MsgBeginRedelegate, MsgDelegate, MsgUndelegate},
    tx::v1beta1::{AuthInfo, TxBody, TxRaw},
};
use prost::Message;
use tracing::debug;

use super::helper::tx_hash;
use super::Coin;
use crate::error::ExplorerError;

pub const MSG_SEND: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_DELEGATE: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const MSG_UNDELEGATE: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
pub const MSG_REDELEGATE: &str = "/cosmos.staking.v1beta1.MsgBeginRedelegate";
pub const MSG_WITHDRAW_REWARD: &str = "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward";
pub const MSG_VOTE: &str = "/cosmos.gov.v1beta1.MsgVote";

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    Send {
        from: String,
        to: String,
        amount: Vec<Coin>,
    },
    Delegate {
        delegator: String,
        validator: String,
        amount: Option<Coin>,
    },
    Undelegate {
        delegator: String,
        validator: String,
        amount: Option<Coin>,
    },
    Redelegate {
        delegator: String,
        source: String,
        destination: String,
        amount: Option<Coin>,
    },
    WithdrawReward {
        delegator: String,
        validator: String,
    },
    Vote {
        proposal_id: u64,
        voter: String,
        option: String,
    },
    /// Recognized envelope, unknown message type
    Opaque { type_url: String, size: usize },
}

impl DecodedMessage {
    pub fn label(&self) -> &str {
        match self {
            DecodedMessage::Send { .. } => "Send",
            DecodedMessage::Delegate { .. } => "Delegate",
            DecodedMessage::Undelegate { .. } => "Undelegate",
            DecodedMessage::Redelegate { .. } => "Redelegate",
            DecodedMessage::WithdrawReward { .. } => "Withdraw Reward",
            DecodedMessage::Vote { .. } => "Vote",
            DecodedMessage::Opaque { type_url, .. } => short_type_name(type_url),
        }
    }

    /// Account addresses mentioned by the message, in display order
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            DecodedMessage::Send { from, to, .. } => vec![from.as_str(), to.as_str()],
            DecodedMessage::Delegate { delegator, .. }
            | DecodedMessage::Undelegate { delegator, .. }
            | DecodedMessage::Redelegate { delegator, .. }
            | DecodedMessage::WithdrawReward { delegator, .. } => vec![delegator.as_str()],
            DecodedMessage::Vote { voter, .. } => vec![voter.as_str()],
            DecodedMessage::Opaque { .. } => Vec::new(),
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, DecodedMessage::Opaque { .. })
    }
}

/// `/dydxprotocol.clob.MsgPlaceOrder` -> `MsgPlaceOrder`
pub fn short_type_name(type_url: &str) -> &str {
    type_url.rsplit('.').next().unwrap_or(type_url)
}

/// Turns one `Any` payload into a [`DecodedMessage`]
pub trait MessageDecoder {
    fn decode(&self, type_url: &str, value: &[u8]) -> Result<DecodedMessage, ExplorerError>;
}

/// Decoder for the standard Cosmos SDK messages
#[derive(Debug, Clone, Copy, Default)]
pub struct CosmosMessageDecoder;

impl MessageDecoder for CosmosMessageDecoder {
    fn decode(&self, type_url: &str, value: &[u8]) -> Result<DecodedMessage, ExplorerError> {
        let msg = match type_url {
            MSG_SEND => {
                let m = MsgSend::decode(value)?;
                DecodedMessage::Send {
                    from: m.from_address,
                    to: m.to_address,
                    amount: m.amount.into_iter().map(coin).collect(),
                }
            }
            MSG_DELEGATE => {
                let m = MsgDelegate::decode(value)?;
                DecodedMessage::Delegate {
                    delegator: m.delegator_address,
                    validator: m.validator_address,
                    amount: m.amount.map(coin),
                }
            }
            MSG_UNDELEGATE => {
                let m = MsgUndelegate::decode(value)?;
                DecodedMessage::Undelegate {
                    delegator: m.delegator_address,
                    validator: m.validator_address,
                    amount: m.amount.map(coin),
                }
            }
            MSG_REDELEGATE => {
                let m = MsgBeginRedelegate::decode(value)?;
                DecodedMessage::Redelegate {
                    delegator: m.delegator_address,
                    source: m.validator_src_address,
                    destination: m.validator_dst_address,
                    amount: m.amount.map(coin),
                }
            }
            MSG_WITHDRAW_REWARD => {
                let m = MsgWithdrawDelegatorReward::decode(value)?;
                DecodedMessage::WithdrawReward {
                    delegator: m.delegator_address,
                    validator: m.validator_address,
                }
            }
            MSG_VOTE => {
                let m = MsgVote::decode(value)?;
                DecodedMessage::Vote {
                    proposal_id: m.proposal_id,
                    voter: m.voter,
                    option: vote_option(m.option).to_string(),
                }
            }
            _ => DecodedMessage::Opaque {
                type_url: type_url.to_string(),
                size: value.len(),
            },
        };
        Ok(msg)
    }
}

fn vote_option(option: i32) -> &'static str {
    match option {
        1 => "Yes",
        2 => "Abstain",
        3 => "No",
        4 => "No With Veto",
        _ => "Unspecified",
    }
}

fn coin(c: cosmrs::proto::cosmos::base::v1beta1::Coin) -> Coin {
    Coin {
        denom: c.denom,
        amount: c.amount,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedTx {
    pub hash: String,
    pub messages: Vec<DecodedMessage>,
    /// Messages present in the body, including dropped ones
    pub message_count: usize,
    pub memo: String,
    pub fee: Vec<Coin>,
    pub gas_limit: u64,
    pub timeout_height: u64,
    pub signatures: usize,
}

impl DecodedTx {
    pub fn dropped(&self) -> usize {
        self.message_count - self.messages.len()
    }

    /// Label of the first message, with a count suffix for batches
    pub fn summary(&self) -> String {
        match self.messages.first() {
            None if self.message_count == 0 => "Empty".to_string(),
            None => "Undecodable".to_string(),
            Some(first) if self.message_count > 1 => {
                format!("{} +{}", first.label(), self.message_count - 1)
            }
            Some(first) => first.label().to_string(),
        }
    }
}

pub fn decode_tx(raw: &[u8]) -> Result<DecodedTx, ExplorerError> {
    decode_tx_with(raw, &CosmosMessageDecoder)
}

pub fn decode_tx_with(
    raw: &[u8],
    decoder: &dyn MessageDecoder,
) -> Result<DecodedTx, ExplorerError> {
    let envelope = TxRaw::decode(raw)?;
    let body = TxBody::decode(envelope.body_bytes.as_slice())?;
    let auth_info = AuthInfo::decode(envelope.auth_info_bytes.as_slice())?;

    let message_count = body.messages.len();
    let messages = body
        .messages
        .iter()
        .filter_map(|any| match decoder.decode(&any.type_url, &any.value) {
            Ok(msg) => Some(msg),
            Err(e) => {
                debug!(type_url = %any.type_url, error = %e, "dropping undecodable message");
                None
            }
        })
        .collect();

    let (fee, gas_limit) = match auth_info.fee {
        Some(fee) => (fee.amount.into_iter().map(coin).collect(), fee.gas_limit),
        None => (Vec::new(), 0),
    };

    Ok(DecodedTx {
        hash: tx_hash(raw),
        messages,
        message_count,
        memo: body.memo,
        fee,
        gas_limit,
        timeout_height: body.timeout_height,
        signatures: envelope.signatures.len(),
    })
}

/// Decode every tx in a block. Envelopes that fail to decode are skipped;
/// the count of skipped txs is returned alongside.
pub fn decode_block_txs(txs: &[Vec<u8>]) -> (Vec<DecodedTx>, usize) {
    let mut decoded = Vec::with_capacity(txs.len());
    let mut failed = 0;
    for raw in txs {
        match decode_tx(raw) {
            Ok(tx) => decoded.push(tx),
            Err(e) => {
                debug!(hash = %tx_hash(raw), error = %e, "skipping undecodable tx");
                failed += 1;
            }
        }
    }
    (decoded, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmrs::proto::cosmos::base::v1beta1::Coin as ProtoCoin;
    use cosmrs::proto::cosmos::tx::v1beta1::Fee;

    fn any(type_url: &str, value: Vec<u8>) -> cosmrs::Any {
        cosmrs::Any {
            type_url: type_url.to_string(),
            value,
        }
    }

    fn send_msg() -> cosmrs::Any {
        let msg = MsgSend {
            from_address: "dydx1from".into(),
            to_address: "dydx1to".into(),
            amount: vec![ProtoCoin {
                denom: "ibc/8E27BA2D5493AF5636760E354E46004562C46AB7EC0CC4C1CA14E9E20E2545B5"
                    .into(),
                amount: "1500000".into(),
            }],
        };
        any(MSG_SEND, msg.encode_to_vec())
    }

    fn build_tx(messages: Vec<cosmrs::Any>, memo: &str) -> Vec<u8> {
        let body = TxBody {
            messages,
            memo: memo.to_string(),
            ..Default::default()
        };
        let auth_info = AuthInfo {
            fee: Some(Fee {
                amount: vec![ProtoCoin {
                    denom: "adydx".into(),
                    amount: "5000000000000000".into(),
                }],
                gas_limit: 200_000,
                ..Default::default()
            }),
            ..Default::default()
        };
        TxRaw {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            signatures: vec![vec![0u8; 64]],
        }
        .encode_to_vec()
    }

    #[test]
    fn test_decode_send_with_fee_and_memo() {
        let raw = build_tx(vec![send_msg()], "hello");
        let tx = decode_tx(&raw).unwrap();

        assert_eq!(tx.hash, tx_hash(&raw));
        assert_eq!(tx.memo, "hello");
        assert_eq!(tx.gas_limit, 200_000);
        assert_eq!(tx.fee[0].denom, "adydx");
        assert_eq!(tx.signatures, 1);
        assert_eq!(tx.summary(), "Send");
        let DecodedMessage::Send { from, to, amount } = &tx.messages[0] else {
            panic!("Expected Send");
        };
        assert_eq!(from, "dydx1from");
        assert_eq!(to, "dydx1to");
        assert_eq!(amount[0].amount, "1500000");
    }

    #[test]
    fn test_malformed_message_dropped_others_kept() {
        // Length prefix claims 5 bytes, only 1 present
        let broken = any(MSG_SEND, vec![0x0a, 0x05, 0x61]);
        let raw = build_tx(vec![send_msg(), broken], "");

        let tx = decode_tx(&raw).unwrap();
        assert_eq!(tx.messages.len(), 1);
        assert_eq!(tx.message_count, 2);
        assert_eq!(tx.dropped(), 1);
        assert_eq!(tx.summary(), "Send +1");
    }

    #[test]
    fn test_unknown_type_is_opaque() {
        let raw = build_tx(vec![any("/dydxprotocol.clob.MsgPlaceOrder", vec![1, 2, 3])], "");
        let tx = decode_tx(&raw).unwrap();

        assert_eq!(tx.messages.len(), 1);
        assert!(tx.messages[0].is_opaque());
        assert_eq!(tx.messages[0].label(), "MsgPlaceOrder");
        assert!(tx.messages[0].accounts().is_empty());
    }

    #[test]
    fn test_bad_envelope_is_error() {
        assert!(matches!(
            decode_tx(&[0xff, 0xff]),
            Err(ExplorerError::Decode(_))
        ));
    }

    #[test]
    fn test_bad_body_is_error() {
        let raw = TxRaw {
            body_bytes: vec![0x0a, 0x09],
            auth_info_bytes: Vec::new(),
            signatures: Vec::new(),
        }
        .encode_to_vec();
        assert!(decode_tx(&raw).is_err());
    }

    #[test]
    fn test_staking_and_vote_messages() {
        let delegate = MsgDelegate {
            delegator_address: "dydx1del".into(),
            validator_address: "dydxvaloper1val".into(),
            amount: Some(ProtoCoin {
                denom: "adydx".into(),
                amount: "1000000000000000000".into(),
            }),
        };
        let vote = MsgVote {
            proposal_id: 12,
            voter: "dydx1voter".into(),
            option: 3,
        };
        let raw = build_tx(
            vec![
                any(MSG_DELEGATE, delegate.encode_to_vec()),
                any(MSG_VOTE, vote.encode_to_vec()),
            ],
            "",
        );
        let tx = decode_tx(&raw).unwrap();

        assert_eq!(tx.messages[0].accounts(), vec!["dydx1del"]);
        assert_eq!(
            tx.messages[1],
            DecodedMessage::Vote {
                proposal_id: 12,
                voter: "dydx1voter".into(),
                option: "No".into(),
            }
        );
    }

    #[test]
    fn test_decode_block_txs_skips_bad_envelopes() {
        let good = build_tx(vec![send_msg()], "");
        let (decoded, failed) = decode_block_txs(&[good, vec![0xff, 0xff]]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(failed, 1);
    }

    #[test]
    fn test_custom_decoder() {
        struct RejectAll;
        impl MessageDecoder for RejectAll {
            fn decode(&self, type_url: &str, _: &[u8]) -> Result<DecodedMessage, ExplorerError> {
                Err(ExplorerError::Decode(type_url.to_string()))
            }
        }

        let raw = build_tx(vec![send_msg()], "");
        let tx = decode_tx_with(&raw, &RejectAll).unwrap();
        assert!(tx.messages.is_empty());
        assert_eq!(tx.summary(), "Undecodable");
    }
}
