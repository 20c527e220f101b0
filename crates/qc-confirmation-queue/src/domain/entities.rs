//! Confirmation block entities.
//!
//! Two families of types live here:
//!
//! - `Unvalidated*`: the payload exactly as a peer submitted it, decoded with
//!   serde but otherwise unchecked.
//! - `ConfirmationBlock` and friends: the structurally valid form, built only
//!   by `validator::parse_structure`. This is also the persisted queue record.
//!
//! `ValidatedBlock` additionally proves the uniqueness and balance-set rules
//! held against a queue snapshot; `ConfirmationQueue::enqueue` only takes that.

use super::value_objects::{
    AccountNumber, Balance, BalanceKey, BalanceLock, BlockIdentifier, DecimalInput, Memo,
    Signature,
};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// Who a transaction fee is paid to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeKind {
    Bank,
    PrimaryValidator,
}

/// A single transfer inside a network block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub amount: u64,
    pub recipient: AccountNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<FeeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<Memo>,
}

/// The signed part of a network block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub balance_key: BalanceKey,
    pub txs: Vec<Tx>,
}

/// The ledger block a confirmation attests to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkBlock {
    pub account_number: AccountNumber,
    pub message: BlockMessage,
    pub signature: Signature,
}

impl NetworkBlock {
    /// Compact JSON with object keys sorted.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        // `serde_json::Value` objects are BTreeMap backed, so keys come out sorted.
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }

    /// SHA3-256 of the canonical form, hex encoded.
    pub fn digest(&self) -> Result<BlockIdentifier, serde_json::Error> {
        let canonical = self.canonical_json()?;
        let hash: [u8; 32] = Sha3_256::digest(canonical.as_bytes()).into();
        Ok(BlockIdentifier::from_digest(hash))
    }
}

/// Resulting balance of one account after the block is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedBalance {
    pub account_number: AccountNumber,
    pub balance: Balance,
    /// Present only on the account debited by the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_lock: Option<BalanceLock>,
}

/// A structurally valid confirmation block; also the persisted queue record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationBlock {
    pub block: NetworkBlock,
    pub block_identifier: BlockIdentifier,
    pub updated_balances: Vec<UpdatedBalance>,
}

/// A confirmation block that passed every validation rule.
///
/// Only the validator constructs this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedBlock(ConfirmationBlock);

impl ValidatedBlock {
    pub(crate) fn new(block: ConfirmationBlock) -> Self {
        Self(block)
    }

    pub fn block_identifier(&self) -> &BlockIdentifier {
        &self.0.block_identifier
    }

    pub fn as_block(&self) -> &ConfirmationBlock {
        &self.0
    }

    pub fn into_inner(self) -> ConfirmationBlock {
        self.0
    }
}

/// Transaction as submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnvalidatedTx {
    pub amount: i64,
    pub recipient: String,
    #[serde(default)]
    pub fee: Option<FeeKind>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Block message as submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnvalidatedBlockMessage {
    pub balance_key: String,
    pub txs: Vec<UnvalidatedTx>,
}

/// Network block as submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnvalidatedNetworkBlock {
    pub account_number: String,
    pub message: UnvalidatedBlockMessage,
    pub signature: String,
}

/// Updated balance as submitted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnvalidatedBalance {
    pub account_number: String,
    pub balance: DecimalInput,
    #[serde(default)]
    pub balance_lock: Option<String>,
}

/// Confirmation block payload as submitted by a peer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnvalidatedConfirmationBlock {
    pub block: UnvalidatedNetworkBlock,
    pub block_identifier: String,
    pub updated_balances: Vec<UnvalidatedBalance>,
}

impl From<&ConfirmationBlock> for UnvalidatedConfirmationBlock {
    fn from(block: &ConfirmationBlock) -> Self {
        let network = &block.block;
        Self {
            block: UnvalidatedNetworkBlock {
                account_number: network.account_number.to_string(),
                message: UnvalidatedBlockMessage {
                    balance_key: network.message.balance_key.to_string(),
                    txs: network
                        .message
                        .txs
                        .iter()
                        .map(|tx| UnvalidatedTx {
                            amount: i64::try_from(tx.amount).unwrap_or(i64::MAX),
                            recipient: tx.recipient.to_string(),
                            fee: tx.fee,
                            memo: tx.memo.as_ref().map(ToString::to_string),
                        })
                        .collect(),
                },
                signature: network.signature.to_string(),
            },
            block_identifier: block.block_identifier.to_string(),
            updated_balances: block
                .updated_balances
                .iter()
                .map(|balance| UnvalidatedBalance {
                    account_number: balance.account_number.to_string(),
                    balance: DecimalInput::Text(balance.balance.to_string()),
                    balance_lock: balance.balance_lock.as_ref().map(ToString::to_string),
                })
                .collect(),
        }
    }
}
