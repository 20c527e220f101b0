//! Block Validator.
//!
//! Rules run in order and the first failure wins:
//!
//! 1. Structure: field lengths, blank strings, decimal precision, amounts.
//! 2. Uniqueness: the identifier must not already be resident in the queue.
//! 3. Balance set: distinct account numbers, then exactly one balance lock.
//!
//! Everything here is a pure function of the payload and a queue snapshot.
//! The snapshot can be stale by the time the block is enqueued, so
//! `ConfirmationQueue::enqueue` repeats the uniqueness check inside its
//! critical section.

use super::entities::{
    BlockMessage, ConfirmationBlock, NetworkBlock, Tx, UnvalidatedBalance,
    UnvalidatedConfirmationBlock, UnvalidatedNetworkBlock, UnvalidatedTx, UpdatedBalance,
    ValidatedBlock,
};
use super::errors::{BalanceSetViolation, StructuralReason, ValidationError};
use super::invariants::{balance_lock_count, first_duplicate_account, is_resident};
use super::value_objects::{
    AccountNumber, Balance, BalanceKey, BalanceLock, BlockIdentifier, Memo, Signature,
};

/// Runs every rule against `resident`.
pub fn validate(
    input: UnvalidatedConfirmationBlock,
    resident: &[ConfirmationBlock],
) -> Result<ValidatedBlock, ValidationError> {
    let block = parse_structure(input)?;
    admit(block, resident)
}

/// Rules 2 and 3 for a block that already passed rule 1.
pub fn admit(
    block: ConfirmationBlock,
    resident: &[ConfirmationBlock],
) -> Result<ValidatedBlock, ValidationError> {
    check_unique(&block, resident)?;
    check_balance_set(&block.updated_balances)?;
    Ok(ValidatedBlock::new(block))
}

/// Rule 1: turns the submitted payload into its typed form.
pub fn parse_structure(
    input: UnvalidatedConfirmationBlock,
) -> Result<ConfirmationBlock, ValidationError> {
    let block = parse_network_block(input.block)?;
    let block_identifier = BlockIdentifier::parse("block_identifier", input.block_identifier)?;
    let updated_balances = input
        .updated_balances
        .into_iter()
        .enumerate()
        .map(|(i, balance)| parse_updated_balance(i, balance))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConfirmationBlock {
        block,
        block_identifier,
        updated_balances,
    })
}

fn parse_network_block(block: UnvalidatedNetworkBlock) -> Result<NetworkBlock, ValidationError> {
    let account_number = AccountNumber::parse("block.account_number", block.account_number)?;
    let balance_key = BalanceKey::parse("block.message.balance_key", block.message.balance_key)?;
    let txs = block
        .message
        .txs
        .into_iter()
        .enumerate()
        .map(|(i, tx)| parse_tx(i, tx))
        .collect::<Result<Vec<_>, _>>()?;
    let signature = Signature::parse("block.signature", block.signature)?;

    Ok(NetworkBlock {
        account_number,
        message: BlockMessage { balance_key, txs },
        signature,
    })
}

fn parse_tx(index: usize, tx: UnvalidatedTx) -> Result<Tx, ValidationError> {
    let field = |name: &str| format!("block.message.txs[{index}].{name}");

    let amount = u64::try_from(tx.amount)
        .ok()
        .filter(|amount| *amount >= 1)
        .ok_or_else(|| {
            ValidationError::structural(field("amount"), StructuralReason::BelowMinimum { min: 1 })
        })?;
    let recipient = AccountNumber::parse(&field("recipient"), tx.recipient)?;
    let memo = tx
        .memo
        .map(|memo| Memo::parse(&field("memo"), memo))
        .transpose()?;

    Ok(Tx {
        amount,
        recipient,
        fee: tx.fee,
        memo,
    })
}

fn parse_updated_balance(
    index: usize,
    balance: UnvalidatedBalance,
) -> Result<UpdatedBalance, ValidationError> {
    let field = |name: &str| format!("updated_balances[{index}].{name}");

    Ok(UpdatedBalance {
        account_number: AccountNumber::parse(&field("account_number"), balance.account_number)?,
        balance: Balance::from_input(&field("balance"), &balance.balance)?,
        balance_lock: balance
            .balance_lock
            .map(|lock| BalanceLock::parse(&field("balance_lock"), lock))
            .transpose()?,
    })
}

/// Rule 2: first writer wins on a block identifier.
pub fn check_unique(
    block: &ConfirmationBlock,
    resident: &[ConfirmationBlock],
) -> Result<(), ValidationError> {
    if is_resident(&block.block_identifier, resident) {
        return Err(ValidationError::DuplicateBlock(
            block.block_identifier.clone(),
        ));
    }
    Ok(())
}

/// Rule 3: distinct accounts, then exactly one balance lock.
///
/// An empty set has distinct accounts but zero locks, so it is rejected.
pub fn check_balance_set(balances: &[UpdatedBalance]) -> Result<(), ValidationError> {
    if let Some(account) = first_duplicate_account(balances) {
        return Err(ValidationError::InvalidBalanceSet(
            BalanceSetViolation::DuplicateAccount {
                account: account.clone(),
            },
        ));
    }

    let found = balance_lock_count(balances);
    if found != 1 {
        return Err(ValidationError::InvalidBalanceSet(
            BalanceSetViolation::WrongLockCount { found },
        ));
    }

    Ok(())
}
