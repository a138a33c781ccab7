//! # Token Ledger Collaborator
//!
//! The swap registry moves value only through [`TokenLedger::execute`],
//! which applies a batch of transfers atomically: either every transfer in
//! the batch lands, or none does.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ebr_core::{Address, Amount};

/// Errors raised by a token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The holder's balance does not cover the transfer.
    #[error("insufficient balance of {token} for {holder}: have {balance}, need {amount}")]
    InsufficientBalance {
        /// Token contract.
        token: Address,
        /// Account being debited.
        holder: Address,
        /// Current balance.
        balance: Amount,
        /// Requested amount.
        amount: Amount,
    },

    /// The spender's allowance does not cover the transfer.
    #[error("insufficient allowance of {token} from {owner} to {spender}: have {allowance}, need {amount}")]
    InsufficientAllowance {
        /// Token contract.
        token: Address,
        /// Account being debited.
        owner: Address,
        /// Account moving the funds.
        spender: Address,
        /// Current allowance.
        allowance: Amount,
        /// Requested amount.
        amount: Amount,
    },

    /// A credit would overflow the holder's balance.
    #[error("balance overflow of {token} for {holder}")]
    Overflow {
        /// Token contract.
        token: Address,
        /// Account being credited.
        holder: Address,
    },
}

/// One transfer in a batch. Amounts serialize as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenTransfer {
    /// Move `amount` out of `from`'s own balance.
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        #[serde(with = "ebr_core::decimal")]
        amount: Amount,
    },
    /// Move `amount` out of `from`'s balance using `spender`'s allowance.
    TransferFrom {
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        #[serde(with = "ebr_core::decimal")]
        amount: Amount,
    },
}

/// Balance and transfer primitives of the target ledger.
pub trait TokenLedger: Send + Sync {
    /// Balance of `holder` in `token`.
    fn balance_of(&self, token: &Address, holder: &Address) -> Amount;

    /// Amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount;

    /// Apply every transfer in order, or none of them.
    ///
    /// # Errors
    ///
    /// Returns the first failing transfer's error; the ledger is unchanged.
    fn execute(&self, transfers: &[TokenTransfer]) -> Result<(), TokenError>;
}

#[derive(Debug, Clone, Default)]
struct Books {
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
}

impl Books {
    fn debit(&mut self, token: Address, holder: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, holder)).or_default();
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                holder,
                balance: *balance,
                amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn credit(&mut self, token: Address, holder: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, holder)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow { token, holder })?;
        Ok(())
    }

    fn apply(&mut self, transfer: &TokenTransfer) -> Result<(), TokenError> {
        match *transfer {
            TokenTransfer::Transfer {
                token,
                from,
                to,
                amount,
            } => {
                self.debit(token, from, amount)?;
                self.credit(token, to, amount)
            }
            TokenTransfer::TransferFrom {
                token,
                spender,
                from,
                to,
                amount,
            } => {
                let allowance = self.allowances.entry((token, from, spender)).or_default();
                if *allowance < amount {
                    return Err(TokenError::InsufficientAllowance {
                        token,
                        owner: from,
                        spender,
                        allowance: *allowance,
                        amount,
                    });
                }
                *allowance -= amount;
                self.debit(token, from, amount)?;
                self.credit(token, to, amount)
            }
        }
    }
}

/// In-process token ledger with standard mint/approve/transfer semantics.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    books: Mutex<Books>,
}

impl InMemoryTokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `holder` out of thin air.
    pub fn mint(&self, token: Address, holder: Address, amount: Amount) -> Result<(), TokenError> {
        self.books.lock().credit(token, holder, amount)
    }

    /// Set `spender`'s allowance over `owner`'s `token` balance.
    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: Amount) {
        self.books
            .lock()
            .allowances
            .insert((token, owner, spender), amount);
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, token: &Address, holder: &Address) -> Amount {
        self.books
            .lock()
            .balances
            .get(&(*token, *holder))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount {
        self.books
            .lock()
            .allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn execute(&self, transfers: &[TokenTransfer]) -> Result<(), TokenError> {
        let mut books = self.books.lock();
        let mut staged = books.clone();
        for transfer in transfers {
            staged.apply(transfer)?;
        }
        *books = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Address = Address::new([0x70; 20]);
    const ALICE: Address = Address::new([0xA1; 20]);
    const BOB: Address = Address::new([0xB0; 20]);
    const ESCROW: Address = Address::new([0xEE; 20]);

    #[test]
    fn transfer_moves_balance() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(TOKEN, ALICE, 100).unwrap();
        ledger
            .execute(&[TokenTransfer::Transfer {
                token: TOKEN,
                from: ALICE,
                to: BOB,
                amount: 40,
            }])
            .unwrap();
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 60);
        assert_eq!(ledger.balance_of(&TOKEN, &BOB), 40);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(TOKEN, ALICE, 100).unwrap();
        ledger.approve(TOKEN, ALICE, ESCROW, 70);
        ledger
            .execute(&[TokenTransfer::TransferFrom {
                token: TOKEN,
                spender: ESCROW,
                from: ALICE,
                to: ESCROW,
                amount: 50,
            }])
            .unwrap();
        assert_eq!(ledger.allowance(&TOKEN, &ALICE, &ESCROW), 20);
        assert_eq!(ledger.balance_of(&TOKEN, &ESCROW), 50);
    }

    #[test]
    fn over_allowance_rejected() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(TOKEN, ALICE, 100).unwrap();
        ledger.approve(TOKEN, ALICE, ESCROW, 10);
        let err = ledger
            .execute(&[TokenTransfer::TransferFrom {
                token: TOKEN,
                spender: ESCROW,
                from: ALICE,
                to: ESCROW,
                amount: 11,
            }])
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { allowance: 10, amount: 11, .. }));
    }

    #[test]
    fn failed_batch_rolls_back_earlier_transfers() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(TOKEN, ALICE, 100).unwrap();
        let other = Address::new([0x71; 20]);
        let err = ledger
            .execute(&[
                TokenTransfer::Transfer {
                    token: TOKEN,
                    from: ALICE,
                    to: BOB,
                    amount: 100,
                },
                TokenTransfer::Transfer {
                    token: other,
                    from: ALICE,
                    to: BOB,
                    amount: 1,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { balance: 0, .. }));
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 100);
        assert_eq!(ledger.balance_of(&TOKEN, &BOB), 0);
    }

    #[test]
    fn transfers_read_back_from_json() {
        let batch = vec![
            TokenTransfer::Transfer {
                token: TOKEN,
                from: ESCROW,
                to: BOB,
                amount: Amount::MAX,
            },
            TokenTransfer::TransferFrom {
                token: TOKEN,
                spender: ESCROW,
                from: ALICE,
                to: ESCROW,
                amount: 40_000_000,
            },
        ];
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value[0]["kind"], "transfer");
        assert_eq!(value[1]["kind"], "transfer_from");
        assert_eq!(value[1]["amount"], "40000000");
        let back: Vec<TokenTransfer> = serde_json::from_value(value).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn mint_overflow_rejected() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(TOKEN, ALICE, Amount::MAX).unwrap();
        assert_eq!(
            ledger.mint(TOKEN, ALICE, 1).unwrap_err(),
            TokenError::Overflow {
                token: TOKEN,
                holder: ALICE
            }
        );
    }
}
