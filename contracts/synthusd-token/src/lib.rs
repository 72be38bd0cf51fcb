//! SynthUSD Token Ledgers
//!
//! In-memory fungible tokens used as the engine's collaborators:
//!
//! - [`FungibleToken`]: balances, allowances and owner-gated minting. The
//!   SynthUSD liability token is a `FungibleToken` whose ownership has been
//!   transferred to the engine, so only the engine can mint.
//! - [`TokenRegistry`]: collateral tokens addressed by asset identifier.
//!
//! Both implement the collaborator traits from `synthusd-common`; refusals
//! surface to the engine as `false` and are logged here with their reason.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use synthusd_common::{
    constants::token,
    types::{is_zero_address, short_hex, Address},
    LiabilityToken,
};

mod registry;

pub use registry::TokenRegistry;

/// Result type alias for token operations
pub type TokenResult<T> = Result<T, TokenError>;

/// Token errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Amount must be greater than zero
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Zero address supplied as recipient or owner
    #[error("zero address not allowed")]
    ZeroAddress,

    /// Caller does not own the token
    #[error("caller is not the token owner")]
    NotOwner { owner: Address, caller: Address },

    /// Balance too small for transfer
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u128, requested: u128 },

    /// Balance too small for burn
    #[error("burn amount {requested} exceeds balance {available}")]
    BurnAmountExceedsBalance { available: u128, requested: u128 },

    /// Allowance too small for `transfer_from`
    #[error("insufficient allowance: available {available}, requested {requested}")]
    InsufficientAllowance { available: u128, requested: u128 },

    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,
}

// ============ Token State ============

/// Complete token bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenState {
    /// Owner (may mint and burn)
    pub owner: Address,
    /// Total supply tracking
    pub total_supply: u128,
    /// Nonzero balances
    pub balances: BTreeMap<Address, u128>,
    /// Nonzero allowances keyed by (holder, spender)
    pub allowances: BTreeMap<(Address, Address), u128>,
}

impl TokenState {
    fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, account: Address, amount: u128) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn allowance(&self, holder: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*holder, *spender)).copied().unwrap_or(0)
    }

    fn set_allowance(&mut self, holder: Address, spender: Address, amount: u128) {
        if amount == 0 {
            self.allowances.remove(&(holder, spender));
        } else {
            self.allowances.insert((holder, spender), amount);
        }
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> TokenResult<()> {
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        if is_zero_address(to) {
            return Err(TokenError::ZeroAddress);
        }

        let available = self.balance(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        // Debit first so self-transfers net to zero
        self.set_balance(*from, available - amount);
        let credited = self.balance(to).checked_add(amount).ok_or(TokenError::Overflow)?;
        self.set_balance(*to, credited);
        Ok(())
    }
}

// ============ Fungible Token ============

/// A fungible token with owner-gated minting
#[derive(Debug)]
pub struct FungibleToken {
    name: String,
    symbol: String,
    decimals: u8,
    state: Mutex<TokenState>,
}

impl FungibleToken {
    /// Create a token owned by `owner` with zero supply
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, owner: Address) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: token::DECIMALS,
            state: Mutex::new(TokenState {
                owner,
                ..TokenState::default()
            }),
        }
    }

    /// Create the SynthUSD liability token
    pub fn synth_usd(owner: Address) -> Self {
        Self::new(token::NAME, token::SYMBOL, owner)
    }

    /// Get token name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get token symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get token decimals
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.state.lock().owner
    }

    /// Total supply
    pub fn total_supply(&self) -> u128 {
        self.state.lock().total_supply
    }

    /// Balance of `account`
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.state.lock().balance(account)
    }

    /// Remaining allowance of `spender` over `holder`'s tokens
    pub fn allowance(&self, holder: &Address, spender: &Address) -> u128 {
        self.state.lock().allowance(holder, spender)
    }

    /// Copy of the full bookkeeping
    pub fn snapshot(&self) -> TokenState {
        self.state.lock().clone()
    }

    /// Hand ownership (and minting rights) to `new_owner`
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> TokenResult<()> {
        let mut state = self.state.lock();
        ensure_owner(&state, caller)?;
        if is_zero_address(&new_owner) {
            return Err(TokenError::ZeroAddress);
        }
        state.owner = new_owner;
        debug!(token = %self.symbol, owner = %short_hex(&new_owner), "Ownership transferred");
        Ok(())
    }

    /// Mint `amount` to `to` (owner only)
    pub fn mint(&self, caller: &Address, to: &Address, amount: u128) -> TokenResult<()> {
        let mut state = self.state.lock();

        // 1. Caller must own the token
        ensure_owner(&state, caller)?;

        // 2. Recipient and amount must be real
        if is_zero_address(to) {
            return Err(TokenError::ZeroAddress);
        }
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        // 3. Update supply then balance
        let new_supply = state.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let new_balance = state.balance(to).checked_add(amount).ok_or(TokenError::Overflow)?;
        state.total_supply = new_supply;
        state.set_balance(*to, new_balance);

        debug!(token = %self.symbol, to = %short_hex(to), amount, new_supply, "Minted");
        Ok(())
    }

    /// Burn `amount` from the owner's own balance (owner only)
    pub fn burn(&self, caller: &Address, amount: u128) -> TokenResult<()> {
        let mut state = self.state.lock();
        ensure_owner(&state, caller)?;

        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        let available = state.balance(caller);
        if available < amount {
            return Err(TokenError::BurnAmountExceedsBalance {
                available,
                requested: amount,
            });
        }

        state.set_balance(*caller, available - amount);
        state.total_supply -= amount; // supply >= any single balance

        debug!(token = %self.symbol, amount, new_supply = state.total_supply, "Burned");
        Ok(())
    }

    /// Set `spender`'s allowance over `holder`'s tokens
    pub fn approve(&self, holder: &Address, spender: &Address, amount: u128) -> TokenResult<()> {
        if is_zero_address(spender) {
            return Err(TokenError::ZeroAddress);
        }
        self.state.lock().set_allowance(*holder, *spender, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&self, from: &Address, to: &Address, amount: u128) -> TokenResult<()> {
        self.state.lock().move_balance(from, to, amount)
    }

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance
    ///
    /// An allowance of `u128::MAX` is never decremented.
    pub fn transfer_from(&self, spender: &Address, from: &Address, to: &Address, amount: u128) -> TokenResult<()> {
        let mut state = self.state.lock();

        let allowance = state.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                available: allowance,
                requested: amount,
            });
        }

        state.move_balance(from, to, amount)?;
        if allowance != u128::MAX {
            state.set_allowance(*from, *spender, allowance - amount);
        }
        Ok(())
    }
}

fn ensure_owner(state: &TokenState, caller: &Address) -> TokenResult<()> {
    if state.owner != *caller {
        return Err(TokenError::NotOwner {
            owner: state.owner,
            caller: *caller,
        });
    }
    Ok(())
}

/// Logs a refusal and collapses the result to the collaborator convention
pub(crate) fn accepted(symbol: &str, operation: &'static str, result: TokenResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(token = symbol, operation, error = %err, "Token operation refused");
            false
        }
    }
}

impl LiabilityToken for FungibleToken {
    fn mint(&self, minter: &Address, to: &Address, amount: u128) -> bool {
        accepted(&self.symbol, "mint", FungibleToken::mint(self, minter, to, amount))
    }

    fn burn(&self, holder: &Address, amount: u128) -> bool {
        accepted(&self.symbol, "burn", FungibleToken::burn(self, holder, amount))
    }

    fn transfer_from(&self, spender: &Address, from: &Address, to: &Address, amount: u128) -> bool {
        accepted(
            &self.symbol,
            "transfer_from",
            FungibleToken::transfer_from(self, spender, from, to, amount),
        )
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> bool {
        accepted(&self.symbol, "transfer", FungibleToken::transfer(self, from, to, amount))
    }
}

// ============ Tests ============
