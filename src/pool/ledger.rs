//! Colaboradores externos do motor: ledger fungível e controle de acesso.
//! O core só conhece estas superfícies; qualquer falha vira aborto duro da
//! operação inteira (sem compensação, sem retry).

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::curve::errors::{EngineErrorCode, Result};
use crate::curve::types::Wad;
use crate::engine_err;

/// Identificador de conta no ledger.
pub type AccountId = u64;

/// Papéis checados antes de mudanças privilegiadas de configuração.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Pode ajustar peso e slope de qualquer pool.
    CurveManager,
}

pub trait AccessControl: Send + Sync {
    fn is_authorized(&self, caller: AccountId, role: Role) -> bool;
}

/// Implementação de referência: um único dono detém todos os papéis.
pub struct OwnerAccess {
    owner: AccountId,
}

impl OwnerAccess {
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }
}

impl AccessControl for OwnerAccess {
    fn is_authorized(&self, caller: AccountId, _role: Role) -> bool {
        caller == self.owner
    }
}

/// Ledger de token fungível (token emitido e ativo de reserva).
/// Chamadas síncronas; qualquer retorno de erro aborta a operação do pool.
pub trait FungibleLedger: Send + Sync {
    fn balance_of(&self, holder: AccountId) -> Wad;
    fn total_supply(&self) -> Wad;
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Wad;
    fn approve(&self, owner: AccountId, spender: AccountId, amount: Wad) -> Result<()>;
    fn transfer(&self, from: AccountId, to: AccountId, amount: Wad) -> Result<()>;
    fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Wad,
    ) -> Result<()>;
    /// Privilegiado: emite `amount` para `to`.
    fn mint(&self, to: AccountId, amount: Wad) -> Result<()>;
    /// Privilegiado: queima `amount` de `from`.
    fn burn(&self, from: AccountId, amount: Wad) -> Result<()>;
}

#[derive(Default)]
struct LedgerBook {
    balances: BTreeMap<AccountId, Wad>,
    allowances: BTreeMap<(AccountId, AccountId), Wad>,
    supply: Wad,
}

impl LedgerBook {
    fn debit(&mut self, from: AccountId, amount: Wad) -> Result<()> {
        let held = self.balances.get(&from).copied().unwrap_or(0);
        if held < amount {
            return Err(engine_err!(
                EngineErrorCode::InsufficientBalance,
                holder => from,
                amount => amount,
                held => held
            ));
        }
        self.balances.insert(from, held - amount);
        Ok(())
    }

    fn credit(&mut self, to: AccountId, amount: Wad) -> Result<()> {
        let held = self.balances.get(&to).copied().unwrap_or(0);
        let new = held
            .checked_add(amount)
            .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "credit"))?;
        self.balances.insert(to, new);
        Ok(())
    }
}

/// Ledger em memória — referência para testes, demo e uso embutido.
#[derive(Default)]
pub struct InMemoryLedger {
    book: Mutex<LedgerBook>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conveniência de setup: cria o ledger já com saldos iniciais.
    pub fn with_balances(seed: &[(AccountId, Wad)]) -> Self {
        let ledger = Self::new();
        {
            let mut book = ledger.book.lock().expect("ledger lock");
            for (holder, amount) in seed {
                book.balances.insert(*holder, *amount);
                book.supply += amount;
            }
        }
        ledger
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, LedgerBook> {
        // Mutex envenenado significa pânico em outro thread segurando o lock;
        // o livro continua consistente porque cada mutação é atômica.
        self.book.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FungibleLedger for InMemoryLedger {
    fn balance_of(&self, holder: AccountId) -> Wad {
        self.locked().balances.get(&holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Wad {
        self.locked().supply
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> Wad {
        self.locked()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&self, owner: AccountId, spender: AccountId, amount: Wad) -> Result<()> {
        self.locked().allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn transfer(&self, from: AccountId, to: AccountId, amount: Wad) -> Result<()> {
        let mut book = self.locked();
        book.debit(from, amount)?;
        book.credit(to, amount)
    }

    fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Wad,
    ) -> Result<()> {
        let mut book = self.locked();
        let allowed = book.allowances.get(&(from, spender)).copied().unwrap_or(0);
        if allowed < amount {
            return Err(engine_err!(
                EngineErrorCode::InsufficientAllowance,
                owner => from,
                spender => spender,
                amount => amount,
                allowed => allowed
            ));
        }
        book.debit(from, amount)?;
        book.credit(to, amount)?;
        book.allowances.insert((from, spender), allowed - amount);
        Ok(())
    }

    fn mint(&self, to: AccountId, amount: Wad) -> Result<()> {
        let mut book = self.locked();
        book.supply = book
            .supply
            .checked_add(amount)
            .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "mint"))?;
        book.credit(to, amount)
    }

    fn burn(&self, from: AccountId, amount: Wad) -> Result<()> {
        let mut book = self.locked();
        book.debit(from, amount)?;
        book.supply -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_transfer_and_balances() {
        let ledger = InMemoryLedger::with_balances(&[(1, 100), (2, 50)]);
        ledger.transfer(1, 2, 30).unwrap();
        assert_eq!(ledger.balance_of(1), 70);
        assert_eq!(ledger.balance_of(2), 80);
        assert_eq!(ledger.total_supply(), 150);
    }

    #[test]
    fn t_transfer_insufficient_balance() {
        let ledger = InMemoryLedger::with_balances(&[(1, 10)]);
        let err = ledger.transfer(1, 2, 11).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InsufficientBalance);
        // nada mudou
        assert_eq!(ledger.balance_of(1), 10);
    }

    #[test]
    fn t_transfer_from_consumes_allowance() {
        let ledger = InMemoryLedger::with_balances(&[(1, 100)]);
        ledger.approve(1, 9, 40).unwrap();
        ledger.transfer_from(9, 1, 2, 25).unwrap();
        assert_eq!(ledger.allowance(1, 9), 15);
        let err = ledger.transfer_from(9, 1, 2, 20).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InsufficientAllowance);
    }

    #[test]
    fn t_mint_burn_track_supply() {
        let ledger = InMemoryLedger::new();
        ledger.mint(7, 1_000).unwrap();
        assert_eq!(ledger.total_supply(), 1_000);
        ledger.burn(7, 400).unwrap();
        assert_eq!(ledger.total_supply(), 600);
        assert_eq!(ledger.balance_of(7), 600);
    }

    #[test]
    fn t_owner_access() {
        let acl = OwnerAccess::new(42);
        assert!(acl.is_authorized(42, Role::CurveManager));
        assert!(!acl.is_authorized(43, Role::CurveManager));
    }
}
