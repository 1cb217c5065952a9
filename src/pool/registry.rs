//! Registry de pools: identidade monotônica, serialização por pool,
//! rejeição de reentrância e log de eventos.
//!
//! Concorrência: um `Mutex` por pool serializa escritores entre threads;
//! um conjunto thread-local de pools "em voo" detecta reentrância na mesma
//! thread (callback de ledger que tenta reentrar no registry) e devolve
//! `PoolLocked` em vez de deadlock. Chamadores que precisam de mais de uma
//! pool devem adquiri-las em ordem crescente de id.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::curve::errors::{EngineErrorCode, Result};
use crate::curve::guardrails::{ensure_slope, ensure_weight};
use crate::curve::pricing::{self, BuyQuote};
use crate::curve::types::{CurveKind, PoolConfig, Ppm, Wad};
use crate::engine_err;
use crate::telemetry;

use super::account::{LedgerCtx, ReserveAccount, ReserveAccountState};
use super::events::{LiquiditySide, PoolEvent};
use super::ledger::{AccessControl, AccountId, FungibleLedger, Role};
use super::PoolId;

/// Contas de tesouraria vivem numa faixa reservada do espaço de ids.
const TREASURY_BASE: AccountId = 1 << 48;

thread_local! {
    /// Pools com operação em andamento NESTA thread (detector de reentrância).
    static IN_FLIGHT: RefCell<BTreeSet<PoolId>> = RefCell::new(BTreeSet::new());
}

/// Remove a pool do conjunto em voo mesmo em caso de erro/panic.
struct Unlock(PoolId);

impl Drop for Unlock {
    fn drop(&mut self) {
        IN_FLIGHT.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

/// Parâmetros de criação de uma pool.
#[derive(Clone)]
pub struct PoolSpec {
    pub curve: CurveKind,
    pub reserve_weight_ppm: Ppm,
    pub slope: u32,
    pub reserve_asset: Arc<dyn FungibleLedger>,
    pub issued_token: Arc<dyn FungibleLedger>,
}

struct PoolEntry {
    reserve_asset: Arc<dyn FungibleLedger>,
    issued_token: Arc<dyn FungibleLedger>,
    treasury: AccountId,
    creator: AccountId,
    account: Mutex<ReserveAccount>,
}

impl PoolEntry {
    fn ctx(&self) -> LedgerCtx<'_> {
        LedgerCtx {
            reserve: self.reserve_asset.as_ref(),
            issued: self.issued_token.as_ref(),
            treasury: self.treasury,
        }
    }
}

/// Snapshot de leitura de uma pool (config + estado, sem locks retidos).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolInfo {
    pub id: PoolId,
    pub creator: AccountId,
    pub treasury: AccountId,
    pub config: PoolConfig,
    pub state: ReserveAccountState,
}

pub struct PoolRegistry {
    access: Arc<dyn AccessControl>,
    pools: RwLock<BTreeMap<PoolId, Arc<PoolEntry>>>,
    by_creator: RwLock<BTreeMap<AccountId, Vec<PoolId>>>,
    next_id: AtomicU64,
    events: Mutex<Vec<PoolEvent>>,
}

impl PoolRegistry {
    pub fn new(access: Arc<dyn AccessControl>) -> Self {
        Self {
            access,
            pools: RwLock::new(BTreeMap::new()),
            by_creator: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            events: Mutex::new(Vec::new()),
        }
    }

    fn push_event(&self, event: PoolEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    /// Drena o log de eventos acumulado (ordem de commit).
    pub fn take_events(&self) -> Vec<PoolEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn entry(&self, pool: PoolId) -> Result<Arc<PoolEntry>> {
        self.pools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&pool)
            .cloned()
            .ok_or_else(|| engine_err!(EngineErrorCode::PoolNotFound, pool => pool))
    }

    /// Executa `f` com a conta da pool sob lock exclusivo, com medição de
    /// latência e proteção contra reentrância na mesma thread.
    fn with_pool<T>(
        &self,
        pool: PoolId,
        op: &'static str,
        f: impl FnOnce(&PoolEntry, &mut ReserveAccount) -> Result<T>,
    ) -> Result<T> {
        let entry = self.entry(pool)?;
        let already = IN_FLIGHT.with(|set| !set.borrow_mut().insert(pool));
        if already {
            return Err(engine_err!(EngineErrorCode::PoolLocked, pool => pool, op => op));
        }
        let _unlock = Unlock(pool);
        telemetry::time(op, || {
            let mut account = entry.account.lock().unwrap_or_else(|e| e.into_inner());
            f(&entry, &mut account)
        })
    }

    /// Cria uma pool vazia e devolve seu id.
    pub fn create_pool(&self, creator: AccountId, spec: PoolSpec) -> Result<PoolId> {
        ensure_weight(spec.reserve_weight_ppm)?;
        ensure_slope(spec.slope)?;
        if Arc::ptr_eq(&spec.reserve_asset, &spec.issued_token) {
            return Err(engine_err!(EngineErrorCode::InvalidToken, creator => creator));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(PoolEntry {
            reserve_asset: spec.reserve_asset,
            issued_token: spec.issued_token,
            treasury: TREASURY_BASE | id,
            creator,
            account: Mutex::new(ReserveAccount::new(PoolConfig::new(
                spec.curve,
                spec.reserve_weight_ppm,
                spec.slope,
            ))),
        });
        {
            // evento sob o lock de escrita: PoolCreated aparece na ordem dos ids
            let mut pools = self.pools.write().unwrap_or_else(|e| e.into_inner());
            pools.insert(id, entry);
            self.push_event(PoolEvent::PoolCreated { pool: id, creator });
        }
        self.by_creator
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(creator)
            .or_default()
            .push(id);
        tracing::info!(pool = id, creator, "pool criada");
        Ok(id)
    }

    // Eventos são anexados ainda sob o lock da pool: o log de auditoria
    // preserva a ordem de commit mesmo com escritores concorrentes.
    pub fn buy(&self, pool: PoolId, buyer: AccountId, amount_reserve: Wad) -> Result<Wad> {
        self.with_pool(pool, "buy", |entry, account| {
            let issued = account.buy(&entry.ctx(), buyer, amount_reserve)?;
            self.push_event(PoolEvent::TokenBought {
                pool,
                buyer,
                reserve_spent: amount_reserve,
                issued_received: issued,
            });
            Ok(issued)
        })
    }

    pub fn sell(&self, pool: PoolId, seller: AccountId, amount_issued: Wad) -> Result<Wad> {
        self.with_pool(pool, "sell", |entry, account| {
            let reserve = account.sell(&entry.ctx(), seller, amount_issued)?;
            self.push_event(PoolEvent::TokenSold {
                pool,
                seller,
                issued_spent: amount_issued,
                reserve_received: reserve,
            });
            Ok(reserve)
        })
    }

    pub fn add_liquidity(
        &self,
        pool: PoolId,
        provider: AccountId,
        amount_reserve: Wad,
        amount_issued: Wad,
    ) -> Result<Wad> {
        self.with_pool(pool, "add_liquidity", |entry, account| {
            let shares =
                account.add_liquidity(&entry.ctx(), provider, amount_reserve, amount_issued)?;
            self.push_event(PoolEvent::LiquidityAdded {
                pool,
                provider,
                amount_reserve,
                amount_issued,
                shares,
            });
            Ok(shares)
        })
    }

    pub fn remove_liquidity(
        &self,
        pool: PoolId,
        provider: AccountId,
        shares: Wad,
    ) -> Result<(Wad, Wad)> {
        self.with_pool(pool, "remove_liquidity", |entry, account| {
            let (out_reserve, out_issued) =
                account.remove_liquidity(&entry.ctx(), provider, shares)?;
            self.push_event(PoolEvent::LiquidityRemoved {
                pool,
                provider,
                amount_reserve: out_reserve,
                amount_issued: out_issued,
                shares,
            });
            Ok((out_reserve, out_issued))
        })
    }

    pub fn add_single_sided_liquidity(
        &self,
        pool: PoolId,
        provider: AccountId,
        side: LiquiditySide,
        amount: Wad,
    ) -> Result<Wad> {
        self.with_pool(pool, "add_single_sided", |entry, account| {
            let (shares, matched) =
                account.add_single_sided_liquidity(&entry.ctx(), provider, side, amount)?;
            self.push_event(PoolEvent::SingleSidedLiquidityAdded {
                pool,
                provider,
                side,
                amount,
                matched,
                shares,
            });
            Ok(shares)
        })
    }

    /// Cotação de compra sem efeitos: quanto sairia, preços e slippage.
    /// Pool vazia não tem spot definido (ZeroReserve).
    pub fn quote_buy(&self, pool: PoolId, amount_reserve: Wad) -> Result<BuyQuote> {
        self.with_pool(pool, "quote_buy", |_, account| {
            let s = &account.state;
            let weight = account.config.reserve_weight_ppm;
            let spot = pricing::spot_price(s.token_supply, s.reserve_balance, weight)?;
            let issued_out = crate::curve::purchase_return(
                account.config.curve,
                s.token_supply,
                s.reserve_balance,
                weight,
                amount_reserve,
            )?;
            if issued_out == 0 {
                return Err(engine_err!(EngineErrorCode::ZeroReturnAmount, amount => amount_reserve));
            }
            let exec = pricing::execution_price(amount_reserve, issued_out)?;
            Ok(BuyQuote {
                issued_out,
                spot_price: spot,
                execution_price: exec,
                slippage_ppm: pricing::slippage_ppm(spot, exec),
            })
        })
    }

    /// Snapshot de leitura; rejeita leitura reentrante (estado no meio de
    /// uma operação não é observável).
    pub fn get_pool(&self, pool: PoolId) -> Result<PoolInfo> {
        self.with_pool(pool, "get_pool", |entry, account| {
            Ok(PoolInfo {
                id: pool,
                creator: entry.creator,
                treasury: entry.treasury,
                config: account.config,
                state: account.state.clone(),
            })
        })
    }

    pub fn list_pools(&self) -> Vec<PoolId> {
        self.pools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect()
    }

    pub fn pools_created_by(&self, creator: AccountId) -> Vec<PoolId> {
        self.by_creator
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&creator)
            .cloned()
            .unwrap_or_default()
    }

    /// Ajusta o peso da reserva. Restrito ao papel de gestor da curva.
    pub fn set_reserve_weight(
        &self,
        caller: AccountId,
        pool: PoolId,
        new_weight_ppm: Ppm,
    ) -> Result<()> {
        if !self.access.is_authorized(caller, Role::CurveManager) {
            return Err(engine_err!(EngineErrorCode::NotAuthorized, caller => caller, pool => pool));
        }
        ensure_weight(new_weight_ppm)?;
        let old = self.with_pool(pool, "set_reserve_weight", |_, account| {
            let old = account.config.reserve_weight_ppm;
            account.config.reserve_weight_ppm = new_weight_ppm;
            self.push_event(PoolEvent::ReserveWeightUpdated {
                pool,
                old_weight_ppm: old,
                new_weight_ppm,
            });
            Ok(old)
        })?;
        tracing::info!(pool, old, new_weight_ppm, "peso da reserva ajustado");
        Ok(())
    }

    /// Ajusta o slope de bootstrap. Restrito ao papel de gestor da curva.
    pub fn set_slope(&self, caller: AccountId, pool: PoolId, new_slope: u32) -> Result<()> {
        if !self.access.is_authorized(caller, Role::CurveManager) {
            return Err(engine_err!(EngineErrorCode::NotAuthorized, caller => caller, pool => pool));
        }
        ensure_slope(new_slope)?;
        self.with_pool(pool, "set_slope", |_, account| {
            let old = account.config.slope;
            account.config.slope = new_slope;
            self.push_event(PoolEvent::SlopeUpdated {
                pool,
                old_slope: old,
                new_slope,
            });
            Ok(())
        })
    }
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::types::WAD;
    use crate::pool::ledger::{InMemoryLedger, OwnerAccess};

    const ADMIN: AccountId = 7;
    const ALICE: AccountId = 1;

    fn registry_with_pool() -> (Arc<PoolRegistry>, PoolId, Arc<InMemoryLedger>) {
        let reserve = Arc::new(InMemoryLedger::with_balances(&[(ALICE, 1_000_000 * WAD)]));
        let issued = Arc::new(InMemoryLedger::new());
        let registry = Arc::new(PoolRegistry::new(Arc::new(OwnerAccess::new(ADMIN))));
        let id = registry
            .create_pool(
                ALICE,
                PoolSpec {
                    curve: CurveKind::WeightedPower,
                    reserve_weight_ppm: 500_000,
                    slope: 1,
                    reserve_asset: reserve.clone(),
                    issued_token: issued.clone(),
                },
            )
            .unwrap();
        (registry, id, reserve)
    }

    #[test]
    fn t_create_pool_assigns_monotonic_ids() {
        let (registry, id1, reserve) = registry_with_pool();
        let issued2 = Arc::new(InMemoryLedger::new());
        let id2 = registry
            .create_pool(
                ALICE,
                PoolSpec {
                    curve: CurveKind::WeightedRatio,
                    reserve_weight_ppm: 250_000,
                    slope: 2,
                    reserve_asset: reserve,
                    issued_token: issued2,
                },
            )
            .unwrap();
        assert!(id2 > id1);
        assert_eq!(registry.list_pools(), vec![id1, id2]);
        assert_eq!(registry.pools_created_by(ALICE), vec![id1, id2]);
    }

    #[test]
    fn t_same_ledger_both_sides_rejected() {
        let (registry, _, reserve) = registry_with_pool();
        let err = registry
            .create_pool(
                ALICE,
                PoolSpec {
                    curve: CurveKind::WeightedPower,
                    reserve_weight_ppm: 500_000,
                    slope: 1,
                    reserve_asset: reserve.clone(),
                    issued_token: reserve,
                },
            )
            .unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InvalidToken);
    }

    #[test]
    fn t_unknown_pool() {
        let (registry, _, _) = registry_with_pool();
        let err = registry.buy(9_999, ALICE, WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::PoolNotFound);
    }

    #[test]
    fn t_buy_emits_event_and_quote_matches() {
        let (registry, id, reserve) = registry_with_pool();
        let treasury = registry.get_pool(id).unwrap().treasury;
        reserve.approve(ALICE, treasury, 1_000 * WAD).unwrap();

        registry.buy(id, ALICE, 100 * WAD).unwrap();
        let quote = registry.quote_buy(id, 10 * WAD).unwrap();
        let issued = registry.buy(id, ALICE, 10 * WAD).unwrap();
        assert_eq!(issued, quote.issued_out);
        assert!(quote.execution_price >= quote.spot_price);

        let events = registry.take_events();
        assert!(matches!(events[0], PoolEvent::PoolCreated { pool, .. } if pool == id));
        assert!(matches!(
            events[1],
            PoolEvent::TokenBought { reserve_spent, .. } if reserve_spent == 100 * WAD
        ));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn t_weight_update_requires_role() {
        let (registry, id, _) = registry_with_pool();
        let err = registry.set_reserve_weight(ALICE, id, 300_000).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::NotAuthorized);

        registry.set_reserve_weight(ADMIN, id, 300_000).unwrap();
        assert_eq!(registry.get_pool(id).unwrap().config.reserve_weight_ppm, 300_000);
        let events = registry.take_events();
        assert!(matches!(
            events.last(),
            Some(PoolEvent::ReserveWeightUpdated { new_weight_ppm: 300_000, .. })
        ));
    }

    #[test]
    fn t_slope_update() {
        let (registry, id, _) = registry_with_pool();
        registry.set_slope(ADMIN, id, 5).unwrap();
        assert_eq!(registry.get_pool(id).unwrap().config.slope, 5);
        let err = registry.set_slope(ADMIN, id, 0).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InvalidSlope);
    }

    #[test]
    fn t_failed_buy_emits_no_event() {
        let (registry, id, _) = registry_with_pool();
        registry.take_events();
        let err = registry.buy(id, ALICE, 100 * WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InsufficientAllowance);
        assert!(registry.take_events().is_empty());
    }
}
