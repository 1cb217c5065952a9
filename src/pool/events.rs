//! Eventos observáveis para auditoria/indexação. Não participam da
//! correção das operações — são anexados ao log do registry após o commit.

use crate::curve::types::{Ppm, Wad};

use super::ledger::AccountId;
use super::PoolId;

/// Lado do aporte unilateral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquiditySide {
    Reserve,
    Issued,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    PoolCreated {
        pool: PoolId,
        creator: AccountId,
    },
    TokenBought {
        pool: PoolId,
        buyer: AccountId,
        reserve_spent: Wad,
        issued_received: Wad,
    },
    TokenSold {
        pool: PoolId,
        seller: AccountId,
        issued_spent: Wad,
        reserve_received: Wad,
    },
    LiquidityAdded {
        pool: PoolId,
        provider: AccountId,
        amount_reserve: Wad,
        amount_issued: Wad,
        shares: Wad,
    },
    LiquidityRemoved {
        pool: PoolId,
        provider: AccountId,
        amount_reserve: Wad,
        amount_issued: Wad,
        shares: Wad,
    },
    SingleSidedLiquidityAdded {
        pool: PoolId,
        provider: AccountId,
        side: LiquiditySide,
        amount: Wad,
        matched: Wad,
        shares: Wad,
    },
    ReserveWeightUpdated {
        pool: PoolId,
        old_weight_ppm: Ppm,
        new_weight_ppm: Ppm,
    },
    SlopeUpdated {
        pool: PoolId,
        old_slope: u32,
        new_slope: u32,
    },
}
