//! Família (b): razão ponderada simples — aproximação da curva de potência
//! sem transcendentais. Mais barata, menos precisa em pesos extremos.
//!
//! Compra: `amount · supply · peso / (balance · 1e6)`
//! Venda:  `amount · balance · peso / (supply · 1e6)`

use crate::engine_err;

use super::errors::{EngineErrorCode, Result};
use super::guardrails::{div_trunc_u256_to_u128, ensure_state, ensure_weight, mul_u256};
use super::types::{Ppm, Wad, PPM_SCALE, U256};

#[inline]
fn weighted_ratio(amount: Wad, num: Wad, den: Wad, weight_ppm: Ppm) -> Result<Wad> {
    // amount · num · peso / (den · 1e6), truncado, intermediários em U256
    let n = mul_u256(
        mul_u256(U256::from(amount), U256::from(num))?,
        U256::from(weight_ppm as u64),
    )?;
    let d = U256::from(den) * U256::from(PPM_SCALE as u64);
    div_trunc_u256_to_u128(n, d)
}

pub fn purchase_return(supply: Wad, balance: Wad, weight_ppm: Ppm, amount: Wad) -> Result<Wad> {
    ensure_weight(weight_ppm)?;
    if amount == 0 {
        return Ok(0);
    }
    ensure_state(supply, balance)?;
    weighted_ratio(amount, supply, balance, weight_ppm)
}

pub fn sale_return(supply: Wad, balance: Wad, weight_ppm: Ppm, amount: Wad) -> Result<Wad> {
    ensure_weight(weight_ppm)?;
    if amount == 0 {
        return Ok(0);
    }
    ensure_state(supply, balance)?;
    if amount > supply {
        return Err(engine_err!(
            EngineErrorCode::InsufficientLiquidity,
            amount => amount,
            supply => supply
        ));
    }
    if amount == supply {
        return Ok(balance);
    }
    weighted_ratio(amount, balance, supply, weight_ppm)
}
