//! Utilitários para UI/roteadores: spot price, preço de execução e slippage.

use super::errors::Result;
use super::guardrails::{div_trunc_u256_to_u128, ensure_nonzero, ensure_state, ensure_weight};
use super::types::{Ppm, Wad, PPM_SCALE, U256, WAD};

/// Cotação de compra montada pelo registry a partir das funções puras abaixo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyQuote {
    pub issued_out: Wad,
    /// Reserva por token emitido, em WAD.
    pub spot_price: Wad,
    pub execution_price: Wad,
    pub slippage_ppm: Ppm,
}

/// Preço à vista de 1 token emitido em unidades de reserva (Bancor):
/// **p = balance / (supply · peso)**, em WAD.
pub fn spot_price(supply: Wad, balance: Wad, weight_ppm: Ppm) -> Result<Wad> {
    ensure_weight(weight_ppm)?;
    ensure_state(supply, balance)?;
    let n = U256::from(balance) * U256::from(PPM_SCALE as u64) * U256::from(WAD);
    let d = U256::from(supply) * U256::from(weight_ppm as u64);
    div_trunc_u256_to_u128(n, d)
}

/// Preço efetivo de uma compra concreta: **reserva gasta / emitidos**, em WAD.
pub fn execution_price(reserve_in: Wad, issued_out: Wad) -> Result<Wad> {
    ensure_nonzero(reserve_in)?;
    ensure_nonzero(issued_out)?;
    div_trunc_u256_to_u128(
        U256::from(reserve_in) * U256::from(WAD),
        U256::from(issued_out),
    )
}

/// Slippage de compra em PPM: execução pior que o spot, sempre ≥ 0,
/// saturado em 1e6.
pub fn slippage_ppm(spot: Wad, exec: Wad) -> Ppm {
    if exec <= spot || spot == 0 {
        return 0;
    }
    let num = U256::from(exec - spot) * U256::from(PPM_SCALE as u64);
    let q = num / U256::from(spot);
    if q > U256::from(PPM_SCALE) {
        PPM_SCALE
    } else {
        q.as_u128() as Ppm
    }
}
