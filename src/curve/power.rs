//! Família (a): curva de potência ponderada (estilo Bancor).
//!
//! Compra:  `supply · ((1 + amount/balance)^peso − 1)`
//! Venda:   `balance · (1 − (1 − amount/supply)^(1/peso))`
//!
//! Peso em ppm, 1e6 = caso linear (razão constante), resolvido sem
//! transcendentais. Direção de arredondamento por caminho:
//! - compra: base truncada + `pow_down` ⇒ retorno **subestimado**
//! - venda: base arredondada para cima + `pow_up` na fração retida ⇒
//!   retorno também **subestimado**
//! Nos dois casos o erro fica com a pool, nunca com o trader.

use crate::engine_err;

use super::errors::{EngineErrorCode, Result};
use super::fixed::{pow_down, pow_up};
use super::guardrails::{
    checked_add, checked_sub, div_trunc_u256, ensure_state, ensure_weight, mul_div, mul_u256,
    u256_to_u128_checked,
};
use super::types::{Ppm, Wad, MAX_WEIGHT_PPM, PPM_SCALE, U256, WAD};

#[inline]
fn ceil_div_u256(n: U256, d: U256) -> U256 {
    // (n + d - 1) / d, assumindo d > 0
    (n + (d - U256::from(1u8))) / d
}

/// Peso ppm → expoente em WAD (ppm · 1e12).
#[inline]
fn weight_to_wad(weight_ppm: Ppm) -> U256 {
    U256::from(weight_ppm as u64) * U256::from(WAD / PPM_SCALE as u128)
}

/// Expoente inverso 1/peso em WAD: (1e6/ppm) · 1e18 = 1e24/ppm, truncado.
#[inline]
fn inverse_weight_to_wad(weight_ppm: Ppm) -> U256 {
    (U256::from(WAD) * U256::from(PPM_SCALE as u64)) / U256::from(weight_ppm as u64)
}

/// Quantos tokens emitidos um depósito de `amount` da reserva compra.
/// Exige estado inicializado; o bootstrap (supply ou reserva zero) é
/// responsabilidade da camada de conta, que aplica o slope.
pub fn purchase_return(supply: Wad, balance: Wad, weight_ppm: Ppm, amount: Wad) -> Result<Wad> {
    ensure_weight(weight_ppm)?;
    if amount == 0 {
        return Ok(0);
    }
    ensure_state(supply, balance)?;

    if weight_ppm == MAX_WEIGHT_PPM {
        return mul_div(amount, supply, balance);
    }

    // base = (balance + amount) / balance em WAD, truncada (subestima)
    let b1 = checked_add(balance, amount)?;
    let base = div_trunc_u256(
        mul_u256(U256::from(b1), U256::from(WAD))?,
        U256::from(balance),
    )?;
    let powed = pow_down(base, weight_to_wad(weight_ppm))?;

    let one = U256::from(WAD);
    if powed <= one {
        // trade de poeira: ganho abaixo da precisão
        return Ok(0);
    }
    let gain = powed - one;
    let out = mul_u256(U256::from(supply), gain)? / one;
    u256_to_u128_checked(out)
}

/// Quanto da reserva a queima de `amount` tokens emitidos devolve.
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
        // saída total: devolve a reserva inteira, sem passar pela fórmula
        return Ok(balance);
    }
    if weight_ppm == MAX_WEIGHT_PPM {
        return mul_div(amount, balance, supply);
    }

    // fração retida = ((supply - amount)/supply)^(1/peso), superestimada
    // (base em ceil + pow_up) para que a saída fique subestimada
    let rem = checked_sub(supply, amount)?;
    let base = ceil_div_u256(
        mul_u256(U256::from(rem), U256::from(WAD))?,
        U256::from(supply),
    );
    let retained = pow_up(base, inverse_weight_to_wad(weight_ppm))?;

    let one = U256::from(WAD);
    if retained >= one {
        return Ok(0);
    }
    let released = one - retained;
    let out = mul_u256(U256::from(balance), released)? / one;
    u256_to_u128_checked(out)
}

// -------------------------
// TESTES (unidades em WAD)
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Ppm = 500_000;

    #[test]
    fn t_zero_amount_returns_zero() {
        assert_eq!(purchase_return(1_000 * WAD, 100 * WAD, HALF, 0).unwrap(), 0);
        assert_eq!(sale_return(1_000 * WAD, 100 * WAD, HALF, 0).unwrap(), 0);
    }

    #[test]
    fn t_uninitialized_state_rejected() {
        let err = purchase_return(0, 100 * WAD, HALF, WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::ZeroReserve);
        let err = sale_return(1_000 * WAD, 0, HALF, WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::ZeroReserve);
    }

    #[test]
    fn t_invalid_weight_rejected() {
        let err = purchase_return(1_000 * WAD, 100 * WAD, 0, WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InvalidWeight);
    }

    #[test]
    fn t_linear_weight_is_constant_ratio() {
        // peso 100%: amount * supply / balance, exato
        let out = purchase_return(1_000 * WAD, 100 * WAD, MAX_WEIGHT_PPM, 10 * WAD).unwrap();
        assert_eq!(out, 100 * WAD);
        let back = sale_return(1_000 * WAD, 100 * WAD, MAX_WEIGHT_PPM, 100 * WAD).unwrap();
        assert_eq!(back, 10 * WAD);
    }

    #[test]
    fn t_bootstrap_scenario_below_linear_bound() {
        // cenário de referência: 1000/100, peso 50%, depósito 10
        // esperado: 1000·(√1.1 − 1) ≈ 48.8088…, estritamente entre 0 e 100
        let out = purchase_return(1_000 * WAD, 100 * WAD, HALF, 10 * WAD).unwrap();
        assert!(out > 0);
        assert!(out < 100 * WAD, "peso < 100% tem retorno decrescente: {}", out);
        let expected = 48_808_848_170_151_546_991u128; // 1000·(√1.1 − 1) em WAD
        let diff = expected.abs_diff(out);
        // núcleo subestima de propósito; desvio relativo ≤ 1e-9
        assert!(out <= expected);
        assert!(diff <= expected / 1_000_000_000, "diff={}", diff);
    }

    #[test]
    fn t_full_exit_returns_entire_balance() {
        let out = sale_return(1_000 * WAD, 100 * WAD, HALF, 1_000 * WAD).unwrap();
        assert_eq!(out, 100 * WAD);
    }

    #[test]
    fn t_sale_above_supply_rejected() {
        let err = sale_return(1_000 * WAD, 100 * WAD, HALF, 1_001 * WAD).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::InsufficientLiquidity);
    }

    #[test]
    fn t_round_trip_never_profits() {
        let (s, b) = (1_000_000 * WAD, 250_000 * WAD);
        for amount in [WAD, 17 * WAD, 1_000 * WAD, 90_000 * WAD] {
            let minted = purchase_return(s, b, HALF, amount).unwrap();
            let back = sale_return(s + minted, b + amount, HALF, minted).unwrap();
            assert!(back <= amount, "ciclo lucrou: in={} out={}", amount, back);
        }
    }

    #[test]
    fn t_monotone_in_amount() {
        let (s, b) = (1_000_000 * WAD, 250_000 * WAD);
        let mut last = 0u128;
        for amount in [WAD, 10 * WAD, 100 * WAD, 1_000 * WAD, 10_000 * WAD] {
            let out = purchase_return(s, b, 300_000, amount).unwrap();
            assert!(out > last, "retorno deve crescer com o aporte");
            last = out;
        }
    }
}
