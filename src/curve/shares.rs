//! Shares de liquidez (variante de pool com duas reservas): bootstrap 1:1,
//! mint proporcional, burn proporcional e aporte unilateral com casamento
//! virtual. Políticas: mint e amounts_out sempre em **floor**.

use crate::engine_err;

use super::errors::{EngineErrorCode, Result};
use super::guardrails::{checked_add, mul_div};
use super::types::Wad;

/// Mint inicial: shares = amount_a + amount_b (bootstrap 1:1).
/// A camada de conta só chama este caminho com o livro de LP vazio.
pub fn initial_shares(amount_a: Wad, amount_b: Wad) -> Result<Wad> {
    let total = checked_add(amount_a, amount_b)?;
    if total == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroAmount, amount => 0));
    }
    Ok(total)
}

/// Mint em pool existente, proporcional ao valor agregado:
/// `shares = total_shares · (a + b) / (reserve_a + reserve_b)`, floor.
pub fn add_shares(
    total_shares: Wad,
    amount_a: Wad,
    amount_b: Wad,
    reserve_a: Wad,
    reserve_b: Wad,
) -> Result<Wad> {
    let contributed = checked_add(amount_a, amount_b)?;
    if contributed == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroAmount, amount => 0));
    }
    let total_value = checked_add(reserve_a, reserve_b)?;
    if total_value == 0 || total_shares == 0 {
        return Err(engine_err!(
            EngineErrorCode::ZeroReserve,
            reserve_a => reserve_a,
            reserve_b => reserve_b
        ));
    }
    let minted = mul_div(total_shares, contributed, total_value)?;
    if minted == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReturnAmount, contributed => contributed));
    }
    Ok(minted)
}

/// Burn proporcional: `(a, b) = (reserve_x · shares / total)`, floor.
pub fn remove_shares(
    reserve_a: Wad,
    reserve_b: Wad,
    shares: Wad,
    total_shares: Wad,
) -> Result<(Wad, Wad)> {
    if shares == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroAmount, shares => shares));
    }
    if total_shares == 0 || shares > total_shares {
        return Err(engine_err!(
            EngineErrorCode::InsufficientShares,
            shares => shares,
            total_shares => total_shares
        ));
    }
    let out_a = mul_div(reserve_a, shares, total_shares)?;
    let out_b = mul_div(reserve_b, shares, total_shares)?;
    if out_a == 0 && out_b == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReturnAmount, shares => shares));
    }
    Ok((out_a, out_b))
}

/// Aporte unilateral: casa virtualmente `matched = amount · other / rin`
/// (o ativo oposto NÃO é transferido — entra só na conta de valor).
/// Retorna (shares mintados, matched). Exige reserva oposta suficiente
/// para o casamento; superfície de risco econômico documentada no DESIGN.
pub fn single_sided_shares(
    amount: Wad,
    reserve_in: Wad,
    reserve_other: Wad,
    total_shares: Wad,
) -> Result<(Wad, Wad)> {
    if amount == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroAmount, amount => amount));
    }
    if reserve_in == 0 || reserve_other == 0 || total_shares == 0 {
        return Err(engine_err!(
            EngineErrorCode::ZeroReserve,
            reserve_in => reserve_in,
            reserve_other => reserve_other
        ));
    }
    let matched = mul_div(amount, reserve_other, reserve_in)?;
    if matched > reserve_other {
        return Err(engine_err!(
            EngineErrorCode::InsufficientLiquidity,
            matched => matched,
            reserve_other => reserve_other
        ));
    }
    let combined = checked_add(amount, matched)?;
    let total_value = checked_add(reserve_in, reserve_other)?;
    let minted = mul_div(total_shares, combined, total_value)?;
    if minted == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReturnAmount, amount => amount));
    }
    Ok((minted, matched))
}
