//! Referência de alta precisão ("goldens") baseada em **BigUint/BigRational**
//! para a curva de potência ponderada.
//!
//! Objetivos:
//! 1. Calcular os retornos **contínuos/exatos** de compra e venda com o peso
//!    como fração reduzida p/q, usando raízes q-ésimas inteiras em escala
//!    1e36 — precisão ordens de grandeza acima da exigida do core.
//! 2. Servir de oráculo independente: os goldens validam o core inteiro a
//!    ≤ 1e-9 de erro relativo.
//!
//! Esta referência não entra no caminho de precificação. Serve aos testes,
//! à geração de goldens e ao diagnóstico de perda de arredondamento.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use crate::engine_err;

use super::errors::{EngineErrorCode, Result};
use super::types::{Ppm, Wad, PPM_SCALE};

/// Escala das raízes inteiras: 1e36.
fn root_scale() -> BigUint {
    BigUint::from(10u32).pow(36u32)
}

#[inline]
fn rat_from_u128(n: u128) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Peso ppm como fração reduzida (p, q) de p/q = weight/1e6.
pub fn reduced_weight(weight_ppm: Ppm) -> (u32, u32) {
    let g = weight_ppm.gcd(&PPM_SCALE);
    (weight_ppm / g, PPM_SCALE / g)
}

/// `base^(p/q)` para base racional positiva: eleva a p exatamente e tira a
/// raiz q-ésima inteira em escala 1e36 (floor na última casa da escala).
pub fn rational_pow(base: &BigRational, p: u32, q: u32) -> Result<BigRational> {
    if base.is_zero() || base < &BigRational::zero() {
        return Err(engine_err!(EngineErrorCode::DomainError, op => "rational_pow"));
    }
    if p == 0 {
        return Ok(BigRational::one());
    }
    let powed = base.pow(p as i32);
    if q == 1 {
        return Ok(powed);
    }
    let numer = powed
        .numer()
        .to_biguint()
        .ok_or_else(|| engine_err!(EngineErrorCode::DomainError, op => "rational_pow"))?;
    let denom = powed
        .denom()
        .to_biguint()
        .ok_or_else(|| engine_err!(EngineErrorCode::DomainError, op => "rational_pow"))?;

    let scale = root_scale();
    // floor( numer · scale^q / denom ), raiz q-ésima, depois / scale
    let scaled = numer * scale.clone().pow(q) / denom;
    let root = scaled.nth_root(q);
    Ok(BigRational::new(BigInt::from(root), BigInt::from(scale)))
}

/// Retorno de compra contínuo: `supply · ((1 + amount/balance)^(p/q) − 1)`.
pub fn continuous_purchase_return(
    supply: Wad,
    balance: Wad,
    weight_ppm: Ppm,
    amount: Wad,
) -> Result<BigRational> {
    if balance == 0 || supply == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReserve, supply => supply, balance => balance));
    }
    let (p, q) = reduced_weight(weight_ppm);
    let base = BigRational::one() + rat_from_u128(amount) / rat_from_u128(balance);
    let powed = rational_pow(&base, p, q)?;
    Ok(rat_from_u128(supply) * (powed - BigRational::one()))
}

/// Retorno de venda contínuo: `balance · (1 − (1 − amount/supply)^(q/p))`.
pub fn continuous_sale_return(
    supply: Wad,
    balance: Wad,
    weight_ppm: Ppm,
    amount: Wad,
) -> Result<BigRational> {
    if balance == 0 || supply == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReserve, supply => supply, balance => balance));
    }
    if amount > supply {
        return Err(engine_err!(EngineErrorCode::InsufficientLiquidity, amount => amount));
    }
    if amount == supply {
        return Ok(rat_from_u128(balance));
    }
    let (p, q) = reduced_weight(weight_ppm);
    let base = rat_from_u128(supply - amount) / rat_from_u128(supply);
    // expoente inverso: 1/(p/q) = q/p
    let retained = rational_pow(&base, q, p)?;
    Ok(rat_from_u128(balance) * (BigRational::one() - retained))
}

/// Erro relativo |exact − core| / exact.
pub fn rel_error(core: Wad, exact: &BigRational) -> BigRational {
    if exact.is_zero() {
        return rat_from_u128(core);
    }
    let core_rat = rat_from_u128(core);
    let diff = if &core_rat >= exact {
        core_rat - exact.clone()
    } else {
        exact.clone() - core_rat
    };
    diff / exact.clone()
}

/// Checagem de tolerância: erro relativo ≤ 1/denom.
pub fn within_rel_tolerance(core: Wad, exact: &BigRational, denom: u64) -> bool {
    rel_error(core, exact) <= BigRational::new(BigInt::one(), BigInt::from(denom))
}

/// Floor do racional para u128 (diagnóstico nos goldens).
pub fn floor_to_u128(r: &BigRational) -> Result<u128> {
    r.floor()
        .to_integer()
        .to_u128()
        .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "floor_to_u128"))
}
