//! Aritmética de ponto fixo determinística em escala WAD (1e18).
//!
//! `ln` usa redução de faixa por potências de dois mais a série de artanh;
//! `exp` reduz por múltiplos de ln(2) e fecha com série de Taylor inteira;
//! `pow` compõe os dois: x^y = exp(y·ln x). Nenhuma operação toca ponto
//! flutuante nativo — todos os intermediários vivem em U256/i128, e o
//! resultado é idêntico em qualquer plataforma.
//!
//! As variantes `pow_down`/`pow_up` aplicam uma margem de erro relativa
//! unilateral (estilo Balancer) para que o chamador receba garantidamente
//! uma sub ou superestimativa do valor exato.

use crate::engine_err;

use super::errors::{EngineError, EngineErrorCode, Result};
use super::guardrails::{mul_u256, u256_to_u128_checked};
use super::types::{SWad, Wad, U256, WAD};

/// ln(2) em WAD, truncado.
pub const LN2_WAD: Wad = 693_147_180_559_945_309;

/// Limites do expoente natural (folga sobre o domínio útil do U256, estilo Balancer).
pub const MAX_NATURAL_EXPONENT: SWad = 130 * WAD as SWad;
pub const MIN_NATURAL_EXPONENT: SWad = -41 * (WAD as SWad);

/// Margem de erro relativa base de `pow` (1e-14 em WAD), por unidade de
/// expoente. O erro de ln/exp é amplificado linearmente pelo expoente, então
/// a margem efetiva escala com ele (expoente 1e6, peso de 1 ppm, dá 1e-8).
pub const POW_BASE_REL_ERROR: Wad = 10_000;

#[inline]
fn wad() -> U256 {
    U256::from(WAD)
}

/// `a * b / WAD` truncado.
pub fn mul_wad(a: U256, b: U256) -> Result<U256> {
    let n = mul_u256(a, b)?;
    Ok(n / wad())
}

/// `a * WAD / b` truncado; `DivisionByZero` quando `b == 0`.
pub fn div_wad(a: U256, b: U256) -> Result<U256> {
    if b.is_zero() {
        return Err(EngineError::new(EngineErrorCode::DivisionByZero));
    }
    let n = mul_u256(a, wad())?;
    Ok(n / b)
}

/// Logaritmo natural de `x` (WAD) → SWad. `DomainError` para `x == 0`.
pub fn ln_wad(x: U256) -> Result<SWad> {
    if x.is_zero() {
        return Err(engine_err!(EngineErrorCode::DomainError, op => "ln", arg => "0"));
    }
    let one = wad();
    let two = U256::from(2u8) * one;

    // normaliza y para [1, 2) contando potências de dois
    let mut y = x;
    let mut n: i64 = 0;
    while y >= two {
        y = y >> 1;
        n += 1;
    }
    while y < one {
        y = y << 1;
        n -= 1;
    }

    // ln(y) = 2·artanh(z), z = (y-1)/(y+1) ∈ [0, 1/3)
    let num = y - one;
    let den = y + one;
    let z = (num * one) / den;
    let z2 = (z * z) / one;

    let mut term = z;
    let mut acc = z;
    let mut k = 3u32;
    while k <= 99 {
        term = (term * z2) / one;
        if term.is_zero() {
            break;
        }
        acc += term / U256::from(k);
        k += 2;
    }

    let series = (acc << 1).as_u128() as SWad; // < 0.70e18, cabe folgado
    Ok((n as SWad) * (LN2_WAD as SWad) + series)
}

/// Exponencial natural de `x` (WAD com sinal) → WAD.
/// Acima de `MAX_NATURAL_EXPONENT` falha com `Overflow`; abaixo de
/// `MIN_NATURAL_EXPONENT` o resultado colapsa para zero (abaixo da precisão).
pub fn exp_wad(x: SWad) -> Result<U256> {
    if x > MAX_NATURAL_EXPONENT {
        return Err(engine_err!(EngineErrorCode::Overflow, op => "exp", arg => x));
    }
    if x < MIN_NATURAL_EXPONENT {
        return Ok(U256::zero());
    }
    if x < 0 {
        // e^(-a) = 1 / e^a, em WAD: WAD² / e^a
        let pos = exp_wad(-x)?;
        return Ok((wad() * wad()) / pos);
    }

    // reduz por ln(2): x = n·ln2 + r, r ∈ [0, ln2)
    let ln2 = U256::from(LN2_WAD);
    let xu = U256::from(x as u128);
    let n = (xu / ln2).as_u128() as usize;
    let r = xu - U256::from(n as u64) * ln2;

    // Taylor: e^r = Σ r^k / k!
    let one = wad();
    let mut term = one;
    let mut acc = one;
    for k in 1..=32u32 {
        term = (term * r) / (one * U256::from(k));
        if term.is_zero() {
            break;
        }
        acc += term;
    }

    Ok(acc << n)
}

/// `base^exponent` em WAD, via exp(exponent·ln base). Convenções:
/// 0^0 = 1, 0^y = 0 para y > 0. Expoente não-negativo.
pub fn pow_wad(base: U256, exponent: U256) -> Result<U256> {
    if exponent.is_zero() {
        return Ok(wad());
    }
    if base.is_zero() {
        return Ok(U256::zero());
    }
    let ln = ln_wad(base)?;
    let mag = mul_u256(exponent, U256::from(ln.unsigned_abs()))? / wad();

    if ln >= 0 {
        if mag > U256::from(MAX_NATURAL_EXPONENT as u128) {
            return Err(engine_err!(EngineErrorCode::Overflow, op => "pow"));
        }
        exp_wad(mag.as_u128() as SWad)
    } else {
        if mag > U256::from(MIN_NATURAL_EXPONENT.unsigned_abs()) {
            return Ok(U256::zero());
        }
        exp_wad(-(mag.as_u128() as SWad))
    }
}

#[inline]
fn pow_error_margin(raw: U256, exponent: U256) -> U256 {
    // mul_up(raw, base_rel · ceil-ish(expoente)) + 1: margem sempre não-nula
    let units = exponent / wad() + U256::from(1u8); // ≥ expoente em unidades
    let n = raw * U256::from(POW_BASE_REL_ERROR) * units;
    let ceil = (n + (wad() - U256::from(1u8))) / wad();
    ceil + U256::from(1u8)
}

/// `pow` com garantia de **subestimativa** do valor exato.
pub fn pow_down(base: U256, exponent: U256) -> Result<U256> {
    let raw = pow_wad(base, exponent)?;
    let margin = pow_error_margin(raw, exponent);
    if raw < margin {
        Ok(U256::zero())
    } else {
        Ok(raw - margin)
    }
}

/// `pow` com garantia de **superestimativa** do valor exato.
pub fn pow_up(base: U256, exponent: U256) -> Result<U256> {
    let raw = pow_wad(base, exponent)?;
    Ok(raw + pow_error_margin(raw, exponent))
}

/// Conversão final WAD → inteiro de unidades, truncando em direção a zero.
pub fn to_units_trunc(v: U256) -> Result<Wad> {
    u256_to_u128_checked(v / wad())
}
