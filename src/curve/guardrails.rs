//! Validações e helpers numéricos seguros para o motor de curva.
//! Política de arredondamento crate-wide: **truncar em direção a zero**,
//! sempre a favor da pool — ciclos buy+sell nunca criam valor.

use crate::engine_err;

use super::errors::{EngineError, EngineErrorCode, Result};
use super::types::{Ppm, Wad, MAX_WEIGHT_PPM, U256};

#[inline]
pub fn ensure_nonzero(amount: Wad) -> Result<()> {
    if amount == 0 {
        Err(engine_err!(EngineErrorCode::ZeroAmount, amount => amount))
    } else {
        Ok(())
    }
}

#[inline]
pub fn ensure_state(supply: Wad, balance: Wad) -> Result<()> {
    if supply == 0 || balance == 0 {
        return Err(engine_err!(EngineErrorCode::ZeroReserve, supply => supply, balance => balance));
    }
    Ok(())
}

#[inline]
pub fn ensure_weight(weight_ppm: Ppm) -> Result<()> {
    if weight_ppm == 0 || weight_ppm > MAX_WEIGHT_PPM {
        return Err(engine_err!(EngineErrorCode::InvalidWeight, weight_ppm => weight_ppm));
    }
    Ok(())
}

#[inline]
pub fn ensure_slope(slope: u32) -> Result<()> {
    if slope == 0 {
        return Err(engine_err!(EngineErrorCode::InvalidSlope, slope => slope));
    }
    Ok(())
}

#[inline]
pub fn checked_add(a: Wad, b: Wad) -> Result<Wad> {
    a.checked_add(b)
        .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "add"))
}

#[inline]
pub fn checked_sub(a: Wad, b: Wad) -> Result<Wad> {
    a.checked_sub(b)
        .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "sub"))
}

/// Multiplicação U256 com checagem de estouro.
#[inline]
pub fn mul_u256(a: U256, b: U256) -> Result<U256> {
    let (res, overflow) = a.overflowing_mul(b);
    if overflow {
        Err(engine_err!(EngineErrorCode::Overflow, op => "mul_u256"))
    } else {
        Ok(res)
    }
}

#[inline]
pub fn u256_to_u128_checked(v: U256) -> Result<Wad> {
    if v > U256::from(u128::MAX) {
        Err(engine_err!(EngineErrorCode::Overflow, op => "downcast_u128"))
    } else {
        Ok(v.as_u128())
    }
}

/// Divisão truncada (floor em não-negativos) em U256 → U256.
#[inline]
pub fn div_trunc_u256(n: U256, d: U256) -> Result<U256> {
    if d.is_zero() {
        return Err(EngineError::new(EngineErrorCode::DivisionByZero));
    }
    Ok(n / d)
}

/// Versão que retorna u128 (com checagem de overflow no downcast).
#[inline]
pub fn div_trunc_u256_to_u128(n: U256, d: U256) -> Result<Wad> {
    let q = div_trunc_u256(n, d)?;
    u256_to_u128_checked(q)
}

/// `a * b / d` truncado, com intermediário em 256 bits.
#[inline]
pub fn mul_div(a: Wad, b: Wad, d: Wad) -> Result<Wad> {
    let n = U256::from(a) * U256::from(b);
    div_trunc_u256_to_u128(n, U256::from(d))
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_ensure_nonzero() {
        assert!(ensure_nonzero(1).is_ok());
        assert_eq!(ensure_nonzero(0).unwrap_err().code, EngineErrorCode::ZeroAmount);
    }

    #[test]
    fn t_ensure_state() {
        assert!(ensure_state(1, 1).is_ok());
        assert_eq!(ensure_state(0, 1).unwrap_err().code, EngineErrorCode::ZeroReserve);
        assert_eq!(ensure_state(1, 0).unwrap_err().code, EngineErrorCode::ZeroReserve);
    }

    #[test]
    fn t_ensure_weight_domain() {
        assert!(ensure_weight(1).is_ok());
        assert!(ensure_weight(MAX_WEIGHT_PPM).is_ok());
        assert_eq!(ensure_weight(0).unwrap_err().code, EngineErrorCode::InvalidWeight);
        assert_eq!(
            ensure_weight(MAX_WEIGHT_PPM + 1).unwrap_err().code,
            EngineErrorCode::InvalidWeight
        );
    }

    #[test]
    fn t_checked_add_sub_over_under_flow() {
        assert_eq!(checked_add(1, 2).unwrap(), 3);
        assert_eq!(checked_add(u128::MAX, 1).unwrap_err().code, EngineErrorCode::Overflow);
        assert_eq!(checked_sub(5, 3).unwrap(), 2);
        assert_eq!(checked_sub(0, 1).unwrap_err().code, EngineErrorCode::Overflow);
    }

    #[test]
    fn t_div_trunc_is_floor() {
        // 7/2 = 3.5 → trunca para 3 (nunca arredonda para cima)
        let q = div_trunc_u256(U256::from(7u8), U256::from(2u8)).unwrap();
        assert_eq!(q, U256::from(3u8));
        let err = div_trunc_u256(U256::from(7u8), U256::zero()).unwrap_err();
        assert_eq!(err.code, EngineErrorCode::DivisionByZero);
    }

    #[test]
    fn t_mul_div_wide_intermediate() {
        // (u128::MAX * 2) / 2 não estoura o intermediário
        assert_eq!(mul_div(u128::MAX, 2, 2).unwrap(), u128::MAX);
        // downcast estoura quando o quociente não cabe em u128
        assert_eq!(mul_div(u128::MAX, 4, 2).unwrap_err().code, EngineErrorCode::Overflow);
    }
}
