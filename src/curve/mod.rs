//! Núcleo puro de precificação: ponto fixo, famílias de curva, shares e
//! cotações. Nada aqui toca ledger ou estado mutável de pool.

pub mod types;
pub mod errors; // Shim de compat: reexports da API unificada
pub mod guardrails;
pub mod fixed;
pub mod power;
pub mod ratio;
pub mod pricing;
pub mod shares;
pub mod ref_golden;

// módulos unificados de erro
pub mod error_catalog;
pub mod error;

use errors::Result;
use types::{CurveKind, Ppm, Wad};

/// Despacho por família configurada na pool.
pub fn purchase_return(
    kind: CurveKind,
    supply: Wad,
    balance: Wad,
    weight_ppm: Ppm,
    amount: Wad,
) -> Result<Wad> {
    match kind {
        CurveKind::WeightedPower => power::purchase_return(supply, balance, weight_ppm, amount),
        CurveKind::WeightedRatio => ratio::purchase_return(supply, balance, weight_ppm, amount),
    }
}

pub fn sale_return(
    kind: CurveKind,
    supply: Wad,
    balance: Wad,
    weight_ppm: Ppm,
    amount: Wad,
) -> Result<Wad> {
    match kind {
        CurveKind::WeightedPower => power::sale_return(supply, balance, weight_ppm, amount),
        CurveKind::WeightedRatio => ratio::sale_return(supply, balance, weight_ppm, amount),
    }
}
