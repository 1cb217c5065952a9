//! Tipos básicos do motor de curva (escala fixa) + U256 para intermediários.

use uint::construct_uint;
construct_uint! {
    /// Inteiro de 256 bits para contas intermediárias seguras.
    pub struct U256(4);
}

pub type Wad = u128;   // escala 1e18
pub type SWad = i128;  // escala 1e18, com sinal (logaritmos)
pub type Ppm = u32;    // 0..=1_000_000

pub const WAD: Wad = 1_000_000_000_000_000_000u128; // 1e18
pub const PPM_SCALE: Ppm = 1_000_000;                // 1e6 (ppm)
pub const MAX_WEIGHT_PPM: Ppm = PPM_SCALE;           // peso 100% = caso linear

/// Família de precificação escolhida na criação da pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    /// Curva de potência ponderada (estilo Bancor): preço via `pow` fracionário.
    WeightedPower,
    /// Razão ponderada simples: aproximação linear, sem transcendentais.
    WeightedRatio,
}

/// Configuração de uma pool. Imutável após a criação, exceto peso e slope
/// (ajustáveis via registry por quem detém o papel de gestor da curva).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub curve: CurveKind,
    /// Peso da reserva em ppm, domínio (0, 1_000_000].
    pub reserve_weight_ppm: Ppm,
    /// Coeficiente linear usado no bootstrap (primeira compra): emitido = amount * slope.
    pub slope: u32,
}

impl PoolConfig {
    pub fn new(curve: CurveKind, reserve_weight_ppm: Ppm, slope: u32) -> Self {
        Self { curve, reserve_weight_ppm, slope }
    }
}
