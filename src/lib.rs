//! Motor determinístico de emissão de tokens via bonding curve.
//!
//! Aritmética de ponto fixo WAD (1e18) sobre `u128`, intermediários em
//! U256, divisão truncada em toda a crate. A camada `curve` é pura
//! (fórmulas e guardrails); a camada `pool` aplica as fórmulas sobre
//! ledgers colaboradores com atomicidade tudo-ou-nada.

pub mod curve;
pub mod pool;
pub mod telemetry;

pub use curve::types::U256;
