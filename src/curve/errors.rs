//! Compat: reexporta o módulo de erros unificado.

pub use super::error::{EngineError, Result};
pub use super::error_catalog::{default_locale_message, EngineErrorCode};
