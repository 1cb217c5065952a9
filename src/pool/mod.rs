//! Camada de pools: ledgers colaboradores, conta de reserva por pool,
//! registry com identidade/locks/eventos.

pub mod account;
pub mod events;
pub mod ledger;
pub mod registry;

/// Identificador monotônico de pool, atribuído pelo registry.
pub type PoolId = u64;

pub use account::{LedgerCtx, ReserveAccount, ReserveAccountState};
pub use events::{LiquiditySide, PoolEvent};
pub use ledger::{AccessControl, AccountId, FungibleLedger, InMemoryLedger, OwnerAccess, Role};
pub use registry::{PoolInfo, PoolRegistry, PoolSpec};
