//! Conta de reserva: estado mutável de uma pool e as operações
//! transacionais que combinam a curva com as movimentações de ledger.
//!
//! Disciplina de atomicidade: validar → precificar → pré-checar o ledger →
//! efeitos externos → commit do estado. Qualquer erro antes do commit deixa
//! o estado exatamente como estava; nenhuma compensação é necessária porque
//! nada foi escrito.

use std::collections::BTreeMap;

use crate::curve;
use crate::curve::errors::{EngineErrorCode, Result};
use crate::curve::guardrails::{checked_add, checked_sub, ensure_nonzero};
use crate::curve::shares;
use crate::curve::types::{PoolConfig, Wad};
use crate::engine_err;

use super::events::LiquiditySide;
use super::ledger::{AccountId, FungibleLedger};

/// Estado mutável de uma pool (um por identificador).
///
/// A reserva de curva (`reserve_balance`) e o livro de LP
/// (`lp_reserve`/`lp_issued`) são contabilidades disjuntas: a curva nunca
/// precifica sobre fundos de LP e shares nunca resgatam reserva de curva.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReserveAccountState {
    /// Supply total do token emitido via curva.
    pub token_supply: Wad,
    /// Reserva de curva, lastro de `token_supply`.
    pub reserve_balance: Wad,
    /// Lado do ativo de reserva no livro de LP (variante de duas reservas).
    pub lp_reserve: Wad,
    /// Lado do token emitido no livro de LP.
    pub lp_issued: Wad,
    /// Supply total de shares de liquidez.
    pub share_supply: Wad,
    /// Saldos de shares por provedor.
    pub share_balances: BTreeMap<AccountId, Wad>,
}

/// Ledgers e tesouraria que uma operação enxerga.
pub struct LedgerCtx<'a> {
    pub reserve: &'a dyn FungibleLedger,
    pub issued: &'a dyn FungibleLedger,
    /// Conta da pool nos dois ledgers.
    pub treasury: AccountId,
}

impl LedgerCtx<'_> {
    fn ensure_funds(
        &self,
        ledger: &dyn FungibleLedger,
        owner: AccountId,
        amount: Wad,
    ) -> Result<()> {
        let allowed = ledger.allowance(owner, self.treasury);
        if allowed < amount {
            return Err(engine_err!(
                EngineErrorCode::InsufficientAllowance,
                owner => owner,
                amount => amount,
                allowed => allowed
            ));
        }
        let held = ledger.balance_of(owner);
        if held < amount {
            return Err(engine_err!(
                EngineErrorCode::InsufficientBalance,
                owner => owner,
                amount => amount,
                held => held
            ));
        }
        Ok(())
    }
}

/// Config + estado de uma pool; as operações vivem aqui, o registry só
/// cuida de identidade, locks e eventos.
#[derive(Clone, Debug)]
pub struct ReserveAccount {
    pub config: PoolConfig,
    pub state: ReserveAccountState,
}

impl ReserveAccount {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            state: ReserveAccountState::default(),
        }
    }

    /// Compra: deposita `amount_reserve` e recebe tokens emitidos (modelo
    /// mint-on-buy). Primeira compra de uma pool vazia faz o bootstrap
    /// linear `emitido = amount · slope`, sem passar pela fórmula.
    pub fn buy(&mut self, ctx: &LedgerCtx<'_>, buyer: AccountId, amount_reserve: Wad) -> Result<Wad> {
        ensure_nonzero(amount_reserve)?;
        ctx.ensure_funds(ctx.reserve, buyer, amount_reserve)?;

        let s = &self.state;
        let issued = if s.token_supply == 0 || s.reserve_balance == 0 {
            amount_reserve
                .checked_mul(self.config.slope as Wad)
                .ok_or_else(|| engine_err!(EngineErrorCode::Overflow, op => "bootstrap"))?
        } else {
            curve::purchase_return(
                self.config.curve,
                s.token_supply,
                s.reserve_balance,
                self.config.reserve_weight_ppm,
                amount_reserve,
            )?
        };
        if issued == 0 {
            return Err(engine_err!(
                EngineErrorCode::ZeroReturnAmount,
                amount => amount_reserve
            ));
        }
        let new_balance = checked_add(s.reserve_balance, amount_reserve)?;
        let new_supply = checked_add(s.token_supply, issued)?;

        ctx.reserve
            .transfer_from(ctx.treasury, buyer, ctx.treasury, amount_reserve)?;
        ctx.issued.mint(buyer, issued)?;

        self.state.reserve_balance = new_balance;
        self.state.token_supply = new_supply;
        Ok(issued)
    }

    /// Venda: queima `amount_issued` e devolve reserva pela curva.
    pub fn sell(&mut self, ctx: &LedgerCtx<'_>, seller: AccountId, amount_issued: Wad) -> Result<Wad> {
        ensure_nonzero(amount_issued)?;

        let s = &self.state;
        let reserve_out = curve::sale_return(
            self.config.curve,
            s.token_supply,
            s.reserve_balance,
            self.config.reserve_weight_ppm,
            amount_issued,
        )?;
        if reserve_out == 0 {
            return Err(engine_err!(
                EngineErrorCode::ZeroReturnAmount,
                amount => amount_issued
            ));
        }
        if reserve_out > s.reserve_balance {
            return Err(engine_err!(
                EngineErrorCode::InsufficientLiquidity,
                needed => reserve_out,
                available => s.reserve_balance
            ));
        }
        let held = ctx.issued.balance_of(seller);
        if held < amount_issued {
            return Err(engine_err!(
                EngineErrorCode::InsufficientBalance,
                owner => seller,
                amount => amount_issued,
                held => held
            ));
        }
        // a tesouraria precisa cobrir a saída antes de qualquer queima
        let treasury_held = ctx.reserve.balance_of(ctx.treasury);
        if treasury_held < reserve_out {
            return Err(engine_err!(
                EngineErrorCode::InsufficientLiquidity,
                needed => reserve_out,
                available => treasury_held
            ));
        }
        let new_supply = checked_sub(s.token_supply, amount_issued)?;
        let new_balance = checked_sub(s.reserve_balance, reserve_out)?;

        ctx.issued.burn(seller, amount_issued)?;
        ctx.reserve.transfer(ctx.treasury, seller, reserve_out)?;

        self.state.token_supply = new_supply;
        self.state.reserve_balance = new_balance;
        Ok(reserve_out)
    }

    /// Aporte proporcional nas duas reservas (variante LP).
    pub fn add_liquidity(
        &mut self,
        ctx: &LedgerCtx<'_>,
        provider: AccountId,
        amount_reserve: Wad,
        amount_issued: Wad,
    ) -> Result<Wad> {
        let s = &self.state;
        // bootstrap só com o livro de LP vazio; a reserva de curva não conta
        let minted = if s.lp_reserve == 0 && s.lp_issued == 0 {
            shares::initial_shares(amount_reserve, amount_issued)?
        } else {
            shares::add_shares(
                s.share_supply,
                amount_reserve,
                amount_issued,
                s.lp_reserve,
                s.lp_issued,
            )?
        };

        if amount_reserve > 0 {
            ctx.ensure_funds(ctx.reserve, provider, amount_reserve)?;
        }
        if amount_issued > 0 {
            ctx.ensure_funds(ctx.issued, provider, amount_issued)?;
        }
        let new_reserve = checked_add(s.lp_reserve, amount_reserve)?;
        let new_issued = checked_add(s.lp_issued, amount_issued)?;
        let new_shares = checked_add(s.share_supply, minted)?;

        if amount_reserve > 0 {
            ctx.reserve
                .transfer_from(ctx.treasury, provider, ctx.treasury, amount_reserve)?;
        }
        if amount_issued > 0 {
            ctx.issued
                .transfer_from(ctx.treasury, provider, ctx.treasury, amount_issued)?;
        }

        self.state.lp_reserve = new_reserve;
        self.state.lp_issued = new_issued;
        self.state.share_supply = new_shares;
        *self.state.share_balances.entry(provider).or_insert(0) += minted;
        Ok(minted)
    }

    /// Retirada proporcional: queima shares e devolve as duas reservas.
    pub fn remove_liquidity(
        &mut self,
        ctx: &LedgerCtx<'_>,
        provider: AccountId,
        shares_burned: Wad,
    ) -> Result<(Wad, Wad)> {
        ensure_nonzero(shares_burned)?;
        let held = self
            .state
            .share_balances
            .get(&provider)
            .copied()
            .unwrap_or(0);
        if shares_burned > held {
            return Err(engine_err!(
                EngineErrorCode::InsufficientShares,
                shares => shares_burned,
                held => held
            ));
        }
        let s = &self.state;
        let (out_reserve, out_issued) = shares::remove_shares(
            s.lp_reserve,
            s.lp_issued,
            shares_burned,
            s.share_supply,
        )?;
        let new_reserve = checked_sub(s.lp_reserve, out_reserve)?;
        let new_issued = checked_sub(s.lp_issued, out_issued)?;
        let new_shares = checked_sub(s.share_supply, shares_burned)?;

        if out_reserve > 0 {
            ctx.reserve.transfer(ctx.treasury, provider, out_reserve)?;
        }
        if out_issued > 0 {
            ctx.issued.transfer(ctx.treasury, provider, out_issued)?;
        }

        self.state.lp_reserve = new_reserve;
        self.state.lp_issued = new_issued;
        self.state.share_supply = new_shares;
        let remaining = held - shares_burned;
        if remaining == 0 {
            self.state.share_balances.remove(&provider);
        } else {
            self.state.share_balances.insert(provider, remaining);
        }
        Ok((out_reserve, out_issued))
    }

    /// Aporte unilateral com casamento virtual: só o ativo informado é
    /// transferido; o lado oposto entra apenas na conta de valor das shares.
    pub fn add_single_sided_liquidity(
        &mut self,
        ctx: &LedgerCtx<'_>,
        provider: AccountId,
        side: LiquiditySide,
        amount: Wad,
    ) -> Result<(Wad, Wad)> {
        let s = &self.state;
        let (reserve_in, reserve_other) = match side {
            LiquiditySide::Reserve => (s.lp_reserve, s.lp_issued),
            LiquiditySide::Issued => (s.lp_issued, s.lp_reserve),
        };
        let (minted, matched) =
            shares::single_sided_shares(amount, reserve_in, reserve_other, s.share_supply)?;

        let ledger = match side {
            LiquiditySide::Reserve => ctx.reserve,
            LiquiditySide::Issued => ctx.issued,
        };
        ctx.ensure_funds(ledger, provider, amount)?;
        let new_in = checked_add(reserve_in, amount)?;
        let new_shares = checked_add(s.share_supply, minted)?;

        ledger.transfer_from(ctx.treasury, provider, ctx.treasury, amount)?;

        match side {
            LiquiditySide::Reserve => self.state.lp_reserve = new_in,
            LiquiditySide::Issued => self.state.lp_issued = new_in,
        }
        self.state.share_supply = new_shares;
        *self.state.share_balances.entry(provider).or_insert(0) += minted;
        Ok((minted, matched))
    }
}
