//! Demo de ponta a ponta: cria uma pool, executa compras e uma venda,
//! registrando latência e perda de arredondamento nos histogramas OTLP.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use num_traits::ToPrimitive;
use opentelemetry::KeyValue;

use curve_engine_core::curve::ref_golden;
use curve_engine_core::curve::types::{CurveKind, WAD};
use curve_engine_core::pool::{FungibleLedger, InMemoryLedger, OwnerAccess, PoolRegistry, PoolSpec};
use curve_engine_core::telemetry;

const ADMIN: u64 = 1;
const TRADER: u64 = 42;

#[tokio::main]
async fn main() -> Result<()> {
    let tel = telemetry::init("curve-engine-core")?;

    let reserve = Arc::new(InMemoryLedger::with_balances(&[(TRADER, 10_000 * WAD)]));
    let issued = Arc::new(InMemoryLedger::new());
    let registry = PoolRegistry::new(Arc::new(OwnerAccess::new(ADMIN)));

    let pool = registry.create_pool(
        ADMIN,
        PoolSpec {
            curve: CurveKind::WeightedPower,
            reserve_weight_ppm: 500_000,
            slope: 1,
            reserve_asset: reserve.clone(),
            issued_token: issued.clone(),
        },
    )?;

    let treasury = registry.get_pool(pool)?.treasury;
    reserve.approve(TRADER, treasury, 10_000 * WAD)?;

    // bootstrap + algumas compras
    for (i, amount) in [1_000u128, 100, 50, 10].into_iter().enumerate() {
        let span = telemetry::make_info_span("buy", i as u32, "trade_demo");
        let _guard = span.enter();

        let before = registry.get_pool(pool)?.state;
        let t0 = Instant::now();
        let issued_out = registry.buy(pool, TRADER, amount * WAD)?;
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

        tel.trade_latency_ms
            .record(elapsed_ms, &[KeyValue::new("op", "buy")]);
        if before.token_supply > 0 {
            // perda de arredondamento em relação à fórmula contínua
            let exact = ref_golden::continuous_purchase_return(
                before.token_supply,
                before.reserve_balance,
                500_000,
                amount * WAD,
            )?;
            let loss = ref_golden::rel_error(issued_out, &exact).to_f64().unwrap_or(0.0);
            tel.rounding_loss_rel
                .record(loss, &[KeyValue::new("op", "buy")]);
        }
        tracing::info!(pool, amount, issued_out, "compra executada");
    }

    // venda de metade da posição
    let position = issued.balance_of(TRADER);
    let span = telemetry::make_info_span("sell", 0, "trade_demo");
    let _guard = span.enter();
    let t0 = Instant::now();
    let reserve_out = registry.sell(pool, TRADER, position / 2)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
    tel.trade_latency_ms
        .record(elapsed_ms, &[KeyValue::new("op", "sell")]);
    tracing::info!(pool, reserve_out, "venda executada");

    for event in registry.take_events() {
        tracing::info!(?event, "evento");
    }

    tel.shutdown();
    Ok(())
}
