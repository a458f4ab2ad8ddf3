use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sui_arb_bot::arbitrage::{
    ArbitrageOrchestrator, MarketSnapshot, PoolRegistry, RiskLimits, Strategy, StrategyState,
    TradeIntent,
};
use sui_arb_bot::dex::{ConstantProductPool, PoolConnection, PoolId, PoolSpec, SwapDirection};
use sui_arb_bot::error::ArbError;
use sui_arb_bot::sui::{CoinRegistry, KeypairRef};
use sui_arb_bot::testing::{MockNetworkClient, MockPoolAdapter, MockSigner};

const EVAL_DELAY: Duration = Duration::from_millis(200);

/// Emits one A->B intent per subscribed pool on every evaluation.
struct AlwaysTrade {
    label: String,
    pools: Vec<PoolId>,
    amount: u64,
    state: StrategyState,
}

impl AlwaysTrade {
    fn boxed(label: &str, pools: Vec<PoolId>, amount: u64) -> Box<dyn Strategy> {
        Box::new(Self {
            label: label.to_string(),
            pools,
            amount,
            state: StrategyState::Idle,
        })
    }
}

impl Strategy for AlwaysTrade {
    fn name(&self) -> &str {
        &self.label
    }

    fn subscriptions(&self) -> &[PoolId] {
        &self.pools
    }

    fn validate(&self, _pools: &PoolRegistry, _coins: &CoinRegistry) -> Result<(), ArbError> {
        Ok(())
    }

    fn evaluate(&mut self, _snapshot: &MarketSnapshot<'_>) -> Vec<TradeIntent> {
        self.state = StrategyState::TradeEmitted;
        self.pools
            .iter()
            .map(|id| TradeIntent::new(*id, SwapDirection::AToB, self.amount, 100, &self.label).unwrap())
            .collect()
    }

    fn state(&self) -> StrategyState {
        self.state
    }
}

fn limits(max_gas_price: u64) -> RiskLimits {
    RiskLimits {
        max_gas_price,
        max_slippage_bps: 50,
        stale_after: None,
    }
}

fn orchestrator(network: Arc<MockNetworkClient>, max_gas_price: u64) -> ArbitrageOrchestrator {
    ArbitrageOrchestrator::new(limits(max_gas_price), network, Arc::new(CoinRegistry::new()))
}

fn chain_pool(network: Arc<MockNetworkClient>, address: &str) -> ConstantProductPool {
    network.set_pool_fields(
        address,
        json!({ "reserve_a": "1000000000000", "reserve_b": "4000000000000", "fee_bps": "25" }),
    );
    ConstantProductPool::new(PoolConnection::new(
        PoolSpec {
            venue: "ramm".into(),
            address: address.into(),
            coin_a: "0x2::sui::SUI".into(),
            coin_b: "0x5d4b::coin::COIN".into(),
            keypair: KeypairRef("ramm".into()),
            package: "0xbeef".into(),
            module: "interface2".into(),
        },
        network,
        Arc::new(MockSigner::default()),
        50_000_000,
    ))
}

#[tokio::test]
async fn gas_ceiling_blocks_submission() {
    let network = Arc::new(MockNetworkClient::new(2_000));
    let mut orch = orchestrator(network.clone(), 1_000);
    let pool = orch.add_pool(Arc::new(chain_pool(network.clone(), "0xpool")));
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 1_000_000)).unwrap();

    let report = orch.tick(EVAL_DELAY).await;
    assert_eq!(report.intents_emitted, 1);
    assert_eq!(report.dropped.len(), 1);
    assert!(matches!(
        report.dropped[0].reason,
        ArbError::GasPriceExceeded { current: 2_000, ceiling: 1_000 }
    ));
    assert!(report.join_executions().await.is_empty());
    assert_eq!(network.submit_count(), 0);
    assert!(!orch.is_pool_busy(pool), "lock released after the drop");

    network.set_gas_price(900);
    let outcomes = orch.tick(EVAL_DELAY).await.join_executions().await;
    assert_eq!(outcomes.len(), 1);
    let tx = outcomes[0].result.as_ref().unwrap();
    assert!(tx.min_output > 0);
    assert_eq!(network.submit_count(), 1);
}

#[tokio::test]
async fn gas_price_unavailable_drops_the_tick() {
    let network = Arc::new(MockNetworkClient::new(500));
    network.fail_gas_price(true);
    let mut orch = orchestrator(network.clone(), 1_000);
    let pool = orch.add_pool(Arc::new(chain_pool(network.clone(), "0xpool")));
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 1_000_000)).unwrap();

    let report = orch.tick(EVAL_DELAY).await;
    assert_eq!(report.dropped.len(), 1);
    assert!(matches!(report.dropped[0].reason, ArbError::NetworkError(_)));
    assert_eq!(network.submit_count(), 0);
}

#[tokio::test]
async fn same_pool_contention_runs_one_and_drops_one() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let adapter = Arc::new(MockPoolAdapter::new("mock", "A", "B", 2.0));
    adapter.set_execute_delay(Duration::from_millis(100));
    let pool = orch.add_pool(adapter.clone());
    orch.add_strategy(AlwaysTrade::boxed("first", vec![pool], 10)).unwrap();
    orch.add_strategy(AlwaysTrade::boxed("second", vec![pool], 20)).unwrap();

    let report = orch.tick(EVAL_DELAY).await;
    assert_eq!(report.intents_emitted, 2);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].intent.strategy(), "second");
    assert!(matches!(report.dropped[0].reason, ArbError::LockContention(_)));
    assert!(orch.is_pool_busy(pool));

    let outcomes = report.join_executions().await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].intent.input_amount(), 10);
    assert_eq!(adapter.execute_count(), 1);
    assert_eq!(adapter.max_concurrent_executions(), 1);
    assert!(!orch.is_pool_busy(pool));
}

#[tokio::test]
async fn in_flight_trade_blocks_next_tick_on_same_pool() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let adapter = Arc::new(MockPoolAdapter::new("mock", "A", "B", 2.0));
    adapter.set_execute_delay(Duration::from_millis(300));
    let pool = orch.add_pool(adapter.clone());
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 10)).unwrap();

    let first = orch.tick(EVAL_DELAY).await;
    let second = orch.tick(EVAL_DELAY).await;
    assert_eq!(first.executions.len(), 1);
    assert_eq!(second.executions.len(), 0);
    assert!(matches!(second.dropped[0].reason, ArbError::LockContention(_)));

    first.join_executions().await;
    assert_eq!(adapter.execute_count(), 1);
}

#[tokio::test]
async fn different_pools_execute_concurrently() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let a = Arc::new(MockPoolAdapter::new("a", "A", "B", 1.0));
    let b = Arc::new(MockPoolAdapter::new("b", "A", "B", 1.0));
    a.set_execute_delay(Duration::from_millis(100));
    b.set_execute_delay(Duration::from_millis(100));
    let pa = orch.add_pool(a.clone());
    let pb = orch.add_pool(b.clone());
    orch.add_strategy(AlwaysTrade::boxed("both", vec![pa, pb], 10)).unwrap();

    let report = orch.tick(EVAL_DELAY).await;
    assert!(report.dropped.is_empty());
    assert_eq!(report.executions.len(), 2);
    assert!(orch.is_pool_busy(pa) && orch.is_pool_busy(pb));
    let outcomes = report.join_executions().await;
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
}

#[tokio::test]
async fn slippage_guard_uses_tighter_of_intent_and_global_limit() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let adapter = Arc::new(MockPoolAdapter::new("mock", "A", "B", 1.0));
    let pool = orch.add_pool(adapter);
    // Intent allows 100 bps, global limit is 50 bps.
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 10_000)).unwrap();

    let outcomes = orch.tick(EVAL_DELAY).await.join_executions().await;
    assert_eq!(outcomes[0].min_output, 9_950);
}

#[tokio::test]
async fn failed_quote_keeps_prior_observation() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let adapter = Arc::new(MockPoolAdapter::new("mock", "A", "B", 1.5));
    let pool = orch.add_pool(adapter.clone());
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 10)).unwrap();

    let first = orch.tick(EVAL_DELAY).await;
    assert_eq!(first.polls.succeeded, 1);
    let before = orch.price_cache().latest(&pool).unwrap();
    first.join_executions().await;

    adapter.fail_quotes(true);
    let second = orch.tick(EVAL_DELAY).await;
    assert_eq!(second.polls.failed, 1);
    assert_eq!(second.strategies_skipped, 0);
    assert_eq!(second.intents_emitted, 1);
    assert_eq!(orch.price_cache().latest(&pool).unwrap(), before);
}

#[tokio::test]
async fn strategy_without_any_observation_is_skipped() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let good = Arc::new(MockPoolAdapter::new("good", "A", "B", 1.0));
    let broken = Arc::new(MockPoolAdapter::new("broken", "A", "B", 1.0));
    broken.fail_quotes(true);
    let pg = orch.add_pool(good);
    let pb = orch.add_pool(broken);
    orch.add_strategy(AlwaysTrade::boxed("needs-broken", vec![pg, pb], 10)).unwrap();
    orch.add_strategy(AlwaysTrade::boxed("needs-good", vec![pg], 10)).unwrap();

    let report = orch.tick(EVAL_DELAY).await;
    assert_eq!(report.strategies_skipped, 1);
    assert_eq!(report.intents_emitted, 1);
    assert!(orch.price_cache().latest(&pb).is_none());
    let states = orch.strategy_states();
    assert_eq!(states[0].1, StrategyState::Idle);
    assert_eq!(states[1].1, StrategyState::TradeEmitted);
}

#[tokio::test]
async fn slow_pool_is_abandoned_at_the_deadline() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let fast = Arc::new(MockPoolAdapter::new("fast", "A", "B", 1.0));
    let slow = Arc::new(MockPoolAdapter::new("slow", "A", "B", 1.0));
    slow.set_quote_delay(Duration::from_millis(500));
    let pf = orch.add_pool(fast);
    let ps = orch.add_pool(slow);

    let report = orch.tick(Duration::from_millis(50)).await;
    assert_eq!(report.polls.succeeded, 1);
    assert_eq!(report.polls.timed_out, 1);
    assert!(orch.price_cache().latest(&pf).is_some());
    assert!(orch.price_cache().latest(&ps).is_none());
}

#[tokio::test]
async fn loop_survives_errors_and_stops_on_shutdown() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let flaky = Arc::new(MockPoolAdapter::new("flaky", "A", "B", 1.0));
    flaky.fail_executions(Some("MoveAbort: slippage"));
    let broken = Arc::new(MockPoolAdapter::new("broken", "A", "B", 1.0));
    broken.fail_quotes(true);
    let pf = orch.add_pool(flaky.clone());
    let pb = orch.add_pool(broken);
    orch.add_strategy(AlwaysTrade::boxed("flaky", vec![pf], 10)).unwrap();
    orch.add_strategy(AlwaysTrade::boxed("broken", vec![pb], 10)).unwrap();
    let metrics = orch.metrics();

    orch.run_until(
        Duration::from_millis(20),
        Duration::from_millis(10),
        tokio::time::sleep(Duration::from_millis(200)),
    )
    .await;

    let snapshot = metrics.snapshot();
    assert!(snapshot.ticks >= 3, "only {} ticks", snapshot.ticks);
    assert!(snapshot.quotes_failed >= 3);
    assert!(flaky.execute_count() >= 1);
    assert_eq!(snapshot.executions_ok, 0);
}

#[tokio::test]
async fn duplicate_address_registers_two_pools() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network.clone(), 1_000);
    let first = orch.add_pool(Arc::new(chain_pool(network.clone(), "0xsame")));
    let second = orch.add_pool(Arc::new(chain_pool(network.clone(), "0xsame")));
    assert_ne!(first, second);

    let report = orch.tick(EVAL_DELAY).await;
    assert_eq!(report.polls.succeeded, 2);
    assert!(orch.price_cache().latest(&first).is_some());
    assert!(orch.price_cache().latest(&second).is_some());
}

#[tokio::test]
async fn spawned_loop_keeps_ticking_in_background() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network, 1_000);
    let adapter = Arc::new(MockPoolAdapter::new("mock", "A", "B", 1.0));
    orch.add_pool(adapter.clone());
    let metrics = orch.metrics();

    let handle = orch.spawn(Duration::from_millis(20), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.abort();

    assert!(metrics.snapshot().ticks >= 2);
    assert!(adapter.quote_count() >= 2);
}

#[tokio::test]
async fn strategy_names_must_be_unique() {
    let network = Arc::new(MockNetworkClient::new(500));
    let mut orch = orchestrator(network.clone(), 1_000);
    let pool = orch.add_pool(Arc::new(chain_pool(network, "0xpool")));
    orch.add_strategy(AlwaysTrade::boxed("always", vec![pool], 10)).unwrap();

    let err = orch
        .add_strategy(AlwaysTrade::boxed("always", vec![pool], 20))
        .unwrap_err();
    assert!(matches!(err, ArbError::ConfigError(_)));
    assert_eq!(orch.strategy_states().len(), 1);
}
