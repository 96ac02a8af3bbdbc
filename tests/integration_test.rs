//! End-to-end backtest scenarios.
//!
//! Covers:
//! - Flat and trending reference series for every strategy variant
//! - Signal/record alignment with the input series
//! - Degenerate inputs (short history, no trades) producing complete results
//! - The cache adapter in front of a mock data port
//! - Property tests for the position and no-look-ahead invariants

mod common;

use approx::assert_relative_eq;
use common::*;
use niftytrader::adapters::cache_adapter::CachedDataAdapter;
use niftytrader::domain::backtest::StrategyRun;
use niftytrader::domain::signal::SignalAction;
use niftytrader::domain::strategy::StrategySpec;
use niftytrader::ports::data_port::DataPort;

mod flat_series {
    use super::*;

    #[test]
    fn sma_on_constant_prices_is_inert() {
        let bars = constant_series(300, 100.0);
        let mut run = StrategyRun::new(bars.clone(), StrategySpec::sma_cross(50, 200).unwrap());
        let result = run.backtest(100_000.0);

        assert_eq!(result.records.len(), 300);
        assert_relative_eq!(result.records.last().unwrap().price, 100.0);
        assert_eq!(result.metrics.total_trades, 0);
        assert_relative_eq!(result.metrics.total_return_pct, 0.0);
        assert_relative_eq!(result.metrics.win_rate_pct, 0.0);
        assert_relative_eq!(result.metrics.max_drawdown_pct, 0.0);
        assert_relative_eq!(result.metrics.sharpe_ratio, 0.0);
        assert_relative_eq!(result.metrics.final_value, 100_000.0);
    }

    #[test]
    fn rsi_on_constant_prices_is_inert() {
        let bars = constant_series(300, 100.0);
        let mut run = StrategyRun::new(bars, StrategySpec::rsi_reversal(14, 30.0, 70.0).unwrap());
        let result = run.backtest(100_000.0);

        assert_eq!(result.metrics.total_trades, 0);
        assert_relative_eq!(result.metrics.total_return_pct, 0.0);
    }

    #[test]
    fn combined_on_constant_prices_never_opens() {
        let bars = constant_series(300, 100.0);
        let mut run = StrategyRun::new(
            bars,
            StrategySpec::combined(50, 200, 14, 30.0, 70.0).unwrap(),
        );
        let result = run.backtest(100_000.0);

        assert!(result.records.iter().all(|r| r.position == 0));
        assert_relative_eq!(result.metrics.total_return_pct, 0.0);
        assert_relative_eq!(result.metrics.max_drawdown_pct, 0.0);
    }

    #[test]
    fn current_signal_on_flat_series_is_hold() {
        let bars = constant_series(300, 100.0);
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(50, 200).unwrap());
        assert_eq!(run.current_signal().unwrap().action, SignalAction::Hold);
    }
}

mod linear_ramp {
    use super::*;

    #[test]
    fn sma_golden_cross_fires_once_near_bar_20() {
        let bars = linear_series(300, 100.0, 400.0);
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(5, 20).unwrap());
        let result = run.backtest(100_000.0);

        let crosses: Vec<usize> = result
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.signal != 0)
            .map(|(i, _)| i)
            .collect();

        // Exactly one golden cross, at the first bar the long average exists.
        assert_eq!(crosses, vec![19]);
        assert_eq!(result.records[19].signal, 1);
        assert_eq!(result.metrics.total_trades, 1);
    }

    #[test]
    fn sma_ramp_is_profitable_with_no_drawdown() {
        let bars = linear_series(300, 100.0, 400.0);
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(5, 20).unwrap());
        let result = run.backtest(100_000.0);

        assert!(result.metrics.total_return_pct > 0.0);
        assert!(result.metrics.final_value > 100_000.0);
        assert_relative_eq!(result.metrics.max_drawdown_pct, 0.0);
        assert!(result.metrics.sharpe_ratio > 0.0);
        assert!(result.metrics.win_rate_pct > 0.0);
    }

    #[test]
    fn position_opens_only_after_the_cross() {
        let bars = linear_series(300, 100.0, 400.0);
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(5, 20).unwrap());
        let result = run.backtest(100_000.0);

        assert!(result.records[..19].iter().all(|r| r.position == 0));
        assert!(result.records[19..].iter().all(|r| r.position == 1));
        // The cross bar itself earns nothing: the position entered it flat.
        assert_relative_eq!(result.records[19].strategy_return, 0.0);
        assert!(result.records[20].strategy_return > 0.0);
    }
}

mod degenerate_inputs {
    use super::*;

    #[test]
    fn window_exceeding_history_yields_all_zero_signals() {
        let bars = linear_series(50, 100.0, 200.0);
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(50, 200).unwrap());
        let result = run.backtest(100_000.0);

        assert_eq!(result.records.len(), 50);
        assert!(result.records.iter().all(|r| r.signal == 0));
        assert_eq!(result.metrics.total_trades, 0);
        assert_relative_eq!(result.metrics.win_rate_pct, 0.0);
        assert_relative_eq!(result.metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn single_bar_series_produces_complete_result() {
        let bars = constant_series(1, 250.0);
        let mut run = StrategyRun::new(bars, StrategySpec::rsi_reversal(14, 30.0, 70.0).unwrap());
        let result = run.backtest(50_000.0);

        assert_eq!(result.records.len(), 1);
        assert_relative_eq!(result.metrics.final_value, 50_000.0);
        assert_relative_eq!(result.metrics.total_return_pct, 0.0);
        assert_eq!(run.current_signal().unwrap().action, SignalAction::Hold);
    }

    #[test]
    fn empty_series_produces_empty_result() {
        let mut run = StrategyRun::new(Vec::new(), StrategySpec::sma_cross(5, 20).unwrap());
        let result = run.backtest(100_000.0);

        assert!(result.records.is_empty());
        assert_eq!(result.metrics.total_trades, 0);
        assert!(run.current_signal().is_none());
    }
}

mod combined_rules {
    use super::*;

    #[test]
    fn overbought_sell_overrides_bullish_trend() {
        // A steep rally keeps the short average on top while RSI saturates
        // past overbought: the disjunction must produce sell states, never a
        // long position.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.05f64.powi(i)).collect();
        let bars = bars_from_closes(&closes);
        let mut run = StrategyRun::new(bars, StrategySpec::combined(3, 8, 5, 30.0, 70.0).unwrap());
        let result = run.backtest(100_000.0);

        assert!(result.records.iter().all(|r| r.position == 0));
        assert!(result.records.iter().any(|r| r.signal < 0));
        assert!(result.records.iter().all(|r| r.signal <= 0));
    }

    #[test]
    fn bearish_entry_and_oversold_rally_are_two_trade_events() {
        // A steady decline flips the state to sell early; the small rally at
        // the end lifts the short average over the long one while RSI is
        // still deeply oversold, swinging the state straight to buy. Each
        // state change is one trade event.
        let closes = vec![
            100.0, 95.0, 90.0, 85.0, 80.0, 75.0, 70.0, 65.0, 60.0, 55.0, 50.0, 45.0, 46.0, 47.0,
            48.0,
        ];
        let bars = bars_from_closes(&closes);
        let mut run =
            StrategyRun::new(bars, StrategySpec::combined(2, 3, 10, 30.0, 70.0).unwrap());
        let result = run.backtest(100_000.0);

        assert_eq!(result.metrics.total_trades, 2);
        assert_eq!(result.records.last().unwrap().position, 1);
        assert!(result.records.iter().all(|r| r.position == 0 || r.position == 1));
    }
}

mod data_pipeline {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mock_port_feeds_a_full_backtest() {
        let port = MockDataPort::new().with_bars("NIFTY50", linear_series(300, 100.0, 400.0));

        let bars = port.fetch_ohlcv("NIFTY50", "10y").unwrap();
        let mut run = StrategyRun::new(bars, StrategySpec::sma_cross(5, 20).unwrap());
        let result = run.backtest(100_000.0);

        assert_eq!(result.metrics.total_trades, 1);
        assert!(result.metrics.total_return_pct > 0.0);
    }

    #[test]
    fn cached_port_serves_identical_series() {
        let dir = TempDir::new().unwrap();
        let inner = MockDataPort::new().with_bars("TCS", linear_series(60, 100.0, 160.0));
        let cached = CachedDataAdapter::new(inner, dir.path().to_path_buf());

        let first = cached.fetch_ohlcv("TCS", "1y").unwrap();
        // Second fetch is served from the cache file.
        let second = cached.fetch_ohlcv("TCS", "1y").unwrap();

        assert_eq!(first, second);
        assert!(dir.path().join("TCS_NS_1y.csv").exists());
    }

    #[test]
    fn cached_backtests_match_direct_ones() {
        let dir = TempDir::new().unwrap();
        let series = linear_series(120, 100.0, 220.0);
        let inner = MockDataPort::new().with_bars("RELIANCE", series.clone());
        let cached = CachedDataAdapter::new(inner, dir.path().to_path_buf());

        let bars = cached.fetch_ohlcv("RELIANCE", "5y").unwrap();
        let spec = StrategySpec::sma_cross(5, 20).unwrap();

        let mut direct = StrategyRun::new(series, spec.clone());
        let mut via_cache = StrategyRun::new(bars, spec);

        let a = direct.backtest(100_000.0);
        let b = via_cache.backtest(100_000.0);

        assert_eq!(a.metrics.total_trades, b.metrics.total_trades);
        assert_relative_eq!(
            a.metrics.total_return_pct,
            b.metrics.total_return_pct,
            epsilon = 1e-9
        );
    }

    #[test]
    fn missing_ticker_is_no_data() {
        let port = MockDataPort::new();
        let err = port.fetch_ohlcv("ABSENT", "1y").unwrap_err();
        assert!(err.to_string().contains("no data"));
    }
}

mod invariants {
    use super::*;
    use niftytrader::domain::backtest::simulate;
    use niftytrader::domain::signal::{generate_signals, SignalPoint};
    use proptest::prelude::*;

    fn signal_stream() -> impl Strategy<Value = Vec<(f64, i32)>> {
        prop::collection::vec((1.0f64..1000.0, -1i32..=1), 1..60)
    }

    proptest! {
        #[test]
        fn position_stays_long_or_flat(stream in signal_stream()) {
            let points: Vec<SignalPoint> = stream
                .iter()
                .enumerate()
                .map(|(i, &(price, signal))| SignalPoint {
                    date: date(2020, 1, 1) + chrono::Duration::days(i as i64),
                    price,
                    signal,
                })
                .collect();
            let records = simulate(&points, 100_000.0);

            prop_assert_eq!(records.len(), points.len());
            for record in &records {
                prop_assert!(record.position == 0 || record.position == 1);
            }
        }

        #[test]
        fn returns_lag_the_position_by_one_bar(stream in signal_stream()) {
            let points: Vec<SignalPoint> = stream
                .iter()
                .enumerate()
                .map(|(i, &(price, signal))| SignalPoint {
                    date: date(2020, 1, 1) + chrono::Duration::days(i as i64),
                    price,
                    signal,
                })
                .collect();
            let records = simulate(&points, 100_000.0);

            for i in 1..records.len() {
                if records[i - 1].position == 0 {
                    // Flat entering the bar: nothing earned, whatever the
                    // market did and whatever signal fired at the bar.
                    prop_assert!(records[i].strategy_return == 0.0);
                }
            }
        }

        #[test]
        fn signal_stream_aligns_with_any_series(
            closes in prop::collection::vec(1.0f64..1000.0, 1..80),
            short in 1usize..10,
            spread in 1usize..10,
        ) {
            let bars = bars_from_closes(&closes);
            let spec = StrategySpec::sma_cross(short, short + spread).unwrap();
            let signals = generate_signals(&bars, &spec);

            prop_assert_eq!(signals.len(), bars.len());
            if let Some(last) = signals.last() {
                prop_assert_eq!(last.price, *closes.last().unwrap());
            }
        }
    }

    #[test]
    fn single_jump_with_simultaneous_signal_is_excluded() {
        // +100% jump at the same bar the buy fires: flat entering the bar,
        // the jump is not earned.
        let mut closes = vec![100.0; 10];
        closes.extend([200.0, 200.0, 200.0]);
        let points: Vec<SignalPoint> = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| SignalPoint {
                date: date(2020, 1, 1) + chrono::Duration::days(i as i64),
                price,
                signal: if i == 10 { 1 } else { 0 },
            })
            .collect();

        let records = simulate(&points, 100_000.0);
        assert_relative_eq!(records[10].market_return, 1.0);
        assert_relative_eq!(records[10].strategy_return, 0.0);
        assert_relative_eq!(records.last().unwrap().portfolio_value, 100_000.0);
    }
}
