//! RSI (Relative Strength Index) over rolling simple means.
//!
//! Average gain/loss are plain rolling means over the last `period` per-bar
//! deltas, maintained as running sums. The first bar has no predecessor; its
//! missing delta counts as zero gain and zero loss, so the window is complete
//! at bar index `period - 1`.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100 (saturating, even when avg_gain is also 0).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if period == 0 {
        for bar in bars {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let (gain, loss) = if i == 0 {
            (0.0, 0.0)
        } else {
            let change = bar.close - bars[i - 1].close;
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        };
        gains.push(gain);
        losses.push(loss);
        gain_sum += gain;
        loss_sum += loss;

        if i >= period {
            gain_sum -= gains[i - period];
            loss_sum -= losses[i - period];
        }

        if i + 1 >= period {
            let avg_gain = gain_sum / period as f64;
            let avg_loss = loss_sum / period as f64;
            let rsi = if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
            };
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: rsi,
            });
        } else {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
