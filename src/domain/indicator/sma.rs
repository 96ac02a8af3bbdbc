//! Simple moving average over close prices.
//!
//! Streaming implementation: one running sum, subtracting the bar that leaves
//! the window. Linear time regardless of window size.
//!
//! Warmup: the first `window - 1` bars are invalid. A window of 0, or a window
//! longer than the series, yields an all-invalid series rather than an error.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if window == 0 {
        for bar in bars {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(window),
            values,
        };
    }

    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= window {
            sum -= bars[i - window].close;
        }

        if i + 1 >= window {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: sum / window as f64,
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
        indicator_type: IndicatorType::Sma(window),
        values,
    }
}
