//! Renders analysis results and notices to the user-facing message text.

use crate::domain::analysis::{
    AnalysisResult, Insights, Notice, NoticeKind, Recommendation, RsiZone,
};
use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub struct AlertFormatter;

impl AlertFormatter {
    pub fn analysis(result: &AnalysisResult) -> String {
        let indicators = &result.latest.indicators;
        format!(
            "📊 Analysis of {}\n\
             💰 Current price: ${}\n\
             📈 {} ({:.2})\n\
             📉 Bollinger Bands: price {}\n\
             ⚖️ Trend: {} (MA {})\n\
             🧠 {}\n\
             🕒 Interval: {}\n\
             🗓 {}",
            result.symbol,
            format_price(result.price()),
            rsi_message(result.rsi_zone),
            indicators.rsi,
            result.bollinger_zone,
            result.trend,
            format_price(indicators.moving_average),
            recommendation_line(result),
            result.interval,
            format_timestamp(result.generated_at),
        )
    }

    pub fn notice(notice: &Notice) -> String {
        match &notice.kind {
            NoticeKind::InsufficientData => format!("⚠️ Insufficient data for {}", notice.symbol),
            NoticeKind::Failed(reason) => {
                format!("⚠️ Analysis failed for {}: {}", notice.symbol, reason)
            }
        }
    }

    pub fn insights(insights: &Insights) -> String {
        let result = &insights.analysis;
        let indicators = &result.latest.indicators;
        let volume_line = if insights.volume_spike {
            "🚨 High volume detected!"
        } else {
            "Volume within normal range."
        };

        format!(
            "📈 Insights for {}\n\n\
             💰 Current price: ${}\n\
             ⚖️ Current trend: {}\n\
             📊 Last change: {:.2}%\n\
             🔔 Volume: {:.4} (average {:.4})\n\
             {}\n\n\
             Bollinger Bands: price {} (upper {}, lower {})\n\
             RSI {:.2}: {}\n\n\
             🧠 {}\n\n\
             🕒 Interval analysed: {}\n\
             📅 {}",
            result.symbol,
            format_price(result.price()),
            result.trend,
            indicators.pct_change * 100.0,
            insights.volume,
            insights.volume_average,
            volume_line,
            result.bollinger_zone,
            format_price(indicators.bb_upper),
            format_price(indicators.bb_lower),
            indicators.rsi,
            result.rsi_zone,
            recommendation_line(result),
            result.interval,
            format_timestamp(result.generated_at),
        )
    }
}

fn rsi_message(zone: RsiZone) -> &'static str {
    match zone {
        RsiZone::Oversold => "🟢 RSI indicates oversold (possible buy)",
        RsiZone::Overbought => "🔴 RSI indicates overbought (possible sell)",
        RsiZone::Neutral => "⚪ RSI neutral",
    }
}

fn recommendation_line(result: &AnalysisResult) -> String {
    match result.recommendation {
        Recommendation::Unavailable => format!(
            "Recommendation: model unavailable (rule signal: {})",
            result.rule_signal
        ),
        committed => format!("Recommendation: {}", committed),
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{} UTC", at.format(TIMESTAMP_FORMAT))
}

/// Two decimals with thousands separators, e.g. `43,210.50`
pub fn format_price(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{
        BollingerZone, IndicatorPoint, IndicatorSet, Trend,
    };
    use crate::domain::market::{Candle, Interval, Symbol};
    use chrono::TimeZone;

    fn result(recommendation: Recommendation) -> AnalysisResult {
        AnalysisResult {
            symbol: Symbol::parse("BTC-USDT").unwrap(),
            interval: Interval::OneHour,
            latest: IndicatorPoint {
                candle: Candle {
                    timestamp: 0,
                    open: 43_000.0,
                    high: 43_500.0,
                    low: 42_900.0,
                    close: 43_210.5,
                    volume: 12.0,
                },
                indicators: IndicatorSet {
                    rsi: 55.123,
                    bb_upper: 44_000.0,
                    bb_middle: 43_000.0,
                    bb_lower: 42_000.0,
                    moving_average: 43_000.0,
                    pct_change: 0.0123,
                },
            },
            bollinger_zone: BollingerZone::Inside,
            rsi_zone: RsiZone::Neutral,
            trend: Trend::Up,
            rule_signal: Recommendation::Hold,
            recommendation,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.5), "0.50");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(43_210.5), "43,210.50");
        assert_eq!(format_price(1_234_567.0), "1,234,567.00");
        assert_eq!(format_price(-1_234.5), "-1,234.50");
    }

    #[test]
    fn test_analysis_message() {
        let text = AlertFormatter::analysis(&result(Recommendation::Hold));
        assert!(text.contains("Analysis of BTC-USDT"));
        assert!(text.contains("$43,210.50"));
        assert!(text.contains("RSI neutral (55.12)"));
        assert!(text.contains("inside the bands"));
        assert!(text.contains("Recommendation: HOLD"));
        assert!(text.contains("Interval: 1hour"));
        assert!(text.contains("05/03/2024 14:30:00"));
    }

    #[test]
    fn test_unavailable_rendered_distinctly() {
        let text = AlertFormatter::analysis(&result(Recommendation::Unavailable));
        assert!(text.contains("model unavailable"));
        assert!(text.contains("rule signal: HOLD"));
        assert!(!text.contains("Recommendation: HOLD"));
    }

    #[test]
    fn test_notice_messages() {
        let symbol = Symbol::parse("ETH-USDT").unwrap();
        let insufficient = Notice {
            symbol: symbol.clone(),
            kind: NoticeKind::InsufficientData,
        };
        assert_eq!(
            AlertFormatter::notice(&insufficient),
            "⚠️ Insufficient data for ETH-USDT"
        );

        let failed = Notice {
            symbol,
            kind: NoticeKind::Failed("chart dir not writable".to_string()),
        };
        assert!(AlertFormatter::notice(&failed).contains("chart dir not writable"));
    }

    #[test]
    fn test_insights_message() {
        let insights = Insights {
            analysis: result(Recommendation::Buy),
            volume: 30.0,
            volume_average: 10.0,
            volume_spike: true,
        };
        let text = AlertFormatter::insights(&insights);
        assert!(text.contains("Insights for BTC-USDT"));
        assert!(text.contains("Last change: 1.23%"));
        assert!(text.contains("High volume detected"));
        assert!(text.contains("Recommendation: BUY"));
    }
}
