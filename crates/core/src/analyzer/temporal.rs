//! Acceptance trends over time.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::QuoteRecord;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodStat {
    pub period: String,
    pub total_quotes: usize,
    pub accepted_quotes: usize,
    pub acceptance_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPatterns {
    pub best_month: Option<String>,
    pub worst_month: Option<String>,
    pub best_quarter: Option<String>,
    pub best_weekday: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    /// Per `YYYY-MM` month, chronological.
    pub monthly: Vec<PeriodStat>,
    /// Per `YYYY-Qn` quarter, chronological.
    pub quarterly: Vec<PeriodStat>,
    /// Monday through Sunday.
    pub weekday: Vec<PeriodStat>,
    pub seasonal: SeasonalPatterns,
}

pub fn temporal_analysis(quotes: &[QuoteRecord]) -> TemporalAnalysis {
    let monthly = period_stats(quotes, |quote| {
        format!("{:04}-{:02}", quote.quote_date.year(), quote.quote_date.month())
    });
    let quarterly = period_stats(quotes, |quote| {
        format!("{:04}-Q{}", quote.quote_date.year(), (quote.quote_date.month() - 1) / 3 + 1)
    });

    let mut weekday = period_stats(quotes, |quote| weekday_name(quote.quote_date.weekday()).to_string());
    weekday.sort_by_key(|stat| weekday_order(&stat.period));

    let seasonal = SeasonalPatterns {
        best_month: best_by_rate(&monthly),
        worst_month: worst_by_rate(&monthly),
        best_quarter: best_by_rate(&quarterly),
        best_weekday: best_by_rate(&weekday),
    };

    TemporalAnalysis { monthly, quarterly, weekday, seasonal }
}

fn period_stats<F>(quotes: &[QuoteRecord], key_of: F) -> Vec<PeriodStat>
where
    F: Fn(&QuoteRecord) -> String,
{
    let mut groups: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for quote in quotes {
        let entry = groups.entry(key_of(quote)).or_default();
        entry.0 += 1;
        if quote.accepted {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(period, (total_quotes, accepted_quotes))| PeriodStat {
            period,
            total_quotes,
            accepted_quotes,
            acceptance_rate: accepted_quotes as f64 / total_quotes as f64,
        })
        .collect()
}

fn best_by_rate(stats: &[PeriodStat]) -> Option<String> {
    stats
        .iter()
        .max_by(|a, b| a.acceptance_rate.total_cmp(&b.acceptance_rate))
        .map(|stat| stat.period.clone())
}

fn worst_by_rate(stats: &[PeriodStat]) -> Option<String> {
    stats
        .iter()
        .min_by(|a, b| a.acceptance_rate.total_cmp(&b.acceptance_rate))
        .map(|stat| stat.period.clone())
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn weekday_order(name: &str) -> usize {
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        .iter()
        .position(|day| *day == name)
        .unwrap_or(7)
}
