use std::fmt;

use derive_more::Display;
use itertools::Itertools;
use tracing::{error, info};

use crate::{
    analysis::{compute_stats, filter, SummaryStats},
    feed::FeedSource,
    model::StockRecord,
    utils::{format_millions, group_thousands},
};

const PLACEHOLDER: &str = "-";
const HEADERS: [&str; 6] = ["Code", "Name", "Last", "Chg", "Vol", "Freq"];

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq)]
pub enum Trend {
    #[display(fmt = "▲")]
    Up,
    #[display(fmt = "▼")]
    Down,
    #[display(fmt = "")]
    Flat,
}

impl Trend {
    pub fn of(change: Option<f64>) -> Self {
        match change {
            Some(v) if v > 0.0 => Trend::Up,
            Some(v) if v < 0.0 => Trend::Down,
            _ => Trend::Flat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    stocks: Vec<StockRecord>,
    loading: bool,
    search: String,
    stats: SummaryStats,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            stocks: Vec::new(),
            loading: true,
            search: String::new(),
            stats: SummaryStats::default(),
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, source: &dyn FeedSource) {
        match source.fetch() {
            Ok(feed) => {
                self.stats = compute_stats(&feed.data);
                self.stocks = feed.data;
                info!(records = self.stocks.len(), "market data loaded");
            }
            Err(err) => error!("failed to load data: {err:#}"),
        }
        self.loading = false;
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn stats(&self) -> &SummaryStats {
        &self.stats
    }

    pub fn visible(&self) -> Vec<&StockRecord> {
        filter(&self.stocks, &self.search)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn data_date(&self) -> String {
        self.stocks
            .first()
            .map(|s| s.date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_owned())
    }

    fn cards(&self) -> Vec<[String; 3]> {
        let stats = &self.stats;

        vec![
            [
                "Total Listed Stocks".to_owned(),
                stats.total_stocks.to_string(),
                "Active companies".to_owned(),
            ],
            [
                "Total Volume".to_owned(),
                format_millions(stats.total_volume),
                "Shares traded today".to_owned(),
            ],
            mover_card("Top Gainer", stats.top_gainer.as_ref()),
            mover_card("Top Loser", stats.top_loser.as_ref()),
        ]
    }
}

fn mover_card(title: &str, record: Option<&StockRecord>) -> [String; 3] {
    let code = record
        .map(|r| r.stock_code.as_str())
        .filter(|code| !code.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_owned();

    let subtext = match record {
        Some(r) => {
            let change = r.change.map(signed).unwrap_or_else(|| PLACEHOLDER.to_owned());
            let percent = r
                .change_percent()
                .map(|p| format!("{p:.2}%"))
                .unwrap_or_else(|| PLACEHOLDER.to_owned());
            let trend = Trend::of(r.change);
            format!("{change} ({percent}) {trend}").trim_end().to_owned()
        }
        None => PLACEHOLDER.to_owned(),
    };

    [title.to_owned(), code, subtext]
}

fn signed(change: f64) -> String {
    if change > 0.0 {
        format!("+{change}")
    } else {
        change.to_string()
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(group_thousands).unwrap_or_default()
}

fn table_row(record: &StockRecord) -> [String; 6] {
    [
        record.stock_code.clone(),
        record.stock_name.clone(),
        optional(record.close),
        record.change.map(signed).unwrap_or_default(),
        optional(record.volume),
        optional(record.frequency),
    ]
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IDX Dashboard")?;
        writeln!(f, "Indonesia Stock Exchange Market Overview")?;
        writeln!(f, "Data Date: {}", self.data_date())?;
        writeln!(f)?;

        let cards = self.cards();
        let title_width = cards.iter().map(|c| c[0].chars().count()).max().unwrap_or(0);
        let value_width = cards.iter().map(|c| c[1].chars().count()).max().unwrap_or(0);
        for [title, value, subtext] in &cards {
            writeln!(f, "{title:<title_width$}  {value:>value_width$}  {subtext}")?;
        }
        writeln!(f)?;

        if self.search.is_empty() {
            writeln!(f, "Market Data")?;
        } else {
            writeln!(f, "Market Data (search: {:?})", self.search)?;
        }

        if self.loading {
            return writeln!(f, "Loading market data...");
        }

        let rows = self.visible().into_iter().map(table_row).collect_vec();
        let widths = (0..HEADERS.len())
            .map(|ix| {
                rows.iter()
                    .map(|row| row[ix].chars().count())
                    .chain([HEADERS[ix].len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect_vec();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(ix, (cell, &width))| {
                    // code and name read left to right, figures align right
                    if ix < 2 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .join("  ")
                .trim_end()
                .to_owned()
        };

        writeln!(f, "{}", line(&HEADERS.map(str::to_owned)[..]))?;
        for row in &rows {
            writeln!(f, "{}", line(&row[..]))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Dashboard, Trend};
    use crate::{
        feed::FeedSource,
        model::{FeedEnvelope, StockRecord},
    };

    struct StaticFeed(Vec<StockRecord>);

    impl FeedSource for StaticFeed {
        fn fetch(&self) -> eyre::Result<FeedEnvelope> {
            Ok(FeedEnvelope::new(self.0.clone()))
        }
    }

    struct BrokenFeed;

    impl FeedSource for BrokenFeed {
        fn fetch(&self) -> eyre::Result<FeedEnvelope> {
            Err(eyre::eyre!("connection refused"))
        }
    }

    fn stock(code: &str, name: &str, close: Option<f64>, change: Option<f64>) -> StockRecord {
        StockRecord {
            stock_code: code.to_owned(),
            stock_name: name.to_owned(),
            date: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
            close,
            change,
            volume: Some(1_300_000.0),
            value: None,
            frequency: Some(3_210.0),
        }
    }

    fn market() -> Vec<StockRecord> {
        vec![
            stock("BBCA", "Bank Central Asia Tbk.", Some(9_875.0), Some(-25.0)),
            stock("TLKM", "Telkom Indonesia (Persero) Tbk.", Some(4_000.0), Some(40.0)),
            stock("GOTO", "GoTo Gojek Tokopedia Tbk.", Some(70.0), None),
        ]
    }

    #[test]
    fn unittest_loading_state_before_fetch() {
        let dashboard = Dashboard::new();
        assert!(dashboard.is_loading());
        assert!(dashboard.render().contains("Loading market data..."));
    }

    #[test]
    fn unittest_render_cards_and_table() {
        let mut dashboard = Dashboard::new();
        dashboard.load(&StaticFeed(market()));
        let out = dashboard.render();

        assert!(!dashboard.is_loading());
        assert!(out.contains("Data Date: 2026-01-15"));
        assert!(out.contains("3.9M"));
        assert!(out.contains("TLKM  +40 (1.00%) ▲"));
        assert!(out.contains("BBCA  -25 (-0.25%) ▼"));
        assert!(out.contains("9,875"));
        assert!(out.contains("1,300,000"));
        assert!(out.contains("GoTo Gojek Tokopedia Tbk."));
    }

    #[test]
    fn unittest_search_filters_table_not_stats() {
        let mut dashboard = Dashboard::new().with_search("bank");
        dashboard.load(&StaticFeed(market()));

        let visible = dashboard.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].stock_code, "BBCA");
        assert_eq!(dashboard.stats().total_stocks, 3);

        let out = dashboard.render();
        assert!(out.contains("Market Data (search: \"bank\")"));
        assert!(!out.contains("Telkom Indonesia"));
        assert!(out.contains("TLKM"));
    }

    #[test]
    fn unittest_empty_feed_renders_placeholders() {
        let mut dashboard = Dashboard::new();
        dashboard.load(&StaticFeed(Vec::new()));
        let out = dashboard.render();

        assert!(out.contains("Data Date: -"));
        assert!(out.contains("0.0M"));
        assert!(out.lines().any(|l| l.starts_with("Top Gainer") && l.ends_with('-')));
        assert!(out.lines().any(|l| l.starts_with("Top Loser") && l.ends_with('-')));
    }

    #[test]
    fn unittest_zero_close_does_not_divide() {
        let mut dashboard = Dashboard::new();
        dashboard.load(&StaticFeed(vec![stock("SUSP", "Suspended", Some(0.0), Some(5.0))]));

        assert!(dashboard.render().contains("SUSP  +5 (-) ▲"));
    }

    #[test]
    fn unittest_failed_fetch_leaves_empty_dashboard() {
        let mut dashboard = Dashboard::new();
        dashboard.load(&BrokenFeed);

        assert!(!dashboard.is_loading());
        assert!(dashboard.visible().is_empty());
        assert_eq!(dashboard.stats().total_stocks, 0);
        assert!(!dashboard.render().contains("Loading"));
    }

    #[test]
    fn unittest_trend() {
        assert_eq!(Trend::of(Some(1.0)), Trend::Up);
        assert_eq!(Trend::of(Some(-1.0)), Trend::Down);
        assert_eq!(Trend::of(None).to_string(), "");
    }
}
