use crate::core::duration::estimate_duration_hours;
use crate::core::pricing::PriceTable;
use crate::domain::model::PricePoint;
use serde::Serialize;

pub const MIN_PANES: u32 = 10;
pub const MAX_PANES: u32 = 90;

pub const PROMPT_MESSAGE: &str = "Enter the number of panes to get a quote";
pub const BELOW_MINIMUM_MESSAGE: &str =
    "Below minimum: jobs under 10 panes aren't worth the trip";
pub const ABOVE_MAXIMUM_MESSAGE: &str =
    "Too large: jobs over 90 panes need an on-site estimate";

/// 報價規則的判定結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteOutcome {
    Prompt,
    BelowMinimum,
    AboveMaximum,
    /// 價目表中沒有這個窗格數
    Unpriced,
    Priced(PricePoint),
}

impl QuoteOutcome {
    /// 下游使用的建議報價：有價格時取 inside+outside，其餘一律為 0
    pub fn suggested_quote(&self) -> f64 {
        match self {
            QuoteOutcome::Priced(point) => point.inside_outside,
            _ => 0.0,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            QuoteOutcome::Prompt => Some(PROMPT_MESSAGE),
            QuoteOutcome::BelowMinimum => Some(BELOW_MINIMUM_MESSAGE),
            QuoteOutcome::AboveMaximum => Some(ABOVE_MAXIMUM_MESSAGE),
            QuoteOutcome::Unpriced | QuoteOutcome::Priced(_) => None,
        }
    }

    pub fn price_point(&self) -> Option<PricePoint> {
        match self {
            QuoteOutcome::Priced(point) => Some(*point),
            _ => None,
        }
    }
}

/// 依序套用門檻再查表
pub fn quote_for(table: &PriceTable, pane_count: u32) -> QuoteOutcome {
    if pane_count == 0 {
        QuoteOutcome::Prompt
    } else if pane_count < MIN_PANES {
        QuoteOutcome::BelowMinimum
    } else if pane_count > MAX_PANES {
        QuoteOutcome::AboveMaximum
    } else {
        table
            .lookup(pane_count)
            .map_or(QuoteOutcome::Unpriced, QuoteOutcome::Priced)
    }
}

/// 解析輸入框的窗格數。負數夾到 0；小數或非數字視為沒有輸入。
pub fn parse_pane_input(raw: &str) -> Option<u32> {
    let value: i64 = raw.trim().parse().ok()?;
    Some(value.clamp(0, i64::from(u32::MAX)) as u32)
}

/// 每次窗格數變動時推送給監聽者的內容
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteUpdate {
    pub pane_count: u32,
    pub inside_outside: Option<f64>,
    pub outside_only: Option<f64>,
    pub suggested_quote: f64,
    pub duration_hours: f64,
    pub message: Option<String>,
}

impl QuoteUpdate {
    pub fn new(pane_count: u32, outcome: &QuoteOutcome) -> Self {
        let point = outcome.price_point();
        let suggested_quote = outcome.suggested_quote();
        Self {
            pane_count,
            inside_outside: point.map(|p| p.inside_outside),
            outside_only: point.map(|p| p.outside_only),
            suggested_quote,
            duration_hours: estimate_duration_hours(suggested_quote),
            message: outcome.message().map(str::to_string),
        }
    }
}

type QuoteListener = Box<dyn FnMut(&QuoteUpdate) + Send>;

/// 報價計算器：保存目前的窗格數，變動時推送新的報價
pub struct QuoteCalculator {
    table: PriceTable,
    pane_count: Option<u32>,
    listener: Option<QuoteListener>,
}

impl QuoteCalculator {
    pub fn new(table: PriceTable) -> Self {
        Self {
            table,
            pane_count: None,
            listener: None,
        }
    }

    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&QuoteUpdate) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// 設定原始輸入；窗格數有變才會推送
    pub fn set_input(&mut self, raw: &str) -> QuoteUpdate {
        let pane_count = parse_pane_input(raw).unwrap_or(0);
        self.set_pane_count(pane_count)
    }

    pub fn set_pane_count(&mut self, pane_count: u32) -> QuoteUpdate {
        let update = QuoteUpdate::new(pane_count, &quote_for(&self.table, pane_count));

        if self.pane_count != Some(pane_count) {
            self.pane_count = Some(pane_count);
            tracing::debug!(
                "Pane count changed to {}, suggested quote {:.2}",
                pane_count,
                update.suggested_quote
            );
            if let Some(listener) = self.listener.as_mut() {
                listener(&update);
            }
        }

        update
    }

    pub fn current(&self) -> QuoteUpdate {
        let pane_count = self.pane_count.unwrap_or(0);
        QuoteUpdate::new(pane_count, &quote_for(&self.table, pane_count))
    }
}
