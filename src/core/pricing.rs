use crate::domain::model::PricePoint;
use crate::utils::error::{BookingError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// 標準價目表，依窗格數排序。價格每 5 片一個級距。
pub const STANDARD_PRICES: &[(u32, PricePoint)] = &[
    (10, PricePoint::new(125.0, 85.0)),
    (11, PricePoint::new(125.0, 85.0)),
    (12, PricePoint::new(125.0, 85.0)),
    (13, PricePoint::new(125.0, 85.0)),
    (14, PricePoint::new(125.0, 85.0)),
    (15, PricePoint::new(150.0, 100.0)),
    (16, PricePoint::new(150.0, 100.0)),
    (17, PricePoint::new(150.0, 100.0)),
    (18, PricePoint::new(150.0, 100.0)),
    (19, PricePoint::new(150.0, 100.0)),
    (20, PricePoint::new(175.0, 115.0)),
    (21, PricePoint::new(175.0, 115.0)),
    (22, PricePoint::new(175.0, 115.0)),
    (23, PricePoint::new(175.0, 115.0)),
    (24, PricePoint::new(175.0, 115.0)),
    (25, PricePoint::new(200.0, 135.0)),
    (26, PricePoint::new(200.0, 135.0)),
    (27, PricePoint::new(200.0, 135.0)),
    (28, PricePoint::new(200.0, 135.0)),
    (29, PricePoint::new(200.0, 135.0)),
    (30, PricePoint::new(225.0, 150.0)),
    (31, PricePoint::new(225.0, 150.0)),
    (32, PricePoint::new(225.0, 150.0)),
    (33, PricePoint::new(225.0, 150.0)),
    (34, PricePoint::new(225.0, 150.0)),
    (35, PricePoint::new(250.0, 165.0)),
    (36, PricePoint::new(250.0, 165.0)),
    (37, PricePoint::new(250.0, 165.0)),
    (38, PricePoint::new(250.0, 165.0)),
    (39, PricePoint::new(250.0, 165.0)),
    (40, PricePoint::new(275.0, 185.0)),
    (41, PricePoint::new(275.0, 185.0)),
    (42, PricePoint::new(275.0, 185.0)),
    (43, PricePoint::new(275.0, 185.0)),
    (44, PricePoint::new(275.0, 185.0)),
    (45, PricePoint::new(300.0, 200.0)),
    (46, PricePoint::new(300.0, 200.0)),
    (47, PricePoint::new(300.0, 200.0)),
    (48, PricePoint::new(300.0, 200.0)),
    (49, PricePoint::new(300.0, 200.0)),
    (50, PricePoint::new(325.0, 215.0)),
    (51, PricePoint::new(325.0, 215.0)),
    (52, PricePoint::new(325.0, 215.0)),
    (53, PricePoint::new(325.0, 215.0)),
    (54, PricePoint::new(325.0, 215.0)),
    (55, PricePoint::new(350.0, 235.0)),
    (56, PricePoint::new(350.0, 235.0)),
    (57, PricePoint::new(350.0, 235.0)),
    (58, PricePoint::new(350.0, 235.0)),
    (59, PricePoint::new(350.0, 235.0)),
    (60, PricePoint::new(375.0, 250.0)),
    (61, PricePoint::new(375.0, 250.0)),
    (62, PricePoint::new(375.0, 250.0)),
    (63, PricePoint::new(375.0, 250.0)),
    (64, PricePoint::new(375.0, 250.0)),
    (65, PricePoint::new(400.0, 265.0)),
    (66, PricePoint::new(400.0, 265.0)),
    (67, PricePoint::new(400.0, 265.0)),
    (68, PricePoint::new(400.0, 265.0)),
    (69, PricePoint::new(400.0, 265.0)),
    (70, PricePoint::new(425.0, 285.0)),
    (71, PricePoint::new(425.0, 285.0)),
    (72, PricePoint::new(425.0, 285.0)),
    (73, PricePoint::new(425.0, 285.0)),
    (74, PricePoint::new(425.0, 285.0)),
    (75, PricePoint::new(450.0, 300.0)),
    (76, PricePoint::new(450.0, 300.0)),
    (77, PricePoint::new(450.0, 300.0)),
    (78, PricePoint::new(450.0, 300.0)),
    (79, PricePoint::new(450.0, 300.0)),
    (80, PricePoint::new(475.0, 315.0)),
    (81, PricePoint::new(475.0, 315.0)),
    (82, PricePoint::new(475.0, 315.0)),
    (83, PricePoint::new(475.0, 315.0)),
    (84, PricePoint::new(475.0, 315.0)),
    (85, PricePoint::new(500.0, 335.0)),
    (86, PricePoint::new(500.0, 335.0)),
    (87, PricePoint::new(500.0, 335.0)),
    (88, PricePoint::new(500.0, 335.0)),
    (89, PricePoint::new(500.0, 335.0)),
    (90, PricePoint::new(525.0, 350.0)),
];

/// 直接查標準價目表；沒有該窗格數時回傳 `None`
pub fn lookup_price(pane_count: u32) -> Option<PricePoint> {
    STANDARD_PRICES
        .binary_search_by_key(&pane_count, |(panes, _)| *panes)
        .ok()
        .map(|index| STANDARD_PRICES[index].1)
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    panes: u32,
    inside_outside: f64,
    outside_only: f64,
}

/// 啟動時載入一次的價目表，之後唯讀
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    entries: BTreeMap<u32, PricePoint>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PriceTable {
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_PRICES.iter().copied())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u32, PricePoint)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// 從 CSV 讀取 (`panes,inside_outside,outside_only`)
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut entries = BTreeMap::new();

        for row in csv_reader.deserialize::<PriceRow>() {
            let row = row?;
            if row.inside_outside < 0.0 || row.outside_only < 0.0 {
                return Err(BookingError::InvalidConfigValueError {
                    field: "pricing.table".to_string(),
                    value: row.panes.to_string(),
                    reason: "Prices cannot be negative".to_string(),
                });
            }
            let point = PricePoint::new(row.inside_outside, row.outside_only);
            if entries.insert(row.panes, point).is_some() {
                return Err(BookingError::InvalidConfigValueError {
                    field: "pricing.table".to_string(),
                    value: row.panes.to_string(),
                    reason: "Duplicate pane count".to_string(),
                });
            }
        }

        if entries.is_empty() {
            return Err(BookingError::ConfigError {
                message: "Price table is empty".to_string(),
            });
        }

        Ok(Self::from_entries(entries))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path)?;
        let table = Self::from_csv_reader(file)?;
        tracing::info!(
            "📋 Loaded {} price entries from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn lookup(&self, pane_count: u32) -> Option<PricePoint> {
        self.entries.get(&pane_count).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_sorted_and_covers_job_range() {
        assert!(STANDARD_PRICES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(STANDARD_PRICES.first().map(|(p, _)| *p), Some(10));
        assert_eq!(STANDARD_PRICES.last().map(|(p, _)| *p), Some(90));
    }

    #[test]
    fn test_lookup_price() {
        assert_eq!(lookup_price(45), Some(PricePoint::new(300.0, 200.0)));
        assert_eq!(lookup_price(10), Some(PricePoint::new(125.0, 85.0)));
        assert_eq!(lookup_price(9), None);
        assert_eq!(lookup_price(91), None);
    }

    #[test]
    fn test_inside_outside_is_never_cheaper() {
        for (_, point) in STANDARD_PRICES {
            assert!(point.inside_outside >= point.outside_only);
        }
    }

    #[test]
    fn test_standard_table_matches_const_lookup() {
        let table = PriceTable::standard();
        for panes in 0..120 {
            assert_eq!(table.lookup(panes), lookup_price(panes));
        }
    }

    #[test]
    fn test_csv_table() {
        let csv = "panes,inside_outside,outside_only\n10, 100, 70\n12,110,80\n";
        let table = PriceTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(12), Some(PricePoint::new(110.0, 80.0)));
        assert_eq!(table.lookup(11), None);
    }

    #[test]
    fn test_csv_table_rejects_duplicates_and_negative_prices() {
        let duplicate = "panes,inside_outside,outside_only\n10,100,70\n10,110,80\n";
        assert!(PriceTable::from_csv_reader(duplicate.as_bytes()).is_err());

        let negative = "panes,inside_outside,outside_only\n10,-1,70\n";
        assert!(PriceTable::from_csv_reader(negative.as_bytes()).is_err());

        let header_only = "panes,inside_outside,outside_only\n";
        assert!(PriceTable::from_csv_reader(header_only.as_bytes()).is_err());
    }
}
