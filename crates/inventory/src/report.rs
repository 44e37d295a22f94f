//! Stock reports: titled, timestamped item listings (all / low / high stock).

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;

use crate::item::ItemView;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    All,
    Low,
    High,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::All => "All Items",
            ReportKind::Low => "Low Stock Items",
            ReportKind::High => "High Stock Items",
        }
    }

    pub fn includes(self, view: &ItemView) -> bool {
        match self {
            ReportKind::All => true,
            ReportKind::Low => view.is_low_stock,
            ReportKind::High => !view.is_low_stock,
        }
    }
}

impl FromStr for ReportKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ReportKind::All),
            "low" => Ok(ReportKind::Low),
            "high" => Ok(ReportKind::High),
            other => Err(DomainError::validation(format!(
                "unknown report kind '{other}' (expected one of: all, low, high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub item_count: usize,
    pub items: Vec<ItemView>,
}

impl StockReport {
    /// Build a report from item views, keeping only those `kind` selects.
    ///
    /// Items are ordered by id so the same store state always yields the same report.
    pub fn build(
        kind: ReportKind,
        views: impl IntoIterator<Item = ItemView>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut items: Vec<ItemView> = views.into_iter().filter(|v| kind.includes(v)).collect();
        items.sort_by_key(|v| v.item_id);

        Self {
            kind,
            title: kind.title().to_string(),
            generated_at,
            item_count: items.len(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemFields};
    use stockroom_core::ItemId;

    fn view(id: i32, quantity: i32, threshold: i32) -> ItemView {
        let item = Item::new(
            ItemId::new(id),
            ItemFields {
                name: format!("item-{id}"),
                description: None,
                quantity,
                category: None,
                minimum_stock_threshold: threshold,
            },
        )
        .unwrap();
        ItemView::from(item)
    }

    #[test]
    fn parses_report_kinds_case_insensitively() {
        assert_eq!("ALL".parse::<ReportKind>().unwrap(), ReportKind::All);
        assert_eq!("low".parse::<ReportKind>().unwrap(), ReportKind::Low);
        assert_eq!(" High ".parse::<ReportKind>().unwrap(), ReportKind::High);
        assert!(matches!(
            "medium".parse::<ReportKind>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn low_report_keeps_only_low_stock_items_sorted_by_id() {
        let now = Utc::now();
        let report = StockReport::build(
            ReportKind::Low,
            vec![view(3, 1, 5), view(1, 10, 5), view(2, 0, 1)],
            now,
        );

        assert_eq!(report.title, "Low Stock Items");
        assert_eq!(report.item_count, 2);
        let ids: Vec<i32> = report.items.iter().map(|v| v.item_id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(report.generated_at, now);
    }

    #[test]
    fn low_and_high_reports_partition_all() {
        let views = vec![view(1, 10, 5), view(2, 3, 5), view(3, 5, 5), view(4, 0, 0)];
        let now = Utc::now();

        let all = StockReport::build(ReportKind::All, views.clone(), now);
        let low = StockReport::build(ReportKind::Low, views.clone(), now);
        let high = StockReport::build(ReportKind::High, views, now);

        assert_eq!(all.item_count, low.item_count + high.item_count);
        assert!(low.items.iter().all(|v| !high.items.contains(v)));
    }
}
