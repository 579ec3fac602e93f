//! Host-side state: the loaded record sets, the selected market and the
//! table currently on display.
//!
//! The market view is rebuilt only when the selection or the snapshot
//! changes. A market that fails to build leaves the previous table in place
//! and records a market-scoped error; a failed load records a global error
//! that stays until the next successful load.

use crate::comparison::{TableModel, ViewOptions};
use crate::config::TableNames;
use crate::error::{FetchError, MarketError};
use crate::records::{Applicant, PresentationDetail, Product, ReferenceProductMaster, Snapshot};
use crate::source::{self, TableReader};

/// One record set arriving from the backend.
#[derive(Debug, Clone)]
pub enum TableData {
    Applicants(Vec<Applicant>),
    ReferenceProducts(Vec<ReferenceProductMaster>),
    Products(Vec<Product>),
    Presentations(Vec<PresentationDetail>),
}

#[derive(Debug, Default)]
struct PendingTables {
    applicants: Option<Vec<Applicant>>,
    reference_products: Option<Vec<ReferenceProductMaster>>,
    products: Option<Vec<Product>>,
    presentations: Option<Vec<PresentationDetail>>,
}

impl PendingTables {
    fn store(&mut self, data: TableData) {
        match data {
            TableData::Applicants(rows) => self.applicants = Some(rows),
            TableData::ReferenceProducts(rows) => self.reference_products = Some(rows),
            TableData::Products(rows) => self.products = Some(rows),
            TableData::Presentations(rows) => self.presentations = Some(rows),
        }
    }

    fn snapshot(&self) -> Option<Snapshot> {
        Some(Snapshot {
            applicants: self.applicants.clone()?,
            reference_products: self.reference_products.clone()?,
            products: self.products.clone()?,
            presentations: self.presentations.clone()?,
        })
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    options: ViewOptions,
    pending: PendingTables,
    snapshot: Option<Snapshot>,
    version: u64,
    tiles: Vec<String>,
    selected: Option<String>,
    table: Option<TableModel>,
    computed_for: Option<(String, u64)>,
    market_error: Option<MarketError>,
    load_error: Option<FetchError>,
}

impl Dashboard {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Fetch all four tables. On failure the error is kept for display and
    /// any previously loaded snapshot stays in use; call again to retry.
    pub fn load(&mut self, reader: &dyn TableReader, tables: &TableNames) -> Result<(), FetchError> {
        match source::load_snapshot(reader, tables) {
            Ok(snapshot) => {
                self.set_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "loading record sets failed");
                self.load_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Record a failed fetch reported by a caller feeding [`Dashboard::receive`].
    pub fn fail_load(&mut self, error: FetchError) {
        self.load_error = Some(error);
    }

    /// Replace all four record sets at once.
    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot {
            applicants,
            reference_products,
            products,
            presentations,
        } = snapshot;
        self.pending = PendingTables {
            applicants: Some(applicants),
            reference_products: Some(reference_products),
            products: Some(products),
            presentations: Some(presentations),
        };
        self.publish();
    }

    /// Accept one record set. Nothing is built until all four have arrived.
    pub fn receive(&mut self, data: TableData) {
        self.pending.store(data);
        self.publish();
    }

    fn publish(&mut self) {
        let Some(snapshot) = self.pending.snapshot() else {
            return;
        };
        self.version += 1;
        self.tiles = snapshot.market_tiles();
        self.snapshot = Some(snapshot);
        self.load_error = None;
        tracing::info!(version = self.version, markets = self.tiles.len(), "record sets ready");
        self.refresh();
    }

    /// Select a market. Clears the error of the previously selected market.
    pub fn select_market(&mut self, market: &str) {
        if self.selected.as_deref() == Some(market) {
            return;
        }
        self.selected = Some(market.to_string());
        self.market_error = None;
        self.refresh();
    }

    fn refresh(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if self.selected.is_none() {
            self.selected = self.tiles.first().cloned();
        }
        let Some(market) = self.selected.clone() else {
            return;
        };

        let key = (market, self.version);
        if self.computed_for.as_ref() == Some(&key) {
            return;
        }
        match snapshot.market_view(&key.0, &self.options) {
            Ok(table) => {
                self.table = Some(table);
                self.market_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "market view unavailable");
                self.market_error = Some(e);
            }
        }
        self.computed_for = Some(key);
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn tiles(&self) -> &[String] {
        &self.tiles
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Last successfully built table; may belong to an earlier selection
    /// when the current one failed.
    pub fn table(&self) -> Option<&TableModel> {
        self.table.as_ref()
    }

    pub fn market_error(&self) -> Option<&MarketError> {
        self.market_error.as_ref()
    }

    pub fn load_error(&self) -> Option<&FetchError> {
        self.load_error.as_ref()
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::CellStatus;
    use serde_json::Value;
    use std::cell::Cell;

    fn product(id: i64, name: &str, bla: &str, ref_id: Option<i64>) -> Product {
        Product {
            product_id: id,
            proprietary_name: name.to_string(),
            applicant_id: None,
            ref_product_id: ref_id,
            bla_type: Some(bla.to_string()),
        }
    }

    fn master(id: i64, name: &str) -> ReferenceProductMaster {
        ReferenceProductMaster {
            ref_product_id: id,
            proprietary_name: name.to_string(),
        }
    }

    fn detail(product_id: i64) -> PresentationDetail {
        PresentationDetail {
            product_id,
            strength: Some("40mg".to_string()),
            presentation_form: Some("pen".to_string()),
            marketing_status: None,
            name: None,
        }
    }

    /// Herceptin (complete), Humira (complete), Stelara (no 351(a) product).
    fn snapshot() -> Snapshot {
        Snapshot {
            applicants: vec![],
            reference_products: vec![master(1, "Humira"), master(2, "Herceptin"), master(3, "Stelara")],
            products: vec![
                product(1, "Humira", "351(a)", None),
                product(2, "Hyrimoz", "351(k) Biosimilar", Some(1)),
                product(3, "Herceptin", "351(a)", None),
                product(4, "Ogivri", "351(k) Biosimilar", Some(2)),
                product(5, "Wezlana", "351(k) Interchangeable", Some(3)),
            ],
            presentations: vec![detail(1), detail(2), detail(3), detail(4), detail(5)],
        }
    }

    #[test]
    fn waits_for_all_tables() {
        let data = snapshot();
        let mut dashboard = Dashboard::default();
        dashboard.receive(TableData::Presentations(data.presentations));
        dashboard.receive(TableData::Products(data.products));
        dashboard.receive(TableData::Applicants(data.applicants));
        assert!(!dashboard.is_ready());
        assert!(dashboard.table().is_none());

        dashboard.receive(TableData::ReferenceProducts(data.reference_products));
        assert!(dashboard.is_ready());
        assert_eq!(dashboard.tiles(), ["Herceptin", "Humira", "Stelara"]);
        assert_eq!(dashboard.selected(), Some("Herceptin"));
        assert_eq!(dashboard.table().unwrap().market, "Herceptin");
    }

    #[test]
    fn failed_market_keeps_previous_table() {
        let mut dashboard = Dashboard::default();
        dashboard.set_snapshot(snapshot());
        dashboard.select_market("Humira");
        assert_eq!(dashboard.table().unwrap().market, "Humira");

        dashboard.select_market("Stelara");
        assert!(matches!(dashboard.market_error(), Some(MarketError::NotFound { .. })));
        assert_eq!(dashboard.table().unwrap().market, "Humira");

        dashboard.select_market("Herceptin");
        assert!(dashboard.market_error().is_none());
        assert_eq!(dashboard.table().unwrap().market, "Herceptin");
    }

    #[test]
    fn reselecting_the_same_market_keeps_its_error() {
        let mut dashboard = Dashboard::default();
        dashboard.set_snapshot(snapshot());
        dashboard.select_market("Stelara");
        dashboard.select_market("Stelara");
        assert!(dashboard.market_error().is_some());
    }

    #[test]
    fn new_snapshot_rebuilds_selected_market() {
        let mut dashboard = Dashboard::default();
        dashboard.set_snapshot(snapshot());
        dashboard.select_market("Humira");
        let hyrimoz = dashboard.table().unwrap().row("Hyrimoz").unwrap().status("40mg pen");
        assert_eq!(hyrimoz, CellStatus::Biosimilar);

        let mut presentations = snapshot().presentations;
        presentations[1].marketing_status = Some("Disc".to_string());
        dashboard.receive(TableData::Presentations(presentations));
        let hyrimoz = dashboard.table().unwrap().row("Hyrimoz").unwrap().status("40mg pen");
        assert_eq!(hyrimoz, CellStatus::Discontinued);
        assert_eq!(dashboard.selected(), Some("Humira"));
    }

    struct FlakyReader {
        calls: Cell<u32>,
        snapshot: Snapshot,
    }

    impl TableReader for FlakyReader {
        fn fetch_all(&self, table: &str) -> Result<Vec<Value>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 1 {
                return Err(FetchError::new(table, "connection reset"));
            }
            let rows = match table {
                "applicants" => serde_json::to_value(&self.snapshot.applicants),
                "reference_products_master" => serde_json::to_value(&self.snapshot.reference_products),
                "products" => serde_json::to_value(&self.snapshot.products),
                _ => serde_json::to_value(&self.snapshot.presentations),
            };
            match rows {
                Ok(Value::Array(rows)) => Ok(rows),
                _ => Err(FetchError::new(table, "not an array")),
            }
        }
    }

    #[test]
    fn load_error_then_retry() {
        let reader = FlakyReader {
            calls: Cell::new(0),
            snapshot: snapshot(),
        };
        let mut dashboard = Dashboard::default();

        let err = dashboard.load(&reader, &TableNames::default()).unwrap_err();
        assert_eq!(err.table, "applicants");
        assert_eq!(dashboard.load_error(), Some(&err));
        assert!(!dashboard.is_ready());

        dashboard.load(&reader, &TableNames::default()).unwrap();
        assert!(dashboard.load_error().is_none());
        assert_eq!(dashboard.snapshot(), Some(&snapshot()));
        assert_eq!(dashboard.table().unwrap().market, "Herceptin");
    }

    #[test]
    fn no_markets() {
        let mut dashboard = Dashboard::default();
        dashboard.set_snapshot(Snapshot {
            products: vec![product(1, "Humira", "351(a)", None)],
            reference_products: vec![master(1, "Humira")],
            ..Snapshot::default()
        });
        assert!(dashboard.is_ready());
        assert!(dashboard.tiles().is_empty());
        assert!(dashboard.selected().is_none());
        assert!(dashboard.table().is_none());
        assert!(dashboard.market_error().is_none());
    }

    #[test]
    fn failed_table_arrival_until_all_tables_arrive() {
        let data = snapshot();
        let mut dashboard = Dashboard::default();
        dashboard.receive(TableData::Applicants(data.applicants));
        dashboard.receive(TableData::Products(data.products));
        dashboard.fail_load(FetchError::new("product_details", "timeout"));

        assert!(!dashboard.is_ready());
        assert_eq!(dashboard.load_error().unwrap().table, "product_details");

        dashboard.receive(TableData::Presentations(data.presentations));
        assert!(dashboard.load_error().is_some());
        dashboard.receive(TableData::ReferenceProducts(data.reference_products));
        assert!(dashboard.is_ready());
        assert!(dashboard.load_error().is_none());
        assert_eq!(dashboard.table().unwrap().market, "Herceptin");
    }
}
