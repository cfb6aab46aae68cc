use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::data::aggregate::{
    self, ClusterSummary, OverviewStats, RankedDealer, RegionMapPoint, SelectionKpis, TopModels,
};
use crate::data::filter::{self, FilterCriteria, FilterPanel};
use crate::data::model::{SalesDataset, VehicleSaleRecord};
use crate::data::source::{DataSource, DatasetHandle};
use crate::ui::map::{map_markers, MapMarker};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Analysis,
    Model,
    About,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Analysis, Page::Model, Page::About];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Analysis => "Analysis",
            Page::Model => "Model",
            Page::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived view: everything the Model page renders
// ---------------------------------------------------------------------------

/// Aggregates for one set of widget values. Rebuilt from scratch on every
/// change and dropped on the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Rows passing every filter, cluster selection included.
    pub filtered_count: usize,
    /// Clusters present once the non-cluster filters are applied.
    pub cluster_summary: Vec<ClusterSummary>,
    pub cluster_regions: BTreeMap<u32, Vec<String>>,
    pub kpis: SelectionKpis,
    /// Map rows after the region search.
    pub map_points: Vec<RegionMapPoint>,
    pub markers: Vec<MapMarker>,
    pub top_dealers: Vec<RankedDealer>,
    pub top_models: TopModels,
}

impl DashboardView {
    /// Run the filter and aggregate pipeline.
    ///
    /// `selected_clusters` is pruned to the clusters still present in the
    /// cluster summary; a cluster that drops out can't stay selected.
    pub fn compute(
        dataset: &SalesDataset,
        criteria: &FilterCriteria,
        selected_clusters: &mut BTreeSet<u32>,
        region_query: &str,
    ) -> Self {
        let relaxed = criteria.without_clusters();
        let base = filter::apply(&dataset.records, &relaxed);

        let cluster_summary = aggregate::cluster_summary(&base);
        let cluster_regions = aggregate::cluster_regions(&base);
        let present: BTreeSet<u32> = cluster_summary.iter().map(|s| s.cluster).collect();
        selected_clusters.retain(|c| present.contains(c));

        let filtered: Vec<&VehicleSaleRecord> = base
            .into_iter()
            .filter(|r| selected_clusters.is_empty() || selected_clusters.contains(&r.cluster))
            .collect();

        let map_points =
            aggregate::search_regions(aggregate::region_map_data(&filtered), region_query);
        let markers = map_markers(&map_points);
        let top_models = aggregate::top_models(&filtered);
        if top_models == TopModels::NoData {
            log::warn!("No sales left after filtering");
        }
        log::debug!(
            "Refreshed view: {} of {} rows, {} map points",
            filtered.len(),
            dataset.len(),
            map_points.len()
        );

        Self {
            filtered_count: filtered.len(),
            cluster_summary,
            cluster_regions,
            kpis: aggregate::selection_kpis(&dataset.records, selected_clusters),
            map_points,
            markers,
            top_dealers: aggregate::top_dealers(&filtered),
            top_models,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset and where it came from.
    pub handle: DatasetHandle,

    /// Current page in the sidebar navigation.
    pub page: Page,

    /// Filter panel widget values.
    pub panel: FilterPanel,

    /// "Show Filters" toggle; hiding it disables the panel's filters.
    pub show_filters: bool,

    /// "Show Tables" toggle for the top dealer / model column.
    pub show_tables: bool,

    /// Clusters ticked in the overview table.
    pub selected_clusters: BTreeSet<u32>,

    /// Region search text for the map.
    pub region_query: String,

    /// Landing page numbers over the whole dataset.
    pub overview: OverviewStats,

    /// Aggregates for the current widget values.
    pub view: DashboardView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(handle: DatasetHandle) -> Self {
        let panel = FilterPanel::default();
        let mut selected_clusters = BTreeSet::new();
        let dataset = handle.dataset();
        let view = DashboardView::compute(
            dataset,
            &FilterCriteria::from_panel(&panel, true, &selected_clusters),
            &mut selected_clusters,
            "",
        );
        let overview = aggregate::overview_stats(&dataset.records);
        Self {
            overview,
            handle,
            page: Page::Overview,
            panel,
            show_filters: true,
            show_tables: false,
            selected_clusters,
            region_query: String::new(),
            view,
            status_message: None,
        }
    }

    /// Criteria implied by the current widgets.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_panel(&self.panel, self.show_filters, &self.selected_clusters)
    }

    /// Recompute the view after any widget change.
    pub fn refresh(&mut self) {
        let criteria = self.criteria();
        self.view = DashboardView::compute(
            self.handle.dataset(),
            &criteria,
            &mut self.selected_clusters,
            &self.region_query,
        );
    }

    /// Tick or untick a cluster in the overview table.
    pub fn toggle_cluster(&mut self, cluster: u32) {
        if !self.selected_clusters.remove(&cluster) {
            self.selected_clusters.insert(cluster);
        }
        self.refresh();
    }

    /// Swap in a new dataset and reset every selection.
    pub fn set_handle(&mut self, handle: DatasetHandle) {
        self.handle = handle;
        self.panel = FilterPanel::default();
        self.selected_clusters.clear();
        self.region_query.clear();
        self.status_message = None;
        self.dataset_changed();
    }

    /// Load a local file, keeping the current data if that fails.
    pub fn open_file(&mut self, path: PathBuf) {
        match DatasetHandle::open(DataSource::File(path)) {
            Ok(handle) => self.set_handle(handle),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Refetch the current source.
    pub fn reload(&mut self) {
        match self.handle.reload() {
            Ok(()) => {
                self.status_message = None;
                self.dataset_changed();
            }
            Err(e) => {
                log::error!("Reload failed: {e}");
                self.status_message = Some(format!("Reload failed: {e}"));
            }
        }
    }

    fn dataset_changed(&mut self) {
        self.overview = aggregate::overview_stats(&self.handle.dataset().records);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::PriceRange;
    use crate::data::model::tests::record;

    fn state() -> AppState {
        let mut records = Vec::new();
        for (cluster, make, region, price) in [
            (0, "Ford", "North", 20_000.0),
            (0, "Ford", "North", 30_000.0),
            (1, "Honda", "South", 40_000.0),
            (2, "Kia", "West", 90_000.0),
        ] {
            let mut r = record(cluster, make, "M");
            r.region = region.to_string();
            r.price = price;
            records.push(r);
        }
        let handle = DatasetHandle::from_dataset(
            DataSource::Remote("http://localhost/sales.csv".to_string()),
            SalesDataset::from_records(records),
        );
        AppState::new(handle)
    }

    #[test]
    fn initial_view_uses_default_price_window() {
        let s = state();
        assert_eq!(s.page, Page::Overview);
        assert!(s.show_filters);
        assert!(!s.show_tables);
        // The 90k sale is outside the default window.
        assert_eq!(s.view.filtered_count, 3);
        assert_eq!(s.overview.total_vehicles, 4);
        let clusters: Vec<u32> = s.view.cluster_summary.iter().map(|c| c.cluster).collect();
        assert_eq!(clusters, vec![0, 1]);
    }

    #[test]
    fn selecting_a_cluster_narrows_map_and_tables_but_not_summary() {
        let mut s = state();
        s.toggle_cluster(0);

        assert_eq!(s.view.filtered_count, 2);
        assert_eq!(s.view.cluster_summary.len(), 2);
        assert!(s.view.map_points.iter().all(|p| p.cluster == 0));
        assert_eq!(s.view.kpis.total_vehicles, 2);
        assert_eq!(s.view.kpis.top_make, "Ford");

        s.toggle_cluster(0);
        assert_eq!(s.view.filtered_count, 3);
    }

    #[test]
    fn selection_drops_clusters_that_leave_the_summary() {
        let mut s = state();
        s.toggle_cluster(1);
        assert!(s.selected_clusters.contains(&1));

        s.panel.makes.insert("Ford".to_string());
        s.refresh();
        assert!(s.selected_clusters.is_empty());
        assert_eq!(s.view.filtered_count, 2);
    }

    #[test]
    fn hiding_filters_reverts_to_defaults() {
        let mut s = state();
        s.panel.price = PriceRange::new(5_000.0, 100_000.0);
        s.panel.makes.insert("Kia".to_string());
        s.refresh();
        assert_eq!(s.view.filtered_count, 1);

        s.show_filters = false;
        s.refresh();
        assert_eq!(s.view.filtered_count, 3);
    }

    #[test]
    fn empty_view_reports_no_model_data() {
        let mut s = state();
        s.panel.makes.insert("Lada".to_string());
        s.refresh();
        assert_eq!(s.view.filtered_count, 0);
        assert_eq!(s.view.top_models, TopModels::NoData);
        assert!(s.view.top_dealers.is_empty());
        assert!(s.view.markers.is_empty());
    }

    #[test]
    fn region_search_narrows_markers() {
        let mut s = state();
        s.region_query = "sou".to_string();
        s.refresh();
        assert_eq!(s.view.markers.len(), 1);
        assert_eq!(s.view.map_points[0].region, "South");
    }

    #[test]
    fn failed_open_keeps_data_and_reports() {
        let mut s = state();
        s.open_file(PathBuf::from("/nonexistent/sales.csv"));
        assert!(s.status_message.is_some());
        assert_eq!(s.handle.dataset().len(), 4);
    }
}
