//! Summaries derived from a filtered set of sales.
//!
//! Every function here is pure: it takes the rows that survived filtering
//! and returns a fresh table. Nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{NOT_AVAILABLE, TOP_N};

use super::model::VehicleSaleRecord;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Most frequent value, or `default` when there are no values.
///
/// Ties resolve to the smallest value in natural string order, i.e. the first
/// entry of the sorted mode list.
pub fn mode_or_default<'a, I>(values: I, default: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map_or_else(|| default.to_string(), |(v, _)| v.to_string())
}

/// Arithmetic mean ignoring NaN; NaN when nothing is left.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

fn group_by_cluster<'a>(
    records: &[&'a VehicleSaleRecord],
) -> BTreeMap<u32, Vec<&'a VehicleSaleRecord>> {
    let mut groups: BTreeMap<u32, Vec<&VehicleSaleRecord>> = BTreeMap::new();
    for &r in records {
        groups.entry(r.cluster).or_default().push(r);
    }
    groups
}

// ---------------------------------------------------------------------------
// Cluster summary
// ---------------------------------------------------------------------------

/// One row of the cluster overview table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: u32,
    pub top_region: String,
    pub top_type: String,
    pub avg_price: f64,
    pub avg_mileage: f64,
    pub vehicles_sold: usize,
    pub top_model: String,
    pub top_model_count: usize,
}

impl ClusterSummary {
    /// `"<model> (<count>)"`, as shown in the overview table.
    pub fn top_model_label(&self) -> String {
        format!("{} ({})", self.top_model, self.top_model_count)
    }
}

/// Summarise each cluster present in `records`, ascending by cluster.
///
/// Clusters without rows are absent rather than reported as zero.
pub fn cluster_summary(records: &[&VehicleSaleRecord]) -> Vec<ClusterSummary> {
    group_by_cluster(records)
        .into_iter()
        .map(|(cluster, rows)| {
            let (top_model, top_model_count) = top_model_of(&rows);
            ClusterSummary {
                cluster,
                top_region: mode_or_default(rows.iter().map(|r| r.region.as_str()), NOT_AVAILABLE),
                top_type: mode_or_default(
                    rows.iter().map(|r| r.stock_type.as_str()),
                    NOT_AVAILABLE,
                ),
                avg_price: mean(rows.iter().map(|r| r.price)),
                avg_mileage: mean(rows.iter().map(|r| r.mileage as f64)),
                vehicles_sold: rows.len(),
                top_model,
                top_model_count,
            }
        })
        .collect()
}

/// Highest-count model in a group; ties go to the alphabetically first model.
fn top_model_of(rows: &[&VehicleSaleRecord]) -> (String, usize) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in rows {
        *counts.entry(r.model.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (model, n)| match best {
            Some((_, c)) if c >= n => best,
            _ => Some((model, n)),
        })
        .map_or_else(
            || (NOT_AVAILABLE.to_string(), 0),
            |(m, n)| (m.to_string(), n),
        )
}

/// Distinct region names per cluster, sorted, for the selection tooltips.
pub fn cluster_regions(records: &[&VehicleSaleRecord]) -> BTreeMap<u32, Vec<String>> {
    let mut regions: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
    for &r in records {
        regions.entry(r.cluster).or_default().insert(r.region.as_str());
    }
    regions
        .into_iter()
        .map(|(c, set)| (c, set.into_iter().map(str::to_string).collect()))
        .collect()
}

// ---------------------------------------------------------------------------
// Regional map data
// ---------------------------------------------------------------------------

/// Grouping key for the map: floats compare with `total_cmp` so the key can
/// live in a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct RegionKey<'a> {
    cluster: u32,
    region: &'a str,
    latitude: f64,
    longitude: f64,
}

impl PartialEq for RegionKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RegionKey<'_> {}

impl PartialOrd for RegionKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RegionKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cluster
            .cmp(&other.cluster)
            .then_with(|| self.region.cmp(other.region))
            .then_with(|| self.latitude.total_cmp(&other.latitude))
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

/// One plotted point: a region within a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMapPoint {
    pub cluster: u32,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub vehicles_sold: usize,
    /// Taken from the first row of the group; constant within a region.
    pub dealership_count: u32,
    pub top_performing_dealer: String,
    pub average_mileage: f64,
    pub top_make: String,
    /// Vehicles sold across every region of the same cluster.
    pub cluster_sales: usize,
}

/// Group by (cluster, region, latitude, longitude) and attach the
/// cluster-wide sales total to every row of that cluster.
///
/// Rows without finite coordinates cannot be plotted and are skipped.
pub fn region_map_data(records: &[&VehicleSaleRecord]) -> Vec<RegionMapPoint> {
    let mut groups: BTreeMap<RegionKey<'_>, Vec<&VehicleSaleRecord>> = BTreeMap::new();
    let mut skipped = 0usize;
    for &r in records {
        if !(r.latitude.is_finite() && r.longitude.is_finite()) {
            skipped += 1;
            continue;
        }
        let key = RegionKey {
            cluster: r.cluster,
            region: r.region.as_str(),
            latitude: r.latitude,
            longitude: r.longitude,
        };
        groups.entry(key).or_default().push(r);
    }
    if skipped > 0 {
        log::debug!("Skipped {skipped} rows without coordinates");
    }

    let mut points: Vec<RegionMapPoint> = groups
        .into_iter()
        .map(|(key, rows)| RegionMapPoint {
            cluster: key.cluster,
            region: key.region.to_string(),
            latitude: key.latitude,
            longitude: key.longitude,
            vehicles_sold: rows.len(),
            dealership_count: rows[0].region_dealerships,
            top_performing_dealer: mode_or_default(
                rows.iter().map(|r| r.top_performing_dealer.as_str()),
                NOT_AVAILABLE,
            ),
            average_mileage: mean(rows.iter().map(|r| r.average_mileage)),
            top_make: mode_or_default(rows.iter().map(|r| r.make.as_str()), NOT_AVAILABLE),
            cluster_sales: 0,
        })
        .collect();

    let mut totals: BTreeMap<u32, usize> = BTreeMap::new();
    for p in &points {
        *totals.entry(p.cluster).or_default() += p.vehicles_sold;
    }
    for p in &mut points {
        p.cluster_sales = totals.get(&p.cluster).copied().unwrap_or_default();
    }
    points
}

/// Keep rows whose region contains `query`, ignoring case. Applied after
/// aggregation, so `cluster_sales` keeps its unfiltered totals.
pub fn search_regions(points: Vec<RegionMapPoint>, query: &str) -> Vec<RegionMapPoint> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return points;
    }
    points
        .into_iter()
        .filter(|p| p.region.to_lowercase().contains(&needle))
        .collect()
}

// ---------------------------------------------------------------------------
// Top dealers / top models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RankedDealer {
    /// 1-based display rank.
    pub rank: usize,
    pub dealer_name: String,
    pub count: usize,
    pub top_make: String,
    pub avg_mileage: f64,
}

/// Busiest dealers by vehicles sold; ties ordered by dealer name.
pub fn top_dealers(records: &[&VehicleSaleRecord]) -> Vec<RankedDealer> {
    let mut groups: BTreeMap<&str, Vec<&VehicleSaleRecord>> = BTreeMap::new();
    for &r in records {
        groups.entry(r.dealer_name.as_str()).or_default().push(r);
    }

    let mut rows: Vec<RankedDealer> = groups
        .into_iter()
        .map(|(dealer, rows)| RankedDealer {
            rank: 0,
            dealer_name: dealer.to_string(),
            count: rows.len(),
            top_make: mode_or_default(rows.iter().map(|r| r.make.as_str()), NOT_AVAILABLE),
            avg_mileage: mean(rows.iter().map(|r| r.mileage as f64)),
        })
        .collect();

    // Stable sort keeps the name order from the BTreeMap among equal counts.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(TOP_N);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedModel {
    /// 1-based display rank.
    pub rank: usize,
    pub make: String,
    pub model: String,
    pub count: usize,
}

/// Most sold (make, model) pairs, or an explicit "no data" marker.
#[derive(Debug, Clone, PartialEq)]
pub enum TopModels {
    Ranked(Vec<RankedModel>),
    NoData,
}

/// Most sold models; ties ordered by make then model.
pub fn top_models(records: &[&VehicleSaleRecord]) -> TopModels {
    if records.is_empty() {
        return TopModels::NoData;
    }

    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in records {
        *counts
            .entry((r.make.as_str(), r.model.as_str()))
            .or_default() += 1;
    }

    let mut rows: Vec<RankedModel> = counts
        .into_iter()
        .map(|((make, model), count)| RankedModel {
            rank: 0,
            make: make.to_string(),
            model: model.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(TOP_N);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    TopModels::Ranked(rows)
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

/// KPIs for the cluster selection, computed over the whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionKpis {
    pub total_vehicles: usize,
    pub top_make: String,
}

/// Restrict `records` to the selected clusters (all when none are selected)
/// and report the vehicle count and most common make.
pub fn selection_kpis(records: &[VehicleSaleRecord], selected: &BTreeSet<u32>) -> SelectionKpis {
    let rows: Vec<&VehicleSaleRecord> = records
        .iter()
        .filter(|r| selected.is_empty() || selected.contains(&r.cluster))
        .collect();
    SelectionKpis {
        total_vehicles: rows.len(),
        top_make: mode_or_default(rows.iter().map(|r| r.make.as_str()), NOT_AVAILABLE),
    }
}

/// Landing page quick stats.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewStats {
    pub total_vehicles: usize,
    pub avg_price: f64,
    pub top_make: String,
}

pub fn overview_stats(records: &[VehicleSaleRecord]) -> OverviewStats {
    OverviewStats {
        total_vehicles: records.len(),
        avg_price: mean(records.iter().map(|r| r.price)),
        top_make: mode_or_default(records.iter().map(|r| r.make.as_str()), NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn refs(records: &[VehicleSaleRecord]) -> Vec<&VehicleSaleRecord> {
        records.iter().collect()
    }

    fn in_region(mut r: VehicleSaleRecord, region: &str, lat: f64, lon: f64) -> VehicleSaleRecord {
        r.region = region.to_string();
        r.latitude = lat;
        r.longitude = lon;
        r
    }

    #[test]
    fn mode_or_default_handles_empty_and_ties() {
        assert_eq!(mode_or_default(Vec::<&str>::new(), "N/A"), "N/A");
        assert_eq!(mode_or_default(["b", "a", "b"], "N/A"), "b");
        // Tie: first in sorted order.
        assert_eq!(mode_or_default(["z", "y", "y", "z"], "N/A"), "y");
    }

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean([1.0, f64::NAN, 3.0]), 2.0);
        assert!(mean(Vec::<f64>::new()).is_nan());
    }

    #[test]
    fn cluster_top_model_reports_name_and_count() {
        let data = vec![
            record(0, "Ford", "A"),
            record(0, "Ford", "A"),
            record(0, "Ford", "B"),
        ];
        let summary = cluster_summary(&refs(&data));
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].top_model_label(), "A (2)");
    }

    #[test]
    fn cluster_summary_only_lists_present_clusters() {
        let mut data = vec![record(4, "Kia", "Rio"), record(1, "Kia", "Soul")];
        data[0].price = 10_000.0;
        data.push({
            let mut r = record(4, "Kia", "Rio");
            r.price = 20_000.0;
            r.mileage = 60_000;
            r.region = "South".to_string();
            r
        });
        let summary = cluster_summary(&refs(&data));

        let clusters: Vec<u32> = summary.iter().map(|s| s.cluster).collect();
        assert_eq!(clusters, vec![1, 4]);

        let four = &summary[1];
        assert_eq!(four.vehicles_sold, 2);
        assert_eq!(four.avg_price, 15_000.0);
        assert_eq!(four.avg_mileage, 50_000.0);
        // "North" vs "South" tie resolves to the first in sorted order.
        assert_eq!(four.top_region, "North");
        assert_eq!(four.top_type, "Used");
    }

    #[test]
    fn cluster_vehicle_counts_sum_to_total() {
        let data: Vec<_> = (0..23)
            .map(|i| record(i % 5, "Ford", if i % 2 == 0 { "A" } else { "B" }))
            .collect();
        let summary = cluster_summary(&refs(&data));
        let total: usize = summary.iter().map(|s| s.vehicles_sold).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn cluster_regions_lists_distinct_sorted_names() {
        let data = vec![
            in_region(record(2, "Ford", "A"), "West", 1.0, 1.0),
            in_region(record(2, "Ford", "A"), "East", 2.0, 2.0),
            in_region(record(2, "Ford", "A"), "West", 1.0, 1.0),
        ];
        let regions = cluster_regions(&refs(&data));
        assert_eq!(regions[&2], vec!["East".to_string(), "West".to_string()]);
    }

    #[test]
    fn region_map_cluster_sales_is_cluster_wide_total() {
        let data = vec![
            in_region(record(0, "Ford", "A"), "North", 53.6, -113.5),
            in_region(record(0, "Honda", "A"), "North", 53.6, -113.5),
            in_region(record(0, "Ford", "A"), "South", 53.4, -113.5),
            in_region(record(1, "Kia", "A"), "North", 53.6, -113.5),
        ];
        let points = region_map_data(&refs(&data));
        assert_eq!(points.len(), 3);

        let mut per_cluster: BTreeMap<u32, usize> = BTreeMap::new();
        for p in &points {
            *per_cluster.entry(p.cluster).or_default() += p.vehicles_sold;
        }
        for p in &points {
            assert_eq!(p.cluster_sales, per_cluster[&p.cluster]);
        }

        let north0 = &points[0];
        assert_eq!((north0.cluster, north0.region.as_str()), (0, "North"));
        assert_eq!(north0.vehicles_sold, 2);
        assert_eq!(north0.cluster_sales, 3);
        assert_eq!(north0.top_make, "Ford");
        assert_eq!(points[2].cluster_sales, 1);
    }

    #[test]
    fn region_map_takes_first_dealership_count_and_means_mileage() {
        let mut a = record(3, "Ford", "A");
        a.region_dealerships = 7;
        a.average_mileage = 10_000.0;
        a.top_performing_dealer = "Zed Motors".to_string();
        let mut b = record(3, "Ford", "A");
        b.region_dealerships = 9;
        b.average_mileage = 20_000.0;
        b.top_performing_dealer = "Zed Motors".to_string();

        let data = vec![a, b];
        let points = region_map_data(&refs(&data));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].dealership_count, 7);
        assert_eq!(points[0].average_mileage, 15_000.0);
        assert_eq!(points[0].top_performing_dealer, "Zed Motors");
    }

    #[test]
    fn region_map_skips_rows_without_coordinates() {
        let data = vec![
            in_region(record(0, "Ford", "A"), "North", f64::NAN, -113.5),
            in_region(record(0, "Ford", "A"), "North", 53.6, -113.5),
        ];
        let points = region_map_data(&refs(&data));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].vehicles_sold, 1);
    }

    #[test]
    fn region_search_is_case_insensitive_and_post_aggregation() {
        let data = vec![
            in_region(record(0, "Ford", "A"), "North East", 1.0, 1.0),
            in_region(record(0, "Ford", "A"), "South", 2.0, 2.0),
            in_region(record(0, "Ford", "A"), "South", 2.0, 2.0),
        ];
        let points = region_map_data(&refs(&data));

        let found = search_regions(points.clone(), "  nORTH ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].region, "North East");
        assert_eq!(found[0].cluster_sales, 3);

        assert_eq!(search_regions(points.clone(), "").len(), 2);
        assert!(search_regions(points, "west").is_empty());
    }

    #[test]
    fn top_dealers_capped_sorted_and_ranked() {
        let mut data = Vec::new();
        for d in 0..12 {
            for _ in 0..=d {
                let mut r = record(0, "Ford", "A");
                r.dealer_name = format!("Dealer {d:02}");
                data.push(r);
            }
        }
        let rows = top_dealers(&refs(&data));
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].dealer_name, "Dealer 11");
        assert_eq!(rows[0].count, 12);
        assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(
            rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            (1..=10).collect::<Vec<_>>()
        );
    }

    #[test]
    fn top_dealer_reports_mode_make_and_mean_mileage() {
        let mut a = record(0, "Ford", "A");
        a.mileage = 10_000;
        let mut b = record(0, "Ford", "B");
        b.mileage = 30_000;
        let c = record(0, "Honda", "C");
        let data = vec![a, b, c];
        let rows = top_dealers(&refs(&data));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].top_make, "Ford");
        assert_eq!(rows[0].avg_mileage, (10_000.0 + 30_000.0 + 40_000.0) / 3.0);
    }

    #[test]
    fn top_models_empty_input_is_no_data() {
        assert_eq!(top_models(&[]), TopModels::NoData);
    }

    #[test]
    fn top_models_capped_sorted_and_ranked() {
        let mut data = Vec::new();
        for m in 0..15 {
            for _ in 0..(m % 4 + 1) {
                data.push(record(0, "Make", &format!("Model {m:02}")));
            }
        }
        let TopModels::Ranked(rows) = top_models(&refs(&data)) else {
            panic!("expected ranked rows");
        };
        assert_eq!(rows.len(), 10);
        assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].count, 4);
        // Ties broken by (make, model).
        assert_eq!(rows[0].model, "Model 03");
        assert_eq!(rows[9].rank, 10);
    }

    #[test]
    fn selection_kpis_fall_back_to_all_clusters() {
        let data = vec![
            record(0, "Ford", "A"),
            record(1, "Honda", "B"),
            record(1, "Honda", "C"),
        ];
        let all = selection_kpis(&data, &BTreeSet::new());
        assert_eq!(all.total_vehicles, 3);
        assert_eq!(all.top_make, "Honda");

        let zero = selection_kpis(&data, &BTreeSet::from([0]));
        assert_eq!(zero.total_vehicles, 1);
        assert_eq!(zero.top_make, "Ford");

        let missing = selection_kpis(&data, &BTreeSet::from([9]));
        assert_eq!(missing.total_vehicles, 0);
        assert_eq!(missing.top_make, "N/A");
    }

    #[test]
    fn overview_stats_summarise_dataset() {
        let mut a = record(0, "Ford", "A");
        a.price = 10_000.0;
        let mut b = record(0, "Ford", "A");
        b.price = 30_000.0;
        let stats = overview_stats(&[a, b]);
        assert_eq!(stats.total_vehicles, 2);
        assert_eq!(stats.avg_price, 20_000.0);
        assert_eq!(stats.top_make, "Ford");
    }
}
