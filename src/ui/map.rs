use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{cluster_color, MarkerColor};
use crate::config::MAP_CENTER;
use crate::data::aggregate::RegionMapPoint;

use super::format;

// ---------------------------------------------------------------------------
// Markers handed to the map
// ---------------------------------------------------------------------------

/// One plotted point: where, what the popup says, and its cluster colour.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub cluster: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
    pub color: MarkerColor,
}

/// Popup text for one region row. "Vehicles Sold" reports the cluster-wide
/// total, not the region's own count.
pub fn popup_text(point: &RegionMapPoint) -> String {
    let mileage = if point.average_mileage.is_finite() {
        format!("{:.0}", point.average_mileage)
    } else {
        format::rounded(point.average_mileage)
    };
    [
        format!("Region: {}", point.region),
        format!("Cluster: {}", point.cluster),
        format!("Top Performing Dealership: {}", point.top_performing_dealer),
        format!("Top Make: {}", point.top_make),
        format!("Avg Mileage: {mileage}"),
        format!("Vehicles Sold: {}", format::count(point.cluster_sales)),
        format!("Dealerships: {}", point.dealership_count),
    ]
    .join("\n")
}

pub fn map_markers(points: &[RegionMapPoint]) -> Vec<MapMarker> {
    points
        .iter()
        .map(|p| MapMarker {
            cluster: p.cluster,
            latitude: p.latitude,
            longitude: p.longitude,
            popup: popup_text(p),
            color: cluster_color(p.cluster),
        })
        .collect()
}

/// Closest marker within `max_distance`, by the supplied distance measure.
pub fn nearest_marker<'a, F>(
    markers: &'a [MapMarker],
    max_distance: f32,
    distance: F,
) -> Option<&'a MapMarker>
where
    F: Fn(&MapMarker) -> f32,
{
    markers
        .iter()
        .map(|m| (m, distance(m)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}

// ---------------------------------------------------------------------------
// Regional map (central panel)
// ---------------------------------------------------------------------------

/// Hover radius around a marker, in screen points.
const HOVER_RADIUS: f32 = 12.0;

/// Scatter the markers in lon/lat space, one series per cluster so the legend
/// names each colour. Hovering a marker shows its popup.
pub fn regional_map(ui: &mut Ui, markers: &[MapMarker]) {
    let mut by_cluster: BTreeMap<u32, Vec<&MapMarker>> = BTreeMap::new();
    for m in markers {
        by_cluster.entry(m.cluster).or_default().push(m);
    }

    let (center_lat, center_lon) = MAP_CENTER;
    let response = Plot::new("regional_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.6)
        .include_x(center_lon)
        .include_y(center_lat)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (cluster, group) in &by_cluster {
                let color: MarkerColor = group
                    .first()
                    .map(|m| m.color)
                    .unwrap_or_else(|| cluster_color(*cluster));
                let points: PlotPoints = group.iter().map(|m| [m.longitude, m.latitude]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(format!("Cluster {cluster} ({})", color.name))
                        .color(color.color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(6.0),
                );
            }
        });

    if let Some(pointer) = response.response.hover_pos() {
        let transform = response.transform;
        let hit = nearest_marker(markers, HOVER_RADIUS, |m| {
            transform
                .position_from_point(&PlotPoint::new(m.longitude, m.latitude))
                .distance(pointer)
        });
        if let Some(marker) = hit {
            response.response.on_hover_text(marker.popup.clone());
        }
    }
}
