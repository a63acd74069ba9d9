//! Internal stability of the reinforced mass: rupture, pullout and facing
//! connection of every geogrid layer.
//!
//! Each layer carries the internal horizontal pressure over its tributary
//! section, from the midpoint to the layer above (or the top of the wall)
//! down to the midpoint to the layer below (or the base).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ElementCheck, FailureMode, FailureModeResult};
use crate::analysis::AnalysisContext;
use crate::errors::CalcResult;
use crate::geometry::GeogridLayer;

/// Load collected by one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TributaryDemand {
    /// Top of the tributary section, depth below the top (m)
    pub top_depth_m: f64,
    /// Bottom of the tributary section (m)
    pub bottom_depth_m: f64,
    /// F_g (kN/m)
    pub force_kn_m: f64,
}

/// Tributary demand of every layer, in layer order (top first)
pub fn tributary_demands(ctx: &AnalysisContext) -> Vec<TributaryDemand> {
    let layers = ctx.layers;
    let height = ctx.geometry.height_m;
    layers
        .iter()
        .enumerate()
        .map(|(k, layer)| {
            let top = if k == 0 {
                0.0
            } else {
                (layers[k - 1].depth_m + layer.depth_m) / 2.0
            };
            let bottom = match layers.get(k + 1) {
                Some(below) => (layer.depth_m + below.depth_m) / 2.0,
                None => height,
            };
            TributaryDemand {
                top_depth_m: top,
                bottom_depth_m: bottom,
                force_kn_m: ctx.loads.internal.horizontal_force_between(top, bottom),
            }
        })
        .collect()
}

fn no_layers(mode: FailureMode, ctx: &AnalysisContext) -> Option<FailureModeResult> {
    ctx.layers
        .is_empty()
        .then(|| FailureModeResult::not_applicable(mode, ctx.factors, "Wall has no geogrid layers."))
}

fn demand_check(layer: &GeogridLayer, demand: &TributaryDemand, resisting: f64, required: f64) -> ElementCheck {
    ElementCheck::new(layer.label.clone(), demand.force_kn_m, resisting, required)
        .detail("d", "Layer depth", layer.depth_m, "m")
        .detail("z_(\"top\")", "Top of tributary section", demand.top_depth_m, "m")
        .detail("z_(\"bot\")", "Bottom of tributary section", demand.bottom_depth_m, "m")
        .detail("F_g", "Tributary load", demand.force_kn_m, "kN/m")
}

/// Tributary load against the long-term allowable strength
pub fn evaluate_rupture(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::GeogridRupture;
    if let Some(result) = no_layers(mode, ctx) {
        return Ok(result);
    }
    let required = mode.required(ctx.factors);
    let elements = ctx
        .layers
        .iter()
        .zip(tributary_demands(ctx))
        .map(|(layer, demand)| {
            demand_check(layer, &demand, layer.ltads_kn_m, required)
                .detail("T_(\"ult\")", "Ultimate strength", layer.ultimate_strength_kn_m, "kN/m")
                .detail("\"RF\"", "Reduction factor", layer.reduction_factor, "-")
                .detail("\"LTADS\"", "Long-term allowable strength", layer.ltads_kn_m, "kN/m")
        })
        .collect();
    Ok(FailureModeResult::per_element(mode, ctx.factors, elements))
}

/// Length of grid anchored beyond the active zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulloutAnchorage {
    /// L_a, width of the active zone at the layer (m)
    pub active_length_m: f64,
    /// L_e (m)
    pub embedded_length_m: f64,
    /// σ_v at the layer (kPa)
    pub overburden_kpa: f64,
    /// 2·L_e·σ_v·C_i·tan φ·R_c (kN/m)
    pub anchorage_kn_m: f64,
    /// F_gr = min(anchorage, LTADS) (kN/m)
    pub capacity_kn_m: f64,
}

/// Pullout capacity of one layer
pub fn pullout_anchorage(ctx: &AnalysisContext, layer: &GeogridLayer) -> PulloutAnchorage {
    let soil = &ctx.loads.internal.soil;
    let height = ctx.geometry.height_m;
    let phi_deg = soil.friction_angle_deg;

    let wedge = (45.0 - phi_deg / 2.0).to_radians().tan() - ctx.geometry.batter_angle_rad().tan();
    let active_length_m = (0.3 * height).min((height - layer.depth_m) * wedge).max(0.0);

    let block_depth = ctx.geometry.course_at(layer.elevation_m).depth_m;
    let inside_block = (block_depth - layer.front_offset_m).max(0.0);
    let embedded_length_m = (layer.length_m - inside_block - active_length_m).max(0.0);

    let overburden_kpa = soil.unit_weight_kn_m3 * layer.depth_m + ctx.loads.stabilizing_surcharge_kpa();
    let anchorage_kn_m = 2.0
        * embedded_length_m
        * overburden_kpa
        * layer.interaction_coefficient
        * soil.friction_coefficient()
        * layer.coverage_ratio;

    PulloutAnchorage {
        active_length_m,
        embedded_length_m,
        overburden_kpa,
        anchorage_kn_m,
        capacity_kn_m: anchorage_kn_m.min(layer.ltads_kn_m),
    }
}

/// Tributary load against the anchorage behind the failure plane
pub fn evaluate_pullout(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::GeogridPullout;
    if let Some(result) = no_layers(mode, ctx) {
        return Ok(result);
    }
    let required = mode.required(ctx.factors);
    let elements = ctx
        .layers
        .iter()
        .zip(tributary_demands(ctx))
        .map(|(layer, demand)| {
            let anchorage = pullout_anchorage(ctx, layer);
            debug!(layer = %layer.label, demand = demand.force_kn_m, ?anchorage, "pullout");
            demand_check(layer, &demand, anchorage.capacity_kn_m, required)
                .detail("L_a", "Active zone length", anchorage.active_length_m, "m")
                .detail("L_e", "Embedded length", anchorage.embedded_length_m, "m")
                .detail("sigma_v", "Overburden at the layer", anchorage.overburden_kpa, "kPa")
                .detail("F_(\"gr\")", "Pullout capacity", anchorage.capacity_kn_m, "kN/m")
        })
        .collect();

    let mut result = FailureModeResult::per_element(mode, ctx.factors, elements);
    if ctx.loads.surcharge.is_some() && !ctx.loads.surcharge_is_dead() {
        result = result.note("Live surcharge not counted in the overburden.");
    }
    Ok(result)
}

/// Load reaching the face against the grid-to-block connection strength
pub fn evaluate_connection(ctx: &AnalysisContext) -> CalcResult<FailureModeResult> {
    let mode = FailureMode::GeogridConnection;
    if let Some(result) = no_layers(mode, ctx) {
        return Ok(result);
    }
    let required = mode.required(ctx.factors);
    let elements = ctx
        .layers
        .iter()
        .zip(tributary_demands(ctx))
        .map(|(layer, demand)| {
            let face_load = 2.0 / 3.0 * demand.force_kn_m;
            let normal = ctx.geometry.block_weight_above(layer.elevation_m);
            let strength = layer.connection_capacity_kn_m(normal);
            ElementCheck::new(layer.label.clone(), face_load, strength, required)
                .detail("d", "Layer depth", layer.depth_m, "m")
                .detail("F_g", "Tributary load", demand.force_kn_m, "kN/m")
                .detail("F_W", "Load at the face", face_load, "kN/m")
                .detail("N", "Block weight above the layer", normal, "kN/m")
                .detail("F_(\"CS\")", "Connection strength", strength, "kN/m")
        })
        .collect();
    Ok(FailureModeResult::per_element(mode, ctx.factors, elements))
}
