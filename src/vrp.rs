//! Multi-vehicle routing formulation.
//!
//! Translates a dispatch request (locations, demands, vehicle fleet, time
//! windows, allowed-arc matrix, grouping preferences) into a routing model
//! with three cumulative dimensions, solves it under a fixed wall-clock
//! budget, and walks the solution back out into per-vehicle route detail.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::engine::routing::{
    Capacities, DimensionSpec, RouteIndex, RoutingModel, SearchParams, TransitEvaluator, Transits,
};
use crate::error::SolveError;
use crate::haversine::road_km;

/// Cost stamped on arcs the allowed-matrix rules out.
const DISTANCE_SENTINEL: i64 = 1000;

/// Upper bound on the distance cumul at any stop.
const DISTANCE_CAP: i64 = 1000;

/// Penalty per group member served off the group's vehicle.
const SOFT_GROUP_PENALTY: i64 = 40;

/// Wall-clock budget for the routing search. The only bounded solve in
/// the crate; every other formulator runs to completion.
const SOLVE_BUDGET: Duration = Duration::from_secs(30);

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Load units per reported weight unit (cumuls are kept integral).
const LOAD_SCALE: f64 = 1000.0;

// ----------------------------------------------------------------------
// Problem
// ----------------------------------------------------------------------

/// A full vehicle-routing instance. Location arrays are indexed by
/// location number, vehicle arrays by vehicle number; `matrix` marks which
/// arcs may be driven at all.
#[derive(Debug, Clone)]
pub struct VrpProblem {
    pub allow_drop: bool,
    pub departure_times: Vec<f64>,
    pub vehicle_capacities: Vec<i64>,
    pub vehicle_costs: Vec<i64>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub departure_depots: Vec<usize>,
    pub return_depots: Vec<usize>,
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
    pub return_times: Vec<f64>,
    pub demands: Vec<i64>,
    pub matrix: Vec<Vec<i64>>,
    pub groups: Vec<Vec<usize>>,
    pub velocities: Vec<f64>,
    pub horizon: i64,
    pub loadings: Vec<i64>,
    pub unloadings: Vec<i64>,
    pub min_weights: Vec<i64>,
    pub first_vendor_index: usize,
}

/// One stop on a solved route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStop {
    pub location_no: usize,
    pub lat: f64,
    pub lon: f64,
    /// Cumulative load, descaled to weight units.
    pub load: f64,
    /// Cumulative distance in whole kilometers.
    pub distance: i64,
    /// Earliest feasible arrival (seconds).
    pub time_open: i64,
    /// Latest feasible departure (seconds).
    pub time_leave: i64,
}

/// A vehicle's solved route, depot to depot.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleRoute {
    pub vehicle_no: usize,
    pub departure_time: f64,
    pub return_time: f64,
    pub capacity: i64,
    #[serde(rename = "routes")]
    pub stops: Vec<RouteStop>,
}

/// The solved instance: global objective plus per-vehicle routes.
#[derive(Debug, Clone, Serialize)]
pub struct VrpSolution {
    pub total: i64,
    #[serde(rename = "result")]
    pub vehicles: Vec<VehicleRoute>,
}

// ----------------------------------------------------------------------
// Evaluators
// ----------------------------------------------------------------------

/// Arc costs: road distance where the arc is allowed, sentinel otherwise.
struct RoadCosts<'a> {
    locations: &'a [(f64, f64)],
    allowed: &'a [Vec<i64>],
}

impl TransitEvaluator for RoadCosts<'_> {
    fn transit(&self, from: usize, to: usize) -> i64 {
        if self.allowed[from][to] != 0 {
            road_km(self.locations[from], self.locations[to]) as i64
        } else {
            DISTANCE_SENTINEL
        }
    }
}

/// Per-vehicle travel time: service at the departed stop plus driving
/// time at the vehicle's velocity. Zero-distance arcs take no time.
struct VehicleTransit<'a> {
    locations: &'a [(f64, f64)],
    loadings: &'a [i64],
    unloadings: &'a [i64],
    velocity: f64,
}

impl TransitEvaluator for VehicleTransit<'_> {
    fn transit(&self, from: usize, to: usize) -> i64 {
        let travel =
            road_km(self.locations[from], self.locations[to]) / self.velocity * SECONDS_PER_HOUR;
        if travel == 0.0 {
            return 0;
        }
        let service = (self.loadings[from] + self.unloadings[from]) as f64;
        (service + travel) as i64
    }
}

/// Load picked up when leaving a stop.
struct NodeDemand<'a> {
    demands: &'a [i64],
}

impl TransitEvaluator for NodeDemand<'_> {
    fn transit(&self, from: usize, _to: usize) -> i64 {
        self.demands[from]
    }
}

// ----------------------------------------------------------------------
// End-load policy
// ----------------------------------------------------------------------

/// Vehicle class relative to `first_vendor_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    /// Below the boundary: the operator's own fleet.
    OwnFleet,
    /// At or above the boundary: hired vendor vehicles.
    Vendor,
}

impl VehicleClass {
    pub fn of(vehicle: usize, first_vendor_index: usize) -> Self {
        if vehicle < first_vendor_index {
            Self::OwnFleet
        } else {
            Self::Vendor
        }
    }
}

/// The minimum-load-or-zero rule, as an interval carved out of the
/// end-of-route load cumul.
///
/// Own-fleet vehicles with dropping allowed must finish strictly above
/// their minimum (the empty option is removed too); every other case may
/// finish empty or above the minimum. An interval with `lo > hi` is
/// empty and removes nothing.
pub fn end_load_forbidden_interval(
    class: VehicleClass,
    allow_drop: bool,
    min_weight: i64,
) -> (i64, i64) {
    match class {
        VehicleClass::OwnFleet if allow_drop => (0, min_weight),
        _ => (1, min_weight),
    }
}

// ----------------------------------------------------------------------
// Solve
// ----------------------------------------------------------------------

impl VrpProblem {
    fn validate(&self) -> Result<(usize, usize), SolveError> {
        let num_locations = self.lats.len();
        if num_locations == 0 {
            return Err(SolveError::InvalidInput("no locations".into()));
        }
        let location_arrays = [
            ("lons", self.lons.len()),
            ("start_times", self.start_times.len()),
            ("end_times", self.end_times.len()),
            ("demands", self.demands.len()),
            ("loadings", self.loadings.len()),
            ("unloadings", self.unloadings.len()),
            ("matrix", self.matrix.len()),
        ];
        for (name, len) in location_arrays {
            if len != num_locations {
                return Err(SolveError::InvalidInput(format!(
                    "{name} must have one entry per location"
                )));
            }
        }
        if self.matrix.iter().any(|row| row.len() != num_locations) {
            return Err(SolveError::InvalidInput(
                "allowed-arc matrix must be square".into(),
            ));
        }

        let num_vehicles = self.vehicle_capacities.len();
        if num_vehicles == 0 {
            return Err(SolveError::InvalidInput("no vehicles".into()));
        }
        let vehicle_arrays = [
            ("vehicle_costs", self.vehicle_costs.len()),
            ("departure_times", self.departure_times.len()),
            ("return_times", self.return_times.len()),
            ("departure_depots", self.departure_depots.len()),
            ("return_depots", self.return_depots.len()),
            ("velocities", self.velocities.len()),
            ("min_weights", self.min_weights.len()),
        ];
        for (name, len) in vehicle_arrays {
            if len != num_vehicles {
                return Err(SolveError::InvalidInput(format!(
                    "{name} must have one entry per vehicle"
                )));
            }
        }
        if self
            .departure_depots
            .iter()
            .chain(self.return_depots.iter())
            .any(|&depot| depot >= num_locations)
        {
            return Err(SolveError::InvalidInput("depot index out of range".into()));
        }
        if self.velocities.iter().any(|&v| v <= 0.0) {
            return Err(SolveError::InvalidInput(
                "vehicle velocities must be positive".into(),
            ));
        }
        if self
            .departure_times
            .iter()
            .zip(&self.return_times)
            .any(|(dep, ret)| dep > ret)
        {
            return Err(SolveError::InvalidInput(
                "vehicle departure must not be after its return".into(),
            ));
        }
        if self
            .groups
            .iter()
            .flatten()
            .any(|&node| node >= num_locations)
        {
            return Err(SolveError::InvalidInput("group member out of range".into()));
        }
        Ok((num_locations, num_vehicles))
    }

    /// Build the routing model, solve within the budget, and extract
    /// per-vehicle routes.
    pub fn solve(&self) -> Result<VrpSolution, SolveError> {
        let (num_locations, num_vehicles) = self.validate()?;

        let locations: Vec<(f64, f64)> = self
            .lats
            .iter()
            .zip(&self.lons)
            .map(|(&lat, &lon)| (lat, lon))
            .collect();

        let road_costs = RoadCosts {
            locations: &locations,
            allowed: &self.matrix,
        };
        let demand = NodeDemand {
            demands: &self.demands,
        };
        let vehicle_transits: Vec<VehicleTransit<'_>> = self
            .velocities
            .iter()
            .map(|&velocity| VehicleTransit {
                locations: &locations,
                loadings: &self.loadings,
                unloadings: &self.unloadings,
                velocity,
            })
            .collect();
        let transit_refs: Vec<&dyn TransitEvaluator> = vehicle_transits
            .iter()
            .map(|transit| transit as &dyn TransitEvaluator)
            .collect();

        let mut model = RoutingModel::new(
            num_locations,
            self.departure_depots.clone(),
            self.return_depots.clone(),
        );
        model.set_arc_cost(&road_costs);
        for (vehicle, &cost) in self.vehicle_costs.iter().enumerate() {
            model.set_fixed_vehicle_cost(vehicle, cost);
        }

        let capacity = model.add_dimension(
            "capacity",
            DimensionSpec {
                transits: Transits::Shared(&demand),
                slack_max: 0,
                capacities: Capacities::PerVehicle(self.vehicle_capacities.clone()),
                start_cumul_to_zero: true,
            },
        );
        let time = model.add_dimension(
            "time",
            DimensionSpec {
                transits: Transits::PerVehicle(transit_refs),
                slack_max: self.horizon,
                capacities: Capacities::Uniform(self.horizon),
                start_cumul_to_zero: false,
            },
        );
        let distance = model.add_dimension(
            "distance",
            DimensionSpec {
                transits: Transits::Shared(&road_costs),
                slack_max: 0,
                capacities: Capacities::Uniform(DISTANCE_CAP),
                start_cumul_to_zero: true,
            },
        );

        // Per-location service windows.
        for location in 0..num_locations {
            let open = (SECONDS_PER_HOUR * self.start_times[location]) as i64;
            let close = (SECONDS_PER_HOUR * self.end_times[location]) as i64;
            model.set_cumul_range(time, RouteIndex::Node(location), open, close);
        }

        // Vehicle shifts: departure is pinned, the return is a window.
        for vehicle in 0..num_vehicles {
            let departure = (SECONDS_PER_HOUR * self.departure_times[vehicle]) as i64;
            let comeback = (SECONDS_PER_HOUR * self.return_times[vehicle]) as i64;
            model.pin_cumul(time, RouteIndex::Start(vehicle), departure);
            model.set_cumul_range(time, RouteIndex::End(vehicle), departure, comeback);
        }

        // Arcs the matrix rules out are removed outright.
        for from in 0..num_locations {
            for to in 0..num_locations {
                if self.matrix[from][to] == 0 {
                    model.forbid_arc(from, to);
                }
            }
        }

        for group in &self.groups {
            model.add_soft_same_vehicle(group.clone(), SOFT_GROUP_PENALTY);
        }

        for vehicle in 0..num_vehicles {
            let class = VehicleClass::of(vehicle, self.first_vendor_index);
            let (lo, hi) =
                end_load_forbidden_interval(class, self.allow_drop, self.min_weights[vehicle]);
            model.remove_cumul_interval(capacity, RouteIndex::End(vehicle), lo, hi);
        }

        let started = Instant::now();
        let params = SearchParams {
            time_limit: Some(SOLVE_BUDGET),
        };
        let Some(solution) = model.solve(&params) else {
            if started.elapsed() >= SOLVE_BUDGET {
                tracing::warn!(
                    num_locations,
                    num_vehicles,
                    "routing budget exhausted without a solution"
                );
            } else {
                tracing::info!(num_locations, num_vehicles, "routing model infeasible");
            }
            return Err(SolveError::Infeasible);
        };
        tracing::debug!(objective = solution.objective, "routing solved");

        let vehicles = (0..num_vehicles)
            .map(|vehicle| VehicleRoute {
                vehicle_no: vehicle,
                departure_time: self.departure_times[vehicle],
                return_time: self.return_times[vehicle],
                capacity: self.vehicle_capacities[vehicle],
                stops: solution
                    .vehicle_route(vehicle)
                    .iter()
                    .map(|stop| RouteStop {
                        location_no: stop.node,
                        lat: self.lats[stop.node],
                        lon: self.lons[stop.node],
                        load: stop.cumul(capacity).value as f64 / LOAD_SCALE,
                        distance: stop.cumul(distance).value,
                        time_open: stop.cumul(time).min,
                        time_leave: stop.cumul(time).max,
                    })
                    .collect(),
            })
            .collect();

        Ok(VrpSolution {
            total: solution.objective,
            vehicles,
        })
    }
}

// ----------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------

/// The `/vrp` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct VrpRequest {
    pub allow_drop: i64,
    pub departure_times: Vec<f64>,
    pub vehicle_capacities: Vec<i64>,
    pub vehicle_costs: Vec<i64>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub departure_depots: Vec<usize>,
    pub return_depots: Vec<usize>,
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
    pub return_times: Vec<f64>,
    pub demands: Vec<i64>,
    pub matrix: Vec<Vec<i64>>,
    pub groups: Vec<Vec<usize>>,
    pub velocities: Vec<f64>,
    pub horizon: i64,
    pub loadings: Vec<i64>,
    pub unloadings: Vec<i64>,
    pub min_weights: Vec<i64>,
    pub first_vendor_index: usize,
}

impl From<VrpRequest> for VrpProblem {
    fn from(request: VrpRequest) -> Self {
        Self {
            allow_drop: request.allow_drop > 0,
            departure_times: request.departure_times,
            vehicle_capacities: request.vehicle_capacities,
            vehicle_costs: request.vehicle_costs,
            lats: request.lats,
            lons: request.lons,
            departure_depots: request.departure_depots,
            return_depots: request.return_depots,
            start_times: request.start_times,
            end_times: request.end_times,
            return_times: request.return_times,
            demands: request.demands,
            matrix: request.matrix,
            groups: request.groups,
            velocities: request.velocities,
            horizon: request.horizon,
            loadings: request.loadings,
            unloadings: request.unloadings,
            min_weights: request.min_weights,
            first_vendor_index: request.first_vendor_index,
        }
    }
}
