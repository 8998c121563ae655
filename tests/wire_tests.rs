//! Wire-format compatibility: request bodies parse and response bodies
//! serialize with the field names the HTTP surface expects.

mod fixtures;

use dispatch_planner::binpack::{KnapsackProblem, KnapsackResponse, RectPackProblem, RectPackResponse};
use dispatch_planner::error::{ErrorBody, SolveError};
use dispatch_planner::fleet::{FleetSizeProblem, FleetSizeRequest, FleetSizeResponse};
use dispatch_planner::mincost::{MinCostFlowProblem, MinCostFlowRequest};
use dispatch_planner::vrp::{VrpProblem, VrpRequest};
use serde_json::json;

use fixtures::chicago_locations::{DEPOTS, STOPS};

#[test]
fn vrp_request_round_trips_through_the_solver() {
    let depot = DEPOTS[0].coords();
    let stop_a = STOPS[0].coords();
    let stop_b = STOPS[1].coords();

    let body = json!({
        "allow_drop": 0,
        "departure_times": [8.0],
        "vehicle_capacities": [5000],
        "vehicle_costs": [100],
        "lats": [depot.0, stop_a.0, stop_b.0],
        "lons": [depot.1, stop_a.1, stop_b.1],
        "departure_depots": [0],
        "return_depots": [0],
        "start_times": [0.0, 0.0, 0.0],
        "end_times": [24.0, 24.0, 24.0],
        "return_times": [18.0],
        "demands": [0, 1000, 1000],
        "matrix": [[1, 1, 1], [1, 1, 1], [1, 1, 1]],
        "groups": [[1, 2]],
        "velocities": [40.0],
        "horizon": 86400,
        "loadings": [0, 300, 300],
        "unloadings": [0, 120, 120],
        "min_weights": [0],
        "first_vendor_index": 0
    });

    let request: VrpRequest = serde_json::from_value(body).expect("request parses");
    let problem = VrpProblem::from(request);
    let solution = problem.solve().expect("feasible");

    let response = serde_json::to_value(&solution).expect("serializes");
    assert!(response["total"].is_i64());
    let result = response["result"].as_array().expect("result array");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0]["vehicle_no"], 0);
    let routes = result[0]["routes"].as_array().expect("routes array");
    let first = &routes[0];
    for key in [
        "location_no",
        "lat",
        "lon",
        "load",
        "distance",
        "time_open",
        "time_leave",
    ] {
        assert!(first.get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn fleet_request_and_response_shapes() {
    let body = json!({
        "array": [{ "list_weights": [5, 3], "costs": [10, 5] }],
        "demand": 10
    });
    let request: FleetSizeRequest = serde_json::from_value(body).expect("request parses");
    let problem = FleetSizeProblem::from(request);
    let choices = problem.solve().expect("feasible");

    let response = serde_json::to_value(FleetSizeResponse { data: choices }).expect("serializes");
    let data = response["data"].as_array().expect("data array");
    assert!(data[0]["total_cost"].is_i64());
    assert!(data[0]["list_result"].is_array());
}

#[test]
fn knapsack_request_and_response_shapes() {
    let body = json!({
        "profits": [10, 20, 30],
        "weights": [[1, 1, 1]],
        "capacities": [2]
    });
    let problem: KnapsackProblem = serde_json::from_value(body).expect("request parses");
    let selection = problem.solve().expect("valid");

    let response = serde_json::to_value(KnapsackResponse::from(selection)).expect("serializes");
    assert_eq!(response["packed_items"], json!([1, 2]));
    assert_eq!(response["total_profit"], 50);
    assert_eq!(response["total_weight"], 2);
}

#[test]
fn rectangle_request_and_response_shapes() {
    let body = json!({
        "rectangles": [
            { "width": 4, "height": 2 },
            { "width": 50, "height": 50 }
        ],
        "bins": [{ "width": 10, "height": 10 }]
    });
    let problem: RectPackProblem = serde_json::from_value(body).expect("request parses");
    let packing = problem.pack();
    assert_eq!(packing.unplaced, vec![1]);

    let response = serde_json::to_value(RectPackResponse::from(packing)).expect("serializes");
    let placed = response["packing"].as_array().expect("packing array");
    assert_eq!(placed.len(), 1);
    for key in ["bin", "rect", "x", "y", "w", "h"] {
        assert!(placed[0].get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn min_cost_request_and_response_shapes() {
    let body = json!({
        "starts": [0],
        "ends": [1],
        "costs": [5],
        "supplies": [1, -1],
        "source": 0,
        "sink": 1
    });
    let request: MinCostFlowRequest = serde_json::from_value(body).expect("request parses");
    let problem = MinCostFlowProblem::from(request);
    let solution = problem.solve().expect("feasible");

    let response = serde_json::to_value(&solution).expect("serializes");
    assert_eq!(response["total"], 5);
    let arcs = response["arcs"].as_array().expect("arcs array");
    assert_eq!(arcs[0]["tail"], 0);
    assert_eq!(arcs[0]["head"], 1);
    assert_eq!(arcs[0]["cost"], 5);
}

#[test]
fn infeasible_solves_share_the_error_envelope() {
    let body = ErrorBody::from(&SolveError::Infeasible);
    let value = serde_json::to_value(&body).expect("serializes");
    assert_eq!(
        value,
        json!({
            "status": 400,
            "error": "bad request",
            "message": "No solution found."
        })
    );
}
