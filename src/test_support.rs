//! Shared fixtures for unit tests.
//!
//! drone1 (X100, SkyOps): event1 Fog/Komotini/Landing, event3 Heavy Rain/Snow/Athens/Cruise
//! drone2 (X100, AeroFleet): event2 Fog/Komotini/Takeoff
//! drone3 (Falcon, SkyOps): event4 Heavy Rain/Snow/Athens/Landing, event5 Heavy Rain/Snow/Thessaloniki/Landing
//! drone4 (Hawk, AeroFleet): no crash events

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::store::Graph;

pub const ONTO: &str = "http://ubt/crashedDrones#";

pub const FIXTURE_TTL: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix onto: <http://ubt/crashedDrones#> .

onto:drone1 rdf:type onto:Drone ;
    onto:model "X100" ;
    onto:operator "SkyOps" ;
    onto:involvedInCrash onto:event1 , onto:event3 .

onto:drone2 rdf:type onto:Drone ;
    onto:model "X100" ;
    onto:operator "AeroFleet" ;
    onto:involvedInCrash onto:event2 .

onto:drone3 rdf:type onto:Drone ;
    onto:model "Falcon" ;
    onto:operator "SkyOps" ;
    onto:involvedInCrash onto:event4 , onto:event5 .

onto:drone4 rdf:type onto:Drone ;
    onto:model "Hawk" ;
    onto:operator "AeroFleet" .

onto:event1 rdf:type onto:CrashEvent ;
    onto:date "2021-03-14" ;
    onto:location "Komotini, Greece" ;
    onto:phase "Landing" ;
    onto:weather "Fog" .

onto:event2 rdf:type onto:CrashEvent ;
    onto:date "2021-07-02" ;
    onto:location "Komotini, Greece" ;
    onto:phase "Takeoff" ;
    onto:weather "Fog" .

onto:event3 rdf:type onto:CrashEvent ;
    onto:date "2022-01-20" ;
    onto:location "Athens, Greece" ;
    onto:phase "Cruise" ;
    onto:weather "Heavy Rain/Snow" .

onto:event4 rdf:type onto:CrashEvent ;
    onto:date "2022-02-11" ;
    onto:location "Athens, Greece" ;
    onto:phase "Landing" ;
    onto:weather "Heavy Rain/Snow" .

onto:event5 rdf:type onto:CrashEvent ;
    onto:date "2022-05-30" ;
    onto:location "Thessaloniki, Greece" ;
    onto:phase "Landing" ;
    onto:weather "Heavy Rain/Snow" .
"#;

pub fn fixture_graph() -> Graph {
    Graph::from_turtle(FIXTURE_TTL).unwrap()
}

pub fn drone(local: &str) -> String {
    format!("{}{}", ONTO, local)
}

/// Serve the fixture on an ephemeral port and return its base URL.
///
/// `/data` answers the fixture, `/broken` invalid Turtle, anything else 404.
pub async fn spawn_endpoint() -> String {
    let app = Router::new()
        .route("/data", get(|| async { FIXTURE_TTL }))
        .route("/broken", get(|| async { "onto:drone1 a onto:Drone ." }))
        .fallback(|| async { StatusCode::NOT_FOUND });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A local port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
