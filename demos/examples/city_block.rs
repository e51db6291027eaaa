// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small city block: load config, fill a store, run a few queries.
//!
//! Shows:
//! - config discovery with fallback to defaults,
//! - `tracing-subscriber` set up from the configured log level,
//! - records put from JSON and from typed builders,
//! - prefilter-only lookups next to exact queries.
//!
//! Run:
//! - `cargo run -p strata_demos --example city_block`
//! - `RUST_LOG=strata_store=trace cargo run -p strata_demos --example city_block`

use kurbo::{Point, Rect};
use serde_json::json;
use strata_geometry::{Rotation, ShapeSpec};
use strata_store::{ConfigError, Query, QueryHit, Record, Store, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn load_configuration() -> StoreConfig {
    match StoreConfig::discover() {
        Ok(cfg) => cfg,
        Err(err) => {
            match &err {
                ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                    warn!(path = %path.display(), error = %err, "config not loaded, using defaults");
                }
                ConfigError::Context { .. } => {
                    warn!(error = %err, "config not loaded, using defaults");
                }
            }
            StoreConfig::default()
        }
    }
}

fn init_logging(config: &StoreConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

fn describe(label: &str, hits: &[QueryHit<'_>]) {
    println!("{label}:");
    for hit in hits {
        let name = hit
            .record
            .attribute("name")
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        match &hit.details {
            Some(details) if !details.points.is_empty() => {
                let pts: Vec<String> = details
                    .points
                    .iter()
                    .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
                    .collect();
                println!("  #{} {name} crossing at {}", hit.record.id.unwrap_or(0), pts.join(", "));
            }
            _ => println!("  #{} {name}", hit.record.id.unwrap_or(0)),
        }
    }
}

fn main() {
    let config = load_configuration();
    init_logging(&config);
    info!(first_id = config.first_id, cell_size = config.index.cell_size, "config loaded");

    let mut store = Store::from_config(&config);

    let records = [
        json!({"type": "rect", "x": 0, "y": 0, "w": 40, "h": 30, "name": "town hall", "kind": "building"}),
        json!({"type": "rect", "x": 60, "y": 0, "w": 25, "h": 25, "rot": 0.3, "name": "library", "kind": "building"}),
        json!({"type": "circle", "x": 50, "y": 60, "r": 12, "name": "fountain", "kind": "water"}),
        json!({"type": "point", "x": 20, "y": 50, "name": "oak", "kind": "tree"}),
        json!({"type": "point", "x": 75, "y": 55, "name": "elm", "kind": "tree"}),
        json!({
            "type": "lineseg", "p1": {"x": -10, "y": 40}, "p2": {"x": 110, "y": 40},
            "w": 6, "encloseEnds": true, "name": "main street", "kind": "road",
        }),
    ];
    for rec in records {
        if let Err(err) = store.put_json(rec) {
            warn!(error = %err, "record rejected");
        }
    }

    // The hedge is built with the typed API instead of JSON.
    let hedge = Record::new(ShapeSpec::polygon([(90.0, 70.0), (110.0, 70.0), (100.0, 90.0)]))
        .with_rotation(Rotation::about_center(0.1))
        .with_attribute("name", "hedge")
        .with_attribute("kind", "plant");
    if let Err(err) = store.put(hedge) {
        warn!(error = %err, "record rejected");
    }

    // A record the store refuses: polygons need three vertices.
    let broken = json!({"type": "polygon", "points": [{"x": 0, "y": 0}, {"x": 1, "y": 1}]});
    if let Err(err) = store.put_json(broken) {
        info!(error = %err, "broken record refused as expected");
    }

    println!("{} records stored", store.len());
    println!(
        "prefilter near (45, 45): {:?}",
        store.get_by_rect(Rect::new(40.0, 40.0, 50.0, 50.0))
    );
    println!("prefilter at the oak: {:?}", store.get_by_point(Point::new(20.0, 50.0)));

    let run = |label: &str, query: Query| match store.query(&query) {
        Ok(hits) => describe(label, &hits),
        Err(err) => warn!(error = %err, "query failed"),
    };

    run(
        "crossed by a north-south path at x = 50",
        Query::new().intersecting(ShapeSpec::segment((50.0, -5.0), (50.0, 100.0))),
    );
    run(
        "within 30 of the fountain",
        Query::new().intersecting(ShapeSpec::Circle {
            x: 50.0,
            y: 60.0,
            r: 30.0,
        }),
    );
    run("trees", Query::new().filter("kind", "tree"));

    match Query::from_json(json!({
        "intersecting": {"type": "rect", "x": 55, "y": -5, "w": 40, "h": 40},
        "kind": "building",
    })) {
        Ok(query) => run("buildings in the east lot", query),
        Err(err) => warn!(error = %err, "bad criteria"),
    }
}
