// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Surface distance on the WGS-84 ellipsoid and fixed-precision rounding.

use geo::{Distance, Geodesic, Point};

/// Geodesic distance between two (latitude, longitude) pairs in meters.
pub fn distance_meters(from: (f64, f64), to: (f64, f64)) -> f64 {
    // geo points are (x, y) = (lon, lat)
    let a = Point::new(from.1, from.0);
    let b = Point::new(to.1, to.0);
    Geodesic.distance(a, b)
}

/// Geodesic distance between two (latitude, longitude) pairs in kilometers.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    distance_meters(from, to) / 1000.0
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
