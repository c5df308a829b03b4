// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Elevation profiles of [Routes](Route).
//!
//! A route is resampled into a fixed number of equally-spaced points, elevations
//! for these points are fetched from an [ElevationSource], and then summarized
//! into [ElevationStats].

use crate::{interpolate, Coordinate, Route};

/// Recommended number of points of an [ElevationProfile].
pub const DEFAULT_SAMPLE_COUNT: usize = 70;

/// A position at a specific distance along a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Distance from the start of the route, in meters.
    pub distance: f64,
    pub coordinate: Coordinate,
}

/// A [Sample] with a known elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationPoint {
    pub distance: f64,
    pub elevation: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Summary of an elevation profile, all in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElevationStats {
    /// Sum of all climbs between consecutive points.
    pub gain: f64,

    /// Sum of all descents between consecutive points, as a positive number.
    pub loss: f64,

    pub min: f64,
    pub max: f64,
}

impl ElevationStats {
    /// Computes statistics over a sequence of elevations.
    /// All fields are zero for an empty sequence.
    pub fn from_elevations(elevations: &[f64]) -> Self {
        let Some(&first) = elevations.first() else {
            return Self::default();
        };

        let mut stats = Self {
            gain: 0.0,
            loss: 0.0,
            min: first,
            max: first,
        };

        for pair in elevations.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                stats.gain += delta;
            } else {
                stats.loss -= delta;
            }
        }

        for &elevation in elevations {
            stats.min = stats.min.min(elevation);
            stats.max = stats.max.max(elevation);
        }

        stats
    }
}

/// Elevation along a [Route].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElevationProfile {
    pub points: Vec<ElevationPoint>,
    pub stats: ElevationStats,
}

impl ElevationProfile {
    /// Zips [Samples](Sample) with their elevations.
    /// Extra elements of the longer slice are ignored.
    pub fn from_samples(samples: &[Sample], elevations: &[f64]) -> Self {
        let points = samples
            .iter()
            .zip(elevations)
            .map(|(sample, &elevation)| ElevationPoint {
                distance: sample.distance,
                elevation,
                lat: sample.coordinate.lat,
                lon: sample.coordinate.lon,
            })
            .collect::<Vec<_>>();

        let elevations = points.iter().map(|p| p.elevation).collect::<Vec<_>>();
        Self {
            points,
            stats: ElevationStats::from_elevations(&elevations),
        }
    }
}

/// Resamples a polyline into `count` points spaced equally along its length.
///
/// The first sample is the first point of the polyline, and the last sample is the last point.
/// The i-th sample has `distance == i * length / (count - 1)`; its position is
/// linearly interpolated between the two surrounding vertices.
///
/// A polyline with a single point produces a single sample at distance 0,
/// and an empty polyline produces no samples.
pub fn resample(points: &[Coordinate], count: usize) -> Vec<Sample> {
    match (points, count) {
        ([], _) | (_, 0) => return Vec::new(),
        ([only], _) | ([only, ..], 1) => {
            return vec![Sample {
                distance: 0.0,
                coordinate: *only,
            }]
        }
        _ => {}
    }

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0);
    for pair in points.windows(2) {
        let so_far = cumulative[cumulative.len() - 1];
        cumulative.push(so_far + pair[0].distance_to(&pair[1]));
    }

    let last = points.len() - 1;
    let step = cumulative[last] / (count - 1) as f64;
    let mut leg = 0;
    let mut samples = Vec::with_capacity(count);

    for i in 0..count {
        let distance = i as f64 * step;

        let coordinate = if i == count - 1 {
            points[last]
        } else {
            while leg + 1 < last && cumulative[leg + 1] < distance {
                leg += 1;
            }

            let leg_length = cumulative[leg + 1] - cumulative[leg];
            let t = if leg_length > 0.0 {
                ((distance - cumulative[leg]) / leg_length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            interpolate(points[leg], points[leg + 1], t)
        };

        samples.push(Sample {
            distance,
            coordinate,
        });
    }

    samples
}

/// External provider of elevation data, e.g. a web service.
pub trait ElevationSource {
    type Error: std::error::Error + 'static;

    /// Returns elevations (in meters) of the provided positions,
    /// in the same order and of the same length.
    fn fetch_elevations(&self, coordinates: &[Coordinate]) -> Result<Vec<f64>, Self::Error>;
}

/// Error conditions which may occur during [build_profile].
#[derive(Debug, thiserror::Error)]
pub enum ElevationError<E: std::error::Error + 'static> {
    #[error("elevation source: {0}")]
    Source(#[source] E),

    #[error("elevation source returned {got} elevations, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Builds an [ElevationProfile] of a route, with `count` samples.
///
/// The route itself is never affected by failures - callers should
/// simply go on without a profile.
pub fn build_profile<S: ElevationSource + ?Sized>(
    route: &Route,
    source: &S,
    count: usize,
) -> Result<ElevationProfile, ElevationError<S::Error>> {
    let samples = resample(&route.coordinates(), count);
    if samples.is_empty() {
        return Ok(ElevationProfile::default());
    }

    let coordinates = samples.iter().map(|s| s.coordinate).collect::<Vec<_>>();
    let elevations = source.fetch_elevations(&coordinates).map_err(|e| {
        log::warn!("failed to fetch elevations: {e}");
        ElevationError::Source(e)
    })?;

    if elevations.len() != samples.len() {
        log::warn!(
            "elevation source returned {} elevations for {} points",
            elevations.len(),
            samples.len()
        );
        return Err(ElevationError::LengthMismatch {
            expected: samples.len(),
            got: elevations.len(),
        });
    }

    Ok(ElevationProfile::from_samples(&samples, &elevations))
}
