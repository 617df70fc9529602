//! Radial color sense - area-weighted color of touching circles per angular sector.
//!
//! The full circle around the heading is cut into `N` equal sectors, sector 0
//! centered straight ahead and the rest following counter-clockwise. Each
//! touching disc contributes its color weighted by the exact area it covers
//! inside each sector's wedge. The part of each sector that sticks out of the
//! petri dish is sensed as pure red.

use std::f32::consts::{PI, TAU};

use geo::Coord;
use ndarray::Array1;

use super::super::contacts::SenseProfile;
use super::super::geometric_utils::{
    circle_area, circle_triangle_intersection_area, circle_wedge_overlap_area, heading_vector,
    normalize_angle, normalize_angle_positive, to_local,
};
use super::super::params::SECTOR_CHANNELS;
use super::Organism;
use super::sense::{Sense, Surroundings};

/// Angular pad so discs grazing a sector boundary still reach that sector.
const SPAN_PAD: f32 = 1e-4;

/// Outside-dish area below this share of a sector is rounding noise.
const OUTSIDE_TOLERANCE: f32 = 1e-4;

/// Radial sensor array producing `sector_count * 3` inputs (RGB per sector).
#[derive(Debug, Clone)]
pub struct ColorSectors {
    sector_count: usize,
    sector_width: f32,
    /// Per sector, one or two `[start, end]` intervals inside `[-π, π]`.
    segments: Vec<Vec<(f32, f32)>>,
}

/// Per-sector accumulators.
#[derive(Debug, Clone)]
struct SectorSums {
    colors: Vec<[f32; 3]>,
    weights: Vec<f32>,
}

impl SectorSums {
    fn new(n: usize) -> Self {
        Self {
            colors: vec![[0.0; 3]; n],
            weights: vec![0.0; n],
        }
    }

    fn add(&mut self, sector: usize, color: [f32; 3], area: f32) {
        for (sum, c) in self.colors[sector].iter_mut().zip(color) {
            *sum += c * area;
        }
        self.weights[sector] += area;
    }
}

impl ColorSectors {
    /// Creates a sensor array with `sector_count` sectors (at least 3).
    pub fn new(sector_count: usize) -> Self {
        let sector_count = sector_count.max(3);
        let sector_width = TAU / sector_count as f32;
        let half = 0.5 * sector_width;
        let segments = (0..sector_count)
            .map(|i| {
                let start = normalize_angle(-half + i as f32 * sector_width);
                let end = normalize_angle(-half + (i + 1) as f32 * sector_width);
                if end < start {
                    vec![(start, PI), (-PI, end)]
                } else {
                    vec![(start, end)]
                }
            })
            .collect();
        Self {
            sector_count,
            sector_width,
            segments,
        }
    }

    /// Number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sector_count
    }

    /// Angular width of one sector.
    pub fn sector_width(&self) -> f32 {
        self.sector_width
    }

    /// The precomputed `[start, end]` intervals of a sector.
    pub fn segments(&self, sector: usize) -> &[(f32, f32)] {
        &self.segments[sector]
    }

    /// Sector containing a heading-relative angle.
    pub fn sector_of(&self, angle: f32) -> usize {
        let shifted = normalize_angle_positive(angle + 0.5 * self.sector_width);
        ((shifted / self.sector_width) as usize).min(self.sector_count - 1)
    }

    /// Area of a disc (in the local frame) inside one sector's wedge.
    pub fn overlap_in_sector(&self, center: Coord<f32>, radius: f32, sector: usize) -> f32 {
        self.segments[sector]
            .iter()
            .map(|&(start, end)| circle_wedge_overlap_area(center, radius, start, end))
            .sum()
    }

    /// Senses an organism at `pos` facing `heading` with the given `radius`.
    ///
    /// `neighbors` are the discs currently touching it; `petri_radius`, when
    /// given, adds the outside-dish signal.
    pub fn sense_at(
        &self,
        pos: Coord<f32>,
        heading: f32,
        radius: f32,
        neighbors: impl IntoIterator<Item = SenseProfile>,
        petri_radius: Option<f32>,
    ) -> Array1<f32> {
        let mut sums = SectorSums::new(self.sector_count);
        for neighbor in neighbors {
            self.accumulate_neighbor(&neighbor, pos, heading, &mut sums);
        }
        if let Some(petri_radius) = petri_radius {
            self.accumulate_outside_dish(pos, heading, radius, petri_radius, &mut sums);
        }
        self.normalize(&sums, circle_area(radius))
    }

    fn accumulate_neighbor(
        &self,
        neighbor: &SenseProfile,
        pos: Coord<f32>,
        heading: f32,
        sums: &mut SectorSums,
    ) {
        let local = to_local(neighbor.pos - pos, heading);
        let radius = neighbor.radius;
        let dist2 = local.x * local.x + local.y * local.y;

        let mut visit = |sector: usize| {
            let area = self.overlap_in_sector(local, radius, sector);
            if area > 0.0 {
                sums.add(sector, neighbor.color, area);
            }
        };

        if dist2 <= radius * radius {
            // the disc covers the organism's center, so it reaches every sector
            (0..self.sector_count).for_each(&mut visit);
            return;
        }

        let dist = dist2.sqrt();
        let half_span = (radius / dist).clamp(0.0, 1.0).asin();
        let center_angle = local.y.atan2(local.x);
        let first = self.sector_of(center_angle - half_span - SPAN_PAD);
        let last = self.sector_of(center_angle + half_span + SPAN_PAD);

        let mut sector = first;
        loop {
            visit(sector);
            if sector == last {
                break;
            }
            sector = (sector + 1) % self.sector_count;
        }
    }

    fn accumulate_outside_dish(
        &self,
        pos: Coord<f32>,
        heading: f32,
        radius: f32,
        petri_radius: f32,
        sums: &mut SectorSums,
    ) {
        if petri_radius <= 0.0 || radius <= 0.0 {
            return;
        }
        let dish_center = to_local(Coord { x: -pos.x, y: -pos.y }, heading);

        for sector in 0..self.sector_count {
            let mut outside = 0.0;
            for &(start, end) in &self.segments[sector] {
                let span = end - start;
                if span <= 0.0 {
                    continue;
                }
                // stretch the rays so the triangle has the circular sector's area
                let sin_span = span.sin();
                let ray_length = if sin_span.abs() > 1e-6 {
                    radius * (span / sin_span).sqrt()
                } else {
                    radius
                };
                let triangle = [
                    Coord { x: 0.0, y: 0.0 },
                    heading_vector(start) * ray_length,
                    heading_vector(end) * ray_length,
                ];
                let segment_area = 0.5 * radius * radius * span;
                let inside = circle_triangle_intersection_area(&triangle, dish_center, petri_radius)
                    .clamp(0.0, segment_area);
                let lost = segment_area - inside;
                if lost > OUTSIDE_TOLERANCE * segment_area {
                    outside += lost;
                }
            }
            if outside > 0.0 {
                sums.add(sector, [1.0, 0.0, 0.0], outside);
            }
        }
    }

    /// `sum / (sum + organism_area / N)` per channel; empty sectors stay at 0.
    fn normalize(&self, sums: &SectorSums, organism_area: f32) -> Array1<f32> {
        let baseline = organism_area / self.sector_count as f32;
        let mut inputs = Array1::zeros(self.sector_count * SECTOR_CHANNELS);
        for sector in 0..self.sector_count {
            if sums.weights[sector] <= 0.0 {
                continue;
            }
            for (channel, &sum) in sums.colors[sector].iter().enumerate() {
                let denom = sum + baseline;
                if denom > 0.0 {
                    inputs[sector * SECTOR_CHANNELS + channel] = sum / denom;
                }
            }
        }
        inputs
    }
}

impl Sense for ColorSectors {
    fn sense(&self, organism: &Organism, surroundings: &Surroundings<'_>) -> Array1<f32> {
        self.sense_at(
            organism.pos,
            organism.rot,
            organism.radius,
            surroundings.touching(organism),
            Some(surroundings.petri_radius),
        )
    }

    fn input_size(&self) -> usize {
        self.sector_count * SECTOR_CHANNELS
    }

    fn name(&self) -> &str {
        "ColorSectors"
    }
}
