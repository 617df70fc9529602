//! Geometric utility functions for circles, wedges and heading frames.
//!
//! Areas are exact: a polygon is intersected with a circle by splitting each
//! edge at its circle crossings and summing signed triangle areas for chord
//! pieces and circular sector areas for pieces outside the circle.

use std::f32::consts::{PI, TAU};

use geo::Coord;

const EPS: f32 = 1e-6;

#[inline]
fn cross(a: Coord<f32>, b: Coord<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn dot(a: Coord<f32>, b: Coord<f32>) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Area of a circle of the given radius.
#[inline]
pub fn circle_area(radius: f32) -> f32 {
    PI * radius * radius
}

/// Radius of a circle with the given area.
#[inline]
pub fn radius_from_area(area: f32) -> f32 {
    (area.max(0.0) / PI).sqrt()
}

/// Wraps an angle into `[-π, π]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle_positive(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Unit vector pointing along `angle`.
#[inline]
pub fn heading_vector(angle: f32) -> Coord<f32> {
    Coord {
        x: angle.cos(),
        y: angle.sin(),
    }
}

/// Rotates a world-space offset into a frame whose +x axis is the heading.
#[inline]
pub fn to_local(offset: Coord<f32>, heading: f32) -> Coord<f32> {
    let (sin_h, cos_h) = heading.sin_cos();
    Coord {
        x: cos_h * offset.x + sin_h * offset.y,
        y: -sin_h * offset.x + cos_h * offset.y,
    }
}

/// Signed area of `circle ∩ triangle(origin, a, b)` for a circle centered at the origin.
fn edge_circle_area(a: Coord<f32>, b: Coord<f32>, radius: f32) -> f32 {
    let r2 = radius * radius;
    let len_a2 = dot(a, a);
    if len_a2 < EPS && dot(b, b) < EPS {
        return 0.0;
    }

    // a, up to two crossings, b; kept sorted by segment parameter
    let mut points: [(f32, Coord<f32>); 4] = [(0.0, a); 4];
    let mut count = 1;

    let d = b - a;
    let qa = dot(d, d);
    let qb = 2.0 * dot(a, d);
    let qc = len_a2 - r2;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc >= 0.0 && qa > EPS {
        let sqrt_disc = disc.sqrt();
        let t1 = (-qb - sqrt_disc) / (2.0 * qa);
        let t2 = (-qb + sqrt_disc) / (2.0 * qa);
        if t1 > EPS && t1 < 1.0 - EPS {
            points[count] = (t1, a + d * t1);
            count += 1;
        }
        if t2 > EPS && t2 < 1.0 - EPS && (t2 - t1).abs() > EPS {
            points[count] = (t2, a + d * t2);
            count += 1;
        }
    }
    points[count] = (1.0, b);
    count += 1;
    points[..count].sort_by(|p, q| p.0.total_cmp(&q.0));

    points[..count]
        .windows(2)
        .map(|pair| {
            let (p, q) = (pair[0].1, pair[1].1);
            let mid = (p + q) * 0.5;
            if dot(mid, mid) <= r2 + EPS {
                0.5 * cross(p, q)
            } else {
                0.5 * r2 * cross(p, q).atan2(dot(p, q))
            }
        })
        .sum()
}

/// Area of the intersection of a triangle and a circle.
///
/// The result is signed by the triangle's winding (positive when counter-clockwise).
pub fn circle_triangle_intersection_area(
    triangle: &[Coord<f32>; 3],
    center: Coord<f32>,
    radius: f32,
) -> f32 {
    (0..3)
        .map(|i| {
            let a = triangle[i] - center;
            let b = triangle[(i + 1) % 3] - center;
            edge_circle_area(a, b, radius)
        })
        .sum()
}

/// Area of a disc lying inside the wedge `[start, end]` whose apex is the origin.
///
/// `end - start` must be below π. The wedge is closed by a triangle far
/// enough out to contain the whole disc.
pub fn circle_wedge_overlap_area(center: Coord<f32>, radius: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 0.0;
    }
    let dist = dot(center, center).sqrt();
    let half_cos = (0.5 * span).cos().max(1e-3);
    let ray_length = (dist + radius + 1.0) / half_cos;

    let triangle = [
        Coord { x: 0.0, y: 0.0 },
        heading_vector(start) * ray_length,
        heading_vector(end) * ray_length,
    ];
    circle_triangle_intersection_area(&triangle, center, radius).max(0.0)
}

/// Area of the lens shared by two circles whose centers are `distance` apart.
pub fn circle_overlap_area(r1: f32, r2: f32, distance: f32) -> f32 {
    if distance >= r1 + r2 {
        return 0.0;
    }
    if distance <= (r1 - r2).abs() {
        return circle_area(r1.min(r2));
    }

    let (r1_sq, r2_sq, d_sq) = (r1 * r1, r2 * r2, distance * distance);
    let alpha = ((d_sq + r1_sq - r2_sq) / (2.0 * distance * r1)).clamp(-1.0, 1.0);
    let beta = ((d_sq + r2_sq - r1_sq) / (2.0 * distance * r2)).clamp(-1.0, 1.0);
    let kite = 0.5
        * ((r1 + r2 - distance) * (r1 - r2 + distance) * (-r1 + r2 + distance) * (r1 + r2 + distance))
            .max(0.0)
            .sqrt();
    r1_sq * alpha.acos() + r2_sq * beta.acos() - kite
}
