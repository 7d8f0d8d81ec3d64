/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds a 2D Delaunay triangulation of surface table coordinates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # delaunay
//!
//! Incremental Bowyer-Watson insertion with a single vertex at infinity.
//!
//! Every hull edge is closed off by a "ghost" triangle joining it to the
//! infinite vertex, so the mesh is always a closed surface and points
//! outside the current hull are inserted with the same cavity logic as
//! interior points. The union of the real triangles is exactly the convex
//! hull of the inserted points.

use std::collections::{HashMap, HashSet};

/// Vertex index of the point at infinity.
const GHOST: usize = usize::MAX;

/// Marker for a missing neighbour.
const NONE: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Tri {
    /// Vertices in counter-clockwise order.
    v: [usize; 3],
    /// `adj[i]` is the neighbour across the edge opposite `v[i]`.
    adj: [usize; 3],
    alive: bool,
}

impl Tri {
    #[inline]
    fn ghost_slot(&self) -> Option<usize> {
        self.v.iter().position(|&x| x == GHOST)
    }

    /// Edge opposite `v[i]`, oriented counter-clockwise.
    #[inline]
    fn edge(&self, i: usize) -> (usize, usize) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
pub(crate) fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive when `d` lies strictly inside the circumcircle of counter-clockwise `(a, b, c)`.
#[inline]
fn incircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy) + clift * (adx * bdy - bdx * ady)
}

/// True when `p` lies on the open segment `(a, b)`, assuming collinearity.
#[inline]
fn strictly_between(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    let dot_a = (p[0] - a[0]) * (b[0] - a[0]) + (p[1] - a[1]) * (b[1] - a[1]);
    let dot_b = (p[0] - b[0]) * (a[0] - b[0]) + (p[1] - b[1]) * (a[1] - b[1]);
    dot_a > 0.0 && dot_b > 0.0
}

/// Result of triangulating a point set.
#[derive(Debug, Clone)]
pub(crate) struct Triangulation {
    /// Counter-clockwise vertex triples indexing the input points.
    pub triangles: Vec<[usize; 3]>,

    /// Points that could not be inserted because they coincide with an
    /// existing vertex or sit in a numerically ambiguous position.
    pub skipped: Vec<usize>,
}

/// Reasons a point set cannot be triangulated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TriangulationFailure {
    TooFewPoints,
    Collinear,
}

struct Mesh<'a> {
    pts: &'a [[f64; 2]],
    tris: Vec<Tri>,
    hint: usize,
}

impl<'a> Mesh<'a> {
    #[inline]
    fn p(&self, i: usize) -> [f64; 2] {
        self.pts[i]
    }

    /// Seeds the mesh with one real triangle and its three ghosts.
    fn seed(pts: &'a [[f64; 2]], i0: usize, i1: usize, i2: usize) -> Self {
        let v = [i0, i1, i2];
        let mut tris = Vec::with_capacity(pts.len() * 4);
        tris.push(Tri {
            v,
            adj: [1, 2, 3],
            alive: true,
        });
        for k in 0..3 {
            let (s, t) = (v[(k + 1) % 3], v[(k + 2) % 3]);
            tris.push(Tri {
                v: [t, s, GHOST],
                adj: [1 + (k + 2) % 3, 1 + (k + 1) % 3, 0],
                alive: true,
            });
        }
        Mesh { pts, tris, hint: 0 }
    }

    /// Whether `p` falls inside the circumcircle of `t`.
    ///
    /// For a ghost triangle the "circle" is the open half-plane beyond its
    /// hull edge, plus the open hull edge itself.
    fn in_circle(&self, t: usize, p: [f64; 2]) -> bool {
        let tri = &self.tris[t];
        match tri.ghost_slot() {
            Some(k) => {
                let a = self.p(tri.v[(k + 1) % 3]);
                let b = self.p(tri.v[(k + 2) % 3]);
                let o = orient(a, b, p);
                o > 0.0 || (o == 0.0 && strictly_between(a, b, p))
            }
            None => incircle(self.p(tri.v[0]), self.p(tri.v[1]), self.p(tri.v[2]), p) > 0.0,
        }
    }

    /// Whether `t` is a valid starting triangle for inserting `p`.
    fn accepts(&self, t: usize, p: [f64; 2]) -> bool {
        let tri = &self.tris[t];
        match tri.ghost_slot() {
            Some(k) => {
                let a = self.p(tri.v[(k + 1) % 3]);
                let b = self.p(tri.v[(k + 2) % 3]);
                orient(a, b, p) > 0.0
            }
            None => (0..3).all(|i| {
                let (a, b) = tri.edge(i);
                orient(self.p(a), self.p(b), p) >= 0.0
            }),
        }
    }

    /// Finds a real triangle containing `p`, or a ghost whose hull edge sees it.
    fn locate(&self, p: [f64; 2]) -> Option<usize> {
        let mut t = self.hint;
        if self.tris[t].alive {
            let max_steps = 2 * self.tris.len() + 16;
            for step in 0..max_steps {
                let tri = &self.tris[t];
                if tri.ghost_slot().is_some() {
                    if self.accepts(t, p) {
                        return Some(t);
                    }
                    break;
                }
                let mut next = None;
                for k in 0..3 {
                    // Rotating the first edge tested avoids walking in circles.
                    let i = (k + step) % 3;
                    let (a, b) = tri.edge(i);
                    if orient(self.p(a), self.p(b), p) < 0.0 {
                        next = Some(tri.adj[i]);
                        break;
                    }
                }
                match next {
                    Some(n) if n != NONE => t = n,
                    Some(_) => break,
                    None => return Some(t),
                }
            }
        }

        (0..self.tris.len()).find(|&t| self.tris[t].alive && self.accepts(t, p))
    }

    /// Inserts point `pi`. Returns `false` when the point was left out.
    fn insert(&mut self, pi: usize) -> bool {
        let p = self.p(pi);
        let Some(seed) = self.locate(p) else {
            return false;
        };
        if self.tris[seed]
            .v
            .iter()
            .any(|&v| v != GHOST && self.p(v) == p)
        {
            return false;
        }

        // Grow the cavity of triangles whose circumcircle holds p.
        let mut cavity = vec![seed];
        let mut in_cavity: HashSet<usize> = HashSet::from([seed]);
        let mut stack = vec![seed];
        while let Some(t) = stack.pop() {
            for i in 0..3 {
                let n = self.tris[t].adj[i];
                if n == NONE || in_cavity.contains(&n) {
                    continue;
                }
                if self.in_circle(n, p) {
                    in_cavity.insert(n);
                    cavity.push(n);
                    stack.push(n);
                }
            }
        }

        // Shrink until every real boundary edge faces p.
        let boundary = loop {
            let mut boundary: Vec<(usize, usize, usize, usize)> = Vec::new();
            let mut violator = None;
            for &t in &cavity {
                for i in 0..3 {
                    let n = self.tris[t].adj[i];
                    if in_cavity.contains(&n) {
                        continue;
                    }
                    let (a, b) = self.tris[t].edge(i);
                    if a != GHOST && b != GHOST && orient(self.p(a), self.p(b), p) <= 0.0 {
                        violator.get_or_insert(t);
                    }
                    boundary.push((a, b, n, t));
                }
            }
            match violator {
                None => break boundary,
                Some(t) if t == seed => return false,
                Some(t) => {
                    in_cavity.remove(&t);
                    cavity.retain(|&c| c != t);
                }
            }
        };

        // The boundary must be a single closed loop.
        let mut by_start: HashMap<usize, usize> = HashMap::with_capacity(boundary.len());
        let mut by_end: HashMap<usize, usize> = HashMap::with_capacity(boundary.len());
        for (k, &(a, b, _, _)) in boundary.iter().enumerate() {
            if by_start.insert(a, k).is_some() || by_end.insert(b, k).is_some() {
                return false;
            }
        }

        let base = self.tris.len();
        let mut new_tris = Vec::with_capacity(boundary.len());
        for &(a, b, n, _) in &boundary {
            let (Some(&after), Some(&before)) = (by_start.get(&b), by_end.get(&a)) else {
                return false;
            };
            new_tris.push(Tri {
                v: [a, b, pi],
                adj: [base + after, base + before, n],
                alive: true,
            });
        }

        // Everything is consistent; commit.
        for (k, &(a, b, n, owner)) in boundary.iter().enumerate() {
            if n == NONE {
                continue;
            }
            let outside = &mut self.tris[n];
            for j in 0..3 {
                if outside.adj[j] == owner && outside.edge(j) == (b, a) {
                    outside.adj[j] = base + k;
                }
            }
        }
        for &t in &cavity {
            self.tris[t].alive = false;
        }
        self.tris.extend(new_tris);
        self.hint = base;
        true
    }
}

/// Triangulates `pts`, which should already be scaled to a unit-sized box.
///
/// Points with identical coordinates are only inserted once. Fails when
/// fewer than three points are given or when no three points span a
/// triangle whose relative area exceeds `collinear_tolerance`.
pub(crate) fn triangulate(
    pts: &[[f64; 2]],
    collinear_tolerance: f64,
) -> Result<Triangulation, TriangulationFailure> {
    if pts.len() < 3 {
        return Err(TriangulationFailure::TooFewPoints);
    }

    // Seed triangle: first point, the point farthest from it, and the point
    // farthest from the line through both.
    let i0 = 0;
    let dist_sq = |i: usize| {
        let dx = pts[i][0] - pts[i0][0];
        let dy = pts[i][1] - pts[i0][1];
        dx * dx + dy * dy
    };
    let i1 = (1..pts.len())
        .fold(1, |best, i| if dist_sq(i) > dist_sq(best) { i } else { best });
    let base_len_sq = dist_sq(i1);
    if !(base_len_sq > 0.0) {
        return Err(TriangulationFailure::Collinear);
    }
    let (i2, area) = (0..pts.len())
        .filter(|&i| i != i0 && i != i1)
        .map(|i| (i, orient(pts[i0], pts[i1], pts[i])))
        .fold((NONE, 0.0_f64), |best, cur| {
            if cur.1.abs() > best.1.abs() {
                cur
            } else {
                best
            }
        });
    if i2 == NONE || area.abs() <= collinear_tolerance * base_len_sq {
        return Err(TriangulationFailure::Collinear);
    }

    let mut mesh = if area > 0.0 {
        Mesh::seed(pts, i0, i1, i2)
    } else {
        Mesh::seed(pts, i0, i2, i1)
    };

    let mut skipped = Vec::new();
    for i in 0..pts.len() {
        if i == i0 || i == i1 || i == i2 {
            continue;
        }
        if !mesh.insert(i) {
            skipped.push(i);
        }
    }

    let triangles: Vec<[usize; 3]> = mesh
        .tris
        .iter()
        .filter(|t| t.alive && t.ghost_slot().is_none())
        .map(|t| t.v)
        .filter(|v| orient(pts[v[0]], pts[v[1]], pts[v[2]]) > 0.0)
        .collect();

    if triangles.is_empty() {
        return Err(TriangulationFailure::Collinear);
    }

    Ok(Triangulation { triangles, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<[f64; 2]> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| [rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)])
            .collect()
    }

    fn grid_points(nx: usize, ny: usize) -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                pts.push([i as f64 / (nx - 1) as f64, j as f64 / (ny - 1) as f64]);
            }
        }
        pts
    }

    /// Monotone chain hull area, used as an independent reference.
    fn hull_area(pts: &[[f64; 2]]) -> f64 {
        let mut sorted = pts.to_vec();
        sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
        let mut lower: Vec<[f64; 2]> = Vec::new();
        for p in &sorted {
            while lower.len() >= 2 && orient(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
                lower.pop();
            }
            lower.push(*p);
        }
        let mut upper: Vec<[f64; 2]> = Vec::new();
        for p in sorted.iter().rev() {
            while upper.len() >= 2 && orient(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
                upper.pop();
            }
            upper.push(*p);
        }
        lower.pop();
        upper.pop();
        let hull: Vec<[f64; 2]> = lower.into_iter().chain(upper).collect();
        let mut area = 0.0;
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            area += a[0] * b[1] - b[0] * a[1];
        }
        0.5 * area
    }

    fn mesh_area(pts: &[[f64; 2]], tri: &Triangulation) -> f64 {
        tri.triangles
            .iter()
            .map(|t| 0.5 * orient(pts[t[0]], pts[t[1]], pts[t[2]]))
            .sum()
    }

    #[test]
    fn random_points_satisfy_empty_circumcircle() {
        let pts = random_points(300, 7);
        let tri = triangulate(&pts, 1e-10).unwrap();
        assert!(tri.skipped.is_empty());

        for t in &tri.triangles {
            for (i, p) in pts.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                let d = incircle(pts[t[0]], pts[t[1]], pts[t[2]], *p);
                assert!(d <= 1e-12, "point {i} inside circumcircle of {t:?}: {d}");
            }
        }
    }

    #[test]
    fn random_points_cover_convex_hull() {
        for seed in [1u64, 2, 3, 4] {
            let pts = random_points(200, seed);
            let tri = triangulate(&pts, 1e-10).unwrap();
            let expected = hull_area(&pts);
            assert!((mesh_area(&pts, &tri) - expected).abs() < 1e-12 * pts.len() as f64 + 1e-12);
        }
    }

    #[test]
    fn regular_grid_is_fully_triangulated() {
        let pts = grid_points(6, 5);
        let tri = triangulate(&pts, 1e-10).unwrap();
        assert!(tri.skipped.is_empty());
        assert_eq!(tri.triangles.len(), 2 * 5 * 4);
        assert!((mesh_area(&pts, &tri) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn triangles_are_counter_clockwise() {
        let pts = random_points(50, 99);
        let tri = triangulate(&pts, 1e-10).unwrap();
        for t in &tri.triangles {
            assert!(orient(pts[t[0]], pts[t[1]], pts[t[2]]) > 0.0);
        }
    }

    #[test]
    fn collinear_points_are_rejected() {
        let pts: Vec<[f64; 2]> = (0..10).map(|i| [i as f64 / 9.0, i as f64 / 9.0]).collect();
        assert_eq!(triangulate(&pts, 1e-10).unwrap_err(), TriangulationFailure::Collinear);
        assert_eq!(
            triangulate(&pts[..2], 1e-10).unwrap_err(),
            TriangulationFailure::TooFewPoints
        );
    }

    #[test]
    fn repeated_point_is_skipped() {
        let pts = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let tri = triangulate(&pts, 1e-10).unwrap();
        assert_eq!(tri.skipped, vec![3]);
        assert_eq!(tri.triangles.len(), 2);
    }

    #[test]
    fn point_on_hull_edge_splits_it() {
        let pts = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.5, 0.0]];
        let tri = triangulate(&pts, 1e-10).unwrap();
        assert_eq!(tri.triangles.len(), 2);
        assert!((mesh_area(&pts, &tri) - 0.5).abs() < 1e-15);
    }
}
