/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a simple 2D KD-tree for nearest-neighbour fallback queries.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::cmp::Ordering;

/// A point stored in the tree together with its position in the source table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointWithId {
    pub coords: [f64; 2],
    pub id: usize,
}

impl PointWithId {
    /// Squared euclidean distance
    #[inline]
    pub fn distance_sq(&self, target: [f64; 2]) -> f64 {
        let dx = self.coords[0] - target[0];
        let dy = self.coords[1] - target[1];
        dx * dx + dy * dy
    }
}

/// A node in the KDTree
#[derive(Debug)]
struct Node {
    point: PointWithId,
    left: Option<usize>,
    right: Option<usize>,
}

/// Closest point found so far.
#[derive(Debug, Clone, Copy)]
struct Best {
    distance_sq: f64,
    id: usize,
}

impl Best {
    /// Closer wins; equal distances go to the lower id.
    #[inline]
    fn improved_by(&self, distance_sq: f64, id: usize) -> bool {
        distance_sq < self.distance_sq || (distance_sq == self.distance_sq && id < self.id)
    }
}

/// The KDTree structure
#[derive(Debug)]
pub struct KDTree {
    nodes: Vec<Node>,
}

impl KDTree {
    /// Constructs a new KDTree from 2D coordinates; ids are slice positions.
    pub fn new(coords: &[[f64; 2]]) -> Self {
        let mut points: Vec<PointWithId> = coords
            .iter()
            .enumerate()
            .map(|(id, c)| PointWithId { coords: *c, id })
            .collect();

        let mut tree = KDTree {
            nodes: Vec::with_capacity(points.len()),
        };
        tree.build_tree(&mut points, 0);
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recursively builds the KDTree and stores nodes in a flat vector.
    fn build_tree(&mut self, points: &mut [PointWithId], depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        let axis = depth % 2;

        points.sort_by(|a, b| {
            a.coords[axis]
                .partial_cmp(&b.coords[axis])
                .unwrap_or(Ordering::Equal)
        });

        // Choose the median as the pivot
        let mid = points.len() / 2;

        let node_index = self.nodes.len();
        self.nodes.push(Node {
            point: points[mid],
            left: None,
            right: None,
        });

        self.nodes[node_index].left = self.build_tree(&mut points[..mid], depth + 1);
        self.nodes[node_index].right = self.build_tree(&mut points[mid + 1..], depth + 1);

        Some(node_index)
    }

    /// Returns `(id, distance)` of the point closest to `target`.
    ///
    /// Ties are broken in favour of the lowest id. Returns `None` for an
    /// empty tree or a target containing NaN.
    pub fn nearest(&self, target: [f64; 2]) -> Option<(usize, f64)> {
        if self.nodes.is_empty() || target[0].is_nan() || target[1].is_nan() {
            return None;
        }
        let mut best = Best {
            distance_sq: f64::INFINITY,
            id: usize::MAX,
        };
        self.nearest_impl(0, target, 0, &mut best);
        match best.id {
            usize::MAX => None,
            id => Some((id, best.distance_sq.sqrt())),
        }
    }

    fn nearest_impl(&self, node_index: usize, target: [f64; 2], depth: usize, best: &mut Best) {
        let node = &self.nodes[node_index];
        let d = node.point.distance_sq(target);
        if best.improved_by(d, node.point.id) {
            *best = Best {
                distance_sq: d,
                id: node.point.id,
            };
        }

        let axis = depth % 2;
        let diff = target[axis] - node.point.coords[axis];

        let (near_idx, far_idx) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near_idx {
            self.nearest_impl(near, target, depth + 1, best);
        }

        // `<=` keeps equidistant points on the far side in play for the tie-break.
        if let Some(far) = far_idx {
            if diff * diff <= best.distance_sq {
                self.nearest_impl(far, target, depth + 1, best);
            }
        }
    }
}
