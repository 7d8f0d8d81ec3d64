/////////////////////////////////////////////////////////////////////////////////////////////
//
// Wraps the `rstar` crate to index triangle bounding boxes for point location.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rtree
//!
//! Wrapper module for the rstar crate.
//!
//! Builds an R-tree over triangle extent rectangles and answers "which
//! triangles might contain this point" queries.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// A wrapper that holds an AABB rectangle and a triangle index.
type IndexedRect = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// `extents = [xmin, ymin, xmax, ymax]`
fn rectangle_from_extents(extents: [f64; 4]) -> Rectangle<[f64; 2]> {
    Rectangle::from_corners([extents[0], extents[1]], [extents[2], extents[3]])
}

/// Bounding-box index over the triangles of a mesh.
#[derive(Debug)]
pub struct TriangleIndex {
    tree: RTree<IndexedRect>,
}

impl TriangleIndex {
    /// Builds the index from `(triangle index, extents)` pairs.
    pub fn from_extents<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (usize, [f64; 4])>,
    {
        let rects = items
            .into_iter()
            .map(|(idx, ext)| GeomWithData::new(rectangle_from_extents(ext), idx))
            .collect::<Vec<_>>();
        TriangleIndex {
            tree: RTree::bulk_load(rects),
        }
    }

    /// Builds the index for triangles given as vertex triples into `points`.
    pub fn from_triangles(points: &[[f64; 2]], triangles: &[[usize; 3]]) -> Self {
        Self::from_extents(triangles.iter().enumerate().map(|(i, t)| {
            let xs = t.map(|v| points[v][0]);
            let ys = t.map(|v| points[v][1]);
            let ext = [
                xs.iter().copied().fold(f64::INFINITY, f64::min),
                ys.iter().copied().fold(f64::INFINITY, f64::min),
                xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ];
            (i, ext)
        }))
    }

    /// Indices of the triangles whose box, grown by `pad`, touches `p`.
    ///
    /// The order of the returned indices is ascending.
    pub fn candidates(&self, p: [f64; 2], pad: f64) -> Vec<usize> {
        let envelope = AABB::from_corners([p[0] - pad, p[1] - pad], [p[0] + pad, p[1] + pad]);
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|item| item.data)
            .collect();
        found.sort_unstable();
        found
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_are_candidates() {
        // squares: [0,0]-[1,1], [1,0]-[2,1], [3,3]-[4,4]
        let index = TriangleIndex::from_extents([
            (0, [0.0, 0.0, 1.0, 1.0]),
            (1, [1.0, 0.0, 2.0, 1.0]),
            (2, [3.0, 3.0, 4.0, 4.0]),
        ]);
        assert_eq!(index.size(), 3);
        assert_eq!(index.candidates([1.0, 0.5], 0.0), vec![0, 1]);
        assert_eq!(index.candidates([3.5, 3.5], 0.0), vec![2]);
        assert!(index.candidates([10.0, 10.0], 0.5).is_empty());
    }

    #[test]
    fn padding_reaches_nearby_boxes() {
        let index = TriangleIndex::from_extents([(7, [0.0, 0.0, 1.0, 1.0])]);
        assert!(index.candidates([1.05, 0.5], 0.01).is_empty());
        assert_eq!(index.candidates([1.05, 0.5], 0.1), vec![7]);
    }

    #[test]
    fn triangle_boxes_follow_vertices() {
        let points = [[0.0, 0.0], [2.0, 0.0], [0.0, 1.0], [2.0, 1.0]];
        let triangles = [[0, 1, 2], [1, 3, 2]];
        let index = TriangleIndex::from_triangles(&points, &triangles);
        assert_eq!(index.candidates([1.9, 0.1], 0.0), vec![0, 1]);
        assert_eq!(index.candidates([2.5, 0.5], 0.0), Vec::<usize>::new());
    }
}
