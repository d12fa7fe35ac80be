//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree built once by recursive median split, immutable and shared
//! read-only across render threads. Nodes cache both bounds and the
//! cumulative surface area of their subtree; the latter drives uniform
//! area-weighted surface sampling for mesh lights.

use std::sync::Arc;

use crate::gen_f32;
use crate::primitive::{Intersection, LightSample, Primitive};
use lumen_math::{Aabb, Interval, Ray};
use rand::RngCore;
use thiserror::Error;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Errors from BVH construction.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error("cannot build a BVH over an empty primitive set")]
    EmptyBuild,
}

/// BVH node - either a branch with two children or a leaf with primitives.
enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: Aabb,
        area: f32,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        primitives: Vec<Arc<dyn Primitive>>,
        bounds: Aabb,
        area: f32,
    },
}

/// A BVH over a set of primitives.
pub struct Bvh {
    root: BvhNode,
}

impl Bvh {
    /// Build a BVH over a non-empty primitive set.
    pub fn build(primitives: Vec<Arc<dyn Primitive>>) -> Result<Self, BvhError> {
        if primitives.is_empty() {
            return Err(BvhError::EmptyBuild);
        }

        let n = primitives.len();
        let root = BvhNode::build(primitives);
        log::debug!("built BVH over {} primitives, total area {}", n, root.area());

        Ok(Self { root })
    }

    /// Find the nearest hit within the t-range, if any.
    pub fn intersect<'a>(
        &'a self,
        ray: &Ray,
        t_range: Interval,
        hit: &mut Intersection<'a>,
    ) -> bool {
        self.root.intersect(ray, t_range, hit)
    }

    /// Bounding box of the whole tree.
    pub fn bounds(&self) -> Aabb {
        self.root.bounds()
    }

    /// Cumulative surface area of all primitives.
    pub fn area(&self) -> f32 {
        self.root.area()
    }

    /// Draw a surface point uniformly over the cumulative area.
    ///
    /// Descends toward the child whose area brackets the draw, so each
    /// primitive is chosen with probability proportional to its area; the
    /// returned pdf is 1/total area.
    pub fn sample(&self, rng: &mut dyn RngCore) -> LightSample {
        let draw = gen_f32(rng) * self.root.area();
        let mut sample = self.root.sample(draw, rng);
        sample.pdf = 1.0 / self.root.area();
        sample
    }
}

impl BvhNode {
    /// Recursive construction: sort by centroid on the longest axis of the
    /// centroid bounds, split at the median, recurse.
    fn build(mut primitives: Vec<Arc<dyn Primitive>>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));

        if primitives.len() <= LEAF_MAX_SIZE {
            let area = primitives.iter().map(|p| p.area()).sum();
            return BvhNode::Leaf {
                primitives,
                bounds,
                area,
            };
        }

        let centroid_bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union_point(p.bounds().centroid()));
        let axis = centroid_bounds.longest_axis();

        primitives.sort_unstable_by(|a, b| {
            let a_val = a.bounds().centroid()[axis];
            let b_val = b.bounds().centroid()[axis];
            a_val
                .partial_cmp(&b_val)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = primitives.len() / 2;
        let right = primitives.split_off(mid);
        let left = Self::build(primitives);
        let right = Self::build(right);
        let area = left.area() + right.area();

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bounds,
            area,
        }
    }

    fn intersect<'a>(&'a self, ray: &Ray, t_range: Interval, hit: &mut Intersection<'a>) -> bool {
        match self {
            BvhNode::Leaf {
                primitives, bounds, ..
            } => {
                if !bounds.hit(ray, t_range) {
                    return false;
                }

                let mut hit_anything = false;
                let mut closest = t_range.max;
                for prim in primitives {
                    if prim.intersect(ray, Interval::new(t_range.min, closest), hit) {
                        hit_anything = true;
                        closest = hit.t;
                    }
                }
                hit_anything
            }

            BvhNode::Branch {
                left,
                right,
                bounds,
                ..
            } => {
                if !bounds.hit(ray, t_range) {
                    return false;
                }

                let hit_left = left.intersect(ray, t_range, hit);

                // Only search the right subtree up to the closest hit
                let right_max = if hit_left { hit.t } else { t_range.max };
                let hit_right =
                    right.intersect(ray, Interval::new(t_range.min, right_max), hit);

                hit_left || hit_right
            }
        }
    }

    /// Walk toward the primitive whose cumulative area brackets `draw`.
    fn sample(&self, draw: f32, rng: &mut dyn RngCore) -> LightSample {
        match self {
            BvhNode::Leaf { primitives, .. } => {
                let mut acc = 0.0;
                for prim in &primitives[..primitives.len() - 1] {
                    acc += prim.area();
                    if draw <= acc {
                        return prim.sample(rng);
                    }
                }
                // Float slack lands on the last primitive
                primitives[primitives.len() - 1].sample(rng)
            }
            BvhNode::Branch { left, right, .. } => {
                if draw < left.area() {
                    left.sample(draw, rng)
                } else {
                    right.sample(draw - left.area(), rng)
                }
            }
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } => *bounds,
            BvhNode::Branch { bounds, .. } => *bounds,
        }
    }

    fn area(&self) -> f32 {
        match self {
            BvhNode::Leaf { area, .. } => *area,
            BvhNode::Branch { area, .. } => *area,
        }
    }
}
