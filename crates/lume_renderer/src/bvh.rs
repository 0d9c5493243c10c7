//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built once, top-down, with either a median split or a surface area
//! heuristic (SAH) over a fixed number of candidate planes. The tree never
//! owns geometry: leaves store indices into the primitive slice it was built
//! from, and the `'p` borrow keeps that slice alive and unmodified for as
//! long as the tree exists. After construction the tree is immutable, so
//! any number of threads can traverse it without synchronization.

use std::time::Instant;

use lume_math::{Axis, Bounds3, Ray, Vec3};

use crate::config::MAX_PRIMS_IN_NODE_LIMIT;
use crate::{BvhConfig, Hittable, Intersection, SplitMethod};

/// BVH node - either an interior node with two children or a leaf.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Interior {
        bounds: Bounds3,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
    /// Leaf node referencing primitives by index.
    Leaf {
        bounds: Bounds3,
        primitives: Vec<usize>,
    },
}

impl BvhNode {
    /// Union of the bounds of every primitive below this node.
    pub fn bounds(&self) -> &Bounds3 {
        match self {
            BvhNode::Interior { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}

/// Shape of a built tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BvhStats {
    pub primitives: usize,
    pub interior_nodes: usize,
    pub leaves: usize,
    /// Depth of the deepest leaf (the root is depth 0)
    pub max_depth: usize,
}

/// Per-primitive data cached for the build.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    handle: usize,
    bounds: Bounds3,
    centroid: Vec3,
}

/// BVH over a borrowed slice of primitives.
pub struct BvhAccel<'p, P: Hittable> {
    primitives: &'p [P],
    root: Option<BvhNode>,
    config: BvhConfig,
    stats: BvhStats,
}

impl<'p, P: Hittable> BvhAccel<'p, P> {
    /// Build the tree. An empty slice produces an empty tree whose queries
    /// always miss.
    pub fn new(primitives: &'p [P], config: &BvhConfig) -> Self {
        let mut config = config.clone();
        config.max_prims_in_node = config.max_prims_in_node.clamp(1, MAX_PRIMS_IN_NODE_LIMIT);
        config.sah_candidates = config.sah_candidates.max(1);

        let mut stats = BvhStats {
            primitives: primitives.len(),
            ..Default::default()
        };

        if primitives.is_empty() {
            log::info!("BVH build skipped: no primitives");
            return Self {
                primitives,
                root: None,
                config,
                stats,
            };
        }

        let start = Instant::now();
        let mut items: Vec<BuildItem> = primitives
            .iter()
            .enumerate()
            .map(|(handle, p)| {
                let bounds = p.bounds();
                BuildItem {
                    handle,
                    bounds,
                    centroid: bounds.centroid(),
                }
            })
            .collect();

        let root = Builder { config: &config }.build(&mut items, 0, &mut stats);

        log::info!(
            "BVH built ({:?}): {} primitives, {} interior nodes, {} leaves, depth {} in {:.2?}",
            config.split_method,
            stats.primitives,
            stats.interior_nodes,
            stats.leaves,
            stats.max_depth,
            start.elapsed()
        );

        Self {
            primitives,
            root: Some(root),
            config,
            stats,
        }
    }

    /// Nearest intersection along `ray`, or the no-hit sentinel.
    ///
    /// The returned record has `primitive` set to the index of the hit
    /// primitive.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'p> {
        match &self.root {
            None => Intersection::none(),
            Some(root) => self.get_intersection(root, ray, ray.dir_is_neg()),
        }
    }

    fn get_intersection(&self, node: &BvhNode, ray: &Ray, dir_is_neg: u8) -> Intersection<'p> {
        if !node.bounds().intersect_p(ray, ray.inv_direction, dir_is_neg) {
            return Intersection::none();
        }

        match node {
            BvhNode::Leaf { primitives, .. } => primitives
                .iter()
                .fold(Intersection::none(), |closest, &handle| {
                    let bounded = ray.with_t_max(closest.distance.min(ray.t_max));
                    closest.closer(self.intersect_primitive(handle, &bounded))
                }),
            BvhNode::Interior { left, right, .. } => {
                let hit_left = self.get_intersection(left, ray, dir_is_neg);

                // Only check right up to the closest hit so far
                let right_ray = if hit_left.happened {
                    ray.with_t_max(hit_left.distance)
                } else {
                    *ray
                };
                let hit_right = self.get_intersection(right, &right_ray, dir_is_neg);

                hit_left.closer(hit_right)
            }
        }
    }

    fn intersect_primitive(&self, handle: usize, ray: &Ray) -> Intersection<'p> {
        let primitives: &'p [P] = self.primitives;
        let mut isect = primitives[handle].intersect(ray);
        if isect.happened {
            isect.primitive = Some(handle);
        }
        isect
    }

    /// Linear scan over every primitive. Reference for the tree traversal.
    pub fn intersect_brute_force(&self, ray: &Ray) -> Intersection<'p> {
        (0..self.primitives.len()).fold(Intersection::none(), |closest, handle| {
            closest.closer(self.intersect_primitive(handle, ray))
        })
    }

    /// Bounds of the whole tree; empty for an empty tree.
    pub fn bounds(&self) -> Bounds3 {
        self.root
            .as_ref()
            .map_or(Bounds3::EMPTY, |root| *root.bounds())
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn primitives(&self) -> &'p [P] {
        self.primitives
    }

    pub fn stats(&self) -> BvhStats {
        self.stats
    }

    /// Build parameters after clamping.
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }
}

struct Builder<'c> {
    config: &'c BvhConfig,
}

impl Builder<'_> {
    /// Recursive BVH construction over `items`, which is reordered in place.
    fn build(&self, items: &mut [BuildItem], depth: usize, stats: &mut BvhStats) -> BvhNode {
        let bounds = items
            .iter()
            .fold(Bounds3::EMPTY, |acc, item| Bounds3::union(&acc, &item.bounds));
        stats.max_depth = stats.max_depth.max(depth);

        if items.len() <= self.config.max_prims_in_node {
            stats.leaves += 1;
            return BvhNode::Leaf {
                bounds,
                primitives: items.iter().map(|item| item.handle).collect(),
            };
        }

        // Split axis follows the spread of the centroids, not of the boxes
        let centroid_bounds = items
            .iter()
            .fold(Bounds3::EMPTY, |acc, item| Bounds3::union_point(&acc, item.centroid));
        let axis = centroid_bounds.max_extent();

        let mid = match self.config.split_method {
            SplitMethod::Median => median_split(items, axis),
            SplitMethod::Sah => self
                .sah_split(items, axis, &bounds, &centroid_bounds)
                .unwrap_or_else(|| median_split(items, axis)),
        };
        debug_assert!(mid > 0 && mid < items.len(), "split must leave both sides non-empty");

        stats.interior_nodes += 1;
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = self.build(left_items, depth + 1, stats);
        let right = self.build(right_items, depth + 1, stats);

        BvhNode::Interior {
            bounds,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Choose the cheapest candidate plane under the SAH cost model.
    ///
    /// Sorts `items` along `axis` and returns the split index, or `None`
    /// when no plane separates the centroids (they all coincide on the axis)
    /// or the node has no surface area to weigh children against.
    fn sah_split(
        &self,
        items: &mut [BuildItem],
        axis: Axis,
        bounds: &Bounds3,
        centroid_bounds: &Bounds3,
    ) -> Option<usize> {
        let n = items.len();
        let extent = centroid_bounds.diagonal()[axis];
        let total_area = bounds.surface_area();
        if !(extent > 0.0 && total_area > 0.0) {
            return None;
        }

        sort_by_centroid(items, axis);

        // Surface area of every prefix and suffix, so each plane costs O(log n)
        let mut prefix_area = Vec::with_capacity(n + 1);
        let mut acc = Bounds3::EMPTY;
        prefix_area.push(0.0);
        for item in items.iter() {
            acc = Bounds3::union(&acc, &item.bounds);
            prefix_area.push(acc.surface_area());
        }
        let mut suffix_area = vec![0.0; n + 1];
        let mut acc = Bounds3::EMPTY;
        for (i, item) in items.iter().enumerate().rev() {
            acc = Bounds3::union(&acc, &item.bounds);
            suffix_area[i] = acc.surface_area();
        }

        let k = self.config.sah_candidates;
        let t_trav = self.config.traversal_cost;
        let t_isect = self.config.intersection_cost;
        let mut best: Option<(f32, usize)> = None;

        for i in 1..=k {
            let plane = centroid_bounds.p_min[axis] + extent * i as f32 / (k + 1) as f32;
            // items are sorted, so "centroid <= plane" is a prefix
            let split = items.partition_point(|item| item.centroid[axis] <= plane);
            if split == 0 || split == n {
                continue;
            }

            let cost = t_trav
                + t_isect * prefix_area[split] / total_area * split as f32
                + t_isect * suffix_area[split] / total_area * (n - split) as f32;

            if cost.is_finite() && best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, split));
            }
        }

        best.map(|(_, split)| split)
    }
}

/// Sort by centroid on `axis` and split in half.
fn median_split(items: &mut [BuildItem], axis: Axis) -> usize {
    sort_by_centroid(items, axis);
    items.len() / 2
}

fn sort_by_centroid(items: &mut [BuildItem], axis: Axis) {
    items.sort_unstable_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
}
