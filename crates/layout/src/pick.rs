use glam::Vec3;
use neoncity_common::Ray;

use crate::layout::{Entity, Layout};

/// One ray/box intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub entity: &'a Entity,
    /// Distance along the ray to the entry point.
    pub distance: f32,
}

/// Every entity the ray passes through, nearest first.
pub fn intersect<'a>(layout: &'a Layout, ray: &Ray) -> Vec<Hit<'a>> {
    let half = layout.config().building.half_extents();
    let mut hits: Vec<Hit<'a>> = layout
        .entities()
        .iter()
        .filter_map(|entity| {
            ray_box(ray, entity.position - half, entity.position + half)
                .map(|distance| Hit { entity, distance })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// First special entity along the ray. Ordinary hits in front of it do not
/// block the result.
pub fn pick_special<'a>(layout: &'a Layout, ray: &Ray) -> Option<&'a Entity> {
    intersect(layout, ray)
        .into_iter()
        .map(|hit| hit.entity)
        .find(|e| e.is_special())
}

/// Slab test. Returns the entry distance, or zero when the origin is inside.
fn ray_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.direction.recip();
    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;
    let near = t1.min(t2).max_element();
    let far = t1.max(t2).min_element();
    if near.is_nan() || far.is_nan() || far < 0.0 || near > far {
        return None;
    }
    Some(near.max(0.0))
}
