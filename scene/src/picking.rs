use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Ray parameter of the closest point to `p`, never negative.
    pub fn closest_t(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.direction).max(0.0)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.at(self.closest_t(p)).distance(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    /// Distance from the ray origin to the closest point on the ray.
    pub distance: f32,
    pub distance_to_ray: f32,
    /// The point in world space, after the group rotation.
    pub point: Vec3,
}

/// Nearest point along `ray` among those within `threshold` of it.
///
/// `positions` are in group-local space; the group is rotated about Y by
/// `group_rotation_y` before testing. Ties keep the lowest index.
pub fn pick_nearest(ray: &Ray, positions: &[Vec3], group_rotation_y: f32, threshold: f32) -> Option<Hit> {
    let rotation = Quat::from_rotation_y(group_rotation_y);
    let mut best: Option<Hit> = None;
    for (index, local) in positions.iter().enumerate() {
        let point = rotation * *local;
        let t = ray.closest_t(point);
        let on_ray = ray.at(t);
        let distance_to_ray = on_ray.distance(point);
        if distance_to_ray >= threshold {
            continue;
        }
        let distance = on_ray.distance(ray.origin);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Hit {
                index,
                distance,
                distance_to_ray,
                point,
            });
        }
    }
    best
}
