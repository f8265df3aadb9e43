use crate::app::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Axis-aligned box registered for ray queries. `key` is caller-defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastBox<K> {
    pub key: K,
    pub min: Vec3,
    pub max: Vec3,
}

impl<K> RaycastBox<K> {
    pub fn from_center(key: K, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            key,
            min: center - half_extents,
            max: center + half_extents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit<K> {
    pub key: K,
    pub point: Vec3,
    pub distance: f32,
}

/// Slab test. `direction` must be normalized; returns the entry distance, or
/// the exit distance when the origin is inside the box.
pub fn ray_box_distance(ray: &Ray, max_distance: f32, min: Vec3, max: Vec3) -> Option<f32> {
    let mut tmin = 0.0f32;
    let mut tmax = max_distance.max(0.0);

    for axis in 0..3 {
        let (o, d, mn, mx) = match axis {
            0 => (ray.origin.x, ray.direction.x, min.x, max.x),
            1 => (ray.origin.y, ray.direction.y, min.y, max.y),
            _ => (ray.origin.z, ray.direction.z, min.z, max.z),
        };
        if d.abs() < 1e-6 {
            if o < mn || o > mx {
                return None;
            }
            continue;
        }
        let inv = d.recip();
        let mut t1 = (mn - o) * inv;
        let mut t2 = (mx - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        tmin = tmin.max(t1);
        tmax = tmax.min(t2);
        if tmin > tmax {
            return None;
        }
    }

    if tmax < 0.0 {
        return None;
    }
    let hit = if tmin >= 0.0 { tmin } else { tmax };
    (hit <= max_distance).then_some(hit)
}

/// Nearest box hit along the ray within `max_distance`, or `None`.
pub fn raycast_nearest<K: Copy>(
    ray: Ray,
    max_distance: f32,
    targets: impl IntoIterator<Item = RaycastBox<K>>,
) -> Option<RaycastHit<K>> {
    let direction = ray.direction.try_normalize()?;
    let ray = Ray {
        origin: ray.origin,
        direction,
    };
    let mut best: Option<RaycastHit<K>> = None;
    for target in targets {
        let Some(distance) = ray_box_distance(&ray, max_distance, target.min, target.max) else {
            continue;
        };
        match best {
            Some(current) if current.distance <= distance => {}
            _ => {
                best = Some(RaycastHit {
                    key: target.key,
                    point: ray.origin + direction * distance,
                    distance,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(key: u32, center: Vec3) -> RaycastBox<u32> {
        RaycastBox::from_center(key, center, Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn nearest_hit_wins_regardless_of_registration_order() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = raycast_nearest(
            ray,
            100.0,
            [
                unit_box(2, Vec3::new(0.0, 0.0, -20.0)),
                unit_box(1, Vec3::new(0.0, 0.0, -5.0)),
            ],
        )
        .expect("hit");

        assert_eq!(hit.key, 1);
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert!((hit.point.z + 4.5).abs() < 1e-5);
    }

    #[test]
    fn boxes_beyond_max_distance_are_ignored() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::new(1.0, 0.0, 0.0),
        };
        let hit = raycast_nearest(ray, 3.0, [unit_box(7, Vec3::new(10.0, 0.0, 0.0))]);
        assert!(hit.is_none());
    }

    #[test]
    fn boxes_behind_the_origin_are_not_hit() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = raycast_nearest(ray, 100.0, [unit_box(1, Vec3::new(0.0, 0.0, 5.0))]);
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 2.0, 0.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = raycast_nearest(ray, 100.0, [unit_box(1, Vec3::new(0.0, 0.0, -5.0))]);
        assert!(hit.is_none());
    }

    #[test]
    fn unnormalized_direction_reports_true_distance() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -10.0),
        };
        let hit = raycast_nearest(ray, 100.0, [unit_box(1, Vec3::new(0.0, 0.0, -3.0))])
            .expect("hit");
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_never_hits() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
        };
        assert!(raycast_nearest(ray, 100.0, [unit_box(1, Vec3::ZERO)]).is_none());
    }
}
