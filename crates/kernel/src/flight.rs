use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A camera position and the point it faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub target: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Component-wise interpolation of both points.
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Scripted camera paths and manual flight tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Radians of orbit per second of elapsed time.
    pub orbit_rate: f32,
    pub orbit_target: Vec3,
    /// Seconds from `Start` to manual control.
    pub intro_duration: f32,
    pub intro_from: Pose,
    pub intro_to: Pose,
    /// Manual movement speed in units per second.
    pub speed: f32,
    /// Speed multiplier applied below `city_height`.
    pub city_speed_factor: f32,
    pub city_height: f32,
    pub pitch_limit_degrees: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 600.0,
            orbit_height: 300.0,
            orbit_rate: 0.1,
            orbit_target: Vec3::ZERO,
            intro_duration: 5.0,
            intro_from: Pose::new(Vec3::new(0.0, 500.0, 1000.0), Vec3::ZERO),
            intro_to: Pose::new(Vec3::new(128.0, 2.0, 0.0), Vec3::new(100.0, 2.0, 0.0)),
            speed: 40.0,
            city_speed_factor: 0.5,
            city_height: 20.0,
            pitch_limit_degrees: 89.0,
        }
    }
}

impl FlightConfig {
    /// Name and value of the first out-of-range tunable, if any.
    pub fn invalid_field(&self) -> Option<(&'static str, f32)> {
        let positive = [
            ("orbit_radius", self.orbit_radius),
            ("intro_duration", self.intro_duration),
        ];
        let non_negative = [
            ("speed", self.speed),
            ("city_speed_factor", self.city_speed_factor),
        ];
        positive
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
            .or_else(|| non_negative.into_iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)))
            .or_else(|| {
                let p = self.pitch_limit_degrees;
                (!(p > 0.0 && p < 90.0)).then_some(("pitch_limit_degrees", p))
            })
    }

    /// Manual speed at a given camera height.
    pub fn speed_at(&self, height: f32) -> f32 {
        if height < self.city_height {
            self.speed * self.city_speed_factor
        } else {
            self.speed
        }
    }

    /// Orbit pose at `elapsed` seconds.
    pub fn orbit_pose(&self, elapsed: f64) -> Pose {
        let angle = (elapsed * self.orbit_rate as f64) as f32;
        let position = Vec3::new(
            angle.sin() * self.orbit_radius,
            self.orbit_height,
            angle.cos() * self.orbit_radius,
        );
        Pose::new(position, self.orbit_target)
    }
}

/// `1 - (1 - t)^3`; fast start, gentle arrival.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
