use std::f64::consts::TAU;

/// A word orbiting the player.
///
/// Position is polar (`angle`, `radius`) relative to the orbit center;
/// `x`/`y` cache the cartesian projection from the most recent advance
/// so renderers never redo the trig.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    text: String,
    angle: f64,
    radius: f64,
    angular_speed: f64,
    x: i32,
    y: i32,
}

impl Target {
    pub fn new(text: String, radius: f64, angle: f64, angular_speed: f64) -> Self {
        Self {
            text,
            angle: angle.rem_euclid(TAU),
            radius: radius.max(0.0),
            angular_speed,
            x: 0,
            y: 0,
        }
    }

    /// One tick of motion: rotate by the fixed angular speed, pull in
    /// by `decay`, and refresh the cartesian cache against the current
    /// orbit center. `angle` stays in `[0, 2π)`, `radius` never drops
    /// below zero.
    pub fn advance(&mut self, center_x: i32, center_y: i32, decay: f64) {
        self.angle = (self.angle + self.angular_speed).rem_euclid(TAU);
        self.radius = (self.radius - decay).max(0.0);
        self.x = center_x + (self.radius * self.angle.cos()) as i32;
        self.y = center_y + (self.radius * self.angle.sin()) as i32;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    /// Cartesian position from the last advance.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_rotates_and_decays() {
        let mut t = Target::new("star".into(), 100.0, 0.0, 0.25);
        t.advance(0, 0, 1.5);

        assert_eq!(t.angle(), 0.25);
        assert_eq!(t.radius(), 98.5);
    }

    #[test]
    fn angle_wraps_into_unit_circle() {
        let mut t = Target::new("wrap".into(), 50.0, TAU - 0.1, 0.3);
        t.advance(0, 0, 0.0);

        assert!(t.angle() >= 0.0 && t.angle() < TAU);
        assert!((t.angle() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn angle_stays_bounded_for_large_speeds() {
        // A speed above a full turn per tick must still land in [0, 2π).
        let mut t = Target::new("fast".into(), 50.0, 1.0, TAU + 1.0);
        for _ in 0..100 {
            t.advance(0, 0, 0.1);
            assert!(t.angle() >= 0.0 && t.angle() < TAU);
        }
    }

    #[test]
    fn radius_floors_at_zero() {
        let mut t = Target::new("close".into(), 0.3, 0.0, 0.01);
        t.advance(0, 0, 0.2);
        assert_eq!(t.radius(), 0.1);

        t.advance(0, 0, 0.2);
        assert_eq!(t.radius(), 0.0);

        t.advance(0, 0, 0.2);
        assert_eq!(t.radius(), 0.0);
    }

    #[test]
    fn position_tracks_orbit_center() {
        let mut t = Target::new("orbit".into(), 10.0, 0.0, 0.0);
        t.advance(100, 200, 0.0);

        let (x, y) = t.position();
        assert_eq!(x, 110);
        assert_eq!(y, 200);

        // Same polar state, moved center.
        t.advance(50, 50, 0.0);
        let (x, y) = t.position();
        assert_eq!(x, 60);
        assert_eq!(y, 50);
    }

    #[test]
    fn constructor_normalizes_inputs() {
        let t = Target::new("neg".into(), -5.0, -1.0, 0.1);
        assert_eq!(t.radius(), 0.0);
        assert!(t.angle() >= 0.0 && t.angle() < TAU);
    }
}
