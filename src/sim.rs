use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::camera::{FlyCamera, MoveDirection};
use crate::display::DisplaySettings;
use crate::heightfield::{GridSize, Heightfield};
use crate::math::Point3;
use crate::world::Terrain;

/// Fixed simulation step, roughly 60 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(17);

/// How far each animated height rises per tick.
pub const HEIGHT_STEP: f32 = 0.01;

/// Ticks run per `advance` at most; a longer stall drops the backlog.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

const INITIAL_EYE: Point3 = Point3::new(-5.0, 1.0, 41.0);
const INITIAL_TARGET: Point3 = Point3::new(-5.0, 1.0, -5.0);

/// Held/released state of the four movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementFlags {
    forward: bool,
    backward: bool,
    strafe_left: bool,
    strafe_right: bool,
}

impl MovementFlags {
    pub fn set(&mut self, direction: MoveDirection, held: bool) {
        *self.slot(direction) = held;
    }

    pub fn is_held(&self, direction: MoveDirection) -> bool {
        match direction {
            MoveDirection::Forward => self.forward,
            MoveDirection::Backward => self.backward,
            MoveDirection::StrafeLeft => self.strafe_left,
            MoveDirection::StrafeRight => self.strafe_right,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot(&mut self, direction: MoveDirection) -> &mut bool {
        match direction {
            MoveDirection::Forward => &mut self.forward,
            MoveDirection::Backward => &mut self.backward,
            MoveDirection::StrafeLeft => &mut self.strafe_left,
            MoveDirection::StrafeRight => &mut self.strafe_right,
        }
    }
}

/// Raises every animated height below its target by one [`HEIGHT_STEP`],
/// stopping exactly on the target.
pub fn animate_heights(animated: &mut Heightfield, target: &Heightfield) {
    assert_eq!(animated.size(), target.size(), "heightfield sizes differ");
    for (current, &goal) in animated.iter_mut().zip(target.iter()) {
        if *current < goal {
            *current = (*current + HEIGHT_STEP).min(goal);
        }
    }
}

/// Everything the tick loop and the input handlers mutate.
pub struct Viewer {
    terrain: Terrain,
    animated: Heightfield,
    pub camera: FlyCamera,
    pub movement: MovementFlags,
    pub display: DisplaySettings,
    rng: ChaCha8Rng,
}

impl Viewer {
    /// Builds the first terrain from `seed`. Later regenerations draw their
    /// seeds from a stream derived from it.
    pub fn new(size: GridSize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let terrain = Terrain::generate(size, rng.r#gen());
        log::info!(
            "generated {}x{} terrain (seed {}, max height {:.2})",
            size.x_size(),
            size.z_size(),
            terrain.seed(),
            terrain.max_height()
        );
        Self {
            animated: Heightfield::zeroed(size),
            terrain,
            camera: FlyCamera::new(INITIAL_EYE, INITIAL_TARGET),
            movement: MovementFlags::default(),
            display: DisplaySettings::default(),
            rng,
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Heights as currently displayed.
    pub fn animated(&self) -> &Heightfield {
        &self.animated
    }

    pub fn tick(&mut self) {
        self.camera.apply_rotation();
        let speed = self.camera.speed;
        for direction in MoveDirection::ALL {
            if self.movement.is_held(direction) {
                self.camera.apply_movement(direction, speed);
            }
        }
        animate_heights(&mut self.animated, self.terrain.heights());
    }

    pub fn set_movement(&mut self, direction: MoveDirection, held: bool) {
        self.movement.set(direction, held);
    }

    /// Drops every held movement key, for when key releases can no longer be
    /// observed (the window lost focus).
    pub fn release_movement(&mut self) {
        self.movement.clear();
    }

    pub fn pointer_motion(&mut self, x_offset: f32, y_offset: f32) {
        self.camera.update_rotation(x_offset, y_offset);
    }

    pub fn regenerate(&mut self) {
        let seed = self.rng.r#gen();
        self.regenerate_with_seed(seed);
    }

    /// Replaces the terrain and restarts the rise animation from flat ground.
    pub fn regenerate_with_seed(&mut self, seed: u64) {
        let size = self.terrain.size();
        let terrain = Terrain::generate(size, seed);
        log::info!(
            "regenerated terrain (seed {}, max height {:.2})",
            seed,
            terrain.max_height()
        );
        self.terrain = terrain;
        self.animated = Heightfield::zeroed(size);
    }

    /// The summary the status overlay shows, one entry per line.
    pub fn status_lines(&self) -> Vec<String> {
        let position = self.camera.position.to_vec3();
        let mut lines = vec![
            format!("({:.2},{:.2},{:.2})", position.x, position.y, position.z),
            format!("angles: {:.2},{:.2}", self.camera.pitch, self.camera.yaw),
        ];
        lines.extend(self.display.labels().into_iter().map(str::to_owned));
        lines
    }
}

/// Turns wall-clock time into a count of due fixed-interval ticks.
#[derive(Clone, Debug)]
pub struct FixedClock {
    interval: Duration,
    last: Instant,
    accumulator: Duration,
}

impl FixedClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
            accumulator: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, now: Instant) -> u32 {
        self.accumulator += now.saturating_duration_since(self.last);
        self.last = now;

        let mut ticks = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            ticks += 1;
            if ticks == MAX_CATCH_UP_TICKS {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// When the next tick becomes due.
    pub fn next_deadline(&self) -> Instant {
        self.last + self.interval.saturating_sub(self.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(x: usize, z: usize, seed: u64) -> Viewer {
        Viewer::new(GridSize::new(x, z).unwrap(), seed)
    }

    #[test]
    fn animation_rises_without_overshoot() {
        let size = GridSize::new(3, 1).unwrap();
        let target = Heightfield::from_fn(size, |x, _| [0.025, 0.0, -1.0][x]);
        let mut animated = Heightfield::zeroed(size);

        animate_heights(&mut animated, &target);
        assert!((animated[(0, 0)] - 0.01).abs() < 1e-6);
        assert_eq!(animated[(1, 0)], 0.0);
        assert_eq!(animated[(2, 0)], 0.0);

        animate_heights(&mut animated, &target);
        assert!((animated[(0, 0)] - 0.02).abs() < 1e-6);

        // The last step is cut short so the target is never exceeded.
        for _ in 0..10 {
            animate_heights(&mut animated, &target);
            assert!(animated[(0, 0)] <= 0.025);
        }
        assert_eq!(animated[(0, 0)], 0.025);
    }

    #[test]
    fn animated_heights_track_target() {
        let mut viewer = viewer(20, 20, 11);
        let target = viewer.terrain().heights().clone();
        for _ in 0..50 {
            viewer.tick();
        }
        for (current, goal) in viewer.animated().iter().zip(target.iter()) {
            assert!(*current <= goal.max(0.0));
            assert!(*current >= 0.0);
        }
        assert!(viewer.animated().iter().any(|&h| h > 0.0));
    }

    #[test]
    fn held_keys_move_every_tick() {
        let mut viewer = viewer(8, 8, 1);
        let start = viewer.camera.position;
        let front = viewer.camera.front();

        viewer.set_movement(MoveDirection::Forward, true);
        viewer.tick();
        viewer.tick();
        viewer.set_movement(MoveDirection::Forward, false);
        viewer.tick();

        let travelled = start.vector_to(viewer.camera.position);
        assert!((travelled - front * 2.0 * viewer.camera.speed).length() < 1e-4);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut viewer = viewer(8, 8, 1);
        let start = viewer.camera.position;
        viewer.set_movement(MoveDirection::StrafeLeft, true);
        viewer.set_movement(MoveDirection::StrafeRight, true);
        viewer.tick();
        assert!(start.distance_to(viewer.camera.position) < 1e-5);
        assert!(viewer.movement.is_held(MoveDirection::StrafeLeft));
        assert!(viewer.movement.is_held(MoveDirection::StrafeRight));
    }

    #[test]
    fn released_movement_stops_the_camera() {
        let mut viewer = viewer(8, 8, 1);
        viewer.set_movement(MoveDirection::Forward, true);
        viewer.set_movement(MoveDirection::StrafeRight, true);
        viewer.tick();

        viewer.release_movement();
        assert_eq!(viewer.movement, MovementFlags::default());
        let stopped = viewer.camera.position;
        for _ in 0..3 {
            viewer.tick();
        }
        assert_eq!(viewer.camera.position, stopped);
    }

    #[test]
    fn pointer_motion_applies_on_next_tick() {
        let mut viewer = viewer(8, 8, 1);
        let front = viewer.camera.front();
        viewer.pointer_motion(300.0, 0.0);
        assert_eq!(viewer.camera.front(), front);
        viewer.tick();
        assert!((viewer.camera.front() - front).length() > 0.1);
    }

    #[test]
    fn regeneration_resets_animation() {
        let mut viewer = viewer(16, 16, 2);
        for _ in 0..5 {
            viewer.tick();
        }
        let old_seed = viewer.terrain().seed();
        viewer.regenerate();
        assert_ne!(viewer.terrain().seed(), old_seed);
        assert!(viewer.animated().iter().all(|&h| h == 0.0));
        assert_eq!(viewer.animated().size(), viewer.terrain().size());
    }

    #[test]
    fn regenerating_with_seed_is_reproducible() {
        let mut a = viewer(16, 12, 2);
        let mut b = viewer(16, 12, 9);
        a.regenerate_with_seed(1234);
        b.regenerate_with_seed(1234);
        assert_eq!(a.terrain().heights(), b.terrain().heights());
        assert_eq!(a.terrain().normals(), b.terrain().normals());
    }

    #[test]
    fn status_lines_report_camera_and_modes() {
        let viewer = viewer(4, 4, 0);
        let lines = viewer.status_lines();
        assert_eq!(lines[0], "(-5.00,1.00,41.00)");
        assert!(lines[1].starts_with("angles: 0.00,"));
        assert_eq!(lines[2], "Filled Rendering");
    }

    #[test]
    fn clock_counts_due_ticks() {
        let start = Instant::now();
        let mut clock = FixedClock::new(TICK_INTERVAL, start);
        assert_eq!(clock.advance(start + Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(start + Duration::from_millis(20)), 1);
        assert_eq!(clock.advance(start + Duration::from_millis(54)), 2);
        assert_eq!(clock.next_deadline(), start + Duration::from_millis(68));
    }

    #[test]
    fn clock_drops_long_stalls() {
        let start = Instant::now();
        let mut clock = FixedClock::new(TICK_INTERVAL, start);
        assert_eq!(clock.advance(start + Duration::from_secs(10)), MAX_CATCH_UP_TICKS);
        assert_eq!(clock.advance(start + Duration::from_secs(10)), 0);
    }
}
