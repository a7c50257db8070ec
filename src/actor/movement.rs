use bevy::prelude::*;
use crate::shared::*;

impl ActorMotion {
    /// Head for `target` (clamped into the playfield) at constant `speed`.
    pub fn move_to(&mut self, from: Vec2, target: Vec2, speed: f32, field: &PlayfieldConfig) {
        let target = field.clamp_inner(target);
        let direction = (target - from).normalize_or_zero();

        self.target = Some(target);
        self.velocity = direction * speed;
        self.is_moving = true;
        if direction.x < 0.0 {
            self.facing = Facing::Left;
        } else if direction.x > 0.0 {
            self.facing = Facing::Right;
        }
        if !self.is_attacking {
            self.pose = ActorPose::Walk;
        }
    }

    /// Approach `object` but stop `standoff` short of it, on the line
    /// between the actor and the object.
    pub fn move_toward(
        &mut self,
        from: Vec2,
        object: Vec2,
        standoff: f32,
        speed: f32,
        field: &PlayfieldConfig,
    ) {
        let away = (from - object).normalize_or_zero();
        // Actor sitting exactly on the object: back off to the left.
        let away = if away == Vec2::ZERO { Vec2::NEG_X } else { away };
        self.move_to(from, object + away * standoff, speed, field);
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.is_moving = false;
        self.target = None;
        if !self.is_attacking {
            self.pose = ActorPose::Idle;
        }
    }

    /// Enter the attacking state: planted, no velocity.
    pub fn begin_attack(&mut self) {
        self.is_attacking = true;
        self.stop();
        self.pose = ActorPose::Attack;
    }

    pub fn end_attack(&mut self) {
        self.is_attacking = false;
        if !self.is_moving {
            self.pose = ActorPose::Idle;
        }
    }

    /// Per-frame step. Getting closer than `arrival_threshold` to the
    /// movement target is the only thing that ends a move.
    pub fn advance(&mut self, position: &mut Vec2, dt: f32, arrival_threshold: f32) {
        if !self.is_moving {
            return;
        }
        let Some(target) = self.target else {
            self.stop();
            return;
        };

        let remaining = target - *position;
        let step = self.velocity * dt;
        if step.length_squared() >= remaining.length_squared() {
            *position = target;
        } else {
            *position += step;
        }

        if position.distance(target) < arrival_threshold {
            self.stop();
        }
    }
}

/// System: integrate actor velocity and end moves on arrival.
pub fn actor_movement(
    time: Res<Time>,
    config: Res<SessionConfig>,
    mut actors: Query<(&mut Transform, &mut ActorMotion), With<Actor>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut motion) in actors.iter_mut() {
        let mut position = transform.translation.truncate();
        motion.advance(&mut position, dt, config.actor.arrival_threshold);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

const IDLE_TINT: Color = Color::srgb(0.25, 0.55, 0.85);
const ATTACK_TINT: Color = Color::srgb(0.95, 0.40, 0.30);

/// System: mirror the sprite with facing and tint it while swinging.
pub fn sync_actor_sprite(
    mut actors: Query<(&ActorMotion, &mut Sprite), (With<Actor>, Changed<ActorMotion>)>,
) {
    for (motion, mut sprite) in actors.iter_mut() {
        sprite.flip_x = motion.facing == Facing::Left;
        sprite.color = match motion.pose {
            ActorPose::Attack => ATTACK_TINT,
            ActorPose::Idle | ActorPose::Walk => IDLE_TINT,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> PlayfieldConfig {
        PlayfieldConfig {
            width: 360.0,
            height: 640.0,
            margin: 30.0,
        }
    }

    #[test]
    fn test_move_to_clamps_target_into_inner_bounds() {
        let mut motion = ActorMotion::default();
        motion.move_to(Vec2::new(100.0, 100.0), Vec2::new(-50.0, 900.0), 160.0, &field());
        assert_eq!(motion.target, Some(Vec2::new(30.0, 610.0)));
        assert!(motion.is_moving);
        assert_eq!(motion.facing, Facing::Left);
        assert_eq!(motion.pose, ActorPose::Walk);
    }

    #[test]
    fn test_move_to_sets_constant_speed_velocity() {
        let mut motion = ActorMotion::default();
        motion.move_to(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), 160.0, &field());
        assert_eq!(motion.velocity, Vec2::new(160.0, 0.0));
        assert_eq!(motion.facing, Facing::Right);
    }

    #[test]
    fn test_move_toward_stops_short_by_standoff() {
        let mut motion = ActorMotion::default();
        let chest = Vec2::new(200.0, 100.0);
        motion.move_toward(Vec2::new(100.0, 100.0), chest, 35.0, 160.0, &field());
        let target = motion.target.unwrap();
        assert!((target - Vec2::new(165.0, 100.0)).length() < 1e-3);
        assert!((target.distance(chest) - 35.0).abs() < 1e-3);
    }

    #[test]
    fn test_move_toward_standoff_point_is_clamped() {
        let mut motion = ActorMotion::default();
        // Approaching from the left edge pushes the standoff point off-field.
        motion.move_toward(Vec2::new(200.0, 300.0), Vec2::new(40.0, 300.0), 35.0, 160.0, &field());
        let target = motion.target.unwrap();
        assert!(target.x >= 30.0 && target.x <= 330.0);
    }

    #[test]
    fn test_advance_stops_within_threshold() {
        let mut motion = ActorMotion::default();
        let mut position = Vec2::new(100.0, 100.0);
        motion.move_to(position, Vec2::new(110.0, 100.0), 160.0, &field());
        motion.advance(&mut position, 0.016, 5.0);
        assert!(motion.is_moving, "2.56 units in, still 7.4 away");
        motion.advance(&mut position, 0.016, 5.0);
        assert!(!motion.is_moving);
        assert_eq!(motion.velocity, Vec2::ZERO);
        assert_eq!(motion.pose, ActorPose::Idle);
    }

    #[test]
    fn test_advance_never_overshoots_on_long_frames() {
        let mut motion = ActorMotion::default();
        let mut position = Vec2::new(100.0, 100.0);
        motion.move_to(position, Vec2::new(120.0, 100.0), 160.0, &field());
        motion.advance(&mut position, 1.0, 5.0);
        assert_eq!(position, Vec2::new(120.0, 100.0));
        assert!(!motion.is_moving);
    }

    #[test]
    fn test_begin_attack_plants_the_actor() {
        let mut motion = ActorMotion::default();
        motion.move_to(Vec2::splat(100.0), Vec2::new(300.0, 300.0), 160.0, &field());
        motion.begin_attack();
        assert!(motion.is_attacking);
        assert!(!motion.is_moving);
        assert_eq!(motion.velocity, Vec2::ZERO);
        assert_eq!(motion.pose, ActorPose::Attack);

        motion.end_attack();
        assert!(!motion.is_attacking);
        assert_eq!(motion.pose, ActorPose::Idle);
    }

    #[test]
    fn test_stop_keeps_attack_pose_while_attacking() {
        let mut motion = ActorMotion::default();
        motion.is_attacking = true;
        motion.pose = ActorPose::Attack;
        motion.stop();
        assert_eq!(motion.pose, ActorPose::Attack);
    }
}
