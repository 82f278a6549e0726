use glam::Affine3A;

pub struct RigidBodyConstructionInfo {
    pub start_world_transform: Affine3A,
    pub friction: f32,
    pub restitution: f32,
    pub rolling_friction: f32,
}

impl RigidBodyConstructionInfo {
    #[must_use]
    pub const fn new(start_world_transform: Affine3A) -> Self {
        Self {
            start_world_transform,
            friction: 0.5,
            restitution: 0.0,
            rolling_friction: 0.0,
        }
    }
}

/// The subset of a simulated rigid body that contact generation reads:
/// where it is and how its surface combines with others.
/// Whether a body is driven externally is decided per bone, see `SkinnedBone::is_kinematic`.
#[derive(Clone, Debug)]
pub struct RigidBody {
    world_transform: Affine3A,
    pub friction: f32,
    pub restitution: f32,
    pub rolling_friction: f32,
}

impl From<RigidBodyConstructionInfo> for RigidBody {
    fn from(info: RigidBodyConstructionInfo) -> Self {
        Self::new(info)
    }
}

impl RigidBody {
    #[must_use]
    pub const fn new(info: RigidBodyConstructionInfo) -> Self {
        Self {
            world_transform: info.start_world_transform,
            friction: info.friction,
            restitution: info.restitution,
            rolling_friction: info.rolling_friction,
        }
    }

    pub const fn set_world_transform(&mut self, world_trans: Affine3A) {
        self.world_transform = world_trans;
    }

    #[must_use]
    pub const fn get_world_transform(&self) -> &Affine3A {
        &self.world_transform
    }
}
