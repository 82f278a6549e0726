/// Shape-type ids used to pick a collision algorithm for a pair of objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BroadphaseNativeTypes {
    CustomConvexShapeType = 24,
    CustomConcaveShapeType = 29,
}
