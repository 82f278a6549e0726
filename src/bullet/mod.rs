pub mod collision;
pub mod dynamics;
pub mod linear_math;
