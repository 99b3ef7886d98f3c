pub mod point;
pub mod polygon;
pub mod transform;
pub mod vector;

pub use point::{Point2d, Point3d};
pub use polygon::Polygon2d;
pub use transform::{BoundingBox, Transform};
pub use vector::{Vec2, Vec3};
