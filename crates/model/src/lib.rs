pub use geo_point::GeoPoint;
pub use region::Region;
pub use shape::RenderShape;

pub mod geo_point;
pub mod region;
pub mod shape;

/// Sample values used for documented json schemas.
pub trait ExampleData {
    fn example_data() -> Self;
}
