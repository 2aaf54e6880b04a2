//! Built-in vocabularies, each delivered as a [`Module`](crate::module::Module).
//!
//! * [`activity::ActivityModule`] – activities, objects, collections and places.
//! * [`geo::GeoModule`] – GeoJSON geometries, features and coordinate reference systems.

pub mod activity;
pub mod geo;

pub use activity::{ASObject, Activity, ActivityModule, Collection};
pub use geo::{GeoModule, Geometry, GeometryAdapter};
