//! GeoJSON geometries, features and coordinate reference systems.
//!
//! Every GeoJSON object names its concrete type in a `type` field, so all
//! geometry slots are polymorphic on `type` rather than on the document-level
//! discriminator. The [`GeometryAdapter`] is registered for the whole
//! geometry family and checks coordinate shapes on top of the model rules.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::adapter::{Adapter, AdapterRegistryBuilder, Dispatch, Matcher, PropertyPath, Slot};
use crate::construct::Node;
use crate::datatype::{DocumentKind, Value};
use crate::error::{ActivityError, Result};
use crate::module::Module;
use crate::schema::{Coercion, ModelRules, Schema, SchemaBuilder};

pub const GEOMETRY_CLASS: &str = "geometry";
pub const GEOMETRY_DISCRIMINATOR: &str = "type";
pub const FEATURE_FAMILY: &str = "feature";
pub const CRS_CLASS: &str = "crs";

fn positions(depth: usize) -> Coercion {
    (0..depth).fold(Coercion::Float, |inner, _| Coercion::sequence_of(inner))
}

fn geojson_rules() -> ModelRules {
    ModelRules::new()
        .property("bbox", Coercion::sequence_of(Coercion::Float))
        .property("crs", Coercion::polymorphic(CRS_CLASS, GEOMETRY_DISCRIMINATOR))
}

fn geometry_rules(depth: usize) -> ModelRules {
    geojson_rules()
        .family(GEOMETRY_CLASS)
        .required("coordinates", positions(depth))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeoModule;

impl Module for GeoModule {
    fn name(&self) -> &str {
        "geo"
    }
    fn define(&self, schema: &mut SchemaBuilder) -> Result<()> {
        for shape in Shape::ALL {
            schema.define_model(shape.name(), geometry_rules(shape.depth()))?;
        }
        schema
            .define_model("GeometryCollection", geojson_rules()
                .family(GEOMETRY_CLASS)
                .required("geometries", Coercion::sequence_of(
                    Coercion::polymorphic(GEOMETRY_CLASS, GEOMETRY_DISCRIMINATOR))))?
            .define_model("Feature", geojson_rules()
                .family(FEATURE_FAMILY)
                .property("geometry", Coercion::polymorphic(GEOMETRY_CLASS, GEOMETRY_DISCRIMINATOR))
                .property("properties", Coercion::nested_class("properties")))?
            .define_model("FeatureCollection", geojson_rules()
                .family(FEATURE_FAMILY)
                .required("features", Coercion::sequence_of(
                    Coercion::polymorphic(FEATURE_FAMILY, GEOMETRY_DISCRIMINATOR))))?
            .define_model("name", ModelRules::new()
                .family(CRS_CLASS)
                .required("properties", Coercion::nested_class("crs-name")))?
            .define_model("link", ModelRules::new()
                .family(CRS_CLASS)
                .required("properties", Coercion::nested_class("crs-link")))?
            .define_class("crs-name", ModelRules::new()
                .required("name", Coercion::String))?
            .define_class("crs-link", ModelRules::new()
                .required("href", Coercion::String)
                .property("type", Coercion::String))?;
        Ok(())
    }
    fn register(&self, adapters: &mut AdapterRegistryBuilder, _schema: &Arc<Schema>) -> Result<()> {
        adapters.register(Matcher::Family(GEOMETRY_CLASS.to_owned()), GeometryAdapter);
        Ok(())
    }
}

// ------------- coordinate shapes -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

type Fault = (PropertyPath, String);

impl Shape {
    const ALL: [Shape; 6] = [
        Shape::Point,
        Shape::MultiPoint,
        Shape::LineString,
        Shape::MultiLineString,
        Shape::Polygon,
        Shape::MultiPolygon,
    ];
    fn name(self) -> &'static str {
        match self {
            Shape::Point => "Point",
            Shape::MultiPoint => "MultiPoint",
            Shape::LineString => "LineString",
            Shape::MultiLineString => "MultiLineString",
            Shape::Polygon => "Polygon",
            Shape::MultiPolygon => "MultiPolygon",
        }
    }
    fn of(name: &str) -> Option<Shape> {
        Shape::ALL.into_iter().find(|s| s.name() == name)
    }
    // nesting of the coordinates array above a single position
    fn depth(self) -> usize {
        match self {
            Shape::Point => 1,
            Shape::MultiPoint | Shape::LineString => 2,
            Shape::MultiLineString | Shape::Polygon => 3,
            Shape::MultiPolygon => 4,
        }
    }
    fn check(self, coordinates: &Value, path: &PropertyPath) -> std::result::Result<(), Fault> {
        match self {
            Shape::Point => check_position(coordinates, path),
            Shape::MultiPoint => each(coordinates, path, check_position),
            Shape::LineString => check_line(coordinates, path),
            Shape::MultiLineString => each(coordinates, path, check_line),
            Shape::Polygon => each(coordinates, path, check_ring),
            Shape::MultiPolygon => each(coordinates, path, |polygon, p| each(polygon, p, check_ring)),
        }
    }
}

fn sequence<'a>(value: &'a Value, path: &PropertyPath) -> std::result::Result<&'a [Value], Fault> {
    value
        .as_sequence()
        .ok_or_else(|| (path.clone(), format!("expected an array, found {}", value.kind())))
}

fn each<F>(value: &Value, path: &PropertyPath, check: F) -> std::result::Result<(), Fault>
where
    F: Fn(&Value, &PropertyPath) -> std::result::Result<(), Fault>,
{
    for (i, item) in sequence(value, path)?.iter().enumerate() {
        check(item, &path.index(i))?;
    }
    Ok(())
}

fn check_position(value: &Value, path: &PropertyPath) -> std::result::Result<(), Fault> {
    let position = sequence(value, path)?;
    if position.len() < 2 || position.iter().any(|c| c.as_f64().is_none()) {
        return Err((path.clone(), String::from("a position needs at least two numbers")));
    }
    Ok(())
}

fn check_line(value: &Value, path: &PropertyPath) -> std::result::Result<(), Fault> {
    if sequence(value, path)?.len() < 2 {
        return Err((path.clone(), String::from("a line string needs at least two positions")));
    }
    each(value, path, check_position)
}

fn check_ring(value: &Value, path: &PropertyPath) -> std::result::Result<(), Fault> {
    let ring = sequence(value, path)?;
    if ring.len() < 4 {
        return Err((path.clone(), String::from("a linear ring needs at least four positions")));
    }
    each(value, path, check_position)?;
    if ring.first() != ring.last() {
        return Err((path.clone(), String::from("a linear ring must end where it starts")));
    }
    Ok(())
}

fn check_bbox(value: &Value, path: &PropertyPath) -> std::result::Result<(), Fault> {
    let edges = sequence(value, path)?.len();
    if edges < 4 || edges % 2 != 0 {
        return Err((path.clone(), format!("a bounding box needs 2*n values (n >= 2), found {edges}")));
    }
    Ok(())
}

fn check_geometry(slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> std::result::Result<(), Fault> {
    if let Some(bbox) = node.get("bbox").filter(|v| **v != Value::Null) {
        check_bbox(bbox, &path.child("bbox"))?;
    }
    match (slot.discriminator.and_then(Shape::of), node.get("coordinates")) {
        (Some(shape), Some(coordinates)) if *coordinates != Value::Null => {
            shape.check(coordinates, &path.child("coordinates"))
        }
        _ => Ok(()),
    }
}

/// Model-driven decoding plus GeoJSON coordinate checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometryAdapter;

impl Adapter for GeometryAdapter {
    fn name(&self) -> &str {
        "geometry"
    }
    fn decode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, object: &Map<String, Json>, path: &PropertyPath) -> Result<Node> {
        let node = dispatch.decode_properties(slot, object, path)?;
        check_geometry(slot, &node, path).map_err(|(at, message)| ActivityError::decode(at, message))?;
        Ok(node)
    }
    fn encode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> Result<Map<String, Json>> {
        check_geometry(slot, node, path).map_err(|(at, message)| ActivityError::encode(at, message))?;
        dispatch.encode_properties(slot, node, path)
    }
}

// ------------- typed view -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    node: Node,
}
impl Geometry {
    pub fn geometry_type(&self) -> Option<&str> {
        self.node.discriminator(GEOMETRY_DISCRIMINATOR)
    }
    pub fn coordinates(&self) -> Option<&Value> {
        self.node.get("coordinates")
    }
    /// The position of a `Point`.
    pub fn position(&self) -> Option<Vec<f64>> {
        match self.geometry_type() {
            Some("Point") => floats(self.coordinates()?),
            _ => None,
        }
    }
    pub fn bbox(&self) -> Option<Vec<f64>> {
        floats(self.node.get("bbox")?)
    }
    /// Members of a `GeometryCollection`.
    pub fn geometries(&self) -> impl Iterator<Item = Geometry> + '_ {
        self.node
            .get("geometries")
            .and_then(Value::as_sequence)
            .unwrap_or(&[])
            .iter()
            .filter_map(Value::as_node)
            .map(|n| Geometry { node: n.clone() })
    }
}
impl DocumentKind for Geometry {
    const FAMILY: &'static str = GEOMETRY_CLASS;
    const DISCRIMINATOR_FIELD: Option<&'static str> = Some(GEOMETRY_DISCRIMINATOR);
    fn wrap(node: Node) -> Self {
        Self { node }
    }
    fn node(&self) -> &Node {
        &self.node
    }
    fn into_node(self) -> Node {
        self.node
    }
}

fn floats(value: &Value) -> Option<Vec<f64>> {
    value.as_sequence()?.iter().map(Value::as_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Value {
        Value::Sequence(points.iter().map(|(x, y)| Value::from(vec![*x, *y])).collect())
    }

    #[test]
    fn depths_follow_nesting() {
        assert_eq!(positions(0), Coercion::Float);
        assert_eq!(positions(2).to_string(), "sequence-of(sequence-of(float))");
    }

    #[test]
    fn rings_must_close() {
        let path = PropertyPath::root().child("coordinates");
        let open = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let closed = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(check_ring(&closed, &path).is_ok());
        let (at, message) = check_ring(&open, &path).unwrap_err();
        assert_eq!(at.to_string(), "$.coordinates");
        assert!(message.contains("end where it starts"));
    }

    #[test]
    fn positions_need_two_numbers() {
        let path = PropertyPath::root();
        assert!(check_position(&Value::from(vec![1.0]), &path).is_err());
        assert!(check_position(&Value::from(vec![1.0, 2.0, 3.0]), &path).is_ok());
        assert!(check_position(&Value::from(vec!["a", "b"]), &path).is_err());
    }
}
