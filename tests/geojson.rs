use activity_json::adapter::PropertyPath;
use activity_json::datatype::Value;
use activity_json::engine::Engine;
use activity_json::vocab::{ActivityModule, GeoModule, Geometry};
use activity_json::{ActivityError, DocumentKind};
use serde_json::Value as Json;

fn setup() -> Engine {
    Engine::builder()
        .module(ActivityModule)
        .module(GeoModule)
        .build()
        .expect("engine builds")
}

#[test]
fn points_decode_and_encode() {
    let engine = setup();
    let point: Geometry = engine
        .decode_as(r#"{"type":"Point","coordinates":[102,0.5]}"#)
        .expect("decodes");
    assert_eq!(point.geometry_type(), Some("Point"));
    assert_eq!(point.position(), Some(vec![102.0, 0.5]));
    assert_eq!(
        engine.encode_as(&point).unwrap(),
        r#"{"type":"Point","coordinates":[102.0,0.5]}"#
    );
}

#[test]
fn polygons_and_collections() {
    let engine = setup();
    let text = r#"{
        "type": "GeometryCollection",
        "bbox": [100.0, 0.0, 102.0, 1.0],
        "geometries": [
            {"type": "Polygon", "coordinates": [[[100.0, 0.0], [101.0, 0.0], [101.0, 1.0], [100.0, 1.0], [100.0, 0.0]]]},
            {"type": "LineString", "coordinates": [[101.0, 0.0], [102.0, 1.0]]}
        ]
    }"#;
    let collection: Geometry = engine.decode_as(text).expect("decodes");
    assert_eq!(collection.bbox(), Some(vec![100.0, 0.0, 102.0, 1.0]));
    let kinds: Vec<_> = collection
        .geometries()
        .map(|g| g.geometry_type().map(str::to_owned))
        .collect();
    assert_eq!(kinds, vec![Some("Polygon".to_owned()), Some("LineString".to_owned())]);

    let written = engine.encode_as(&collection).unwrap();
    let expected: Json = serde_json::from_str(text).unwrap();
    assert_eq!(serde_json::from_str::<Json>(&written).unwrap(), expected);
}

#[test]
fn coordinate_shapes_are_checked() {
    let engine = setup();
    let open_ring = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1]]]}"#;
    let err = engine.decode_as::<Geometry>(open_ring).unwrap_err();
    assert!(matches!(err, ActivityError::Decode { .. }));
    assert_eq!(err.path(), Some("$.coordinates[0]"));

    let short_line = r#"{"type":"MultiLineString","coordinates":[[[0,0],[1,1]],[[2,2]]]}"#;
    assert_eq!(engine.decode_as::<Geometry>(short_line).unwrap_err().path(), Some("$.coordinates[1]"));

    let lonely = r#"{"type":"Point","coordinates":[1]}"#;
    assert_eq!(engine.decode_as::<Geometry>(lonely).unwrap_err().path(), Some("$.coordinates"));

    let missing = r#"{"type":"Point"}"#;
    assert_eq!(engine.decode_as::<Geometry>(missing).unwrap_err().path(), Some("$.coordinates"));

    let odd_box = r#"{"type":"Point","coordinates":[1,2],"bbox":[1,2,3]}"#;
    assert_eq!(engine.decode_as::<Geometry>(odd_box).unwrap_err().path(), Some("$.bbox"));
}

#[test]
fn places_carry_geometries() {
    let engine = setup();
    let text = r#"{"objectType":"place","displayName":"Office","position":"+27.5916+086.5640+8850/","location":{"type":"Point","coordinates":[86.564,27.5916]},"address":{"locality":"Solukhumbu"}}"#;
    let place = engine.decode(text).expect("decodes");
    let location = place.get("location").and_then(Value::as_node).expect("location");
    assert_eq!(location.discriminator("type"), Some("Point"));
    assert_eq!(engine.encode(&place).unwrap(), text);

    let bad = r#"{"objectType":"place","location":{"type":"LineString","coordinates":[[1,2]]}}"#;
    assert_eq!(engine.decode(bad).unwrap_err().path(), Some("$.location.coordinates"));
}

#[test]
fn features_and_reference_systems() {
    let engine = setup();
    let json: Json = serde_json::from_str(
        r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
            "features": [
                {"type": "Feature", "id": 7, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "properties": {"name": "Dinagat Islands"}}
            ]
        }"#,
    )
    .unwrap();
    let dispatch = engine.dispatch();
    let collection = dispatch
        .decode_object(&json, None, Some("type"), &PropertyPath::root())
        .expect("decodes");
    let features = collection.get("features").and_then(Value::as_sequence).expect("features");
    let feature = features[0].as_node().expect("feature");
    let geometry = feature.get("geometry").and_then(Value::as_node).expect("geometry");
    assert_eq!(Geometry::wrap(geometry.clone()).position(), Some(vec![1.0, 2.0]));
    let crs = collection.get("crs").and_then(Value::as_node).expect("crs");
    assert_eq!(crs.discriminator("type"), Some("name"));

    let unnamed: Json = serde_json::from_str(r#"{"type":"Point","coordinates":[1,2],"crs":{"type":"name","properties":{}}}"#).unwrap();
    let err = dispatch
        .decode_object(&unnamed, None, Some("type"), &PropertyPath::root())
        .unwrap_err();
    assert_eq!(err.path(), Some("$.crs.properties.name"));
}

#[test]
fn features_are_not_geometries() {
    let engine = setup();
    let err = engine
        .decode_as::<Geometry>(r#"{"type":"Feature","geometry":null,"properties":null}"#)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.type"));
}
