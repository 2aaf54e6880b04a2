use std::hint::black_box;

use activity_json::engine::Engine;
use activity_json::vocab::{ActivityModule, GeoModule};
use criterion::{criterion_group, criterion_main, Criterion};

const ACTIVITY: &str = r#"{
    "objectType": "activity",
    "verb": "post",
    "published": "2011-02-10T15:04:55+02:00",
    "actor": {"objectType": "person", "displayName": "Martin Smith", "url": "http://example.org/martin"},
    "object": {
        "objectType": "note",
        "title": {"en": "Hello", "sv": "Hej"},
        "tags": [{"objectType": "person", "displayName": "Jane"}, {"objectType": "place", "displayName": "Home"}]
    },
    "links": {"self": "http://example.org/a/1", "alternate": ["http://a", "http://b"]}
}"#;

const PLACE: &str = r#"{
    "objectType": "place",
    "displayName": "Field",
    "location": {"type": "Polygon", "coordinates": [[[100.0, 0.0], [101.0, 0.0], [101.0, 1.0], [100.0, 1.0], [100.0, 0.0]]]}
}"#;

pub fn criterion_benchmark(c: &mut Criterion) {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(GeoModule)
        .build()
        .expect("engine builds");

    c.bench_function("decode activity", |b| b.iter(|| engine.decode(black_box(ACTIVITY))));
    let activity = engine.decode(ACTIVITY).expect("decodes");
    c.bench_function("encode activity", |b| b.iter(|| engine.encode(black_box(&activity))));

    c.bench_function("decode place", |b| b.iter(|| engine.decode(black_box(PLACE))));
    let place = engine.decode(PLACE).expect("decodes");
    c.bench_function("encode place", |b| b.iter(|| engine.encode(black_box(&place))));

    let untyped = Engine::builder().build().expect("engine builds");
    c.bench_function("decode untyped", |b| b.iter(|| untyped.decode(black_box(ACTIVITY))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
