use std::sync::Arc;

use activity_json::adapter::{Adapter, AdapterRegistryBuilder, Dispatch, Matcher, PropertyPath, Slot};
use activity_json::datatype::Value;
use activity_json::engine::Engine;
use activity_json::module::FnModule;
use activity_json::schema::{Coercion, ModelRules, Schema, SchemaBuilder};
use activity_json::vocab::ActivityModule;
use activity_json::{ActivityError, Node, Result};
use serde_json::{Map, Value as Json};

// Marks every node it decodes, and every object it encodes, with its own name.
struct Tagging(&'static str);

impl Adapter for Tagging {
    fn name(&self) -> &str {
        self.0
    }
    fn decode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, object: &Map<String, Json>, path: &PropertyPath) -> Result<Node> {
        let node = dispatch.decode_properties(slot, object, path)?;
        Ok(node.to_builder().set("decodedBy", self.0).get())
    }
    fn encode(&self, dispatch: &Dispatch<'_>, slot: &Slot<'_>, node: &Node, path: &PropertyPath) -> Result<Map<String, Json>> {
        let mut object = dispatch.encode_properties(slot, node, path)?;
        object.insert(String::from("encodedBy"), Json::String(self.0.to_owned()));
        Ok(object)
    }
}

fn tagging_module(name: &'static str, matcher: Matcher) -> FnModule {
    FnModule::new(name).on_register(move |adapters: &mut AdapterRegistryBuilder, _schema: &Arc<Schema>| {
        adapters.register(matcher.clone(), Tagging(name));
        Ok(())
    })
}

fn ticket_module() -> FnModule {
    FnModule::new("ticket").on_define(|schema: &mut SchemaBuilder| {
        schema.define_model(
            "ticket",
            ModelRules::new()
                .required("priority", Coercion::Number)
                .property("status", Coercion::enum_of(&["open", "closed"]))
                .property("labels", Coercion::sequence_of(Coercion::enum_of(&["bug", "feature"]))),
        )?;
        Ok(())
    })
}

fn decoded_by(node: &Node) -> Option<&str> {
    node.get("decodedBy").and_then(Value::as_str)
}

#[test]
fn later_module_overrides_earlier_adapter() {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(tagging_module("first", Matcher::Discriminator("place".into())))
        .module(tagging_module("second", Matcher::Discriminator("place".into())))
        .build()
        .expect("engine builds");
    let place = engine
        .decode(r#"{"objectType":"place","displayName":"Home"}"#)
        .expect("decodes");
    assert_eq!(decoded_by(&place), Some("second"));
    let written = engine.encode(&place).unwrap();
    assert!(written.contains(r#""encodedBy":"second""#));
}

#[test]
fn family_adapters_cover_every_member() {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(tagging_module("objects", Matcher::Family("object".into())))
        .build()
        .expect("engine builds");
    let note = engine.decode(r#"{"objectType":"note"}"#).unwrap();
    assert_eq!(decoded_by(&note), Some("objects"));
    // activities belong to the object family as well
    let activity = engine.decode(r#"{"objectType":"activity","verb":"post"}"#).unwrap();
    assert_eq!(decoded_by(&activity), Some("objects"));
    // unknown types have no model and fall through to the model adapter
    let unknown = engine.decode(r#"{"objectType":"unicorn","horns":1}"#).unwrap();
    assert_eq!(decoded_by(&unknown), None);
    assert_eq!(unknown.get("horns"), Some(&Value::Integer(1)));
}

#[test]
fn exact_discriminator_beats_a_later_family_match() {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(tagging_module("notes", Matcher::Discriminator("note".into())))
        .module(tagging_module("objects", Matcher::Family("object".into())))
        .build()
        .expect("engine builds");
    let note = engine.decode(r#"{"objectType":"note"}"#).unwrap();
    assert_eq!(decoded_by(&note), Some("notes"));
    let person = engine.decode(r#"{"objectType":"person"}"#).unwrap();
    assert_eq!(decoded_by(&person), Some("objects"));
}

#[test]
fn class_adapters_apply_to_statically_typed_slots() {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(tagging_module("addresses", Matcher::Class("address".into())))
        .build()
        .expect("engine builds");
    let place = engine
        .decode(r#"{"objectType":"place","address":{"locality":"Stockholm"}}"#)
        .unwrap();
    let address = place.get("address").and_then(Value::as_node).expect("address");
    assert_eq!(decoded_by(address), Some("addresses"));
    assert_eq!(decoded_by(&place), None);
}

#[test]
fn conflicting_redeclaration_fails_assembly() {
    let conflicting = FnModule::new("plain-titles").on_define(|schema: &mut SchemaBuilder| {
        schema.define_model("note", ModelRules::new().property("title", Coercion::String))?;
        Ok(())
    });
    let err = Engine::builder()
        .module(ActivityModule)
        .module(conflicting)
        .build()
        .unwrap_err();
    assert!(matches!(err, ActivityError::Configuration(_)));
    let message = err.to_string();
    assert!(message.contains("plain-titles"), "{message}");
    assert!(message.contains("title"), "{message}");
}

#[test]
fn modules_extend_existing_models() {
    let moods = FnModule::new("moods").on_define(|schema: &mut SchemaBuilder| {
        schema.define_model(
            "note",
            ModelRules::new()
                .family("post")
                .property("title", Coercion::LanguageMap)
                .property("mood", Coercion::enum_of(&["happy", "sad"])),
        )?;
        Ok(())
    });
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(moods)
        .build()
        .expect("compatible redeclaration merges");
    let note = engine.schema().lookup_discriminator("note").expect("note model");
    assert!(note.belongs_to("object"));
    assert!(note.belongs_to("post"));
    assert!(note.rule("content").is_some());
    let err = engine.decode(r#"{"objectType":"note","mood":"angry"}"#).unwrap_err();
    assert_eq!(err.path(), Some("$.mood"));
}

#[test]
fn engines_extend_prebuilt_schemas() {
    let base = Engine::builder().module(ActivityModule).build().unwrap();
    let extended = Engine::builder()
        .schema(Arc::clone(base.schema()))
        .module(ticket_module())
        .build()
        .unwrap();
    assert!(extended.schema().lookup_discriminator("note").is_some());
    assert!(extended.schema().lookup_discriminator("ticket").is_some());
    assert!(base.schema().lookup_discriminator("ticket").is_none());
}

#[test]
fn enumerations_and_required_properties() {
    let engine = Engine::builder()
        .module(ActivityModule)
        .module(ticket_module())
        .build()
        .unwrap();

    let ok = engine.decode(r#"{"objectType":"ticket","priority":2,"status":"open"}"#).unwrap();
    assert_eq!(ok.get("priority"), Some(&Value::Integer(2)));

    let err = engine.decode(r#"{"objectType":"ticket","priority":2,"status":"archived"}"#).unwrap_err();
    assert_eq!(err.path(), Some("$.status"));
    assert!(err.to_string().contains("enum-of(closed|open)"));

    let err = engine.decode(r#"{"objectType":"ticket","priority":1,"labels":["bug","chore"]}"#).unwrap_err();
    assert_eq!(err.path(), Some("$.labels[1]"));

    let err = engine.decode(r#"{"objectType":"ticket","status":"open"}"#).unwrap_err();
    assert_eq!(err.path(), Some("$.priority"));

    let err = engine
        .decode(r#"{"objectType":"activity","object":{"objectType":"ticket","priority":"high"}}"#)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.object.priority"));
}

#[test]
fn encoding_checks_the_same_rules() {
    let engine = Engine::builder().module(ticket_module()).build().unwrap();

    let bad_status = Node::builder()
        .set("objectType", "ticket")
        .set("priority", 1)
        .set("status", "archived")
        .get();
    let err = engine.encode(&bad_status).unwrap_err();
    assert!(matches!(err, ActivityError::Encode { .. }));
    assert_eq!(err.path(), Some("$.status"));

    let missing = Node::builder().set("objectType", "ticket").get();
    assert_eq!(engine.encode(&missing).unwrap_err().path(), Some("$.priority"));

    let not_finite = Node::builder()
        .set("objectType", "ticket")
        .set("priority", 1)
        .set("weight", f64::NAN)
        .get();
    assert_eq!(engine.encode(&not_finite).unwrap_err().path(), Some("$.weight"));
}
