use std::sync::Once;

use lazy_static::lazy_static;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::NormalizerConfig;
use crate::normalization::{
    normalize_operation_with_raw_variables, NormalizationError, NormalizedOperation,
};
use crate::schema::SchemaState;
use crate::utils::parsing::{parse_operation, parse_schema};

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
    pub static ref PETS_SCHEMA: SchemaState = parse_schema(PETS_SDL);
}

pub fn init_logger() {
    TRACING_INIT.call_once(|| {
        init_test_logger_internal();
    });
}

pub const PETS_SDL: &str = r#"
type Query {
  pet: Pet
  pets(first: Int = 10, species: [Species!]): [Pet!]!
  animal: Animal
  dog(id: ID!): Dog
  search(filter: PetFilter): [Pet]
}

type Mutation {
  addPet(name: String!): Pet
}

interface Node {
  id: ID!
}

interface Pet {
  name: String
  owner: Human
}

type Dog implements Pet & Node {
  id: ID!
  name: String
  barks: Boolean
  owner: Human
  friends(first: Int): [Dog]
}

type Cat implements Pet & Node {
  id: ID!
  name: String
  meows: Boolean
  owner: Human
}

type Human implements Node {
  id: ID!
  name: String
  pets: [Pet]
}

union Animal = Dog | Cat

enum Species {
  DOG
  CAT
}

input PetFilter {
  name: String
  species: Species = DOG
  minAge: Int!
}
"#;

pub fn variables(value: JsonValue) -> JsonMap<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("variables must be an object, got {other}"),
    }
}

pub fn try_normalize_with(
    operation: &str,
    raw_variables: JsonValue,
    config: &NormalizerConfig,
) -> Result<NormalizedOperation, NormalizationError> {
    let document = parse_operation(operation);
    normalize_operation_with_raw_variables(
        &PETS_SCHEMA,
        &document,
        None,
        &variables(raw_variables),
        config,
    )
}

pub fn normalize(operation: &str) -> NormalizedOperation {
    try_normalize_with(operation, json!({}), &NormalizerConfig::default())
        .expect("operation normalizes")
}
