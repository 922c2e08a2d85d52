use serde_json::json;

use crate::compiler::{compile_to_document_with_defer_support, NoVariables};
use crate::config::NormalizerConfig;
use crate::normalization::DeferExecution;
use crate::tests::testkit::{init_logger, try_normalize_with, PETS_SCHEMA};

const DEFERRED: &str = r#"
{
  pet {
    name
    ... @defer(label: "slow") {
      owner { name }
    }
    ... on Dog @defer {
      barks
    }
    ... @defer(label: "never", if: false) {
      id: name
    }
    ... @defer(label: "partial") {
      name
    }
  }
}
"#;

fn with_defer_support() -> NormalizerConfig {
    NormalizerConfig {
        defer_support: true,
        ..NormalizerConfig::default()
    }
}

#[test]
fn tracks_deferred_fields() {
    init_logger();
    let operation = try_normalize_with(DEFERRED, json!({}), &with_defer_support()).unwrap();

    insta::assert_snapshot!(operation, @r#"
    query {
      Query.pet {
        [Dog, Cat].name
        [Dog, Cat].owner @defer(label: "slow") {
          Human.name
        }
        Dog.barks @defer
        id: [Dog, Cat].name
      }
    }
    "#);

    let pet = operation.field(operation.top_level_fields()[0]);
    let owner = operation.field(pet.children()[1]);
    assert_eq!(
        owner.defer_executions().iter().collect::<Vec<_>>(),
        vec![&DeferExecution::new(Some("slow".to_string()))]
    );
}

#[test]
fn ignores_defer_unless_enabled() {
    init_logger();
    let operation = try_normalize_with(DEFERRED, json!({}), &NormalizerConfig::default()).unwrap();

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        [Dog, Cat].name
        [Dog, Cat].owner {
          Human.name
        }
        Dog.barks
        id: [Dog, Cat].name
      }
    }
    ");
}

#[test]
fn compiles_deferred_fields_into_fragments() {
    init_logger();
    let operation = try_normalize_with(DEFERRED, json!({}), &with_defer_support()).unwrap();

    let result = compile_to_document_with_defer_support(
        &PETS_SCHEMA,
        operation.operation_kind(),
        None,
        &operation,
        operation.top_level_fields(),
        &NoVariables,
    )
    .unwrap();

    insta::assert_snapshot!(result.document, @r#"
    query {
      pet {
        name
        id: name
        ... @defer(label: "slow") {
          owner {
            ... on Human {
              name
            }
          }
        }
        ... on Dog @defer {
          barks
        }
      }
    }
    "#);
}
