use indexmap::IndexMap;
use serde_json::json;

use crate::config::NormalizerConfig;
use crate::normalization::{normalize_document, NormalizationError};
use crate::tests::testkit::{init_logger, variables, PETS_SCHEMA};
use crate::utils::parsing::parse_operation;

#[test]
fn normalizes_every_skip_include_combination() {
    init_logger();
    let document = parse_operation(
        r#"
        query A($withOwner: Boolean!, $skipName: Boolean!) {
          pet {
            name @skip(if: $skipName)
            owner @include(if: $withOwner) { name }
          }
        }

        query B {
          animal { __typename }
        }
        "#,
    );

    let normalized =
        normalize_document(&PETS_SCHEMA, &document, &NormalizerConfig::default()).unwrap();
    assert_eq!(normalized.normalized_operations.len(), 5);

    let assumed: Vec<Option<IndexMap<String, bool>>> = normalized
        .normalized_operations
        .iter()
        .map(|op| op.assumed_skip_include_variables.clone())
        .collect();
    assert_eq!(
        assumed[0],
        Some(IndexMap::from([
            ("skipName".to_string(), false),
            ("withOwner".to_string(), false)
        ]))
    );
    assert_eq!(
        assumed[3],
        Some(IndexMap::from([
            ("skipName".to_string(), true),
            ("withOwner".to_string(), true)
        ]))
    );
    assert_eq!(assumed[4], None);

    let all_on = normalized
        .operation_for(
            Some("A"),
            &variables(json!({ "skipName": true, "withOwner": true })),
        )
        .unwrap();
    insta::assert_snapshot!(all_on, @r"
    query A {
      Query.pet {
        [Dog, Cat].owner {
          Human.name
        }
      }
    }
    ");

    let all_off = normalized
        .operation_for(
            Some("A"),
            &variables(json!({ "skipName": false, "withOwner": false })),
        )
        .unwrap();
    insta::assert_snapshot!(all_off, @r"
    query A {
      Query.pet {
        [Dog, Cat].name
      }
    }
    ");

    let b = normalized.operation_for(Some("B"), &variables(json!({}))).unwrap();
    insta::assert_snapshot!(b, @r"
    query B {
      Query.animal {
        [Dog, Cat].__typename
      }
    }
    ");

    assert!(normalized
        .operation_for(Some("C"), &variables(json!({})))
        .is_none());
}

#[test]
fn leaves_variable_arguments_unresolved() {
    init_logger();
    let document = parse_operation(
        r#"
        query ($id: ID!, $first: Int) {
          dog(id: $id) {
            friends(first: $first) { name }
            other: friends(first: 3) { name }
          }
        }
        "#,
    );

    let normalized =
        normalize_document(&PETS_SCHEMA, &document, &NormalizerConfig::default()).unwrap();
    assert_eq!(normalized.normalized_operations.len(), 1);

    let operation = normalized.operation_for(None, &variables(json!({}))).unwrap();
    insta::assert_snapshot!(operation, @r"
    query {
      Query.dog {
        Dog.friends {
          Dog.name
        }
        other: Dog.friends(first: 3) {
          Dog.name
        }
      }
    }
    ");
}

fn skip_per_field(count: usize) -> String {
    let definitions: Vec<String> = (0..count).map(|i| format!("$v{i}: Boolean!")).collect();
    let fields: Vec<String> = (0..count)
        .map(|i| format!("n{i}: name @skip(if: $v{i})"))
        .collect();
    format!(
        "query Many({}) {{ pet {{ {} }} }}",
        definitions.join(", "),
        fields.join(" ")
    )
}

#[test]
fn bounds_the_number_of_skip_include_variables() {
    init_logger();
    let document = parse_operation(&skip_per_field(11));

    let error = normalize_document(&PETS_SCHEMA, &document, &NormalizerConfig::default())
        .unwrap_err();
    assert!(matches!(
        error,
        NormalizationError::TooManySkipIncludeVariables {
            count: 11,
            max_skip_include_variables: 10
        }
    ));
    assert_eq!(
        error.to_string(),
        "Too many @skip/@include variables in operation. 11 > 10"
    );

    let document = parse_operation(&skip_per_field(3));
    let normalized =
        normalize_document(&PETS_SCHEMA, &document, &NormalizerConfig::default()).unwrap();
    assert_eq!(normalized.normalized_operations.len(), 8);
}

#[test]
fn rejects_more_combinations_than_can_be_counted() {
    init_logger();
    let document = parse_operation(&skip_per_field(64));
    let config = NormalizerConfig {
        max_skip_include_variables: 100,
        ..NormalizerConfig::default()
    };

    let error = normalize_document(&PETS_SCHEMA, &document, &config).unwrap_err();
    assert!(matches!(
        error,
        NormalizationError::TooManySkipIncludeVariables { count: 64, .. }
    ));
}
