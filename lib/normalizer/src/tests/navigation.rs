use serde_json::json;

use crate::ast::OperationKind;
use crate::config::NormalizerConfig;
use crate::normalization::{get_operation, normalize_operation, NormalizationError};
use crate::tests::testkit::{init_logger, normalize, try_normalize_with, PETS_SCHEMA};
use crate::utils::parsing::parse_operation;
use crate::values::CoercedVariables;

const TREE: &str = r#"
{
  pet {
    name
    owner {
      id
      pets { name }
    }
  }
  animal { __typename }
}
"#;

#[test]
fn walks_the_normalized_tree() {
    init_logger();
    let operation = normalize(TREE);

    let pet = operation.top_level_fields()[0];
    let mut visited = vec![];
    operation.traverse_sub_tree(pet, |_, field| visited.push(field.print_details()));
    assert_eq!(
        visited,
        vec![
            "[Dog, Cat].name",
            "[Dog, Cat].owner",
            "Human.id",
            "Human.pets",
            "[Dog, Cat].name"
        ]
    );

    let first_two_levels: Vec<String> = operation
        .children_up_to_level(pet, 2)
        .into_iter()
        .map(|id| operation.field(id).print_details())
        .collect();
    assert_eq!(
        first_two_levels,
        vec!["[Dog, Cat].name", "[Dog, Cat].owner", "Human.id", "Human.pets"]
    );

    let owner = operation.children_with_same_result_key(Some(pet), "owner");
    assert_eq!(owner.len(), 1);
    let pets = operation.field(owner[0]).children()[1];
    let nested_name = operation.field(pets).children()[0];
    assert_eq!(
        operation.list_of_result_keys(nested_name),
        vec!["pet", "owner", "pets", "name"]
    );
    assert_eq!(operation.field(nested_name).level(), 4);
    assert_eq!(operation.field(nested_name).parent(), Some(pets));

    assert_eq!(operation.field(pet).output_type(&PETS_SCHEMA).to_string(), "Pet");
    assert_eq!(operation.field(owner[0]).output_type(&PETS_SCHEMA).to_string(), "Human");
    assert_eq!(operation.field(pets).output_type(&PETS_SCHEMA).to_string(), "[Pet]");

    let animal = operation.children_with_same_result_key(None, "animal");
    assert_eq!(animal, vec![operation.top_level_fields()[1]]);

    // parents come before their children
    let levels: Vec<usize> = operation.fields().map(|(_, f)| f.level()).collect();
    assert_eq!(levels, vec![1, 2, 2, 3, 3, 4, 1, 2]);
}

#[test]
#[should_panic(expected = "relative level must be >= 1")]
fn children_up_to_level_zero_panics() {
    let operation = normalize(TREE);
    operation.children_up_to_level(operation.top_level_fields()[0], 0);
}

#[test]
fn selects_the_operation_to_normalize() {
    init_logger();
    let document = parse_operation(
        r#"
        query A { pet { name } }
        query B { animal { __typename } }
        fragment F on Query { pet { name } }
        "#,
    );

    assert!(matches!(
        get_operation(&document, None),
        Err(NormalizationError::MultipleMatchingOperationsFound)
    ));
    assert!(matches!(
        get_operation(&document, Some("C")),
        Err(NormalizationError::SpecifiedOperationNotFound { ref operation_name }) if operation_name == "C"
    ));
    assert_eq!(
        get_operation(&document, Some("B")).unwrap().name.as_deref(),
        Some("B")
    );

    let fragments_only = parse_operation("fragment F on Query { pet { name } }");
    assert!(matches!(
        get_operation(&fragments_only, None),
        Err(NormalizationError::OperationNotFound)
    ));

    let operation = normalize_operation(
        &PETS_SCHEMA,
        &document,
        Some("B"),
        &CoercedVariables::empty(),
        &NormalizerConfig::default(),
    )
    .unwrap();
    assert_eq!(operation.operation_name(), Some("B"));
    assert_eq!(operation.operation_kind(), OperationKind::Query);
}

#[test]
fn requires_a_root_type() {
    init_logger();

    let error = try_normalize_with("subscription { pet { name } }", json!({}), &NormalizerConfig::default())
        .unwrap_err();
    assert!(matches!(
        error,
        NormalizationError::MissingRootType {
            operation_kind: OperationKind::Subscription
        }
    ));

    let mutation = try_normalize_with(
        r#"mutation { addPet(name: "Rex") { name } }"#,
        json!({}),
        &NormalizerConfig::default(),
    )
    .unwrap();
    insta::assert_snapshot!(mutation, @r#"
    mutation {
      Mutation.addPet(name: "Rex") {
        [Dog, Cat].name
      }
    }
    "#);
}

#[test]
fn reports_unknown_fields() {
    init_logger();

    let error = try_normalize_with("{ pet { name } cat }", json!({}), &NormalizerConfig::default())
        .unwrap_err();
    assert_eq!(error.to_string(), "Field 'cat' not found in type 'Query'.");
}
