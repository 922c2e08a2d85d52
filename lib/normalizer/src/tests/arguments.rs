use serde_json::json;

use crate::config::NormalizerConfig;
use crate::normalization::NormalizationError;
use crate::tests::testkit::{init_logger, normalize, try_normalize_with};
use crate::values::CoercionError;

#[test]
fn applies_argument_defaults() {
    init_logger();
    let operation = normalize("{ pets { name } }");

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pets(first: 10) {
        [Dog, Cat].name
      }
    }
    ");

    let pets = operation.field(operation.top_level_fields()[0]);
    assert_eq!(pets.resolved_argument("first"), Some(&json!(10)));
    assert_eq!(pets.resolved_argument("species"), None);
    assert_eq!(pets.normalized_argument("first").unwrap().type_name, "Int");
}

#[test]
fn resolves_arguments_from_variables() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let operation = try_normalize_with(
        r#"
        query ($species: [Species!], $n: Int) {
          pets(first: $n, species: $species) { name }
        }
        "#,
        json!({ "species": "DOG" }),
        &NormalizerConfig::default(),
    )?;

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pets(species: [DOG]) {
        [Dog, Cat].name
      }
    }
    ");

    let pets = operation.field(operation.top_level_fields()[0]);
    // a written argument whose variable is missing does not fall back to the default
    assert_eq!(pets.resolved_argument("first"), None);
    assert_eq!(pets.resolved_argument("species"), Some(&json!(["DOG"])));
    assert_eq!(
        operation.coerced_variables().get("species"),
        Some(&json!(["DOG"]))
    );
    assert_eq!(operation.coerced_variables().get("n"), None);

    Ok(())
}

#[test]
fn fills_in_input_object_defaults() {
    init_logger();
    let operation = normalize(r#"{ search(filter: { name: "Rex", minAge: 2 }) { name } }"#);

    insta::assert_snapshot!(operation, @r#"
    query {
      Query.search(filter: {name: "Rex", species: DOG, minAge: 2}) {
        [Dog, Cat].name
      }
    }
    "#);

    let search = operation.field(operation.top_level_fields()[0]);
    assert_eq!(
        search.resolved_argument("filter"),
        Some(&json!({ "name": "Rex", "species": "DOG", "minAge": 2 }))
    );
}

#[test]
fn coerces_ids_from_integers() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let operation = try_normalize_with(
        "query ($id: ID!) { dog(id: $id) { name } }",
        json!({ "id": 7 }),
        &NormalizerConfig::default(),
    )?;

    insta::assert_snapshot!(operation, @r#"
    query {
      Query.dog(id: "7") {
        Dog.name
      }
    }
    "#);

    Ok(())
}

#[test]
fn rejects_missing_non_null_values() {
    init_logger();

    let missing_variable = try_normalize_with(
        "query ($id: ID!) { dog(id: $id) { name } }",
        json!({}),
        &NormalizerConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        missing_variable.to_string(),
        "Variable '$id' is non-nullable ('ID!') but no value was provided."
    );

    let missing_argument =
        try_normalize_with("{ dog { name } }", json!({}), &NormalizerConfig::default())
            .unwrap_err();
    assert!(matches!(
        missing_argument,
        NormalizationError::Coercion(CoercionError::NonNullArgument {
            ref field_name,
            ref argument_name,
            ref type_name,
        }) if field_name == "dog" && argument_name == "id" && type_name == "ID!"
    ));

    let missing_input_field = try_normalize_with(
        "{ search(filter: { name: \"Rex\" }) { name } }",
        json!({}),
        &NormalizerConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        missing_input_field,
        NormalizationError::Coercion(CoercionError::NullValue { ref path, .. })
            if path == "search(filter:).minAge"
    ));
}

#[test]
fn rejects_invalid_variable_values() {
    init_logger();

    let error = try_normalize_with(
        "query ($species: [Species!]) { pets(species: $species) { name } }",
        json!({ "species": ["DOG", "BIRD"] }),
        &NormalizerConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        error,
        NormalizationError::Coercion(CoercionError::InvalidValue { ref path, ref type_name, .. })
            if path == "$species[1]" && type_name == "Species"
    ));
}
