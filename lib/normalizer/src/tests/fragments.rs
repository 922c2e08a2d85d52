use serde_json::json;

use crate::config::NormalizerConfig;
use crate::tests::testkit::{init_logger, normalize, try_normalize_with};

const WITH_CONDITIONS: &str = r#"
query ($withBarks: Boolean!) {
  ...Root
}

fragment Root on Query {
  pet {
    ...PetName
    id: name @skip(if: true)
    ... on Dog @include(if: $withBarks) {
      barks
    }
  }
}

fragment PetName on Pet {
  name
}
"#;

#[test]
fn evaluates_skip_and_include() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();

    let without = try_normalize_with(
        WITH_CONDITIONS,
        json!({ "withBarks": false }),
        &NormalizerConfig::default(),
    )?;
    insta::assert_snapshot!(without, @r"
    query {
      Query.pet {
        [Dog, Cat].name
      }
    }
    ");

    let with = try_normalize_with(
        WITH_CONDITIONS,
        json!({ "withBarks": true }),
        &NormalizerConfig::default(),
    )?;
    insta::assert_snapshot!(with, @r"
    query {
      Query.pet {
        [Dog, Cat].name
        Dog.barks
      }
    }
    ");

    Ok(())
}

#[test]
fn narrows_object_types_through_abstract_conditions() {
    init_logger();
    let operation = normalize(
        r#"
        {
          animal {
            ... on Node { id }
            ... on Pet { name }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.animal {
        [Dog, Cat].id
        [Dog, Cat].name
      }
    }
    ");
}

#[test]
fn prunes_branches_no_object_type_can_reach() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            ... on Dog { ... on Cat { meows } }
            name
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        [Dog, Cat].name
      }
    }
    ");
}

#[test]
fn aliases_are_distinct_result_keys() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            a: name
            b: name
            ... on Dog { a: name }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        a: [Dog, Cat].name
        b: [Dog, Cat].name
      }
    }
    ");
}

/// `levels` fragments, each spreading the next one twice.
fn doubled_fragment_chain(levels: usize, nested: bool) -> String {
    let mut operation = String::from(r#"{ dog(id: "1") { ...Level0 } }"#);
    for level in 0..levels {
        let next = format!("...Level{} ...Level{}", level + 1, level + 1);
        let body = if nested {
            format!("friends {{ {next} }}")
        } else {
            next
        };
        operation.push_str(&format!("\nfragment Level{level} on Dog {{ {body} }}"));
    }
    operation.push_str(&format!("\nfragment Level{levels} on Dog {{ name }}"));
    operation
}

#[test]
fn repeated_spreads_under_nested_fields_are_collected_once() {
    init_logger();
    let operation = normalize(&doubled_fragment_chain(40, true));

    // dog, one friends per level and the name at the bottom
    assert_eq!(operation.field_count(), 42);
    assert_eq!(operation.max_depth(), 42);
    for (id, field) in operation.fields() {
        assert_eq!(operation.merged_field(id).len(), 1, "{}", field.field_name());
    }
}

#[test]
fn repeated_spreads_in_one_selection_set_are_collected_once() {
    init_logger();
    let operation = normalize(&doubled_fragment_chain(64, false));

    insta::assert_snapshot!(operation, @r#"
    query {
      Query.dog(id: "1") {
        Dog.name
      }
    }
    "#);
    let dog = operation.top_level_fields()[0];
    let name = operation.field(dog).children()[0];
    assert_eq!(operation.merged_field(name).len(), 1);
}
