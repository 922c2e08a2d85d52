use crate::normalization::FieldCoordinates;
use crate::tests::testkit::{init_logger, normalize, PETS_SCHEMA};

#[test]
fn merges_fields_declared_by_a_shared_interface() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            ... on Dog { name barks }
            ... on Cat { name meows }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        [Dog, Cat].name
        Dog.barks
        Cat.meows
      }
    }
    ");

    let pet = operation.top_level_fields()[0];
    let children = operation.field(pet).children().to_vec();
    assert!(!operation.is_conditional(pet, &PETS_SCHEMA));
    assert!(!operation.is_conditional(children[0], &PETS_SCHEMA));
    assert!(operation.is_conditional(children[1], &PETS_SCHEMA));
    assert!(operation.is_conditional(children[2], &PETS_SCHEMA));
}

#[test]
fn keeps_fields_with_different_sub_selections_apart() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            ... on Dog { owner { name } }
            ... on Cat { owner { id } }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        Dog.owner {
          Human.name
        }
        Cat.owner {
          Human.id
        }
      }
    }
    ");
}

#[test]
fn merged_fields_keep_track_of_their_ast_fields() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            ... on Dog { owner { name } }
            ... on Cat { owner { name } }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        [Dog, Cat].owner {
          Human.name
        }
      }
    }
    ");

    // merged fields still count
    assert_eq!(operation.field_count(), 5);
    assert_eq!(operation.max_depth(), 3);

    let pet = operation.top_level_fields()[0];
    let owner = operation.field(pet).children()[0];
    let name = operation.field(owner).children()[0];

    let ast_fields = operation.merged_field(name);
    assert_eq!(ast_fields.len(), 2);
    for ast_field in ast_fields {
        assert_eq!(operation.normalized_fields_for(ast_field), &[name]);
    }
    assert_eq!(operation.merged_field(owner).len(), 2);

    assert_eq!(
        operation.normalized_fields_at(&FieldCoordinates::new("Cat", "owner")),
        &[owner]
    );
    assert_eq!(
        operation.normalized_fields_at(&FieldCoordinates::new("Human", "name")),
        &[name]
    );
    assert!(operation
        .normalized_fields_at(&FieldCoordinates::new("Dog", "barks"))
        .is_empty());
}

#[test]
fn union_members_are_merged_but_stay_conditional() {
    init_logger();
    let operation = normalize(
        r#"
        {
          animal {
            __typename
            ... on Dog { name }
            ... on Cat { name }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.animal {
        [Dog, Cat].__typename
        [Dog, Cat].name
      }
    }
    ");

    let animal = operation.top_level_fields()[0];
    let children = operation.field(animal).children().to_vec();
    assert!(!operation.is_conditional(children[0], &PETS_SCHEMA));
    assert!(operation.is_conditional(children[1], &PETS_SCHEMA));
}

#[test]
fn repeated_occurrences_share_one_field() {
    init_logger();
    let operation = normalize(
        r#"
        {
          dog(id: "1") {
            friends(first: 2) { name }
            friends(first: 2) { id }
          }
        }
        "#,
    );

    insta::assert_snapshot!(operation, @r#"
    query {
      Query.dog(id: "1") {
        Dog.friends(first: 2) {
          Dog.name
          Dog.id
        }
      }
    }
    "#);

    let dog = operation.top_level_fields()[0];
    let friends = operation.field(dog).children()[0];
    assert_eq!(operation.merged_field(friends).len(), 2);
    assert_eq!(operation.field_count(), 4);
}

#[test]
fn a_field_reached_twice_is_tracked_once() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet { ...PetName ...PetName }
        }
        fragment PetName on Pet { name }
        "#,
    );

    insta::assert_snapshot!(operation, @r"
    query {
      Query.pet {
        [Dog, Cat].name
      }
    }
    ");

    let pet = operation.top_level_fields()[0];
    let name = operation.field(pet).children()[0];
    let ast_fields = operation.merged_field(name);
    assert_eq!(ast_fields.len(), 1);
    assert_eq!(operation.normalized_fields_for(&ast_fields[0]), &[name]);
    assert_eq!(operation.field_count(), 2);
}

#[test]
fn fields_split_per_object_type_merge_back_without_duplicates() {
    init_logger();
    let operation = normalize(
        r#"
        {
          pet {
            name
            ... on Dog { name }
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

    let pet = operation.top_level_fields()[0];
    let name = operation.field(pet).children()[0];
    let ast_fields = operation.merged_field(name);
    assert_eq!(ast_fields.len(), 2);
    for ast_field in ast_fields {
        assert_eq!(operation.normalized_fields_for(ast_field), &[name]);
    }
}
