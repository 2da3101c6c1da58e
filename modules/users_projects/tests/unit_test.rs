use serde_json::json;

use users_projects::config::UsersProjectsConfig;
use users_projects::contract::model::*;
use users_projects::domain::error::DomainError;
use users_projects::domain::repo::StoreError;
use users_projects::domain::validator::{ValidationRules, Validator};
// Note: These internal module imports are only for testing
// External consumers should only use the `contract` module

#[test]
fn test_config_defaults_match_validation_rules() {
    let cfg = UsersProjectsConfig::from_value(None).unwrap();
    assert_eq!(cfg.validation_rules(), ValidationRules::default());
}

#[test]
fn test_config_overrides_flow_into_rules() {
    let value = json!({"min_age": 16, "max_description_length": 500});
    let cfg = UsersProjectsConfig::from_value(Some(&value)).unwrap();

    let rules = cfg.validation_rules();
    assert_eq!(rules.min_age, 16);
    assert_eq!(rules.max_description_length, 500);
    assert_eq!(rules.max_user_name_length, 50);

    let validator = Validator::new(rules);
    let teen = UserFields {
        name: "Sam".to_string(),
        email: "sam@example.com".to_string(),
        age: 17,
        student_id: "S7654321".to_string(),
    };
    assert!(validator.validate_create(&teen).is_ok());
    assert!(Validator::default().validate_create(&teen).is_err());
}

#[test]
fn test_config_rejects_unknown_keys() {
    let value = json!({"max_page_size": 10});
    let err = UsersProjectsConfig::from_value(Some(&value)).unwrap_err();
    assert!(err.to_string().contains("invalid users_projects config"));
}

#[test]
fn test_store_errors_map_to_domain_errors() {
    let e: DomainError = StoreError::NotFound {
        kind: EntityKind::Project,
        id: 3,
    }
    .into();
    assert!(matches!(
        e,
        DomainError::NotFound {
            kind: EntityKind::Project,
            id: 3
        }
    ));

    let e: DomainError = StoreError::Conflict {
        field: "student_id",
        value: "S1111111".to_string(),
    }
    .into();
    assert_eq!(e.to_string(), "student_id 'S1111111' is already in use");

    let e: DomainError = StoreError::Backend(anyhow::anyhow!("connection reset")).into();
    match e {
        DomainError::Database { message } => assert!(message.contains("connection reset")),
        other => panic!("Expected Database error, got {other:?}"),
    }
}

#[test]
fn test_contract_patches_report_emptiness() {
    assert!(UserPatch::default().is_empty());
    let patch = ProjectPatch {
        owner_id: users_projects::contract::Patch::Set(2),
        ..Default::default()
    };
    assert!(!patch.is_empty());
}
