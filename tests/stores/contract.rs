use countersign::core::error::CountersignError;
use countersign::core::lifecycle::ContractStatus;
use countersign::core::model::{Field, FieldType, FieldValue, Position};
use countersign::core::workspace::Workspace;
use countersign::stores::blueprint::BlueprintStore;
use countersign::stores::contract::{blueprint_label, ContractStore, UNKNOWN_BLUEPRINT};
use tempfile::tempdir;

struct Fixture {
    ws: Workspace,
    blueprints: BlueprintStore,
    contracts: ContractStore,
    blueprint_id: String,
    contract_id: String,
}

/// Scenario A setup: an NDA blueprint with one signature field, and a
/// contract instantiated from it.
fn nda_fixture(root: &std::path::Path) -> Fixture {
    let ws = Workspace::at(root.to_path_buf());
    let mut blueprints = BlueprintStore::open(&ws).unwrap();
    let blueprint = blueprints
        .create(
            "NDA",
            vec![Field::new(
                "Signer",
                FieldType::Signature,
                Position { x: 40, y: 80 },
            )],
        )
        .unwrap()
        .clone();

    let mut contracts = ContractStore::open(&ws).unwrap();
    let contract_id = contracts
        .create("Acme NDA", &blueprint)
        .unwrap()
        .id
        .clone();

    Fixture {
        ws,
        blueprints,
        contracts,
        blueprint_id: blueprint.id,
        contract_id,
    }
}

#[test]
fn test_scenario_a_create_from_blueprint() {
    let tmp = tempdir().unwrap();
    let fx = nda_fixture(tmp.path());

    let contract = fx.contracts.get(&fx.contract_id).unwrap();
    assert_eq!(contract.status, ContractStatus::Created);
    assert_eq!(contract.blueprint_id, fx.blueprint_id);
    assert_eq!(contract.fields.len(), 1);
    assert_eq!(contract.fields[0].value, FieldValue::Text(String::new()));
    assert!(!contract.created_at.is_empty());
}

#[test]
fn test_scenario_b_created_cannot_skip_to_sent() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());

    let err = fx
        .contracts
        .update_status(&fx.contract_id, ContractStatus::Sent)
        .unwrap_err();
    assert!(matches!(
        err,
        CountersignError::IllegalTransition {
            from: ContractStatus::Created,
            to: ContractStatus::Sent,
        }
    ));

    // No state change, in memory or on disk.
    assert_eq!(
        fx.contracts.get(&fx.contract_id).unwrap().status,
        ContractStatus::Created
    );
    let reopened = ContractStore::open(&fx.ws).unwrap();
    assert_eq!(
        reopened.get(&fx.contract_id).unwrap().status,
        ContractStatus::Created
    );
}

#[test]
fn test_scenario_c_full_chain_then_locked_is_terminal() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());

    for next in [
        ContractStatus::Approved,
        ContractStatus::Sent,
        ContractStatus::Signed,
        ContractStatus::Locked,
    ] {
        assert!(fx.contracts.update_status(&fx.contract_id, next).unwrap());
        assert_eq!(fx.contracts.get(&fx.contract_id).unwrap().status, next);
    }

    let err = fx
        .contracts
        .update_status(&fx.contract_id, ContractStatus::Revoked)
        .unwrap_err();
    assert!(matches!(err, CountersignError::IllegalTransition { .. }));
    assert_eq!(
        fx.contracts.get(&fx.contract_id).unwrap().status,
        ContractStatus::Locked
    );
}

#[test]
fn test_scenario_d_dangling_blueprint_reports_sentinel() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());

    assert!(fx.blueprints.delete(&fx.blueprint_id).unwrap());

    let contract = fx.contracts.get(&fx.contract_id).unwrap();
    assert_eq!(blueprint_label(&fx.blueprints, contract), UNKNOWN_BLUEPRINT);

    // The contract itself is untouched and still listable.
    assert_eq!(fx.contracts.list().len(), 1);
    assert_eq!(contract.name, "Acme NDA");
    assert_eq!(contract.fields.len(), 1);
    assert_eq!(contract.blueprint_id, fx.blueprint_id);
}

#[test]
fn test_create_refuses_empty_name() {
    let tmp = tempdir().unwrap();
    let ws = Workspace::at(tmp.path().to_path_buf());
    let mut blueprints = BlueprintStore::open(&ws).unwrap();
    let blueprint = blueprints
        .create("NDA", vec![Field::new("Signer", FieldType::Signature, Position::default())])
        .unwrap()
        .clone();

    let mut contracts = ContractStore::open(&ws).unwrap();
    let err = contracts.create("  ", &blueprint).unwrap_err();
    assert!(matches!(err, CountersignError::ValidationError(_)));
    assert!(contracts.list().is_empty());
}

#[test]
fn test_update_status_unknown_contract_is_a_noop() {
    let tmp = tempdir().unwrap();
    let ws = Workspace::at(tmp.path().to_path_buf());
    let mut contracts = ContractStore::open(&ws).unwrap();

    let applied = contracts
        .update_status("missing", ContractStatus::Approved)
        .unwrap();
    assert!(!applied);
}

#[test]
fn test_update_field_value_edits_live_contracts() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());
    let field_id = fx.contracts.get(&fx.contract_id).unwrap().fields[0]
        .field
        .id
        .clone();

    let applied = fx
        .contracts
        .update_field_value(
            &fx.contract_id,
            &field_id,
            FieldValue::Text("Jane Doe".to_string()),
        )
        .unwrap();
    assert!(applied);
    assert_eq!(
        fx.contracts.get(&fx.contract_id).unwrap().fields[0].value,
        FieldValue::Text("Jane Doe".to_string())
    );

    // Unresolved ids are a no-op, not an error.
    assert!(!fx
        .contracts
        .update_field_value(&fx.contract_id, "missing-field", FieldValue::Checked(true))
        .unwrap());
    assert!(!fx
        .contracts
        .update_field_value("missing-contract", &field_id, FieldValue::Checked(true))
        .unwrap());
}

#[test]
fn test_terminal_contract_refuses_field_edits() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());
    let field_id = fx.contracts.get(&fx.contract_id).unwrap().fields[0]
        .field
        .id
        .clone();

    fx.contracts
        .update_status(&fx.contract_id, ContractStatus::Revoked)
        .unwrap();

    let err = fx
        .contracts
        .update_field_value(
            &fx.contract_id,
            &field_id,
            FieldValue::Text("late edit".to_string()),
        )
        .unwrap_err();
    assert!(matches!(err, CountersignError::ValidationError(_)));
    assert_eq!(
        fx.contracts.get(&fx.contract_id).unwrap().fields[0].value,
        FieldValue::Text(String::new())
    );
}

#[test]
fn test_editing_a_contract_never_touches_the_blueprint() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());
    let field_id = fx.contracts.get(&fx.contract_id).unwrap().fields[0]
        .field
        .id
        .clone();

    fx.contracts
        .update_field_value(
            &fx.contract_id,
            &field_id,
            FieldValue::Text("Jane Doe".to_string()),
        )
        .unwrap();

    let blueprint = fx.blueprints.get(&fx.blueprint_id).unwrap();
    assert_eq!(blueprint.fields.len(), 1);
    assert_eq!(blueprint.fields[0].label, "Signer");

    // The persisted blueprint record is equally untouched.
    let reopened = BlueprintStore::open(&fx.ws).unwrap();
    assert_eq!(reopened.get(&fx.blueprint_id), Some(blueprint));
}

#[test]
fn test_delete_is_idempotent() {
    let tmp = tempdir().unwrap();
    let mut fx = nda_fixture(tmp.path());

    assert!(fx.contracts.delete(&fx.contract_id).unwrap());
    assert!(!fx.contracts.delete(&fx.contract_id).unwrap());
    assert!(fx.contracts.list().is_empty());
}

#[test]
fn test_stats_counts_by_status() {
    let tmp = tempdir().unwrap();
    let ws = Workspace::at(tmp.path().to_path_buf());
    let mut blueprints = BlueprintStore::open(&ws).unwrap();
    let blueprint = blueprints
        .create("NDA", vec![Field::new("Signer", FieldType::Signature, Position::default())])
        .unwrap()
        .clone();

    let mut contracts = ContractStore::open(&ws).unwrap();
    let a = contracts.create("A", &blueprint).unwrap().id.clone();
    contracts.create("B", &blueprint).unwrap();
    contracts.create("C", &blueprint).unwrap();
    contracts.update_status(&a, ContractStatus::Approved).unwrap();

    let stats = contracts.stats();
    assert_eq!(stats.get(&ContractStatus::Created), Some(&2));
    assert_eq!(stats.get(&ContractStatus::Approved), Some(&1));
    assert_eq!(stats.get(&ContractStatus::Locked), None);
}
