//! Contract creation, node edits and structure replacement scenarios

mod support;

use std::collections::HashMap;

use costledger_core::contracts::{
    ContractCostNodeService, ContractStructureUpdate, CreateContractService, UpdateContractService,
    UpdateContractStructureService,
};
use costledger_core::{CostNodeEntityValidator, CostNodeTreeBuilder};
use costledger_domain::{
    Amount, ContractStarter, ContractStatus, CostNodeInput, CostNodeRow, InvoiceLine, LedgerError,
    UnitOfMeasure, VatRate,
};
use uuid::Uuid;

use support::fixtures::{metadata, money, sample_tree, TestLedger, OWNER_NIP};

fn structure_service(ledger: &TestLedger) -> UpdateContractStructureService {
    UpdateContractStructureService::new(ledger.contracts(), ledger.cost_nodes())
}

fn book_cost(ledger: &TestLedger, contract_id: Uuid, node_code: &str) {
    let node = ledger.cost_nodes().get_by_code(contract_id, node_code).unwrap().unwrap();
    let line = InvoiceLine {
        id: Uuid::new_v4(),
        invoice_id: None,
        contract_id: Some(contract_id),
        cost_node_id: Some(node.id),
        cost_type_id: None,
        item_name: "cement".into(),
        description: None,
        quantity: None,
        unit: UnitOfMeasure::Piece,
        amount: Amount::new(money("10"), VatRate::Vat23),
    };
    ledger.lines().add(&line).unwrap();
}

fn codes(ledger: &TestLedger, contract_id: Uuid) -> Vec<String> {
    let mut codes: Vec<String> =
        ledger.store.nodes_of(contract_id).into_iter().map(|node| node.code).collect();
    codes.sort();
    codes
}

#[test]
fn created_contract_gets_technical_root() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");

    let nodes = ledger.store.nodes_of(contract.id);
    assert_eq!(nodes.len(), 5);
    assert!(CostNodeEntityValidator::validate(&nodes).is_ok());

    let root = nodes.iter().find(|node| node.parent_id.is_none()).unwrap();
    assert_eq!(root.code, "ROOT");
    assert_eq!(root.budget, Some(money("400")));
}

#[test]
fn duplicate_contract_code_is_a_conflict() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");

    let mut service =
        CreateContractService::new(ledger.contracts(), ledger.cost_nodes(), ledger.companies());
    let err = service
        .init(ContractStarter {
            code: "K-1".into(),
            owner_id: contract.owner_id,
            client_id: contract.client_id,
            metadata: metadata("again", ContractStatus::Planned),
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn execute_without_init_is_rejected() {
    let ledger = TestLedger::new();
    let mut service =
        CreateContractService::new(ledger.contracts(), ledger.cost_nodes(), ledger.companies());

    assert!(matches!(service.add_cost_node_tree(sample_tree()), Err(LedgerError::InvalidInput(_))));
    assert!(matches!(service.execute(), Err(LedgerError::InvalidInput(_))));
}

#[test]
fn unknown_owner_is_rejected() {
    let ledger = TestLedger::new();
    let client = ledger.seed_company("Client", OWNER_NIP, costledger_domain::CompanyRole::Client);
    let mut service =
        CreateContractService::new(ledger.contracts(), ledger.cost_nodes(), ledger.companies());

    let err = service
        .init(ContractStarter {
            code: "K-9".into(),
            owner_id: Uuid::new_v4(),
            client_id: client.id,
            metadata: metadata("K-9", ContractStatus::Planned),
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[test]
fn metadata_and_status_updates() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    let service = UpdateContractService::new(ledger.contracts());

    let renamed = service.update_metadata(contract.id, metadata("Renamed", ContractStatus::Active));
    assert_eq!(renamed.unwrap().name, "Renamed");

    let closed = service.change_status(contract.id, ContractStatus::Completed).unwrap();
    assert_eq!(closed.status, ContractStatus::Completed);

    let err = service.change_status(Uuid::new_v4(), ContractStatus::Active).unwrap_err();
    assert_eq!(err, LedgerError::NotFound("Contract does not exist".into()));
}

#[test]
fn hard_replace_drops_every_old_node() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    let old_ids: Vec<Uuid> = ledger.store.nodes_of(contract.id).iter().map(|n| n.id).collect();

    let update = ContractStructureUpdate::new(
        contract.id,
        metadata("Rebuilt", ContractStatus::Active),
        vec![CostNodeInput::new("X", "Roof"), CostNodeInput::new("Y", "Windows")],
    );
    structure_service(&ledger).execute(update).unwrap();

    let nodes = ledger.store.nodes_of(contract.id);
    assert_eq!(codes(&ledger, contract.id), vec!["ROOT", "X", "Y"]);
    assert!(nodes.iter().all(|node| !old_ids.contains(&node.id)));
    assert_eq!(ledger.contracts().get(contract.id).unwrap().unwrap().name, "Rebuilt");
}

#[test]
fn safe_replace_keeps_ids_of_matching_codes() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    book_cost(&ledger, contract.id, "A1");
    let before: HashMap<String, Uuid> =
        ledger.store.nodes_of(contract.id).into_iter().map(|n| (n.code, n.id)).collect();

    let tree = vec![
        CostNodeInput::new("A", "Foundations").with_children(vec![
            CostNodeInput::new("A1", "Excavation").with_budget(money("45")),
            CostNodeInput::new("A3", "Drainage"),
        ]),
        CostNodeInput::new("B", "Walls"),
    ];
    let update =
        ContractStructureUpdate::new(contract.id, metadata("K-1", ContractStatus::Active), tree);
    structure_service(&ledger).execute(update).unwrap();

    let after: HashMap<String, Uuid> =
        ledger.store.nodes_of(contract.id).into_iter().map(|n| (n.code, n.id)).collect();
    assert_eq!(codes(&ledger, contract.id), vec!["A", "A1", "A3", "B", "ROOT"]);
    for code in ["ROOT", "A", "A1", "B"] {
        assert_eq!(after[code], before[code], "id of {code} changed");
    }
    assert!(!before.contains_key("A3"));
}

#[test]
fn safe_replace_refuses_to_drop_node_with_costs() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    book_cost(&ledger, contract.id, "A2");
    let before = codes(&ledger, contract.id);
    let deletes = ledger.store.node_deletes();

    let update = ContractStructureUpdate::new(
        contract.id,
        metadata("K-1", ContractStatus::Active),
        vec![CostNodeInput::new("A", "Foundations")
            .with_children(vec![CostNodeInput::new("A1", "Excavation")])],
    );
    let err = structure_service(&ledger).execute(update).unwrap_err();

    assert_eq!(
        err,
        LedgerError::validation("cannot remove cost node 'A2' – costs already exist")
    );
    assert_eq!(ledger.store.node_deletes(), deletes);
    assert_eq!(codes(&ledger, contract.id), before);
}

#[test]
fn structure_update_of_unknown_contract_fails() {
    let ledger = TestLedger::new();
    let update = ContractStructureUpdate::new(
        Uuid::new_v4(),
        metadata("none", ContractStatus::Planned),
        sample_tree(),
    );
    let err = structure_service(&ledger).execute(update).unwrap_err();
    assert_eq!(err, LedgerError::NotFound("Contract does not exist".into()));
}

#[test]
fn structure_update_from_sheet_rows() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    let rows = vec![
        CostNodeRow { code: "ROOT".into(), parent_code: None, name: "Root".into(), budget: None },
        CostNodeRow {
            code: "S1".into(),
            parent_code: Some("ROOT".into()),
            name: "Site".into(),
            budget: Some(money("5")),
        },
    ];

    let update = ContractStructureUpdate::from_rows(
        contract.id,
        metadata("K-1", ContractStatus::Active),
        &rows,
    )
    .unwrap();
    structure_service(&ledger).execute(update).unwrap();

    assert_eq!(codes(&ledger, contract.id), vec!["ROOT", "S1"]);
}

#[test]
fn node_edits_are_validated_against_the_whole_tree() {
    let ledger = TestLedger::new();
    let contract = ledger.seed_contract("K-1");
    let service = ContractCostNodeService::new(ledger.cost_nodes());

    let added = service.add_node(contract.id, "B", &CostNodeInput::new("B1", "Bricks")).unwrap();
    assert_eq!(added.len(), 1);

    let duplicate = service.add_node(contract.id, "A", &CostNodeInput::new("B1", "Again"));
    assert!(matches!(duplicate, Err(LedgerError::Validation(_))));

    let moved = service.move_node(contract.id, "B1", "A").unwrap();
    let a = ledger.cost_nodes().get_by_code(contract.id, "A").unwrap().unwrap();
    assert_eq!(moved.parent_id, Some(a.id));

    let under_descendant = service.move_node(contract.id, "A", "A1");
    assert!(matches!(under_descendant, Err(LedgerError::Validation(_))));

    let root_moved = service.move_node(contract.id, "ROOT", "B");
    assert!(matches!(root_moved, Err(LedgerError::Validation(_))));

    let budget = service.update_budget(contract.id, "B", Some(money("150"))).unwrap();
    assert_eq!(budget.budget, Some(money("150")));

    let disabled = service.disable_node(contract.id, "A2").unwrap();
    assert!(!disabled.is_active);
}

#[test]
fn builder_output_always_validates() {
    let builder = CostNodeTreeBuilder::new();
    let contract_id = Uuid::new_v4();
    let inputs = [
        sample_tree(),
        vec![CostNodeInput::new("ROOT", "Given root").with_children(sample_tree())],
        vec![CostNodeInput::new("ONLY", "Single item")],
    ];

    for items in inputs {
        let nodes = builder.build(contract_id, &items, &Default::default()).unwrap();
        assert!(CostNodeEntityValidator::validate(&nodes).is_ok());
        assert_eq!(nodes.iter().filter(|n| n.parent_id.is_none()).count(), 1);
    }
}
