//! End-to-end coverage of the SQLite repositories.
//!
//! Each test runs against an isolated database file with the schema applied,
//! driving the repositories directly or through the core services.

mod support;

use std::collections::BTreeSet;

use chrono::Utc;
use costledger_core::companies::{AddressProvider, CompanyCandidateProvider};
use costledger_core::contracts::{
    ContractStructureUpdate, CreateContractService, UpdateContractStructureService,
};
use costledger_domain::{
    Address, Amount, BankAccount, Company, CompanyInput, CompanyRole, Contact, Contract,
    ContractStarter, ContractStatus, CostNodeInput, CostType, Invoice, InvoiceLine, InvoiceStatus,
    LedgerError, PaymentMethod, PaymentStatus, TaxTreatment, UnitOfMeasure, VatRate,
};
use uuid::Uuid;

use support::{
    date, metadata, money, sample_tree, TestDatabase, CLIENT_NIP, OWNER_NIP, SUPPLIER_NIP,
};

fn create_contract(db: &TestDatabase, code: &str, status: ContractStatus) -> Contract {
    let owner = db.seed_company("Owner SA", OWNER_NIP, CompanyRole::Own);
    let client = db.seed_company("Client SA", CLIENT_NIP, CompanyRole::Client);

    let repos = &db.repositories;
    let mut service = CreateContractService::new(
        repos.contracts.clone(),
        repos.cost_nodes.clone(),
        repos.companies.clone(),
    );
    service
        .init(ContractStarter {
            code: code.to_string(),
            owner_id: owner.id,
            client_id: client.id,
            metadata: metadata(code, status),
        })
        .expect("contract init");
    service.add_cost_node_tree(sample_tree()).expect("tree accepted");
    service.execute().expect("contract persisted")
}

fn invoice(number: &str, buyer_id: Uuid, seller_id: Uuid, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        invoice_number: number.to_string(),
        invoice_date: date("2024-03-01"),
        selling_date: date("2024-02-28"),
        buyer_id,
        seller_id,
        payment_method: PaymentMethod::BankTransfer,
        due_date: date("2024-03-15"),
        payment_status: PaymentStatus::PartiallyPaid,
        status,
        timestamp: Utc::now(),
    }
}

fn line(invoice_id: Option<Uuid>, item_name: &str, value: &str) -> InvoiceLine {
    InvoiceLine {
        id: Uuid::new_v4(),
        invoice_id,
        contract_id: None,
        cost_node_id: None,
        cost_type_id: None,
        item_name: item_name.to_string(),
        description: None,
        quantity: None,
        unit: UnitOfMeasure::Piece,
        amount: Amount::new(money(value), VatRate::Vat23),
    }
}

#[test]
fn company_round_trip_keeps_every_field() {
    let db = TestDatabase::new();
    let companies = &db.repositories.companies;

    let company = Company::new("Budex Sp. z o.o.", SUPPLIER_NIP, CompanyRole::Supplier)
        .with_description(Some("Concrete supplier".to_string()))
        .with_address(Some(Address::new("ul. Prosta 12", "Warszawa", "00-838", "PL")))
        .with_contact(Some(Contact {
            phone_number: Some("221234567".to_string()),
            email: Some("biuro@budex.pl".to_string()),
        }))
        .with_bank_account(Some(
            BankAccount::new("61109010140000071219812874").with_country_code(Some("PL".into())),
        ))
        .with_tags(BTreeSet::from(["concrete".to_string(), "steel".to_string()]));
    companies.add(&company).unwrap();

    assert_eq!(companies.get(company.id).unwrap(), Some(company.clone()));
    assert_eq!(companies.get_by_tax_number(SUPPLIER_NIP).unwrap(), Some(company.clone()));
    assert_eq!(companies.find_by_email("biuro@budex.pl").unwrap().len(), 1);
    assert_eq!(companies.find_by_phone("221234567").unwrap().len(), 1);
    assert_eq!(companies.find_by_bank_account("61109010140000071219812874").unwrap().len(), 1);
    assert_eq!(companies.find_by_name_like("budex").unwrap().len(), 1);
    assert_eq!(
        companies.find_by_street_tokens(&["PROSTA".to_string(), "12".to_string()]).unwrap().len(),
        1
    );
    assert!(companies.find_by_street_tokens(&["KRZYWA".to_string()]).unwrap().is_empty());
    assert!(companies.find_by_street_tokens(&[]).unwrap().is_empty());
}

#[test]
fn company_without_contact_reads_back_as_none() {
    let db = TestDatabase::new();
    let company = Company::new("Kowalski", OWNER_NIP, CompanyRole::Own)
        .with_contact(Some(Contact::default()));
    db.repositories.companies.add(&company).unwrap();

    let stored = db.repositories.companies.get(company.id).unwrap().unwrap();
    assert_eq!(stored.contact, None);
    assert_eq!(stored.address, None);
    assert!(db.repositories.companies.exists_owner().unwrap());
    assert_eq!(db.repositories.companies.get_owners().unwrap(), vec![stored]);
}

#[test]
fn duplicate_tax_number_is_a_conflict() {
    let db = TestDatabase::new();
    db.seed_company("First", SUPPLIER_NIP, CompanyRole::Supplier);

    let err = db
        .repositories
        .companies
        .add(&Company::new("Second", SUPPLIER_NIP, CompanyRole::Seller))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)), "unexpected error: {err:?}");
}

#[test]
fn update_and_delete_company() {
    let db = TestDatabase::new();
    let company = db.seed_company("Budex", SUPPLIER_NIP, CompanyRole::Seller);
    let companies = &db.repositories.companies;

    companies.update(&company.clone().with_role(CompanyRole::Supplier)).unwrap();
    assert_eq!(companies.get(company.id).unwrap().unwrap().role, CompanyRole::Supplier);

    companies.delete(company.id).unwrap();
    assert!(!companies.exists(company.id).unwrap());

    let err = companies.update(&company).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[test]
fn polish_street_and_name_are_matched_case_insensitively() {
    let db = TestDatabase::new();
    let companies = &db.repositories.companies;
    let company = Company::new("Żuraw Sp. z o.o.", SUPPLIER_NIP, CompanyRole::Supplier)
        .with_address(Some(Address::new("ul. Łódzka 12", "Kraków", "30-001", "PL")));
    companies.add(&company).unwrap();

    let provider = AddressProvider::new(companies.clone());
    let input = CompanyInput { street: Some("ul. Łódzka 12".into()), ..CompanyInput::default() };
    let found = provider.find_candidates(&input).unwrap();
    assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![company.id]);

    let by_name = companies.find_by_name_like("żuraw").unwrap();
    assert_eq!(by_name.len(), 1);

    let moved = company.with_address(Some(Address::new("Śląska 3", "Kraków", "30-001", "PL")));
    companies.update(&moved).unwrap();
    assert!(provider.find_candidates(&input).unwrap().is_empty());
    assert_eq!(companies.find_by_street_tokens(&["ŚLĄSKA".into()]).unwrap().len(), 1);
}

#[test]
fn contract_tree_is_persisted_with_parents() {
    let db = TestDatabase::new();
    let contract = create_contract(&db, "K1", ContractStatus::Active);
    let nodes = &db.repositories.cost_nodes;

    let stored = db.repositories.contracts.get_by_code("K1").unwrap().unwrap();
    assert_eq!(stored, contract);
    assert_eq!(stored.budget, Some(money("1000.50")));

    let tree = nodes.list_by_contract(contract.id).unwrap();
    assert_eq!(tree.len(), 5);
    let root = tree.iter().find(|node| node.is_root()).unwrap();
    assert_eq!(root.code, "ROOT");

    let a = nodes.get_by_code(contract.id, "A").unwrap().unwrap();
    assert_eq!(a.parent_id, Some(root.id));
    let children: BTreeSet<String> =
        nodes.list_by_parent(a.id).unwrap().into_iter().map(|node| node.code).collect();
    assert_eq!(children, BTreeSet::from(["A1".to_string(), "A2".to_string()]));

    let leaves: BTreeSet<String> = nodes
        .list_leaf_nodes_for_active_contracts()
        .unwrap()
        .into_iter()
        .map(|node| node.code)
        .collect();
    assert_eq!(leaves, BTreeSet::from(["A1".into(), "A2".into(), "B".into()]));
}

#[test]
fn leaves_of_planned_contracts_are_not_assignable() {
    let db = TestDatabase::new();
    create_contract(&db, "K2", ContractStatus::Planned);

    assert!(db.repositories.cost_nodes.list_leaf_nodes_for_active_contracts().unwrap().is_empty());
}

#[test]
fn duplicate_contract_code_is_a_conflict() {
    let db = TestDatabase::new();
    let contract = create_contract(&db, "K1", ContractStatus::Active);

    let copy = Contract { id: Uuid::new_v4(), ..contract };
    let err = db.repositories.contracts.add(&copy).unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn structure_without_costs_is_rebuilt() {
    let db = TestDatabase::new();
    let contract = create_contract(&db, "K1", ContractStatus::Active);
    let repos = &db.repositories;
    let before: BTreeSet<Uuid> =
        repos.cost_nodes.list_by_contract(contract.id).unwrap().iter().map(|n| n.id).collect();

    let service =
        UpdateContractStructureService::new(repos.contracts.clone(), repos.cost_nodes.clone());
    service
        .execute(ContractStructureUpdate::new(
            contract.id,
            metadata("Renamed", ContractStatus::Active),
            vec![CostNodeInput::new("C", "Roof").with_budget(money("50"))],
        ))
        .unwrap();

    let after = repos.cost_nodes.list_by_contract(contract.id).unwrap();
    let codes: BTreeSet<String> = after.iter().map(|node| node.code.clone()).collect();
    assert_eq!(codes, BTreeSet::from(["ROOT".to_string(), "C".to_string()]));
    assert!(after.iter().all(|node| !before.contains(&node.id)));
    assert_eq!(repos.contracts.get(contract.id).unwrap().unwrap().name, "Renamed");
}

#[test]
fn structure_with_costs_keeps_used_nodes() {
    let db = TestDatabase::new();
    let contract = create_contract(&db, "K1", ContractStatus::Active);
    let repos = &db.repositories;
    let a1 = repos.cost_nodes.get_by_code(contract.id, "A1").unwrap().unwrap();

    let cost_type = CostType::new("MAT", "Materials");
    repos.cost_types.add(&cost_type).unwrap();
    let booked = line(None, "Cement", "10")
        .with_assignment(Some(contract.id), Some(a1.id), Some(cost_type.id));
    repos.invoice_lines.add(&booked).unwrap();
    assert!(repos.cost_nodes.has_costs(contract.id).unwrap());
    assert!(repos.cost_nodes.node_has_costs(a1.id).unwrap());

    let service =
        UpdateContractStructureService::new(repos.contracts.clone(), repos.cost_nodes.clone());
    // A1 moves under the new node N; A2 and B disappear.
    service
        .execute(ContractStructureUpdate::new(
            contract.id,
            metadata("K1", ContractStatus::Active),
            vec![
                CostNodeInput::new("A", "Foundations"),
                CostNodeInput::new("N", "New branch")
                    .with_children(vec![CostNodeInput::new("A1", "Excavation")]),
            ],
        ))
        .unwrap();

    let kept = repos.cost_nodes.get(a1.id).unwrap().expect("A1 keeps its id");
    let n = repos.cost_nodes.get_by_code(contract.id, "N").unwrap().unwrap();
    assert_eq!(kept.parent_id, Some(n.id));
    assert!(repos.cost_nodes.get_by_code(contract.id, "A2").unwrap().is_none());
    assert!(repos.cost_nodes.get_by_code(contract.id, "B").unwrap().is_none());

    let err = service
        .execute(ContractStructureUpdate::new(
            contract.id,
            metadata("K1", ContractStatus::Active),
            vec![CostNodeInput::new("A", "Foundations")],
        ))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(repos.cost_nodes.exists(a1.id).unwrap());
}

#[test]
fn invoice_round_trip_and_lookup() {
    let db = TestDatabase::new();
    let buyer = db.seed_company("Owner SA", OWNER_NIP, CompanyRole::Own);
    let seller = db.seed_company("Budex", SUPPLIER_NIP, CompanyRole::Seller);
    let invoices = &db.repositories.invoices;

    let first = invoice("FV/1", buyer.id, seller.id, InvoiceStatus::New);
    let second = invoice("FV/2", buyer.id, seller.id, InvoiceStatus::Processed);
    invoices.add(&first).unwrap();
    invoices.add(&second).unwrap();

    let stored = invoices.get(first.id).unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(invoices.get_unique_invoice("FV/2", seller.id).unwrap(), Some(second.clone()));
    assert!(invoices.get_unique_invoice("FV/2", buyer.id).unwrap().is_none());

    let open =
        invoices.get_for_assignment(&[InvoiceStatus::New, InvoiceStatus::InProgress]).unwrap();
    assert_eq!(open, vec![first.clone()]);
    assert!(invoices.get_for_assignment(&[]).unwrap().is_empty());

    invoices.update(&first.clone().with_status(InvoiceStatus::Deleted)).unwrap();
    assert_eq!(invoices.get(first.id).unwrap().unwrap().status, InvoiceStatus::Deleted);

    let clash = invoice("FV/2", buyer.id, seller.id, InvoiceStatus::New);
    assert!(matches!(invoices.add(&clash), Err(LedgerError::Conflict(_))));
}

#[test]
fn invoice_lines_round_trip_and_sync() {
    let db = TestDatabase::new();
    let buyer = db.seed_company("Owner SA", OWNER_NIP, CompanyRole::Own);
    let seller = db.seed_company("Budex", SUPPLIER_NIP, CompanyRole::Seller);
    let header = invoice("FV/1", buyer.id, seller.id, InvoiceStatus::InProgress);
    db.repositories.invoices.add(&header).unwrap();
    let lines = &db.repositories.invoice_lines;

    let mut cement = line(Some(header.id), "Cement", "100.10");
    cement.quantity = Some(money("2.5"));
    cement.unit = UnitOfMeasure::Ton;
    cement.description = Some("CEM II".to_string());
    cement.amount = Amount::new(money("100.10"), VatRate::Vat8)
        .with_tax_treatment(TaxTreatment::NonDeductible);
    let sand = line(Some(header.id), "Sand", "20");
    let transport = line(Some(header.id), "Transport", "5");
    let loose = line(None, "Fuel", "50");
    for item in [&cement, &sand, &transport, &loose] {
        lines.add(item).unwrap();
    }

    assert_eq!(lines.get(cement.id).unwrap(), Some(cement.clone()));
    assert_eq!(lines.list_by_invoice(header.id).unwrap().len(), 3);
    assert_eq!(lines.list_by_invoice_ids(&[header.id]).unwrap().len(), 3);
    assert_eq!(lines.list_by_null_invoice().unwrap(), vec![loose.clone()]);
    assert_eq!(lines.get_for_assignment().unwrap().len(), 4);

    let keep = BTreeSet::from([cement.id]);
    assert_eq!(lines.delete_not_in_ids(header.id, &keep).unwrap(), 2);
    assert_eq!(lines.list_by_invoice(header.id).unwrap(), vec![cement.clone()]);
    assert!(lines.get(loose.id).unwrap().is_some());

    assert_eq!(lines.delete_not_in_ids(header.id, &BTreeSet::new()).unwrap(), 1);
    assert!(lines.list_by_invoice(header.id).unwrap().is_empty());

    assert!(matches!(lines.update(&sand), Err(LedgerError::NotFound(_))));
}

#[test]
fn cost_types_are_listed_by_code() {
    let db = TestDatabase::new();
    let cost_types = &db.repositories.cost_types;
    let labour = CostType::new("LAB", "Labour");
    cost_types.add(&CostType::new("MAT", "Materials")).unwrap();
    cost_types.add(&labour).unwrap();

    let codes: Vec<String> = cost_types.list().unwrap().into_iter().map(|t| t.code).collect();
    assert_eq!(codes, vec!["LAB".to_string(), "MAT".to_string()]);

    cost_types.update(&labour.clone().with_name("Subcontracted labour")).unwrap();
    assert_eq!(cost_types.get(labour.id).unwrap().unwrap().name, "Subcontracted labour");
    assert!(cost_types.get_by_code("MAT").unwrap().is_some());
    assert!(matches!(
        cost_types.add(&CostType::new("MAT", "Duplicate")),
        Err(LedgerError::Conflict(_))
    ));
}
