//! SQLite implementation of the `CompanyRepository` port.

use std::collections::BTreeSet;
use std::sync::Arc;

use costledger_core::CompanyRepository;
use costledger_domain::{
    Address, BankAccount, Company, CompanyRole, Contact, LedgerError, Result,
};
use rusqlite::{params, params_from_iter, OptionalExtension, Params, Row};
use tracing::warn;
use uuid::Uuid;

use super::codec::{ensure_changed, query_rows, read_enum, read_uuid};
use super::manager::DbManager;
use crate::errors::map_sql_error;

pub struct SqliteCompanyRepository {
    db: Arc<DbManager>,
}

impl SqliteCompanyRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn query(&self, sql: &str, params: impl Params) -> Result<Vec<Company>> {
        let conn = self.db.get_connection()?;
        query_rows(&conn, sql, params, map_company_row)
    }

    fn query_one(&self, sql: &str, params: impl Params) -> Result<Option<Company>> {
        let conn = self.db.get_connection()?;
        conn.query_row(sql, params, map_company_row).optional().map_err(map_sql_error)
    }
}

impl CompanyRepository for SqliteCompanyRepository {
    fn add(&self, company: &Company) -> Result<()> {
        let conn = self.db.get_connection()?;
        let tags = encode_tags(&company.tags)?;
        let address = company.address.as_ref();
        conn.execute(
            COMPANY_INSERT_SQL,
            params![
                company.id.to_string(),
                company.name,
                company.description,
                company.tax_number,
                address.map(|a| a.street.as_str()),
                address.map(|a| a.city.as_str()),
                address.map(|a| a.zip_code.as_str()),
                address.map(|a| a.country.as_str()),
                company.phone_number(),
                company.email(),
                company.bank_account.as_ref().map(|b| b.number.as_str()),
                company.bank_account.as_ref().and_then(|b| b.country_code.as_deref()),
                company.role.as_str(),
                tags,
                company.is_active,
                company.name.to_uppercase(),
                address.map(|a| a.street.to_uppercase()),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn update(&self, company: &Company) -> Result<()> {
        let conn = self.db.get_connection()?;
        let tags = encode_tags(&company.tags)?;
        let address = company.address.as_ref();
        let changed = conn
            .execute(
                COMPANY_UPDATE_SQL,
                params![
                    company.id.to_string(),
                    company.name,
                    company.description,
                    company.tax_number,
                    address.map(|a| a.street.as_str()),
                    address.map(|a| a.city.as_str()),
                    address.map(|a| a.zip_code.as_str()),
                    address.map(|a| a.country.as_str()),
                    company.phone_number(),
                    company.email(),
                    company.bank_account.as_ref().map(|b| b.number.as_str()),
                    company.bank_account.as_ref().and_then(|b| b.country_code.as_deref()),
                    company.role.as_str(),
                    tags,
                    company.is_active,
                    company.name.to_uppercase(),
                    address.map(|a| a.street.to_uppercase()),
                ],
            )
            .map_err(map_sql_error)?;
        ensure_changed(changed, company.id)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute("DELETE FROM companies WHERE id = ?1", params![id.to_string()])
            .map_err(map_sql_error)?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Company>> {
        self.query_one(&format!("{COMPANY_SELECT} WHERE id = ?1"), params![id.to_string()])
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )
        .map_err(map_sql_error)
    }

    fn list_all(&self) -> Result<Vec<Company>> {
        self.query(&format!("{COMPANY_SELECT} ORDER BY rowid"), [])
    }

    fn get_by_tax_number(&self, tax_number: &str) -> Result<Option<Company>> {
        self.query_one(&format!("{COMPANY_SELECT} WHERE tax_number = ?1"), params![tax_number])
    }

    fn get_owners(&self) -> Result<Vec<Company>> {
        self.query(
            &format!("{COMPANY_SELECT} WHERE role = ?1 ORDER BY rowid"),
            params![CompanyRole::Own.as_str()],
        )
    }

    fn exists_owner(&self) -> Result<bool> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE role = ?1)",
            params![CompanyRole::Own.as_str()],
            |row| row.get(0),
        )
        .map_err(map_sql_error)
    }

    fn find_by_bank_account(&self, number: &str) -> Result<Vec<Company>> {
        self.query(
            &format!("{COMPANY_SELECT} WHERE bank_account_number = ?1 ORDER BY rowid"),
            params![number],
        )
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<Company>> {
        self.query(&format!("{COMPANY_SELECT} WHERE email = ?1 ORDER BY rowid"), params![email])
    }

    fn find_by_phone(&self, phone: &str) -> Result<Vec<Company>> {
        self.query(
            &format!("{COMPANY_SELECT} WHERE phone_number = ?1 ORDER BY rowid"),
            params![phone],
        )
    }

    fn find_by_name_like(&self, fragment: &str) -> Result<Vec<Company>> {
        self.query(
            &format!("{COMPANY_SELECT} WHERE instr(name_key, ?1) > 0 ORDER BY rowid"),
            params![fragment.to_uppercase()],
        )
    }

    fn find_by_street_tokens(&self, tokens: &[String]) -> Result<Vec<Company>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let predicates = vec!["instr(street_key, ?) > 0"; tokens.len()].join(" AND ");
        let keys = tokens.iter().map(|token| token.to_uppercase());
        let sql =
            format!("{COMPANY_SELECT} WHERE street_key IS NOT NULL AND {predicates} ORDER BY rowid");
        self.query(&sql, params_from_iter(keys))
    }
}

const COMPANY_SELECT: &str = "SELECT id, name, description, tax_number, street, city, zip_code,
        country, phone_number, email, bank_account_number, bank_country_code, role, tags,
        is_active
    FROM companies";

const COMPANY_INSERT_SQL: &str = "INSERT INTO companies (
        id, name, description, tax_number, street, city, zip_code, country, phone_number, email,
        bank_account_number, bank_country_code, role, tags, is_active, name_key, street_key
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

const COMPANY_UPDATE_SQL: &str = "UPDATE companies SET
        name = ?2, description = ?3, tax_number = ?4, street = ?5, city = ?6, zip_code = ?7,
        country = ?8, phone_number = ?9, email = ?10, bank_account_number = ?11,
        bank_country_code = ?12, role = ?13, tags = ?14, is_active = ?15, name_key = ?16,
        street_key = ?17
    WHERE id = ?1";

fn map_company_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    let id = read_uuid(row, 0)?;

    let street: Option<String> = row.get(4)?;
    let city: Option<String> = row.get(5)?;
    let zip_code: Option<String> = row.get(6)?;
    let country: Option<String> = row.get(7)?;
    let address = (street.is_some() || city.is_some() || zip_code.is_some() || country.is_some())
        .then(|| {
            Address::new(
                street.unwrap_or_default(),
                city.unwrap_or_default(),
                zip_code.unwrap_or_default(),
                country.unwrap_or_default(),
            )
        });

    let contact = Contact { phone_number: row.get(8)?, email: row.get(9)? };
    let bank_number: Option<String> = row.get(10)?;
    let bank_country: Option<String> = row.get(11)?;
    let bank_account =
        bank_number.map(|number| BankAccount { number, country_code: bank_country });

    let tags_raw: String = row.get(13)?;
    let tags = serde_json::from_str::<BTreeSet<String>>(&tags_raw).unwrap_or_else(|err| {
        warn!(company_id = %id, error = %err, "failed to parse company tags, using none");
        BTreeSet::new()
    });

    Ok(Company {
        id,
        name: row.get(1)?,
        description: row.get(2)?,
        tax_number: row.get(3)?,
        address,
        contact: (!contact.is_empty()).then_some(contact),
        bank_account,
        role: read_enum(row, 12)?,
        tags,
        is_active: row.get(14)?,
    })
}

fn encode_tags(tags: &BTreeSet<String>) -> Result<String> {
    serde_json::to_string(tags)
        .map_err(|err| LedgerError::Internal(format!("failed to encode company tags: {err}")))
}
