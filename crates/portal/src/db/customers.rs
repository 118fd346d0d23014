//! Customer repository for `PostgreSQL`.
//!
//! Queries are runtime-checked (`sqlx::query_as` + `FromRow`) so the crate
//! builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use broker_portal_core::{CustomerId, CustomerType, Email};

use super::{CustomerStore, RepositoryError, map_unique_violation};
use crate::models::{Address, Customer, CustomerFields, NewCustomer};

macro_rules! customer_columns {
    () => {
        "id, first_name, last_name, email, phone_number, \
         address_street, address_city, address_state, address_zip_code, address_country, \
         date_of_birth, customer_type, is_active, created_at, updated_at"
    };
}

const SELECT_BY_ID: &str = concat!(
    "SELECT ",
    customer_columns!(),
    " FROM portal.customer WHERE id = $1"
);

const SELECT_BY_EMAIL: &str = concat!(
    "SELECT ",
    customer_columns!(),
    " FROM portal.customer WHERE email = $1"
);

const SELECT_CREDENTIALS: &str = concat!(
    "SELECT ",
    customer_columns!(),
    ", password_hash FROM portal.customer WHERE email = $1"
);

const SELECT_ALL: &str = concat!(
    "SELECT ",
    customer_columns!(),
    " FROM portal.customer ORDER BY id"
);

const INSERT: &str = concat!(
    "INSERT INTO portal.customer (first_name, last_name, email, phone_number, \
     address_street, address_city, address_state, address_zip_code, address_country, \
     date_of_birth, customer_type, is_active, password_hash) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
     RETURNING ",
    customer_columns!()
);

const UPDATE: &str = concat!(
    "UPDATE portal.customer SET first_name = $2, last_name = $3, email = $4, \
     phone_number = $5, address_street = $6, address_city = $7, address_state = $8, \
     address_zip_code = $9, address_country = $10, date_of_birth = $11, \
     customer_type = $12, is_active = $13, updated_at = NOW() \
     WHERE id = $1 RETURNING ",
    customer_columns!()
);

/// Database row for `portal.customer` (without the password hash).
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: Email,
    phone_number: Option<String>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_state: Option<String>,
    address_zip_code: Option<String>,
    address_country: Option<String>,
    date_of_birth: Option<NaiveDate>,
    customer_type: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password_hash: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let customer_type: CustomerType = row.customer_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer type in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            address: Address {
                street: row.address_street,
                city: row.address_city,
                state: row.address_state,
                zip_code: row.address_zip_code,
                country: row.address_country,
            },
            date_of_birth: row.date_of_birth,
            customer_type,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for customer database operations.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let fields = &customer.fields;
        let row = sqlx::query_as::<_, CustomerRow>(INSERT)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(&fields.email)
            .bind(&fields.phone_number)
            .bind(&fields.address.street)
            .bind(&fields.address.city)
            .bind(&fields.address.state)
            .bind(&fields.address.zip_code)
            .bind(&fields.address.country)
            .bind(fields.date_of_birth)
            .bind(fields.customer_type.as_str())
            .bind(fields.is_active)
            .bind(&customer.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        row.try_into()
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        sqlx::query_as::<_, CustomerRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        sqlx::query_as::<_, CustomerRow>(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(SELECT_CREDENTIALS)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some((r.customer.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn get_password_hash(&self, id: CustomerId) -> Result<Option<String>, RepositoryError> {
        let hash: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM portal.customer WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(hash.map(|(h,)| h))
    }

    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        sqlx::query_as::<_, CustomerRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Customer::try_from)
            .collect()
    }

    async fn update(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, RepositoryError> {
        sqlx::query_as::<_, CustomerRow>(UPDATE)
            .bind(id)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(&fields.email)
            .bind(&fields.phone_number)
            .bind(&fields.address.street)
            .bind(&fields.address.city)
            .bind(&fields.address.state)
            .bind(&fields.address.zip_code)
            .bind(&fields.address.country)
            .bind(fields.date_of_birth)
            .bind(fields.customer_type.as_str())
            .bind(fields.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?
            .map(Customer::try_from)
            .transpose()
    }

    async fn set_password_hash(
        &self,
        id: CustomerId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE portal.customer SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.customer WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
