//! In-memory customer store for tests and local development.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use broker_portal_core::{CustomerId, Email};

use super::{CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerFields, NewCustomer};

#[derive(Debug, Clone)]
struct StoredCustomer {
    customer: Customer,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Records {
    last_id: i32,
    by_id: BTreeMap<CustomerId, StoredCustomer>,
}

impl Records {
    fn email_taken(&self, email: &Email, except: Option<CustomerId>) -> bool {
        self.by_id
            .values()
            .any(|stored| stored.customer.email == *email && Some(stored.customer.id) != except)
    }
}

/// `CustomerStore` backed by a map behind a single lock.
///
/// Every check-then-write runs under one write guard, so email uniqueness
/// holds under concurrent callers just as the database index does.
#[derive(Debug, Clone, Default)]
pub struct MemoryCustomerStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict() -> RepositoryError {
    RepositoryError::Conflict("email already exists".to_owned())
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn create(&self, new: &NewCustomer) -> Result<Customer, RepositoryError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        if records.email_taken(&new.fields.email, None) {
            return Err(conflict());
        }

        records.last_id += 1;
        let id = CustomerId::new(records.last_id);
        let now = Utc::now();
        let fields = new.fields.clone();
        let customer = Customer {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone_number: fields.phone_number,
            address: fields.address,
            date_of_birth: fields.date_of_birth,
            customer_type: fields.customer_type,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };

        records.by_id.insert(
            id,
            StoredCustomer {
                customer: customer.clone(),
                password_hash: new.password_hash.clone(),
            },
        );

        Ok(customer)
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.by_id.get(&id).map(|s| s.customer.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .get_credentials(email)
            .await?
            .map(|(customer, _)| customer))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .by_id
            .values()
            .find(|s| s.customer.email == *email)
            .map(|s| (s.customer.clone(), s.password_hash.clone())))
    }

    async fn get_password_hash(&self, id: CustomerId) -> Result<Option<String>, RepositoryError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.by_id.get(&id).map(|s| s.password_hash.clone()))
    }

    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.by_id.values().map(|s| s.customer.clone()).collect())
    }

    async fn update(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        if !records.by_id.contains_key(&id) {
            return Ok(None);
        }
        if records.email_taken(&fields.email, Some(id)) {
            return Err(conflict());
        }

        let Some(stored) = records.by_id.get_mut(&id) else {
            return Ok(None);
        };
        let customer = &mut stored.customer;
        let fields = fields.clone();
        customer.first_name = fields.first_name;
        customer.last_name = fields.last_name;
        customer.email = fields.email;
        customer.phone_number = fields.phone_number;
        customer.address = fields.address;
        customer.date_of_birth = fields.date_of_birth;
        customer.customer_type = fields.customer_type;
        customer.is_active = fields.is_active;
        customer.updated_at = Utc::now();

        Ok(Some(customer.clone()))
    }

    async fn set_password_hash(
        &self,
        id: CustomerId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Ok(records.by_id.get_mut(&id).is_some_and(|stored| {
            password_hash.clone_into(&mut stored.password_hash);
            stored.customer.updated_at = Utc::now();
            true
        }))
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Ok(records.by_id.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use broker_portal_core::CustomerType;

    use super::*;
    use crate::models::Address;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            fields: CustomerFields {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                email: Email::parse(email).unwrap(),
                phone_number: None,
                address: Address::default(),
                date_of_birth: None,
                customer_type: CustomerType::Individual,
                is_active: true,
            },
            password_hash: "$argon2id$placeholder".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryCustomerStore::new();
        let a = store.create(&new_customer("a@example.com")).await.unwrap();
        let b = store.create(&new_customer("b@example.com")).await.unwrap();
        assert_eq!(a.id, CustomerId::new(1));
        assert_eq!(b.id, CustomerId::new(2));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = MemoryCustomerStore::new();
        store.create(&new_customer("a@example.com")).await.unwrap();
        let err = store
            .create(&new_customer("A@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_email_matches_normalised_address() {
        let store = MemoryCustomerStore::new();
        let a = store.create(&new_customer("a@example.com")).await.unwrap();

        let found = store
            .get_by_email(&Email::parse("A@EXAMPLE.com").unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(a));

        let missing = Email::parse("b@example.com").unwrap();
        assert!(store.get_by_email(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_email_admit_one() {
        let store = MemoryCustomerStore::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(&new_customer("race@example.com")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_update_conflict_leaves_record_unchanged() {
        let store = MemoryCustomerStore::new();
        store.create(&new_customer("a@example.com")).await.unwrap();
        let b = store.create(&new_customer("b@example.com")).await.unwrap();

        let mut fields = b.fields();
        fields.first_name = "Changed".to_owned();
        fields.email = Email::parse("a@example.com").unwrap();

        assert!(matches!(
            store.update(b.id, &fields).await,
            Err(RepositoryError::Conflict(_))
        ));
        let stored = store.get_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.email.as_str(), "b@example.com");
    }

    #[tokio::test]
    async fn test_update_keeps_password_hash() {
        let store = MemoryCustomerStore::new();
        let a = store.create(&new_customer("a@example.com")).await.unwrap();

        let mut fields = a.fields();
        fields.last_name = "Byron".to_owned();
        let updated = store.update(a.id, &fields).await.unwrap().unwrap();

        assert_eq!(updated.last_name, "Byron");
        assert!(updated.updated_at >= a.updated_at);
        assert_eq!(
            store.get_password_hash(a.id).await.unwrap().as_deref(),
            Some("$argon2id$placeholder")
        );
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = MemoryCustomerStore::new();
        let missing = CustomerId::new(42);
        let fields = new_customer("x@example.com").fields;

        assert!(store.get_by_id(missing).await.unwrap().is_none());
        assert!(store.update(missing, &fields).await.unwrap().is_none());
        assert!(!store.set_password_hash(missing, "h").await.unwrap());
        assert!(!store.delete(missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = MemoryCustomerStore::new();
        let a = store.create(&new_customer("a@example.com")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(store.get_by_id(a.id).await.unwrap().is_none());
        assert!(store.get_credentials(&a.email).await.unwrap().is_none());
    }
}
