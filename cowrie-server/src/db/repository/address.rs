//! Address Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Address, AddressCreate, AddressUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ADDRESS_TABLE: &str = "address";

#[derive(Clone)]
pub struct AddressRepository {
    base: BaseRepository,
}

impl AddressRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all addresses (admin view)
    pub async fn find_all(&self) -> RepoResult<Vec<Address>> {
        let addresses: Vec<Address> = self
            .base
            .db()
            .query("SELECT * FROM address ORDER BY city")
            .await?
            .take(0)?;
        Ok(addresses)
    }

    /// Find all addresses owned by a user
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Address>> {
        let addresses: Vec<Address> = self
            .base
            .db()
            .query("SELECT * FROM address WHERE user = $user ORDER BY city")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(addresses)
    }

    /// Find address by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Address>> {
        let thing = record_id(ADDRESS_TABLE, id)?;
        let address: Option<Address> = self.base.db().select(thing).await?;
        Ok(address)
    }

    /// Check whether an address record exists
    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Create a new address for a user
    pub async fn create(&self, user: RecordId, data: AddressCreate) -> RepoResult<Address> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE address SET
                    user = $user,
                    street = $street,
                    city = $city,
                    state = $state,
                    postal_code = $postal_code,
                    country = $country,
                    type = $type
                RETURN AFTER"#,
            )
            .bind(("user", user))
            .bind(("street", data.street))
            .bind(("city", data.city))
            .bind(("state", data.state))
            .bind(("postal_code", data.postal_code))
            .bind(("country", data.country))
            .bind(("type", data.kind))
            .await?;

        let created: Option<Address> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create address".to_string()))
    }

    /// Update an address
    pub async fn update(&self, id: &str, data: AddressUpdate) -> RepoResult<Address> {
        let thing = record_id(ADDRESS_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.street.is_some() {
            set_parts.push("street = $street");
        }
        if data.city.is_some() {
            set_parts.push("city = $city");
        }
        if data.state.is_some() {
            set_parts.push("state = $state");
        }
        if data.postal_code.is_some() {
            set_parts.push("postal_code = $postal_code");
        }
        if data.country.is_some() {
            set_parts.push("country = $country");
        }
        if data.kind.is_some() {
            set_parts.push("type = $type");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Address {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("thing", thing));

        if let Some(v) = data.street {
            query = query.bind(("street", v));
        }
        if let Some(v) = data.city {
            query = query.bind(("city", v));
        }
        if let Some(v) = data.state {
            query = query.bind(("state", v));
        }
        if let Some(v) = data.postal_code {
            query = query.bind(("postal_code", v));
        }
        if let Some(v) = data.country {
            query = query.bind(("country", v));
        }
        if let Some(v) = data.kind {
            query = query.bind(("type", v));
        }

        let mut result = query.await?;
        let addresses: Vec<Address> = result.take(0)?;
        addresses
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Address {} not found", id)))
    }

    /// Hard delete an address
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = record_id(ADDRESS_TABLE, id)?;
        let deleted: Option<Address> = self.base.db().delete(thing).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Address {} not found", id)));
        }
        Ok(())
    }
}
