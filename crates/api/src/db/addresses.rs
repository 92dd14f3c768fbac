//! Address book repository.

use sqlx::PgPool;

use hridved_core::{AddressId, AddressType, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, full_name, mobile_number, pincode, state, city, \
                               house_number, landmark, address_type, is_default, created_at, updated_at";

/// A new address, already validated.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub full_name: String,
    pub mobile_number: String,
    pub pincode: String,
    pub state: String,
    pub city: String,
    pub house_number: String,
    pub landmark: String,
    pub address_type: AddressType,
    pub is_default: bool,
}

/// Partial address edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AddressPatch {
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub house_number: Option<String>,
    pub landmark: Option<String>,
    pub address_type: Option<AddressType>,
    pub is_default: Option<bool>,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's addresses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM hridved.addresses WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM hridved.addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let created = sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO hridved.addresses
                (user_id, full_name, mobile_number, pincode, state, city,
                 house_number, landmark, address_type, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&address.full_name)
        .bind(&address.mobile_number)
        .bind(&address.pincode)
        .bind(&address.state)
        .bind(&address.city)
        .bind(&address.house_number)
        .bind(&address.landmark)
        .bind(address.address_type)
        .bind(address.is_default)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn update(
        &self,
        id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE hridved.addresses
            SET full_name = COALESCE($2, full_name),
                mobile_number = COALESCE($3, mobile_number),
                pincode = COALESCE($4, pincode),
                state = COALESCE($5, state),
                city = COALESCE($6, city),
                house_number = COALESCE($7, house_number),
                landmark = COALESCE($8, landmark),
                address_type = COALESCE($9, address_type),
                is_default = COALESCE($10, is_default),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.full_name.as_deref())
        .bind(patch.mobile_number.as_deref())
        .bind(patch.pincode.as_deref())
        .bind(patch.state.as_deref())
        .bind(patch.city.as_deref())
        .bind(patch.house_number.as_deref())
        .bind(patch.landmark.as_deref())
        .bind(patch.address_type)
        .bind(patch.is_default)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: AddressId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.addresses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make one address the user's default, clearing the flag on the others.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn set_default(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE hridved.addresses SET is_default = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND id <> $2 AND is_default
            ",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let address = sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE hridved.addresses SET is_default = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }
}
