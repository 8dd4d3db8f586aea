//! Property business logic - Handles property records.
//!
//! Properties are created by landlords and soft-deleted on request so that
//! historical bookings and grants keep valid references. Authorization for
//! mutations is enforced by callers through [`crate::core::permissions`].

use crate::{
    entities::{AmenityList, Property, property},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a new property owned by the given landlord, performing input validation.
pub async fn create_property(
    db: &DatabaseConnection,
    landlord_id: i64,
    name: String,
    address_line: String,
    city: String,
    house_rules: Option<String>,
    amenities: Vec<String>,
) -> Result<property::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("property name cannot be empty"));
    }
    if address_line.trim().is_empty() {
        return Err(Error::validation("property address cannot be empty"));
    }

    let property = property::ActiveModel {
        landlord_id: Set(landlord_id),
        name: Set(name.trim().to_string()),
        address_line: Set(address_line.trim().to_string()),
        city: Set(city.trim().to_string()),
        house_rules: Set(house_rules),
        amenities: Set(AmenityList(amenities)),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = property.insert(db).await?;
    Ok(result)
}

/// Finds an active (non-deleted) property by its unique ID.
pub async fn get_property_by_id<C>(db: &C, property_id: i64) -> Result<Option<property::Model>>
where
    C: ConnectionTrait,
{
    Ok(Property::find_by_id(property_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted))
}

/// Soft-deletes a property. Historical data referencing it is preserved.
///
/// No-op if the property is already deleted.
pub async fn soft_delete_property(db: &DatabaseConnection, property_id: i64) -> Result<()> {
    let property = Property::find_by_id(property_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("property", property_id))?;

    if property.is_deleted {
        return Ok(());
    }

    let mut active: property::ActiveModel = property.into();
    active.is_deleted = Set(true);
    active.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{TEST_LANDLORD, create_test_property, setup_test_db};

    #[tokio::test]
    async fn test_create_property_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_property(
            &db,
            TEST_LANDLORD,
            "   ".to_string(),
            "12 Hostel Lane".to_string(),
            "Nairobi".to_string(),
            None,
            vec![],
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let result = create_property(
            &db,
            TEST_LANDLORD,
            "Sunrise Dormitory".to_string(),
            String::new(),
            "Nairobi".to_string(),
            None,
            vec![],
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_property() -> Result<()> {
        let db = setup_test_db().await?;

        let property = create_property(
            &db,
            TEST_LANDLORD,
            "Sunrise Dormitory".to_string(),
            "12 Hostel Lane".to_string(),
            "Nairobi".to_string(),
            Some("No pets".to_string()),
            vec!["wifi".to_string(), "laundry".to_string()],
        )
        .await?;

        assert_eq!(property.landlord_id, TEST_LANDLORD);
        assert_eq!(property.amenities.0.len(), 2);
        assert!(!property.is_deleted);

        let found = get_property_by_id(&db, property.id).await?;
        assert_eq!(found.unwrap().id, property.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_hides_property() -> Result<()> {
        let db = setup_test_db().await?;
        let property = create_test_property(&db, TEST_LANDLORD).await?;

        soft_delete_property(&db, property.id).await?;
        assert!(get_property_by_id(&db, property.id).await?.is_none());

        // Repeat deletion is a no-op
        soft_delete_property(&db, property.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_unknown_property() -> Result<()> {
        let db = setup_test_db().await?;
        let result = soft_delete_property(&db, 999).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
