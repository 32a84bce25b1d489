use crate::database::entities::{ServiceRecord, services};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

/// Services DAO for database operations
#[derive(Clone)]
pub struct ServicesDao {
    db: DatabaseConnection,
}

impl ServicesDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Return the id for a service name, creating the row if unseen.
    ///
    /// Runs as a single atomic upsert against the unique index on `name`, so
    /// concurrent calls for the same new name converge on one row and every
    /// caller observes the same id. The conflict arm rewrites `name` to
    /// itself only so the statement returns the existing row.
    pub async fn ensure(&self, name: &str) -> DatabaseResult<i32> {
        let active_model = services::ActiveModel {
            id: ActiveValue::NotSet,
            name: Set(name.to_string()),
        };

        let on_conflict = OnConflict::column(services::Column::Name)
            .update_column(services::Column::Name)
            .to_owned();

        let service = services::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(service.id)
    }

    /// Find service by name
    pub async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<ServiceRecord>> {
        let service = services::Entity::find()
            .filter(services::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(service)
    }

    /// Count stored services
    pub async fn count(&self) -> DatabaseResult<u64> {
        use sea_orm::PaginatorTrait;

        let count = services::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(count)
    }
}
