use crate::contract::model::User;
use crate::infra::storage::entity::Model as UserEntity;

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            company: entity.company,
            address: entity.address,
            city: entity.city,
            created_at: entity.created_at,
        }
    }
}
