use shared::{CreateUserRequest, UpdateUserRequest, User};

use crate::domain::commands::users::{CreateUserCommand, UpdateUserCommand};
use crate::domain::models::DomainUser;

pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: DomainUser) -> User {
        User {
            id: domain.id,
            name: domain.name,
            email: domain.email,
            plan_tier: domain.plan_tier,
            trial_ends_at: domain.trial_ends_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_create_command(request: CreateUserRequest) -> CreateUserCommand {
        CreateUserCommand {
            name: request.name,
            email: request.email,
        }
    }

    pub fn to_update_command(request: UpdateUserRequest) -> UpdateUserCommand {
        UpdateUserCommand {
            name: request.name,
            email: request.email,
        }
    }
}
