use shared::{Budget, CreateGoalRequest, Goal, UpdateGoalRequest, UpsertBudgetRequest};

use crate::domain::commands::planning::{CreateGoalCommand, UpdateGoalCommand, UpsertBudgetCommand};
use crate::domain::models::{DomainBudget, DomainGoal};

pub struct BudgetMapper;

impl BudgetMapper {
    pub fn to_dto(domain: DomainBudget) -> Budget {
        Budget {
            id: domain.id,
            user_id: domain.user_id,
            category: domain.category,
            amount: domain.amount,
            month: domain.month,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_upsert_command(request: UpsertBudgetRequest) -> UpsertBudgetCommand {
        UpsertBudgetCommand {
            category: request.category,
            amount: request.amount,
            month: request.month,
        }
    }
}

pub struct GoalMapper;

impl GoalMapper {
    pub fn to_dto(domain: DomainGoal) -> Goal {
        Goal {
            progress: domain.progress(),
            id: domain.id,
            user_id: domain.user_id,
            title: domain.title,
            target_amount: domain.target_amount,
            current_amount: domain.current_amount,
            deadline: domain.deadline,
            completed: domain.completed,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_create_command(request: CreateGoalRequest) -> CreateGoalCommand {
        CreateGoalCommand {
            title: request.title,
            target_amount: request.target_amount,
            current_amount: request.current_amount,
            deadline: request.deadline,
        }
    }

    pub fn to_update_command(request: UpdateGoalRequest) -> UpdateGoalCommand {
        UpdateGoalCommand {
            title: request.title,
            target_amount: request.target_amount,
            deadline: request.deadline,
        }
    }
}
