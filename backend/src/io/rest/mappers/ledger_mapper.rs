use shared::{
    CreateExpenseRequest, CreateIncomeRequest, Expense, ExpenseListResponse, Income,
    IncomeListResponse, PaginationInfo, UpdateExpenseRequest, UpdateIncomeRequest,
};

use crate::domain::commands::ledger::{
    CreateExpenseCommand, CreateIncomeCommand, UpdateExpenseCommand, UpdateIncomeCommand,
};
use crate::domain::models::{DomainExpense, DomainIncome};
use crate::domain::pagination::Page;

pub struct ExpenseMapper;

impl ExpenseMapper {
    pub fn to_dto(domain: DomainExpense) -> Expense {
        Expense {
            id: domain.id,
            user_id: domain.user_id,
            amount: domain.amount,
            category: domain.category,
            description: domain.description,
            date: domain.date,
            payment_method: domain.payment_method,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainExpense>) -> Vec<Expense> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_list_response(page: Page<DomainExpense>) -> ExpenseListResponse {
        ExpenseListResponse {
            expenses: Self::to_dto_list(page.items),
            pagination: PaginationInfo {
                has_more: page.has_more,
                next_cursor: page.next_cursor,
            },
        }
    }

    pub fn to_create_command(request: CreateExpenseRequest) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount: request.amount,
            category: request.category,
            description: request.description,
            date: request.date,
            payment_method: request.payment_method,
        }
    }

    pub fn to_update_command(request: UpdateExpenseRequest) -> UpdateExpenseCommand {
        UpdateExpenseCommand {
            amount: request.amount,
            category: request.category,
            description: request.description,
            date: request.date,
            payment_method: request.payment_method,
        }
    }
}

pub struct IncomeMapper;

impl IncomeMapper {
    pub fn to_dto(domain: DomainIncome) -> Income {
        Income {
            id: domain.id,
            user_id: domain.user_id,
            amount: domain.amount,
            source: domain.source,
            description: domain.description,
            date: domain.date,
            recurring: domain.recurring,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_list_response(page: Page<DomainIncome>) -> IncomeListResponse {
        IncomeListResponse {
            incomes: page.items.into_iter().map(Self::to_dto).collect(),
            pagination: PaginationInfo {
                has_more: page.has_more,
                next_cursor: page.next_cursor,
            },
        }
    }

    pub fn to_create_command(request: CreateIncomeRequest) -> CreateIncomeCommand {
        CreateIncomeCommand {
            amount: request.amount,
            source: request.source,
            description: request.description,
            date: request.date,
            recurring: request.recurring,
        }
    }

    pub fn to_update_command(request: UpdateIncomeRequest) -> UpdateIncomeCommand {
        UpdateIncomeCommand {
            amount: request.amount,
            source: request.source,
            description: request.description,
            date: request.date,
            recurring: request.recurring,
        }
    }
}
