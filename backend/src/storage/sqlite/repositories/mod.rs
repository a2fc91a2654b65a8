pub mod appointment_repository;
pub mod budget_repository;
pub mod chat_session_repository;
pub mod expense_repository;
pub mod goal_repository;
pub mod income_repository;
pub mod notification_repository;
pub mod user_repository;

pub use appointment_repository::AppointmentRepository;
pub use budget_repository::BudgetRepository;
pub use chat_session_repository::ChatSessionRepository;
pub use expense_repository::ExpenseRepository;
pub use goal_repository::GoalRepository;
pub use income_repository::IncomeRepository;
pub use notification_repository::NotificationRepository;
pub use user_repository::UserRepository;
