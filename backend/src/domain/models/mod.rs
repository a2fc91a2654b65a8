pub mod appointment;
pub mod chat;
pub mod ledger;
pub mod notification;
pub mod period;
pub mod planning;
pub mod user;

pub use appointment::DomainAppointment;
pub use chat::ChatSession;
pub use ledger::{DomainExpense, DomainIncome, RecordFilter};
pub use notification::{DomainNotification, NewNotification};
pub use period::YearMonth;
pub use planning::{DomainBudget, DomainGoal};
pub use user::DomainUser;
