//! Chat service: the conversation state machine.
//!
//! ```text
//! initial ──intent──▶ waiting_<kind> ──sim (draft complete)──▶ initial (record saved)
//!                          │  ▲
//!                          │  └── other text: merged into the draft
//!                          └──── não ──▶ initial (draft dropped)
//! ```
//!
//! Records are saved through the owning services, so plan gating and
//! validation are the same as for the REST endpoints.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{CreatedRecord, Feature, PendingAction};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::rules::{
    detect_intent, draft_from_json, format_brl, is_affirmative, is_negative, merge,
    missing_question, parse_details, summary, Intent, EXPENSE_CATEGORIES, FALLBACK_CATEGORY,
    INCOME_SOURCES,
};
use super::CompletionClient;
use crate::domain::calendar::CalendarService;
use crate::domain::commands::calendar::CreateAppointmentCommand;
use crate::domain::commands::ledger::{CreateExpenseCommand, CreateIncomeCommand};
use crate::domain::errors::DomainError;
use crate::domain::expense_service::ExpenseService;
use crate::domain::income_service::IncomeService;
use crate::domain::models::{ChatSession, DomainUser};
use crate::storage::traits::{ChatSessionStorage, Connection};

pub const MAX_MESSAGE_LEN: usize = 1000;

const HELP_REPLY: &str = "Posso registrar gastos, receitas e compromissos. Experimente: \
\"gastei 50 reais no mercado\", \"recebi 3000 de salário\" ou \"marcar dentista amanhã às 14h\".";
const CANCELLED_REPLY: &str = "Tudo bem, descartei o registro. Posso ajudar com mais alguma coisa?";

/// Outcome of one chat message
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub session: ChatSession,
    pub reply: String,
    pub created: Option<CreatedRecord>,
}

#[derive(Clone)]
pub struct ChatService {
    session_repository: Arc<dyn ChatSessionStorage>,
    expense_service: ExpenseService,
    income_service: IncomeService,
    calendar_service: CalendarService,
    completion_client: Option<Arc<dyn CompletionClient>>,
}

impl ChatService {
    pub fn new(
        connection: &dyn Connection,
        expense_service: ExpenseService,
        income_service: IncomeService,
        calendar_service: CalendarService,
        completion_client: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        Self {
            session_repository: connection.chat_session_repository(),
            expense_service,
            income_service,
            calendar_service,
            completion_client,
        }
    }

    pub async fn session(&self, user: &DomainUser) -> Result<ChatSession> {
        Ok(self
            .session_repository
            .get_session(&user.id)
            .await?
            .unwrap_or_else(|| ChatSession::initial(&user.id, Utc::now())))
    }

    pub async fn reset(&self, user: &DomainUser) -> Result<ChatSession> {
        let session = ChatSession::initial(&user.id, Utc::now());
        self.session_repository.save_session(&session).await?;
        info!("Reset chat session for user {}", user.id);
        Ok(session)
    }

    pub async fn handle_message(&self, user: &DomainUser, message: &str, now: DateTime<Utc>) -> Result<ChatTurn> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DomainError::validation("Message cannot be empty"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(DomainError::validation(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        let mut session = self.session(user).await?;
        debug!("Chat message from {} in state {}", user.id, session.state.as_str());

        let waiting = Intent::of_state(session.state);
        let (reply, created) = match (waiting, session.pending.take()) {
            (Some(intent), Some(pending)) if Intent::of_pending(&pending) == intent => {
                self.continue_draft(user, &mut session, intent, pending, message, now).await?
            }
            _ => (self.start(user, &mut session, message, now).await, None),
        };

        session.updated_at = now;
        self.session_repository.save_session(&session).await?;
        Ok(ChatTurn { session, reply, created })
    }

    async fn start(&self, user: &DomainUser, session: &mut ChatSession, message: &str, now: DateTime<Utc>) -> String {
        session.reset(now);
        let Some(intent) = detect_intent(message) else {
            return HELP_REPLY.to_string();
        };
        if let Some(feature) = intent.feature() {
            if !user.can_use(feature, now) {
                info!("Chat {} intent locked for user {}", intent.as_str(), user.id);
                return upsell_reply(feature);
            }
        }

        let today = now.date_naive();
        let mut pending = parse_details(intent, message, today);
        self.fill_from_model(intent, &mut pending, message, today).await;

        let reply = prompt_for(&pending, today);
        session.state = intent.waiting_state();
        session.pending = Some(pending);
        reply
    }

    async fn continue_draft(
        &self,
        user: &DomainUser,
        session: &mut ChatSession,
        intent: Intent,
        mut pending: PendingAction,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Option<CreatedRecord>)> {
        let today = now.date_naive();

        if is_negative(message) {
            session.reset(now);
            return Ok((CANCELLED_REPLY.to_string(), None));
        }

        if is_affirmative(message) && missing_question(&pending).is_none() {
            if let Some(feature) = intent.feature() {
                if !user.can_use(feature, now) {
                    info!("Chat {} draft locked for user {} before saving", intent.as_str(), user.id);
                    session.reset(now);
                    return Ok((upsell_reply(feature), None));
                }
            }
            let created = self.persist(user, &pending).await?;
            info!("Chat created {} {} for user {}", created.kind, created.id, user.id);
            session.reset(now);
            return Ok((saved_reply(&pending), Some(created)));
        }

        merge(&mut pending, parse_details(intent, message, today), true);
        self.fill_from_model(intent, &mut pending, message, today).await;

        let reply = prompt_for(&pending, today);
        session.state = intent.waiting_state();
        session.pending = Some(pending);
        Ok((reply, None))
    }

    /// Ask the completion model for fields the rules could not find
    async fn fill_from_model(&self, intent: Intent, pending: &mut PendingAction, message: &str, today: NaiveDate) {
        let Some(client) = &self.completion_client else {
            return;
        };
        if missing_question(pending).is_none() {
            return;
        }

        match client.complete_json(&system_prompt(intent, today), message).await {
            Ok(value) => {
                debug!("Completion reply for {}: {}", intent.as_str(), value);
                merge(pending, draft_from_json(intent, &value), false);
            }
            Err(e) => warn!("Completion request failed, continuing with rules only: {}", e),
        }
    }

    async fn persist(&self, user: &DomainUser, pending: &PendingAction) -> Result<CreatedRecord> {
        match pending {
            PendingAction::Expense(draft) => {
                let category = draft.category.clone().unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
                let expense = self
                    .expense_service
                    .create_expense(
                        user,
                        CreateExpenseCommand {
                            amount: draft.amount.unwrap_or_default(),
                            description: draft.description.clone().unwrap_or_else(|| category.clone()),
                            category,
                            date: draft.date,
                            payment_method: None,
                        },
                    )
                    .await?;
                Ok(CreatedRecord { kind: Intent::Expense.as_str().to_string(), id: expense.id })
            }
            PendingAction::Income(draft) => {
                let source = draft.source.clone().unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
                let income = self
                    .income_service
                    .create_income(
                        user,
                        CreateIncomeCommand {
                            amount: draft.amount.unwrap_or_default(),
                            description: draft.description.clone().unwrap_or_else(|| source.clone()),
                            source,
                            date: draft.date,
                            recurring: false,
                        },
                    )
                    .await?;
                Ok(CreatedRecord { kind: Intent::Income.as_str().to_string(), id: income.id })
            }
            PendingAction::Appointment(draft) => {
                let date = draft
                    .date
                    .ok_or_else(|| DomainError::validation("Appointment date is missing"))?;
                let appointment = self
                    .calendar_service
                    .create_appointment(
                        user,
                        CreateAppointmentCommand {
                            title: draft.title.clone().unwrap_or_default(),
                            description: None,
                            date,
                            time: draft.time,
                            location: draft.location.clone(),
                        },
                    )
                    .await?;
                Ok(CreatedRecord { kind: Intent::Appointment.as_str().to_string(), id: appointment.id })
            }
        }
    }
}

fn prompt_for(pending: &PendingAction, today: NaiveDate) -> String {
    missing_question(pending).unwrap_or_else(|| summary(pending, today))
}

fn saved_reply(pending: &PendingAction) -> String {
    match pending {
        PendingAction::Expense(draft) => format!(
            "Pronto! Gasto de {} em {} registrado.",
            format_brl(draft.amount.unwrap_or_default()),
            draft.category.as_deref().unwrap_or(FALLBACK_CATEGORY)
        ),
        PendingAction::Income(draft) => format!(
            "Pronto! Receita de {} ({}) registrada.",
            format_brl(draft.amount.unwrap_or_default()),
            draft.source.as_deref().unwrap_or(FALLBACK_CATEGORY)
        ),
        PendingAction::Appointment(draft) => format!(
            "Pronto! Compromisso \"{}\" agendado.",
            draft.title.as_deref().unwrap_or_default()
        ),
    }
}

fn upsell_reply(feature: Feature) -> String {
    let what = match feature {
        Feature::IncomeTracking => "O registro de receitas",
        Feature::Calendar => "A agenda de compromissos",
        Feature::AdvancedAnalytics => "A análise avançada",
    };
    format!("{} está disponível nos planos Ouro e Trial. Faça upgrade para usar pelo chat.", what)
}

fn system_prompt(intent: Intent, today: NaiveDate) -> String {
    let fields = match intent {
        Intent::Expense => format!(
            "amount (number), category (one of: {}), description, date",
            EXPENSE_CATEGORIES.join(", ")
        ),
        Intent::Income => format!(
            "amount (number), source (one of: {}), description, date",
            INCOME_SOURCES.join(", ")
        ),
        Intent::Appointment => "title, date, time, location".to_string(),
    };
    format!(
        "Extract an {} from a Brazilian Portuguese message. Today is {}. \
         Reply with a single JSON object with the keys {}. \
         Use null for anything not stated. Dates are YYYY-MM-DD and times HH:MM.",
        intent.as_str(),
        today.format("%Y-%m-%d"),
        fields
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::ledger::RecordListQuery;
    use crate::domain::notification_service::NotificationService;
    use crate::storage::MemoryConnection;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveTime};
    use serde_json::{json, Value};
    use shared::{ChatState, PlanTier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        reply: Option<Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete_json(&self, _system_prompt: &str, _user_message: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(|| anyhow::anyhow!("model unavailable"))
        }
    }

    fn user(tier: PlanTier) -> DomainUser {
        let now = Utc::now();
        DomainUser {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            plan_tier: tier,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct Fixture {
        chat: ChatService,
        expenses: ExpenseService,
        incomes: IncomeService,
        calendar: CalendarService,
    }

    fn fixture(client: Option<Arc<dyn CompletionClient>>) -> Fixture {
        let conn = MemoryConnection::new();
        let expenses = ExpenseService::new(&conn, NotificationService::new(&conn));
        let incomes = IncomeService::new(&conn);
        let calendar = CalendarService::new(&conn);
        let chat = ChatService::new(&conn, expenses.clone(), incomes.clone(), calendar.clone(), client);
        Fixture { chat, expenses, incomes, calendar }
    }

    #[tokio::test]
    async fn test_expense_confirmed_in_two_messages() {
        let f = fixture(None);
        let ana = user(PlanTier::Bronze);
        let now = Utc::now();

        let turn = f.chat.handle_message(&ana, "gastei 50 reais no mercado", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingExpense);
        assert!(turn.reply.starts_with("Confirma o gasto de R$ 50,00 em Alimentação (Mercado)"));
        assert!(turn.created.is_none());

        let turn = f.chat.handle_message(&ana, "sim", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::Initial);
        assert!(turn.session.pending.is_none());
        let created = turn.created.unwrap();
        assert_eq!(created.kind, "expense");

        let expense = f.expenses.get_expense(&ana, &created.id).await.unwrap();
        assert_eq!(expense.amount, 50.0);
        assert_eq!(expense.category, "Alimentação");
        assert_eq!(expense.description, "Mercado");
        assert_eq!(expense.date, now.date_naive());
    }

    #[tokio::test]
    async fn test_missing_amount_is_asked_for() {
        let f = fixture(None);
        let ana = user(PlanTier::Bronze);
        let now = Utc::now();

        let turn = f.chat.handle_message(&ana, "paguei o uber", now).await.unwrap();
        assert_eq!(turn.reply, "Qual foi o valor do gasto?");

        // Confirming an incomplete draft repeats the question
        let turn = f.chat.handle_message(&ana, "sim", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingExpense);
        assert_eq!(turn.reply, "Qual foi o valor do gasto?");

        let turn = f.chat.handle_message(&ana, "23,40", now).await.unwrap();
        assert!(turn.reply.starts_with("Confirma o gasto de R$ 23,40 em Transporte"));

        let turn = f.chat.handle_message(&ana, "ok", now).await.unwrap();
        assert!(turn.created.is_some());
        let page = f.expenses.list_expenses(&ana, RecordListQuery::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].amount, 23.4);
    }

    #[tokio::test]
    async fn test_negative_discards_draft() {
        let f = fixture(None);
        let ouro = user(PlanTier::Ouro);
        let now = Utc::now();

        let turn = f.chat.handle_message(&ouro, "recebi 3000 de salário", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingIncome);

        let turn = f.chat.handle_message(&ouro, "não", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::Initial);
        assert_eq!(turn.reply, CANCELLED_REPLY);
        let page = f.incomes.list_incomes(&ouro, RecordListQuery::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_locked_intent_gets_upsell() {
        let f = fixture(None);
        let turn = f
            .chat
            .handle_message(&user(PlanTier::Bronze), "recebi 3000 de salário", Utc::now())
            .await
            .unwrap();
        assert_eq!(turn.session.state, ChatState::Initial);
        assert!(turn.reply.contains("planos Ouro e Trial"));
    }

    #[tokio::test]
    async fn test_affirmative_answer_fills_missing_category() {
        let f = fixture(None);
        let ana = user(PlanTier::Bronze);
        let now = Utc::now();

        let turn = f.chat.handle_message(&ana, "gastei 30", now).await.unwrap();
        assert!(turn.reply.starts_with("Em qual categoria?"));

        let turn = f.chat.handle_message(&ana, "pode ser lazer", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingExpense);
        assert!(turn.reply.starts_with("Confirma o gasto de R$ 30,00 em Lazer"));
        assert!(turn.created.is_none());

        let turn = f.chat.handle_message(&ana, "sim", now).await.unwrap();
        let created = turn.created.unwrap();
        let expense = f.expenses.get_expense(&ana, &created.id).await.unwrap();
        assert_eq!(expense.category, "Lazer");
        assert_eq!(expense.amount, 30.0);
    }

    #[tokio::test]
    async fn test_downgrade_before_confirmation_gets_upsell() {
        let f = fixture(None);
        let now = Utc::now();

        let turn = f.chat.handle_message(&user(PlanTier::Ouro), "recebi 3000 de salário", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingIncome);

        let turn = f.chat.handle_message(&user(PlanTier::Bronze), "sim", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::Initial);
        assert!(turn.session.pending.is_none());
        assert!(turn.created.is_none());
        assert!(turn.reply.contains("planos Ouro e Trial"));

        let page = f.incomes.list_incomes(&user(PlanTier::Ouro), RecordListQuery::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_message_gets_help() {
        let f = fixture(None);
        let turn = f.chat.handle_message(&user(PlanTier::Bronze), "olá, tudo bem?", Utc::now()).await.unwrap();
        assert_eq!(turn.session.state, ChatState::Initial);
        assert_eq!(turn.reply, HELP_REPLY);
    }

    #[tokio::test]
    async fn test_appointment_flow() {
        let f = fixture(None);
        let ouro = user(PlanTier::Ouro);
        let now = Utc::now();

        let turn = f.chat.handle_message(&ouro, "marcar dentista amanhã às 14h", now).await.unwrap();
        assert_eq!(turn.session.state, ChatState::WaitingAppointment);

        let turn = f.chat.handle_message(&ouro, "confirmo", now).await.unwrap();
        let created = turn.created.unwrap();
        assert_eq!(created.kind, "appointment");

        let appointment = f.calendar.get_appointment(&ouro, &created.id).await.unwrap();
        assert_eq!(appointment.title, "Dentista");
        assert_eq!(appointment.date, now.date_naive() + Duration::days(1));
        assert_eq!(appointment.time, NaiveTime::from_hms_opt(14, 0, 0));
    }

    #[tokio::test]
    async fn test_model_fills_missing_fields() {
        let client = Arc::new(StubClient {
            reply: Some(json!({ "amount": 80, "category": "lazer", "description": "Cinema" })),
            calls: AtomicUsize::new(0),
        });
        let f = fixture(Some(client.clone()));
        let ana = user(PlanTier::Bronze);

        let turn = f.chat.handle_message(&ana, "gastei com ingressos", Utc::now()).await.unwrap();
        let Some(PendingAction::Expense(draft)) = turn.session.pending else {
            panic!("expected an expense draft")
        };
        assert_eq!(draft.amount, Some(80.0));
        assert_eq!(draft.category.as_deref(), Some("Lazer"));
        assert_eq!(draft.description.as_deref(), Some("Ingressos"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_skipped_when_rules_suffice() {
        let client = Arc::new(StubClient { reply: Some(json!({})), calls: AtomicUsize::new(0) });
        let f = fixture(Some(client.clone()));
        f.chat
            .handle_message(&user(PlanTier::Bronze), "gastei 12 na padaria", Utc::now())
            .await
            .unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_rules() {
        let client = Arc::new(StubClient { reply: None, calls: AtomicUsize::new(0) });
        let f = fixture(Some(client.clone()));
        let turn = f
            .chat
            .handle_message(&user(PlanTier::Bronze), "paguei a farmácia", Utc::now())
            .await
            .unwrap();
        assert_eq!(turn.reply, "Qual foi o valor do gasto?");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_and_validation() {
        let f = fixture(None);
        let ana = user(PlanTier::Bronze);
        f.chat.handle_message(&ana, "gastei 10", Utc::now()).await.unwrap();
        assert_eq!(f.chat.session(&ana).await.unwrap().state, ChatState::WaitingExpense);

        let session = f.chat.reset(&ana).await.unwrap();
        assert_eq!(session.state, ChatState::Initial);
        assert_eq!(f.chat.session(&ana).await.unwrap().state, ChatState::Initial);

        let err = f.chat.handle_message(&ana, "   ", Utc::now()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Validation(_))));
    }
}
