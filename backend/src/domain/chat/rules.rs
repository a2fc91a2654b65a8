//! Rule-based extraction for the chat flow.
//!
//! Messages are Portuguese. Keyword matching runs on a lowercased copy with
//! accents folded away, so "não", "Nao" and "NÃO" all read the same. Titles
//! and descriptions are cut from the original text so accents survive.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use shared::{AppointmentDraft, ChatState, ExpenseDraft, Feature, IncomeDraft, PendingAction};

use crate::domain::errors::MAX_TEXT_LEN;

pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Lazer",
    "Educação",
    "Compras",
    "Outros",
];

pub const INCOME_SOURCES: [&str; 5] = ["Salário", "Freelance", "Investimentos", "Vendas", "Outros"];

pub const FALLBACK_CATEGORY: &str = "Outros";

/// What a message asks to record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Expense,
    Income,
    Appointment,
}

impl Intent {
    /// Plan feature needed to act on this intent
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Intent::Expense => None,
            Intent::Income => Some(Feature::IncomeTracking),
            Intent::Appointment => Some(Feature::Calendar),
        }
    }

    pub fn waiting_state(&self) -> ChatState {
        match self {
            Intent::Expense => ChatState::WaitingExpense,
            Intent::Income => ChatState::WaitingIncome,
            Intent::Appointment => ChatState::WaitingAppointment,
        }
    }

    pub fn of_state(state: ChatState) -> Option<Intent> {
        match state {
            ChatState::Initial => None,
            ChatState::WaitingExpense => Some(Intent::Expense),
            ChatState::WaitingIncome => Some(Intent::Income),
            ChatState::WaitingAppointment => Some(Intent::Appointment),
        }
    }

    pub fn of_pending(pending: &PendingAction) -> Intent {
        match pending {
            PendingAction::Expense(_) => Intent::Expense,
            PendingAction::Income(_) => Intent::Income,
            PendingAction::Appointment(_) => Intent::Appointment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Expense => "expense",
            Intent::Income => "income",
            Intent::Appointment => "appointment",
        }
    }
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern")
}

static AFFIRMATIVE: Lazy<Regex> = Lazy::new(|| pattern(r"^\W*(?:sim|s|isso|confirmo|confirmar|ok|pode)\b"));
static NEGATIVE: Lazy<Regex> = Lazy::new(|| pattern(r"^\W*(?:nao|n|cancela|cancelar)\b"));

static EXPENSE_INTENT: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(?:gastei|paguei|comprei|gasto|gastos|despesa|despesas|conta de)\b"));
static INCOME_INTENT: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(?:recebi|ganhei|salario|renda|receita|entrada|freela\w*)\b"));
static APPOINTMENT_INTENT: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(?:agendar|agende|marcar|marque|consulta|reuniao|compromisso|lembrete|dentista|medico)\b")
});

static CURRENCY_AMOUNT: Lazy<Regex> =
    Lazy::new(|| pattern(r"r\$\s*(\d{1,3}(?:\.\d{3})+(?:,\d{1,2})?|\d+(?:[.,]\d{1,2})?)"));
static REAIS_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(\d{1,3}(?:\.\d{3})+(?:,\d{1,2})?|\d+(?:[.,]\d{1,2})?)\s*(?:reais|real)\b")
});
static NUMBER: Lazy<Regex> = Lazy::new(|| pattern(r"\d{1,3}(?:\.\d{3})+(?:,\d{1,2})?|\d+(?:[.,]\d{1,2})?"));

static SLASH_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b"));
static DAY_OF_MONTH: Lazy<Regex> = Lazy::new(|| pattern(r"\bdia (\d{1,2})\b"));
static RELATIVE_DAY: Lazy<Regex> = Lazy::new(|| pattern(r"\b(depois de amanha|amanha|ontem|hoje)\b"));

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| pattern(r"\b(\d{1,2}):(\d{2})\b"));
static HOUR_TIME: Lazy<Regex> = Lazy::new(|| pattern(r"\b(\d{1,2})h(\d{2})?\b"));
static AT_HOUR: Lazy<Regex> = Lazy::new(|| pattern(r"\b(?:as|das)\s+(\d{1,2})\b"));

/// Spans removed from a message before what is left becomes a title or description
static NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^\W*(?:sim|isso|confirmo|confirmar|ok|pode(?:\s+ser)?)\b",
        r"(?i)r\$\s*[\d.,]+",
        r"(?i)\b\d+(?:[.,]\d+)*\s*(?:reais|real|contos?)\b",
        r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b",
        r"(?i)\bdia\s+\d{1,2}\b",
        r"(?i)\b(?:depois de amanh[ãa]|amanh[ãa]|hoje|ontem)\b",
        r"(?i)(?:\b[àa]s|\bdas)\s+\d{1,2}(?:(?::\d{2})|(?:h\d{0,2}))?\b",
        r"(?i)\b\d{1,2}(?::\d{2}|h\d{0,2})\b",
        r"\b\d+(?:[.,]\d+)*\b",
        r"(?i)\b(?:gastei|paguei|comprei|recebi|ganhei|agendar|agende|marcar|marque|quero|preciso|registrar|registre|anotar|anote|adicionar|adicione|lembrete|lembrar)\b",
    ]
    .iter()
    .map(|re| pattern(re))
    .collect()
});

const EDGE_STOP_WORDS: [&str; 27] = [
    "no", "na", "nos", "nas", "em", "de", "do", "da", "dos", "das", "com", "pra", "para", "por", "o",
    "a", "os", "as", "um", "uma", "e", "que", "eu", "me", "meu", "minha", "reais",
];

struct Synonyms {
    canonical: &'static str,
    matcher: Regex,
}

fn synonyms(table: &[(&'static str, &str)]) -> Vec<Synonyms> {
    table
        .iter()
        .map(|(canonical, words)| Synonyms {
            canonical: *canonical,
            matcher: pattern(&format!(r"\b(?:{})\b", words.split_whitespace().collect::<Vec<_>>().join("|"))),
        })
        .collect()
}

static EXPENSE_SYNONYMS: Lazy<Vec<Synonyms>> = Lazy::new(|| {
    synonyms(&[
        (
            "Alimentação",
            "alimentacao mercado supermercado restaurante almoco jantar lanche comida ifood padaria \
             cafe pizza feira acougue",
        ),
        (
            "Transporte",
            "transporte uber taxi onibus metro gasolina combustivel estacionamento passagem pedagio",
        ),
        ("Moradia", "moradia aluguel condominio luz agua energia internet gas iptu"),
        (
            "Saúde",
            "saude farmacia remedio remedios medico consulta dentista hospital exame exames academia",
        ),
        ("Lazer", "lazer cinema show netflix spotify viagem bar festa jogo jogos passeio"),
        ("Educação", "educacao curso livro livros escola faculdade mensalidade material"),
        ("Compras", "compras roupa roupas sapato tenis shopping presente eletronico amazon"),
        ("Outros", "outros outro outra"),
    ])
});

static INCOME_SYNONYMS: Lazy<Vec<Synonyms>> = Lazy::new(|| {
    synonyms(&[
        ("Salário", "salario pagamento holerite contracheque ordenado"),
        ("Freelance", "freelance freela freelas freelancer projeto bico job"),
        ("Investimentos", "investimentos investimento dividendo dividendos rendimento rendimentos juros"),
        ("Vendas", "vendas venda vendi"),
        ("Outros", "outros outro outra"),
    ])
});

/// Lowercase and strip Portuguese diacritics
pub fn fold(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// A confirmation carries no new details, so any digit disqualifies it
pub fn is_affirmative(text: &str) -> bool {
    let folded = fold(text);
    AFFIRMATIVE.is_match(&folded) && !folded.chars().any(|c| c.is_ascii_digit())
}

pub fn is_negative(text: &str) -> bool {
    NEGATIVE.is_match(&fold(text))
}

/// The intent whose keyword appears first in the message
pub fn detect_intent(text: &str) -> Option<Intent> {
    let folded = fold(text);
    [
        (Intent::Expense, &*EXPENSE_INTENT),
        (Intent::Income, &*INCOME_INTENT),
        (Intent::Appointment, &*APPOINTMENT_INTENT),
    ]
    .into_iter()
    .filter_map(|(intent, matcher)| matcher.find(&folded).map(|m| (m.start(), intent)))
    .min_by_key(|(position, _)| *position)
    .map(|(_, intent)| intent)
}

/// Parse `1.234,56`, `50,90`, `50.90` or `1234`
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let normalized = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else if raw.rsplit_once('.').is_some_and(|(_, decimals)| decimals.len() == 3) {
        raw.replace('.', "")
    } else {
        raw.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// First money amount in the message. Numbers that belong to a date, a time
/// or a day reference are skipped.
pub fn extract_amount(text: &str) -> Option<f64> {
    let folded = fold(text);
    for marked in [&*CURRENCY_AMOUNT, &*REAIS_AMOUNT] {
        if let Some(amount) = marked
            .captures(&folded)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_amount(m.as_str()))
        {
            return Some(amount);
        }
    }

    // Clock times never hold an amount, minutes included
    let scrubbed = HOUR_TIME.replace_all(&folded, " ");
    let scrubbed = CLOCK_TIME.replace_all(&scrubbed, " ");

    NUMBER
        .find_iter(&scrubbed)
        .filter(|m| {
            let before = &scrubbed[..m.start()];
            let after = &scrubbed[m.end()..];
            let prev_char = before.chars().last();
            let next_char = after.chars().next();
            let prev_word = before.split_whitespace().last();
            !matches!(prev_char, Some('/') | Some(':'))
                && !matches!(next_char, Some('/') | Some(':') | Some('h'))
                && !(prev_char.is_some_and(char::is_whitespace)
                    && matches!(prev_word, Some("as") | Some("das") | Some("dia")))
        })
        .find_map(|m| parse_amount(m.as_str()))
}

/// Date named in the message, relative to `today`
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let folded = fold(text);

    if let Some(c) = SLASH_DATE.captures(&folded) {
        let day: u32 = c[1].parse().ok()?;
        let month: u32 = c[2].parse().ok()?;
        let year = match c.get(3) {
            Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
            Some(y) => y.as_str().parse().ok()?,
            None => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(c) = DAY_OF_MONTH.captures(&folded) {
        let day: u32 = c[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(today.year(), today.month(), day);
    }
    RELATIVE_DAY.captures(&folded).map(|c| match &c[1] {
        "depois de amanha" => today + Duration::days(2),
        "amanha" => today + Duration::days(1),
        "ontem" => today - Duration::days(1),
        _ => today,
    })
}

/// Time named in the message: `14:30`, `14h`, `14h30` or `às 9`
pub fn extract_time(text: &str) -> Option<NaiveTime> {
    let folded = fold(text);
    let (hour, minute) = if let Some(c) = CLOCK_TIME.captures(&folded) {
        (c[1].parse().ok()?, c[2].parse().ok()?)
    } else if let Some(c) = HOUR_TIME.captures(&folded) {
        let minute = match c.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        (c[1].parse().ok()?, minute)
    } else if let Some(c) = AT_HOUR.captures(&folded) {
        (c[1].parse().ok()?, 0)
    } else {
        return None;
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn match_synonym(table: &[Synonyms], text: &str) -> Option<&'static str> {
    let folded = fold(text);
    table
        .iter()
        .filter_map(|s| s.matcher.find(&folded).map(|m| (m.start(), s.canonical)))
        .min_by_key(|(position, _)| *position)
        .map(|(_, canonical)| canonical)
}

pub fn expense_category(text: &str) -> Option<&'static str> {
    match_synonym(&EXPENSE_SYNONYMS, text)
}

pub fn income_source(text: &str) -> Option<&'static str> {
    match_synonym(&INCOME_SYNONYMS, text)
}

/// What remains of the message once amounts, dates, times and command verbs
/// are cut out, capitalized. `None` when nothing meaningful is left.
pub fn extract_label(text: &str) -> Option<String> {
    let mut rest = text.to_string();
    for noise in NOISE.iter() {
        rest = noise.replace_all(&rest, " ").into_owned();
    }

    let mut words: Vec<&str> = rest
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();
    while words.first().is_some_and(|w| is_edge_stop_word(w)) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| is_edge_stop_word(w)) {
        words.pop();
    }
    if words.is_empty() {
        return None;
    }

    let joined: String = words.join(" ").chars().take(MAX_TEXT_LEN).collect();
    let mut chars = joined.chars();
    chars.next().map(|first| first.to_uppercase().chain(chars).collect())
}

fn is_edge_stop_word(word: &str) -> bool {
    let folded = fold(word);
    EDGE_STOP_WORDS.contains(&folded.as_str())
}

/// Everything the rules can read from a message, shaped for `intent`
pub fn parse_details(intent: Intent, text: &str, today: NaiveDate) -> PendingAction {
    match intent {
        Intent::Expense => PendingAction::Expense(ExpenseDraft {
            amount: extract_amount(text),
            category: expense_category(text).map(str::to_string),
            description: extract_label(text),
            date: extract_date(text, today),
        }),
        Intent::Income => PendingAction::Income(IncomeDraft {
            amount: extract_amount(text),
            source: income_source(text).map(str::to_string),
            description: extract_label(text),
            date: extract_date(text, today),
        }),
        Intent::Appointment => PendingAction::Appointment(AppointmentDraft {
            title: extract_label(text),
            date: extract_date(text, today),
            time: extract_time(text),
            location: None,
        }),
    }
}

/// Read a completion reply (`{"amount": .., "category": .., ...}`) into a draft
pub fn draft_from_json(intent: Intent, value: &Value) -> PendingAction {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(MAX_TEXT_LEN).collect::<String>())
    };
    let amount = value.get("amount").and_then(|v| match v {
        Value::Number(n) => n.as_f64().filter(|a| a.is_finite() && *a > 0.0),
        Value::String(s) => parse_amount(s.trim_start_matches("R$").trim()),
        _ => None,
    });
    let date = text("date").and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

    match intent {
        Intent::Expense => PendingAction::Expense(ExpenseDraft {
            amount,
            category: text("category")
                .map(|c| expense_category(&c).unwrap_or(FALLBACK_CATEGORY).to_string()),
            description: text("description"),
            date,
        }),
        Intent::Income => PendingAction::Income(IncomeDraft {
            amount,
            source: text("source")
                .or_else(|| text("category"))
                .map(|s| income_source(&s).unwrap_or(FALLBACK_CATEGORY).to_string()),
            description: text("description"),
            date,
        }),
        Intent::Appointment => PendingAction::Appointment(AppointmentDraft {
            title: text("title").or_else(|| text("description")),
            date,
            time: text("time").and_then(|t| {
                NaiveTime::parse_from_str(&t, "%H:%M")
                    .or_else(|_| NaiveTime::parse_from_str(&t, "%H:%M:%S"))
                    .ok()
            }),
            location: text("location"),
        }),
    }
}

/// Combine two drafts of the same kind. With `overwrite` the update wins on
/// amount, category, date and time; labels are only ever filled in.
pub fn merge(base: &mut PendingAction, update: PendingAction, overwrite: bool) {
    fn pick<T>(current: &mut Option<T>, new: Option<T>, overwrite: bool) {
        if new.is_some() && (overwrite || current.is_none()) {
            *current = new;
        }
    }

    match (base, update) {
        (PendingAction::Expense(base), PendingAction::Expense(update)) => {
            pick(&mut base.amount, update.amount, overwrite);
            pick(&mut base.category, update.category, overwrite);
            pick(&mut base.date, update.date, overwrite);
            pick(&mut base.description, update.description, false);
        }
        (PendingAction::Income(base), PendingAction::Income(update)) => {
            pick(&mut base.amount, update.amount, overwrite);
            pick(&mut base.source, update.source, overwrite);
            pick(&mut base.date, update.date, overwrite);
            pick(&mut base.description, update.description, false);
        }
        (PendingAction::Appointment(base), PendingAction::Appointment(update)) => {
            pick(&mut base.date, update.date, overwrite);
            pick(&mut base.time, update.time, overwrite);
            pick(&mut base.location, update.location, overwrite);
            pick(&mut base.title, update.title, false);
        }
        _ => {}
    }
}

/// Question for the first required field still missing, `None` when the draft is complete
pub fn missing_question(pending: &PendingAction) -> Option<String> {
    match pending {
        PendingAction::Expense(draft) => {
            if draft.amount.is_none() {
                Some("Qual foi o valor do gasto?".to_string())
            } else if draft.category.is_none() {
                Some(format!("Em qual categoria? ({})", EXPENSE_CATEGORIES.join(", ")))
            } else {
                None
            }
        }
        PendingAction::Income(draft) => {
            if draft.amount.is_none() {
                Some("Qual foi o valor recebido?".to_string())
            } else if draft.source.is_none() {
                Some(format!("Qual a origem da receita? ({})", INCOME_SOURCES.join(", ")))
            } else {
                None
            }
        }
        PendingAction::Appointment(draft) => {
            if draft.title.is_none() {
                Some("Qual é o compromisso?".to_string())
            } else if draft.date.is_none() {
                Some("Para qual dia? (ex.: amanhã, 15/07, dia 20)".to_string())
            } else {
                None
            }
        }
    }
}

/// Confirmation prompt for a complete draft
pub fn summary(pending: &PendingAction, today: NaiveDate) -> String {
    let day = |date: Option<NaiveDate>| date.unwrap_or(today).format("%d/%m/%Y").to_string();
    let body = match pending {
        PendingAction::Expense(draft) => format!(
            "Confirma o gasto de {} em {}{} no dia {}?",
            format_brl(draft.amount.unwrap_or_default()),
            draft.category.as_deref().unwrap_or(FALLBACK_CATEGORY),
            draft.description.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default(),
            day(draft.date),
        ),
        PendingAction::Income(draft) => format!(
            "Confirma a receita de {} ({}){} no dia {}?",
            format_brl(draft.amount.unwrap_or_default()),
            draft.source.as_deref().unwrap_or(FALLBACK_CATEGORY),
            draft.description.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default(),
            day(draft.date),
        ),
        PendingAction::Appointment(draft) => format!(
            "Confirma o compromisso \"{}\" em {}{}{}?",
            draft.title.as_deref().unwrap_or_default(),
            day(draft.date),
            draft.time.map(|t| format!(" às {}", t.format("%H:%M"))).unwrap_or_default(),
            draft.location.as_deref().map(|l| format!(" ({})", l)).unwrap_or_default(),
        ),
    };
    format!("{} Responda sim ou não.", body)
}

/// `1234.5` as `R$ 1.234,50`
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_confirmation_words() {
        assert!(is_affirmative("Sim"));
        assert!(is_affirmative("s"));
        assert!(is_affirmative("ok, pode salvar"));
        assert!(!is_affirmative("sim, mas foi 60"));
        assert!(!is_affirmative("sábado"));
        assert!(is_negative("Não"));
        assert!(is_negative("NAO quero"));
        assert!(is_negative("cancela"));
        assert!(!is_negative("nada disso"));
    }

    #[test]
    fn test_detect_intent() {
        assert_eq!(detect_intent("Gastei 50 no mercado"), Some(Intent::Expense));
        assert_eq!(detect_intent("recebi meu salário"), Some(Intent::Income));
        assert_eq!(detect_intent("Marcar reunião amanhã"), Some(Intent::Appointment));
        assert_eq!(detect_intent("paguei a consulta do médico"), Some(Intent::Expense));
        assert_eq!(detect_intent("conta de luz 120"), Some(Intent::Expense));
        assert_eq!(detect_intent("bom dia"), None);
    }

    #[test]
    fn test_amounts() {
        assert_eq!(extract_amount("gastei R$ 1.234,56 no aluguel"), Some(1234.56));
        assert_eq!(extract_amount("paguei 50,90"), Some(50.9));
        assert_eq!(extract_amount("paguei 50.90"), Some(50.9));
        assert_eq!(extract_amount("gastei 50 reais"), Some(50.0));
        assert_eq!(extract_amount("dia 15 gastei 30"), Some(30.0));
        assert_eq!(extract_amount("15/06 paguei 80"), Some(80.0));
        assert_eq!(extract_amount("às 9 gastei 12"), Some(12.0));
        assert_eq!(extract_amount("consulta às 14h"), None);
        assert_eq!(extract_amount("paguei o uber às 14h30"), None);
        assert_eq!(extract_amount("estacionamento 9h45 paguei 12"), Some(12.0));
        assert_eq!(extract_amount("reunião 10:15 custou 25"), Some(25.0));
        assert_eq!(extract_amount("comprei 2 pães por 10 reais"), Some(10.0));
        assert_eq!(extract_amount("3 cafés por R$ 7,50 e 20 reais de gorjeta"), Some(7.5));
        assert_eq!(extract_amount("sem valor"), None);
    }

    #[test]
    fn test_dates() {
        assert_eq!(extract_date("hoje", today()), Some(today()));
        assert_eq!(extract_date("ontem", today()), NaiveDate::from_ymd_opt(2025, 6, 9));
        assert_eq!(extract_date("Amanhã cedo", today()), NaiveDate::from_ymd_opt(2025, 6, 11));
        assert_eq!(extract_date("depois de amanhã", today()), NaiveDate::from_ymd_opt(2025, 6, 12));
        assert_eq!(extract_date("em 25/12", today()), NaiveDate::from_ymd_opt(2025, 12, 25));
        assert_eq!(extract_date("em 05/01/26", today()), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(extract_date("dia 20", today()), NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(extract_date("dia 31", today()), None);
        assert_eq!(extract_date("sem data", today()), None);
    }

    #[test]
    fn test_times() {
        assert_eq!(extract_time("às 14:30"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(extract_time("14h"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(extract_time("9h15"), NaiveTime::from_hms_opt(9, 15, 0));
        assert_eq!(extract_time("às 9"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(extract_time("25h"), None);
        assert_eq!(extract_time("amanhã"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(expense_category("almoço no restaurante"), Some("Alimentação"));
        assert_eq!(expense_category("UBER pro trabalho"), Some("Transporte"));
        assert_eq!(expense_category("saúde"), Some("Saúde"));
        assert_eq!(expense_category("nada aqui"), None);
        assert_eq!(income_source("recebi o salário"), Some("Salário"));
        assert_eq!(income_source("um freela de design"), Some("Freelance"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(extract_label("gastei 50 reais no mercado hoje").as_deref(), Some("Mercado"));
        assert_eq!(
            extract_label("marcar consulta com o dentista amanhã às 14h").as_deref(),
            Some("Consulta com o dentista")
        );
        assert_eq!(extract_label("recebi R$ 3.000,00 de salário").as_deref(), Some("Salário"));
        assert_eq!(extract_label("paguei 50"), None);
        assert_eq!(extract_label("pode ser lazer").as_deref(), Some("Lazer"));
        assert_eq!(extract_label("ok, foi no mercado").as_deref(), Some("Foi no mercado"));
    }

    #[test]
    fn test_parse_expense_details() {
        let pending = parse_details(Intent::Expense, "gastei 45,90 no mercado ontem", today());
        assert_eq!(
            pending,
            PendingAction::Expense(ExpenseDraft {
                amount: Some(45.9),
                category: Some("Alimentação".to_string()),
                description: Some("Mercado".to_string()),
                date: NaiveDate::from_ymd_opt(2025, 6, 9),
            })
        );
        assert!(missing_question(&pending).is_none());
    }

    #[test]
    fn test_clock_time_is_not_an_amount() {
        let pending = parse_details(Intent::Expense, "paguei o estacionamento às 9h45", today());
        let PendingAction::Expense(draft) = &pending else { panic!("expected expense") };
        assert_eq!(draft.amount, None);
        assert_eq!(missing_question(&pending).as_deref(), Some("Qual foi o valor do gasto?"));
    }

    #[test]
    fn test_merge_and_questions() {
        let mut pending = parse_details(Intent::Expense, "gastei 30", today());
        assert_eq!(missing_question(&pending).as_deref().map(|q| q.starts_with("Em qual categoria")), Some(true));

        merge(&mut pending, parse_details(Intent::Expense, "lazer", today()), true);
        let PendingAction::Expense(draft) = &pending else { panic!("expected expense") };
        assert_eq!(draft.amount, Some(30.0));
        assert_eq!(draft.category.as_deref(), Some("Lazer"));
        assert_eq!(draft.description.as_deref(), Some("Lazer"));

        merge(&mut pending, parse_details(Intent::Expense, "na verdade foi 35", today()), true);
        let PendingAction::Expense(draft) = &pending else { panic!("expected expense") };
        assert_eq!(draft.amount, Some(35.0));
        assert_eq!(draft.description.as_deref(), Some("Lazer"));
    }

    #[test]
    fn test_draft_from_json() {
        let value = json!({
            "amount": "R$ 120,50",
            "category": "food delivery",
            "description": "Pedido",
            "date": "2025-06-08"
        });
        let PendingAction::Expense(draft) = draft_from_json(Intent::Expense, &value) else {
            panic!("expected expense")
        };
        assert_eq!(draft.amount, Some(120.5));
        assert_eq!(draft.category.as_deref(), Some("Outros"));
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 6, 8));

        let value = json!({ "title": "Reunião", "date": "2025-06-12", "time": "10:30", "location": "Escritório" });
        let PendingAction::Appointment(draft) = draft_from_json(Intent::Appointment, &value) else {
            panic!("expected appointment")
        };
        assert_eq!(draft.time, NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(draft.location.as_deref(), Some("Escritório"));
    }

    #[test]
    fn test_summary_and_money_format() {
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(50.0), "R$ 50,00");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");

        let pending = PendingAction::Appointment(AppointmentDraft {
            title: Some("Dentista".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 6, 11),
            time: NaiveTime::from_hms_opt(14, 0, 0),
            location: None,
        });
        assert_eq!(
            summary(&pending, today()),
            "Confirma o compromisso \"Dentista\" em 11/06/2025 às 14:00? Responda sim ou não."
        );
    }
}
