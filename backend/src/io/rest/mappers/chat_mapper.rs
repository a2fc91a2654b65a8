use shared::{ChatReply, ChatSessionResponse};

use crate::domain::chat::ChatTurn;
use crate::domain::models::ChatSession;

pub struct ChatMapper;

impl ChatMapper {
    pub fn to_reply_dto(turn: ChatTurn) -> ChatReply {
        ChatReply {
            state: turn.session.state,
            reply: turn.reply,
            pending: turn.session.pending,
            created: turn.created,
        }
    }

    pub fn to_session_dto(session: ChatSession) -> ChatSessionResponse {
        ChatSessionResponse {
            state: session.state,
            pending: session.pending,
            updated_at: session.updated_at,
        }
    }
}
