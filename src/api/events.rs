use actix_web::http::header;
use actix_web::{web, HttpResponse};
use futures_util::{future, StreamExt};

use crate::live::LiveEvent;
use super::AppState;

// ============================================================================
// Live Events - server-sent events over the live channel
// ============================================================================

/// One SSE frame: `event: <name>` followed by the JSON payload
pub fn sse_frame(event: &LiveEvent) -> serde_json::Result<String> {
    Ok(format!("event: {}\ndata: {}\n\n", event.name(), event.payload()?))
}

pub async fn stream_events(state: web::Data<AppState>) -> HttpResponse {
    tracing::info!(subscribers = state.live.subscriber_count() + 1, "Live event stream opened");

    let frames = state.live.stream().filter_map(|event| {
        let frame = match sse_frame(&event) {
            Ok(frame) => Some(Ok::<_, actix_web::Error>(web::Bytes::from(frame))),
            Err(e) => {
                tracing::warn!(event = event.name(), error = %e, "Dropping unserializable live event");
                None
            }
        };
        future::ready(frame)
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{ChatMessage, ConversationId, MessageId, NewMessageEvent, Sender, TempId};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_message_new_frame() {
        let conversation_id = ConversationId(Uuid::new_v4());
        let temp_id = TempId::new();
        let event = LiveEvent::MessageNew(NewMessageEvent {
            conversation_id,
            new_message: ChatMessage {
                message_id: Some(MessageId(55)),
                temp_id: None,
                conversation_id,
                sender: Sender::Staff { staff_id: Uuid::new_v4() },
                text_content: Some("hi".to_string()),
                image_content: None,
                created_at: Utc::now(),
            },
            temp_id: Some(temp_id),
        });

        let frame = sse_frame(&event).unwrap();
        assert!(frame.starts_with("event: message:new\ndata: {"));
        assert!(frame.ends_with("\n\n"));

        let data: serde_json::Value = serde_json::from_str(
            frame.trim_end().trim_start_matches("event: message:new\ndata: "),
        )
        .unwrap();
        assert_eq!(data["newMessage"]["messageId"], 55);
        assert_eq!(data["tempId"], temp_id.to_string());
        assert_eq!(data["conversationId"], conversation_id.to_string());
    }
}
