use actix::prelude::*;
use actix::AtomicResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::chat::{
    mark_failed, reconcile, ChatBackend, ChatError, ChatMessage, ConversationId, CustomerId,
    DeliveryState, MessageDraft, ReconcileOutcome, Sender, TempId, VisibleMessage,
};
use crate::live::{LiveChannel, LiveEvent};
use crate::metrics::Metrics;

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<usize, ChatError>")]
pub struct OpenConversation {
    pub conversation_id: ConversationId,
}

#[derive(Message)]
#[rtype(result = "Result<TempId, ChatError>")]
pub struct SendMessage {
    pub text_content: Option<String>,
    pub image_content: Option<String>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseConversation;

#[derive(Message)]
#[rtype(result = "Vec<VisibleMessage>")]
pub struct GetVisibleMessages;

// ============================================================================
// Chat View Actor - one staff member's open chat window
// ============================================================================
//
// Responsibilities:
// - Load the history of the conversation being viewed
// - Show sent messages immediately as pending entries
// - Merge `message:new` echoes from the live channel into the list
// - Flag entries whose send failed; they are never retried
//
// ============================================================================

struct OpenView {
    conversation_id: ConversationId,
    customer_id: CustomerId,
    messages: Vec<VisibleMessage>,
}

pub struct ChatViewActor {
    backend: Arc<dyn ChatBackend>,
    live: LiveChannel,
    staff_id: Uuid,
    open: Option<OpenView>,
    metrics: Arc<Metrics>,
}

impl ChatViewActor {
    pub fn new(backend: Arc<dyn ChatBackend>, live: LiveChannel, staff_id: Uuid, metrics: Arc<Metrics>) -> Self {
        Self { backend, live, staff_id, open: None, metrics }
    }

    fn close_view(&mut self) {
        if let Some(view) = self.open.take() {
            self.metrics.open_chat_views.dec();
            tracing::debug!(conversation_id = %view.conversation_id, "Chat view closed");
        }
    }
}

impl Actor for ChatViewActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(staff_id = %self.staff_id, "ChatViewActor started");
        ctx.add_stream(self.live.stream());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.close_view();
        tracing::info!(staff_id = %self.staff_id, "ChatViewActor stopped");
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

/// Live events queue behind the history fetch until the view is installed;
/// anything already in the snapshot is then deduplicated by message id.
impl Handler<OpenConversation> for ChatViewActor {
    type Result = AtomicResponse<Self, Result<usize, ChatError>>;

    fn handle(&mut self, msg: OpenConversation, _: &mut Self::Context) -> Self::Result {
        let backend = self.backend.clone();

        AtomicResponse::new(Box::pin(
            async move { backend.fetch_conversation(msg.conversation_id).await }
                .into_actor(self)
                .map(|result, act, _ctx| {
                    let conversation = result?;
                    act.close_view();

                    let messages: Vec<_> = conversation
                        .messages
                        .into_iter()
                        .map(VisibleMessage::delivered)
                        .collect();
                    let count = messages.len();

                    act.open = Some(OpenView {
                        conversation_id: conversation.conversation_id,
                        customer_id: conversation.customer_id,
                        messages,
                    });
                    act.metrics.open_chat_views.inc();

                    tracing::debug!(
                        conversation_id = %conversation.conversation_id,
                        messages = count,
                        "Chat view opened"
                    );
                    Ok(count)
                }),
        ))
    }
}

impl Handler<SendMessage> for ChatViewActor {
    type Result = Result<TempId, ChatError>;

    fn handle(&mut self, msg: SendMessage, ctx: &mut Self::Context) -> Self::Result {
        let view = self.open.as_mut().ok_or(ChatError::NoOpenConversation)?;

        let draft = MessageDraft {
            temp_id: TempId::new(),
            text_content: msg.text_content,
            image_content: msg.image_content,
        }
        .validate()?;
        let temp_id = draft.temp_id;

        let optimistic = ChatMessage::optimistic(
            view.conversation_id,
            Sender::Staff { staff_id: self.staff_id },
            &draft,
        );
        view.messages.push(VisibleMessage::pending(optimistic));

        let backend = self.backend.clone();
        let customer_id = view.customer_id;
        let staff_id = self.staff_id;

        ctx.spawn(
            async move { backend.send_message(customer_id, staff_id, draft).await }
                .into_actor(self)
                .map(move |result, act, _ctx| {
                    act.metrics.record_chat_send(result.is_ok());
                    let Some(view) = act.open.as_mut() else {
                        return;
                    };

                    match result {
                        Ok(sent) => {
                            // The echo may still be in flight; it replaces this entry when it lands
                            if let Some(entry) = view
                                .messages
                                .iter_mut()
                                .find(|m| m.message.temp_id == Some(temp_id) && !m.message.is_persisted())
                            {
                                entry.message.message_id = Some(sent.message_id);
                                entry.delivery = DeliveryState::Delivered;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(temp_id = %temp_id, error = %e, "Chat message failed to send");
                            mark_failed(&mut view.messages, temp_id, e.to_string());
                        }
                    }
                }),
        );

        Ok(temp_id)
    }
}

impl Handler<CloseConversation> for ChatViewActor {
    type Result = ();

    fn handle(&mut self, _: CloseConversation, _: &mut Self::Context) -> Self::Result {
        self.close_view();
    }
}

impl Handler<GetVisibleMessages> for ChatViewActor {
    type Result = MessageResult<GetVisibleMessages>;

    fn handle(&mut self, _: GetVisibleMessages, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.open.as_ref().map(|view| view.messages.clone()).unwrap_or_default())
    }
}

impl StreamHandler<LiveEvent> for ChatViewActor {
    fn handle(&mut self, item: LiveEvent, _ctx: &mut Self::Context) {
        let LiveEvent::MessageNew(event) = item else {
            return;
        };
        let Some(view) = self.open.as_mut() else {
            return;
        };

        let outcome = reconcile(&mut view.messages, view.conversation_id, &event);
        self.metrics.record_reconciliation(outcome.label());

        if outcome != ReconcileOutcome::Ignored {
            tracing::debug!(
                conversation_id = %view.conversation_id,
                outcome = outcome.label(),
                "Live message merged"
            );
        }
    }

    fn finished(&mut self, _ctx: &mut Self::Context) {
        tracing::warn!(staff_id = %self.staff_id, "Live channel closed, chat view no longer updates");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{ChatService, Conversation, SentMessage};
    use async_trait::async_trait;
    use std::time::Duration;

    async fn wait_until(
        addr: &Addr<ChatViewActor>,
        done: impl Fn(&[VisibleMessage]) -> bool,
    ) -> Vec<VisibleMessage> {
        for _ in 0..100 {
            let messages = addr.send(GetVisibleMessages).await.unwrap();
            if done(&messages) {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("chat view never reached the expected state");
    }

    fn text(content: &str) -> SendMessage {
        SendMessage { text_content: Some(content.to_string()), image_content: None }
    }

    async fn setup() -> (Arc<ChatService>, Addr<ChatViewActor>, CustomerId, ConversationId) {
        let live = LiveChannel::new(64);
        let service = Arc::new(ChatService::new(live.clone()));
        let customer_id = CustomerId(Uuid::new_v4());

        let first = service
            .post_from_customer(customer_id, MessageDraft::text("Do you ship to Da Nang?"))
            .await
            .unwrap();

        let view = ChatViewActor::new(service.clone(), live, Uuid::new_v4(), Arc::new(Metrics::new().unwrap()))
            .start();
        let count = view
            .send(OpenConversation { conversation_id: first.conversation_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);

        (service, view, customer_id, first.conversation_id)
    }

    #[actix::test]
    async fn test_sent_message_is_reconciled_once() {
        let (_service, view, _, _) = setup().await;

        view.send(text("Yes, 2-3 days")).await.unwrap().unwrap();

        let messages = wait_until(&view, |m| {
            m.len() == 2 && m[1].message.is_persisted() && m[1].message.temp_id.is_none()
        })
        .await;

        assert_eq!(messages[1].delivery, DeliveryState::Delivered);
        assert_eq!(messages[1].message.text_content.as_deref(), Some("Yes, 2-3 days"));
    }

    #[actix::test]
    async fn test_other_conversations_are_ignored() {
        let (service, view, customer_id, _) = setup().await;

        service
            .post_from_customer(CustomerId(Uuid::new_v4()), MessageDraft::text("Unrelated"))
            .await
            .unwrap();
        service
            .post_from_customer(customer_id, MessageDraft::text("Thanks!"))
            .await
            .unwrap();

        let messages = wait_until(&view, |m| m.len() >= 2).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].message.text_content.as_deref(), Some("Thanks!"));
    }

    #[actix::test]
    async fn test_send_without_open_conversation() {
        let live = LiveChannel::new(8);
        let service = Arc::new(ChatService::new(live.clone()));
        let view = ChatViewActor::new(service, live, Uuid::new_v4(), Arc::new(Metrics::new().unwrap())).start();

        let result = view.send(text("hello")).await.unwrap();
        assert_eq!(result, Err(ChatError::NoOpenConversation));
    }

    #[actix::test]
    async fn test_empty_message_is_not_shown() {
        let (_service, view, _, _) = setup().await;

        let result = view.send(text("   ")).await.unwrap();
        assert_eq!(result, Err(ChatError::EmptyMessage));
        assert_eq!(view.send(GetVisibleMessages).await.unwrap().len(), 1);
    }

    struct OfflineBackend {
        conversation: Conversation,
    }

    #[async_trait]
    impl ChatBackend for OfflineBackend {
        async fn fetch_conversation(&self, _: ConversationId) -> Result<Conversation, ChatError> {
            Ok(self.conversation.clone())
        }

        async fn send_message(&self, _: CustomerId, _: Uuid, _: MessageDraft) -> Result<SentMessage, ChatError> {
            Err(ChatError::Delivery("network unreachable".to_string()))
        }
    }

    #[actix::test]
    async fn test_failed_send_is_flagged() {
        let conversation = Conversation {
            conversation_id: ConversationId(Uuid::new_v4()),
            customer_id: CustomerId(Uuid::new_v4()),
            messages: Vec::new(),
        };
        let conversation_id = conversation.conversation_id;
        let backend = Arc::new(OfflineBackend { conversation });

        let view = ChatViewActor::new(backend, LiveChannel::new(8), Uuid::new_v4(), Arc::new(Metrics::new().unwrap()))
            .start();
        view.send(OpenConversation { conversation_id }).await.unwrap().unwrap();

        let temp_id = view.send(text("Are you there?")).await.unwrap().unwrap();

        let messages = wait_until(&view, |m| {
            matches!(m.first().map(|e| &e.delivery), Some(DeliveryState::Failed { .. }))
        })
        .await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.temp_id, Some(temp_id));
        assert!(!messages[0].message.is_persisted());
    }

    /// Posts a customer message after the history snapshot is taken but
    /// before the fetch returns
    struct RacingBackend {
        service: Arc<ChatService>,
        customer_id: CustomerId,
    }

    #[async_trait]
    impl ChatBackend for RacingBackend {
        async fn fetch_conversation(&self, conversation_id: ConversationId) -> Result<Conversation, ChatError> {
            let snapshot = self.service.fetch_conversation(conversation_id).await?;
            self.service
                .post_from_customer(self.customer_id, MessageDraft::text("Size 42 still available?"))
                .await?;
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(snapshot)
        }

        async fn send_message(&self, customer_id: CustomerId, staff_id: Uuid, draft: MessageDraft) -> Result<SentMessage, ChatError> {
            self.service.send_message(customer_id, staff_id, draft).await
        }
    }

    #[actix::test]
    async fn test_message_arriving_during_open_is_kept() {
        let live = LiveChannel::new(64);
        let service = Arc::new(ChatService::new(live.clone()));
        let customer_id = CustomerId(Uuid::new_v4());
        let first = service
            .post_from_customer(customer_id, MessageDraft::text("Hello"))
            .await
            .unwrap();

        let backend = Arc::new(RacingBackend { service, customer_id });
        let view = ChatViewActor::new(backend, live, Uuid::new_v4(), Arc::new(Metrics::new().unwrap())).start();

        let count = view
            .send(OpenConversation { conversation_id: first.conversation_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);

        let messages = wait_until(&view, |m| m.len() >= 2).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].message.text_content.as_deref(), Some("Size 42 still available?"));
    }

    #[actix::test]
    async fn test_close_clears_view() {
        let (_service, view, _, _) = setup().await;
        view.send(CloseConversation).await.unwrap();
        assert!(view.send(GetVisibleMessages).await.unwrap().is_empty());
    }
}
