//! A recording `MessagingPort` mock shared by the flow tests.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    Result,
};

#[derive(Clone, Debug)]
pub enum Outgoing {
    Html {
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboard>,
        message_id: MessageId,
    },
    Photo {
        chat_id: ChatId,
        file_ref: String,
        caption: String,
    },
    Deleted(MessageRef),
    CallbackAnswer {
        callback_id: String,
        text: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingMessenger {
    log: Mutex<Vec<Outgoing>>,
    failing: Mutex<HashSet<ChatId>>,
    attempted: Mutex<Vec<ChatId>>,
    next_id: AtomicI32,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery to this chat will fail from now on.
    pub fn fail_for(&self, chat_id: ChatId) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    fn check(&self, chat_id: ChatId) -> Result<()> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(Error::External(format!("chat {} blocked the bot", chat_id.0)));
        }
        Ok(())
    }

    fn next_ref(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        }
    }

    pub fn log(&self) -> Vec<Outgoing> {
        self.log.lock().unwrap().clone()
    }

    /// Texts successfully sent to one chat, in order (photo captions included).
    pub fn text_for(&self, chat_id: ChatId) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Html {
                    chat_id: c, text, ..
                } if c == chat_id => Some(text),
                Outgoing::Photo {
                    chat_id: c,
                    caption,
                    ..
                } if c == chat_id => Some(caption),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self, chat_id: ChatId) -> Option<String> {
        self.text_for(chat_id).pop()
    }

    /// Keyboard of the last keyboarded message sent to the chat.
    pub fn last_keyboard(&self, chat_id: ChatId) -> Option<InlineKeyboard> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Html {
                    chat_id: c,
                    keyboard: Some(k),
                    ..
                } if c == chat_id => Some(k),
                _ => None,
            })
            .last()
    }

    /// Chats a delivery was *attempted* to, failures included, in order.
    pub fn attempted_chats(&self) -> Vec<ChatId> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn photos_sent(&self) -> usize {
        self.log()
            .iter()
            .filter(|o| matches!(o, Outgoing::Photo { .. }))
            .count()
    }

    pub fn deleted_count(&self) -> usize {
        self.log()
            .iter()
            .filter(|o| matches!(o, Outgoing::Deleted(_)))
            .count()
    }

    pub fn callback_answers(&self) -> Vec<Option<String>> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::CallbackAnswer { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

// Attempt order is tracked separately from the success log.
impl RecordingMessenger {
    fn record_attempt(&self, chat_id: ChatId) {
        self.attempted.lock().unwrap().push(chat_id);
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.record_attempt(chat_id);
        self.check(chat_id)?;
        let msg = self.next_ref(chat_id);
        self.log.lock().unwrap().push(Outgoing::Html {
            chat_id,
            text: html.to_string(),
            keyboard: None,
            message_id: msg.message_id,
        });
        Ok(msg)
    }

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.record_attempt(chat_id);
        self.check(chat_id)?;
        let msg = self.next_ref(chat_id);
        self.log.lock().unwrap().push(Outgoing::Html {
            chat_id,
            text: html.to_string(),
            keyboard: Some(keyboard),
            message_id: msg.message_id,
        });
        Ok(msg)
    }

    async fn send_photo_html(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption_html: &str,
    ) -> Result<MessageRef> {
        self.record_attempt(chat_id);
        self.check(chat_id)?;
        let msg = self.next_ref(chat_id);
        self.log.lock().unwrap().push(Outgoing::Photo {
            chat_id,
            file_ref: file_ref.to_string(),
            caption: caption_html.to_string(),
        });
        Ok(msg)
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.log.lock().unwrap().push(Outgoing::Deleted(msg));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.log.lock().unwrap().push(Outgoing::CallbackAnswer {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
