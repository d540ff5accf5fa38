use super::schema::{ConversationRecord, Message, ModelType, Sender};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Title given to a conversation before its first user message.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Characters of the first user message used as the title.
pub const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Failed to access conversation file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversation file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every mutation the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    Create {
        language: String,
        model_type: ModelType,
    },
    AppendMessage {
        conversation_id: String,
        message: Message,
    },
    DeleteMessage {
        conversation_id: String,
        message_id: String,
    },
    Rename {
        conversation_id: String,
        title: String,
    },
    SetLanguage {
        conversation_id: String,
        language: String,
    },
    Delete {
        conversation_id: String,
    },
}

/// Conversation history owned explicitly by the client, with a JSON
/// persistence boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStore {
    conversations: Vec<ConversationRecord>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. `Create` returns the new conversation's id; every
    /// other action returns the id it targeted.
    pub fn apply(&mut self, action: Action) -> Result<String, StoreError> {
        match action {
            Action::Create {
                language,
                model_type,
            } => {
                let record = ConversationRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    title: DEFAULT_TITLE.to_string(),
                    messages: Vec::new(),
                    created_at: Utc::now(),
                    language,
                    model_type,
                };
                let id = record.id.clone();
                self.conversations.push(record);
                Ok(id)
            }
            Action::AppendMessage {
                conversation_id,
                message,
            } => {
                let record = self.get_mut(&conversation_id)?;
                let first_user = message.sender == Sender::User
                    && !record.messages.iter().any(|m| m.sender == Sender::User);
                if first_user && record.title == DEFAULT_TITLE {
                    record.title = title_from(&message.content);
                }
                record.messages.push(message);
                Ok(conversation_id)
            }
            Action::DeleteMessage {
                conversation_id,
                message_id,
            } => {
                let record = self.get_mut(&conversation_id)?;
                let before = record.messages.len();
                record.messages.retain(|m| m.id != message_id);
                if record.messages.len() == before {
                    return Err(StoreError::MessageNotFound(message_id));
                }
                Ok(conversation_id)
            }
            Action::Rename {
                conversation_id,
                title,
            } => {
                self.get_mut(&conversation_id)?.title = title;
                Ok(conversation_id)
            }
            Action::SetLanguage {
                conversation_id,
                language,
            } => {
                self.get_mut(&conversation_id)?.language = language;
                Ok(conversation_id)
            }
            Action::Delete { conversation_id } => {
                let before = self.conversations.len();
                self.conversations.retain(|c| c.id != conversation_id);
                if self.conversations.len() == before {
                    return Err(StoreError::ConversationNotFound(conversation_id));
                }
                Ok(conversation_id)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ConversationRecord> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ConversationRecord, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.to_string()))
    }

    /// Newest first.
    pub fn list(&self) -> Vec<&ConversationRecord> {
        let mut all: Vec<_> = self.conversations.iter().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.conversations)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        Ok(Self {
            conversations: serde_json::from_str(raw)?,
        })
    }

    /// Load from `path`; a missing file is an empty store.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        match fs::read_to_string(path).await {
            Ok(raw) => Self::from_json(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn title_from(content: &str) -> String {
    let trimmed = content.trim();
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::schema::FileInfo;

    fn create(store: &mut ConversationStore) -> String {
        store
            .apply(Action::Create {
                language: "English".into(),
                model_type: ModelType::Chat,
            })
            .unwrap()
    }

    #[test]
    fn first_user_message_sets_title() {
        let mut store = ConversationStore::new();
        let id = create(&mut store);
        assert_eq!(store.get(&id).unwrap().title, DEFAULT_TITLE);

        store
            .apply(Action::AppendMessage {
                conversation_id: id.clone(),
                message: Message::new(Sender::Bot, "Welcome!"),
            })
            .unwrap();
        assert_eq!(store.get(&id).unwrap().title, DEFAULT_TITLE);

        store
            .apply(Action::AppendMessage {
                conversation_id: id.clone(),
                message: Message::new(Sender::User, "How do I say thank you in Japanese, politely?"),
            })
            .unwrap();
        store
            .apply(Action::AppendMessage {
                conversation_id: id.clone(),
                message: Message::new(Sender::User, "second"),
            })
            .unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.title, "How do I say thank you in Japa...");
        assert_eq!(record.messages.len(), 3);
    }

    #[test]
    fn delete_message_and_conversation() {
        let mut store = ConversationStore::new();
        let id = create(&mut store);
        let msg = Message::new(Sender::User, "hello");
        let msg_id = msg.id.clone();
        store
            .apply(Action::AppendMessage {
                conversation_id: id.clone(),
                message: msg,
            })
            .unwrap();

        store
            .apply(Action::DeleteMessage {
                conversation_id: id.clone(),
                message_id: msg_id.clone(),
            })
            .unwrap();
        assert!(store.get(&id).unwrap().messages.is_empty());

        let err = store
            .apply(Action::DeleteMessage {
                conversation_id: id.clone(),
                message_id: msg_id,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MessageNotFound(_)));

        store.apply(Action::Delete { conversation_id: id.clone() }).unwrap();
        assert!(store.is_empty());
        let err = store.apply(Action::Delete { conversation_id: id }).unwrap_err();
        assert!(matches!(err, StoreError::ConversationNotFound(_)));
    }

    #[test]
    fn rename_and_set_language() {
        let mut store = ConversationStore::new();
        let id = create(&mut store);
        store
            .apply(Action::Rename {
                conversation_id: id.clone(),
                title: "Trip planning".into(),
            })
            .unwrap();
        store
            .apply(Action::SetLanguage {
                conversation_id: id.clone(),
                language: "Korean".into(),
            })
            .unwrap();
        let record = store.get(&id).unwrap();
        assert_eq!(record.title, "Trip planning");
        assert_eq!(record.language, "Korean");
    }

    #[test]
    fn unknown_conversation_is_an_error() {
        let mut store = ConversationStore::new();
        let err = store
            .apply(Action::AppendMessage {
                conversation_id: "missing".into(),
                message: Message::new(Sender::User, "hi"),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::ConversationNotFound(_)));
    }

    #[test]
    fn list_is_newest_first() {
        let mut store = ConversationStore::new();
        let first = create(&mut store);
        let second = create(&mut store);
        store.conversations[0].created_at = Utc::now() - chrono::Duration::hours(1);
        let ids: Vec<_> = store.list().into_iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn json_uses_client_field_names() {
        let mut store = ConversationStore::new();
        let id = create(&mut store);
        store
            .apply(Action::AppendMessage {
                conversation_id: id,
                message: Message::new(Sender::User, "doc").with_file(FileInfo {
                    name: "a.pdf".into(),
                    size: 10,
                    file_type: "application/pdf".into(),
                }),
            })
            .unwrap();
        let json = store.to_json().unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"modelType\": \"chat\""));
        assert!(json.contains("\"fileInfo\""));
        assert!(json.contains("\"sender\": \"user\""));
    }

    #[tokio::test]
    async fn save_then_load_restores_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("conversations.json");

        let mut store = ConversationStore::new();
        let id = create(&mut store);
        store
            .apply(Action::AppendMessage {
                conversation_id: id,
                message: Message::new(Sender::User, "persist me"),
            })
            .unwrap();
        store.save(&path).await.unwrap();

        let loaded = ConversationStore::load(&path).await.unwrap();
        assert_eq!(loaded, store);
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        assert!(ConversationStore::load(&path).await.unwrap().is_empty());

        std::fs::write(&path, "{not json").unwrap();
        let err = ConversationStore::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
