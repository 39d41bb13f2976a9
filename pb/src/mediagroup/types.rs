//! Media group items and batches

use serde::Serialize;

/// Batches are keyed by chat id and media group id
pub type GroupKey = (i64, String);

/// One photo message that belongs to a media group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaItem {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
    pub group_id: String,
    pub caption: String,
    /// Transport reference for the attachment
    pub file_ref: String,
}

impl MediaItem {
    pub fn key(&self) -> GroupKey {
        (self.chat_id, self.group_id.clone())
    }

    /// Items without a group id or attachment are not part of any batch
    pub fn is_groupable(&self) -> bool {
        !self.group_id.is_empty() && !self.file_ref.is_empty()
    }
}

/// A flushed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaGroup {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
    pub group_id: String,
    /// Last non-empty caption seen in the batch
    pub caption: String,
    /// Attachment references in arrival order
    pub file_refs: Vec<String>,
}

impl MediaGroup {
    pub(super) fn start(item: MediaItem) -> Self {
        Self {
            chat_id: item.chat_id,
            user_id: item.user_id,
            username: item.username,
            group_id: item.group_id,
            caption: item.caption,
            file_refs: vec![item.file_ref],
        }
    }

    pub(super) fn push(&mut self, item: MediaItem) {
        self.file_refs.push(item.file_ref);
        if !item.caption.is_empty() {
            self.caption = item.caption;
        }
    }

    pub fn key(&self) -> GroupKey {
        (self.chat_id, self.group_id.clone())
    }
}
