//! Conversation store: the ordered, in-memory record of one session.
//!
//! The store is append-only except for the loading placeholder, which is
//! spliced out by [`ConversationStore::replace_last`]. Message identity is
//! the position in the sequence.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use crate::message::{Message, ResultDetails};

/// Invariant violations detected by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A second loading placeholder was appended while one is in place.
    #[error("a loading placeholder is already pending")]
    PlaceholderPending,
    /// `replace_last` was called when the last message is not a placeholder.
    #[error("last message is not a loading placeholder")]
    NoPlaceholder,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PlaceholderPending`] when appending a
    /// placeholder while another is still in the sequence.
    pub fn append(&mut self, message: Message) -> Result<usize, StoreError> {
        if message.is_loading() && self.has_placeholder() {
            return Err(StoreError::PlaceholderPending);
        }
        self.messages.push(message);
        Ok(self.messages.len() - 1)
    }

    /// Swap the trailing placeholder for `message` and return its position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoPlaceholder`] if the last message is not a
    /// loading placeholder; the store is left unchanged.
    pub fn replace_last(&mut self, message: Message) -> Result<usize, StoreError> {
        match self.messages.last_mut() {
            Some(last) if last.is_loading() => {
                *last = message;
                Ok(self.messages.len() - 1)
            }
            _ => Err(StoreError::NoPlaceholder),
        }
    }

    /// Apply `updater` to the details of every bot message matching
    /// `predicate`, returning how many were updated.
    ///
    /// The predicate sees each candidate's position and details, so callers
    /// can target a single message by index or a whole class by content.
    pub fn update_where<P, U>(&mut self, mut predicate: P, mut updater: U) -> usize
    where
        P: FnMut(usize, &ResultDetails) -> bool,
        U: FnMut(&mut ResultDetails),
    {
        let mut updated = 0;
        for (index, message) in self.messages.iter_mut().enumerate() {
            let Some(details) = message.details_mut() else {
                continue;
            };
            if predicate(index, details) {
                updater(details);
                updated += 1;
            }
        }
        updated
    }

    /// Drop a trailing placeholder without replacing it. Used on teardown.
    pub(crate) fn discard_placeholder(&mut self) -> bool {
        if self.messages.last().is_some_and(Message::is_loading) {
            self.messages.pop();
            return true;
        }
        false
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn details(&self, index: usize) -> Option<&ResultDetails> {
        self.messages.get(index).and_then(Message::details)
    }

    pub(crate) fn details_mut(&mut self, index: usize) -> Option<&mut ResultDetails> {
        self.messages.get_mut(index).and_then(Message::details_mut)
    }

    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.messages.iter().any(Message::is_loading)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a ConversationStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
