//! Lazy tag search over the poll table.

use crate::error::PollError;
use lumeos_store::{Poll, PollStore};
use lumeos_types::PollId;

/// Polls carrying `tag`, in id order.
///
/// Pulls one record at a time from the store, so polls inserted or removed
/// while the search is in flight may or may not be observed. Finite: stops
/// at the end of the table or after the first store error.
#[derive(Clone)]
pub struct PollSearch<'a> {
    polls: &'a dyn PollStore,
    tag: String,
    cursor: Option<PollId>,
    done: bool,
}

impl<'a> PollSearch<'a> {
    pub fn new(polls: &'a dyn PollStore, tag: impl Into<String>) -> Self {
        Self {
            polls,
            tag: tag.into(),
            cursor: None,
            done: false,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Start over from the first poll.
    pub fn restart(&mut self) {
        self.cursor = None;
        self.done = false;
    }
}

impl Iterator for PollSearch<'_> {
    type Item = Result<Poll, PollError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.polls.next_poll_after(self.cursor) {
                Ok(Some(poll)) => {
                    self.cursor = Some(poll.id);
                    if poll.has_tag(&self.tag) {
                        return Some(Ok(poll));
                    }
                }
                Ok(None) => self.done = true,
                Err(e) => {
                    self.done = true;
                    let key = self.cursor.map_or_else(|| "start".to_string(), |id| id.to_string());
                    return Some(Err(PollError::store("searchpoll", key)(e)));
                }
            }
        }
        None
    }
}
