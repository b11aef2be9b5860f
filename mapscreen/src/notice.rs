//! User-facing, non-blocking feedback.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use web_time::Instant;

use crate::error::MapScreenError;

const DEFAULT_CAPACITY: usize = 8;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    /// Something the user might want to know, e.g. that the location is not known yet.
    Info,
    /// An operation did not go as requested but the screen is fully usable.
    Warning,
    /// An operation failed.
    Error,
}

impl Display for NoticeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// A message to show to the user in a transient banner.
#[derive(Debug, Clone)]
pub struct Notice {
    level: NoticeLevel,
    message: String,
    created: Instant,
}

impl Notice {
    /// Creates a new notice.
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created: Instant::now(),
        }
    }

    /// Severity.
    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the notice was created.
    pub fn created(&self) -> Instant {
        self.created
    }
}

impl From<&MapScreenError> for Notice {
    fn from(error: &MapScreenError) -> Self {
        let level = match error {
            MapScreenError::LocationUnavailable => NoticeLevel::Info,
            MapScreenError::OutsideMap
            | MapScreenError::IconUnavailable(_)
            | MapScreenError::UnknownStyle(_)
            | MapScreenError::Location(_) => NoticeLevel::Warning,
            MapScreenError::StyleLoad { .. }
            | MapScreenError::Config(_)
            | MapScreenError::FsIo(_)
            | MapScreenError::Json(_) => NoticeLevel::Error,
        };

        Self::new(level, error.to_string())
    }
}

/// Bounded queue of notices waiting to be shown. When full, the oldest notice is dropped.
#[derive(Debug)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
    capacity: usize,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl NoticeQueue {
    /// Creates an empty queue holding at most `capacity` notices (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            notices: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a notice.
    pub fn push(&mut self, notice: Notice) {
        if self.notices.len() == self.capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    /// Number of queued notices.
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Iterates over queued notices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Removes and returns all queued notices, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocationError;

    #[test]
    fn drops_oldest_when_full() {
        let mut queue = NoticeQueue::with_capacity(2);
        queue.push(Notice::new(NoticeLevel::Info, "first"));
        queue.push(Notice::new(NoticeLevel::Info, "second"));
        queue.push(Notice::new(NoticeLevel::Info, "third"));

        let messages: Vec<_> = queue.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn level_follows_error_kind() {
        assert_eq!(
            Notice::from(&MapScreenError::LocationUnavailable).level(),
            NoticeLevel::Info
        );
        assert_eq!(
            Notice::from(&MapScreenError::Location(LocationError::PermissionDenied)).level(),
            NoticeLevel::Warning
        );
        let notice = Notice::from(&MapScreenError::StyleLoad {
            uri: "x://y".into(),
            reason: "boom".into(),
        });
        assert_eq!(notice.level(), NoticeLevel::Error);
        assert_eq!(notice.message(), "failed to load style x://y: boom");
    }
}
