//! Transient user-facing notifications.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    /// Ongoing work; later notices with the same id replace it
    Loading,
    Success,
    Error,
}

/// A single notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Groups notices that update one another in place
    pub id: Option<String>,
}

/// Shows notifications to the user.
pub trait Notifier {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice {
            kind: NoticeKind::Info,
            message: message.to_string(),
            id: None,
        });
    }

    fn loading(&self, id: &str, message: &str) {
        self.notify(Notice {
            kind: NoticeKind::Loading,
            message: message.to_string(),
            id: Some(id.to_string()),
        });
    }

    fn success(&self, id: &str, message: &str) {
        self.notify(Notice {
            kind: NoticeKind::Success,
            message: message.to_string(),
            id: Some(id.to_string()),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notice {
            kind: NoticeKind::Error,
            message: message.to_string(),
            id: None,
        });
    }
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Routes notifications to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::error!("{}", notice.message),
            NoticeKind::Loading => log::debug!("{}", notice.message),
            NoticeKind::Info | NoticeKind::Success => log::info!("{}", notice.message),
        }
    }
}

/// Keeps every notification, for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|n| n.message.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
