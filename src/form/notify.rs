use std::cell::RefCell;

/// A user-facing message, the toast of a browser form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

/// Single channel every form-level failure and success goes through.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Error(message) => tracing::error!(%message, "form notice"),
            Notice::Success(message) => tracing::info!(%message, "form notice"),
        }
    }
}

/// Keeps notices in memory until taken.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn take(&self) -> Vec<Notice> {
        self.notices.take()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Lets a caller keep its notifier while a form borrows it.
impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}
