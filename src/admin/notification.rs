/// What the admin should be told after the last action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Notification {
    #[default]
    None,
    Error(String),
    Success(String),
}

/// Current notification plus the acknowledgment modal shown after a
/// question was added.
#[derive(Debug, Default)]
pub struct NotificationSurface {
    current: Notification,
    modal: bool,
}

impl NotificationSurface {
    pub fn current(&self) -> &Notification {
        &self.current
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.current = Notification::Error(message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.current = Notification::Success(message.into());
    }

    pub fn clear(&mut self) {
        self.current = Notification::None;
    }

    pub fn modal_visible(&self) -> bool {
        self.modal
    }

    /// Latches the modal; only [`Self::dismiss_modal`] hides it again.
    pub fn raise_modal(&mut self) {
        self.modal = true;
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = false;
    }
}
