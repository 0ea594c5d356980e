//! Keyboard shapes attached to outbound messages.

/// Either kind of keyboard a message can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Reply(ReplyKeyboard),
    Inline(InlineKeyboard),
}

/// Persistent reply keyboard: rows of plain text buttons that send their
/// label back as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn new<R, B>(rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<B>>,
        B: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

impl From<ReplyKeyboard> for Keyboard {
    fn from(value: ReplyKeyboard) -> Self {
        Keyboard::Reply(value)
    }
}

/// Inline keyboard: rows of buttons attached to one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }
}

impl From<InlineKeyboard> for Keyboard {
    fn from(value: InlineKeyboard) -> Self {
        Keyboard::Inline(value)
    }
}

/// One inline button: a label plus either a callback payload or a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}
