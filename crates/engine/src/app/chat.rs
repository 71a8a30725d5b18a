use tracing::info;

use super::input::KeyInput;

/// Entries shown by the chat box.
pub const CHAT_VISIBLE_MESSAGES: usize = 10;
pub const CARET_BLINK_SECONDS: f32 = 0.5;
pub const IDLE_PROMPT: &str = "PRESS ENTER TO START TYPING";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Idle,
    Composing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Player,
    Npc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: String,
    pub text: String,
    pub kind: MessageKind,
}

/// Result of feeding one key to the chat box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Not a chat key; other controls may use it.
    PassThrough,
    Consumed,
    /// A message was committed to the log with this trimmed text.
    Sent(String),
}

#[derive(Debug, Clone)]
pub struct ChatState {
    mode: ChatMode,
    pending: String,
    log: Vec<ChatMessage>,
    caret_visible: bool,
    caret_timer: f32,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            mode: ChatMode::Idle,
            pending: String::new(),
            log: Vec::new(),
            caret_visible: true,
            caret_timer: 0.0,
        }
    }
}

impl ChatState {
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    pub fn push_message(
        &mut self,
        speaker: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) {
        self.log.push(ChatMessage {
            speaker: speaker.into(),
            text: text.into(),
            kind,
        });
    }

    /// The newest [`CHAT_VISIBLE_MESSAGES`] entries, oldest first.
    pub fn recent_messages(&self) -> &[ChatMessage] {
        let start = self.log.len().saturating_sub(CHAT_VISIBLE_MESSAGES);
        &self.log[start..]
    }

    /// Composing swallows every key so none of them reach the camera.
    pub fn handle_key(&mut self, key: KeyInput, speaker: &str) -> ChatOutcome {
        match self.mode {
            ChatMode::Idle => match key {
                KeyInput::Enter => {
                    self.mode = ChatMode::Composing;
                    self.pending.clear();
                    ChatOutcome::Consumed
                }
                _ => ChatOutcome::PassThrough,
            },
            ChatMode::Composing => match key {
                KeyInput::Enter => self.commit(speaker),
                KeyInput::Escape => {
                    self.mode = ChatMode::Idle;
                    self.pending.clear();
                    ChatOutcome::Consumed
                }
                KeyInput::Backspace => {
                    self.pending.pop();
                    ChatOutcome::Consumed
                }
                KeyInput::Char(ch) => {
                    self.pending.push(ch);
                    ChatOutcome::Consumed
                }
                _ => ChatOutcome::Consumed,
            },
        }
    }

    fn commit(&mut self, speaker: &str) -> ChatOutcome {
        self.mode = ChatMode::Idle;
        let text = self.pending.trim().to_string();
        self.pending.clear();
        if text.is_empty() {
            return ChatOutcome::Consumed;
        }

        self.push_message(speaker, text.clone(), MessageKind::Player);
        info!(
            speaker,
            chars = text.chars().count(),
            log_len = self.log.len(),
            "chat_message_sent"
        );
        ChatOutcome::Sent(text)
    }

    /// Advances the caret blink; has no effect on input handling.
    pub fn tick(&mut self, dt_seconds: f32) {
        self.caret_timer += dt_seconds;
        while self.caret_timer >= CARET_BLINK_SECONDS {
            self.caret_timer -= CARET_BLINK_SECONDS;
            self.caret_visible = !self.caret_visible;
        }
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn composer_line(&self) -> String {
        match self.mode {
            ChatMode::Idle => IDLE_PROMPT.to_string(),
            ChatMode::Composing => {
                let caret = if self.caret_visible { "|" } else { "" };
                format!("{}{caret}", self.pending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(chat: &mut ChatState, text: &str) {
        for ch in text.chars() {
            assert_eq!(
                chat.handle_key(KeyInput::Char(ch), "UNNAMED"),
                ChatOutcome::Consumed
            );
        }
    }

    #[test]
    fn enter_from_idle_starts_composing_with_empty_input() {
        let mut chat = ChatState::default();
        assert_eq!(
            chat.handle_key(KeyInput::Enter, "UNNAMED"),
            ChatOutcome::Consumed
        );
        assert_eq!(chat.mode(), ChatMode::Composing);
        assert_eq!(chat.pending(), "");
    }

    #[test]
    fn typed_message_is_logged_on_enter() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        type_text(&mut chat, "abc");

        let outcome = chat.handle_key(KeyInput::Enter, "UNNAMED");

        assert_eq!(outcome, ChatOutcome::Sent("abc".to_string()));
        assert_eq!(chat.mode(), ChatMode::Idle);
        assert_eq!(
            chat.log(),
            &[ChatMessage {
                speaker: "UNNAMED".to_string(),
                text: "abc".to_string(),
                kind: MessageKind::Player,
            }]
        );
    }

    #[test]
    fn escape_discards_pending_input_without_logging() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        type_text(&mut chat, "never mind");

        assert_eq!(
            chat.handle_key(KeyInput::Escape, "UNNAMED"),
            ChatOutcome::Consumed
        );
        assert_eq!(chat.mode(), ChatMode::Idle);
        assert_eq!(chat.pending(), "");
        assert!(chat.log().is_empty());
    }

    #[test]
    fn whitespace_only_message_returns_to_idle_without_logging() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        type_text(&mut chat, "   ");
        assert_eq!(
            chat.handle_key(KeyInput::Enter, "UNNAMED"),
            ChatOutcome::Consumed
        );
        assert_eq!(chat.mode(), ChatMode::Idle);
        assert!(chat.log().is_empty());
    }

    #[test]
    fn sent_text_is_trimmed() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        type_text(&mut chat, "  hi there ");
        assert_eq!(
            chat.handle_key(KeyInput::Enter, "UNNAMED"),
            ChatOutcome::Sent("hi there".to_string())
        );
    }

    #[test]
    fn backspace_removes_the_last_character_and_is_safe_when_empty() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        chat.handle_key(KeyInput::Backspace, "UNNAMED");
        type_text(&mut chat, "hey");
        chat.handle_key(KeyInput::Backspace, "UNNAMED");
        assert_eq!(chat.pending(), "he");
    }

    #[test]
    fn composing_swallows_camera_keys() {
        let mut chat = ChatState::default();
        chat.handle_key(KeyInput::Enter, "UNNAMED");
        for key in [
            KeyInput::ArrowLeft,
            KeyInput::ArrowRight,
            KeyInput::ArrowUp,
            KeyInput::ArrowDown,
            KeyInput::Other,
        ] {
            assert_eq!(chat.handle_key(key, "UNNAMED"), ChatOutcome::Consumed);
        }
        assert_eq!(chat.pending(), "");
    }

    #[test]
    fn idle_passes_non_enter_keys_through() {
        let mut chat = ChatState::default();
        assert_eq!(
            chat.handle_key(KeyInput::ArrowLeft, "UNNAMED"),
            ChatOutcome::PassThrough
        );
        assert_eq!(
            chat.handle_key(KeyInput::Escape, "UNNAMED"),
            ChatOutcome::PassThrough
        );
        assert_eq!(
            chat.handle_key(KeyInput::Char('x'), "UNNAMED"),
            ChatOutcome::PassThrough
        );
        assert_eq!(chat.mode(), ChatMode::Idle);
    }

    #[test]
    fn recent_messages_keeps_the_last_ten_in_order() {
        let mut chat = ChatState::default();
        for index in 0..13 {
            chat.push_message("Trader", format!("line {index}"), MessageKind::Npc);
        }
        let recent = chat.recent_messages();
        assert_eq!(recent.len(), CHAT_VISIBLE_MESSAGES);
        assert_eq!(recent[0].text, "line 3");
        assert_eq!(recent[9].text, "line 12");
        assert_eq!(chat.log().len(), 13);
    }

    #[test]
    fn composer_line_shows_prompt_then_pending_text_with_blinking_caret() {
        let mut chat = ChatState::default();
        assert_eq!(chat.composer_line(), IDLE_PROMPT);

        chat.handle_key(KeyInput::Enter, "UNNAMED");
        type_text(&mut chat, "yo");
        assert_eq!(chat.composer_line(), "yo|");

        chat.tick(0.25);
        assert!(chat.caret_visible());
        chat.tick(0.25);
        assert_eq!(chat.composer_line(), "yo");
        chat.tick(0.5);
        assert_eq!(chat.composer_line(), "yo|");
    }
}
