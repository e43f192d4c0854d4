use recipe_chat_core::{Agent, ChatSession, DeliveryError, RasaClient, Reply};
use tokio::task::JoinHandle;
use crate::ui;

type PendingReply = JoinHandle<Result<Vec<Reply>, DeliveryError>>;

pub struct App {
    pub should_quit: bool,

    // Conversation, draft and busy phase
    pub session: ChatSession,
    pub cursor: usize, // char index into the draft

    // Agent
    pub client: RasaClient,
    pub pending: Option<PendingReply>,

    // Chat window scroll state
    pub chat_scroll: u16,
    pub follow_tail: bool,  // keep the newest message in view
    pub chat_height: u16,   // inner height of the chat window, set during render
    pub chat_width: u16,    // inner width of the chat window, set during render

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: RasaClient) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            cursor: 0,
            client,
            pending: None,
            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Submit the draft and send it to the agent in the background.
    ///
    /// Blank drafts are ignored. The draft stays visible (and disabled) until
    /// the reply is settled by [`App::poll_pending`].
    pub fn submit(&mut self) {
        let draft = self.session.draft().to_string();
        let Some(outbound) = self.session.begin(&draft) else {
            return;
        };

        self.follow_tail = true;
        self.animation_frame = 0;

        let client = self.client.clone();
        self.pending = Some(tokio::spawn(async move { client.deliver(&outbound).await }));
    }

    /// Settle the session if the background request has finished.
    pub async fn poll_pending(&mut self) {
        if !self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }

        if let Some(handle) = self.pending.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(DeliveryError::Aborted(err.to_string())),
            };
            self.session.settle(outcome);
            self.cursor = 0;
            self.animation_frame = 0;
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Width the chat window wraps its text to.
    pub fn wrap_width(&self) -> usize {
        // Default to 50 until the first render has measured the window
        if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        }
    }

    /// Number of lines the chat window content takes at the current width.
    pub fn content_height(&self) -> u16 {
        u16::try_from(ui::chat_lines(self).len()).unwrap_or(u16::MAX)
    }

    fn max_scroll(&self) -> u16 {
        self.content_height().saturating_sub(self.chat_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = self.chat_scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{settle, unreachable_app};
    use recipe_chat_core::{Message, FAILURE_TEXT};

    fn exploding_request() -> Result<Vec<Reply>, DeliveryError> {
        panic!("request task blew up")
    }

    #[tokio::test]
    async fn test_submit_blank_draft_does_nothing() {
        let mut app = unreachable_app();
        app.session.set_draft("   ");

        app.submit();

        assert!(app.pending.is_none());
        assert!(!app.is_busy());
        assert!(app.session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_failed_request_settles_with_generic_message() {
        let mut app = unreachable_app();
        app.session.set_draft("hello");
        app.cursor = 5;

        app.submit();
        assert!(app.is_busy());
        assert_eq!(app.session.conversation(), &[Message::user("hello")]);
        assert_eq!(app.session.draft(), "hello");

        settle(&mut app).await;

        assert!(app.pending.is_none());
        assert_eq!(app.session.draft(), "");
        assert_eq!(app.cursor, 0);
        assert_eq!(
            app.session.conversation(),
            &[Message::user("hello"), Message::agent(FAILURE_TEXT)]
        );
    }

    #[tokio::test]
    async fn test_panicked_task_still_settles() {
        let mut app = unreachable_app();
        app.session.begin("hello");
        app.pending = Some(tokio::spawn(async { exploding_request() }));

        settle(&mut app).await;

        assert_eq!(app.session.conversation().last(), Some(&Message::agent(FAILURE_TEXT)));
    }

    #[test]
    fn test_content_height_counts_wrapped_lines() {
        let mut app = App::new(RasaClient::new("http://localhost"));
        app.chat_width = 10;
        app.session.begin("0123456789abcde"); // 15 columns -> 2 lines

        // sender + 2 text lines + blank, then busy "Bot" + "Thinking..."
        assert_eq!(app.content_height(), 6);
    }

    #[test]
    fn test_scrolling_up_stops_following_tail() {
        let mut app = App::new(RasaClient::new("http://localhost"));
        app.chat_width = 40;
        app.chat_height = 2;
        for i in 0..5 {
            app.session.begin(&format!("message {i}"));
            app.session.settle(Ok(Vec::new()));
        }
        app.scroll_to_bottom();
        let bottom = app.chat_scroll;
        assert!(bottom > 0);

        app.scroll_up(3);
        assert!(!app.follow_tail);
        assert_eq!(app.chat_scroll, bottom - 3);

        app.scroll_down(100);
        assert!(app.follow_tail);
        assert_eq!(app.chat_scroll, bottom);
    }

    #[test]
    fn test_content_height_wraps_at_word_boundaries() {
        let mut app = App::new(RasaClient::new("http://localhost"));
        app.chat_width = 10;
        // 20 columns, yet no two words fit on one 10-column line
        app.session.begin("aaaaaa bbbbbb cccccc");

        // sender + 3 text lines + blank, then busy "Bot" + "Thinking..."
        assert_eq!(app.content_height(), 7);
    }

    #[test]
    fn test_scroll_down_saturates() {
        let mut app = App::new(RasaClient::new("http://localhost"));
        app.chat_scroll = u16::MAX - 1;

        app.scroll_down(u16::MAX);

        assert_eq!(app.chat_scroll, app.content_height().saturating_sub(app.chat_height));
        assert!(app.follow_tail);
    }
}
