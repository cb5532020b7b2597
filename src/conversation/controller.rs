use crate::api::CompletionApi;
use crate::conversation::exchange::{self, Reply};
use crate::conversation::input::InputBuffer;
use crate::conversation::message::Message;
use crate::conversation::routing::{Route, RouteSettings};
use tracing::{debug, info};

/// Shown in the conversation whenever a request chain fails, whatever the cause
pub const ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Owns the message list, the draft input and the busy flag.
///
/// Submitting is split in two so a UI can run the network half elsewhere:
/// [`begin_submit`](Self::begin_submit) records the user message and returns
/// the route to request, [`finish`](Self::finish) records the outcome.
pub struct ConversationController {
    messages: Vec<Message>,
    input: InputBuffer,
    busy: bool,
    settings: RouteSettings,
}

impl ConversationController {
    pub fn new(settings: RouteSettings) -> Self {
        Self {
            messages: Vec::new(),
            input: InputBuffer::default(),
            busy: false,
            settings,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// URLs of every image message, oldest first. Image `n` is `image_urls()[n - 1]`.
    pub fn image_urls(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.is_image())
            .filter_map(|m| m.image_url.as_deref())
            .collect()
    }

    /// URL of the most recent image message
    pub fn latest_image_url(&self) -> Option<&str> {
        self.image_urls().last().copied()
    }

    /// URL of image `number` (1-based), or the latest one when `None`
    pub fn image_url(&self, number: Option<usize>) -> Option<&str> {
        match number {
            None => self.latest_image_url(),
            Some(n) => self.image_urls().get(n.checked_sub(1)?).copied(),
        }
    }

    /// Submit the draft in the input buffer. The buffer is only cleared when
    /// the submission is accepted.
    pub fn submit_input(&mut self) -> Option<Route> {
        if self.busy || self.input.is_blank() {
            return None;
        }
        let text = self.input.take();
        self.begin_submit(&text)
    }

    /// Start a submission. Returns `None`, with nothing recorded, for blank
    /// input or while another request chain is outstanding.
    pub fn begin_submit(&mut self, text: &str) -> Option<Route> {
        if text.trim().is_empty() {
            return None;
        }
        if self.busy {
            debug!("submission ignored while busy");
            return None;
        }

        self.messages.push(Message::user(text));
        self.busy = true;

        let route = self.settings.route(text);
        let endpoint = match &route {
            Route::Text { .. } => "text",
            Route::Image { .. } => "image",
        };
        info!(endpoint, "submitting prompt");
        Some(route)
    }

    /// Record the outcome of a request chain and release the busy flag
    pub fn finish(&mut self, reply: Reply) {
        let message = match reply {
            Reply::Text(text) => Message::assistant(text),
            Reply::Image(url) => Message::image(url),
            Reply::Failed => Message::assistant(ERROR_MESSAGE),
        };
        self.messages.push(message);
        self.busy = false;
    }

    /// Submit and wait for the whole request chain
    pub async fn submit(&mut self, api: &dyn CompletionApi, text: &str) -> Option<&Message> {
        let route = self.begin_submit(text)?;
        let reply = exchange::run(api, route, &self.settings).await;
        self.finish(reply);
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::message::MessageKind;
    use crate::conversation::testing::{FakeApi, ScriptedText};

    const PERSONA: &str = "Answer briefly. ";

    fn controller() -> ConversationController {
        ConversationController::new(RouteSettings {
            command_token: "/image".to_string(),
            text_prompt_prefix: PERSONA.to_string(),
        })
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_a_request() {
        let api = FakeApi::new();
        let mut chat = controller();

        assert!(chat.submit(&api, "").await.is_none());
        assert!(chat.submit(&api, "   \n\t").await.is_none());

        assert!(chat.messages().is_empty());
        assert!(!chat.is_busy());
        assert!(api.text_prompts().is_empty());
        assert!(api.image_prompts().is_empty());
    }

    #[tokio::test]
    async fn hello_gets_a_text_reply() {
        let api = FakeApi::new().with_text(ScriptedText::ok("hi there"));
        let mut chat = controller();

        chat.submit(&api, "hello").await;

        assert_eq!(api.text_prompts(), vec![format!("{PERSONA}hello")]);
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user);
        assert_eq!(messages[0].text.as_deref(), Some("hello"));
        assert!(!messages[1].is_user);
        assert_eq!(messages[1].kind, MessageKind::Text);
        assert_eq!(messages[1].text.as_deref(), Some("hi there"));
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn image_command_gets_an_image() {
        let api = FakeApi::new().with_image_url("http://x/y.png");
        let mut chat = controller();

        chat.submit(&api, "/image a red fox").await;

        assert!(api.text_prompts().is_empty());
        assert_eq!(api.image_prompts(), vec!["a red fox"]);
        let last = chat.messages().last().expect("reply");
        assert_eq!(last.kind, MessageKind::Image);
        assert_eq!(last.image_url.as_deref(), Some("http://x/y.png"));
        assert_eq!(chat.latest_image_url(), Some("http://x/y.png"));
    }

    #[tokio::test]
    async fn model_requested_image_replaces_the_raw_text() {
        let api = FakeApi::new()
            .with_text(ScriptedText::ok("/image a sunset over the sea"))
            .with_image_url("http://x/sunset.png");
        let mut chat = controller();

        chat.submit(&api, "make me a picture of a sunset").await;

        assert_eq!(api.text_prompts().len(), 1);
        assert_eq!(api.image_prompts(), vec!["a sunset over the sea"]);
        assert_eq!(chat.messages().len(), 2);
        assert!(chat.messages()[1].is_image());
    }

    #[tokio::test]
    async fn non_success_status_appends_one_error_and_releases_busy() {
        let api = FakeApi::new().with_text(ScriptedText::Status("error".to_string()));
        let mut chat = controller();

        chat.submit(&api, "hello").await;

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].text.as_deref(), Some(ERROR_MESSAGE));
        assert!(!chat.is_busy());

        let api = FakeApi::new().with_image_status("failed");
        chat.submit(&api, "/image a tree").await;
        assert_eq!(chat.messages().len(), 4);
        assert_eq!(chat.messages()[3].text.as_deref(), Some(ERROR_MESSAGE));
        assert!(!chat.is_busy());
    }

    #[test]
    fn second_submission_while_busy_is_ignored() {
        let mut chat = controller();

        let first = chat.begin_submit("first");
        assert!(first.is_some());
        assert!(chat.is_busy());

        assert!(chat.begin_submit("second").is_none());
        assert_eq!(chat.messages().len(), 1);

        chat.finish(Reply::Text("done".to_string()));
        assert!(!chat.is_busy());
        assert!(chat.begin_submit("third").is_some());
    }

    #[test]
    fn submit_input_takes_the_draft_only_when_accepted() {
        let mut chat = controller();
        chat.input_mut().set("/image a boat");

        let route = chat.submit_input();
        assert_eq!(
            route,
            Some(Route::Image {
                prompt: "a boat".to_string()
            })
        );
        assert_eq!(chat.input().content(), "");

        chat.input_mut().set("queued while busy");
        assert!(chat.submit_input().is_none());
        assert_eq!(chat.input().content(), "queued while busy");
    }

    #[test]
    fn messages_are_appended_in_order() {
        let mut chat = controller();
        chat.begin_submit("one");
        chat.finish(Reply::Image("http://x/1.png".to_string()));
        chat.begin_submit("two");
        chat.finish(Reply::Failed);

        let kinds: Vec<_> = chat.messages().iter().map(|m| (m.kind, m.is_user)).collect();
        assert_eq!(
            kinds,
            vec![
                (MessageKind::Text, true),
                (MessageKind::Image, false),
                (MessageKind::Text, true),
                (MessageKind::Text, false),
            ]
        );
        assert_eq!(chat.latest_image_url(), Some("http://x/1.png"));
    }

    #[test]
    fn images_are_numbered_from_the_oldest() {
        let mut chat = controller();
        for url in ["http://x/1.png", "http://x/2.png", "http://x/3.png"] {
            chat.begin_submit("/image something");
            chat.finish(Reply::Image(url.to_string()));
        }

        assert_eq!(chat.image_urls().len(), 3);
        assert_eq!(chat.image_url(Some(1)), Some("http://x/1.png"));
        assert_eq!(chat.image_url(Some(2)), Some("http://x/2.png"));
        assert_eq!(chat.image_url(None), Some("http://x/3.png"));
        assert_eq!(chat.image_url(Some(4)), None);
        assert_eq!(chat.image_url(Some(0)), None);
    }
}
