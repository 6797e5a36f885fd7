//! Chat-turn prompt construction for llama-3 instruct models.
//!
//! Prompts are rendered from tagged turns rather than interpolated inline, so
//! every call site produces the exact same delimiter structure.

const BEGIN_OF_TEXT: &str = "<|begin_of_text|>";
const START_HEADER: &str = "<|start_header_id|>";
const END_HEADER: &str = "<|end_header_id|>";

/// End-of-turn marker, also used as the stop sequence for completions.
pub const TURN_END: &str = "<|eot_id|>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    fn tag(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Builds a llama-3 chat prompt from a sequence of turns.
///
/// The rendered prompt always ends with an open `assistant` header so the
/// model completes the assistant turn. An optional seed biases the start of
/// the completion (e.g. the literal `SELECT` for SQL generation).
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    turns: Vec<ChatTurn>,
    seed: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.turns.push(ChatTurn {
            role: Role::System,
            content: content.into(),
        });
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.turns.push(ChatTurn {
            role: Role::User,
            content: content.into(),
        });
        self
    }

    /// Pre-seed the assistant turn with a partial token.
    pub fn seed_assistant(mut self, prefix: impl Into<String>) -> Self {
        self.seed = Some(prefix.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(BEGIN_OF_TEXT);
        for turn in &self.turns {
            out.push_str(START_HEADER);
            out.push_str(turn.role.tag());
            out.push_str(END_HEADER);
            out.push('\n');
            out.push_str(&turn.content);
            out.push_str(TURN_END);
        }
        out.push_str(START_HEADER);
        out.push_str(Role::Assistant.tag());
        out.push_str(END_HEADER);
        out.push('\n');
        if let Some(seed) = &self.seed {
            out.push_str(seed);
        }
        out
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn user_turn_renders_full_template() {
        let prompt = PromptBuilder::new().user("hello").render();
        assert_eq!(
            prompt,
            "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n\
             hello<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n"
        );
    }

    #[test]
    fn system_turn_comes_before_user_turn() {
        let prompt = PromptBuilder::new()
            .system("be terse")
            .user("hi")
            .render();
        let system_at = prompt.find("system").expect("system tag");
        let user_at = prompt.find("user").expect("user tag");
        assert!(system_at < user_at);
        assert!(prompt.starts_with(BEGIN_OF_TEXT));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n"));
    }

    #[test]
    fn assistant_seed_trails_the_open_header() {
        let prompt = PromptBuilder::new()
            .user("count the users")
            .seed_assistant("SELECT")
            .render();
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\nSELECT"));
    }

    #[test]
    fn every_closed_turn_ends_with_eot() {
        let prompt = PromptBuilder::new().system("a").user("b").render();
        assert_eq!(prompt.matches(TURN_END).count(), 2);
    }
}
