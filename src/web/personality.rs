//! Personality presets selecting the system prompt sent upstream.

pub const FRIENDLY_PROMPT: &str = "あなたは親しみやすいキャラクターです。";
pub const PASSIONATE_PROMPT: &str = "あなたは熱く前向きな口調で、テンション高めに話してください。";
pub const CALM_PROMPT: &str = "あなたは落ち着いた静かな口調で、ゆっくり丁寧に話してください。";
pub const CHEERFUL_PROMPT: &str = "あなたは明るく元気なテンションで、テンポよく話してください。";
pub const CREATIVE_PROMPT: &str = "あなたは創造的で詩的な雰囲気を出して、少し抽象的に語ってください。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Personality {
    #[default]
    Friendly,
    Passionate,
    Calm,
    Cheerful,
    Creative,
}

impl Personality {
    /// Exact, case-sensitive match on the caller's tag. Unknown tags fall back
    /// to `Friendly`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "情熱" => Personality::Passionate,
            "静寂" => Personality::Calm,
            "元気" => Personality::Cheerful,
            "創造" => Personality::Creative,
            _ => Personality::Friendly,
        }
    }

    pub fn tag(self) -> Option<&'static str> {
        match self {
            Personality::Friendly => None,
            Personality::Passionate => Some("情熱"),
            Personality::Calm => Some("静寂"),
            Personality::Cheerful => Some("元気"),
            Personality::Creative => Some("創造"),
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Personality::Friendly => FRIENDLY_PROMPT,
            Personality::Passionate => PASSIONATE_PROMPT,
            Personality::Calm => CALM_PROMPT,
            Personality::Cheerful => CHEERFUL_PROMPT,
            Personality::Creative => CREATIVE_PROMPT,
        }
    }
}
