/// A voice offered by the local synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the synthesizer
    pub id: String,
    /// Display name, e.g. "Microsoft Natural (en-GB)"
    pub name: String,
    /// BCP-47 style language tag, e.g. "en-US"
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Pick the best-sounding voice available, or `None` to let the synthesizer
/// use its default. First match wins:
/// 1. name contains "Natural" and language contains "en"
/// 2. name contains "Google US English"
/// 3. name contains "Premium" and language contains "en"
/// 4. language contains "en-US"
/// 5. language contains "en"
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    let rules: [fn(&Voice) -> bool; 5] = [
        |v| v.name.contains("Natural") && v.lang.contains("en"),
        |v| v.name.contains("Google US English"),
        |v| v.name.contains("Premium") && v.lang.contains("en"),
        |v| v.lang.contains("en-US"),
        |v| v.lang.contains("en"),
    ];

    rules
        .iter()
        .find_map(|rule| voices.iter().find(|voice| rule(voice)))
}

/// Text plus delivery settings for the local synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
    /// 1.0 = normal speed
    pub rate: f32,
    /// 1.0 = normal pitch
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: "en-US".to_string(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
        }
    }

    /// Use `voice` if one was chosen; a chosen voice is spoken slightly slower.
    pub fn with_voice(mut self, voice: Option<Voice>) -> Self {
        if let Some(voice) = voice {
            self.voice = Some(voice);
            self.rate = 0.9;
            self.pitch = 1.0;
        }
        self
    }
}
