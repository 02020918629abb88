//! Persona prompt builder.
//!
//! The system prompt is a pure function of the persona document and the
//! observed style markers, so it is built once and cached. Everything that
//! changes per turn (retrieved memory, caller context, the message itself)
//! goes into the user prompt.

use std::sync::OnceLock;

use echotwin_types::persona::PersonaConfig;

use crate::style::StyleMarkers;

/// System prompt used when no persona document is available.
pub const NEUTRAL_PROMPT: &str = "You are a helpful AI assistant.";

/// Default number of style markers rendered per vocabulary.
pub const DEFAULT_STYLE_PREVIEW: usize = 10;

const SECTION_SEPARATOR: &str = "\n\n";

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading_with_bullets(heading: &str, items: &[String]) -> String {
    format!("{heading}:\n{}", bullets(items))
}

#[derive(Debug, Clone)]
pub struct PersonaPromptBuilder {
    style_preview: usize,
}

impl Default for PersonaPromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_PREVIEW)
    }
}

impl PersonaPromptBuilder {
    pub fn new(style_preview: usize) -> Self {
        Self { style_preview }
    }

    /// Render the persona system prompt.
    ///
    /// Sections appear in a fixed order separated by blank lines. Empty
    /// persona fields render as empty sections rather than being omitted.
    pub fn build_system_prompt(
        &self,
        persona: Option<&PersonaConfig>,
        markers: &StyleMarkers,
    ) -> String {
        let Some(p) = persona else {
            return NEUTRAL_PROMPT.to_string();
        };

        let markers = markers.preview(self.style_preview);
        let name = &p.name;
        let target = &p.target_person;
        let context = &p.relationship_context;

        let examples: String = p
            .examples()
            .map(|ex| format!("\nUser: \"{}\"\n{name}: \"{}\"", ex.input, ex.output))
            .collect();

        let primary_language = p
            .languages
            .first()
            .map(String::as_str)
            .unwrap_or("the primary language");

        let sections = [
            format!(
                "You are {name}'s AI Twin. Context: {context}. You're communicating with {target}."
            ),
            format!("VOICE INSPIRATION: {}", p.voice_inspiration.join(", ")),
            heading_with_bullets("STYLE GUIDELINES", &p.style),
            heading_with_bullets("PERSONALITY TRAITS", &p.personality_traits),
            heading_with_bullets("BEHAVIORAL TRAITS", &p.behavioral_traits),
            heading_with_bullets("CORE VALUES", &p.values),
            heading_with_bullets("TONE & COMMUNICATION", &p.tone),
            format!("LANGUAGES: {}", p.languages.join(", ")),
            format!("CATCHPHRASES: {}", p.catchphrases.join(", ")),
            format!(
                "CHAT PATTERNS LEARNED:\nRegional Expressions: {}\nCommon Phrases: {}",
                markers.regional_phrases.join(", "),
                markers.informal_expressions.join(", ")
            ),
            format!(
                "MOOD RULES:\nWhen {target} is happy/playful:\n{}\n\nWhen {target} is sad/angry:\n{}",
                bullets(&p.mood_rules.when_happy),
                bullets(&p.mood_rules.when_upset)
            ),
            format!("EXAMPLE RESPONSES:{examples}"),
            format!(
                "CRITICAL RULES:\n\
                 1. ALWAYS limit responses to 1-{lines} lines\n\
                 2. Use {primary_language} {share}% of the time\n\
                 3. Be authentic to the personality described\n\
                 4. Mirror {target}'s mood like a social empath\n\
                 5. Channel the wit and style of your voice inspiration\n\
                 6. Never sound desperate - maintain self-respect\n\
                 7. Be romantic but not cheesy\n\
                 8. Reference past conversations when relevant",
                lines = p.max_response_lines,
                share = p.primary_language_share,
            ),
            format!(
                "Remember: You are {name} - {context}. Stay true to every detail in this personality profile."
            ),
        ];

        sections.join(SECTION_SEPARATOR)
    }

    /// Render the per-turn user prompt.
    pub fn build_user_prompt(
        &self,
        memory_context: &str,
        context: &str,
        user_input: &str,
        persona: Option<&PersonaConfig>,
    ) -> String {
        let defaults = PersonaConfig::default();
        let p = persona.unwrap_or(&defaults);
        let name = &p.name;
        let lines = p.max_response_lines;

        format!(
            "{memory_context}\n\
             Current context: {context}\n\n\
             User ({target}): {user_input}\n\n\
             Respond as {name} would - naturally code-switching, being caring but not desperate. \
             If there are relevant past conversations, acknowledge them appropriately. \
             Keep it 1-{lines} lines and authentic.",
            target = p.target_person,
        )
    }
}

/// A persona with its observed style, and the system prompt built from them.
///
/// The system prompt is rendered on first use and reused afterwards.
#[derive(Debug)]
pub struct PersonaPrompt {
    persona: Option<PersonaConfig>,
    markers: StyleMarkers,
    builder: PersonaPromptBuilder,
    system: OnceLock<String>,
}

impl PersonaPrompt {
    pub fn new(
        persona: Option<PersonaConfig>,
        markers: StyleMarkers,
        builder: PersonaPromptBuilder,
    ) -> Self {
        Self {
            persona,
            markers,
            builder,
            system: OnceLock::new(),
        }
    }

    pub fn persona(&self) -> Option<&PersonaConfig> {
        self.persona.as_ref()
    }

    pub fn markers(&self) -> &StyleMarkers {
        &self.markers
    }

    /// Name the persona speaks as, used in transcripts and the REPL.
    pub fn speaker_name(&self) -> &str {
        self.persona.as_ref().map_or("Assistant", |p| p.name.as_str())
    }

    /// Name of the person the persona addresses.
    pub fn addressee_name(&self) -> &str {
        self.persona.as_ref().map_or("User", |p| p.target_person.as_str())
    }

    pub fn system_prompt(&self) -> &str {
        self.system
            .get_or_init(|| self.builder.build_system_prompt(self.persona.as_ref(), &self.markers))
    }

    pub fn user_prompt(&self, memory_context: &str, context: &str, user_input: &str) -> String {
        self.builder
            .build_user_prompt(memory_context, context, user_input, self.persona.as_ref())
    }
}
