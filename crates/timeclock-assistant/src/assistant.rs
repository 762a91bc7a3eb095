//! Assistant replies with Danish fallbacks.

use std::sync::Arc;

use timeclock_core::traits::ChatProvider;

/// Reply when no chat credential is configured.
pub const NO_CREDENTIAL_REPLY: &str = "AI chat funktionalitet er ikke tilgængelig uden API nøgle. Kontakt administrator for at aktivere denne funktion.";

/// Reply when the provider answers without text.
pub const EMPTY_REPLY: &str = "Beklager, jeg kunne ikke behandle dit spørgsmål.";

/// Reply when the provider call fails.
pub const FAILURE_REPLY: &str = "Der opstod en fejl. Prøv igen senere.";

const SYSTEM_PROMPT: &str = "Du er en hjælpsom AI assistent for en dansk arbejdstidsapp. Du hjælper brugere med:
- Spørgsmål om arbejdstid og timeregistrering
- Arbejdspladsrelaterede råd
- Generelle spørgsmål om arbejde
- Support til appen

Svar altid på dansk og vær venlig og professionel. Hold svarene korte og relevante.
";

/// Build the system prompt, with an optional context line appended.
#[must_use]
pub fn system_prompt(context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!("{SYSTEM_PROMPT}\n\nKontekst: {context}"),
        _ => SYSTEM_PROMPT.to_string(),
    }
}

/// One-line description of the user's work status.
#[must_use]
pub fn work_context(is_working: bool) -> String {
    let status = if is_working { "på arbejde" } else { "ikke på arbejde" };
    format!("Brugeren er i øjeblikket {status}.")
}

/// Answers chat messages through an optional provider.
///
/// Never fails: provider errors and a missing provider turn into fixed
/// replies.
#[derive(Clone, Default)]
pub struct Assistant {
    provider: Option<Arc<dyn ChatProvider>>,
}

impl Assistant {
    /// Create an assistant; `None` disables the provider call.
    #[must_use]
    pub fn new(provider: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { provider }
    }

    /// Whether a provider is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Answer `message`.
    pub async fn reply(&self, message: &str, context: Option<&str>) -> String {
        let Some(provider) = &self.provider else {
            return NO_CREDENTIAL_REPLY.to_string();
        };

        match provider.complete(&system_prompt(context), message).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPLY.to_string(),
            Err(e) => {
                tracing::warn!("Chat provider error: {e}");
                FAILURE_REPLY.to_string()
            }
        }
    }
}
