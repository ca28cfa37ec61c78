//! Prompt construction for each pipeline role.
//!
//! Each role's step input is built from the inbound user message and the
//! session's accumulated state. Later roles depend on earlier roles' outputs
//! being present; a missing predecessor output means step ordering was
//! violated somewhere, so rendering fails loudly instead of substituting
//! empty text.

use gl_domain::agent::{AgentRole, RoleDescriptor};
use gl_domain::error::{Error, Result};
use gl_sessions::SessionRecord;

/// The ordered roster of role descriptors plus their input-construction
/// rules. Built once at startup, shared by every runner.
pub struct PromptRegistry {
    roles: Vec<RoleDescriptor>,
}

impl PromptRegistry {
    pub fn new(roles: Vec<RoleDescriptor>) -> Self {
        Self { roles }
    }

    /// The configured pipeline, in execution order.
    pub fn pipeline(&self) -> &[RoleDescriptor] {
        &self.roles
    }

    /// Build the input text for one role's step.
    pub fn render(
        &self,
        role: AgentRole,
        message: &str,
        record: &SessionRecord,
    ) -> Result<String> {
        match role {
            AgentRole::Greeter => Ok(message.to_owned()),
            AgentRole::Researcher => Ok(format!("Research context for: {message}")),
            AgentRole::Screenwriter => {
                let research = require(record, role, AgentRole::Researcher.context_key())?;
                Ok(format!(
                    "Create a film concept based on this research:\n\n{research}"
                ))
            }
            AgentRole::Critic => {
                let outline = require(record, role, AgentRole::Screenwriter.context_key())?;
                Ok(format!("Critique this film concept:\n\n{outline}"))
            }
        }
    }
}

fn require(record: &SessionRecord, role: AgentRole, key: &str) -> Result<String> {
    record.get_text(key).ok_or_else(|| Error::MissingContext {
        role: role.as_str().to_owned(),
        key: key.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_domain::agent::default_roster;
    use gl_sessions::SessionCache;
    use uuid::Uuid;

    fn registry() -> PromptRegistry {
        PromptRegistry::new(default_roster("gemini-1.5-flash"))
    }

    fn fresh_record() -> std::sync::Arc<SessionRecord> {
        SessionCache::new().get_or_create(Uuid::new_v4())
    }

    #[test]
    fn greeter_gets_the_raw_message() {
        let record = fresh_record();
        let input = registry()
            .render(AgentRole::Greeter, "Tell a story about Ada Lovelace", &record)
            .unwrap();
        assert_eq!(input, "Tell a story about Ada Lovelace");
    }

    #[test]
    fn researcher_prefixes_the_message() {
        let record = fresh_record();
        let input = registry()
            .render(AgentRole::Researcher, "Ada Lovelace", &record)
            .unwrap();
        assert_eq!(input, "Research context for: Ada Lovelace");
    }

    #[test]
    fn screenwriter_builds_from_research_output() {
        let record = fresh_record();
        record.set("research_response", "Ada was born in 1815.");
        let input = registry()
            .render(AgentRole::Screenwriter, "ignored", &record)
            .unwrap();
        assert!(input.starts_with("Create a film concept based on this research:"));
        assert!(input.ends_with("Ada was born in 1815."));
    }

    #[test]
    fn critic_builds_from_plot_outline() {
        let record = fresh_record();
        record.set("plot_outline", "Act one: the engine.");
        let input = registry().render(AgentRole::Critic, "ignored", &record).unwrap();
        assert!(input.starts_with("Critique this film concept:"));
        assert!(input.ends_with("Act one: the engine."));
    }

    #[test]
    fn dependent_role_without_predecessor_fails_loudly() {
        let record = fresh_record();
        let err = registry()
            .render(AgentRole::Screenwriter, "x", &record)
            .unwrap_err();
        match err {
            Error::MissingContext { role, key } => {
                assert_eq!(role, "screenwriter");
                assert_eq!(key, "research_response");
            }
            other => panic!("expected MissingContext, got {other}"),
        }
    }
}
