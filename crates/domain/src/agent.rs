//! Agent role descriptors for the film-pitch pipeline.
//!
//! Every role is normalized into one [`RoleDescriptor`] shape at startup;
//! nothing downstream branches on how a role was defined.

use serde::{Deserialize, Serialize};

/// The fixed set of agent roles the pipeline can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Greeter,
    Researcher,
    Screenwriter,
    Critic,
}

impl AgentRole {
    /// The execution order of a pipeline run. Later roles build their
    /// prompts from earlier roles' outputs, so this order is total.
    pub const PIPELINE: [AgentRole; 4] = [
        AgentRole::Greeter,
        AgentRole::Researcher,
        AgentRole::Screenwriter,
        AgentRole::Critic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::Greeter => "greeter",
            AgentRole::Researcher => "researcher",
            AgentRole::Screenwriter => "screenwriter",
            AgentRole::Critic => "critic",
        }
    }

    /// The accumulated-state key this role's output is stored under.
    pub fn context_key(self) -> &'static str {
        match self {
            AgentRole::Greeter => "greeter_response",
            AgentRole::Researcher => "research_response",
            AgentRole::Screenwriter => "plot_outline",
            AgentRole::Critic => "critique",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-resolved agent role: name, model, and persona instruction.
#[derive(Debug, Clone)]
pub struct RoleDescriptor {
    pub role: AgentRole,
    /// Model sent to the completion gateway for this role's steps.
    pub model: String,
    /// System instruction (the persona prompt) sent alongside every input.
    pub instruction: String,
}

/// Build the default four-role roster, all on the given model.
pub fn default_roster(model: &str) -> Vec<RoleDescriptor> {
    AgentRole::PIPELINE
        .iter()
        .map(|&role| RoleDescriptor {
            role,
            model: model.to_string(),
            instruction: instruction_for(role).to_string(),
        })
        .collect()
}

fn instruction_for(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Greeter => GREETER_INSTRUCTION,
        AgentRole::Researcher => RESEARCHER_INSTRUCTION,
        AgentRole::Screenwriter => SCREENWRITER_INSTRUCTION,
        AgentRole::Critic => CRITIC_INSTRUCTION,
    }
}

const GREETER_INSTRUCTION: &str = "\
You are the welcoming agent for the Film Concept Generator system.

Your role is to:
1. Welcome the user warmly to the filmmaking system
2. Ask them about the historical figure or topic they'd like to explore
3. Gather any specific preferences (tone, genre, target audience, budget range)
4. Hand the requirements over to the film concept team

Be friendly, professional, and enthusiastic about filmmaking. Ask clarifying
questions to understand their vision before the development team takes over.";

const RESEARCHER_INSTRUCTION: &str = "\
You are an expert researcher specializing in historical figures and contexts.

Your role is to:
1. Research historical figures mentioned in film concepts
2. Verify historical accuracy and context
3. Gather relevant biographical information
4. Identify key events, relationships, and time periods
5. Provide sources and citations for your research

Use reliable sources, note conflicting historical accounts, and identify gaps
in available information. Always structure your research clearly and cite your
sources.";

const SCREENWRITER_INSTRUCTION: &str = "\
You are an expert screenwriter specializing in historical dramas.

Your role is to:
1. Review research findings from the researcher agent
2. Transform historical facts into compelling narrative structures
3. Identify dramatic moments and character arcs
4. Create a structured plot outline with a three-act structure, key turning
   points, character development arcs, and thematic elements

Balance historical accuracy with dramatic storytelling. Output a structured
plot outline that captures the essence of the historical story while making it
compelling for modern audiences.";

const CRITIC_INSTRUCTION: &str = "\
You are an expert story critic and script consultant.

Your role is to:
1. Review the plot outline created by the screenwriter
2. Evaluate story structure, character development, and dramatic tension
3. Identify weaknesses, plot holes, or missed opportunities
4. Provide specific, actionable feedback for improvement

Be constructive and specific. Balance strengths with areas for improvement,
and evaluate both audience engagement and historical accuracy.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let names: Vec<&str> = AgentRole::PIPELINE.iter().map(|r| r.as_str()).collect();
        assert_eq!(names, ["greeter", "researcher", "screenwriter", "critic"]);
    }

    #[test]
    fn roster_normalizes_every_role() {
        let roster = default_roster("gemini-1.5-flash");
        assert_eq!(roster.len(), 4);
        for (descriptor, role) in roster.iter().zip(AgentRole::PIPELINE) {
            assert_eq!(descriptor.role, role);
            assert_eq!(descriptor.model, "gemini-1.5-flash");
            assert!(!descriptor.instruction.is_empty());
        }
    }

    #[test]
    fn context_keys_are_distinct() {
        let keys: std::collections::HashSet<&str> = AgentRole::PIPELINE
            .iter()
            .map(|r| r.context_key())
            .collect();
        assert_eq!(keys.len(), 4);
    }
}
