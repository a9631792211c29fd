use serde::{Deserialize, Serialize};

/// Which external program variant backs a session's pseudo-terminal.
///
/// Closed set, validated at the registry boundary — free-form strings from
/// the renderer never reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliType {
    Claude,
    Gemini,
    Copilot,
    Shell,
}

impl CliType {
    /// Parse a wire tag. Returns `None` for anything outside the closed set.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "claude" => Some(CliType::Claude),
            "gemini" => Some(CliType::Gemini),
            "copilot" => Some(CliType::Copilot),
            "shell" => Some(CliType::Shell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CliType::Claude => "claude",
            CliType::Gemini => "gemini",
            CliType::Copilot => "copilot",
            CliType::Shell => "shell",
        }
    }
}

impl std::fmt::Display for CliType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry from the host's CLI detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliInfo {
    pub cli_type: CliType,
    pub display_name: String,
    pub available: bool,
}

/// Everything the host needs to spawn a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    pub team_id: String,
    pub agent_name: String,
    pub work_dir: String,
    pub cli_type: CliType,
    pub prompt_id: Option<String>,
}
