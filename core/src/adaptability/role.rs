//! Role recognition from a job title and a short description of the role

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::{confidence, top_scored, DEFAULT_FUNCTION, DEFAULT_ROLE};
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::{Dataset, KeywordIndex, MatchText};
use crate::types::normalize_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleData {
    pub organizational_roles: Vec<Role>,
    pub functional_roles: Vec<Role>,
    #[serde(default)]
    pub industry_roles: Vec<IndustryRoles>,
    pub communication_strategies: Vec<CommunicationStrategy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<CommunicationPreferences>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationPreferences {
    pub style: String,
    pub detail_level: String,
    pub data_focus: String,
    pub time_sensitivity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryRoles {
    pub industry: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationStrategy {
    pub role: String,
    #[serde(default)]
    pub content_focus: Vec<String>,
    #[serde(default)]
    pub presentation_style: Vec<String>,
    #[serde(default)]
    pub language_patterns: Vec<String>,
}

impl RoleData {
    pub fn strategy(&self, role: &str) -> Option<&CommunicationStrategy> {
        self.communication_strategies.iter().find(|s| s.role == role)
    }

    fn industry_roles(&self, industry: &str) -> Option<&IndustryRoles> {
        self.industry_roles.iter().find(|r| r.industry == industry)
    }
}

impl Dataset for RoleData {
    const NAME: &'static str = "roles";
    const EMBEDDED: &'static str = include_str!("../../data/roles.json");

    fn validate(&self) -> Result<()> {
        self.organizational_roles
            .iter()
            .find(|r| r.id == DEFAULT_ROLE)
            .ok_or_dataset(Self::NAME, format!("the '{}' role is required", DEFAULT_ROLE))?;
        self.functional_roles
            .iter()
            .find(|r| r.id == DEFAULT_FUNCTION)
            .ok_or_dataset(Self::NAME, format!("the '{}' function is required", DEFAULT_FUNCTION))?;
        self.strategy(DEFAULT_ROLE).ok_or_dataset(
            Self::NAME,
            format!("a communication strategy for '{}' is required", DEFAULT_ROLE),
        )?;
        Ok(())
    }
}

/// Which family of roles to look in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Organizational,
    Functional,
    IndustrySpecific,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoleKind::Organizational => "organizational",
            RoleKind::Functional => "functional",
            RoleKind::IndustrySpecific => "industry_specific",
        })
    }
}

impl FromStr for RoleKind {
    type Err = PitchwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_id(s).as_str() {
            "organizational" => Ok(RoleKind::Organizational),
            "functional" => Ok(RoleKind::Functional),
            "industry_specific" | "industry" => Ok(RoleKind::IndustrySpecific),
            other => Err(PitchwiseError::invalid_input(format!(
                "unknown role kind '{}' (expected organizational, functional or industry_specific)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMatch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRole {
    pub id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleMatches {
    pub organizational_roles: Vec<ScoredRole>,
    pub functional_roles: Vec<ScoredRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industry_specific_roles: Vec<ScoredRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecognition {
    pub organizational_role: RoleMatch,
    pub functional_role: RoleMatch,
    pub industry_specific_role: Option<RoleMatch>,
    pub communication_strategy: CommunicationStrategy,
    pub all_matches: RoleMatches,
}

/// Keyword lists of one role family, in data order
struct CompiledFamily {
    indexes: Vec<KeywordIndex>,
}

impl CompiledFamily {
    fn new(roles: &[Role]) -> Result<Self> {
        Ok(Self {
            indexes: roles
                .iter()
                .map(|r| KeywordIndex::new(&r.keywords))
                .collect::<Result<_>>()?,
        })
    }

    /// Longer keywords are more specific and weigh more
    fn scores(&self, text: &MatchText) -> Vec<f64> {
        self.indexes
            .iter()
            .map(|index| index.weighted(text, |kw| 0.5 + kw.chars().count() as f64 / 20.0))
            .collect()
    }
}

pub struct RoleRecognizer {
    data: RoleData,
    organizational: CompiledFamily,
    functional: CompiledFamily,
    industry: Vec<(String, CompiledFamily)>,
}

impl RoleRecognizer {
    pub fn new(data: RoleData) -> Result<Self> {
        data.validate()?;
        let organizational = CompiledFamily::new(&data.organizational_roles)?;
        let functional = CompiledFamily::new(&data.functional_roles)?;
        let industry = data
            .industry_roles
            .iter()
            .map(|group| Ok((group.industry.clone(), CompiledFamily::new(&group.roles)?)))
            .collect::<Result<_>>()?;
        Ok(Self {
            data,
            organizational,
            functional,
            industry,
        })
    }

    pub fn data(&self) -> &RoleData {
        &self.data
    }

    pub fn recognize(
        &self,
        job_title: &str,
        additional_info: Option<&str>,
        industry: Option<&str>,
    ) -> RoleRecognition {
        let text = MatchText::joined([job_title, additional_info.unwrap_or_default()]);

        let org_scores = self.organizational.scores(&text);
        let func_scores = self.functional.scores(&text);

        let organizational_role = pick(&self.data.organizational_roles, &org_scores, DEFAULT_ROLE);
        let functional_role = pick(&self.data.functional_roles, &func_scores, DEFAULT_FUNCTION);

        let industry_id = industry.map(normalize_id);
        let industry_scored = industry_id.as_deref().and_then(|id| {
            let roles = self.data.industry_roles(id)?;
            let compiled = self.industry.iter().find(|(key, _)| key == id).map(|(_, c)| c)?;
            let scores = compiled.scores(&text);
            top_scored(&scores).map(|_| (roles, scores))
        });

        let (industry_specific_role, industry_matches) = match &industry_scored {
            Some((group, scores)) => (
                Some(pick(&group.roles, scores, "")),
                scored(&group.roles, scores),
            ),
            None => (None, Vec::new()),
        };

        let communication_strategy = self.communication_strategy(&organizational_role.id).clone();

        log::debug!(
            "recognized role {} / {} for '{}'",
            organizational_role.id,
            functional_role.id,
            job_title
        );

        RoleRecognition {
            all_matches: RoleMatches {
                organizational_roles: scored(&self.data.organizational_roles, &org_scores),
                functional_roles: scored(&self.data.functional_roles, &func_scores),
                industry_specific_roles: industry_matches,
            },
            organizational_role,
            functional_role,
            industry_specific_role,
            communication_strategy,
        }
    }

    pub fn role_information(
        &self,
        kind: RoleKind,
        id: &str,
        industry: Option<&str>,
    ) -> Option<&Role> {
        let id = normalize_id(id);
        let family: &[Role] = match kind {
            RoleKind::Organizational => &self.data.organizational_roles,
            RoleKind::Functional => &self.data.functional_roles,
            RoleKind::IndustrySpecific => {
                let industry = normalize_id(industry?);
                &self.data.industry_roles(&industry)?.roles
            }
        };
        family.iter().find(|r| r.id == id)
    }

    /// Strategy for an organizational role, falling back to manager
    pub fn communication_strategy(&self, role: &str) -> &CommunicationStrategy {
        self.data
            .strategy(role)
            .or_else(|| self.data.strategy(DEFAULT_ROLE))
            .unwrap_or(&self.data.communication_strategies[0])
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        *self = Self::new(self.data.merged(patch)?)?;
        Ok(())
    }
}

/// Highest scoring role, or the default at zero confidence
fn pick(roles: &[Role], scores: &[f64], default: &str) -> RoleMatch {
    let total: f64 = scores.iter().sum();
    match top_scored(scores) {
        Some(index) => role_match(&roles[index], confidence(scores[index], total)),
        None => roles
            .iter()
            .find(|r| r.id == default)
            .map(|r| role_match(r, 0.0))
            .unwrap_or_else(|| RoleMatch {
                id: default.to_string(),
                name: String::new(),
                description: String::new(),
                confidence: 0.0,
            }),
    }
}

fn role_match(role: &Role, confidence: f64) -> RoleMatch {
    RoleMatch {
        id: role.id.clone(),
        name: role.name.clone(),
        description: role.description.clone(),
        confidence,
    }
}

fn scored(roles: &[Role], scores: &[f64]) -> Vec<ScoredRole> {
    roles
        .iter()
        .zip(scores)
        .filter(|(_, score)| **score > 0.0)
        .map(|(role, score)| ScoredRole {
            id: role.id.clone(),
            name: role.name.clone(),
            score: *score,
        })
        .collect()
}
