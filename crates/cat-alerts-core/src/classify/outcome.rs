use serde::{Deserialize, Serialize};

/// Risk-factor codes found for each classified field of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactorAssignment {
    /// From the generating-situation code, via the agent/situation table.
    pub generating_situation: Option<String>,
    /// From the causative-agent code, via the agent/situation table.
    pub causative_agent: Option<String>,
    pub injury_description: Option<String>,
    pub diagnosis_code: Option<String>,
    /// Cleared when it repeats the exclusion-table code of the diagnosis.
    pub diagnosis_category: Option<String>,
}

impl RiskFactorAssignment {
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        [
            &self.generating_situation,
            &self.causative_agent,
            &self.injury_description,
            &self.diagnosis_code,
            &self.diagnosis_category,
        ]
        .into_iter()
        .filter_map(|code| code.as_deref())
    }
}
