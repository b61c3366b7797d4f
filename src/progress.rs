use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase boundaries reported to the caller while a generation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    FetchingSource,
    Designing,
    ConnectingRepository,
    RenderingRepository,
}

impl ProgressStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStage::FetchingSource => "FETCHING AND ANALYZING SOURCE CONTENT",
            ProgressStage::Designing => "DESIGNING INFOGRAPHIC",
            ProgressStage::ConnectingRepository => "CONNECTING TO GITHUB",
            ProgressStage::RenderingRepository => "ANALYZING AND VISUALIZING REPOSITORY",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
