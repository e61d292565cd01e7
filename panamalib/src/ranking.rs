//! Ordering of collected workspaces.
//!
//! Exactly one policy is active per run: relevance score (descending) or
//! absolute path (ascending).

use crate::config::{ScoreConfig, SortBy};
use crate::workspace::Workspace;

const BASE_SCORE: f64 = 1.0;
const GIT_BONUS: f64 = 0.2;
const PACKAGE_BONUS: f64 = 0.1;
const NAME_MATCH_BONUS: f64 = 0.5;
const PATH_MATCH_BONUS: f64 = 0.3;

/// Ranking policy, chosen once per configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    /// Structural signals plus optional query match, highest first
    ByScore {
        weights: ScoreConfig,
        query: Option<String>,
    },
    /// Lexicographic by absolute path
    ByPath,
}

impl Default for Ranking {
    fn default() -> Self {
        Ranking::ByScore {
            weights: ScoreConfig::default(),
            query: None,
        }
    }
}

impl Ranking {
    /// Build the policy from the configured sort key and the call's query.
    pub fn new(sort: SortBy, weights: &ScoreConfig, query: Option<&str>) -> Self {
        match sort {
            SortBy::Score => Ranking::ByScore {
                weights: weights.clone(),
                query: query.filter(|q| !q.is_empty()).map(str::to_string),
            },
            SortBy::Path => Ranking::ByPath,
        }
    }

    /// Score (if applicable) and sort `workspaces` in place.
    pub fn apply(&self, workspaces: &mut [Workspace]) {
        match self {
            Ranking::ByScore { weights, query } => {
                score_workspaces(workspaces, weights, query.as_deref());
                sort_by_score(workspaces);
            }
            Ranking::ByPath => workspaces.sort_by(|a, b| a.path.cmp(&b.path)),
        }
    }

    /// Sorted copy of `workspaces`.
    pub fn order(&self, workspaces: &[Workspace]) -> Vec<Workspace> {
        let mut ordered = workspaces.to_vec();
        self.apply(&mut ordered);
        ordered
    }
}

/// Relevance of a single workspace.
pub fn score_workspace(workspace: &Workspace, weights: &ScoreConfig, query: Option<&str>) -> f64 {
    let mut score = BASE_SCORE;

    score -= workspace.depth as f64 * weights.depth_penalty;

    if workspace.has_git {
        score += GIT_BONUS;
    }
    if workspace.has_package_file {
        score += PACKAGE_BONUS;
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        let query = query.to_lowercase();
        if workspace.name.to_lowercase().contains(&query) {
            score += NAME_MATCH_BONUS;
        } else if workspace
            .path
            .to_string_lossy()
            .to_lowercase()
            .contains(&query)
        {
            score += PATH_MATCH_BONUS;
        }
    }

    score
}

/// Assign `score` on every workspace.
pub fn score_workspaces(workspaces: &mut [Workspace], weights: &ScoreConfig, query: Option<&str>) {
    for workspace in workspaces.iter_mut() {
        workspace.score = Some(score_workspace(workspace, weights, query));
    }
}

/// Stable sort, highest score first. Equal scores keep discovery order.
pub fn sort_by_score(workspaces: &mut [Workspace]) {
    workspaces.sort_by(|a, b| {
        let a = a.score.unwrap_or(f64::NEG_INFINITY);
        let b = b.score.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}
