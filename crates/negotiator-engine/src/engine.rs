use crate::landscape::{LandscapeAnalyzer, StakeholderAnalysis};
use crate::leverage::{LeveragePlan, LeverageSynthesizer};
use chrono::{DateTime, Utc};
use negotiator_cache::{InMemorySessionCache, SessionStore};
use negotiator_core::{
    AnalysisRequest, NegotiationError, NegotiatorConfig, Result, SalienceScorer, Stakeholder, StakeholderValidator,
};
use negotiator_graph::InfluenceGraph;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Age report for the analysis cached under one session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisAge {
    pub session_key: String,
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub age_secs: u64,
    pub remaining_secs: u64,
}

/// Entry point for the three engine operations.
///
/// Generic over the session store so the in-memory default can be swapped
/// for an external one without touching scoring or synthesis.
pub struct NegotiationEngine<S = InMemorySessionCache<StakeholderAnalysis>> {
    store: S,
    validator: StakeholderValidator,
    scorer: SalienceScorer,
    landscape: LandscapeAnalyzer,
    synthesizer: LeverageSynthesizer,
}

impl NegotiationEngine {
    pub fn new(config: &NegotiatorConfig) -> Self {
        Self::with_store(config, InMemorySessionCache::new(config.cache.ttl()))
    }
}

impl<S: SessionStore<StakeholderAnalysis>> NegotiationEngine<S> {
    pub fn with_store(config: &NegotiatorConfig, store: S) -> Self {
        Self {
            store,
            validator: StakeholderValidator::new(config.limits.clone()),
            scorer: SalienceScorer::new(config.scoring),
            landscape: LandscapeAnalyzer::new(config.landscape.clone()),
            synthesizer: LeverageSynthesizer::new(config.scoring, config.leverage.clone()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate, score and map the request, then cache it under `session_key`.
    ///
    /// Any validation failure aborts before the cache is touched, so a failed
    /// call never disturbs the session's previous analysis.
    pub fn analyze_stakeholders(
        &self,
        session_key: &str,
        request: AnalysisRequest,
    ) -> Result<Arc<StakeholderAnalysis>> {
        self.validator.validate_session_key(session_key)?;
        self.validator.validate_request(&request)?;

        let stakeholders = self.scorer.rank(&request.stakeholders);
        let graph = InfluenceGraph::build(&request.stakeholders);
        let analysis = StakeholderAnalysis {
            analysis_id: Uuid::new_v4(),
            context: request.context,
            analyzed_at: DateTime::<Utc>::from(self.store.now()),
            priority_summary: self.landscape.priority_summary(&stakeholders),
            relationships: self.landscape.relationships(&graph),
            engagement_strategies: self.landscape.engagement_strategies(&stakeholders),
            stakeholders,
            graph,
        };

        for warning in analysis.warnings() {
            warn!(session_key = %session_key, "{}", warning);
        }

        let entry = self.store.put(session_key, analysis);
        info!(
            session_key = %session_key,
            analysis_id = %entry.value.analysis_id,
            stakeholders = entry.value.stakeholders.len(),
            connections = entry.value.relationships.total_connections,
            "Stakeholder analysis cached"
        );
        Ok(entry.value)
    }

    /// Plan for `target`. An explicit stakeholder list takes precedence over
    /// the session's cached analysis and is never cached itself.
    pub fn leverage_influence(
        &self,
        session_key: &str,
        target: &str,
        stakeholders: Option<Vec<Stakeholder>>,
    ) -> Result<LeveragePlan> {
        self.validator.validate_session_key(session_key)?;

        let plan = match stakeholders {
            Some(stakeholders) => {
                self.validator.validate_stakeholders(&stakeholders)?;
                let ranked = self.scorer.rank(&stakeholders);
                let graph = InfluenceGraph::build(&stakeholders);
                debug!(session_key = %session_key, "Synthesizing from explicit stakeholder payload");
                self.synthesizer.synthesize(&ranked, &graph, target, None)?
            }
            None => {
                let analysis = self.cached(session_key)?;
                debug!(
                    session_key = %session_key,
                    analysis_id = %analysis.analysis_id,
                    "Synthesizing from cached analysis"
                );
                self.synthesizer.synthesize(
                    &analysis.stakeholders,
                    &analysis.graph,
                    target,
                    Some(analysis.analysis_id),
                )?
            }
        };

        info!(
            session_key = %session_key,
            target = %plan.target,
            approach = %plan.primary_approach,
            "Leverage plan ready"
        );
        Ok(plan)
    }

    pub fn get_analysis_age(&self, session_key: &str) -> Result<AnalysisAge> {
        self.validator.validate_session_key(session_key)?;
        let entry = self
            .store
            .get(session_key)
            .ok_or_else(|| no_cached_analysis(session_key))?;

        let now = self.store.now();
        Ok(AnalysisAge {
            session_key: session_key.to_string(),
            analysis_id: entry.value.analysis_id,
            analyzed_at: entry.value.analyzed_at,
            age_secs: entry.age(now).as_secs(),
            remaining_secs: whole_secs_rounded_up(entry.remaining(now)),
        })
    }

    /// Latest live analysis for `session_key`
    pub fn cached(&self, session_key: &str) -> Result<Arc<StakeholderAnalysis>> {
        self.store
            .get(session_key)
            .map(|entry| entry.value)
            .ok_or_else(|| no_cached_analysis(session_key))
    }
}

/// Zero only once the entry is expired.
fn whole_secs_rounded_up(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

fn no_cached_analysis(session_key: &str) -> NegotiationError {
    NegotiationError::NoCachedAnalysis {
        session_key: session_key.to_string(),
    }
}
