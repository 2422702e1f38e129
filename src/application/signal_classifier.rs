use crate::domain::analysis::{
    BollingerZone, FeatureVector, Recommendation, RsiThresholds, RsiZone,
};
use crate::domain::ports::RecommendationModel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Which policy produces the final recommendation
#[derive(Clone)]
pub enum ModelPolicy {
    /// No model configured; the threshold rules decide
    RuleBased,
    Model(Arc<dyn RecommendationModel>),
    /// A model was configured but could not be loaded
    Unavailable(String),
}

impl std::fmt::Debug for ModelPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelPolicy::RuleBased => write!(f, "RuleBased"),
            ModelPolicy::Model(model) => write!(f, "Model({})", model.name()),
            ModelPolicy::Unavailable(reason) => write!(f, "Unavailable({})", reason),
        }
    }
}

pub struct SignalClassifier {
    thresholds: RsiThresholds,
    policy: ModelPolicy,
    failure_logged: AtomicBool,
}

impl SignalClassifier {
    pub fn new(thresholds: RsiThresholds, policy: ModelPolicy) -> Self {
        match &policy {
            ModelPolicy::RuleBased => info!("SignalClassifier: Using rule-based recommendations"),
            ModelPolicy::Model(model) => {
                info!("SignalClassifier: Using model '{}'", model.name())
            }
            ModelPolicy::Unavailable(reason) => warn!(
                "SignalClassifier: Recommendation model unavailable ({}). Recommendations will be reported as UNAVAILABLE.",
                reason
            ),
        }

        Self {
            thresholds,
            // An unavailable policy has already been reported above
            failure_logged: AtomicBool::new(matches!(policy, ModelPolicy::Unavailable(_))),
            policy,
        }
    }

    pub fn classify(
        &self,
        price: f64,
        rsi: f64,
        bollinger_upper: f64,
        bollinger_lower: f64,
    ) -> (BollingerZone, RsiZone) {
        (
            BollingerZone::classify(price, bollinger_upper, bollinger_lower),
            RsiZone::classify(rsi, self.thresholds),
        )
    }

    /// Threshold policy. RSI decides the lean; a Bollinger reading on the
    /// opposite side cancels it.
    pub fn rule_signal(rsi_zone: RsiZone, bollinger_zone: BollingerZone) -> Recommendation {
        match (rsi_zone, bollinger_zone) {
            (RsiZone::Oversold, BollingerZone::AboveUpper) => Recommendation::Hold,
            (RsiZone::Oversold, _) => Recommendation::Buy,
            (RsiZone::Overbought, BollingerZone::BelowLower) => Recommendation::Hold,
            (RsiZone::Overbought, _) => Recommendation::Sell,
            (RsiZone::Neutral, _) => Recommendation::Hold,
        }
    }

    pub fn rule_based(&self, features: &FeatureVector) -> Recommendation {
        let (bollinger_zone, rsi_zone) = self.classify(
            features.price,
            features.rsi,
            features.bb_upper,
            features.bb_lower,
        );
        Self::rule_signal(rsi_zone, bollinger_zone)
    }

    /// Final recommendation. Never errors: a model that cannot answer
    /// yields `Unavailable`.
    pub fn recommend(&self, features: &FeatureVector) -> Recommendation {
        match &self.policy {
            ModelPolicy::RuleBased => self.rule_based(features),
            ModelPolicy::Unavailable(_) => Recommendation::Unavailable,
            ModelPolicy::Model(model) => match model.predict(features) {
                Ok(label) => label.into(),
                Err(e) => {
                    if !self.failure_logged.swap(true, Ordering::Relaxed) {
                        warn!(
                            "SignalClassifier: Model '{}' failed ({}). Further failures will not be logged.",
                            model.name(),
                            e
                        );
                    }
                    Recommendation::Unavailable
                }
            },
        }
    }
}
