//! Photo capture and classification flow for a new debris report.
//!
//! `camera -> classifying -> confirm`, with `retake` returning to `camera`.
//! A classification is only ever attached once per capture cycle.

use crate::models::types::{CaptureStep, DebrisType, Quantity};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub debris_type: DebrisType,
    pub confidence: u8,
}

/// Stand-in for the image model. Implementations must not block on I/O.
pub trait Classifier: Send + Sync {
    fn classify(&self, photo: Option<&[u8]>) -> Classification;

    /// How long a capture stays at `classifying` before the result is due.
    fn latency(&self) -> Duration {
        Duration::ZERO
    }
}

/// Always answers with the same label.
pub struct FixedClassifier {
    result: Classification,
    latency: Duration,
}

impl FixedClassifier {
    pub fn new(debris_type: DebrisType, confidence: u8) -> Self {
        FixedClassifier {
            result: Classification {
                debris_type,
                confidence: confidence.min(100),
            },
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for FixedClassifier {
    fn default() -> Self {
        FixedClassifier::new(DebrisType::Plastic, 87)
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _photo: Option<&[u8]>) -> Classification {
        self.result
    }

    fn latency(&self) -> Duration {
        self.latency
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while the capture is at the {step} step")]
pub struct TransitionError {
    pub action: &'static str,
    pub step: CaptureStep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub debris_type: DebrisType,
    pub quantity: Quantity,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFlow {
    step: CaptureStep,
    classification: Option<Classification>,
}

impl Default for CaptureFlow {
    fn default() -> Self {
        CaptureFlow {
            step: CaptureStep::Camera,
            classification: None,
        }
    }
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a flow from stored parts. A classification is only kept at
    /// the confirm step.
    pub fn restore(step: CaptureStep, classification: Option<Classification>) -> Self {
        let classification = match step {
            CaptureStep::Confirm => classification,
            _ => None,
        };
        match (step, classification) {
            (CaptureStep::Confirm, None) => CaptureFlow::default(),
            (step, classification) => CaptureFlow {
                step,
                classification,
            },
        }
    }

    pub fn step(&self) -> CaptureStep {
        self.step
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    fn reject(&self, action: &'static str) -> TransitionError {
        TransitionError {
            action,
            step: self.step,
        }
    }

    pub fn capture(&mut self) -> Result<(), TransitionError> {
        if self.step != CaptureStep::Camera {
            return Err(self.reject("capture"));
        }
        self.step = CaptureStep::Classifying;
        Ok(())
    }

    pub fn classified(&mut self, result: Classification) -> Result<(), TransitionError> {
        if self.step != CaptureStep::Classifying {
            return Err(self.reject("classify"));
        }
        self.classification = Some(result);
        self.step = CaptureStep::Confirm;
        Ok(())
    }

    pub fn retake(&mut self) -> Result<(), TransitionError> {
        if self.step == CaptureStep::Camera {
            return Err(self.reject("retake"));
        }
        self.classification = None;
        self.step = CaptureStep::Camera;
        Ok(())
    }

    pub fn submit(&self, quantity: Quantity) -> Result<ReportDraft, TransitionError> {
        match (self.step, self.classification) {
            (CaptureStep::Confirm, Some(c)) => Ok(ReportDraft {
                debris_type: c.debris_type,
                quantity,
                confidence: c.confidence,
            }),
            _ => Err(self.reject("submit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plastic() -> Classification {
        FixedClassifier::default().classify(None)
    }

    #[test]
    fn test_classifying_only_after_capture() {
        let mut flow = CaptureFlow::new();
        assert_eq!(flow.step(), CaptureStep::Camera);
        assert!(flow.classified(plastic()).is_err());
        flow.capture().unwrap();
        assert_eq!(flow.step(), CaptureStep::Classifying);
    }

    #[test]
    fn test_confirm_once_per_cycle() {
        let mut flow = CaptureFlow::new();
        flow.capture().unwrap();
        flow.classified(plastic()).unwrap();
        assert_eq!(flow.step(), CaptureStep::Confirm);
        let err = flow.classified(plastic()).unwrap_err();
        assert_eq!(err.step, CaptureStep::Confirm);
        assert!(flow.capture().is_err());
    }

    #[test]
    fn test_retake_discards_classification() {
        let mut flow = CaptureFlow::new();
        flow.capture().unwrap();
        flow.classified(plastic()).unwrap();
        flow.retake().unwrap();
        assert_eq!(flow.step(), CaptureStep::Camera);
        assert_eq!(flow.classification(), None);
        assert!(flow.submit(Quantity::Low).is_err());
        assert!(flow.retake().is_err());
    }

    #[test]
    fn test_submit_builds_draft() {
        let mut flow = CaptureFlow::new();
        flow.capture().unwrap();
        flow.classified(plastic()).unwrap();
        let draft = flow.submit(Quantity::High).unwrap();
        assert_eq!(draft.debris_type, DebrisType::Plastic);
        assert_eq!(draft.confidence, 87);
        assert_eq!(draft.quantity, Quantity::High);
    }

    #[test]
    fn test_restore_drops_stray_classification() {
        let flow = CaptureFlow::restore(CaptureStep::Classifying, Some(plastic()));
        assert_eq!(flow.classification(), None);
        let flow = CaptureFlow::restore(CaptureStep::Confirm, None);
        assert_eq!(flow.step(), CaptureStep::Camera);
    }

    #[test]
    fn test_fixed_classifier_clamps_confidence() {
        let c = FixedClassifier::new(DebrisType::Glass, 140).classify(None);
        assert_eq!(c.confidence, 100);
    }
}
