use password_hash::rand_core::{OsRng, RngCore};

/// Identity references captured at checkout.
#[derive(Debug, Clone, Copy)]
pub struct IdentityDocuments<'a> {
    pub gov_id_front: &'a str,
    pub gov_id_back: &'a str,
    pub selfie: &'a str,
}

impl IdentityDocuments<'_> {
    pub fn is_complete(&self) -> bool {
        [self.gov_id_front, self.gov_id_back, self.selfie]
            .iter()
            .all(|r| !r.trim().is_empty())
    }
}

/// Face-match seam between a customer's selfie and government ID.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, documents: &IdentityDocuments<'_>) -> bool;
}

/// Simulated face match. No biometric comparison is performed: complete
/// documents pass with probability `pass_rate`.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedVerifier {
    pass_rate: f64,
}

impl SimulatedVerifier {
    pub fn new(pass_rate: f64) -> Self {
        Self {
            pass_rate: pass_rate.clamp(0.0, 1.0),
        }
    }
}

impl IdentityVerifier for SimulatedVerifier {
    fn verify(&self, documents: &IdentityDocuments<'_>) -> bool {
        if !documents.is_complete() {
            return false;
        }
        let roll = OsRng.next_u32() as f64 / (u32::MAX as f64 + 1.0);
        roll < self.pass_rate
    }
}

/// Verifier with a predetermined outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedVerifier(pub bool);

impl IdentityVerifier for FixedVerifier {
    fn verify(&self, documents: &IdentityDocuments<'_>) -> bool {
        self.0 && documents.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: IdentityDocuments<'static> = IdentityDocuments {
        gov_id_front: "front.jpg",
        gov_id_back: "back.jpg",
        selfie: "selfie.jpg",
    };

    #[test]
    fn extreme_pass_rates_are_deterministic() {
        let always = SimulatedVerifier::new(1.5);
        let never = SimulatedVerifier::new(0.0);
        for _ in 0..50 {
            assert!(always.verify(&DOCS));
            assert!(!never.verify(&DOCS));
        }
    }

    #[test]
    fn incomplete_documents_never_pass() {
        let docs = IdentityDocuments {
            selfie: " ",
            ..DOCS
        };
        assert!(!FixedVerifier(true).verify(&docs));
        assert!(!SimulatedVerifier::new(1.0).verify(&docs));
        assert!(FixedVerifier(true).verify(&DOCS));
    }
}
