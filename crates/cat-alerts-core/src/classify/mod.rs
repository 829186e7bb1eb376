pub mod consequence;
pub mod outcome;
pub mod risk_factor;

pub use consequence::{Consequence, ConsequenceClassifier, ConsequencePredicate, FnPredicate};
pub use outcome::RiskFactorAssignment;
