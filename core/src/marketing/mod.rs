//! Self-marketing: propositions, ROI, capabilities, differentiation and trust

pub mod capabilities;
pub mod differentiators;
pub mod package;
pub mod propositions;
pub mod roi;
pub mod trust;

pub use capabilities::{CapabilityShowcase, RelevantCapabilities};
pub use differentiators::{CompetitiveDifferentiator, Competitor};
pub use package::{MarketingPackage, MarketingRequest, SelfMarketingModule};
pub use propositions::ValuePropositionGenerator;
pub use roi::{RoiAnalysis, RoiCalculator, RoiInput};
pub use trust::{TrustArea, TrustBuilder};
