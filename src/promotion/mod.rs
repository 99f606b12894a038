//! Promotion Evaluation
//!
//! Decides whether a member qualifies for a rank, who approves it, and which
//! citations to render.
//!
//! ## Architecture
//!
//! ```text
//! RecordProvider/RuleConfig → Eligibility + Qualification → Approver
//!                           → CitationRenderer → ArtifactSink
//! ```
//!
//! Collaborators (records, rendering, output) are traits injected into the
//! orchestrator at construction; there is no global state.

pub mod error;
pub mod types;
pub mod rules;
pub mod traits;
pub mod eligibility;
pub mod qualification;
pub mod position;
pub mod approver;
pub mod orchestrator;

pub use error::{ApproverError, ErrorKind, PromotionError, ProviderError, RenderError, SinkError};
pub use types::*;
pub use rules::{ApproverPolicy, CitationLayout, FieldLayout, RankDefinition, RuleConfig};
pub use traits::*;
pub use eligibility::{check_time_in_grade, eligible_on, months_between};
pub use qualification::{check_qualification, CoursePhase, SubstringQualificationDetector};
pub use position::{parse_position, UnitPosition};
pub use orchestrator::{has_ribbon_award, PromotionOrchestrator};
