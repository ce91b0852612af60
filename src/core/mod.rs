// Core algorithm exports
pub mod assembler;
pub mod compatibility;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod partition;
pub mod preferences;
pub mod stability;

pub use assembler::assemble_matches;
pub use compatibility::{Admits, LabelCatalog, PreferenceRule};
pub use engine::{DeferredAcceptance, EngineOutcome, ProposerState};
pub use error::{CatalogError, MatchError};
pub use matcher::{run_matching, run_matching_seeded, MatchOutcome, Matcher};
pub use partition::{FixedSampler, RandomSampler, SidePartition, SideSampler};
pub use preferences::{PreferenceBuilder, PreferenceTable};
pub use stability::blocking_pairs;
