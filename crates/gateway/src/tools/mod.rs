//! Side tools the pipeline uses around the agent steps: Wikipedia lookups to
//! enrich research input, and the pitch-file writer for finished documents.
//! Both are best-effort — their failures degrade a run, never abort it.

pub mod pitch_file;
pub mod wikipedia;

pub use pitch_file::write_pitch;
pub use wikipedia::WikipediaClient;
