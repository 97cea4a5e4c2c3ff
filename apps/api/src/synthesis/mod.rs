// Document synthesis: turns a finished transcript into the brag doc entry.

pub mod prompts;
pub mod synthesizer;
