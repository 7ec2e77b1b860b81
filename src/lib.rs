pub mod answer;
pub mod browser;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod fields;
pub mod filler;
pub mod llm;
pub mod page;
pub mod panel;
pub mod parser;
pub mod resume;
pub mod sections;

pub use browser::FillerBrowser;
pub use config::Config;
pub use error::{Error, Result};
pub use fields::FormField;
pub use filler::{FillReport, FormFiller};
pub use llm::LlmClient;
pub use resume::ResumeDocument;
