pub mod domain;
pub mod parser;
pub mod ports;
pub mod prompt;

pub use domain::{Difficulty, DocumentPayload, Module, ModuleSeed, Paper, Question};
pub use parser::{parse_question_reply, strip_code_fence};
pub use ports::{
    BlobStore, CatalogService, GatewayError, ParseError, PipelineError, PlanGenerationService,
    QuestionGenerationService, StorageError,
};
pub use prompt::{build_plan_prompt, build_question_prompt};
