pub mod blob;
pub mod catalog;
pub mod plan_llm;
pub mod question_llm;

pub use blob::FsBlobAdapter;
pub use catalog::MemoryCatalogAdapter;
pub use plan_llm::OpenAiPlanAdapter;
pub use question_llm::OpenAiQuestionAdapter;
