//! Query shape for pattern retrieval (SPEC_FULL.md §4.D Relevance Engine).

#[derive(Clone, Debug, Default)]
pub struct RelevanceQuery {
    pub text: String,
    pub language: Option<String>,
    pub tags: Vec<String>,
}
