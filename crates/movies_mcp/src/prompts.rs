//! Prompt handlers and argument completion.

use crate::protocol::{
    CompleteParams, CompleteResult, Completion, ContentBlock, PromptArgument, PromptDescriptor,
    PromptGetResult, PromptMessage,
};
use movies_domain::{DomainError, Result};
use movies_db::MoviesDb;
use serde_json::Value;

const PROMPT_RECOMMENDATION: &str = "movie_recommendation";
const PROMPT_ANALYSIS: &str = "movie_analysis";

/// Completion responses cap out at 100 values.
const MAX_COMPLETIONS: usize = 100;

/// Registry of the fixed prompt set.
pub struct PromptRegistry {
    db: MoviesDb,
}

impl PromptRegistry {
    pub fn new(db: MoviesDb) -> Self {
        Self { db }
    }

    /// Descriptors for prompts/list.
    pub fn list(&self) -> Vec<PromptDescriptor> {
        vec![
            PromptDescriptor {
                name: PROMPT_RECOMMENDATION.to_string(),
                description: "Ask for movie recommendations from the catalog".to_string(),
                arguments: vec![PromptArgument {
                    name: "genre".to_string(),
                    description: "Restrict recommendations to one genre".to_string(),
                    required: false,
                }],
            },
            PromptDescriptor {
                name: PROMPT_ANALYSIS.to_string(),
                description: "Ask for an analysis of one movie".to_string(),
                arguments: vec![PromptArgument {
                    name: "title".to_string(),
                    description: "Title of the movie to analyze".to_string(),
                    required: true,
                }],
            },
        ]
    }

    /// Render a prompt for prompts/get.
    pub fn get(&self, name: &str, arguments: Option<&Value>) -> Result<PromptGetResult> {
        match name {
            PROMPT_RECOMMENDATION => {
                let genre = string_arg(arguments, "genre");
                let text = match genre {
                    Some(genre) => format!(
                        "Recommend five {genre} movies from this catalog. Use the \
                         search_movies and movie_recommendation_engine tools, and explain \
                         each pick in one sentence."
                    ),
                    None => "Recommend five movies from this catalog. Use the \
                             movie_recommendation_engine tool and explain each pick in one \
                             sentence."
                        .to_string(),
                };
                Ok(prompt_result("Movie recommendation request", text))
            }
            PROMPT_ANALYSIS => {
                let title = string_arg(arguments, "title").ok_or_else(|| {
                    DomainError::validation("prompt movie_analysis requires argument: title")
                })?;
                let text = format!(
                    "Analyze the movie \"{title}\" from this catalog: fetch it with \
                     search_movies, list its cast with get_movie_cast, and summarize its \
                     place in the director's career using director_career_analysis."
                );
                Ok(prompt_result("Movie analysis request", text))
            }
            _ => Err(DomainError::validation(format!("unknown prompt: {name}"))),
        }
    }

    /// completion/complete: the `genre` prompt argument completes from the
    /// store's genre histogram; everything else completes empty.
    pub async fn complete(&self, params: &CompleteParams) -> Result<CompleteResult> {
        let is_genre_arg = params.reference.ref_type == "ref/prompt"
            && params.reference.name.as_deref() == Some(PROMPT_RECOMMENDATION)
            && params.argument.name == "genre";

        if !is_genre_arg {
            return Ok(empty_completion());
        }

        let prefix = params.argument.value.trim().to_lowercase();
        let values: Vec<String> = self
            .db
            .genre_histogram()
            .await?
            .into_iter()
            .map(|(label, _)| label)
            .filter(|label| prefix.is_empty() || label.to_lowercase().starts_with(&prefix))
            .take(MAX_COMPLETIONS)
            .collect();

        Ok(CompleteResult {
            completion: Completion {
                total: values.len(),
                has_more: false,
                values,
            },
        })
    }
}

fn prompt_result(description: &str, text: String) -> PromptGetResult {
    PromptGetResult {
        description: description.to_string(),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ContentBlock::text(text),
        }],
    }
}

fn string_arg(arguments: Option<&Value>, name: &str) -> Option<String> {
    arguments
        .and_then(|args| args.get(name))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn empty_completion() -> CompleteResult {
    CompleteResult {
        completion: Completion {
            values: Vec::new(),
            total: 0,
            has_more: false,
        },
    }
}
