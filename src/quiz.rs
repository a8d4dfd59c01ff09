// src/quiz.rs
//! "Name the publication" daily quiz built from the current briefing.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::ingest::types::Article;

pub const QUIZ_QUESTIONS: usize = 3;
pub const POINTS_PER_QUESTION: usize = 10;
const WRONG_OPTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuestion {
    pub id: String,
    pub article_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub source_name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuiz {
    pub questions: Vec<SourceQuestion>,
    pub max_score: usize,
}

/// Response body of `/api/quiz/daily`: either quiz flavour plus a flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse<T> {
    #[serde(flatten)]
    pub quiz: T,
    pub ai_generated: bool,
}

pub fn daily_quiz<R: Rng + ?Sized>(articles: &[Article], rng: &mut R) -> DailyQuiz {
    let mut unique_sources: Vec<&str> = Vec::new();
    for a in articles {
        let s = a.source_name.as_str();
        if !s.is_empty() && !unique_sources.contains(&s) {
            unique_sources.push(s);
        }
    }

    let mut pool: Vec<&Article> = articles.iter().collect();
    pool.shuffle(rng);
    pool.truncate(QUIZ_QUESTIONS);

    let questions: Vec<SourceQuestion> = pool
        .into_iter()
        .enumerate()
        .map(|(idx, article)| {
            let correct = if article.source_name.is_empty() {
                "Unknown"
            } else {
                article.source_name.as_str()
            };

            let mut wrong: Vec<&str> = unique_sources
                .iter()
                .copied()
                .filter(|s| *s != correct)
                .collect();
            wrong.shuffle(rng);
            wrong.truncate(WRONG_OPTIONS);

            let mut options: Vec<String> = std::iter::once(correct)
                .chain(wrong)
                .map(str::to_string)
                .collect();
            options.shuffle(rng);
            let correct_index = options.iter().position(|o| o == correct).unwrap_or(0);

            SourceQuestion {
                id: if article.id.is_empty() {
                    format!("q-{idx}")
                } else {
                    article.id.clone()
                },
                article_id: article.id.clone(),
                question: format!("Which publication is the source of: \"{}\"?", article.title),
                options,
                correct_index,
                explanation: format!(
                    "This headline is from {correct}. You can read the full article on their site."
                ),
                source_name: correct.to_string(),
                title: article.title.clone(),
            }
        })
        .collect();

    DailyQuiz {
        max_score: questions.len() * POINTS_PER_QUESTION,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn art(id: &str, source: &str) -> Article {
        Article {
            id: id.into(),
            title: format!("headline {id}"),
            source_name: source.into(),
            ..Default::default()
        }
    }

    #[test]
    fn options_contain_the_correct_source_once() {
        let articles = vec![
            art("1", "Reuters"),
            art("2", "Bloomberg"),
            art("3", "FT"),
            art("4", "WSJ"),
            art("5", "Reuters"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let quiz = daily_quiz(&articles, &mut rng);

        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.max_score, 30);
        for q in &quiz.questions {
            assert_eq!(q.options[q.correct_index], q.source_name);
            assert_eq!(q.options.iter().filter(|o| **o == q.source_name).count(), 1);
            assert!(q.options.len() <= 4);
        }
    }

    #[test]
    fn empty_briefing_gives_empty_quiz() {
        let quiz = daily_quiz(&[], &mut StdRng::seed_from_u64(1));
        assert!(quiz.questions.is_empty());
        assert_eq!(quiz.max_score, 0);
    }

    #[test]
    fn single_source_has_single_option() {
        let mut rng = StdRng::seed_from_u64(3);
        let quiz = daily_quiz(&[art("a", "Reuters")], &mut rng);
        assert_eq!(quiz.questions[0].options, vec!["Reuters".to_string()]);
        assert_eq!(quiz.questions[0].correct_index, 0);
    }
}
