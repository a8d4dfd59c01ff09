// src/enrich/prompts.rs
//! Prompt templates. Pure functions of article fields.

use crate::ingest::types::Article;

pub fn validate_prompt(a: &Article) -> String {
    format!(
        r#"
Analyze this news article and provide validation:

Title: {title}
Source: {source}
Summary: {summary}
URL: {url}

Please validate:
1. Does this appear to be a legitimate news article?
2. Is the source credible?
3. Does the content seem factual and well-written?
4. Rate credibility from 1-10

Respond in JSON format:
{{
  "isLegitimate": boolean,
  "credibilityScore": number,
  "sourceCredible": boolean,
  "contentQuality": "high|medium|low",
  "concerns": ["list of any concerns"],
  "recommendation": "approve|review|reject"
}}
"#,
        title = a.title,
        source = a.source_name,
        summary = a.summary,
        url = a.url,
    )
}

pub fn alternative_prompt(a: &Article, reason: &str) -> String {
    format!(
        r#"
The original news article link is broken. Generate alternative content based on the available information:

Original Title: {title}
Original Source: {source}
Original Summary: {summary}
Reason: {reason}

Create a replacement article with:
1. A similar but not identical title
2. A comprehensive summary covering the same topic
3. Suggest 3 alternative reliable sources where this story might be found
4. Maintain the same business/financial focus

Respond in JSON format:
{{
  "title": "Alternative title",
  "summary": "Detailed summary",
  "alternativeSources": [
    {{"name": "Source Name", "url": "https://example.com", "reason": "Why this source is relevant"}}
  ],
  "confidence": number,
  "disclaimer": "Note about generated content"
}}
"#,
        title = a.title,
        source = a.source_name,
        summary = a.summary,
    )
}

pub fn enhance_prompt(a: &Article) -> String {
    format!(
        r#"
Enhance this business news article summary to be more informative and engaging:

Title: {title}
Current Summary: {summary}
Source: {source}

Create an enhanced summary that:
1. Is 2-3 sentences long
2. Highlights key business implications
3. Maintains factual accuracy
4. Is engaging but professional
5. Includes relevant business context

Return only the enhanced summary text, no JSON or formatting.
"#,
        title = a.title,
        summary = a.summary,
        source = a.source_name,
    )
}

pub const QUIZ_ARTICLE_LIMIT: usize = 5;

pub fn quiz_prompt(articles: &[Article]) -> String {
    let articles_text = articles
        .iter()
        .take(QUIZ_ARTICLE_LIMIT)
        .map(|a| {
            format!(
                "Title: {}\nSource: {}\nSummary: {}",
                a.title, a.source_name, a.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"
Based on these business news articles, create 5 multiple-choice quiz questions:

{articles_text}

For each question, create:
1. A clear question about the article content
2. 4 multiple choice options (A, B, C, D)
3. Indicate the correct answer
4. Provide a brief explanation

Format as JSON:
{{
  "questions": [
    {{
      "question": "Question text",
      "options": ["A) Option 1", "B) Option 2", "C) Option 3", "D) Option 4"],
      "correctAnswer": 0,
      "explanation": "Why this is correct",
      "sourceArticle": "Article title"
    }}
  ]
}}
"#
    )
}
