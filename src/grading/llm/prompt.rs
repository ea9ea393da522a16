//! Prompt construction for the LLM grading service.

use crate::grading::feedback::FeedbackCategory;
use crate::grading::types::{Assignment, Grade};

/// Characters of assignment text included in the prompt.
pub const MAX_CONTENT_CHARS: usize = 24_000;

/// Builds the grading prompt for an assignment.
pub fn build_grading_prompt(assignment: &Assignment) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Du er en erfaren censor. Vurder opgaven nedenfor efter 7-trinsskalaen \
         og giv konkret, citatbaseret feedback.\n\n## Karakterskala\n\n",
    );
    let scale: Vec<&str> = Grade::ALL.iter().map(|g| g.symbol()).collect();
    prompt.push_str(&format!("{}\n\n", scale.join(", ")));

    prompt.push_str("## Kategorier\n\n");
    for category in FeedbackCategory::known() {
        prompt.push_str(&format!("- {}\n", category.label()));
    }

    prompt.push_str(
        r#"
## Format for feedback

Hver styrke starter med kategorien efterfulgt af kolon, fx "Sprog: Flydende og præcist".

Hvert forbedringspunkt følger dette format præcist:

Kategori: kort beskrivelse [CITAT: "ordret uddrag"] OMSKRIV TIL: "forslag" FORBEDRING: hvorfor ændringen hjælper

Flere [CITAT: "..."] OMSKRIV TIL: "..." par må gentages før FORBEDRING.

## Svarformat

Svar kun med JSON:

```json
{"grade": "7", "reasoning": "...", "strengths": ["..."], "improvements": ["..."]}
```

"#,
    );

    prompt.push_str("## Opgave\n\n");
    if let Some(subject) = &assignment.subject {
        prompt.push_str(&format!("**Fag**: {}\n", subject));
    }
    prompt.push_str(&format!(
        "**Antal ord**: {}\n\n",
        assignment.effective_word_count()
    ));

    match assignment.body() {
        Some(body) => {
            prompt.push_str("```\n");
            prompt.push_str(&truncate_content(body, MAX_CONTENT_CHARS));
            prompt.push_str("\n```\n");
        }
        None => prompt.push_str("(ingen tekst)\n"),
    }

    prompt
}

/// Truncate on a character boundary, marking the cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let truncated: String = content.chars().take(max_chars).collect();
    format!("{}\n... (afkortet)", truncated)
}
