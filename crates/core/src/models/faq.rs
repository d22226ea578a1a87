//! FAQs and their translations.

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::types::{FaqId, Language, StoreId, TranslationId};
use crate::validation::FieldErrors;

pub const MAX_QUESTION_CHARS: usize = 1000;
pub const MAX_ANSWER_CHARS: usize = 3000;

/// Where a FAQ lives. Global FAQs have no store; store FAQs have exactly one,
/// so `is_global` and `store_id` can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaqScope {
    Global,
    Store(StoreId),
}

impl FaqScope {
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }

    #[must_use]
    pub const fn store_id(self) -> Option<StoreId> {
        match self {
            Self::Global => None,
            Self::Store(id) => Some(id),
        }
    }

    /// Rebuild from the persisted pair.
    #[must_use]
    pub const fn from_store_id(store_id: Option<StoreId>) -> Self {
        match store_id {
            Some(id) => Self::Store(id),
            None => Self::Global,
        }
    }
}

/// A persisted translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Translation {
    pub id: TranslationId,
    pub faq_id: FaqId,
    pub language: Language,
    pub question: String,
    pub answer: String,
}

impl Translation {
    /// Field checks on an already-persisted translation.
    pub fn check(&self, errors: &mut FieldErrors) {
        check_question(&self.question, errors);
        check_answer(&self.answer, errors);
    }
}

/// A FAQ with its category and every live translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub id: FaqId,
    pub category: Category,
    pub scope: FaqScope,
    pub default_language: Language,
    /// Bumped on every write to the FAQ or its translations.
    pub version: i32,
    pub translations: Vec<Translation>,
}

impl Faq {
    #[must_use]
    pub fn translation(&self, language: Language) -> Option<&Translation> {
        self.translations.iter().find(|t| t.language == language)
    }

    #[must_use]
    pub fn default_translation(&self) -> Option<&Translation> {
        self.translation(self.default_language)
    }

    #[must_use]
    pub fn has_language(&self, language: Language) -> bool {
        self.translation(language).is_some()
    }
}

/// Translation fields as they arrive from a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationInput {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Validated translation content, ready to insert or apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationDraft {
    pub language: Language,
    pub question: String,
    pub answer: String,
}

impl TranslationInput {
    /// Validate every field, recording all failures. Returns a draft only when
    /// this input contributed no errors.
    pub fn check(&self, errors: &mut FieldErrors) -> Option<TranslationDraft> {
        let before = errors.len();
        let language = check_language(&self.language, "language", errors);
        let question = check_question(&self.question, errors);
        let answer = check_answer(&self.answer, errors);

        match language {
            Some(language) if errors.len() == before => Some(TranslationDraft {
                language,
                question,
                answer,
            }),
            _ => None,
        }
    }
}

/// Parse a language code, recording `invalid language` under `key`.
pub fn check_language(raw: &str, key: &str, errors: &mut FieldErrors) -> Option<Language> {
    raw.trim()
        .parse::<Language>()
        .inspect_err(|_| errors.add(key, "invalid language"))
        .ok()
}

fn check_question(raw: &str, errors: &mut FieldErrors) -> String {
    let question = raw.trim();
    errors.check(!question.is_empty(), "question", "required");
    errors.check(
        question.chars().count() <= MAX_QUESTION_CHARS,
        "question",
        "must not be longer than 1000 characters",
    );
    question.to_owned()
}

fn check_answer(raw: &str, errors: &mut FieldErrors) -> String {
    let answer = raw.trim();
    errors.check(!answer.is_empty(), "answer", "required");
    errors.check(
        answer.chars().count() <= MAX_ANSWER_CHARS,
        "answer",
        "must not be longer than 3000 characters",
    );
    answer.to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    fn input(language: &str, question: &str, answer: &str) -> TranslationInput {
        TranslationInput {
            language: language.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    #[test]
    fn test_valid_input_yields_trimmed_draft() {
        let mut errors = FieldErrors::new();
        let draft = input("en", " How? ", " Like this. ").check(&mut errors).unwrap();
        assert_eq!(draft.language, Language::En);
        assert_eq!(draft.question, "How?");
        assert_eq!(draft.answer, "Like this.");
    }

    #[test]
    fn test_reports_every_field() {
        let mut errors = FieldErrors::new();
        assert!(input("fr", "", &"a".repeat(3001)).check(&mut errors).is_none());
        assert_eq!(errors.get("language"), Some("invalid language"));
        assert_eq!(errors.get("question"), Some("required"));
        assert_eq!(
            errors.get("answer"),
            Some("must not be longer than 3000 characters")
        );
    }

    #[test]
    fn test_question_limit() {
        let mut errors = FieldErrors::new();
        assert!(input("ar", &"q".repeat(1000), "a").check(&mut errors).is_some());
        assert!(input("ar", &"q".repeat(1001), "a").check(&mut errors).is_none());
    }

    #[test]
    fn test_scope_round_trip() {
        assert_eq!(FaqScope::from_store_id(None), FaqScope::Global);
        let scoped = FaqScope::from_store_id(Some(StoreId::new(4)));
        assert!(!scoped.is_global());
        assert_eq!(scoped.store_id(), Some(StoreId::new(4)));
    }

    #[test]
    fn test_default_translation_lookup() {
        let faq = Faq {
            id: FaqId::new(1),
            category: Category {
                id: CategoryId::new(1),
                name: "billing".into(),
            },
            scope: FaqScope::Global,
            default_language: Language::En,
            version: 1,
            translations: vec![Translation {
                id: TranslationId::new(1),
                faq_id: FaqId::new(1),
                language: Language::En,
                question: "q".into(),
                answer: "a".into(),
            }],
        };
        assert!(faq.default_translation().is_some());
        assert!(!faq.has_language(Language::Ar));
    }
}
