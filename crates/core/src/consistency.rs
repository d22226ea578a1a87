//! FAQ and translation invariants.
//!
//! Every write to a FAQ aggregate is planned here before it reaches a
//! repository. A plan is the exact state to persist; repositories apply it
//! under the FAQ's version so concurrent writers cannot interleave.
//!
//! Invariants:
//! - a FAQ always has exactly one translation in its default language
//! - a FAQ has at most one translation per language
//! - global FAQs have no store and store FAQs have exactly one (see
//!   [`FaqScope`])

use thiserror::Error;

use crate::error::{FaqError, FaqResult};
use crate::models::{
    Category, Faq, FaqScope, TranslationDraft, TranslationInput, check_category_name,
    check_language,
};
use crate::types::{CategoryId, Language, StoreId, TranslationId};
use crate::validation::FieldErrors;

/// A FAQ to insert together with its first translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFaq {
    pub category_id: CategoryId,
    pub scope: FaqScope,
    pub default_language: Language,
    pub first: TranslationDraft,
}

/// Replacement content for an existing translation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationChange {
    pub id: TranslationId,
    pub draft: TranslationDraft,
}

/// Requested changes to a FAQ's own fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct FaqChanges {
    pub category: Option<Category>,
    pub default_language: Option<String>,
    pub is_global: Option<bool>,
    pub store_id: Option<StoreId>,
}

/// A broken aggregate, as found by [`check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("no translation in default language {0}")]
    MissingDefault(Language),
    #[error("more than one translation in {0}")]
    DuplicateLanguage(Language),
}

/// Plan a new FAQ. The default language is the first translation's language.
///
/// # Errors
///
/// Returns `FaqError::ValidationFailed` with every offending field.
pub fn plan_create(
    category: &Category,
    scope: FaqScope,
    input: &TranslationInput,
) -> FaqResult<NewFaq> {
    let mut errors = FieldErrors::new();
    check_category_name(&category.name, &mut errors);
    let draft = input.check(&mut errors);

    match draft {
        Some(first) if errors.is_empty() => Ok(NewFaq {
            category_id: category.id,
            scope,
            default_language: first.language,
            first,
        }),
        _ => Err(FaqError::ValidationFailed(errors)),
    }
}

/// Plan adding a translation. An existing language is a conflict, never an
/// overwrite.
///
/// # Errors
///
/// `ValidationFailed` for bad fields, `Duplicate` if the language exists.
pub fn plan_add_translation(faq: &Faq, input: &TranslationInput) -> FaqResult<TranslationDraft> {
    let draft = validated(input)?;
    if faq.has_language(draft.language) {
        return Err(FaqError::duplicate(format!(
            "translation {} for faq {}",
            draft.language, faq.id
        )));
    }
    Ok(draft)
}

/// Plan an in-place update of the translation currently in `language`.
///
/// A blank `input.language` keeps the current language. Moving the default
/// translation to another language would orphan the default, so it is a
/// conflict; moving a secondary translation onto a taken language is a
/// duplicate.
///
/// # Errors
///
/// `NotFound`, `ValidationFailed`, `EditConflict` or `Duplicate` as above.
pub fn plan_update_translation(
    faq: &Faq,
    language: Language,
    input: &TranslationInput,
) -> FaqResult<TranslationChange> {
    let current = faq
        .translation(language)
        .ok_or_else(|| FaqError::not_found("translation", format!("{}/{language}", faq.id)))?;

    let draft = if input.language.trim().is_empty() {
        let input = TranslationInput {
            language: language.code().to_owned(),
            ..input.clone()
        };
        validated(&input)?
    } else {
        validated(input)?
    };

    if draft.language != language {
        if language == faq.default_language {
            return Err(FaqError::conflict(
                "the default translation's language cannot be changed",
            ));
        }
        if faq.has_language(draft.language) {
            return Err(FaqError::duplicate(format!(
                "translation {} for faq {}",
                draft.language, faq.id
            )));
        }
    }

    Ok(TranslationChange {
        id: current.id,
        draft,
    })
}

/// Plan removing the translation in `language`. The default translation can
/// never be removed.
///
/// # Errors
///
/// `NotFound` if there is no such translation, `EditConflict` for the default.
pub fn plan_remove_translation(faq: &Faq, language: Language) -> FaqResult<TranslationId> {
    let target = faq
        .translation(language)
        .ok_or_else(|| FaqError::not_found("translation", format!("{}/{language}", faq.id)))?;

    if language == faq.default_language {
        return Err(FaqError::conflict(
            "the default-language translation cannot be deleted",
        ));
    }
    Ok(target.id)
}

/// Apply `changes` to a copy of `faq` and re-validate the whole aggregate,
/// translations included. All violations are reported together.
///
/// # Errors
///
/// Returns `FaqError::ValidationFailed` listing every offending field.
pub fn plan_update_faq(faq: &Faq, changes: FaqChanges) -> FaqResult<Faq> {
    let mut errors = FieldErrors::new();
    let mut candidate = faq.clone();

    if let Some(category) = changes.category {
        candidate.category = category;
    }
    if let Some(raw) = changes.default_language.as_deref()
        && let Some(language) = check_language(raw, "default_language", &mut errors)
    {
        candidate.default_language = language;
    }
    candidate.scope = resolve_scope(faq.scope, changes.is_global, changes.store_id, &mut errors);

    errors.merge_from(check_faq(&candidate));
    errors.into_result()?;
    Ok(candidate)
}

/// Field and invariant checks over a full FAQ aggregate.
#[must_use]
pub fn check_faq(faq: &Faq) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_category_name(&faq.category.name, &mut errors);

    for translation in &faq.translations {
        let mut own = FieldErrors::new();
        translation.check(&mut own);
        errors.merge_prefixed(&format!("translations.{}", translation.language), own);
    }

    match check_invariants(faq) {
        Ok(()) => {}
        Err(InvariantViolation::MissingDefault(_)) => {
            errors.add("default_language", "no translation exists for this language");
        }
        Err(violation @ InvariantViolation::DuplicateLanguage(_)) => {
            errors.add("translations", violation.to_string());
        }
    }
    errors
}

/// Structural invariants of a FAQ aggregate.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_invariants(faq: &Faq) -> Result<(), InvariantViolation> {
    for (i, translation) in faq.translations.iter().enumerate() {
        if faq
            .translations
            .iter()
            .skip(i + 1)
            .any(|t| t.language == translation.language)
        {
            return Err(InvariantViolation::DuplicateLanguage(translation.language));
        }
    }
    if faq.default_translation().is_none() {
        return Err(InvariantViolation::MissingDefault(faq.default_language));
    }
    Ok(())
}

fn resolve_scope(
    current: FaqScope,
    is_global: Option<bool>,
    store_id: Option<StoreId>,
    errors: &mut FieldErrors,
) -> FaqScope {
    match (is_global, store_id) {
        (None, None) => current,
        (Some(true), None) => FaqScope::Global,
        (Some(true), Some(_)) => {
            errors.add("store_id", "must be empty for a global faq");
            current
        }
        (Some(false) | None, Some(id)) => FaqScope::Store(id),
        (Some(false), None) => match current {
            FaqScope::Store(_) => current,
            FaqScope::Global => {
                errors.add("store_id", "required for a store faq");
                current
            }
        },
    }
}

fn validated(input: &TranslationInput) -> FaqResult<TranslationDraft> {
    let mut errors = FieldErrors::new();
    match input.check(&mut errors) {
        Some(draft) => Ok(draft),
        None => Err(FaqError::ValidationFailed(errors)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Translation;
    use crate::types::FaqId;

    fn billing() -> Category {
        Category {
            id: CategoryId::new(1),
            name: "billing".into(),
        }
    }

    fn input(language: &str, question: &str, answer: &str) -> TranslationInput {
        TranslationInput {
            language: language.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    fn translation(id: i32, language: Language) -> Translation {
        Translation {
            id: TranslationId::new(id),
            faq_id: FaqId::new(1),
            language,
            question: format!("question {language}"),
            answer: format!("answer {language}"),
        }
    }

    fn faq(languages: &[Language]) -> Faq {
        Faq {
            id: FaqId::new(1),
            category: billing(),
            scope: FaqScope::Global,
            default_language: Language::En,
            version: 1,
            translations: languages
                .iter()
                .zip(1..)
                .map(|(lang, id)| translation(id, *lang))
                .collect(),
        }
    }

    #[test]
    fn test_create_sets_default_language_from_first_translation() {
        let plan = plan_create(&billing(), FaqScope::Global, &input("ar", "q", "a")).unwrap();
        assert_eq!(plan.default_language, Language::Ar);
        assert_eq!(plan.first.language, Language::Ar);
    }

    #[test]
    fn test_create_aggregates_field_errors() {
        let err = plan_create(&billing(), FaqScope::Global, &input("xx", "", "")).unwrap_err();
        let FaqError::ValidationFailed(fields) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_add_existing_language_is_duplicate() {
        let err = plan_add_translation(&faq(&[Language::En]), &input("en", "q", "a")).unwrap_err();
        assert!(matches!(err, FaqError::Duplicate(_)));
    }

    #[test]
    fn test_add_new_language() {
        let draft = plan_add_translation(&faq(&[Language::En]), &input("ar", "q", "a")).unwrap();
        assert_eq!(draft.language, Language::Ar);
    }

    #[test]
    fn test_remove_default_is_conflict() {
        let f = faq(&[Language::En, Language::Ar]);
        assert!(matches!(
            plan_remove_translation(&f, Language::En),
            Err(FaqError::EditConflict(_))
        ));
        let only = faq(&[Language::En]);
        assert!(matches!(
            plan_remove_translation(&only, Language::En),
            Err(FaqError::EditConflict(_))
        ));
    }

    #[test]
    fn test_remove_secondary() {
        let f = faq(&[Language::En, Language::Ar]);
        assert_eq!(
            plan_remove_translation(&f, Language::Ar).unwrap(),
            TranslationId::new(2)
        );
        assert!(matches!(
            plan_remove_translation(&f, Language::De),
            Err(FaqError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_translation_in_place() {
        let f = faq(&[Language::En, Language::Ar]);
        let change = plan_update_translation(&f, Language::Ar, &input("", "new q", "new a")).unwrap();
        assert_eq!(change.id, TranslationId::new(2));
        assert_eq!(change.draft.language, Language::Ar);
        assert_eq!(change.draft.question, "new q");
    }

    #[test]
    fn test_update_translation_language_rules() {
        let f = faq(&[Language::En, Language::Ar]);
        assert!(matches!(
            plan_update_translation(&f, Language::En, &input("de", "q", "a")),
            Err(FaqError::EditConflict(_))
        ));
        assert!(matches!(
            plan_update_translation(&f, Language::Ar, &input("en", "q", "a")),
            Err(FaqError::Duplicate(_))
        ));
        let moved = plan_update_translation(&f, Language::Ar, &input("es", "q", "a")).unwrap();
        assert_eq!(moved.draft.language, Language::Es);
    }

    #[test]
    fn test_update_faq_rejects_default_without_translation() {
        let f = faq(&[Language::En]);
        let err = plan_update_faq(
            &f,
            FaqChanges {
                default_language: Some("ar".into()),
                ..FaqChanges::default()
            },
        )
        .unwrap_err();
        let FaqError::ValidationFailed(fields) = err else {
            panic!("expected validation failure");
        };
        assert!(fields.get("default_language").is_some());
    }

    #[test]
    fn test_update_faq_revalidates_loaded_translations() {
        let mut f = faq(&[Language::En, Language::Ar]);
        for t in &mut f.translations {
            t.question.clear();
        }
        let err = plan_update_faq(
            &f,
            FaqChanges {
                is_global: Some(false),
                store_id: Some(StoreId::new(3)),
                ..FaqChanges::default()
            },
        )
        .unwrap_err();
        let FaqError::ValidationFailed(fields) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(fields.get("translations.en.question"), Some("required"));
        assert_eq!(fields.get("translations.ar.question"), Some("required"));
    }

    #[test]
    fn test_update_faq_scope_changes() {
        let f = faq(&[Language::En]);
        let moved = plan_update_faq(
            &f,
            FaqChanges {
                store_id: Some(StoreId::new(9)),
                ..FaqChanges::default()
            },
        )
        .unwrap();
        assert_eq!(moved.scope, FaqScope::Store(StoreId::new(9)));

        let back = plan_update_faq(
            &moved,
            FaqChanges {
                is_global: Some(true),
                ..FaqChanges::default()
            },
        )
        .unwrap();
        assert_eq!(back.scope, FaqScope::Global);

        assert!(plan_update_faq(
            &f,
            FaqChanges {
                is_global: Some(true),
                store_id: Some(StoreId::new(9)),
                ..FaqChanges::default()
            },
        )
        .is_err());
    }

    #[test]
    fn test_invariants() {
        assert!(check_invariants(&faq(&[Language::En, Language::Ar])).is_ok());
        assert_eq!(
            check_invariants(&faq(&[Language::Ar])),
            Err(InvariantViolation::MissingDefault(Language::En))
        );
        assert_eq!(
            check_invariants(&faq(&[Language::En, Language::En])),
            Err(InvariantViolation::DuplicateLanguage(Language::En))
        );
    }
}
