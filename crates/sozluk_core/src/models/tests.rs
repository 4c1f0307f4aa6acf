//! Model-level unit tests.

use super::badge::*;
use super::manifest::Metadata;
use super::word::*;
use serde_json::json;

#[test]
fn word_file_parses_minimal_and_full_entries() {
    let body = json!([
        { "name": "ahlak" },
        {
            "name": " kitap ",
            "phonetic": "ki-tap",
            "origin": "Arapça",
            "meanings": [
                {
                    "meaning": "Ciltli veya ciltsiz olarak bir araya getirilmiş basılı kâğıt yaprakları",
                    "part_of_speech": "isim",
                    "examples": [{ "sentence": "Kitap okumayı severim." }]
                }
            ],
            "related_words": ["kitapçı"]
        },
        { "name": "   " }
    ]);
    let records = parse_word_file(body.to_string().as_bytes()).expect("parse");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "ahlak");
    assert!(records[0].meanings.is_empty());
    assert_eq!(records[1].name, "kitap");
    assert_eq!(records[1].meanings[0].examples[0].author, None);
    assert_eq!(records[1].related_words, vec!["kitapçı".to_string()]);
}

#[test]
fn word_file_rejects_non_array_payload() {
    assert!(parse_word_file(br#"{"name":"ahlak"}"#).is_err());
    assert!(parse_word_file(b"not json").is_err());
}

#[test]
fn manifest_validation_rejects_empty_and_escaping_file_lists() {
    let empty = Metadata {
        version: 1,
        files: Vec::new(),
    };
    assert!(empty.validate().is_err());

    let escaping = Metadata {
        version: 1,
        files: vec!["../secret.json".to_string()],
    };
    assert!(escaping.validate().is_err());

    let ok = Metadata {
        version: 1_700_000_000_000,
        files: vec!["a.json".to_string(), "b.json".to_string()],
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn badge_requirement_uses_tagged_json_shape() {
    let requirement: BadgeRequirement =
        serde_json::from_value(json!({ "type": "count_pronunciation", "value": 5 }))
            .expect("requirement");
    assert_eq!(requirement, BadgeRequirement::CountPronunciation(5));

    let encoded = serde_json::to_value(BadgeRequirement::MinPoints(100)).expect("encode");
    assert_eq!(encoded, json!({ "type": "min_points", "value": 100 }));
}

#[test]
fn contribution_actions_use_screaming_snake_case() {
    let action: ContributionAction =
        serde_json::from_value(json!("CREATE_MEANING_ATTRIBUTE")).expect("action");
    assert_eq!(action, ContributionAction::CreateMeaningAttribute);
}

#[test]
fn badge_update_keeps_unset_fields() {
    let mut badge = Badge {
        slug: "first-word".to_string(),
        name: LocalizedText {
            en: "First word".to_string(),
            tr: "İlk kelime".to_string(),
        },
        description: LocalizedText::default(),
        icon: "/badges/first-word.svg".to_string(),
        requirement: BadgeRequirement::CountWord(1),
        category: "words".to_string(),
    };
    badge.apply_update(UpdateBadgeRequest {
        icon: Some("/badges/v2.svg".to_string()),
        ..Default::default()
    });
    assert_eq!(badge.icon, "/badges/v2.svg");
    assert_eq!(badge.name.tr, "İlk kelime");
    assert_eq!(badge.requirement, BadgeRequirement::CountWord(1));
}
