// --- File: crates/oasis_scheduling/src/inference_test.rs ---
use crate::inference::{
    infer_room_type, BODY_SPA_KEYWORDS, HEAD_SPA_KEYWORDS, NAIL_SPA_KEYWORDS,
};
use crate::models::RoomType;

#[test]
fn every_head_keyword_maps_to_head_spa() {
    for keyword in HEAD_SPA_KEYWORDS {
        assert_eq!(
            infer_room_type(keyword),
            RoomType::HeadSpa,
            "keyword {keyword}"
        );
    }
}

#[test]
fn every_nail_keyword_maps_to_nail_spa() {
    for keyword in NAIL_SPA_KEYWORDS {
        assert_eq!(
            infer_room_type(keyword),
            RoomType::NailSpa,
            "keyword {keyword}"
        );
    }
}

#[test]
fn every_body_keyword_maps_to_body_spa() {
    for keyword in BODY_SPA_KEYWORDS {
        assert_eq!(
            infer_room_type(keyword),
            RoomType::BodySpa,
            "keyword {keyword}"
        );
    }
}

#[test]
fn matching_is_case_insensitive_substring() {
    assert_eq!(infer_room_type("Gel Polish Deluxe"), RoomType::NailSpa);
    assert_eq!(infer_room_type("SCALP TREATMENT"), RoomType::HeadSpa);
    assert_eq!(infer_room_type("hot stone 90'"), RoomType::BodySpa);
}

#[test]
fn head_takes_precedence_over_body() {
    // "head massage" hits both tables; head is checked first.
    assert_eq!(infer_room_type("head massage"), RoomType::HeadSpa);
}

#[test]
fn unmatched_names_default_to_body_spa() {
    assert_eq!(infer_room_type("Mystery Combo"), RoomType::BodySpa);
    assert_eq!(infer_room_type(""), RoomType::BodySpa);
}
