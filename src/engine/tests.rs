//! Tests for the mapping engine

use super::*;
use crate::layout::element::*;
use crate::state::Page;
use proptest::prelude::*;

fn grouped() -> MappingEngine {
    MappingEngine::nano_kontrol2(EngineOptions::default(), AliasTable::default())
}

fn direct() -> MappingEngine {
    MappingEngine::nano_kontrol2(
        EngineOptions {
            mode: EngineMode::Direct,
            ..EngineOptions::default()
        },
        AliasTable::default(),
    )
}

fn ev(element: u8, value: u8) -> ElementEvent {
    ElementEvent { element, value }
}

fn go_to_page(engine: &mut MappingEngine, page: u8) {
    while engine.page().number() < page {
        engine.handle(ev(TRACK_NEXT, 127));
    }
}

fn sent(dispatch: &Dispatch) -> (&str, Payload) {
    let msg = dispatch.message.as_ref().expect("expected an outbound message");
    (msg.address.as_str(), msg.payload)
}

// ===== End-to-end scenarios =====

#[test]
fn test_slider_one_full_scale_on_default_group() {
    let mut engine = grouped();

    let dispatch = engine.handle(ev(SLIDER_1, 127));

    assert_eq!(sent(&dispatch), ("/s1/slider/1", Payload::Int(255)));
    assert_eq!(dispatch.status, None);
}

#[test]
fn test_track_next_from_page_three() {
    let mut engine = grouped();
    go_to_page(&mut engine, 3);

    let dispatch = engine.handle(ev(TRACK_NEXT, 127));

    assert_eq!(engine.page().number(), 4);
    assert!(dispatch.message.is_none());
    assert!(dispatch.status.unwrap().contains("Page: 4"));
}

#[test]
fn test_play_fires_regardless_of_value_page_and_group() {
    let mut engine = grouped();
    engine.handle(ev(MUTE_1 + 4, 127));
    go_to_page(&mut engine, 6);

    for value in [0, 1, 64, 127] {
        let dispatch = engine.handle(ev(PLAY, value));
        assert_eq!(sent(&dispatch), ("/play", Payload::Int(255)));
    }
}

// ===== Paging =====

#[test]
fn test_page_clamped_at_bounds() {
    let mut engine = grouped();

    let dispatch = engine.handle(ev(TRACK_PREVIOUS, 127));
    assert_eq!(engine.page(), Page::FIRST);
    assert!(dispatch.is_empty());

    go_to_page(&mut engine, 8);
    let dispatch = engine.handle(ev(TRACK_NEXT, 127));
    assert_eq!(engine.page(), Page::LAST);
    assert!(dispatch.is_empty());
}

#[test]
fn test_page_buttons_ignore_release() {
    let mut engine = grouped();

    let dispatch = engine.handle(ev(TRACK_NEXT, 0));
    assert!(dispatch.is_empty());
    assert_eq!(engine.page(), Page::FIRST);
}

#[test]
fn test_page_change_applies_to_next_channel() {
    let mut engine = grouped();
    engine.handle(ev(TRACK_NEXT, 127));

    let dispatch = engine.handle(ev(KNOB_1 + 2, 127));
    assert_eq!(sent(&dispatch).0, "/s1/knob/11");

    engine.handle(ev(TRACK_PREVIOUS, 127));
    let dispatch = engine.handle(ev(KNOB_1 + 2, 127));
    assert_eq!(sent(&dispatch).0, "/s1/knob/3");
}

#[test]
fn test_last_page_last_slider_is_channel_64() {
    let mut engine = grouped();
    go_to_page(&mut engine, 8);

    let dispatch = engine.handle(ev(SLIDER_8, 0));
    assert_eq!(sent(&dispatch), ("/s1/slider/64", Payload::Int(0)));
}

// ===== Group selection =====

#[test]
fn test_group_selection_prefixes_following_messages() {
    let mut engine = grouped();

    let dispatch = engine.handle(ev(RECORD_1 + 1, 127));
    assert!(dispatch.message.is_none());
    assert_eq!(dispatch.status.as_deref(), Some("Group: r2, Page: 1"));

    let dispatch = engine.handle(ev(SLIDER_1 + 3, 64));
    assert_eq!(sent(&dispatch), ("/r2/slider/4", Payload::Int(129)));
}

#[test]
fn test_group_token_independent_of_page_and_history() {
    let mut engine = grouped();
    engine.handle(ev(MUTE_8, 127));
    go_to_page(&mut engine, 5);

    engine.handle(ev(SOLO_1 + 2, 127));
    assert_eq!(engine.session().active_group.to_string(), "s3");
}

#[test]
fn test_group_release_is_ignored() {
    let mut engine = grouped();

    let dispatch = engine.handle(ev(SOLO_1 + 4, 0));
    assert!(dispatch.is_empty());
    assert_eq!(engine.session().active_group.to_string(), "s1");
}

#[test]
fn test_group_status_uses_alias() {
    let mut aliases = AliasTable::default();
    aliases.insert("m3", "Guitars");
    let mut engine = MappingEngine::nano_kontrol2(EngineOptions::default(), aliases);

    let dispatch = engine.handle(ev(MUTE_1 + 2, 127));
    assert_eq!(dispatch.status.as_deref(), Some("Group: m3 (Guitars), Page: 1"));

    let dispatch = engine.handle(ev(TRACK_NEXT, 127));
    assert_eq!(dispatch.status.as_deref(), Some("Group: m3 (Guitars), Page: 2"));
}

#[test]
fn test_configured_default_group() {
    let mut engine = MappingEngine::nano_kontrol2(
        EngineOptions {
            default_group: "m4".parse().unwrap(),
            ..EngineOptions::default()
        },
        AliasTable::default(),
    );

    let dispatch = engine.handle(ev(KNOB_8, 127));
    assert_eq!(sent(&dispatch).0, "/m4/knob/8");
}

// ===== Direct policy =====

#[test]
fn test_direct_policy_emits_every_bank() {
    let mut engine = direct();

    assert_eq!(sent(&engine.handle(ev(SLIDER_1, 127))).0, "/slider/1");
    assert_eq!(sent(&engine.handle(ev(KNOB_1 + 1, 127))).0, "/knob/2");
    assert_eq!(
        sent(&engine.handle(ev(SOLO_1 + 2, 127))),
        ("/solo/3", Payload::Int(255))
    );
    assert_eq!(
        sent(&engine.handle(ev(MUTE_1 + 3, 0))),
        ("/mute/4", Payload::Int(0))
    );
    assert_eq!(sent(&engine.handle(ev(RECORD_8, 127))).0, "/record/8");
}

#[test]
fn test_direct_policy_paging_and_status() {
    let mut engine = direct();

    let dispatch = engine.handle(ev(TRACK_NEXT, 127));
    assert_eq!(dispatch.status.as_deref(), Some("Page: 2"));

    let dispatch = engine.handle(ev(RECORD_1, 127));
    assert_eq!(sent(&dispatch).0, "/record/9");
    assert_eq!(engine.session().active_group.to_string(), "s1");
}

// ===== Transport =====

#[test]
fn test_transport_addresses() {
    let mut engine = grouped();
    let cases = [
        (CYCLE, "/cycle"),
        (MARKER_SET, "/marker/set"),
        (MARKER_PREVIOUS, "/marker/previous"),
        (MARKER_NEXT, "/marker/next"),
        (REWIND, "/rewind"),
        (FORWARD, "/forward"),
        (STOP, "/stop"),
        (PLAY, "/play"),
        (RECORD, "/record"),
    ];

    for (element, address) in cases {
        let dispatch = engine.handle(ev(element, 127));
        assert_eq!(sent(&dispatch), (address, Payload::Int(255)));
    }
}

#[test]
fn test_transport_pressed_trigger_ignores_release() {
    let mut engine = MappingEngine::nano_kontrol2(
        EngineOptions {
            transport_trigger: TransportTrigger::Pressed,
            ..EngineOptions::default()
        },
        AliasTable::default(),
    );

    assert!(engine.handle(ev(STOP, 0)).is_empty());
    assert_eq!(sent(&engine.handle(ev(STOP, 127))).0, "/stop");
}

// ===== Payload formats =====

#[test]
fn test_float_payload() {
    let mut engine = MappingEngine::nano_kontrol2(
        EngineOptions {
            payload: PayloadFormat::Float,
            ..EngineOptions::default()
        },
        AliasTable::default(),
    );

    assert_eq!(sent(&engine.handle(ev(SLIDER_1, 127))).1, Payload::Float(255.0));
    assert_eq!(sent(&engine.handle(ev(PLAY, 0))).1, Payload::Float(255.0));

    match sent(&engine.handle(ev(SLIDER_1, 64))).1 {
        Payload::Float(v) => assert!((v - 128.504).abs() < 1e-2),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_payload_to_osc() {
    assert_eq!(Payload::Int(12).to_osc(), OscType::Int(12));
    assert_eq!(Payload::Float(1.5).to_osc(), OscType::Float(1.5));
}

// ===== General properties =====

#[test]
fn test_duplicate_events_are_not_suppressed() {
    let mut engine = grouped();

    let first = engine.handle(ev(KNOB_1, 90));
    let second = engine.handle(ev(KNOB_1, 90));
    assert_eq!(first, second);
    assert!(first.message.is_some());
}

#[test]
fn test_unmapped_element_has_no_effect() {
    let mut engine = grouped();
    engine.handle(ev(MUTE_1, 127));
    go_to_page(&mut engine, 2);

    for element in [8, 30, 57, 100, 127] {
        assert!(engine.handle(ev(element, 127)).is_empty());
    }
    assert_eq!(engine.page().number(), 2);
    assert_eq!(engine.session().active_group.to_string(), "m1");
}

#[test]
fn test_initial_status_line() {
    assert_eq!(grouped().status_line(), "Group: s1, Page: 1");
    assert_eq!(direct().status_line(), "Page: 1");
    assert_eq!(grouped().policy_name(), "grouped");
}

proptest! {
    #[test]
    fn prop_slider_channel_follows_page(offset in 0u8..8, page in 1u8..=8, value in 0u8..=127) {
        let mut engine = grouped();
        go_to_page(&mut engine, page);

        let dispatch = engine.handle(ev(SLIDER_1 + offset, value));
        let expected = (SLIDER_1 + offset) as u32 + 1 + (page as u32 - 1) * 8;
        let expected_address = format!("/s1/slider/{}", expected);
        prop_assert_eq!(sent(&dispatch).0, expected_address.as_str());
    }

    #[test]
    fn prop_page_stays_in_range(presses in proptest::collection::vec(any::<bool>(), 0..40)) {
        let mut engine = direct();
        for next in presses {
            let element = if next { TRACK_NEXT } else { TRACK_PREVIOUS };
            engine.handle(ev(element, 127));
            let page = engine.page().number();
            prop_assert!((1..=8).contains(&page));
        }
    }

    #[test]
    fn prop_rescale_is_monotonic(a in 0u8..=127, b in 0u8..=127) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let scaled = |v| match Payload::from_7bit(v, PayloadFormat::Int) {
            Payload::Int(x) => x,
            Payload::Float(_) => unreachable!(),
        };
        prop_assert!(scaled(lo) <= scaled(hi));
        prop_assert!((0..=255).contains(&scaled(hi)));
    }
}
