//! Property-based tests for the playback engine
//!
//! Uses proptest to verify invariants across many random inputs.

use duet_playback::crossfade::{fade_gains, fade_progress};
use duet_playback::testing::MockChannel;
use duet_playback::{
    linear, Catalog, ChannelEvent, ChannelId, Direction, PlaybackConfig, PlaybackEngine,
    TrackDescriptor, TrackSelector, TransitionPhase,
};
use proptest::prelude::*;
use std::time::Duration;

// ===== Helpers =====

fn catalog(len: usize) -> Catalog {
    Catalog::new(
        (0..len)
            .map(|i| {
                TrackDescriptor::new(
                    format!("Track {i}"),
                    format!("song{i}.mp3"),
                    format!("image{i}.jpg"),
                )
            })
            .collect(),
    )
    .unwrap()
}

fn arbitrary_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Next), Just(Direction::Previous)]
}

/// One host input
#[derive(Debug, Clone)]
enum Input {
    Toggle,
    Skip(Direction),
    ReadyActive,
    ReadyStandby,
    Frame(u64),
    ErrorActive,
    ErrorStandby,
    EndedActive,
    Shuffle(bool),
    Seek(f32),
}

fn arbitrary_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Toggle),
        arbitrary_direction().prop_map(Input::Skip),
        Just(Input::ReadyActive),
        Just(Input::ReadyStandby),
        (1u64..2_000).prop_map(Input::Frame),
        Just(Input::ErrorActive),
        Just(Input::ErrorStandby),
        Just(Input::EndedActive),
        any::<bool>().prop_map(Input::Shuffle),
        (-0.5f32..1.5).prop_map(Input::Seek),
    ]
}

// ===== Property Tests =====

proptest! {
    /// Property: gains stay in [0, 1] and the standby's gain plus the active
    /// gain's share of its starting volume is always 1
    #[test]
    fn crossfade_gains_are_complementary(
        k in 0.0f32..=1.0,
        start_volume_active in 0.01f32..=1.0
    ) {
        let (standby, active) = fade_gains(k, start_volume_active);

        prop_assert!((0.0..=1.0).contains(&standby));
        prop_assert!((0.0..=1.0).contains(&active));
        prop_assert!((standby + active / start_volume_active - 1.0).abs() < 1e-5);
    }

    /// Property: fade progress is monotonic in elapsed time
    #[test]
    fn fade_progress_is_monotonic(
        a in 0u64..10_000,
        b in 0u64..10_000,
        duration in 1u64..5_000
    ) {
        let (early, late) = (a.min(b), a.max(b));
        let duration = Duration::from_millis(duration);
        prop_assert!(
            fade_progress(Duration::from_millis(early), duration)
                <= fade_progress(Duration::from_millis(late), duration)
        );
    }

    /// Property: channel volumes stay complementary at every frame of a fade
    #[test]
    fn engine_fade_volumes_sum_to_one(
        frame_gaps in prop::collection::vec(1u64..200, 1..40)
    ) {
        let mut engine = PlaybackEngine::new(
            catalog(3),
            MockChannel::new(),
            MockChannel::new(),
            &PlaybackConfig::default(),
        );
        engine.toggle_play().unwrap();
        engine.skip(Direction::Next).unwrap();
        engine.handle_channel_event(ChannelId::B, ChannelEvent::Ready);

        let mut clock = Duration::ZERO;
        for gap in frame_gaps {
            engine.on_frame(clock);
            clock += Duration::from_millis(gap);

            if engine.phase() != TransitionPhase::FadingVolumes {
                break;
            }
            let a = engine.channels().channel(ChannelId::A).volume();
            let b = engine.channels().channel(ChannelId::B).volume();
            prop_assert!((a + b - 1.0).abs() < 1e-5, "a={} b={}", a, b);
        }
    }

    /// Property: linear stepping stays in range and Previous undoes Next
    #[test]
    fn linear_selection_round_trips(len in 1usize..100, seed in any::<usize>()) {
        let current = seed % len;
        let next = linear(current, len, Direction::Next);

        prop_assert!(next < len);
        prop_assert_eq!(linear(next, len, Direction::Previous), current);
    }

    /// Property: shuffle never picks the current track
    #[test]
    fn shuffle_excludes_current(
        len in 2usize..50,
        current_seed in any::<usize>(),
        rng_seed in any::<u64>(),
        direction in arbitrary_direction()
    ) {
        let current = current_seed % len;
        let mut selector = TrackSelector::with_seed(rng_seed);

        let pick = selector.resolve_next(current, len, direction, true);
        prop_assert!(pick < len);
        prop_assert_ne!(pick, current);
    }

    /// Property: any sequence of host inputs keeps the engine consistent
    #[test]
    fn engine_state_stays_consistent(
        len in 1usize..6,
        inputs in prop::collection::vec(arbitrary_input(), 1..80),
        rng_seed in any::<u64>()
    ) {
        let mut engine = PlaybackEngine::new(
            catalog(len),
            MockChannel::new(),
            MockChannel::new(),
            &PlaybackConfig::default(),
        )
        .with_selector(TrackSelector::with_seed(rng_seed));

        let mut clock = Duration::ZERO;
        for input in inputs {
            let active = engine.channels().active_id();
            let standby = engine.channels().standby_id();
            match input {
                Input::Toggle => { engine.toggle_play().ok(); }
                Input::Skip(direction) => { engine.skip(direction).ok(); }
                Input::ReadyActive => engine.handle_channel_event(active, ChannelEvent::Ready),
                Input::ReadyStandby => engine.handle_channel_event(standby, ChannelEvent::Ready),
                Input::Frame(gap) => {
                    clock += Duration::from_millis(gap);
                    engine.on_frame(clock);
                }
                Input::ErrorActive => engine.handle_channel_event(
                    active,
                    ChannelEvent::Error { message: "error".to_string() },
                ),
                Input::ErrorStandby => engine.handle_channel_event(
                    standby,
                    ChannelEvent::Error { message: "error".to_string() },
                ),
                Input::EndedActive => engine.handle_channel_event(active, ChannelEvent::Ended),
                Input::Shuffle(enabled) => engine.set_shuffle(enabled),
                Input::Seek(ratio) => { engine.seek_to(ratio).ok(); }
            }

            let state = engine.state();
            prop_assert!(state.current_index < len);
            prop_assert_eq!(
                state.transition_in_flight,
                engine.phase() != TransitionPhase::Idle
            );
            prop_assert_ne!(engine.channels().active_id(), engine.channels().standby_id());
            for id in [ChannelId::A, ChannelId::B] {
                let volume = engine.channels().channel(id).volume();
                prop_assert!((0.0..=1.0).contains(&volume));
            }
            if !state.is_playing() {
                prop_assert!(engine.channels().active().is_paused());
            }
            engine.drain_events();
        }
    }
}
