use guidecane::config::VoiceConfig;
use guidecane::kernel::audio::endpointer::{
    mean_abs_amplitude, EndpointReason, FrameOutcome, Trigger, TriggerOutcome, VoiceEndpointer,
};
use guidecane::kernel::audio::graph::{VoiceGraph, VoiceRequest};
use guidecane::kernel::audio::session::VoiceState;

const FRAME: usize = 512;
const FRAME_MS: u64 = 32;

fn loud() -> Vec<i16> {
    (0..FRAME).map(|i| if i % 2 == 0 { 600 } else { -600 }).collect()
}

fn quiet() -> Vec<i16> {
    (0..FRAME).map(|i| if i % 2 == 0 { 10 } else { -10 }).collect()
}

fn armed(config: &VoiceConfig) -> VoiceEndpointer {
    let mut endpointer = VoiceEndpointer::new(config);
    assert_eq!(endpointer.trigger(Trigger::Button), TriggerOutcome::Armed);
    endpointer
}

#[test]
fn test_energy_is_mean_absolute_amplitude() {
    assert_eq!(mean_abs_amplitude(&[]), 0);
    assert_eq!(mean_abs_amplitude(&[100, -100, 50, -50]), 75);
    assert_eq!(mean_abs_amplitude(&[i16::MIN, i16::MAX]), 32767);
    assert!(mean_abs_amplitude(&quiet()) < VoiceConfig::default().silence_threshold);
    assert!(mean_abs_amplitude(&loud()) >= VoiceConfig::default().silence_threshold);
}

#[test]
fn test_trigger_only_from_idle() {
    let config = VoiceConfig::default();
    let mut endpointer = VoiceEndpointer::new(&config);

    // 1. Wake word must beat the threshold strictly
    assert_eq!(
        endpointer.trigger(Trigger::WakeWord { confidence: 0.6 }),
        TriggerOutcome::BelowThreshold
    );
    assert_eq!(endpointer.state(), VoiceState::Idle);
    assert_eq!(
        endpointer.trigger(Trigger::WakeWord { confidence: 0.61 }),
        TriggerOutcome::Armed
    );

    // 2. Double arm is rejected, not fatal
    assert_eq!(endpointer.trigger(Trigger::Button), TriggerOutcome::Busy);
    assert_eq!(endpointer.state(), VoiceState::Armed);
}

#[test]
fn test_frames_ignored_until_armed() {
    let config = VoiceConfig::default();
    let mut endpointer = VoiceEndpointer::new(&config);

    assert_eq!(endpointer.push_frame(&loud(), 0), FrameOutcome::Ignored);
    assert_eq!(endpointer.state(), VoiceState::Idle);
    assert!(endpointer.session().is_none());
}

#[test]
fn test_silence_ceiling_endpoints_speech() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    // 1. First frame opens the recording; times are frame ends
    assert_eq!(endpointer.push_frame(&loud(), FRAME_MS), FrameOutcome::Started);
    assert_eq!(endpointer.state(), VoiceState::Recording);
    assert_eq!(endpointer.session().map(|s| s.start_ms()), Some(0));
    assert_eq!(endpointer.push_frame(&loud(), 2 * FRAME_MS), FrameOutcome::Capturing);
    assert_eq!(endpointer.push_frame(&loud(), 3 * FRAME_MS), FrameOutcome::Capturing);

    // 2. Then silence until the ceiling
    let speech_end = 3 * FRAME_MS;
    let mut now = speech_end;
    let utterance = loop {
        now += FRAME_MS;
        match endpointer.push_frame(&quiet(), now) {
            FrameOutcome::Capturing => {
                assert!(now - speech_end < 1000, "silence ran past the ceiling");
            }
            FrameOutcome::Utterance(utterance) => break utterance,
            other => panic!("unexpected {other:?}"),
        }
    };

    assert_eq!(now - speech_end, 32 * FRAME_MS);
    assert_eq!(utterance.reason, EndpointReason::Silence);
    assert_eq!(utterance.voiced_frames, 3);
    assert_eq!(utterance.sample_rate, 16_000);
    assert_eq!(utterance.duration_ms, now);
    assert_eq!(utterance.samples.len(), (now / FRAME_MS) as usize * FRAME);
    assert_eq!(endpointer.state(), VoiceState::Processing);
}

#[test]
fn test_pure_silence_endpoints_at_one_second_and_abandons() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    // 31 frames ending at 32, 64, ..., 992 ms hold 992 ms of silence
    for i in 1..=31u64 {
        let outcome = endpointer.push_frame(&quiet(), i * FRAME_MS);
        assert!(
            matches!(outcome, FrameOutcome::Started | FrameOutcome::Capturing),
            "frame {i} endpointed early"
        );
    }

    // The 32nd frame completes 1024 ms
    assert_eq!(
        endpointer.push_frame(&quiet(), 32 * FRAME_MS),
        FrameOutcome::Abandoned(EndpointReason::Silence)
    );
    assert_eq!(endpointer.state(), VoiceState::Idle);
}

#[test]
fn test_single_voiced_frame_is_noise() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    endpointer.push_frame(&loud(), FRAME_MS);
    let mut now = FRAME_MS;
    let outcome = loop {
        now += FRAME_MS;
        match endpointer.push_frame(&quiet(), now) {
            FrameOutcome::Capturing => continue,
            other => break other,
        }
    };

    assert_eq!(outcome, FrameOutcome::Abandoned(EndpointReason::Silence));
    assert_eq!(endpointer.state(), VoiceState::Idle);
    assert_eq!(endpointer.trigger(Trigger::Button), TriggerOutcome::Armed);
}

#[test]
fn test_two_voiced_frames_prevent_abandonment() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    endpointer.push_frame(&loud(), FRAME_MS);
    endpointer.push_frame(&loud(), 2 * FRAME_MS);
    let mut now = 2 * FRAME_MS;
    let outcome = loop {
        now += FRAME_MS;
        match endpointer.push_frame(&quiet(), now) {
            FrameOutcome::Capturing => continue,
            other => break other,
        }
    };

    assert!(matches!(outcome, FrameOutcome::Utterance(ref u) if u.voiced_frames == 2));
}

#[test]
fn test_continuous_speech_stops_at_five_seconds() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    let mut now = FRAME_MS;
    let utterance = loop {
        match endpointer.push_frame(&loud(), now) {
            FrameOutcome::Started | FrameOutcome::Capturing => now += FRAME_MS,
            FrameOutcome::Utterance(utterance) => break utterance,
            other => panic!("unexpected {other:?}"),
        }
    };

    // 156 frames reach 4992 ms; the frame ending at 5024 ms is left out
    assert_eq!(utterance.reason, EndpointReason::MaxDuration);
    assert_eq!(now, 157 * FRAME_MS);
    assert_eq!(utterance.samples.len(), 156 * FRAME);
    assert_eq!(utterance.duration_ms, 156 * FRAME_MS);
    assert!(utterance.samples.len() <= config.capture_capacity());
}

#[test]
fn test_buffer_capacity_bounds_a_fast_stream() {
    // Frames of 64 ms arriving every 32 ms fill the buffer before 5 s pass
    let config = VoiceConfig::default();
    let capacity = config.capture_capacity();
    let mut endpointer = armed(&config);
    let frame: Vec<i16> = loud().into_iter().cycle().take(2 * FRAME).collect();

    let mut now = 2 * FRAME_MS;
    let utterance = loop {
        match endpointer.push_frame(&frame, now) {
            FrameOutcome::Started | FrameOutcome::Capturing => now += FRAME_MS,
            FrameOutcome::Utterance(utterance) => break utterance,
            other => panic!("unexpected {other:?}"),
        }
    };

    assert_eq!(utterance.reason, EndpointReason::BufferFull);
    assert_eq!(utterance.samples.len(), capacity);
    assert!(utterance.duration_ms < config.max_recording_ms);
}

#[test]
fn test_duration_ceiling_holds_when_frames_are_sparse() {
    // 10 ms frames 100 ms apart: the buffer never fills
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);
    let frame = vec![700i16; 160];

    let mut now = 10;
    let utterance = loop {
        match endpointer.push_frame(&frame, now) {
            FrameOutcome::Started | FrameOutcome::Capturing => now += 100,
            FrameOutcome::Utterance(utterance) => break utterance,
            other => panic!("unexpected {other:?}"),
        }
    };

    assert_eq!(utterance.reason, EndpointReason::MaxDuration);
    assert_eq!(now, 5010, "the first frame ending past 5 s");
    assert_eq!(utterance.duration_ms, 4910);
    assert_eq!(utterance.samples.len(), 50 * 160, "the late frame is not captured");
}

#[test]
fn test_frame_ending_on_the_ceiling_is_kept() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);
    let frame = vec![700i16; 160];

    assert_eq!(endpointer.push_frame(&frame, 10), FrameOutcome::Started);
    assert_eq!(endpointer.push_frame(&frame, 2500), FrameOutcome::Capturing);
    let FrameOutcome::Utterance(utterance) = endpointer.push_frame(&frame, 5000) else {
        panic!("frame ending at 5 s should endpoint");
    };

    assert_eq!(utterance.reason, EndpointReason::MaxDuration);
    assert_eq!(utterance.duration_ms, 5000);
    assert_eq!(utterance.samples.len(), 3 * 160);
}

#[test]
fn test_reply_returns_to_idle_or_rearms() {
    let mut config = VoiceConfig::default();
    config.continue_conversation = false;
    let mut endpointer = armed(&config);
    endpointer.push_frame(&loud(), FRAME_MS);
    endpointer.push_frame(&loud(), 2 * FRAME_MS);
    let mut now = 2 * FRAME_MS;
    while endpointer.state() == VoiceState::Recording {
        now += FRAME_MS;
        endpointer.push_frame(&quiet(), now);
    }
    assert_eq!(endpointer.state(), VoiceState::Processing);
    assert_eq!(endpointer.trigger(Trigger::Button), TriggerOutcome::Busy);

    assert_eq!(endpointer.complete(), VoiceState::Idle);

    // Continuous conversation re-arms without a new trigger
    config.continue_conversation = true;
    let mut endpointer = armed(&config);
    endpointer.push_frame(&loud(), FRAME_MS);
    endpointer.push_frame(&loud(), 2 * FRAME_MS);
    let mut now = 2 * FRAME_MS;
    while endpointer.state() == VoiceState::Recording {
        now += FRAME_MS;
        endpointer.push_frame(&quiet(), now);
    }
    assert_eq!(endpointer.complete(), VoiceState::Armed);
    assert_eq!(endpointer.push_frame(&loud(), now + 500), FrameOutcome::Started);
}

#[test]
fn test_expired_reply_returns_to_idle() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);

    // 1. Nothing to expire before a hand-off
    assert!(!endpointer.expire());
    assert_eq!(endpointer.state(), VoiceState::Armed);

    endpointer.push_frame(&loud(), FRAME_MS);
    endpointer.push_frame(&loud(), 2 * FRAME_MS);
    let mut now = 2 * FRAME_MS;
    while endpointer.state() == VoiceState::Recording {
        now += FRAME_MS;
        endpointer.push_frame(&quiet(), now);
    }
    assert_eq!(endpointer.state(), VoiceState::Processing);

    // 2. Expiring drops the reply and frees the device
    assert!(endpointer.expire());
    assert_eq!(endpointer.state(), VoiceState::Idle);
    assert!(!endpointer.expire());
    assert_eq!(endpointer.trigger(Trigger::Button), TriggerOutcome::Armed);
}

#[test]
fn test_reset_drops_session() {
    let config = VoiceConfig::default();
    let mut endpointer = armed(&config);
    endpointer.push_frame(&loud(), FRAME_MS);
    assert!(endpointer.session().is_some());

    endpointer.reset();
    assert_eq!(endpointer.state(), VoiceState::Idle);
    assert!(endpointer.session().is_none());
}

#[test]
fn test_graph_rejects_out_of_order_requests() {
    use VoiceRequest::*;
    use VoiceState::*;

    assert_eq!(VoiceGraph::transition(Idle, Trigger), Some(Armed));
    assert_eq!(VoiceGraph::transition(Armed, Trigger), None);
    assert_eq!(VoiceGraph::transition(Recording, Trigger), None);
    assert_eq!(VoiceGraph::transition(Processing, Trigger), None);
    assert_eq!(VoiceGraph::transition(Idle, FrameArrived), None);
    assert_eq!(VoiceGraph::transition(Armed, TerminationRuleFired), None);
    assert_eq!(VoiceGraph::transition(Recording, HandOff), None);
    assert_eq!(VoiceGraph::transition(Endpointed, Abandon), Some(Idle));
    assert_eq!(VoiceGraph::transition(Processing, FollowUp), Some(Armed));
    assert_eq!(VoiceGraph::transition(Idle, Cancel), None);
}
