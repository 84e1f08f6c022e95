use std::time::Duration;

use midly::num::{u4, u7, u15, u24, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use serialmidi::timing::{ManualClock, TimeBarrier};
use serialmidi::{Error, PATCH_SIZE, Patch, PlaybackOutcome, Sequencer, Song};

fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind,
    }
}

fn note(on: bool, channel: u8, key: u8) -> TrackEventKind<'static> {
    let message = if on {
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(0x7F),
        }
    } else {
        MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        }
    };
    TrackEventKind::Midi {
        channel: u4::new(channel),
        message,
    }
}

fn end_of_track() -> TrackEventKind<'static> {
    TrackEventKind::Meta(MetaMessage::EndOfTrack)
}

/// Two tracks: a conductor track that doubles the tempo halfway through, and
/// a melody of two notes on channel 0.
fn render_song() -> Vec<u8> {
    let conductor = vec![
        event(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)))),
        event(96, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(250_000)))),
        event(96, end_of_track()),
    ];
    let melody = vec![
        event(0, note(true, 0, 60)),
        event(96, note(false, 0, 60)),
        event(0, note(true, 0, 64)),
        event(96, note(false, 0, 64)),
        event(0, end_of_track()),
    ];
    let smf = Smf {
        header: Header::new(Format::Parallel, Timing::Metrical(u15::new(96))),
        tracks: vec![conductor, melody],
    };
    let mut data: Vec<u8> = Vec::new();
    smf.write_std(&mut data).unwrap();
    data
}

#[test]
fn plays_a_file_with_a_tempo_change() {
    let song = Song::parse(&render_song()).unwrap();
    assert_eq!(song.ticks_per_beat(), 96);
    assert_eq!(song.last_tick(), Some(192));

    let mut sequencer = Sequencer::new(&song, TimeBarrier::new(ManualClock::new()));
    let mut sink: Vec<u8> = Vec::new();
    let outcome = sequencer.run(&mut sink).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Finished { iterations: 193 });
    assert_eq!(
        sink,
        vec![
            0x90, 60, 0x7F, //
            0x80, 60, 0x00, //
            0x90, 64, 0x7F, //
            0x80, 64, 0x00,
        ]
    );
    // One beat at 120 BPM followed by one beat at 240 BPM.
    assert_eq!(
        sequencer.timer().clock().now(),
        Duration::from_millis(500 + 250)
    );
}

#[test]
fn patch_goes_out_before_the_song() {
    let song = Song::parse(&render_song()).unwrap();
    let patch = Patch::new(vec![0x42; PATCH_SIZE]).unwrap();

    let mut sink: Vec<u8> = Vec::new();
    patch.upload(&mut sink).unwrap();
    Sequencer::new(&song, TimeBarrier::new(ManualClock::new()))
        .run(&mut sink)
        .unwrap();

    assert_eq!(sink.len(), 1 + PATCH_SIZE + 1 + 12);
    assert_eq!(sink[0], 0xF0);
    assert!(sink[1..=PATCH_SIZE].iter().all(|&b| b == 0x42));
    assert_eq!(sink[PATCH_SIZE + 1], 0xF7);
    assert_eq!(&sink[PATCH_SIZE + 2..PATCH_SIZE + 5], &[0x90, 60, 0x7F]);
}

#[test]
fn wrong_patch_size_is_rejected() {
    let result = Patch::new(vec![0; PATCH_SIZE / 2]);
    assert!(matches!(
        result,
        Err(Error::PatchSize {
            expected: PATCH_SIZE,
            actual: 0xC00
        })
    ));
}

#[test]
fn long_song_keeps_time_under_a_late_sleeper() {
    // 30 minutes of ticks at 120 BPM, division 480, with a sleep that always
    // wakes a millisecond late.
    let ticks = 480 * 2 * 60 * 30;
    let song = Song::new(
        480,
        vec![serialmidi::Track::new(vec![serialmidi::TimedEvent::new(
            ticks,
            serialmidi::Event::Performance(vec![0xFC]),
        )])],
    )
    .unwrap();
    let overshoot = Duration::from_millis(1);
    let mut sequencer = Sequencer::new(
        &song,
        TimeBarrier::new(ManualClock::with_overshoot(overshoot)),
    );
    sequencer.run(&mut Vec::<u8>::new()).unwrap();

    let ideal = Duration::from_secs(30 * 60);
    let now = sequencer.timer().clock().now();
    assert!(now >= ideal);
    assert!(now - ideal <= overshoot, "drifted by {:?}", now - ideal);
}
