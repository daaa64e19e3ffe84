//! End-to-end poll tests through the public API
//!
//! A scripted audio server returns real `pactl` and `pacmd` style reports and
//! records every command it receives, so these tests check the whole path
//! from raw text to the switch commands that are issued.

use pretty_assertions::assert_eq;
use prisw::daemon;
use prisw::error::AudioError;
use prisw::inspector::Inspector;
use prisw::policy::{self, Outcome};
use prisw::server::AudioServer;
use prisw::tool::Tool;
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    SetDefault(String),
    Move(u32, u32),
}

struct ScriptedServer {
    sinks: String,
    streams: Result<String, AudioError>,
    refuse_move: Option<u32>,
    sent: RefCell<Vec<Sent>>,
}

impl ScriptedServer {
    fn new(sinks: &str, streams: &str) -> Self {
        Self {
            sinks: sinks.to_string(),
            streams: Ok(streams.to_string()),
            refuse_move: None,
            sent: RefCell::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.borrow().clone()
    }
}

fn unavailable(what: &str) -> AudioError {
    AudioError::ExternalUnavailable {
        command: what.to_string(),
        reason: "connection refused".to_string(),
    }
}

impl AudioServer for ScriptedServer {
    fn list_sinks(&self) -> Result<String, AudioError> {
        Ok(self.sinks.clone())
    }

    fn list_streams(&self) -> Result<String, AudioError> {
        self.streams.clone()
    }

    fn set_default_sink(&self, sink_name: &str) -> Result<(), AudioError> {
        self.sent
            .borrow_mut()
            .push(Sent::SetDefault(sink_name.to_string()));
        Ok(())
    }

    fn move_stream(&self, stream_id: u32, sink_id: u32) -> Result<(), AudioError> {
        if self.refuse_move == Some(stream_id) {
            return Err(unavailable("move-sink-input"));
        }
        self.sent.borrow_mut().push(Sent::Move(stream_id, sink_id));
        Ok(())
    }
}

const PACTL_SINKS: &str = "\
Sink #0
\tState: RUNNING
\tName: alsa_output.pci-0000_00_1f.3.analog-stereo
\tDescription: Built-in Audio Analog Stereo
\tProperties:
\t\tdevice.description = \"Built-in Audio\"
\t\tpriority: 9009
Sink #3
\tState: SUSPENDED
\tName: bluez_sink.00_1B_66_AA_BB_CC.a2dp_sink
\tDescription: Headphones
\tProperties:
\t\tdevice.description = \"Headphones\"
\t\tpriority: 9200
";

const PACTL_STREAMS: &str = "\
Sink Input #41
\tDriver: protocol-native.c
\tSink: 0
Sink Input #57
\tDriver: protocol-native.c
\tSink: 0
";

const PACMD_SINKS: &str = "\
2 sink(s) available.
  * index: 0
\tname: <alsa_output.pci-0000_00_1f.3.analog-stereo>
\tdriver: <module-alsa-card.c>
\tpriority: 9009
    index: 5
\tname: <alsa_output.usb-Focusrite_Scarlett-00.analog-stereo>
\tdriver: <module-alsa-card.c>
\tpriority: 9500
";

const PACMD_STREAMS: &str = "\
1 sink input(s) available.
    index: 12
\tdriver: <protocol-native.c>
\tsink: 0 <alsa_output.pci-0000_00_1f.3.analog-stereo>
";

#[test]
fn pactl_poll_switches_and_moves_every_stream() {
    let mut inspector = Inspector::new(
        ScriptedServer::new(PACTL_SINKS, PACTL_STREAMS),
        Tool::Pactl.format(),
        8,
    );

    let outcome = daemon::tick(&mut inspector).unwrap();

    let Outcome::Switched(report) = outcome else {
        panic!("expected a switch, got {outcome:?}");
    };
    assert_eq!(report.target.name, "bluez_sink.00_1B_66_AA_BB_CC.a2dp_sink");
    assert_eq!(report.target.id, 3);
    assert_eq!(report.moved, vec![41, 57]);
    assert!(!report.is_partial());
    assert_eq!(
        inspector.server().sent(),
        vec![
            Sent::SetDefault("bluez_sink.00_1B_66_AA_BB_CC.a2dp_sink".to_string()),
            Sent::Move(41, 3),
            Sent::Move(57, 3),
        ]
    );
}

#[test]
fn pacmd_poll_uses_star_marker_and_angle_bracket_names() {
    let mut inspector = Inspector::new(
        ScriptedServer::new(PACMD_SINKS, PACMD_STREAMS),
        Tool::Pacmd.format(),
        8,
    );

    let outputs = inspector.list_outputs().unwrap();
    assert_eq!(outputs.len(), 2);
    assert!(outputs[0].enabled);
    assert!(!outputs[1].enabled);
    assert_eq!(outputs[1].name, "alsa_output.usb-Focusrite_Scarlett-00.analog-stereo");

    let outcome = policy::evaluate(&inspector, &outputs).unwrap();
    assert!(matches!(outcome, Outcome::Switched(ref r) if r.target.id == 5));
    assert_eq!(
        inspector.server().sent(),
        vec![
            Sent::SetDefault("alsa_output.usb-Focusrite_Scarlett-00.analog-stereo".to_string()),
            Sent::Move(12, 5),
        ]
    );
}

#[test]
fn preferred_sink_already_active_sends_nothing() {
    let sinks = PACTL_SINKS
        .replace("State: RUNNING", "State: IDLE")
        .replace("State: SUSPENDED", "State: RUNNING");
    let mut inspector = Inspector::new(
        ScriptedServer::new(&sinks, PACTL_STREAMS),
        Tool::Pactl.format(),
        8,
    );

    let outcome = daemon::tick(&mut inspector).unwrap();

    assert!(matches!(outcome, Outcome::Steady(ref active) if active.id == 3));
    assert!(inspector.server().sent().is_empty());
}

#[test]
fn single_sink_is_left_alone() {
    let single = "Sink #0\n\tState: SUSPENDED\n\tName: only\n\t\tpriority: 1\n";
    let mut inspector = Inspector::new(
        ScriptedServer::new(single, PACTL_STREAMS),
        Tool::Pactl.format(),
        0,
    );

    assert_eq!(daemon::tick(&mut inspector).unwrap(), Outcome::Idle);
    assert!(inspector.server().sent().is_empty());
}

#[test]
fn refused_move_does_not_stop_the_others() {
    let mut server = ScriptedServer::new(PACTL_SINKS, PACTL_STREAMS);
    server.refuse_move = Some(41);
    let mut inspector = Inspector::new(server, Tool::Pactl.format(), 8);

    let Outcome::Switched(report) = daemon::tick(&mut inspector).unwrap() else {
        panic!("expected a switch");
    };

    assert!(report.is_partial());
    assert_eq!(report.moved, vec![57]);
    assert_eq!(report.failed_moves.len(), 1);
    assert_eq!(report.failed_moves[0].stream, 41);
    assert_eq!(report.failed_moves[0].error.kind(), "external_unavailable");
}

#[test]
fn unlisted_streams_leave_a_partial_switch() {
    let mut server = ScriptedServer::new(PACTL_SINKS, "");
    server.streams = Err(unavailable("pactl list sink-inputs"));
    let mut inspector = Inspector::new(server, Tool::Pactl.format(), 8);

    let Outcome::Switched(report) = daemon::tick(&mut inspector).unwrap() else {
        panic!("expected a switch");
    };

    assert!(report.is_partial());
    assert!(report.moved.is_empty());
    assert!(report.streams_error.is_some());
    assert_eq!(
        inspector.server().sent(),
        vec![Sent::SetDefault(
            "bluez_sink.00_1B_66_AA_BB_CC.a2dp_sink".to_string()
        )]
    );
}

#[test]
fn ragged_report_is_malformed_and_sends_nothing() {
    let ragged = PACTL_SINKS.replacen("\t\tpriority: 9009\n", "", 1);
    let mut inspector = Inspector::new(
        ScriptedServer::new(&ragged, PACTL_STREAMS),
        Tool::Pactl.format(),
        8,
    );

    let err = daemon::tick(&mut inspector).unwrap_err();

    assert_eq!(err.kind(), "malformed_response");
    assert!(inspector.server().sent().is_empty());
}

#[test]
fn repeated_reports_hit_the_cache() {
    let mut inspector = Inspector::new(
        ScriptedServer::new(PACTL_SINKS, PACTL_STREAMS),
        Tool::Pactl.format(),
        8,
    );

    let first = inspector.list_outputs().unwrap();
    let second = inspector.list_outputs().unwrap();

    assert_eq!(first, second);
    assert!(inspector.cache_hit_rate() > 0.0);
}
