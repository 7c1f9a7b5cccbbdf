//! Per-side frame assembler.

use super::clock::{Clock, SystemClock};
use crate::core::types::{HandFrame, HandLandmarks, HandSide, ParsedPacket, WristPose};
use crate::protocol::{ParseError, parse_line};

/// Default frame id for the left hand.
pub const DEFAULT_LEFT_FRAME_ID: &str = "hts_left_hand";

/// Default frame id for the right hand.
pub const DEFAULT_RIGHT_FRAME_ID: &str = "hts_right_hand";

/// Assembler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Stamp frames with wall-clock time when the caller supplies none
    pub include_wall_time: bool,
    pub left_frame_id: String,
    pub right_frame_id: String,
}

impl AssemblerConfig {
    pub fn frame_id(&self, side: HandSide) -> &str {
        match side {
            HandSide::Left => &self.left_frame_id,
            HandSide::Right => &self.right_frame_id,
        }
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            include_wall_time: true,
            left_frame_id: DEFAULT_LEFT_FRAME_ID.to_string(),
            right_frame_id: DEFAULT_RIGHT_FRAME_ID.to_string(),
        }
    }
}

/// Timestamps attached to one push.
///
/// Missing values are filled in by the assembler: `recv_ts_ns` from the
/// monotonic clock, `recv_time_unix_ns` from the wall clock when wall time
/// is enabled. `source_ts_ns` is passed through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stamps {
    pub recv_ts_ns: Option<i64>,
    pub recv_time_unix_ns: Option<i64>,
    pub source_ts_ns: Option<i64>,
}

impl Stamps {
    /// Stamps with an explicit monotonic receive time.
    pub fn at(recv_ts_ns: i64) -> Self {
        Self {
            recv_ts_ns: Some(recv_ts_ns),
            ..Self::default()
        }
    }

    pub fn with_wall_time(mut self, unix_ns: i64) -> Self {
        self.recv_time_unix_ns = Some(unix_ns);
        self
    }

    pub fn with_source_ts(mut self, source_ts_ns: i64) -> Self {
        self.source_ts_ns = Some(source_ts_ns);
        self
    }
}

/// Mutable assembly state for one hand side.
#[derive(Debug, Clone, Default)]
struct SideState {
    wrist: Option<(WristPose, i64)>,
    landmarks: Option<(HandLandmarks, i64)>,
    /// `(wrist_ts, landmarks_ts)` of the last emitted frame
    last_emitted: Option<(i64, i64)>,
    next_sequence: u64,
}

impl SideState {
    /// Store a component unless it is older than the one already held.
    ///
    /// Returns false when the update was stale and discarded.
    fn accept<T>(slot: &mut Option<(T, i64)>, value: T, recv_ts_ns: i64) -> bool {
        if let Some((_, stored_ts)) = slot
            && recv_ts_ns < *stored_ts
        {
            return false;
        }
        *slot = Some((value, recv_ts_ns));
        true
    }
}

/// Merges wrist and landmark packets into per-side [`HandFrame`]s.
///
/// A frame is emitted when both components of a side have been seen and at
/// least one of their receive timestamps differs from the previous emission
/// for that side. Updates older than the stored component are dropped.
///
/// # Example
/// ```
/// use hasta_io::assembly::{HandFrameAssembler, Stamps};
///
/// let mut assembler = HandFrameAssembler::default();
/// let landmarks = format!("Right landmarks:, {}", vec!["0.0"; 63].join(","));
///
/// assert!(assembler.push_line("Right wrist:, 0,0,0,0,0,0,1", Stamps::at(10)).unwrap().is_none());
/// let frame = assembler.push_line(&landmarks, Stamps::at(20)).unwrap().unwrap();
/// assert_eq!(frame.sequence_id, 0);
/// assert_eq!(frame.recv_ts_ns, 20);
/// ```
#[derive(Debug)]
pub struct HandFrameAssembler<C: Clock = SystemClock> {
    config: AssemblerConfig,
    clock: C,
    sides: [SideState; 2],
}

impl HandFrameAssembler<SystemClock> {
    pub fn new(config: AssemblerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for HandFrameAssembler<SystemClock> {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}

impl<C: Clock> HandFrameAssembler<C> {
    pub fn with_clock(config: AssemblerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            sides: Default::default(),
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Next sequence id that will be assigned for `side`.
    pub fn sequence_counter(&self, side: HandSide) -> u64 {
        self.sides[side.index()].next_sequence
    }

    /// Feed one packet; returns a frame when one is warranted.
    pub fn push_packet(&mut self, packet: ParsedPacket, stamps: Stamps) -> Option<HandFrame> {
        let recv_ts_ns = stamps
            .recv_ts_ns
            .unwrap_or_else(|| self.clock.monotonic_ns());
        let recv_time_unix_ns = stamps.recv_time_unix_ns.or_else(|| {
            self.config
                .include_wall_time
                .then(|| self.clock.unix_time_ns())
        });

        let side = packet.side();
        let state = &mut self.sides[side.index()];

        let accepted = match packet {
            ParsedPacket::Wrist(p) => SideState::accept(&mut state.wrist, p.data, recv_ts_ns),
            ParsedPacket::Landmarks(p) => {
                SideState::accept(&mut state.landmarks, p.data, recv_ts_ns)
            }
        };
        if !accepted {
            log::trace!(
                "Dropped stale {} {} update at {} ns",
                side,
                packet.kind(),
                recv_ts_ns
            );
            return None;
        }

        let (Some((wrist, wrist_ts)), Some((landmarks, landmarks_ts))) =
            (state.wrist, state.landmarks)
        else {
            return None;
        };

        if state.last_emitted == Some((wrist_ts, landmarks_ts)) {
            return None;
        }

        let sequence_id = state.next_sequence;
        state.next_sequence += 1;
        state.last_emitted = Some((wrist_ts, landmarks_ts));

        log::trace!("Assembled {} frame seq={}", side, sequence_id);

        Some(HandFrame {
            side,
            frame_id: self.config.frame_id(side).to_string(),
            wrist,
            landmarks,
            sequence_id,
            recv_ts_ns: wrist_ts.max(landmarks_ts),
            recv_time_unix_ns,
            source_ts_ns: stamps.source_ts_ns,
            wrist_recv_ts_ns: wrist_ts,
            landmarks_recv_ts_ns: landmarks_ts,
        })
    }

    /// Parse one wire line and feed it; parse failures are returned as-is.
    pub fn push_line(
        &mut self,
        line: &str,
        stamps: Stamps,
    ) -> Result<Option<HandFrame>, ParseError> {
        let packet = parse_line(line)?;
        Ok(self.push_packet(packet, stamps))
    }

    /// Clear one side, or both when `side` is `None`.
    pub fn reset(&mut self, side: Option<HandSide>) {
        match side {
            Some(side) => self.sides[side.index()] = SideState::default(),
            None => self.sides = Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::ManualClock;
    use crate::core::types::{LandmarksPacket, WristPacket};
    use crate::protocol::LANDMARK_COUNT;

    fn wrist(side: HandSide, x: f64) -> ParsedPacket {
        WristPacket {
            side,
            data: WristPose::new(x, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
        }
        .into()
    }

    fn landmarks(side: HandSide, v: f64) -> ParsedPacket {
        LandmarksPacket {
            side,
            data: HandLandmarks::new([[v; 3]; LANDMARK_COUNT]),
        }
        .into()
    }

    fn assembler() -> HandFrameAssembler<ManualClock> {
        HandFrameAssembler::with_clock(AssemblerConfig::default(), ManualClock::new(0, 1_000))
    }

    #[test]
    fn test_gating_needs_both_components() {
        let mut asm = assembler();
        assert!(asm.push_packet(wrist(HandSide::Left, 1.0), Stamps::at(10)).is_none());

        let frame = asm
            .push_packet(landmarks(HandSide::Left, 2.0), Stamps::at(20))
            .unwrap();
        assert_eq!(frame.sequence_id, 0);
        assert_eq!(frame.side, HandSide::Left);
        assert_eq!(frame.frame_id, DEFAULT_LEFT_FRAME_ID);
        assert_eq!(frame.wrist_recv_ts_ns, 10);
        assert_eq!(frame.landmarks_recv_ts_ns, 20);
        assert_eq!(frame.recv_ts_ns, 20);
    }

    #[test]
    fn test_recv_ts_is_max_of_components() {
        let mut asm = assembler();
        asm.push_packet(landmarks(HandSide::Right, 0.0), Stamps::at(50));
        let frame = asm
            .push_packet(wrist(HandSide::Right, 0.0), Stamps::at(40))
            .unwrap();
        assert_eq!(frame.recv_ts_ns, 50);
        assert_eq!(frame.wrist_recv_ts_ns, 40);
    }

    #[test]
    fn test_stale_update_discarded() {
        let mut asm = assembler();
        asm.push_packet(wrist(HandSide::Right, 1.0), Stamps::at(100));
        asm.push_packet(landmarks(HandSide::Right, 0.0), Stamps::at(100))
            .unwrap();

        assert!(asm.push_packet(wrist(HandSide::Right, 9.0), Stamps::at(99)).is_none());

        let frame = asm
            .push_packet(wrist(HandSide::Right, 3.0), Stamps::at(101))
            .unwrap();
        assert_eq!(frame.wrist.x, 3.0);
        assert_eq!(frame.sequence_id, 1);
    }

    #[test]
    fn test_stale_update_does_not_touch_state() {
        let mut asm = assembler();
        asm.push_packet(wrist(HandSide::Left, 1.0), Stamps::at(100));
        assert!(asm.push_packet(wrist(HandSide::Left, 9.0), Stamps::at(50)).is_none());

        let frame = asm
            .push_packet(landmarks(HandSide::Left, 0.0), Stamps::at(120))
            .unwrap();
        assert_eq!(frame.wrist.x, 1.0);
        assert_eq!(frame.wrist_recv_ts_ns, 100);
    }

    #[test]
    fn test_sequencing_per_side() {
        let mut asm = assembler();
        let mut seqs = Vec::new();
        let mut ts = 0;
        for side in [HandSide::Left, HandSide::Right, HandSide::Left, HandSide::Right] {
            ts += 10;
            if let Some(frame) = asm.push_packet(wrist(side, 0.0), Stamps::at(ts)) {
                seqs.push((side, frame.sequence_id));
            }
            ts += 10;
            let frame = asm.push_packet(landmarks(side, 0.0), Stamps::at(ts)).unwrap();
            seqs.push((side, frame.sequence_id));
        }
        // After the first frame a wrist-only advance already completes a frame.
        assert_eq!(
            seqs,
            [
                (HandSide::Left, 0),
                (HandSide::Right, 0),
                (HandSide::Left, 1),
                (HandSide::Left, 2),
                (HandSide::Right, 1),
                (HandSide::Right, 2),
            ]
        );
    }

    #[test]
    fn test_consecutive_updates_emit_zero_then_one() {
        let mut asm = assembler();
        asm.push_packet(wrist(HandSide::Right, 0.0), Stamps::at(1));
        let first = asm
            .push_packet(landmarks(HandSide::Right, 0.0), Stamps::at(2))
            .unwrap();
        let second = asm
            .push_packet(landmarks(HandSide::Right, 1.0), Stamps::at(3))
            .unwrap();
        assert_eq!(first.sequence_id, 0);
        assert_eq!(second.sequence_id, 1);
        assert_eq!(second.landmarks.points[0][0], 1.0);
    }

    #[test]
    fn test_equal_timestamp_overwrites_without_emitting() {
        let mut asm = assembler();
        asm.push_packet(wrist(HandSide::Left, 1.0), Stamps::at(10));
        asm.push_packet(landmarks(HandSide::Left, 0.0), Stamps::at(10))
            .unwrap();

        // Same timestamp: stored but not advanced.
        assert!(asm.push_packet(wrist(HandSide::Left, 5.0), Stamps::at(10)).is_none());
        assert_eq!(asm.sequence_counter(HandSide::Left), 1);

        let frame = asm
            .push_packet(landmarks(HandSide::Left, 0.0), Stamps::at(11))
            .unwrap();
        assert_eq!(frame.wrist.x, 5.0);
        assert_eq!(frame.sequence_id, 1);
    }

    #[test]
    fn test_advancement_uses_inequality() {
        let mut asm = assembler();
        asm.push_packet(wrist(HandSide::Right, 0.0), Stamps::at(10));
        asm.push_packet(landmarks(HandSide::Right, 0.0), Stamps::at(20))
            .unwrap();
        // Landmarks moves forward, wrist unchanged: still one advanced component.
        let frame = asm
            .push_packet(landmarks(HandSide::Right, 1.0), Stamps::at(30))
            .unwrap();
        assert_eq!(frame.wrist_recv_ts_ns, 10);
        assert_eq!(frame.sequence_id, 1);
    }

    #[test]
    fn test_reset_single_side() {
        let mut asm = assembler();
        for side in HandSide::ALL {
            asm.push_packet(wrist(side, 0.0), Stamps::at(1));
            asm.push_packet(landmarks(side, 0.0), Stamps::at(2)).unwrap();
        }

        asm.reset(Some(HandSide::Left));
        assert_eq!(asm.sequence_counter(HandSide::Left), 0);
        assert_eq!(asm.sequence_counter(HandSide::Right), 1);

        // Right keeps its stored wrist: fresh landmarks alone complete a frame.
        let right = asm
            .push_packet(landmarks(HandSide::Right, 4.0), Stamps::at(3))
            .unwrap();
        assert_eq!(right.sequence_id, 1);
        assert_eq!(right.wrist_recv_ts_ns, 1);
        assert_eq!(right.landmarks_recv_ts_ns, 3);

        // Left must be re-gated after reset, even with older timestamps.
        assert!(asm.push_packet(wrist(HandSide::Left, 0.0), Stamps::at(0)).is_none());
        let frame = asm
            .push_packet(landmarks(HandSide::Left, 0.0), Stamps::at(0))
            .unwrap();
        assert_eq!(frame.sequence_id, 0);

        asm.reset(None);
        assert_eq!(asm.sequence_counter(HandSide::Right), 0);
    }

    #[test]
    fn test_clock_fills_missing_stamps() {
        let clock = ManualClock::new(500, 9_000);
        let mut asm = HandFrameAssembler::with_clock(AssemblerConfig::default(), clock);
        asm.push_packet(wrist(HandSide::Left, 0.0), Stamps::default());
        asm.clock().advance(10);
        let frame = asm
            .push_packet(landmarks(HandSide::Left, 0.0), Stamps::default().with_source_ts(42))
            .unwrap();
        assert_eq!(frame.wrist_recv_ts_ns, 500);
        assert_eq!(frame.landmarks_recv_ts_ns, 510);
        assert_eq!(frame.recv_time_unix_ns, Some(9_010));
        assert_eq!(frame.source_ts_ns, Some(42));
    }

    #[test]
    fn test_wall_time_disabled_and_caller_override() {
        let config = AssemblerConfig {
            include_wall_time: false,
            left_frame_id: "l".to_string(),
            right_frame_id: "r".to_string(),
        };
        let mut asm = HandFrameAssembler::with_clock(config, ManualClock::new(0, 9_000));
        assert_eq!(asm.config().frame_id(HandSide::Left), "l");
        asm.push_packet(wrist(HandSide::Right, 0.0), Stamps::at(1));
        let frame = asm
            .push_packet(landmarks(HandSide::Right, 0.0), Stamps::at(2))
            .unwrap();
        assert_eq!(frame.recv_time_unix_ns, None);
        assert_eq!(frame.frame_id, "r");

        let frame = asm
            .push_packet(
                landmarks(HandSide::Right, 0.0),
                Stamps::at(3).with_wall_time(77),
            )
            .unwrap();
        assert_eq!(frame.recv_time_unix_ns, Some(77));
    }

    #[test]
    fn test_push_line_propagates_parse_error() {
        let mut asm = assembler();
        assert_eq!(
            asm.push_line("Right wrist:, 1,2,3", Stamps::at(1)),
            Err(ParseError::WrongValueCount {
                kind: crate::core::types::PacketKind::Wrist,
                expected: 7,
                actual: 3,
            })
        );
        assert_eq!(asm.sequence_counter(HandSide::Right), 0);
    }

    #[test]
    fn test_end_to_end_lines() {
        let mut asm = assembler();
        let values: Vec<String> = (0..63).map(|i| i.to_string()).collect();
        let lines = [
            "Right wrist:, 0.1,0.2,0.3,0,0,0,1".to_string(),
            format!("Right landmarks:, {}", values.join(",")),
        ];

        let frames: Vec<HandFrame> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| asm.push_line(line, Stamps::at(i as i64)).unwrap())
            .collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].side, HandSide::Right);
        assert_eq!(frames[0].sequence_id, 0);
        assert_eq!(frames[0].landmarks.points[20], [60.0, 61.0, 62.0]);
    }
}
