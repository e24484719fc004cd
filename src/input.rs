//! The keyboard boundary. The core never sees a key code: the host
//! collaborator translates its own key events into this fixed bitfield,
//! and the scheduler folds it into `INP1`/`INP2` every tick.

/// Cabinet control state for one tick, already translated from whatever
/// key-event representation the host windowing library uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CabinetInputs {
    pub credit: bool,
    pub p1_start: bool,
    pub p2_start: bool,
    pub p1_shoot: bool,
    pub p1_left: bool,
    pub p1_right: bool,
    pub p2_shoot: bool,
    pub p2_left: bool,
    pub p2_right: bool,
    pub tilt: bool,
    pub dip3: bool,
    pub dip5: bool,
    pub dip6: bool,
    pub dip7: bool,
    /// Scheduler-local: toggles pause on key-down, never reaches `INP1`/`INP2`.
    pub pause: bool,
}

/// Collaborator boundary for input: one poll per scheduler tick.
pub trait InputSource {
    fn poll(&mut self) -> CabinetInputs;
}

/// An `InputSource` that never reports a key down, useful for running the
/// scheduler headless (attract-loop soak tests, property tests).
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> CabinetInputs {
        CabinetInputs::default()
    }
}
