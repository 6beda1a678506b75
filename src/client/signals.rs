/// Point-in-time view of the in-flight registry (facts only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflightSnapshot {
    /// Network operations currently registered for coalescing.
    pub outstanding: usize,
}

impl InflightSnapshot {
    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }
}
