/// Lifecycle of a cached query result.
///
/// Data, when present, stays readable in every state; only the label changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Never fetched.
    #[default]
    Init,
    /// A request is in flight. Previous data (if any) is still served.
    Pending,
    /// Invalidated, or the last refetch failed while older data is retained.
    Dirty,
    /// Reflects the latest confirmed server state.
    Clean,
    /// The only fetch so far failed; there is no data to show.
    Failed,
}

impl Freshness {
    /// True only for [`Freshness::Clean`]. A dirty slot with data is not
    /// clean, even though its data is still served.
    pub fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}
