//! Typed failures of the load → aggregate pipeline.

/// The derived views computed from the loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Yearly,
    Kpis,
    Monthly,
    Hourly,
}

impl ViewKind {
    pub fn label(&self) -> &str {
        match self {
            ViewKind::Yearly => "yearly orders",
            ViewKind::Kpis => "kpis",
            ViewKind::Monthly => "monthly sales",
            ViewKind::Hourly => "hourly averages",
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A table is missing, unreadable, or holds a field that does not parse.
    #[error("malformed table '{table}': {reason}")]
    MalformedTable { table: String, reason: String },

    /// A pizza_id matched zero or several rows of the pizzas table.
    #[error("price lookup failed for pizza_id '{pizza_id}': {matches} matching rows in pizzas")]
    PriceLookup { pizza_id: String, matches: usize },

    /// A table was empty where a non-empty one is required.
    #[error("table '{table}' is empty: {reason}")]
    EmptyDataset { table: String, reason: String },

    /// An aggregation failed; names the view it was computing.
    #[error("{view} view failed: {source}")]
    View {
        view: ViewKind,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub fn empty(table: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::EmptyDataset {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Tag this error with the view that was being computed.
    ///
    /// Already-tagged errors are returned unchanged.
    pub fn in_view(self, view: ViewKind) -> Self {
        match self {
            PipelineError::View { .. } => self,
            other => PipelineError::View {
                view,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any view tags stripped.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::View { source, .. } => source.root(),
            other => other,
        }
    }
}
