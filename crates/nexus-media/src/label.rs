//! `Midia.Tipo` labels.

/// Longest label the `Tipo` column holds.
pub const LABEL_MAX: usize = 50;

/// Where a stored image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Placeholder,
}

impl MediaKind {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Photo => "Foto científica",
            Self::Placeholder => "Placeholder",
        }
    }
}

/// `"{prefix} - {species}"`, cut to [`LABEL_MAX`] characters.
#[must_use]
pub fn media_label(kind: MediaKind, species: &str) -> String {
    format!("{} - {species}", kind.prefix())
        .chars()
        .take(LABEL_MAX)
        .collect()
}
