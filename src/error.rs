use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the corpus source")]
    Source,
    /// Loading `what` failed; `retryable` comes from the underlying error.
    #[display("could not load {what}")]
    Load { what: String, retryable: bool },
    #[display("cache maintenance failed")]
    Cache { retryable: bool },
    #[display("{book} has no chapter {chapter}")]
    NoChapter { book: String, chapter: u32 },
}

impl ErrorKind {
    /// Wrap a failure from a library crate as [`ErrorKind::Load`].
    #[track_caller]
    pub fn load<E>(what: impl Into<String>, retryable: bool, err: exn::Exn<E>) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        err.raise(ErrorKind::Load {
            what: what.into(),
            retryable,
        })
    }

    #[track_caller]
    pub fn cache(err: vellum_cache::error::Error) -> Error {
        let retryable = err.is_retryable();
        err.raise(ErrorKind::Cache { retryable })
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load { retryable, .. } | Self::Cache { retryable } => *retryable,
            Self::Config | Self::Source | Self::NoChapter { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vellum_reader::error::ErrorKind as ReaderErrorKind;

    fn from_reader(inner: ReaderErrorKind) -> Error {
        let err = exn::Exn::new(inner);
        ErrorKind::load("en", err.is_retryable(), err)
    }

    #[rstest]
    #[case(ReaderErrorKind::Source { retryable: false }, false)]
    #[case(ReaderErrorKind::Source { retryable: true }, true)]
    #[case(ReaderErrorKind::Cache { retryable: true }, true)]
    #[case(ReaderErrorKind::UnknownLanguage("fr".into()), false)]
    #[case(ReaderErrorKind::UnknownBook("Leviticus".into()), false)]
    fn test_load_keeps_inner_retryability(#[case] inner: ReaderErrorKind, #[case] expected: bool) {
        let err = from_reader(inner);
        assert!(matches!(&*err, ErrorKind::Load { what, .. } if what == "en"));
        assert_eq!(err.is_retryable(), expected);
    }

    #[rstest]
    #[case(vellum_cache::error::ErrorKind::Database, true)]
    #[case(vellum_cache::error::ErrorKind::Migration, false)]
    fn test_cache_keeps_inner_retryability(#[case] inner: vellum_cache::error::ErrorKind, #[case] expected: bool) {
        assert_eq!(ErrorKind::cache(exn::Exn::new(inner)).is_retryable(), expected);
    }

    #[test]
    fn test_setup_errors_are_permanent() {
        assert!(!ErrorKind::Config.is_retryable());
        assert!(!ErrorKind::Source.is_retryable());
    }

    #[test]
    fn test_display_names_what_failed() {
        let err = from_reader(ReaderErrorKind::UnknownLanguage("fr".into()));
        assert_eq!(err.to_string(), "could not load en");
    }
}
