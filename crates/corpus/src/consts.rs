use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// `<book> <chapter>:<verse> <content>`. The book is matched lazily up to the
// first whitespace-delimited `digits:digits` marker, so book names may contain
// spaces and leading numbers. Digits are ASCII only.
regex!(LINE_REGEX, r"^(.+?)\s([0-9]+):([0-9]+)\s(.+)");
// `<number> <base name>`, e.g. "1 Mose" or "2 Könige".
regex!(NUMBERED_BOOK_REGEX, r"^[0-9]+ (.+)$");
