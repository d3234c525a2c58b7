use crate::progress::Position;
use vellum_corpus::Bible;

/// Step `step` chapters from `from`, staying inside the same book.
///
/// Returns `None` when the book is unknown or the target chapter falls
/// outside `1..=chapter_count`, where `chapter_count` is the number of
/// chapters the book has (not its highest chapter number).
///
/// ```
/// use vellum_reader::{Position, navigate};
///
/// let bible = vellum_corpus::parse("Ruth 1:1 a\nRuth 2:1 b\nRuth 3:1 c\nRuth 4:1 d");
/// let next = navigate(&bible, &Position::new("Ruth", 3), 1);
/// assert_eq!(next, Some(Position::new("Ruth", 4)));
/// assert_eq!(navigate(&bible, &Position::new("Ruth", 4), 1), None);
/// ```
pub fn navigate(bible: &Bible, from: &Position, step: i32) -> Option<Position> {
    let count = u32::try_from(bible.get(&from.book)?.chapter_count()).ok()?;
    let target = from.chapter.checked_add_signed(step)?;
    (1..=count)
        .contains(&target)
        .then(|| Position::new(from.book.clone(), target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bible() -> Bible {
        vellum_corpus::parse("Genesis 1:1 a\nGenesis 2:1 b\nGenesis 3:1 c\nExodus 1:1 d")
    }

    #[rstest]
    #[case("Genesis", 1, 1, Some(2))]
    #[case("Genesis", 2, -1, Some(1))]
    #[case("Genesis", 3, 1, None)]
    #[case("Genesis", 1, -1, None)]
    #[case("Genesis", 1, 2, Some(3))]
    #[case("Exodus", 1, 1, None)]
    #[case("Leviticus", 1, 1, None)]
    #[case("Genesis", 0, -1, None)]
    fn test_navigate(#[case] book: &str, #[case] chapter: u32, #[case] step: i32, #[case] expected: Option<u32>) {
        let result = navigate(&bible(), &Position::new(book, chapter), step);
        assert_eq!(result, expected.map(|c| Position::new(book, c)));
    }

    #[test]
    fn test_bounded_by_chapter_count_not_highest_number() {
        // Two chapters, numbered 1 and 5.
        let bible = vellum_corpus::parse("Obadja 1:1 a\nObadja 5:1 b");
        assert_eq!(navigate(&bible, &Position::new("Obadja", 1), 1), Some(Position::new("Obadja", 2)));
        assert_eq!(navigate(&bible, &Position::new("Obadja", 2), 1), None);
    }
}
