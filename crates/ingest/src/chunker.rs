use std::str::Lines;

/// A paragraph that survived the length filter, addressed by its position in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub ordinal: usize,
    /// Zero-based page the paragraph was found on.
    pub page: usize,
    pub content: String,
}

/// Iterator over the blank-line separated paragraphs of one page.
///
/// A line holding only whitespace counts as blank. Each paragraph keeps its
/// inner line breaks and is trimmed at both ends.
pub struct Paragraphs<'a> {
    lines: Lines<'a>,
}

impl<'a> Paragraphs<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

impl Iterator for Paragraphs<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let mut paragraph: Vec<&str> = Vec::new();

        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                if paragraph.is_empty() {
                    continue;
                }
                break;
            }
            paragraph.push(line);
        }

        if paragraph.is_empty() {
            None
        } else {
            Some(paragraph.join("\n").trim().to_string())
        }
    }
}

/// Splits page text into paragraph chunks, dropping the short ones
/// (headers, page numbers and similar noise).
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    min_chunk_chars: usize,
}

impl ParagraphChunker {
    pub fn new(min_chunk_chars: usize) -> Self {
        Self { min_chunk_chars }
    }

    pub fn is_meaningful(&self, paragraph: &str) -> bool {
        paragraph.trim().chars().count() >= self.min_chunk_chars
    }

    /// Lazily chunks pages in order. Ordinals are assigned after filtering,
    /// so they run from zero without gaps.
    pub fn chunk_pages<'a, I>(&self, pages: I) -> impl Iterator<Item = TextChunk> + 'a
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: 'a,
    {
        let chunker = self.clone();
        pages
            .into_iter()
            .enumerate()
            .flat_map(|(page, text)| Paragraphs::new(text).map(move |p| (page, p)))
            .filter(move |(_, paragraph)| chunker.is_meaningful(paragraph))
            .enumerate()
            .map(|(ordinal, (page, content))| TextChunk {
                ordinal,
                page,
                content,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "Alpha paragraph with enough words to pass the noise filter easily.";
    const LONG_B: &str = "Bravo paragraph that is also long enough to be kept as a chunk.";
    const LONG_C: &str = "Charlie paragraph living on the second page of the document here.";

    fn contents(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn should_split_page_on_blank_lines() {
        let text = format!("{}\n\n{}", LONG_A, LONG_B);
        let paragraphs: Vec<String> = Paragraphs::new(&text).collect();

        assert_eq!(paragraphs, vec![LONG_A, LONG_B]);
    }

    #[test]
    fn should_keep_single_line_breaks_inside_paragraph() {
        let text = "first line\nsecond line\n\nnext paragraph";
        let paragraphs: Vec<String> = Paragraphs::new(text).collect();

        assert_eq!(paragraphs, vec!["first line\nsecond line", "next paragraph"]);
    }

    #[test]
    fn should_treat_whitespace_only_lines_and_crlf_as_blank() {
        let text = "  one  \r\n   \r\n\t\r\ntwo\r\n\r\n\r\n";
        let paragraphs: Vec<String> = Paragraphs::new(text).collect();

        assert_eq!(paragraphs, vec!["one", "two"]);
    }

    #[test]
    fn should_yield_nothing_for_blank_page() {
        assert_eq!(Paragraphs::new("").count(), 0);
        assert_eq!(Paragraphs::new("\n\n   \n").count(), 0);
    }

    #[test]
    fn should_drop_paragraphs_below_threshold() {
        let chunker = ParagraphChunker::new(50);
        let page = format!("Page 1\n\n{}\n\n- 1 -", LONG_A);

        let chunks: Vec<TextChunk> = chunker.chunk_pages([page.as_str()]).collect();

        assert_eq!(contents(&chunks), vec![LONG_A]);
    }

    #[test]
    fn should_keep_paragraph_exactly_at_threshold() {
        let chunker = ParagraphChunker::new(10);

        assert!(chunker.is_meaningful("0123456789"));
        assert!(chunker.is_meaningful("   0123456789   "));
        assert!(!chunker.is_meaningful("012345678"));
    }

    #[test]
    fn should_count_characters_not_bytes() {
        let chunker = ParagraphChunker::new(5);

        // Five characters, ten bytes.
        assert!(chunker.is_meaningful("ééééé"));
        assert!(!chunker.is_meaningful("éééé"));
    }

    #[test]
    fn should_preserve_page_and_paragraph_order_with_contiguous_ordinals() {
        let chunker = ParagraphChunker::new(50);
        let page_one = format!("{}\n\nshort\n\n{}", LONG_A, LONG_B);
        let page_two = format!("header\n\n{}", LONG_C);
        let pages = [page_one.as_str(), "", page_two.as_str()];

        let chunks: Vec<TextChunk> = chunker.chunk_pages(pages).collect();

        assert_eq!(contents(&chunks), vec![LONG_A, LONG_B, LONG_C]);
        assert_eq!(
            chunks.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(
            chunks.iter().map(|c| c.page).collect::<Vec<_>>(),
            vec![0, 0, 2]
        );
    }

    #[test]
    fn should_produce_no_chunks_for_blank_pages() {
        let chunker = ParagraphChunker::new(50);
        let chunks: Vec<TextChunk> = chunker.chunk_pages(["", "   \n\n  ", "\n"]).collect();

        assert!(chunks.is_empty());
    }

    #[test]
    fn should_chunk_lazily() {
        let chunker = ParagraphChunker::new(50);
        let page = format!("{}\n\n{}", LONG_A, LONG_B);
        let mut chunks = chunker.chunk_pages([page.as_str()]);

        assert_eq!(chunks.next().map(|c| c.content), Some(LONG_A.to_string()));
        assert_eq!(chunks.next().map(|c| c.content), Some(LONG_B.to_string()));
        assert_eq!(chunks.next(), None);
    }
}
