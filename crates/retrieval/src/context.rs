/// Renders retrieved chunks as a numbered context block for a prompt.
pub fn format_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Context {}]:\n{}", i + 1, chunk.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_number_chunks_from_one() {
        let context = format_context(&["first chunk", "second chunk"]);
        assert_eq!(
            context,
            "[Context 1]:\nfirst chunk\n\n[Context 2]:\nsecond chunk"
        );
    }

    #[test]
    fn should_render_nothing_for_no_chunks() {
        let chunks: Vec<String> = Vec::new();
        assert_eq!(format_context(&chunks), "");
    }
}
